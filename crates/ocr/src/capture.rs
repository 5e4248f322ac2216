use std::path::Path;

use notaspese_core::{ExpenseDraft, Money};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::extract::ReceiptTotalExtractor;
use crate::recognizer::{OcrBackend, OcrError};
use crate::types::{Extraction, Strategy};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// The outcome of reading one receipt photo.
#[derive(Debug, Clone)]
pub struct CaptureResult {
    /// Raw recognizer output.
    pub text: String,
    pub extraction: Extraction,
}

impl CaptureResult {
    pub fn total(&self) -> Option<Decimal> {
        self.extraction.total
    }

    pub fn strategy(&self) -> Strategy {
        self.extraction.strategy
    }

    pub fn amount(&self) -> Option<Money> {
        self.total().map(Money::from_decimal)
    }

    /// Fill the draft's amount field unless the user already typed one.
    /// Returns whether the draft changed.
    pub fn prefill(&self, draft: &mut ExpenseDraft) -> bool {
        match (draft.amount, self.amount()) {
            (None, Some(amount)) => {
                draft.amount = Some(amount);
                true
            }
            _ => false,
        }
    }
}

/// Orchestrates: recognize → extract total.
pub struct ReceiptCapture<R: OcrBackend> {
    recognizer: R,
    extractor: ReceiptTotalExtractor,
}

impl<R: OcrBackend> ReceiptCapture<R> {
    pub fn new(recognizer: R) -> Self {
        Self::with_extractor(recognizer, ReceiptTotalExtractor::new())
    }

    pub fn with_extractor(recognizer: R, extractor: ReceiptTotalExtractor) -> Self {
        Self { recognizer, extractor }
    }

    /// Read a photo (or cropped image) from disk.
    pub async fn capture_file(&self, path: &Path) -> Result<CaptureResult, CaptureError> {
        let bytes = tokio::fs::read(path).await?;
        self.capture_bytes(&bytes)
    }

    /// Process raw image bytes (camera capture or crop).
    pub fn capture_bytes(&self, image: &[u8]) -> Result<CaptureResult, CaptureError> {
        let text = self.recognizer.recognize(image).inspect_err(|e| {
            warn!("Receipt recognition failed: {e}");
        })?;
        debug!("Recognized text:\n{text}");

        let extraction = self.extractor.analyze(&text);
        match extraction.total {
            Some(total) => info!("Receipt total {total} ({})", extraction.strategy),
            None => info!("No receipt total found"),
        }

        Ok(CaptureResult { text, extraction })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
