//! Receipt total extraction from recognized (OCR) text.
//!
//! [`extract_total`] is the entry point most callers need; build a
//! [`ReceiptTotalExtractor`] with a custom [`PatternSet`] for other locales.

pub mod capture;
pub mod extract;
pub mod normalize;
pub mod patterns;
pub mod recognizer;
pub mod types;

pub use capture::{CaptureError, CaptureResult, ReceiptCapture};
pub use extract::{extract_total, ReceiptTotalExtractor};
pub use normalize::normalize;
pub use patterns::{
    AmountPattern, AmountPatternConfig, ConfusableScope, NumberStyle, PatternConfig, PatternError,
    PatternSet,
};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError};
pub use types::{AmountCandidate, Extraction, Strategy, Tier};
