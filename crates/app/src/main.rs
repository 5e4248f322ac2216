use std::io::Read;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use notaspese_ocr::{Extraction, PatternSet, ReceiptTotalExtractor};
use tracing_subscriber::EnvFilter;

mod cli;
mod report;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let patterns = match &cli.patterns {
        Some(path) => PatternSet::load(path)
            .with_context(|| format!("Failed to load patterns from {}", path.display()))?,
        None => PatternSet::italian(),
    };
    let extractor = ReceiptTotalExtractor::with_patterns(patterns);
    let loaded = extractor.patterns();
    tracing::debug!(
        high = loaded.high.len(),
        medium = loaded.medium.len(),
        low = loaded.low.len(),
        exclude = loaded.exclude.len(),
        amounts = loaded.amounts.len(),
        confusables = ?loaded.confusables,
        "pattern set ready"
    );

    let extraction = match &cli.image {
        Some(path) => recognize_image(path, extractor).await?,
        None => {
            let text = read_text(cli.input.as_deref())?;
            extractor.analyze(&text)
        }
    };

    if cli.verbose {
        for line in report::describe(&extraction) {
            eprintln!("{line}");
        }
    }
    println!("{}", report::render(&extraction, cli.json)?);

    Ok(if extraction.total.is_some() { ExitCode::SUCCESS } else { ExitCode::from(2) })
}

fn read_text(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

#[cfg(feature = "tesseract")]
async fn recognize_image(path: &Path, extractor: ReceiptTotalExtractor) -> Result<Extraction> {
    use notaspese_ocr::recognizer::tesseract_backend::TesseractRecognizer;
    use notaspese_ocr::ReceiptCapture;

    tracing::info!("Recognizing receipt: {}", path.display());
    let capture = ReceiptCapture::with_extractor(TesseractRecognizer::default(), extractor);
    let result = capture
        .capture_file(path)
        .await
        .with_context(|| format!("Failed to recognize {}", path.display()))?;
    Ok(result.extraction)
}

#[cfg(not(feature = "tesseract"))]
async fn recognize_image(path: &Path, _extractor: ReceiptTotalExtractor) -> Result<Extraction> {
    anyhow::bail!(
        "Cannot read {}: built without the `tesseract` feature",
        path.display()
    )
}
