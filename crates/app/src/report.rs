use anyhow::Result;
use notaspese_core::Money;
use notaspese_ocr::{Extraction, Strategy};

/// Placeholder printed when no total could be determined.
pub const NOT_FOUND: &str = "-";

pub fn render(extraction: &Extraction, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(extraction)?);
    }
    Ok(match extraction.total {
        Some(total) => Money::from_decimal(total).to_string(),
        None => NOT_FOUND.to_string(),
    })
}

/// One line per candidate, for `--verbose` runs.
pub fn describe(extraction: &Extraction) -> Vec<String> {
    let mut out: Vec<String> = extraction
        .candidates
        .iter()
        .map(|c| {
            format!(
                "riga {:>3}  {:<6}  {:>12}  {}",
                c.line_index + 1,
                c.priority.to_string(),
                Money::from_decimal(c.amount).to_string(),
                c.source_line
            )
        })
        .collect();
    if extraction.strategy != Strategy::NotFound {
        out.push(format!("strategia: {}", extraction.strategy));
    }
    out
}
