use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How strongly a line's label resembles "total" wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// An amount on a line without any recognised label.
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::None => write!(f, "none"),
            Tier::Low => write!(f, "low"),
            Tier::Medium => write!(f, "medium"),
            Tier::High => write!(f, "high"),
        }
    }
}

/// An amount found on one line, tagged with the line's tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountCandidate {
    pub amount: Decimal,
    pub priority: Tier,
    /// Index into the normalized, non-blank lines.
    pub line_index: usize,
    pub source_line: String,
}

/// Which stage of the heuristic produced the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Labeled(Tier),
    /// Largest amount among the last few lines.
    TrailingLines,
    /// Largest plausible amount anywhere in the text.
    WholeText,
    NotFound,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Labeled(tier) => write!(f, "labeled ({tier} priority)"),
            Strategy::TrailingLines => write!(f, "trailing lines"),
            Strategy::WholeText => write!(f, "whole text"),
            Strategy::NotFound => write!(f, "not found"),
        }
    }
}

/// Full trace of one extraction run.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub lines: Vec<String>,
    pub candidates: Vec<AmountCandidate>,
    pub total: Option<Decimal>,
    pub strategy: Strategy,
}

impl Extraction {
    pub fn candidates_at(&self, tier: Tier) -> impl Iterator<Item = &AmountCandidate> + '_ {
        self.candidates.iter().filter(move |c| c.priority == tier)
    }
}
