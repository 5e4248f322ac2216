use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_eu_thousands, r"(\d{1,3})\.(\d{3}),(\d{2})");
re!(re_us_thousands, r"(\d{1,3}),(\d{3})\.(\d{2})");
re!(re_eu_simple, r"(\d{1,4}),(\d{2})");
re!(re_us_simple, r"(\d{1,4})\.(\d{2})");
re!(re_currency_integer, r"(?i)(?:€|\bEURO?\b)\s*(\d{1,4})\b");

// ── Built-in keyword tables ──────────────────────────────────────────────────

const HIGH: &[&str] = &[
    "TOTALE EURO",
    "TOTALE EUR",
    "TOTAL EURO",
    "TOTAL EUR",
    "TOTALE COMPLESSIVO",
    "TOTALE DA PAGARE",
    "IMPORTO DOVUTO",
    "DA PAGARE",
    "AMOUNT DUE",
    "TOTALE €",
    "TOTAL €",
];

const MEDIUM: &[&str] = &[
    "TOTALE",
    "TOTAL",
    "TOT.EURO",
    "TOT. EURO",
    "TOT.EUR",
    "TOT. EUR",
    "IMPORTO TOTALE",
    "IMPORTO",
    "AMOUNT",
    "SALDO",
    "DOVUTO",
];

const LOW: &[&str] = &[
    "TOT.", "TOT ", "PAGATO", "CONTANTI", "CONTANTE", "CARTA", "BANCOMAT", "POS", "CASH", "RESTO",
];

const EXCLUDE: &[&str] = &[
    "SUBTOTALE",
    "SUBTOTAL",
    "SUB-TOTALE",
    "SUB TOTALE",
    "IVA",
    "VAT",
    "SCONTO",
    "DISCOUNT",
    "RESTO",
    "CHANGE",
    "PUNTI",
    "POINTS",
];

const OVERRIDES: &[&str] = &["TOTALE", "TOTAL"];

pub const TRAILING_LINES: usize = 5;

// ── Pattern types ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Failed to parse pattern TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid regex for amount pattern '{name}': {source}")]
    Regex {
        name: String,
        #[source]
        source: regex::Error,
    },
    #[error("IO error reading pattern file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Pattern set has no amount patterns")]
    NoAmountPatterns,
}

/// How the capture groups of an amount pattern become a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberStyle {
    /// The last group is the two-digit fraction, the others join into the integer part.
    Decimal,
    /// All groups join into a whole number.
    Integer,
}

/// Where OCR-confusable characters (`O`, `l`, `|`) are rewritten as digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfusableScope {
    /// Only next to digits or digit separators.
    #[default]
    Numeric,
    /// Everywhere in the text, labels included. This is the blanket replace
    /// older receipt readers used; `TOTALE` becomes `T0TALE` under it.
    Global,
    Off,
}

#[derive(Debug, Clone)]
pub struct AmountPattern {
    pub name: String,
    pub regex: Regex,
    pub style: NumberStyle,
    /// Reject a match preceded by `digit + separator` or followed by `separator + digit`.
    pub isolated: bool,
}

impl AmountPattern {
    pub fn new(name: &str, regex: Regex, style: NumberStyle, isolated: bool) -> Self {
        Self { name: name.to_string(), regex, style, isolated }
    }

    /// Turn the capture groups of one match into a number.
    pub fn parse(&self, groups: &[&str]) -> Option<Decimal> {
        let (last, head) = groups.split_last()?;
        let literal = match self.style {
            NumberStyle::Decimal if head.is_empty() => return None,
            NumberStyle::Decimal => format!("{}.{last}", head.concat()),
            NumberStyle::Integer => groups.concat(),
        };
        literal.parse::<Decimal>().ok()
    }
}

/// Keyword tiers, exclusions and amount patterns driving the extractor.
#[derive(Debug, Clone)]
pub struct PatternSet {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
    pub exclude: Vec<String>,
    /// Keywords that cancel an exclusion when they appear on the same line.
    pub overrides: Vec<String>,
    /// Tried in order; earlier patterns claim their span first.
    pub amounts: Vec<AmountPattern>,
    pub confusables: ConfusableScope,
    pub trailing_lines: usize,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    pub fallback_min: Decimal,
    pub fallback_max: Decimal,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::italian()
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn upper(words: Vec<String>) -> Vec<String> {
    words.into_iter().map(|w| w.to_uppercase()).collect()
}

impl PatternSet {
    /// Italian/English receipt wording with European and US number formats.
    pub fn italian() -> Self {
        Self {
            high: owned(HIGH),
            medium: owned(MEDIUM),
            low: owned(LOW),
            exclude: owned(EXCLUDE),
            overrides: owned(OVERRIDES),
            amounts: Self::default_amounts(),
            confusables: ConfusableScope::Numeric,
            trailing_lines: TRAILING_LINES,
            min_amount: Decimal::new(1, 2),
            max_amount: Decimal::new(9_999_999, 2),
            fallback_min: Decimal::new(101, 2),
            fallback_max: Decimal::new(999_999, 2),
        }
    }

    pub fn default_amounts() -> Vec<AmountPattern> {
        vec![
            AmountPattern::new("eu_thousands", re_eu_thousands().clone(), NumberStyle::Decimal, false),
            AmountPattern::new("us_thousands", re_us_thousands().clone(), NumberStyle::Decimal, false),
            AmountPattern::new("eu_simple", re_eu_simple().clone(), NumberStyle::Decimal, true),
            AmountPattern::new("us_simple", re_us_simple().clone(), NumberStyle::Decimal, true),
            AmountPattern::new(
                "currency_integer",
                re_currency_integer().clone(),
                NumberStyle::Integer,
                true,
            ),
        ]
    }

    pub fn from_toml(toml_content: &str) -> Result<Self, PatternError> {
        let config: PatternConfig = toml::from_str(toml_content)?;
        Self::from_config(config)
    }

    pub fn load(path: &Path) -> Result<Self, PatternError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Overlay a config on the built-in set; omitted sections keep their defaults.
    pub fn from_config(config: PatternConfig) -> Result<Self, PatternError> {
        let base = Self::italian();

        let amounts = match config.amounts {
            Some(list) if list.is_empty() => return Err(PatternError::NoAmountPatterns),
            Some(list) => list
                .into_iter()
                .map(|p| -> Result<AmountPattern, PatternError> {
                    let regex = Regex::new(&p.regex)
                        .map_err(|source| PatternError::Regex { name: p.name.clone(), source })?;
                    Ok(AmountPattern { name: p.name, regex, style: p.style, isolated: p.isolated })
                })
                .collect::<Result<Vec<_>, _>>()?,
            None => base.amounts,
        };

        Ok(Self {
            high: config.high.map(upper).unwrap_or(base.high),
            medium: config.medium.map(upper).unwrap_or(base.medium),
            low: config.low.map(upper).unwrap_or(base.low),
            exclude: config.exclude.map(upper).unwrap_or(base.exclude),
            overrides: config.overrides.map(upper).unwrap_or(base.overrides),
            amounts,
            confusables: config.confusables.unwrap_or(base.confusables),
            trailing_lines: config.trailing_lines.unwrap_or(base.trailing_lines),
            ..base
        })
    }
}

// ── TOML representation ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternConfig {
    pub high: Option<Vec<String>>,
    pub medium: Option<Vec<String>>,
    pub low: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub overrides: Option<Vec<String>>,
    pub amounts: Option<Vec<AmountPatternConfig>>,
    pub confusables: Option<ConfusableScope>,
    pub trailing_lines: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountPatternConfig {
    pub name: String,
    pub regex: String,
    pub style: NumberStyle,
    #[serde(default)]
    pub isolated: bool,
}
