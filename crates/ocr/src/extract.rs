use std::ops::Range;
use std::sync::OnceLock;

use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::normalize::normalize;
use crate::patterns::{AmountPattern, PatternSet};
use crate::types::{AmountCandidate, Extraction, Strategy, Tier};

/// Best guess at the payable total of a receipt, using the built-in
/// Italian/English pattern set.
pub fn extract_total(text: &str) -> Option<Decimal> {
    static DEFAULT: OnceLock<ReceiptTotalExtractor> = OnceLock::new();
    DEFAULT.get_or_init(ReceiptTotalExtractor::new).extract_total(text)
}

/// Picks the "amount due" out of recognized receipt text.
///
/// Stateless apart from its [`PatternSet`]; share it freely across threads.
#[derive(Debug, Clone, Default)]
pub struct ReceiptTotalExtractor {
    patterns: PatternSet,
}

impl ReceiptTotalExtractor {
    pub fn new() -> Self {
        Self::with_patterns(PatternSet::italian())
    }

    pub fn with_patterns(patterns: PatternSet) -> Self {
        Self { patterns }
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Returns `None` when no plausible amount exists; never fails.
    pub fn extract_total(&self, text: &str) -> Option<Decimal> {
        self.analyze(text).total
    }

    pub fn analyze(&self, text: &str) -> Extraction {
        let normalized = normalize(text, self.patterns.confusables);
        let lines: Vec<String> = normalized
            .split(['\n', '\r'])
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect();

        let candidates = self.collect_candidates(&lines);
        let (total, strategy) = self.select(&lines, &candidates);
        debug!(?total, %strategy, lines = lines.len(), candidates = candidates.len(), "receipt total");

        Extraction { lines, candidates, total, strategy }
    }

    // ── Candidates ────────────────────────────────────────────────────────────

    fn collect_candidates(&self, lines: &[String]) -> Vec<AmountCandidate> {
        let mut candidates = Vec::new();
        for (line_index, line) in lines.iter().enumerate() {
            let upper = line.to_uppercase();
            if self.is_excluded(&upper) {
                debug!(line = %line, "line excluded");
                continue;
            }

            let priority = self.tier_of(&upper);
            for amount in self.amounts_in(line) {
                debug!(%amount, %priority, line = %line, "candidate");
                candidates.push(AmountCandidate {
                    amount,
                    priority,
                    line_index,
                    source_line: line.clone(),
                });
            }
        }
        candidates
    }

    /// An exclusion keyword disqualifies the line unless an override keyword
    /// appears outside the keyword itself ("TOTALE IVA" stays, "SUBTOTALE" goes).
    fn is_excluded(&self, upper: &str) -> bool {
        self.patterns
            .exclude
            .iter()
            .filter(|keyword| upper.contains(keyword.as_str()))
            .any(|keyword| {
                let rest = upper.replace(keyword.as_str(), " ");
                !self.patterns.overrides.iter().any(|o| rest.contains(o.as_str()))
            })
    }

    fn tier_of(&self, upper: &str) -> Tier {
        let hit = |keywords: &[String]| keywords.iter().any(|k| upper.contains(k.as_str()));
        if hit(&self.patterns.high) {
            Tier::High
        } else if hit(&self.patterns.medium) {
            Tier::Medium
        } else if hit(&self.patterns.low) {
            Tier::Low
        } else {
            Tier::None
        }
    }

    /// Every distinct amount on one line, in pattern order.
    ///
    /// A span matched by an earlier pattern is never re-read by a later one,
    /// so `1.234,56` yields only `1234.56`.
    pub fn amounts_in(&self, line: &str) -> Vec<Decimal> {
        let mut claimed: Vec<Range<usize>> = Vec::new();
        let mut amounts: Vec<Decimal> = Vec::new();

        for pattern in &self.patterns.amounts {
            for (span, value) in scan(pattern, line, &claimed) {
                claimed.push(span);
                let Some(amount) = value else {
                    trace!(pattern = %pattern.name, line = %line, "unparseable amount");
                    continue;
                };
                if self.in_valid_range(amount) && !amounts.contains(&amount) {
                    amounts.push(amount);
                }
            }
        }
        amounts
    }

    fn in_valid_range(&self, amount: Decimal) -> bool {
        amount > Decimal::ZERO
            && amount >= self.patterns.min_amount
            && amount <= self.patterns.max_amount
    }

    // ── Selection ─────────────────────────────────────────────────────────────

    fn select(
        &self,
        lines: &[String],
        candidates: &[AmountCandidate],
    ) -> (Option<Decimal>, Strategy) {
        // Highest tier first, then largest amount within it.
        let labeled = candidates
            .iter()
            .filter(|c| c.priority > Tier::None)
            .max_by(|a, b| a.priority.cmp(&b.priority).then(a.amount.cmp(&b.amount)));
        if let Some(best) = labeled {
            return (Some(best.amount), Strategy::Labeled(best.priority));
        }

        let skip = lines.len().saturating_sub(self.patterns.trailing_lines);
        let trailing = lines[skip..].iter().flat_map(|l| self.amounts_in(l)).max();
        if let Some(amount) = trailing {
            return (Some(amount), Strategy::TrailingLines);
        }

        let anywhere = lines
            .iter()
            .flat_map(|l| self.amounts_in(l))
            .filter(|a| *a >= self.patterns.fallback_min && *a <= self.patterns.fallback_max)
            .max();
        match anywhere {
            Some(amount) => (Some(amount), Strategy::WholeText),
            None => (None, Strategy::NotFound),
        }
    }
}

/// Leftmost-first scan of `line` honouring the pattern's isolation rule and
/// skipping spans already claimed. Yields each accepted span with its parsed
/// value (`None` when the groups do not form a number).
fn scan(
    pattern: &AmountPattern,
    line: &str,
    claimed: &[Range<usize>],
) -> Vec<(Range<usize>, Option<Decimal>)> {
    let bytes = line.as_bytes();
    let mut found: Vec<(Range<usize>, Option<Decimal>)> = Vec::new();
    let mut pos = 0;

    while pos <= line.len() {
        let Some(caps) = pattern.regex.captures_at(line, pos) else {
            break;
        };
        let Some(whole) = caps.get(0) else {
            break;
        };
        let span = whole.range();
        let groups: Vec<_> = caps.iter().skip(1).flatten().collect();

        let isolated_ok = !pattern.isolated
            || match (groups.first(), groups.last()) {
                (Some(first), Some(last)) => {
                    !glued_before(bytes, first.start()) && !glued_after(bytes, last.end())
                }
                _ => true,
            };
        let free = !claimed.iter().chain(found.iter().map(|(r, _)| r)).any(|r| overlaps(r, &span));

        if isolated_ok && free && !span.is_empty() {
            let texts: Vec<&str> = groups.iter().map(|m| m.as_str()).collect();
            let next = span.end;
            found.push((span, pattern.parse(&texts)));
            pos = next;
        } else {
            pos = span.start + line[span.start..].chars().next().map_or(1, char::len_utf8);
        }
    }
    found
}

fn glued_before(bytes: &[u8], start: usize) -> bool {
    start >= 2 && bytes[start - 2].is_ascii_digit() && matches!(bytes[start - 1], b'.' | b',')
}

fn glued_after(bytes: &[u8], end: usize) -> bool {
    end + 1 < bytes.len() && matches!(bytes[end], b'.' | b',') && bytes[end + 1].is_ascii_digit()
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

// ── Tests ─────────────────────────────────────────────────────────────────────
