use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

use crate::patterns::ConfusableScope;

fn re_euro_word() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r"EURO?").expect("invalid regex"))
}

fn re_space_run() -> &'static Regex {
    static R: OnceLock<Regex> = OnceLock::new();
    R.get_or_init(|| Regex::new(r" {2,}").expect("invalid regex"))
}

/// Clean raw OCR output before line analysis.
///
/// Rewrites confusable characters according to `scope`, pads currency
/// markers with spaces, drops stray apostrophes/backticks, collapses space
/// runs and trims the result.
pub fn normalize(text: &str, scope: ConfusableScope) -> String {
    let text: Cow<'_, str> = match scope {
        ConfusableScope::Numeric => Cow::Owned(replace_confusables_near_digits(text)),
        ConfusableScope::Global => {
            Cow::Owned(text.chars().map(|c| confusable_digit(c).unwrap_or(c)).collect())
        }
        ConfusableScope::Off => Cow::Borrowed(text),
    };

    let text = text.replace('€', " € ");
    let text = re_euro_word().replace_all(&text, " EUR ");
    let text: String = text.chars().filter(|c| !matches!(c, '\'' | '´' | '`')).collect();
    re_space_run().replace_all(&text, " ").trim().to_string()
}

fn confusable_digit(c: char) -> Option<char> {
    match c {
        'O' => Some('0'),
        'l' | '|' => Some('1'),
        _ => None,
    }
}

// Confusables chain together when adjacent or split by a single separator
// ("lO,5O"). A chain is rewritten as a whole once any member touches a digit.
fn replace_confusables_near_digits(text: &str) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    let is_confusable = |c: char| confusable_digit(c).is_some();
    let mut start = 0;

    while start < chars.len() {
        if !is_confusable(chars[start]) {
            start += 1;
            continue;
        }

        let mut end = start;
        loop {
            match (chars.get(end + 1), chars.get(end + 2)) {
                (Some(&next), _) if is_confusable(next) => end += 1,
                (Some(&('.' | ',')), Some(&next)) if is_confusable(next) => end += 2,
                _ => break,
            }
        }

        let near_digit = (start..=end)
            .any(|i| is_confusable(chars[i]) && touches_digit(&chars, i));
        if near_digit {
            for c in &mut chars[start..=end] {
                *c = confusable_digit(*c).unwrap_or(*c);
            }
        }
        start = end + 1;
    }
    chars.into_iter().collect()
}

fn touches_digit(chars: &[char], i: usize) -> bool {
    let at = |j: usize| chars.get(j).copied();
    let digit = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit());
    let separator = |c: Option<char>| matches!(c, Some('.' | ','));

    let before = i.checked_sub(1).and_then(at);
    let before2 = i.checked_sub(2).and_then(at);
    let after = at(i + 1);
    let after2 = at(i + 2);

    digit(before)
        || digit(after)
        || (separator(before) && digit(before2))
        || (separator(after) && digit(after2))
}
