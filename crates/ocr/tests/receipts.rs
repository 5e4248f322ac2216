use std::str::FromStr;

use notaspese_ocr::{extract_total, PatternSet, ReceiptTotalExtractor, Strategy, Tier};
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

// ── Realistic receipts ────────────────────────────────────────────────────────

const SUPERMARKET: &str = "\
CONAD SUPERSTORE
Via Roma 12 - Bologna
P.IVA 01234567890
DOCUMENTO COMMERCIALE
di vendita o prestazione
PANE COMUNE        1,20
LATTE INTERO       1,49
PARMIGIANO 300G    6,90
SUBTOTALE          9,59
SCONTO FIDELITY   -0,50
TOTALE COMPLESSIVO 9,09
CONTANTI          10,00
RESTO              0,91
PUNTI ACCUMULATI   9
";

const RESTAURANT: &str = "\
RISTORANTE LA PERGOLA
COPERTI 2 X 2,50     5,00
TAGLIATELLE          12,00
BISTECCA 1.2KG       48,00
VINO ROSSO           18,00
TOTALE EURO          83,00
CONTANTI            100,00
RESTO                17,00
";

const US_STORE: &str = "\
BEST BUY #1234
HDMI CABLE          19.99
LAPTOP           1,299.00
SUBTOTAL         1,318.99
SALES TAX          105.52
TOTAL            1,424.51
VISA             1,424.51
CHANGE               0.00
";

const MOTORWAY: &str = "\
AUTOSTRADE PER L'ITALIA
CASELLO MILANO SUD
CLASSE A
IMPORTO EUR 7,40
PAGATO CON TELEPASS
";

const NOISY_BAR: &str = "\
BAR SPORT
CAFFE 1,1O
CORNETTO 1,3O
T0TALE 2,4O
";

#[test]
fn supermarket_receipt() {
    let r = ReceiptTotalExtractor::new().analyze(SUPERMARKET);
    assert_eq!(r.total, Some(dec("9.09")));
    assert_eq!(r.strategy, Strategy::Labeled(Tier::High));
    // Subtotal, discount, change and points lines never become candidates.
    assert!(r.candidates.iter().all(|c| c.amount != dec("9.59")));
    assert!(r.candidates.iter().all(|c| c.amount != dec("0.91")));
}

#[test]
fn restaurant_total_beats_larger_cash_line() {
    let r = ReceiptTotalExtractor::new().analyze(RESTAURANT);
    assert_eq!(r.total, Some(dec("83.00")));
    assert_eq!(r.strategy, Strategy::Labeled(Tier::High));
}

#[test]
fn us_receipt_with_thousands() {
    assert_eq!(extract_total(US_STORE), Some(dec("1424.51")));
}

#[test]
fn motorway_toll_importo() {
    let r = ReceiptTotalExtractor::new().analyze(MOTORWAY);
    assert_eq!(r.total, Some(dec("7.40")));
    assert_eq!(r.strategy, Strategy::Labeled(Tier::Medium));
}

#[test]
fn misread_label_falls_back_to_trailing_lines() {
    let r = ReceiptTotalExtractor::new().analyze(NOISY_BAR);
    assert_eq!(r.total, Some(dec("2.40")));
    assert_eq!(r.strategy, Strategy::TrailingLines);
}

#[test]
fn idempotent_on_realistic_input() {
    for text in [SUPERMARKET, RESTAURANT, US_STORE, MOTORWAY, NOISY_BAR] {
        assert_eq!(extract_total(text), extract_total(text));
    }
}

// ── Generated inputs ──────────────────────────────────────────────────────────

/// Small deterministic generator so failures are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

const FRAGMENTS: &[&str] = &[
    "TOTALE", "TOTAL", "EURO", "EUR", "€", " ", " ", "\n", "\r\n", "12,50", "1.234,56", "1,234.56",
    "0,00", "0.01", "99999,99", "100.000,00", "999.999,99", "IVA", "SUBTOTALE", "RESTO", "CONTANTI",
    "O", "l", "|", ",", ".", "'", "9", "12345", "€ 5", "EUR 15", "2,5", "3.", "ÀÈÌ", "DA PAGARE",
    "IMPORTO", "POS", "1O,5O", "7,777,77", "12,50,3",
];

fn random_text(rng: &mut Lcg) -> String {
    let len = rng.below(24) as usize;
    (0..len)
        .map(|_| FRAGMENTS[rng.below(FRAGMENTS.len() as u64) as usize])
        .collect()
}

#[test]
fn result_is_always_none_or_in_range() {
    let mut rng = Lcg(0x5eed);
    let lo = dec("0.01");
    let hi = dec("99999.99");
    for _ in 0..2000 {
        let text = random_text(&mut rng);
        if let Some(total) = extract_total(&text) {
            assert!(total >= lo && total <= hi, "{total} out of range for {text:?}");
        }
    }
}

#[test]
fn extraction_is_deterministic() {
    let extractor = ReceiptTotalExtractor::new();
    let mut rng = Lcg(42);
    for _ in 0..500 {
        let text = random_text(&mut rng);
        let first = extractor.analyze(&text);
        let second = extractor.analyze(&text);
        assert_eq!(first.total, second.total, "{text:?}");
        assert_eq!(first.strategy, second.strategy, "{text:?}");
        assert_eq!(first.candidates, second.candidates, "{text:?}");
        assert_eq!(first.total, extract_total(&text));
    }
}

#[test]
fn labeled_total_comes_from_the_highest_tier() {
    let extractor = ReceiptTotalExtractor::new();
    let mut rng = Lcg(7);
    for _ in 0..500 {
        let text = random_text(&mut rng);
        let r = extractor.analyze(&text);
        if let Strategy::Labeled(tier) = r.strategy {
            let top = r.candidates.iter().map(|c| c.priority).max();
            assert_eq!(top, Some(tier), "{text:?}");
            let best = r.candidates_at(tier).map(|c| c.amount).max();
            assert_eq!(r.total, best, "{text:?}");
        }
    }
}

#[test]
fn unlabeled_receipt_uses_last_five_lines() {
    let mut rng = Lcg(2024);
    for _ in 0..200 {
        let count = 1 + rng.below(12) as usize;
        let amounts: Vec<Decimal> = (0..count)
            .map(|_| Decimal::new(100 + rng.below(99_900) as i64, 2))
            .collect();
        let text: String = amounts
            .iter()
            .map(|a| format!("X {}\n", a.to_string().replace('.', ",")))
            .collect();

        let expected = amounts[count.saturating_sub(5)..].iter().copied().max();
        let r = ReceiptTotalExtractor::new().analyze(&text);
        assert_eq!(r.total, expected, "{text:?}");
        assert_eq!(r.strategy, Strategy::TrailingLines);
    }
}

#[test]
fn overlapping_formats_yield_one_reading_per_token() {
    let x = ReceiptTotalExtractor::new();
    for (line, expected) in [
        ("1.234,56", "1234.56"),
        ("1,234.56", "1234.56"),
        ("12.345,67", "12345.67"),
        ("€ 1.234,56", "1234.56"),
        ("EUR 12,50", "12.50"),
    ] {
        assert_eq!(x.amounts_in(line), vec![dec(expected)], "{line}");
    }
}

#[test]
fn german_receipt_with_bundled_patterns() {
    let patterns = PatternSet::from_toml(include_str!("../patterns/de.toml")).unwrap();
    let x = ReceiptTotalExtractor::with_patterns(patterns);
    let text = "BAECKEREI MUELLER\nBROETCHEN 0,45\nZWISCHENSUMME 4,35\nMWST 7% 0,28\nZU ZAHLEN 4,35\nBAR 10,00\nRUECKGELD 5,65";
    let r = x.analyze(text);
    assert_eq!(r.total, Some(dec("4.35")));
    assert_eq!(r.strategy, Strategy::Labeled(Tier::High));
}
