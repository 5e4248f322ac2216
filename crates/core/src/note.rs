use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expense::{Expense, ExpenseCategory, PaidBy, PaymentMethod};
use crate::money::Money;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("Traveler name is required")]
    MissingTraveler,
    #[error("Trip ends ({end}) before it starts ({start})")]
    TripEndsBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("Negative value for {0}")]
    Negative(&'static str),
}

/// A business trip (nota spese) and its mileage terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseNote {
    pub id: Option<i64>,
    /// Filled in later by the administration office; may be blank.
    pub number: String,
    pub traveler: String,
    pub trip_start: NaiveDate,
    pub trip_start_time: Option<NaiveTime>,
    pub trip_end: NaiveDate,
    pub trip_end_time: Option<NaiveTime>,
    pub location: String,
    pub client: String,
    pub purpose: String,
    pub vehicle: String,
    pub filed_on: NaiveDate,
    pub other_travelers: String,
    pub advance: Money,
    pub km_driven: Decimal,
    /// Per-km rate refunded to the traveler.
    pub km_rate_reimbursed: Money,
    /// Per-km rate billed to the client.
    pub km_rate_client: Money,
}

impl ExpenseNote {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.traveler.trim().is_empty() {
            return Err(ModelError::MissingTraveler);
        }
        if self.trip_end < self.trip_start {
            return Err(ModelError::TripEndsBeforeStart {
                start: self.trip_start,
                end: self.trip_end,
            });
        }
        if self.km_driven.is_sign_negative() && !self.km_driven.is_zero() {
            return Err(ModelError::Negative("km_driven"));
        }
        if self.advance.as_decimal().is_sign_negative() && !self.advance.is_zero() {
            return Err(ModelError::Negative("advance"));
        }
        Ok(())
    }

    pub fn mileage_reimbursement(&self) -> Money {
        self.km_rate_reimbursed * self.km_driven
    }

    pub fn mileage_client_cost(&self) -> Money {
        self.km_rate_client * self.km_driven
    }

    pub fn is_single_day(&self) -> bool {
        self.trip_start == self.trip_end
    }
}

/// An expense note together with its expenses, plus the report totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteSummary {
    pub note: ExpenseNote,
    pub expenses: Vec<Expense>,
}

impl NoteSummary {
    pub fn new(note: ExpenseNote, expenses: Vec<Expense>) -> Self {
        Self { note, expenses }
    }

    pub fn total_expenses(&self) -> Money {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// Total minus the advance already paid out.
    pub fn total_due(&self) -> Money {
        self.total_expenses() - self.note.advance
    }

    pub fn total_by_payment_method(&self, method: PaymentMethod) -> Money {
        self.expenses
            .iter()
            .filter(|e| e.payment_method == method)
            .map(|e| e.amount)
            .sum()
    }

    pub fn total_by_payer(&self, payer: PaidBy) -> Money {
        self.expenses_paid_by(payer).map(|e| e.amount).sum()
    }

    pub fn total_by_category(&self, category: ExpenseCategory) -> Money {
        self.expenses
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.amount)
            .sum()
    }

    /// Employee-paid expenses plus mileage, less the advance.
    pub fn employee_reimbursement(&self) -> Money {
        self.employee_reimbursement_gross() - self.note.advance
    }

    pub fn employee_reimbursement_gross(&self) -> Money {
        self.total_by_payer(PaidBy::Employee) + self.note.mileage_reimbursement()
    }

    /// Every expense plus the mileage refund.
    pub fn overall_cost(&self) -> Money {
        self.total_expenses() + self.note.mileage_reimbursement()
    }

    pub fn expenses_paid_by(&self, payer: PaidBy) -> impl Iterator<Item = &Expense> + '_ {
        self.expenses.iter().filter(move |e| e.paid_by == payer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn note() -> ExpenseNote {
        ExpenseNote {
            id: Some(1),
            number: String::new(),
            traveler: "Mario Rossi".into(),
            trip_start: date(2024, 3, 11),
            trip_start_time: NaiveTime::from_hms_opt(8, 30, 0),
            trip_end: date(2024, 3, 12),
            trip_end_time: None,
            location: "Milano".into(),
            client: "ACME S.p.A.".into(),
            purpose: "Installazione".into(),
            vehicle: "Aziendale".into(),
            filed_on: date(2024, 3, 13),
            other_travelers: String::new(),
            advance: Money::from_cents(5000),
            km_driven: Decimal::from(200),
            km_rate_reimbursed: Money::from_cents(40),
            km_rate_client: Money::from_cents(60),
        }
    }

    fn expense(cents: i64, method: PaymentMethod, category: ExpenseCategory, paid_by: PaidBy) -> Expense {
        Expense {
            id: None,
            note_id: 1,
            description: String::new(),
            amount: Money::from_cents(cents),
            date: date(2024, 3, 11),
            payment_method: method,
            category,
            receipt_path: None,
            paid_by,
        }
    }

    fn summary() -> NoteSummary {
        NoteSummary::new(
            note(),
            vec![
                expense(4590, PaymentMethod::CreditCard, ExpenseCategory::Meals, PaidBy::Company),
                expense(8900, PaymentMethod::CreditCard, ExpenseCategory::Lodging, PaidBy::Company),
                expense(1250, PaymentMethod::Electronic, ExpenseCategory::Parking, PaidBy::Employee),
                expense(760, PaymentMethod::Other, ExpenseCategory::Tolls, PaidBy::Employee),
            ],
        )
    }

    #[test]
    fn mileage_totals() {
        let n = note();
        assert_eq!(n.mileage_reimbursement().to_cents(), Some(8000));
        assert_eq!(n.mileage_client_cost().to_cents(), Some(12000));
    }

    #[test]
    fn totals_by_dimension() {
        let s = summary();
        assert_eq!(s.total_expenses().to_cents(), Some(15500));
        assert_eq!(s.total_due().to_cents(), Some(10500));
        assert_eq!(s.total_by_payment_method(PaymentMethod::CreditCard).to_cents(), Some(13490));
        assert_eq!(s.total_by_payment_method(PaymentMethod::Electronic).to_cents(), Some(1250));
        assert_eq!(s.total_by_payer(PaidBy::Employee).to_cents(), Some(2010));
        assert_eq!(s.total_by_category(ExpenseCategory::Fuel), Money::zero());
        assert_eq!(s.expenses_paid_by(PaidBy::Company).count(), 2);
    }

    #[test]
    fn employee_reimbursement_subtracts_advance() {
        let s = summary();
        // 20,10 employee-paid + 80,00 mileage
        assert_eq!(s.employee_reimbursement_gross().to_cents(), Some(10010));
        assert_eq!(s.employee_reimbursement().to_cents(), Some(5010));
        assert_eq!(s.overall_cost().to_cents(), Some(23500));
    }

    #[test]
    fn empty_note_totals_are_zero() {
        let s = NoteSummary::new(ExpenseNote { advance: Money::zero(), ..note() }, vec![]);
        assert!(s.total_expenses().is_zero());
        assert!(s.total_due().is_zero());
    }

    #[test]
    fn validate_rejects_blank_traveler() {
        let n = ExpenseNote { traveler: " ".into(), ..note() };
        assert_eq!(n.validate(), Err(ModelError::MissingTraveler));
    }

    #[test]
    fn validate_rejects_reversed_dates() {
        let n = ExpenseNote { trip_end: date(2024, 3, 1), ..note() };
        assert!(matches!(n.validate(), Err(ModelError::TripEndsBeforeStart { .. })));
    }

    #[test]
    fn validate_rejects_negative_km() {
        let n = ExpenseNote { km_driven: Decimal::from_str("-1").unwrap(), ..note() };
        assert_eq!(n.validate(), Err(ModelError::Negative("km_driven")));
    }

    #[test]
    fn validate_accepts_complete_note() {
        assert!(note().validate().is_ok());
        assert!(!note().is_single_day());
    }

    #[test]
    fn summary_serializes() {
        let json = serde_json::to_string(&summary()).unwrap();
        assert!(json.contains("\"traveler\":\"Mario Rossi\""));
    }
}
