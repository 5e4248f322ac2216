use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    CreditCard,
    /// Employee's electronic payment, stored as `CONTANTI` for historical reasons.
    Electronic,
    Other,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::CreditCard, PaymentMethod::Electronic, PaymentMethod::Other];

    pub fn display_name(self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "Carta di Credito",
            PaymentMethod::Electronic => "Pag. Elettronico Dip.",
            PaymentMethod::Other => "Altro",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::CreditCard => write!(f, "CARTA_CREDITO"),
            PaymentMethod::Electronic => write!(f, "CONTANTI"),
            PaymentMethod::Other => write!(f, "ALTRO"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CARTA_CREDITO" => Ok(PaymentMethod::CreditCard),
            "CONTANTI" => Ok(PaymentMethod::Electronic),
            "ALTRO" => Ok(PaymentMethod::Other),
            other => Err(format!("Unknown payment method: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Meals,
    Lodging,
    Tolls,
    Parking,
    Fuel,
    OtherTransport,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 7] = [
        ExpenseCategory::Meals,
        ExpenseCategory::Lodging,
        ExpenseCategory::Tolls,
        ExpenseCategory::Parking,
        ExpenseCategory::Fuel,
        ExpenseCategory::OtherTransport,
        ExpenseCategory::Other,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ExpenseCategory::Meals => "Vitto",
            ExpenseCategory::Lodging => "Alloggio",
            ExpenseCategory::Tolls => "Pedaggi",
            ExpenseCategory::Parking => "Parcheggi",
            ExpenseCategory::Fuel => "Carburante",
            ExpenseCategory::OtherTransport => "Altri Mezzi",
            ExpenseCategory::Other => "Altro",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpenseCategory::Meals => write!(f, "VITTO"),
            ExpenseCategory::Lodging => write!(f, "ALLOGGIO"),
            ExpenseCategory::Tolls => write!(f, "PEDAGGI"),
            ExpenseCategory::Parking => write!(f, "PARCHEGGI"),
            ExpenseCategory::Fuel => write!(f, "CARBURANTE"),
            ExpenseCategory::OtherTransport => write!(f, "ALTRI_MEZZI"),
            ExpenseCategory::Other => write!(f, "ALTRO"),
        }
    }
}

impl FromStr for ExpenseCategory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VITTO" => Ok(ExpenseCategory::Meals),
            "ALLOGGIO" => Ok(ExpenseCategory::Lodging),
            "PEDAGGI" => Ok(ExpenseCategory::Tolls),
            "PARCHEGGI" => Ok(ExpenseCategory::Parking),
            "CARBURANTE" => Ok(ExpenseCategory::Fuel),
            "ALTRI_MEZZI" => Ok(ExpenseCategory::OtherTransport),
            "ALTRO" => Ok(ExpenseCategory::Other),
            other => Err(format!("Unknown expense category: '{other}'")),
        }
    }
}

/// Who fronted the money for an expense.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaidBy {
    #[default]
    Company,
    Employee,
}

impl PaidBy {
    pub fn display_name(self) -> &'static str {
        match self {
            PaidBy::Company => "Azienda",
            PaidBy::Employee => "Dipendente",
        }
    }
}

impl fmt::Display for PaidBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaidBy::Company => write!(f, "AZIENDA"),
            PaidBy::Employee => write!(f, "DIPENDENTE"),
        }
    }
}

impl FromStr for PaidBy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AZIENDA" => Ok(PaidBy::Company),
            "DIPENDENTE" => Ok(PaidBy::Employee),
            other => Err(format!("Unknown payer: '{other}'")),
        }
    }
}

/// A single expense attached to an expense note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: Option<i64>,
    pub note_id: i64,
    pub description: String,
    pub amount: Money,
    pub date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub category: ExpenseCategory,
    /// Photo of the receipt, if one was captured.
    pub receipt_path: Option<PathBuf>,
    pub paid_by: PaidBy,
}

impl Expense {
    /// Description shown in summaries; falls back to the category name when blank.
    pub fn label(&self) -> &str {
        if self.description.trim().is_empty() {
            self.category.display_name()
        } else {
            &self.description
        }
    }
}

/// The add-expense form while it is being filled in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub category: Option<ExpenseCategory>,
    pub receipt_path: Option<PathBuf>,
    pub paid_by: PaidBy,
}

impl ExpenseDraft {
    /// Builds the expense once every required field is present.
    pub fn finish(self, note_id: i64) -> Option<Expense> {
        let amount = self.amount.filter(|a| a.is_positive())?;
        Some(Expense {
            id: None,
            note_id,
            description: self.description,
            amount,
            date: self.date?,
            payment_method: self.payment_method?,
            category: self.category?,
            receipt_path: self.receipt_path,
            paid_by: self.paid_by,
        })
    }
}
