pub mod expense;
pub mod money;
pub mod note;

pub use expense::{Expense, ExpenseCategory, ExpenseDraft, PaidBy, PaymentMethod};
pub use money::Money;
pub use note::{ExpenseNote, ModelError, NoteSummary};
