//! Storage layer for the expense ledger. Provides storage for:
//! - User records ([`UsersStore`])
//! - Expense records with a per-user index ([`ExpensesStore`])
//! - Per-user and per-category running totals ([`Totals`])
//!
//! Current implementation is optimized for synchronous, direct memory
//! access. The stores know nothing about each other; keeping them
//! consistent is the job of [`crate::LedgerStore`].

mod expenses;
mod totals;
mod users;

pub use expenses::{Expense, ExpenseFields, ExpenseId, ExpensesStore};
pub use totals::{Adjustment, Totals};
pub use users::{User, UserId, UsersStore};
