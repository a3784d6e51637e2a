//! Domain-specific errors for the expense ledger.
//!
//! The store fails when a referenced user or expense does not exist at call
//! time, or when a cost would push a total outside the decimal range. Input
//! validation (names, descriptions, costs) belongs to the callers and lives
//! in [`crate::validation`].
//!
//! A failed operation never leaves a partial mutation behind.

use thiserror::Error;

use crate::stores::{ExpenseId, UserId};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("user not found: {0}")]
    UserNotFound(UserId),
    #[error("expense not found: {0}")]
    ExpenseNotFound(ExpenseId),
    #[error("total would overflow")]
    TotalOverflow,
}
