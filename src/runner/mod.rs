//! The runner is responsible for reading a ledger script from CSV, applying
//! each row to a fresh store, and writing the requested report to a writer.
//!
//! This module provides both a synchronous and an asynchronous runner implementations.
//!
mod async_runner;
mod session;
mod sync_runner;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::Category;

pub use async_runner::run as run_async;
pub use session::{RowError, ScriptSession};
pub use sync_runner::run;

/// Which projection a run writes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Users,
    Expenses,
    Categories,
    Summary,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown report `{0}` (expected users, expenses, categories or summary)")]
pub struct UnknownReport(pub String);

impl FromStr for Report {
    type Err = UnknownReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "users" => Ok(Report::Users),
            "expenses" => Ok(Report::Expenses),
            "categories" => Ok(Report::Categories),
            "summary" => Ok(Report::Summary),
            _ => Err(UnknownReport(s.to_owned())),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Report::Users => "users",
            Report::Expenses => "expenses",
            Report::Categories => "categories",
            Report::Summary => "summary",
        })
    }
}

/// A report plus the optional paging and filtering applied to list reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSpec {
    pub report: Report,
    /// 1-based page of the users or expenses list; `None` writes every row.
    pub page: Option<usize>,
    /// Restricts the expenses report to one category.
    pub category: Option<Category>,
}

impl ReportSpec {
    pub fn new(report: Report) -> Self {
        Self {
            report,
            page: None,
            category: None,
        }
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV error: {0}")]
    AsyncCsv(#[from] csv_async::Error),
    #[error("task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
