//! In-memory ledger of users and their expenses, with per-user and
//! per-category totals kept in step with every mutation.

pub mod analytics;
pub mod config;
mod csv_utils;
mod dto;
mod error;
mod ledger;
pub mod pagination;
mod runner;
mod stores;
pub mod validation;

use std::sync::Once;

pub use config::Config;
pub use csv_utils::{read_csv, write_csv};
pub use dto::{format_money, Action, Category, ScriptRow, UnknownCategory};
pub use error::Error;
pub use ledger::{CategoryTotal, LedgerStore, UserWithTotal};
pub use runner::{
    run, run_async, Report, ReportSpec, RowError, RunnerError, ScriptSession, UnknownReport,
};
pub use stores::{Expense, ExpenseId, User, UserId};

static INIT_TRACING: Once = Once::new();

/// Installs the global tracing subscriber. Honours `RUST_LOG`, defaulting to
/// `expense_ledger=info`. Output goes to stderr so reports on stdout stay
/// machine-readable. Safe to call more than once.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("expense_ledger=info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
