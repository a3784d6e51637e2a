//! Applies script rows to a [`LedgerStore`] and renders reports from it.
//!
//! The session plays the part of a UI collaborator: it validates input,
//! resolves script labels to store identifiers and only then calls into the
//! store.

use std::collections::HashMap;
use std::io::Write;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use super::{Report, ReportSpec};
use crate::analytics::{category_shares, Summary};
use crate::csv_utils::write_csv;
use crate::dto::{Action, CategoryRow, ExpenseRow, ScriptRow, SummaryRow, UserRow};
use crate::pagination::{filter_by_category, Page};
use crate::validation::{validate_expense, validate_user, ValidationError};
use crate::{Category, Error, ExpenseId, LedgerStore, UserId};

/// Why a script row was skipped.
#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("label `{0}` is already in use")]
    DuplicateLabel(String),
    #[error("unknown user `{0}`")]
    UnknownUser(String),
    #[error("unknown expense `{0}`")]
    UnknownExpense(String),
    #[error(transparent)]
    Store(#[from] Error),
}

struct ExpenseInput {
    user_id: UserId,
    category: Category,
    description: String,
    cost: Decimal,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, RowError> {
    value.ok_or(RowError::Missing(field))
}

#[derive(Debug, Default)]
pub struct ScriptSession {
    store: LedgerStore,
    users: HashMap<String, UserId>,
    user_labels: HashMap<UserId, String>,
    expenses: HashMap<String, ExpenseId>,
    expense_labels: HashMap<ExpenseId, String>,
    max_description: usize,
}

impl ScriptSession {
    pub fn new(max_description: usize) -> Self {
        Self {
            max_description,
            ..Self::default()
        }
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Applies a row, logging and skipping it if it is rejected.
    pub fn process(&mut self, row: ScriptRow) {
        let action = row.action;
        let reference = row.reference.clone();
        if let Err(err) = self.apply(row) {
            warn!(?action, reference = %reference, error = %err, "skipping script row");
        }
    }

    pub fn apply(&mut self, row: ScriptRow) -> Result<(), RowError> {
        match row.action {
            Action::CreateUser => {
                let first_name = required(row.first_name, "first_name")?;
                let last_name = required(row.last_name, "last_name")?;
                validate_user(&first_name, &last_name)?;
                if self.users.contains_key(&row.reference) {
                    return Err(RowError::DuplicateLabel(row.reference));
                }
                let user = self.store.create_user(first_name, last_name);
                self.user_labels.insert(user.id, row.reference.clone());
                self.users.insert(row.reference, user.id);
            }
            Action::UpdateUser => {
                let first_name = required(row.first_name, "first_name")?;
                let last_name = required(row.last_name, "last_name")?;
                validate_user(&first_name, &last_name)?;
                let id = self.user_id(&row.reference)?;
                self.store.update_user(id, first_name, last_name)?;
            }
            Action::DeleteUser => {
                let id = self.user_id(&row.reference)?;
                let cascaded = self.store.delete_user(id)?;
                if let Some(label) = self.user_labels.remove(&id) {
                    self.users.remove(&label);
                }
                for expense in cascaded {
                    self.forget_expense(expense.id);
                }
            }
            Action::CreateExpense => {
                if self.expenses.contains_key(&row.reference) {
                    return Err(RowError::DuplicateLabel(row.reference));
                }
                let reference = row.reference.clone();
                let input = self.expense_input(row)?;
                let expense = self.store.create_expense(
                    input.user_id,
                    input.category,
                    input.description,
                    input.cost,
                )?;
                self.expense_labels.insert(expense.id, reference.clone());
                self.expenses.insert(reference, expense.id);
            }
            Action::UpdateExpense => {
                let id = self.expense_id(&row.reference)?;
                let input = self.expense_input(row)?;
                self.store.update_expense(
                    id,
                    input.user_id,
                    input.category,
                    input.description,
                    input.cost,
                )?;
            }
            Action::DeleteExpense => {
                let id = self.expense_id(&row.reference)?;
                self.store.delete_expense(id)?;
                self.forget_expense(id);
            }
        }
        Ok(())
    }

    fn expense_input(&self, row: ScriptRow) -> Result<ExpenseInput, RowError> {
        let user = required(row.user, "user")?;
        let category = required(row.category, "category")?;
        let description = required(row.description, "description")?;
        let cost = required(row.cost, "cost")?;
        validate_expense(&description, cost, self.max_description)?;
        Ok(ExpenseInput {
            user_id: self.user_id(&user)?,
            category,
            description,
            cost,
        })
    }

    fn user_id(&self, label: &str) -> Result<UserId, RowError> {
        self.users
            .get(label)
            .copied()
            .ok_or_else(|| RowError::UnknownUser(label.to_owned()))
    }

    fn expense_id(&self, label: &str) -> Result<ExpenseId, RowError> {
        self.expenses
            .get(label)
            .copied()
            .ok_or_else(|| RowError::UnknownExpense(label.to_owned()))
    }

    fn forget_expense(&mut self, id: ExpenseId) {
        if let Some(label) = self.expense_labels.remove(&id) {
            self.expenses.remove(&label);
        }
    }

    fn user_label(&self, id: UserId) -> String {
        self.user_labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    fn expense_label(&self, id: ExpenseId) -> String {
        self.expense_labels
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    /// Writes the requested report as CSV.
    pub fn write_report<W: Write>(
        &self,
        writer: W,
        spec: &ReportSpec,
        page_size: usize,
    ) -> csv::Result<()> {
        match spec.report {
            Report::Users => {
                let mut users = self.store.users();
                if let Some(number) = spec.page {
                    users = Page::of(users, number, page_size).items;
                }
                let rows = users.into_iter().map(|u| UserRow {
                    user: self.user_label(u.user.id),
                    first_name: u.user.first_name,
                    last_name: u.user.last_name,
                    total: u.total,
                });
                write_csv(writer, rows)
            }
            Report::Expenses => {
                let mut expenses = filter_by_category(self.store.expenses(), spec.category);
                if let Some(number) = spec.page {
                    expenses = Page::of(expenses, number, page_size).items;
                }
                let rows = expenses.into_iter().map(|e| ExpenseRow {
                    expense: self.expense_label(e.id),
                    user: self.user_label(e.user_id),
                    user_name: e.user_name,
                    category: e.category,
                    description: e.description,
                    cost: e.cost,
                });
                write_csv(writer, rows)
            }
            Report::Categories => {
                let rows = category_shares(&self.store)
                    .into_iter()
                    .map(|share| CategoryRow {
                        category: share.category,
                        total: share.total,
                        share: share.percent_of_highest,
                    });
                write_csv(writer, rows)
            }
            Report::Summary => {
                let summary = Summary::from_store(&self.store);
                let row = SummaryRow {
                    total_expenses: summary.total_expenses,
                    expense_count: summary.expense_count,
                    average_expense: summary.average_expense,
                    user_count: summary.user_count,
                    top_spender: summary.top_spender.map(|u| self.user_label(u.user.id)),
                    top_spender_expense_count: summary.top_spender_expense_count,
                };
                write_csv(writer, std::iter::once(row))
            }
        }
    }
}
