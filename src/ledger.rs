use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::stores::{
    Adjustment, Expense, ExpenseFields, ExpenseId, ExpensesStore, Totals, User, UserId,
    UsersStore,
};
use crate::{Category, Error};

/// A user annotated with the sum of its expense costs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserWithTotal {
    #[serde(flatten)]
    pub user: User,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
}

/// The normalized store of users and expenses together with the aggregate
/// tables derived from them.
///
/// Every mutating call checks that the identifiers it references exist and
/// that the resulting totals fit before touching anything, so an `Err`
/// always leaves the store unchanged. Aggregates are adjusted in the same
/// call as the records they summarize.
#[derive(Debug, Default)]
pub struct LedgerStore {
    users: UsersStore,
    expenses: ExpensesStore,
    totals: Totals,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self {
            users: UsersStore::new(),
            expenses: ExpensesStore::new(),
            totals: Totals::new(),
        }
    }

    pub fn create_user(
        &mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> User {
        let user = self.users.insert(first_name.into(), last_name.into()).clone();
        self.totals.open_user(user.id);
        debug!(user = %user.id, "user created");
        user
    }

    /// Renames a user and refreshes the display name cached on each of its
    /// expenses. Aggregates are not affected.
    pub fn update_user(
        &mut self,
        id: UserId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Result<(), Error> {
        let user = self.users.get_mut(id)?;
        user.first_name = first_name.into();
        user.last_name = last_name.into();
        let display_name = user.display_name();

        let refreshed = self.expenses.rename_user(id, &display_name);
        debug!(user = %id, refreshed, "user updated");
        Ok(())
    }

    /// Deletes a user together with all of its expenses, removing their
    /// costs from the category totals. Returns the cascaded expenses.
    pub fn delete_user(&mut self, id: UserId) -> Result<Vec<Expense>, Error> {
        self.users.get(id)?;
        let mut adjustment = Adjustment::new();
        for expense in self.expenses.for_user(id) {
            adjustment.category(expense.category, -expense.cost);
        }
        self.totals.apply(&adjustment)?;

        self.users.remove(id)?;
        let removed = self.expenses.remove_for_user(id);
        self.totals.close_user(id);
        debug!(user = %id, cascaded = removed.len(), "user deleted");
        Ok(removed)
    }

    pub fn create_expense(
        &mut self,
        user_id: UserId,
        category: Category,
        description: impl Into<String>,
        cost: Decimal,
    ) -> Result<Expense, Error> {
        let user_name = self.users.get(user_id)?.display_name();
        self.totals.apply(
            Adjustment::new()
                .user(user_id, cost)
                .category(category, cost),
        )?;
        let expense = self
            .expenses
            .insert(ExpenseFields {
                user_id,
                category,
                description: description.into(),
                cost,
                user_name,
            })
            .clone();
        debug!(expense = %expense.id, user = %user_id, %category, %cost, "expense created");
        Ok(expense)
    }

    /// Rewrites an expense in place. Aggregates are adjusted relative to the
    /// previously stored values:
    /// - a changed owner moves the old cost out of the old user's total and
    ///   the new cost into the new user's total, otherwise the owner's total
    ///   moves by the cost delta;
    /// - the same rule applies independently to the category totals.
    pub fn update_expense(
        &mut self,
        id: ExpenseId,
        user_id: UserId,
        category: Category,
        description: impl Into<String>,
        cost: Decimal,
    ) -> Result<(), Error> {
        // Both lookups and the totals must succeed before any record is written.
        let previous = self.expenses.get(id)?.clone();
        let user_name = self.users.get(user_id)?.display_name();

        let mut adjustment = Adjustment::new();
        if previous.user_id != user_id {
            adjustment
                .user(previous.user_id, -previous.cost)
                .user(user_id, cost);
        } else if previous.cost != cost {
            adjustment.user(user_id, cost_delta(cost, previous.cost)?);
        }
        if previous.category != category {
            adjustment
                .category(previous.category, -previous.cost)
                .category(category, cost);
        } else if previous.cost != cost {
            adjustment.category(category, cost_delta(cost, previous.cost)?);
        }
        self.totals.apply(&adjustment)?;

        self.expenses.replace(
            id,
            ExpenseFields {
                user_id,
                category,
                description: description.into(),
                cost,
                user_name,
            },
        )?;
        debug!(expense = %id, user = %user_id, %category, %cost, "expense updated");
        Ok(())
    }

    /// Deletes an expense and subtracts its cost from both aggregates.
    /// Returns the removed record.
    pub fn delete_expense(&mut self, id: ExpenseId) -> Result<Expense, Error> {
        let existing = self.expenses.get(id)?;
        self.totals.apply(
            Adjustment::new()
                .user(existing.user_id, -existing.cost)
                .category(existing.category, -existing.cost),
        )?;
        let removed = self.expenses.remove(id)?;
        debug!(expense = %id, user = %removed.user_id, "expense deleted");
        Ok(removed)
    }

    /// Users in creation order, each with its current total.
    pub fn users(&self) -> Vec<UserWithTotal> {
        self.users
            .iter()
            .map(|user| UserWithTotal {
                user: user.clone(),
                total: self.totals.user(user.id).unwrap_or(Decimal::ZERO),
            })
            .collect()
    }

    /// All expenses in creation order.
    pub fn expenses(&self) -> Vec<Expense> {
        self.expenses.iter().cloned().collect()
    }

    /// Totals for every category, in [`Category::ALL`] order.
    pub fn category_totals(&self) -> Vec<CategoryTotal> {
        self.totals
            .categories()
            .map(|(category, total)| CategoryTotal { category, total })
            .collect()
    }

    pub fn user(&self, id: UserId) -> Result<&User, Error> {
        self.users.get(id)
    }

    pub fn expense(&self, id: ExpenseId) -> Result<&Expense, Error> {
        self.expenses.get(id)
    }

    pub fn user_total(&self, id: UserId) -> Result<Decimal, Error> {
        self.users.get(id)?;
        Ok(self.totals.user(id).unwrap_or(Decimal::ZERO))
    }

    pub fn category_total(&self, category: Category) -> Decimal {
        self.totals.category(category)
    }

    /// Sum of every expense cost.
    pub fn total_expenses(&self) -> Decimal {
        self.totals.overall()
    }

    /// Expenses owned by a user, in creation order.
    pub fn expenses_for_user(&self, id: UserId) -> Result<Vec<&Expense>, Error> {
        self.users.get(id)?;
        Ok(self.expenses.for_user(id))
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn expense_count(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.expenses.is_empty()
    }

    /// Rebuilds both aggregate tables from the primary records.
    fn recomputed_totals(&self) -> Result<Totals, Error> {
        let mut totals = Totals::new();
        for user in self.users.iter() {
            totals.open_user(user.id);
        }
        for expense in self.expenses.iter() {
            totals.apply(
                Adjustment::new()
                    .user(expense.user_id, expense.cost)
                    .category(expense.category, expense.cost),
            )?;
        }
        Ok(totals)
    }

    /// Returns true when the incrementally maintained aggregates match a
    /// full recomputation.
    pub fn check_consistency(&self) -> bool {
        self.recomputed_totals()
            .is_ok_and(|recomputed| recomputed == self.totals)
    }

    /// Replaces the aggregates with a full recomputation. Returns true if
    /// anything had drifted. The aggregates are left alone if the
    /// recomputation itself overflows.
    pub fn reconcile(&mut self) -> bool {
        let recomputed = match self.recomputed_totals() {
            Ok(recomputed) => recomputed,
            Err(err) => {
                tracing::warn!(error = %err, "aggregates could not be rebuilt");
                return false;
            }
        };
        let drifted = self.totals != recomputed;
        if drifted {
            tracing::warn!("aggregate drift detected, totals rebuilt");
            self.totals = recomputed;
        }
        drifted
    }
}

fn cost_delta(cost: Decimal, previous: Decimal) -> Result<Decimal, Error> {
    cost.checked_sub(previous).ok_or(Error::TotalOverflow)
}
