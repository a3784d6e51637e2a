//! Expense records, indexed by identifier and by owning user.
//!
//! The per-user index lets cascading deletes and display-name refreshes
//! touch only the affected records instead of scanning every expense.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

use super::UserId;
use crate::{Category, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(Uuid);

impl ExpenseId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub user_id: UserId,
    pub category: Category,
    pub description: String,
    pub cost: Decimal,
    /// Display name of the owning user at the time of the last write.
    pub user_name: String,
}

/// Field values written by an insert or a replace. The identifier is owned
/// by the store.
#[derive(Debug, Clone)]
pub struct ExpenseFields {
    pub user_id: UserId,
    pub category: Category,
    pub description: String,
    pub cost: Decimal,
    pub user_name: String,
}

#[derive(Debug)]
struct StoredExpense {
    expense: Expense,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct ExpensesStore {
    expenses: HashMap<ExpenseId, StoredExpense>,
    /// Expense IDs owned by each user
    by_user: HashMap<UserId, HashSet<ExpenseId>>,
    next_seq: u64,
}

impl ExpensesStore {
    pub fn new() -> Self {
        Self {
            expenses: HashMap::new(),
            by_user: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Stores a new expense under a freshly generated identifier.
    pub fn insert(&mut self, fields: ExpenseFields) -> &Expense {
        let id = loop {
            let candidate = ExpenseId::generate();
            if !self.expenses.contains_key(&candidate) {
                break candidate;
            }
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        self.by_user.entry(fields.user_id).or_default().insert(id);
        &self
            .expenses
            .entry(id)
            .or_insert(StoredExpense {
                expense: Expense {
                    id,
                    user_id: fields.user_id,
                    category: fields.category,
                    description: fields.description,
                    cost: fields.cost,
                    user_name: fields.user_name,
                },
                seq,
            })
            .expense
    }

    pub fn get(&self, id: ExpenseId) -> Result<&Expense, Error> {
        self.expenses
            .get(&id)
            .map(|stored| &stored.expense)
            .ok_or(Error::ExpenseNotFound(id))
    }

    /// Overwrites every field of an existing expense, keeping its identifier
    /// and position. Returns the previous record.
    pub fn replace(&mut self, id: ExpenseId, fields: ExpenseFields) -> Result<Expense, Error> {
        let stored = self
            .expenses
            .get_mut(&id)
            .ok_or(Error::ExpenseNotFound(id))?;
        let new = Expense {
            id,
            user_id: fields.user_id,
            category: fields.category,
            description: fields.description,
            cost: fields.cost,
            user_name: fields.user_name,
        };
        let previous = std::mem::replace(&mut stored.expense, new);

        if previous.user_id != fields.user_id {
            self.unlink(previous.user_id, id);
            self.by_user.entry(fields.user_id).or_default().insert(id);
        }
        Ok(previous)
    }

    pub fn remove(&mut self, id: ExpenseId) -> Result<Expense, Error> {
        let stored = self
            .expenses
            .remove(&id)
            .ok_or(Error::ExpenseNotFound(id))?;
        self.unlink(stored.expense.user_id, id);
        Ok(stored.expense)
    }

    /// Removes every expense owned by `user_id`, returning them in creation
    /// order.
    pub fn remove_for_user(&mut self, user_id: UserId) -> Vec<Expense> {
        let ids = self.by_user.remove(&user_id).unwrap_or_default();
        let mut removed: Vec<_> = ids
            .into_iter()
            .filter_map(|id| self.expenses.remove(&id))
            .collect();
        removed.sort_by_key(|s| s.seq);
        removed.into_iter().map(|s| s.expense).collect()
    }

    /// Rewrites the cached display name on every expense owned by `user_id`.
    /// Returns how many records were touched.
    pub fn rename_user(&mut self, user_id: UserId, user_name: &str) -> usize {
        let Some(ids) = self.by_user.get(&user_id) else {
            return 0;
        };
        let mut touched = 0;
        for id in ids {
            if let Some(stored) = self.expenses.get_mut(id) {
                stored.expense.user_name = user_name.to_owned();
                touched += 1;
            }
        }
        touched
    }

    /// Expenses owned by `user_id`, in creation order.
    pub fn for_user(&self, user_id: UserId) -> Vec<&Expense> {
        let mut stored: Vec<_> = self
            .by_user
            .get(&user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.expenses.get(id))
            .collect();
        stored.sort_by_key(|s| s.seq);
        stored.into_iter().map(|s| &s.expense).collect()
    }

    /// Iterates expenses in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Expense> {
        let mut stored: Vec<_> = self.expenses.values().collect();
        stored.sort_by_key(|s| s.seq);
        stored.into_iter().map(|s| &s.expense)
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    fn unlink(&mut self, user_id: UserId, id: ExpenseId) {
        if let Some(ids) = self.by_user.get_mut(&user_id) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_user.remove(&user_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn fields(user_id: UserId, category: Category, cost: Decimal) -> ExpenseFields {
        ExpenseFields {
            user_id,
            category,
            description: "lunch".into(),
            cost,
            user_name: "Ann Lee".into(),
        }
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = ExpensesStore::new();
        assert!(store.is_empty());
        assert!(store.get(ExpenseId::generate()).is_err());
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = ExpensesStore::new();
        let user = UserId::generate();
        let id = store.insert(fields(user, Category::Meals, dec!(12.50))).id;

        let expense = store.get(id).unwrap();
        assert_eq!(expense.user_id, user);
        assert_eq!(expense.category, Category::Meals);
        assert_eq!(expense.cost, dec!(12.50));
        assert_eq!(expense.user_name, "Ann Lee");
        assert_eq!(store.for_user(user).len(), 1);
    }

    #[test]
    fn test_replace_keeps_id_and_moves_index() {
        let mut store = ExpensesStore::new();
        let ann = UserId::generate();
        let bob = UserId::generate();
        let id = store.insert(fields(ann, Category::Meals, dec!(10))).id;

        let mut update = fields(bob, Category::Travel, dec!(20));
        update.user_name = "Bob Ray".into();
        let previous = store.replace(id, update).unwrap();

        assert_eq!(previous.user_id, ann);
        assert_eq!(previous.cost, dec!(10));
        let current = store.get(id).unwrap();
        assert_eq!(current.id, id);
        assert_eq!(current.user_id, bob);
        assert_eq!(current.user_name, "Bob Ray");
        assert!(store.for_user(ann).is_empty());
        assert_eq!(store.for_user(bob).len(), 1);
    }

    #[test]
    fn test_replace_nonexistent_expense() {
        let mut store = ExpensesStore::new();
        let id = ExpenseId::generate();
        let result = store.replace(id, fields(UserId::generate(), Category::Other, dec!(1)));
        assert_eq!(result, Err(Error::ExpenseNotFound(id)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_expense() {
        let mut store = ExpensesStore::new();
        let user = UserId::generate();
        let id = store.insert(fields(user, Category::Meals, dec!(5))).id;

        let removed = store.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(store.is_empty());
        assert!(store.for_user(user).is_empty());
        assert_eq!(store.remove(id), Err(Error::ExpenseNotFound(id)));
    }

    #[test]
    fn test_remove_for_user_only_touches_that_user() {
        let mut store = ExpensesStore::new();
        let ann = UserId::generate();
        let bob = UserId::generate();
        store.insert(fields(ann, Category::Meals, dec!(1)));
        store.insert(fields(bob, Category::Meals, dec!(2)));
        store.insert(fields(ann, Category::Travel, dec!(3)));

        let removed = store.remove_for_user(ann);
        let costs: Vec<_> = removed.iter().map(|e| e.cost).collect();
        assert_eq!(costs, vec![dec!(1), dec!(3)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.for_user(bob).len(), 1);
        assert!(store.remove_for_user(ann).is_empty());
    }

    #[test]
    fn test_rename_user() {
        let mut store = ExpensesStore::new();
        let ann = UserId::generate();
        let bob = UserId::generate();
        store.insert(fields(ann, Category::Meals, dec!(1)));
        store.insert(fields(ann, Category::Travel, dec!(2)));
        let mut other = fields(bob, Category::Other, dec!(3));
        other.user_name = "Bob Ray".into();
        store.insert(other);

        assert_eq!(store.rename_user(ann, "Ann Smith"), 2);
        assert!(store
            .for_user(ann)
            .iter()
            .all(|e| e.user_name == "Ann Smith"));
        assert_eq!(store.for_user(bob)[0].user_name, "Bob Ray");
        assert_eq!(store.rename_user(UserId::generate(), "Nobody"), 0);
    }

    #[test]
    fn test_iter_follows_creation_order() {
        let mut store = ExpensesStore::new();
        let user = UserId::generate();
        for cost in [dec!(3), dec!(1), dec!(2)] {
            store.insert(fields(user, Category::Software, cost));
        }
        let costs: Vec<_> = store.iter().map(|e| e.cost).collect();
        assert_eq!(costs, vec![dec!(3), dec!(1), dec!(2)]);
    }
}
