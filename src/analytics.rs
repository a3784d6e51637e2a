//! Derived figures for the analytics view.
//!
//! Everything here is computed from the store's read projections and has no
//! side effects.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{Category, LedgerStore, UserWithTotal};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_expenses: Decimal,
    pub expense_count: usize,
    /// Zero when there are no expenses.
    pub average_expense: Decimal,
    pub user_count: usize,
    /// The user with the greatest total. Ties go to the earliest-created
    /// user; `None` only when there are no users at all.
    pub top_spender: Option<UserWithTotal>,
    /// Number of expenses owned by the top spender.
    pub top_spender_expense_count: usize,
}

impl Summary {
    pub fn from_store(store: &LedgerStore) -> Self {
        let total_expenses = store.total_expenses();
        let expense_count = store.expense_count();
        let average_expense = if expense_count == 0 {
            Decimal::ZERO
        } else {
            total_expenses / Decimal::from(expense_count)
        };

        let top_spender = store
            .users()
            .into_iter()
            .fold(None, |best: Option<UserWithTotal>, candidate| match best {
                Some(current) if current.total >= candidate.total => Some(current),
                _ => Some(candidate),
            });
        let top_spender_expense_count = top_spender.as_ref().map_or(0, |top| {
            store
                .expenses_for_user(top.user.id)
                .map_or(0, |expenses| expenses.len())
        });

        Self {
            total_expenses,
            expense_count,
            average_expense,
            user_count: store.user_count(),
            top_spender,
            top_spender_expense_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub total: Decimal,
    /// Percentage of the highest category total, 0 to 100.
    pub percent_of_highest: Decimal,
}

/// Category totals scaled against the largest one, for bar-style charts.
pub fn category_shares(store: &LedgerStore) -> Vec<CategoryShare> {
    let totals = store.category_totals();
    let highest = totals
        .iter()
        .map(|c| c.total)
        .max()
        .unwrap_or(Decimal::ZERO);

    totals
        .into_iter()
        .map(|c| CategoryShare {
            category: c.category,
            total: c.total,
            percent_of_highest: if highest > Decimal::ZERO {
                c.total / highest * Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_store_summary() {
        let store = LedgerStore::new();
        let summary = Summary::from_store(&store);
        assert_eq!(summary.total_expenses, Decimal::ZERO);
        assert_eq!(summary.expense_count, 0);
        assert_eq!(summary.average_expense, Decimal::ZERO);
        assert_eq!(summary.user_count, 0);
        assert_eq!(summary.top_spender, None);
        assert_eq!(summary.top_spender_expense_count, 0);
    }

    #[test]
    fn test_summary_totals_and_average() {
        let mut store = LedgerStore::new();
        let ann = store.create_user("Ann", "Lee").id;
        let bob = store.create_user("Bob", "Ray").id;
        store.create_expense(ann, Category::Meals, "a", dec!(10)).unwrap();
        store.create_expense(bob, Category::Travel, "b", dec!(25)).unwrap();
        store.create_expense(bob, Category::Other, "c", dec!(5)).unwrap();

        let summary = Summary::from_store(&store);
        assert_eq!(summary.total_expenses, dec!(40));
        assert_eq!(summary.expense_count, 3);
        assert_eq!(summary.average_expense.round_dp(2), dec!(13.33));
        assert_eq!(summary.user_count, 2);

        let top = summary.top_spender.unwrap();
        assert_eq!(top.user.id, bob);
        assert_eq!(top.total, dec!(30));
        assert_eq!(summary.top_spender_expense_count, 2);
    }

    #[test]
    fn test_top_spender_tie_goes_to_earliest_user() {
        let mut store = LedgerStore::new();
        let ann = store.create_user("Ann", "Lee").id;
        let bob = store.create_user("Bob", "Ray").id;
        store.create_expense(bob, Category::Meals, "a", dec!(8)).unwrap();
        store.create_expense(ann, Category::Meals, "b", dec!(8)).unwrap();

        let summary = Summary::from_store(&store);
        assert_eq!(summary.top_spender.unwrap().user.id, ann);
    }

    #[test]
    fn test_top_spender_with_no_expenses_is_first_user() {
        let mut store = LedgerStore::new();
        let ann = store.create_user("Ann", "Lee").id;
        store.create_user("Bob", "Ray");

        let summary = Summary::from_store(&store);
        assert_eq!(summary.user_count, 2);
        assert_eq!(summary.top_spender_expense_count, 0);
        assert_eq!(summary.top_spender.unwrap().user.id, ann);
    }

    #[test]
    fn test_category_shares() {
        let mut store = LedgerStore::new();
        let ann = store.create_user("Ann", "Lee").id;
        store.create_expense(ann, Category::Travel, "a", dec!(80)).unwrap();
        store.create_expense(ann, Category::Meals, "b", dec!(20)).unwrap();

        let shares = category_shares(&store);
        assert_eq!(shares.len(), Category::COUNT);
        assert_eq!(shares[0].category, Category::Meals);
        assert_eq!(shares[0].percent_of_highest, dec!(25));
        assert_eq!(shares[1].percent_of_highest, dec!(100));
        assert_eq!(shares[2].percent_of_highest, dec!(0));
    }

    #[test]
    fn test_category_shares_all_zero() {
        let store = LedgerStore::new();
        assert!(category_shares(&store)
            .iter()
            .all(|s| s.percent_of_highest.is_zero()));
    }
}
