//! Running aggregate tables kept alongside the primary records.
//!
//! Every entry is adjusted incrementally by the ledger in the same call that
//! mutates the records it summarizes. Adjustments are checked: a batch that
//! would overflow any total is rejected as a whole.

use rust_decimal::Decimal;
use std::collections::HashMap;

use super::UserId;
use crate::{Category, Error};

/// A batch of deltas applied to [`Totals`] as one unit.
#[derive(Debug, Default)]
pub struct Adjustment {
    users: Vec<(UserId, Decimal)>,
    categories: Vec<(Category, Decimal)>,
}

impl Adjustment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&mut self, user_id: UserId, delta: Decimal) -> &mut Self {
        self.users.push((user_id, delta));
        self
    }

    pub fn category(&mut self, category: Category, delta: Decimal) -> &mut Self {
        self.categories.push((category, delta));
        self
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Totals {
    per_user: HashMap<UserId, Decimal>,
    per_category: [Decimal; Category::COUNT],
    /// Sum of all category totals.
    overall: Decimal,
}

impl Totals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a zero total for a newly created user.
    pub fn open_user(&mut self, user_id: UserId) {
        self.per_user.insert(user_id, Decimal::ZERO);
    }

    /// Drops a user's entry, returning the total it held.
    pub fn close_user(&mut self, user_id: UserId) -> Option<Decimal> {
        self.per_user.remove(&user_id)
    }

    /// Applies every delta of `adjustment`, or none of them if any resulting
    /// total would fall outside the decimal range. A user without an entry
    /// starts from zero.
    pub fn apply(&mut self, adjustment: &Adjustment) -> Result<(), Error> {
        let mut per_user: HashMap<UserId, Decimal> = HashMap::new();
        for &(user_id, delta) in &adjustment.users {
            let current = per_user
                .get(&user_id)
                .copied()
                .or_else(|| self.user(user_id))
                .unwrap_or(Decimal::ZERO);
            per_user.insert(user_id, checked_add(current, delta)?);
        }

        let mut per_category = self.per_category;
        let mut overall = self.overall;
        for &(category, delta) in &adjustment.categories {
            let slot = &mut per_category[category.index()];
            *slot = checked_add(*slot, delta)?;
            overall = checked_add(overall, delta)?;
        }

        self.per_user.extend(per_user);
        self.per_category = per_category;
        self.overall = overall;
        Ok(())
    }

    pub fn user(&self, user_id: UserId) -> Option<Decimal> {
        self.per_user.get(&user_id).copied()
    }

    pub fn category(&self, category: Category) -> Decimal {
        self.per_category[category.index()]
    }

    pub fn overall(&self) -> Decimal {
        self.overall
    }

    /// All category totals in [`Category::ALL`] order, zeros included.
    pub fn categories(&self) -> impl Iterator<Item = (Category, Decimal)> + '_ {
        Category::ALL
            .into_iter()
            .map(move |category| (category, self.category(category)))
    }
}

fn checked_add(total: Decimal, delta: Decimal) -> Result<Decimal, Error> {
    total.checked_add(delta).ok_or(Error::TotalOverflow)
}
