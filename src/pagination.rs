//! Paged and filtered views over the store's read projections.

use serde::Serialize;

use crate::{Category, Expense, LedgerStore, UserWithTotal};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One page of a list. Page numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub number: usize,
    pub size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    /// Cuts page `number` out of `items`. A page number of 0 is treated as
    /// 1; a number past the last page yields an empty page.
    pub fn of(items: Vec<T>, number: usize, size: usize) -> Self {
        let size = size.max(1);
        let number = number.max(1);
        let total_items = items.len();
        let total_pages = total_items.div_ceil(size);
        let start = (number - 1).saturating_mul(size);
        let items = items.into_iter().skip(start).take(size).collect();
        Self {
            number,
            size,
            total_items,
            total_pages,
            items,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    /// 1-based positions of the first and last row shown, if any.
    pub fn row_range(&self) -> Option<(usize, usize)> {
        if self.items.is_empty() {
            return None;
        }
        let first = (self.number - 1) * self.size + 1;
        Some((first, first + self.items.len() - 1))
    }
}

pub fn user_page(store: &LedgerStore, number: usize, size: usize) -> Page<UserWithTotal> {
    Page::of(store.users(), number, size)
}

/// Expenses, optionally restricted to one category, then paged.
pub fn expense_page(
    store: &LedgerStore,
    category: Option<Category>,
    number: usize,
    size: usize,
) -> Page<Expense> {
    Page::of(filter_by_category(store.expenses(), category), number, size)
}

/// Keeps only the expenses in `category`; `None` keeps everything.
pub fn filter_by_category(expenses: Vec<Expense>, category: Option<Category>) -> Vec<Expense> {
    match category {
        Some(category) => expenses
            .into_iter()
            .filter(|e| e.category == category)
            .collect(),
        None => expenses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_page_of_splits_items() {
        let items: Vec<u32> = (1..=25).collect();

        let first = Page::of(items.clone(), 1, DEFAULT_PAGE_SIZE);
        assert_eq!(first.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(first.total_pages, 3);
        assert!(!first.has_previous());
        assert!(first.has_next());
        assert_eq!(first.row_range(), Some((1, 10)));

        let last = Page::of(items, 3, DEFAULT_PAGE_SIZE);
        assert_eq!(last.items, (21..=25).collect::<Vec<_>>());
        assert!(last.has_previous());
        assert!(!last.has_next());
        assert_eq!(last.row_range(), Some((21, 25)));
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = Page::of(vec![1, 2, 3], 5, 2);
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.row_range(), None);
    }

    #[test]
    fn test_page_zero_and_empty_input() {
        let page = Page::of(Vec::<u8>::new(), 0, 10);
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
    }

    #[test]
    fn test_expense_page_filters_by_category() {
        let mut store = LedgerStore::new();
        let ann = store.create_user("Ann", "Lee").id;
        for i in 0..12 {
            let category = if i % 3 == 0 {
                Category::Travel
            } else {
                Category::Meals
            };
            store
                .create_expense(ann, category, format!("item {i}"), Decimal::ONE)
                .unwrap();
        }

        let travel = expense_page(&store, Some(Category::Travel), 1, DEFAULT_PAGE_SIZE);
        assert_eq!(travel.total_items, 4);
        assert!(travel.items.iter().all(|e| e.category == Category::Travel));

        let everything = expense_page(&store, None, 2, DEFAULT_PAGE_SIZE);
        assert_eq!(everything.total_items, 12);
        assert_eq!(everything.items.len(), 2);
        assert_eq!(everything.items[0].description, "item 10");
    }

    #[test]
    fn test_user_page() {
        let mut store = LedgerStore::new();
        for i in 0..11 {
            store.create_user(format!("User{i}"), "Test");
        }
        let page = user_page(&store, 2, DEFAULT_PAGE_SIZE);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].user.first_name, "User10");
    }
}
