//! Sorting and limiting of query results.

use std::cmp::Ordering;

use crate::record::Book;

/// Columns results can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    NumPages,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Sort {
    /// Records missing the key sort before records that have it.
    pub fn compare(&self, a: &Book, b: &Book) -> Ordering {
        let ordering = match self.key {
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::NumPages => a.num_pages.cmp(&b.num_pages),
        };

        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// How a `find` should shape its result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Option<Sort>,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort_by(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort = Some(Sort { key, order });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sort (stably) and then truncate `books` in place.
    pub fn apply(&self, books: &mut Vec<Book>) {
        if let Some(sort) = self.sort {
            books.sort_by(|a, b| sort.compare(a, b));
        }
        if let Some(limit) = self.limit {
            books.truncate(limit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{BookId, NewBook};

    fn book(title: Option<&str>, pages: i64) -> Book {
        NewBook {
            title: title.map(str::to_string),
            num_pages: Some(pages),
            ..Default::default()
        }
        .into_book(BookId::generate())
    }

    fn pages(books: &[Book]) -> Vec<i64> {
        books.iter().filter_map(|b| b.num_pages).collect()
    }

    #[test]
    fn sorts_by_pages_in_both_directions() {
        let mut books = vec![book(Some("b"), 120), book(Some("a"), 101), book(Some("c"), 149)];

        FindOptions::new()
            .sort_by(SortKey::NumPages, SortOrder::Ascending)
            .apply(&mut books);
        assert_eq!(pages(&books), vec![101, 120, 149]);

        FindOptions::new()
            .sort_by(SortKey::NumPages, SortOrder::Descending)
            .apply(&mut books);
        assert_eq!(pages(&books), vec![149, 120, 101]);
    }

    #[test]
    fn untitled_records_sort_first() {
        let mut books = vec![book(Some("Zebra"), 1), book(None, 2), book(Some("Apple"), 3)];
        FindOptions::new()
            .sort_by(SortKey::Title, SortOrder::Ascending)
            .apply(&mut books);
        assert_eq!(pages(&books), vec![2, 3, 1]);
    }

    #[test]
    fn limit_applies_after_sorting() {
        let mut books = vec![book(Some("c"), 3), book(Some("a"), 1), book(Some("b"), 2)];
        FindOptions::new()
            .sort_by(SortKey::Title, SortOrder::Ascending)
            .limit(2)
            .apply(&mut books);
        assert_eq!(pages(&books), vec![1, 2]);
    }
}
