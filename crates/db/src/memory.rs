//! In-process store backed by an ordered map.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::filter::Filter;
use crate::options::FindOptions;
use crate::record::{Book, BookId, NewBook};
use crate::store::{BookStore, StoreError};

/// Book collection held in memory.
///
/// Keys are time-ordered, so unsorted queries return records in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    books: RwLock<BTreeMap<BookId, Book>>,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<BookId, Book>>, StoreError> {
        self.books
            .read()
            .map_err(|_| StoreError::Unavailable("book lock poisoned (read)".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<BookId, Book>>, StoreError> {
        self.books
            .write()
            .map_err(|_| StoreError::Unavailable("book lock poisoned (write)".to_string()))
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Book>, StoreError> {
        let mut matches: Vec<Book> = {
            let books = self.read()?;
            let candidates = books.values().filter(|book| filter.matches(book));
            // Without a sort the limit can stop the scan early.
            match (options.sort, options.limit) {
                (None, Some(limit)) => candidates.take(limit).cloned().collect(),
                _ => candidates.cloned().collect(),
            }
        };

        options.apply(&mut matches);
        Ok(matches)
    }

    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, StoreError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn insert(&self, book: NewBook) -> Result<Book, StoreError> {
        let book = book.into_book(BookId::generate());
        book.validate()?;

        self.write()?.insert(book.id, book.clone());
        tracing::debug!(target: "shelf-db", id = %book.id, "book inserted");
        Ok(book)
    }

    async fn replace(&self, book: Book) -> Result<Option<Book>, StoreError> {
        book.validate()?;

        let mut books = self.write()?;
        match books.get_mut(&book.id) {
            Some(slot) => {
                *slot = book.clone();
                tracing::debug!(target: "shelf-db", id = %book.id, "book replaced");
                Ok(Some(book))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &BookId) -> Result<Option<Book>, StoreError> {
        let removed = self.write()?.remove(id);
        if removed.is_some() {
            tracing::debug!(target: "shelf-db", %id, "book deleted");
        }
        Ok(removed)
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{NumericField, TextField};
    use crate::options::{SortKey, SortOrder};

    fn new_book(title: &str, pages: i64) -> NewBook {
        NewBook {
            title: Some(title.to_string()),
            authors: Some("Bill Bryson".to_string()),
            num_pages: Some(pages),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_round_trips() {
        let store = InMemoryBookStore::new();
        let stored = store.insert(new_book("Test", 150)).await.unwrap();

        let fetched = store.find_by_id(&stored.id).await.unwrap().unwrap();
        assert_eq!(fetched, stored);
        assert_eq!(fetched.title.as_deref(), Some("Test"));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn insert_rejects_schema_violations() {
        let store = InMemoryBookStore::new();
        let err = store.insert(NewBook::default()).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn find_preserves_insertion_order_and_limit() {
        let store = InMemoryBookStore::new();
        for (title, pages) in [("c", 3), ("a", 1), ("b", 2)] {
            store.insert(new_book(title, pages)).await.unwrap();
        }

        let found = store
            .find(&Filter::all(), &FindOptions::new().limit(2))
            .await
            .unwrap();
        let titles: Vec<_> = found.iter().filter_map(|b| b.title.as_deref()).collect();
        assert_eq!(titles, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn find_filters_then_sorts() {
        let store = InMemoryBookStore::new();
        for (title, pages) in [("x", 130), ("y", 100), ("z", 149), ("w", 150)] {
            store.insert(new_book(title, pages)).await.unwrap();
        }

        let filter = Filter::all().bucket(NumericField::NumPages, 100.0, 50.0);
        let found = store
            .find(
                &filter,
                &FindOptions::new().sort_by(SortKey::NumPages, SortOrder::Descending),
            )
            .await
            .unwrap();
        let pages: Vec<_> = found.iter().filter_map(|b| b.num_pages).collect();
        assert_eq!(pages, vec![149, 130, 100]);
    }

    #[tokio::test]
    async fn replace_overwrites_existing_record_only() {
        let store = InMemoryBookStore::new();
        let mut book = store.insert(new_book("Test", 150)).await.unwrap();
        book.num_pages = Some(160);

        let replaced = store.replace(book.clone()).await.unwrap();
        assert_eq!(replaced, Some(book.clone()));

        let fetched = store.find_by_id(&book.id).await.unwrap().unwrap();
        assert_eq!(fetched.num_pages, Some(160));

        let stranger = new_book("Stranger", 1).into_book(BookId::generate());
        assert_eq!(store.replace(stranger).await.unwrap(), None);
    }

    #[tokio::test]
    async fn replace_validates_before_writing() {
        let store = InMemoryBookStore::new();
        let mut book = store.insert(new_book("Test", 150)).await.unwrap();
        book.title = None;

        assert!(store.replace(book.clone()).await.unwrap_err().is_validation());
        let fetched = store.find_by_id(&book.id).await.unwrap().unwrap();
        assert_eq!(fetched.title.as_deref(), Some("Test"));
    }

    #[tokio::test]
    async fn delete_is_terminal() {
        let store = InMemoryBookStore::new();
        let book = store.insert(new_book("Test", 150)).await.unwrap();

        assert!(store.delete(&book.id).await.unwrap().is_some());
        assert!(store.find_by_id(&book.id).await.unwrap().is_none());
        assert!(store.delete(&book.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn text_filter_runs_against_store() {
        let store = InMemoryBookStore::new();
        store.insert(new_book("Notes from a Small Island", 324)).await.unwrap();

        let filter = Filter::all().contains(TextField::Title, "small").unwrap();
        let found = store.find(&filter, &FindOptions::new()).await.unwrap();
        assert_eq!(found.len(), 1);
    }
}
