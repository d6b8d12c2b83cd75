//! The record store abstraction the HTTP layer talks to.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::filter::Filter;
use crate::options::FindOptions;
use crate::record::{Book, BookId, NewBook};

/// Failures raised by a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{field} {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },

    #[error("record store unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read seed file {path}")]
    SeedIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("seed file {path} is not a JSON array of books")]
    SeedFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn validation(field: &'static str, reason: &'static str) -> Self {
        Self::Validation { field, reason }
    }

    /// Whether the caller supplied a record the schema rejects.
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation { .. })
    }
}

/// Persistence for the book collection.
///
/// Each method is one logical operation; implementations handle their own
/// concurrency control.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Records matching `filter`, shaped by `options`.
    async fn find(&self, filter: &Filter, options: &FindOptions) -> Result<Vec<Book>, StoreError>;

    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, StoreError>;

    /// Validate and store a new record, assigning its id.
    async fn insert(&self, book: NewBook) -> Result<Book, StoreError>;

    /// Overwrite an existing record. Returns `None` if the id is unknown.
    async fn replace(&self, book: Book) -> Result<Option<Book>, StoreError>;

    /// Remove a record, returning it if it existed.
    async fn delete(&self, id: &BookId) -> Result<Option<Book>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}
