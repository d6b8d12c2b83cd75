//! Book record store: record types, declarative filters, and store backends.

pub mod filter;
pub mod memory;
pub mod options;
pub mod record;
pub mod seed;
pub mod store;

pub use filter::{Condition, Filter, NumericField, TextField};
pub use memory::InMemoryBookStore;
pub use options::{FindOptions, Sort, SortKey, SortOrder};
pub use record::{Book, BookId, InvalidBookId, NewBook};
pub use seed::load_seed_file;
pub use store::{BookStore, StoreError};
