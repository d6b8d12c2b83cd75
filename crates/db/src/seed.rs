//! Loading initial records from disk.

use std::path::Path;

use crate::record::NewBook;
use crate::store::StoreError;

/// Read a JSON array of book records.
///
/// Identifiers in the file are ignored; the store assigns new ones on insert.
pub fn load_seed_file(path: impl AsRef<Path>) -> Result<Vec<NewBook>, StoreError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| StoreError::SeedIo {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| StoreError::SeedFormat {
        path: path.to_path_buf(),
        source,
    })
}
