//! Durable key/value storage for session state.
//!
//! The storefront keeps two records locally: the current identity and the
//! list of local credential records. Values are JSON strings, read and
//! written whole (last write wins).

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur when reading or writing local storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded or decoded as JSON.
    #[error("Storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The key cannot be used as a storage name.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// String key/value storage.
pub trait LocalStorage: Send + Sync {
    /// Read the raw value stored under `key`.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&mut self, key: &str) -> StorageResult<()>;
}

/// Read and decode a JSON value.
///
/// A present but undecodable value is reported as
/// [`StorageError::Serialize`] so callers can decide to discard it.
///
/// # Errors
///
/// Returns `StorageError` if the backend fails or the value is not valid JSON
/// for `T`.
pub fn read_json<S, T>(storage: &S, key: &str) -> StorageResult<Option<T>>
where
    S: LocalStorage + ?Sized,
    T: DeserializeOwned,
{
    storage
        .get_item(key)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(StorageError::from)
}

/// Encode and store a JSON value.
///
/// # Errors
///
/// Returns `StorageError` if encoding or the backend write fails.
pub fn write_json<S, T>(storage: &mut S, key: &str, value: &T) -> StorageResult<()>
where
    S: LocalStorage + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    storage.set_item(key, &raw)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_json_helpers() {
        let mut storage = MemoryStorage::new();
        write_json(&mut storage, "numbers", &vec![1, 2, 3]).unwrap();
        let numbers: Option<Vec<i32>> = read_json(&storage, "numbers").unwrap();
        assert_eq!(numbers, Some(vec![1, 2, 3]));

        let missing: Option<Vec<i32>> = read_json(&storage, "nothing").unwrap();
        assert_eq!(missing, None);
    }

    #[test]
    fn test_read_json_reports_corrupt_value() {
        let mut storage = MemoryStorage::new();
        storage.set_item("user", "{not json").unwrap();
        let result: StorageResult<Option<Vec<i32>>> = read_json(&storage, "user");
        assert!(matches!(result, Err(StorageError::Serialize(_))));
    }
}
