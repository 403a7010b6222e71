mod memory;

pub use memory::MemoryKeyStore;

use chrono::{DateTime, Utc};
use portal_core::ApiKeyRecord;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate key id: {0}")]
    Duplicate(String),

    #[error("store error: {0}")]
    Internal(String),
}

/// The canonical set of API key records for a session.
///
/// Implementations hand out copies only; nothing a caller does with the
/// returned records can change what the store holds.
pub trait KeyStore: Send + Sync {
    /// All records, in insertion order.
    fn list(&self) -> Result<Vec<ApiKeyRecord>, StoreError>;

    /// Append a record. Fails with `StoreError::Duplicate` if the id is taken.
    fn insert(&self, record: ApiKeyRecord) -> Result<(), StoreError>;

    /// Remove the record with `id`. Returns whether one was removed.
    fn remove_by_id(&self, id: &str) -> Result<bool, StoreError>;

    /// Record a use of the key at `at`.
    fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<(), StoreError>;
}
