use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, TimeZone, Utc};
use portal_core::ApiKeyRecord;
use tracing::debug;

use crate::{KeyStore, StoreError};

/// In-memory store, one per session.
///
/// Ids that were ever inserted stay reserved after deletion, so an id is
/// unique across the store's whole lifetime.
#[derive(Default)]
pub struct MemoryKeyStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    records: Vec<ApiKeyRecord>,
    issued: HashSet<String>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the two fixture keys used by the dashboard.
    pub fn seeded() -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock().unwrap_or_else(|e| e.into_inner());
            for record in fixture_records() {
                inner.issued.insert(record.id.clone());
                inner.records.push(record);
            }
        }
        store
    }

    fn with_inner<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Inner) -> Result<T, StoreError>,
    {
        let mut guard: MutexGuard<'_, Inner> = self
            .inner
            .lock()
            .map_err(|_| StoreError::Internal("lock poisoned".into()))?;
        f(&mut guard)
    }
}

impl KeyStore for MemoryKeyStore {
    fn list(&self) -> Result<Vec<ApiKeyRecord>, StoreError> {
        self.with_inner(|inner| Ok(inner.records.clone()))
    }

    fn insert(&self, record: ApiKeyRecord) -> Result<(), StoreError> {
        self.with_inner(|inner| {
            if !inner.issued.insert(record.id.clone()) {
                return Err(StoreError::Duplicate(record.id));
            }
            debug!(id = %record.id, "store insert");
            inner.records.push(record);
            Ok(())
        })
    }

    fn remove_by_id(&self, id: &str) -> Result<bool, StoreError> {
        self.with_inner(|inner| {
            let Some(pos) = inner.records.iter().position(|r| r.id == id) else {
                return Ok(false);
            };
            inner.records.remove(pos);
            debug!(id, "store remove");
            Ok(true)
        })
    }

    fn touch(&self, id: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.with_inner(|inner| {
            let record = inner
                .records
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or_else(|| StoreError::NotFound(format!("api_key {id}")))?;
            record.last_used_at = Some(at);
            Ok(())
        })
    }
}

fn fixture_time(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s)
        .single()
        .unwrap_or_default()
}

fn fixture_records() -> Vec<ApiKeyRecord> {
    vec![
        ApiKeyRecord {
            id: "key-1".into(),
            name: "Production API Key".into(),
            secret: "pk_live_51NBzT8aKZ9DsLExGFhnJYnuSLGTOr5DYKmsNr92XE".into(),
            created_at: fixture_time(2023, 9, 15, 14, 28, 32),
            last_used_at: Some(fixture_time(2023, 12, 1, 9, 14, 23)),
        },
        ApiKeyRecord {
            id: "key-2".into(),
            name: "Development API Key".into(),
            secret: "pk_test_51NBzT8aKZ9DsLExGFhnJYnuSLGTOr5DYKmsNr92XE".into(),
            created_at: fixture_time(2023, 10, 21, 8, 12, 45),
            last_used_at: Some(fixture_time(2023, 11, 28, 16, 32, 11)),
        },
    ]
}
