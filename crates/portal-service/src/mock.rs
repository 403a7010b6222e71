use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use portal_core::{ApiKeyRecord, CreationResult};
use portal_store::{KeyStore, StoreError};
use tracing::{debug, info};

use crate::generator::KeyGenerator;
use crate::{KeyService, ServiceError};

/// Simulated round-trip time per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub list: Duration,
    pub create: Duration,
    pub delete: Duration,
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            list: Duration::from_millis(800),
            create: Duration::from_millis(1000),
            delete: Duration::from_millis(500),
        }
    }
}

impl Latency {
    pub fn none() -> Self {
        Self {
            list: Duration::ZERO,
            create: Duration::ZERO,
            delete: Duration::ZERO,
        }
    }
}

/// Mock implementation backed by an injected in-memory store.
pub struct MockKeyService {
    store: Arc<dyn KeyStore>,
    generator: Arc<dyn KeyGenerator>,
    latency: Latency,
}

impl MockKeyService {
    pub fn new(
        store: Arc<dyn KeyStore>,
        generator: Arc<dyn KeyGenerator>,
        latency: Latency,
    ) -> Self {
        Self {
            store,
            generator,
            latency,
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyStore> {
        &self.store
    }

    async fn simulate(delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(msg) => ServiceError::NotFound(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

#[async_trait]
impl KeyService for MockKeyService {
    async fn get_api_keys(&self) -> Result<Vec<ApiKeyRecord>, ServiceError> {
        debug!("fetching api keys");
        Self::simulate(self.latency.list).await;
        Ok(self.store.list()?)
    }

    async fn create_api_key(&self, name: &str) -> Result<CreationResult, ServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidInput("key name must not be blank".into()));
        }
        info!(name, "creating api key");
        Self::simulate(self.latency.create).await;

        let record = ApiKeyRecord {
            id: self.generator.next_id(),
            name: name.to_string(),
            secret: self.generator.next_secret(),
            created_at: Utc::now(),
            last_used_at: None,
        };
        let created = CreationResult::from_record(&record);
        self.store.insert(record)?;
        info!(id = %created.id, "api key created");
        Ok(created)
    }

    async fn delete_api_key(&self, id: &str) -> Result<(), ServiceError> {
        info!(id, "deleting api key");
        Self::simulate(self.latency.delete).await;

        if !self.store.remove_by_id(id)? {
            return Err(ServiceError::NotFound(format!("api_key {id}")));
        }
        Ok(())
    }
}
