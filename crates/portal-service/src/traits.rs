use async_trait::async_trait;
use portal_core::{ApiKeyRecord, CreationResult};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Remote boundary for API key management.
///
/// The controller programs against this trait.
/// `MockKeyService` wraps an in-memory store behind simulated latency;
/// a real HTTP backend would slot in here.
#[async_trait]
pub trait KeyService: Send + Sync {
    async fn get_api_keys(&self) -> Result<Vec<ApiKeyRecord>, ServiceError>;
    async fn create_api_key(&self, name: &str) -> Result<CreationResult, ServiceError>;
    async fn delete_api_key(&self, id: &str) -> Result<(), ServiceError>;
}
