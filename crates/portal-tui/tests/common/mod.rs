#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use portal_core::{ApiKeyRecord, CreationResult};
use portal_service::{KeyService, Latency, MockKeyService, SeededKeyGenerator, ServiceError};
use portal_store::{KeyStore, MemoryKeyStore};
use portal_tui::clipboard::{Clipboard, MemoryClipboard};
use portal_tui::controller::KeyController;
use portal_tui::notify::Notifier;
use tokio::sync::oneshot;

pub fn mock_service(latency: Latency) -> MockKeyService {
    MockKeyService::new(
        Arc::new(MemoryKeyStore::seeded()),
        Arc::new(SeededKeyGenerator::new(2024)),
        latency,
    )
}

pub fn controller(service: Arc<dyn KeyService>) -> (Arc<KeyController>, Arc<MemoryClipboard>) {
    let clipboard = Arc::new(MemoryClipboard::new());
    let controller = KeyController::new(
        service,
        Notifier::default(),
        Arc::clone(&clipboard) as Arc<dyn Clipboard>,
    );
    (Arc::new(controller), clipboard)
}

pub fn notification_texts(controller: &KeyController) -> Vec<String> {
    controller
        .notifier()
        .active()
        .into_iter()
        .map(|n| n.text)
        .collect()
}

pub fn view_ids(controller: &KeyController) -> Vec<String> {
    controller.view().keys.into_iter().map(|k| k.id).collect()
}

/// Wraps the mock service with switchable failures and call counters.
pub struct FlakyService {
    pub inner: MockKeyService,
    pub fail_list: AtomicBool,
    pub fail_create: AtomicBool,
    pub list_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl FlakyService {
    pub fn new() -> Self {
        Self {
            inner: mock_service(Latency::none()),
            fail_list: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
            list_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    pub fn store(&self) -> &Arc<dyn KeyStore> {
        self.inner.store()
    }
}

#[async_trait]
impl KeyService for FlakyService {
    async fn get_api_keys(&self) -> Result<Vec<ApiKeyRecord>, ServiceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(ServiceError::Internal("connection refused".into()));
        }
        self.inner.get_api_keys().await
    }

    async fn create_api_key(&self, name: &str) -> Result<CreationResult, ServiceError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(ServiceError::Internal("quota exceeded".into()));
        }
        self.inner.create_api_key(name).await
    }

    async fn delete_api_key(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_api_key(id).await
    }
}

/// The first list call snapshots the store, then waits for `release`
/// before answering, so its result lands after later operations.
pub struct GatedListService {
    pub inner: MockKeyService,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    fail_gated: bool,
}

impl GatedListService {
    pub fn new() -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let svc = Self {
            inner: mock_service(Latency::none()),
            gate: Mutex::new(Some(rx)),
            fail_gated: false,
        };
        (svc, tx)
    }

    /// Like `new`, but the held-back call fails once released.
    pub fn failing() -> (Self, oneshot::Sender<()>) {
        let (mut svc, tx) = Self::new();
        svc.fail_gated = true;
        (svc, tx)
    }
}

#[async_trait]
impl KeyService for GatedListService {
    async fn get_api_keys(&self) -> Result<Vec<ApiKeyRecord>, ServiceError> {
        let snapshot = self.inner.get_api_keys().await?;
        let gate = self.gate.lock().unwrap().take();
        if let Some(rx) = gate {
            let _ = rx.await;
            if self.fail_gated {
                return Err(ServiceError::Internal("timeout".into()));
            }
        }
        Ok(snapshot)
    }

    async fn create_api_key(&self, name: &str) -> Result<CreationResult, ServiceError> {
        self.inner.create_api_key(name).await
    }

    async fn delete_api_key(&self, id: &str) -> Result<(), ServiceError> {
        self.inner.delete_api_key(id).await
    }
}
