pub mod app;
pub mod clipboard;
pub mod components;
pub mod config;
pub mod controller;
pub mod notify;

use std::sync::Arc;

use portal_service::{KeyGenerator, MockKeyService, RandomKeyGenerator, SeededKeyGenerator};
use portal_store::MemoryKeyStore;

use crate::clipboard::Clipboard;
use crate::config::PortalConfig;
use crate::controller::KeyController;
use crate::notify::Notifier;

/// Wire store, generator, mock service and notifier together per `config`.
pub fn build_controller(config: &PortalConfig, clipboard: Arc<dyn Clipboard>) -> KeyController {
    let store = if config.empty {
        MemoryKeyStore::new()
    } else {
        MemoryKeyStore::seeded()
    };
    let generator: Arc<dyn KeyGenerator> = match config.seed {
        Some(seed) => Arc::new(SeededKeyGenerator::new(seed)),
        None => Arc::new(RandomKeyGenerator::new()),
    };
    let service = MockKeyService::new(Arc::new(store), generator, config.latency());
    KeyController::new(
        Arc::new(service),
        Notifier::new(config.notification_lifetime()),
        clipboard,
    )
}
