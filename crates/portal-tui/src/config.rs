use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use portal_service::Latency;

#[derive(Debug, Parser)]
#[command(name = "portal", about = "API key management console")]
pub struct PortalConfig {
    /// Base URL of the key management API (shown only; keys are served by the mock backend)
    #[arg(long, env = "PORTAL_API_BASE_URL", default_value = "http://localhost:3000/api")]
    pub api_base_url: String,

    /// Simulated latency for listing keys (milliseconds)
    #[arg(long, env = "PORTAL_LIST_LATENCY_MS", default_value = "800")]
    pub list_latency_ms: u64,

    /// Simulated latency for creating a key (milliseconds)
    #[arg(long, env = "PORTAL_CREATE_LATENCY_MS", default_value = "1000")]
    pub create_latency_ms: u64,

    /// Simulated latency for deleting a key (milliseconds)
    #[arg(long, env = "PORTAL_DELETE_LATENCY_MS", default_value = "500")]
    pub delete_latency_ms: u64,

    /// How long notifications stay on screen (milliseconds)
    #[arg(long, env = "PORTAL_NOTIFICATION_MS", default_value = "5000")]
    pub notification_ms: u64,

    /// Seed for deterministic key ids and secrets
    #[arg(long, env = "PORTAL_SEED")]
    pub seed: Option<u64>,

    /// Start with an empty key store instead of the fixture keys
    #[arg(long)]
    pub empty: bool,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long, env = "PORTAL_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl PortalConfig {
    pub fn latency(&self) -> Latency {
        Latency {
            list: Duration::from_millis(self.list_latency_ms),
            create: Duration::from_millis(self.create_latency_ms),
            delete: Duration::from_millis(self.delete_latency_ms),
        }
    }

    pub fn notification_lifetime(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}
