use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use portal_core::{mask_secret, ApiKeyRecord, CreationResult};
use portal_service::{KeyService, ServiceError};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clipboard::{Clipboard, ClipboardError};
use crate::notify::{Message, Notifier};

pub const FETCH_FAILED_BANNER: &str = "Failed to fetch API keys. Please try again later.";
pub const CREATE_FAILED_BANNER: &str = "Failed to create API key. Please try again later.";
pub const DELETE_FAILED_BANNER: &str = "Failed to delete API key. Please try again later.";

/// Failures the controller absorbs and turns into notifications.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Failed to fetch API keys: {0}")]
    FetchFailed(#[source] ServiceError),

    #[error("Failed to create API key: {0}")]
    CreateFailed(#[source] ServiceError),

    #[error("Failed to delete API key: {0}")]
    DeleteFailed(#[source] ServiceError),

    #[error("Failed to copy to clipboard: {0}")]
    Clipboard(#[source] ClipboardError),
}

/// The "generate key" panel.
///
/// `Revealed` holds the only copy of the full secret the controller ever
/// gets; leaving it drops the value and zeroes the buffer.
#[derive(Debug, Clone)]
pub enum CreationPanel {
    Idle,
    Creating,
    Revealed(CreationResult),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionState {
    None,
    PendingConfirmation(String),
    Deleting(String),
}

/// One row of the key list as the UI should draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRow {
    pub id: String,
    pub name: String,
    pub display_secret: String,
    pub visible: bool,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Read-only snapshot of everything the key page shows.
#[derive(Debug, Clone)]
pub struct KeyListView {
    pub keys: Vec<KeyRow>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub pending_creation: CreationPanel,
    pub pending_delete_id: Option<String>,
    pub deleting_id: Option<String>,
}

struct ControllerState {
    keys: Vec<ApiKeyRecord>,
    visibility: HashMap<String, bool>,
    in_flight_refreshes: usize,
    error: Option<String>,
    creation: CreationPanel,
    deletion: DeletionState,
    /// Last ticket handed to a refresh, and the newest one whose result was applied.
    issued_ticket: u64,
    applied_ticket: u64,
    /// Ids deleted through this controller; filtered out of late refresh results.
    deleted: HashSet<String>,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            visibility: HashMap::new(),
            in_flight_refreshes: 0,
            error: None,
            creation: CreationPanel::Idle,
            deletion: DeletionState::None,
            issued_ticket: 0,
            applied_ticket: 0,
            deleted: HashSet::new(),
        }
    }
}

/// Drives the API key page: fetching, one-time reveal on creation,
/// confirmed deletion, per-row visibility and clipboard export.
///
/// State sits behind a mutex that is never held across an `.await`, so
/// refresh, create and delete may all be in flight at once. Nothing here
/// returns an error; failures become notifications plus, where it applies,
/// the inline error banner. The synchronous operations may run outside a
/// Tokio runtime; their notifications then stay until dismissed.
pub struct KeyController {
    service: Arc<dyn KeyService>,
    notifier: Notifier,
    clipboard: Arc<dyn Clipboard>,
    state: Mutex<ControllerState>,
}

impl KeyController {
    pub fn new(
        service: Arc<dyn KeyService>,
        notifier: Notifier,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        Self {
            service,
            notifier,
            clipboard,
            state: Mutex::new(ControllerState::default()),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut ControllerState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    fn report(&self, err: FlowError) {
        warn!("{err}");
        self.notifier.notify(Message::error(err.to_string()));
    }

    /// Replace the local list with the service's current one.
    pub async fn refresh(&self) {
        let ticket = self.with_state(|s| {
            s.in_flight_refreshes += 1;
            s.error = None;
            s.issued_ticket += 1;
            s.issued_ticket
        });

        let result = self.service.get_api_keys().await;

        let failure = self.with_state(|s| {
            s.in_flight_refreshes = s.in_flight_refreshes.saturating_sub(1);
            match result {
                Ok(keys) if ticket > s.applied_ticket => {
                    s.applied_ticket = ticket;
                    let deleted = &s.deleted;
                    s.keys = keys
                        .into_iter()
                        .filter(|k| !deleted.contains(&k.id))
                        .collect();
                    debug!(ticket, count = s.keys.len(), "key list refreshed");
                    None
                }
                Ok(_) => {
                    debug!(ticket, applied = s.applied_ticket, "dropping stale refresh");
                    None
                }
                Err(e) if ticket > s.applied_ticket => {
                    s.error = Some(FETCH_FAILED_BANNER.into());
                    Some(e)
                }
                Err(e) => {
                    debug!(
                        ticket,
                        applied = s.applied_ticket,
                        error = %e,
                        "dropping stale refresh failure"
                    );
                    None
                }
            }
        });

        if let Some(e) = failure {
            self.report(FlowError::FetchFailed(e));
        }
    }

    /// Generate a key named after today's date.
    pub async fn create_new(&self) {
        let name = default_key_name(Utc::now());
        self.create_named(&name).await;
    }

    /// Generate a key with an explicit name.
    ///
    /// Does nothing unless the panel is idle: a request is already in
    /// flight, or a revealed secret has not been acknowledged yet.
    pub async fn create_named(&self, name: &str) {
        let started = self.with_state(|s| {
            if !matches!(s.creation, CreationPanel::Idle) {
                return false;
            }
            s.creation = CreationPanel::Creating;
            s.error = None;
            true
        });
        if !started {
            debug!("create ignored, panel busy");
            return;
        }

        match self.service.create_api_key(name).await {
            Ok(created) => {
                info!(id = %created.id, "api key created");
                self.with_state(|s| s.creation = CreationPanel::Revealed(created));
                self.notifier
                    .notify(Message::success("New API key created successfully"));
                self.refresh().await;
            }
            Err(e) => {
                self.with_state(|s| {
                    s.creation = CreationPanel::Idle;
                    s.error = Some(CREATE_FAILED_BANNER.into());
                });
                self.report(FlowError::CreateFailed(e));
            }
        }
    }

    /// The user has copied the new secret; forget it.
    pub fn acknowledge_secret(&self) -> bool {
        self.with_state(|s| match s.creation {
            CreationPanel::Revealed(_) => {
                s.creation = CreationPanel::Idle;
                true
            }
            _ => false,
        })
    }

    /// Ask for confirmation before deleting `id`. Never calls the service.
    pub fn request_delete(&self, id: &str) -> bool {
        self.with_state(|s| {
            if matches!(s.deletion, DeletionState::Deleting(_)) {
                return false;
            }
            s.deletion = DeletionState::PendingConfirmation(id.to_string());
            true
        })
    }

    pub fn cancel_delete(&self) -> bool {
        self.with_state(|s| {
            if matches!(s.deletion, DeletionState::PendingConfirmation(_)) {
                s.deletion = DeletionState::None;
                true
            } else {
                false
            }
        })
    }

    /// Delete the key awaiting confirmation.
    ///
    /// On success the row is dropped locally without a refresh. On failure
    /// the list is left alone; the key still exists on the service side.
    pub async fn confirm_delete(&self) {
        let id = self.with_state(|s| match std::mem::replace(&mut s.deletion, DeletionState::None) {
            DeletionState::PendingConfirmation(id) => {
                s.deletion = DeletionState::Deleting(id.clone());
                s.error = None;
                Some(id)
            }
            other => {
                s.deletion = other;
                None
            }
        });
        let Some(id) = id else {
            debug!("confirm_delete without pending confirmation");
            return;
        };

        let result = self.service.delete_api_key(&id).await;

        self.with_state(|s| {
            s.deletion = DeletionState::None;
            match &result {
                Ok(()) => {
                    s.keys.retain(|k| k.id != id);
                    s.visibility.remove(&id);
                    s.deleted.insert(id.clone());
                }
                Err(_) => s.error = Some(DELETE_FAILED_BANNER.into()),
            }
        });

        match result {
            Ok(()) => {
                info!(id = %id, "api key deleted");
                self.notifier
                    .notify(Message::success("API key deleted successfully"));
            }
            Err(e) => self.report(FlowError::DeleteFailed(e)),
        }
    }

    /// Flip masked/full display for one row. Returns the new visibility.
    pub fn toggle_visibility(&self, id: &str) -> bool {
        self.with_state(|s| {
            let visible = s.visibility.entry(id.to_string()).or_insert(false);
            *visible = !*visible;
            *visible
        })
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.with_state(|s| s.visibility.get(id).copied().unwrap_or(false))
    }

    /// Best-effort copy; the outcome is only reported, never stored.
    pub fn copy_to_clipboard(&self, secret: &str) -> bool {
        match self.clipboard.write_text(secret) {
            Ok(()) => {
                self.notifier
                    .notify(Message::success("API key copied to clipboard"));
                true
            }
            Err(e) => {
                self.report(FlowError::Clipboard(e));
                false
            }
        }
    }

    /// Copy the full secret of a listed key.
    pub fn copy_key(&self, id: &str) -> bool {
        let secret = self.with_state(|s| {
            s.keys
                .iter()
                .find(|k| k.id == id)
                .map(|k| zeroize::Zeroizing::new(k.secret.clone()))
        });
        match secret {
            Some(secret) => self.copy_to_clipboard(&secret),
            None => false,
        }
    }

    /// Copy the secret currently shown in the reveal panel.
    pub fn copy_revealed_secret(&self) -> bool {
        let secret = self.with_state(|s| match &s.creation {
            CreationPanel::Revealed(created) => Some(created.secret.clone()),
            _ => None,
        });
        match secret {
            Some(secret) => self.copy_to_clipboard(&secret),
            None => false,
        }
    }

    /// Hide the inline error banner.
    pub fn dismiss_error(&self) {
        self.with_state(|s| s.error = None);
    }

    pub fn view(&self) -> KeyListView {
        self.with_state(|s| {
            let keys = s
                .keys
                .iter()
                .map(|k| {
                    let visible = s.visibility.get(&k.id).copied().unwrap_or(false);
                    KeyRow {
                        id: k.id.clone(),
                        name: k.name.clone(),
                        display_secret: mask_secret(&k.secret, visible),
                        visible,
                        created_at: k.created_at,
                        last_used_at: k.last_used_at,
                    }
                })
                .collect();
            let (pending_delete_id, deleting_id) = match &s.deletion {
                DeletionState::None => (None, None),
                DeletionState::PendingConfirmation(id) => (Some(id.clone()), None),
                DeletionState::Deleting(id) => (None, Some(id.clone())),
            };
            KeyListView {
                keys,
                is_loading: s.in_flight_refreshes > 0,
                error: s.error.clone(),
                pending_creation: s.creation.clone(),
                pending_delete_id,
                deleting_id,
            }
        })
    }

    pub fn deletion_state(&self) -> DeletionState {
        self.with_state(|s| s.deletion.clone())
    }
}

/// Names generated keys `key-YYYY-MM-DD`.
pub fn default_key_name(now: DateTime<Utc>) -> String {
    format!("key-{}", now.format("%Y-%m-%d"))
}
