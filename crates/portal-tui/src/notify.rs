use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use portal_core::Severity;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::debug;

/// Default time a notification stays on screen.
pub const DEFAULT_LIFETIME: Duration = Duration::from_millis(5000);

pub type NotificationId = u64;

/// What to show; turned into a [`Notification`] by [`Notifier::notify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub severity: Severity,
    pub title: Option<String>,
    pub text: String,
    /// Overrides the notifier's default lifetime.
    pub lifetime: Option<Duration>,
}

impl Message {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            title: None,
            text: text.into(),
            lifetime: None,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(Severity::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(Severity::Success, text).with_title("Success")
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Severity::Error, text).with_title("Error")
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }
}

/// An active, on-screen notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub severity: Severity,
    pub title: Option<String>,
    pub text: String,
    pub lifetime: Duration,
}

/// Fire-and-forget message sink with per-message expiry.
///
/// Every notification owns its own timer task. Ids come from a counter and
/// are never reused, so a late timer can only ever remove its own entry.
/// Outside a Tokio runtime no timer is started and the notification stays
/// until dismissed.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
}

struct Inner {
    next_id: AtomicU64,
    default_lifetime: Duration,
    active: Mutex<Active>,
}

#[derive(Default)]
struct Active {
    items: Vec<Notification>,
    timers: HashMap<NotificationId, AbortHandle>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Active> {
        self.active.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn expire(&self, id: NotificationId) {
        let mut active = self.lock();
        active.timers.remove(&id);
        active.items.retain(|n| n.id != id);
        debug!(id, "notification expired");
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let active = self.active.get_mut().unwrap_or_else(|e| e.into_inner());
        for (_, timer) in active.timers.drain() {
            timer.abort();
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_LIFETIME)
    }
}

impl Notifier {
    pub fn new(default_lifetime: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(1),
                default_lifetime,
                active: Mutex::new(Active::default()),
            }),
        }
    }

    pub fn default_lifetime(&self) -> Duration {
        self.inner.default_lifetime
    }

    /// Show a message and schedule its removal.
    pub fn notify(&self, message: Message) -> NotificationId {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let lifetime = message.lifetime.unwrap_or(self.inner.default_lifetime);
        debug!(id, severity = %message.severity, text = %message.text, "notify");

        let mut active = self.inner.lock();
        active.items.push(Notification {
            id,
            severity: message.severity,
            title: message.title,
            text: message.text,
            lifetime,
        });

        let Ok(runtime) = Handle::try_current() else {
            debug!(id, "no runtime, notification kept until dismissed");
            return id;
        };
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let timer = runtime.spawn(async move {
            tokio::time::sleep(lifetime).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire(id);
            }
        });
        active.timers.insert(id, timer.abort_handle());
        id
    }

    /// Remove a notification before its timer fires.
    ///
    /// Returns `false` if it already expired or was dismissed.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let mut active = self.inner.lock();
        let before = active.items.len();
        active.items.retain(|n| n.id != id);
        let removed = active.items.len() != before;
        if let Some(timer) = active.timers.remove(&id) {
            timer.abort();
        }
        removed
    }

    /// Dismiss the most recently added notification, if any.
    pub fn dismiss_latest(&self) -> Option<NotificationId> {
        let latest = self.inner.lock().items.last().map(|n| n.id)?;
        self.dismiss(latest).then_some(latest)
    }

    /// Active notifications, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.inner.lock().items.clone()
    }
}
