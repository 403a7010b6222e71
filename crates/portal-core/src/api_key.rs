use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use zeroize::Zeroizing;

/// A stored API key.
///
/// The store owns these; everyone else works on clones. The secret is
/// never serialized and never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ApiKeyRecord {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub secret: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for ApiKeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyRecord")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("last_used_at", &self.last_used_at)
            .finish()
    }
}

/// The one-time response to a key creation, carrying the full secret.
///
/// The secret buffer is zeroed when the value is dropped.
#[derive(Clone)]
pub struct CreationResult {
    pub id: String,
    pub name: String,
    pub secret: Zeroizing<String>,
    pub created_at: DateTime<Utc>,
}

impl CreationResult {
    pub fn from_record(record: &ApiKeyRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            secret: Zeroizing::new(record.secret.clone()),
            created_at: record.created_at,
        }
    }

    pub fn secret(&self) -> &str {
        self.secret.as_str()
    }
}

impl fmt::Debug for CreationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreationResult")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Short display date, e.g. `Sep 15, 2023`. Missing dates render as `N/A`.
pub fn format_date(at: Option<&DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.format("%b %-d, %Y").to_string(),
        None => "N/A".into(),
    }
}
