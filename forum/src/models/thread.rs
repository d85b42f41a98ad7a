//! Thread model representing a named discussion container.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discussion thread as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    /// Unique thread identifier assigned by the backend.
    pub id: String,
    /// Display name of the thread.
    pub name: String,
    /// When the thread was created.
    pub created_at: DateTime<Utc>,
    /// When the last post arrived. Older backends omit it.
    #[serde(default)]
    pub last_active: Option<DateTime<Utc>>,
}

impl Thread {
    /// First eight characters of the id, uppercased, for compact listings.
    pub fn short_id(&self) -> String {
        short_id(&self.id)
    }
}

/// Request body for `POST /api/threads`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewThread {
    pub name: String,
}

pub(crate) fn short_id(id: &str) -> String {
    id.chars().take(8).collect::<String>().to_uppercase()
}
