//! Post model representing a single message in a thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used for posts without an author.
pub const ANONYMOUS: &str = "Anonymous";

/// A post as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique post identifier.
    pub id: String,
    /// Thread this post belongs to.
    pub thread_id: String,
    /// Author user id, `None` for anonymous posts.
    pub author_id: Option<String>,
    /// Author name as reported by the backend.
    #[serde(default)]
    pub author_name: String,
    /// Raw markdown content.
    pub content: String,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Name shown in the post header.
    ///
    /// Anonymous posts always show [`ANONYMOUS`], whatever name the backend sent.
    pub fn display_author(&self) -> &str {
        if self.is_anonymous() {
            ANONYMOUS
        } else {
            &self.author_name
        }
    }

    pub const fn is_anonymous(&self) -> bool {
        self.author_id.is_none()
    }
}

/// Request body for `POST /api/posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub thread_id: String,
    /// Serialized as `null` for anonymous posts.
    pub author_id: Option<String>,
    pub content: String,
}
