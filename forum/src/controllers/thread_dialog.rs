//! Dialog for starting a new thread.

use tracing::{info, warn};

use crate::api::{ApiError, ForumBackend};
use crate::models::{NewThread, Thread};

#[derive(Debug, Default)]
pub struct ThreadDialog {
    open: bool,
    name: String,
    error: Option<String>,
}

impl ThreadDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
        self.error = None;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Create a thread from the entered name.
    ///
    /// A blank name is a no-op. On success the dialog closes and resets; on
    /// failure it stays open with the error recorded.
    pub async fn submit(&mut self, backend: &dyn ForumBackend) -> Result<Option<Thread>, ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Ok(None);
        }

        let request = NewThread {
            name: name.to_string(),
        };
        match backend.create_thread(&request).await {
            Ok(thread) => {
                info!(id = %thread.id, name = %thread.name, "thread created");
                self.open = false;
                self.name.clear();
                self.error = None;
                Ok(Some(thread))
            }
            Err(e) => {
                warn!(error = %e, "failed to create thread");
                self.open = true;
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{Call, FakeBackend};

    #[tokio::test]
    async fn test_blank_name_is_noop() {
        let backend = FakeBackend::new();
        let mut dialog = ThreadDialog::new();
        dialog.open();
        dialog.set_name("   ");

        assert!(dialog.submit(&backend).await.unwrap().is_none());
        assert!(dialog.is_open());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_closes_dialog() {
        let backend = FakeBackend::new();
        let mut dialog = ThreadDialog::new();
        dialog.open();
        dialog.set_name("  Announcements ");

        let thread = dialog.submit(&backend).await.unwrap().unwrap();
        assert_eq!(thread.name, "Announcements");
        assert!(!dialog.is_open());
        assert_eq!(dialog.name(), "");
        assert_eq!(
            backend.calls(),
            vec![Call::CreateThread("Announcements".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_dialog_open() {
        let backend = FakeBackend::new();
        backend.fail_threads(Some("Thread name can't be empty"));
        let mut dialog = ThreadDialog::new();
        dialog.set_name("News");

        assert!(dialog.submit(&backend).await.is_err());
        assert!(dialog.is_open());
        assert_eq!(dialog.name(), "News");
        assert!(dialog.error().unwrap().contains("can't be empty"));
    }
}
