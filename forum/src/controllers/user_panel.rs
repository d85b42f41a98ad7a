//! Login, registration and logout.

use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiError, AuthSession, ForumBackend};
use crate::models::{Credentials, User};
use crate::session::SessionStore;
use crate::state::AppState;

/// Which dialog of the panel is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialog {
    Login,
    Register,
    Options,
}

#[derive(Debug, Error)]
pub enum PanelError {
    /// Registration passwords differ; nothing was sent.
    #[error("Passwords don't match")]
    PasswordMismatch,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to update session: {0}")]
    Store(#[from] std::io::Error),
}

/// Holds the open dialog and the last inline error; the user itself lives in [`AppState`].
#[derive(Debug, Default)]
pub struct UserPanel {
    dialog: Option<Dialog>,
    error: Option<String>,
}

impl UserPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn dialog(&self) -> Option<Dialog> {
        self.dialog
    }

    pub fn open(&mut self, dialog: Dialog) {
        self.dialog = Some(dialog);
        self.error = None;
    }

    pub fn close(&mut self) {
        self.dialog = None;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn login(
        &mut self,
        backend: &dyn ForumBackend,
        store: &dyn SessionStore,
        state: &mut AppState,
        credentials: &Credentials,
    ) -> Result<User, PanelError> {
        let result = backend.login(credentials).await;
        self.authenticated(result, Dialog::Login, store, state)
    }

    /// Register a new account. The passwords are compared before anything is sent.
    pub async fn register(
        &mut self,
        backend: &dyn ForumBackend,
        store: &dyn SessionStore,
        state: &mut AppState,
        credentials: &Credentials,
        password_repeat: &str,
    ) -> Result<User, PanelError> {
        if credentials.password != password_repeat {
            return Err(PanelError::PasswordMismatch);
        }

        let result = backend.register(credentials).await;
        self.authenticated(result, Dialog::Register, store, state)
    }

    /// Forget the current user and the session token.
    ///
    /// The user is dropped from memory even when the store cannot be cleared.
    pub fn logout(
        &mut self,
        store: &dyn SessionStore,
        state: &mut AppState,
    ) -> Result<Option<User>, PanelError> {
        let user = state.clear_user();
        if let Some(user) = &user {
            info!(user = %user.username, "logged out");
        }
        if self.dialog == Some(Dialog::Options) {
            self.close();
        }

        if let Err(e) = store.clear() {
            warn!(error = %e, "failed to clear stored session");
            let err = PanelError::Store(e);
            self.error = Some(err.to_string());
            return Err(err);
        }
        Ok(user)
    }

    fn authenticated(
        &mut self,
        result: Result<AuthSession, ApiError>,
        dialog: Dialog,
        store: &dyn SessionStore,
        state: &mut AppState,
    ) -> Result<User, PanelError> {
        let session = match result {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, status = ?e.status(), ?dialog, "authentication failed");
                return Err(self.failed(dialog, e.into()));
            }
        };

        match &session.session_id {
            Some(token) => {
                if let Err(e) = store.save(token) {
                    warn!(error = %e, "failed to store session");
                    return Err(self.failed(dialog, e.into()));
                }
            }
            None => warn!("backend did not issue a session token"),
        }

        info!(user = %session.user.username, "logged in");
        state.set_user(session.user.clone());
        self.error = None;
        if self.dialog == Some(dialog) {
            self.close();
        }
        Ok(session.user)
    }

    /// Record `err` inline and keep `dialog` open.
    fn failed(&mut self, dialog: Dialog, err: PanelError) -> PanelError {
        self.error = Some(err.to_string());
        self.dialog = Some(dialog);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{self, Call, FakeBackend};
    use crate::session::{MemorySessionStore, ReadOnlySessionStore};

    #[tokio::test]
    async fn test_login_success() {
        let backend = FakeBackend::new().with_account("alice", "secret");
        let store = MemorySessionStore::new();
        let mut state = AppState::default();
        let mut panel = UserPanel::new();
        panel.open(Dialog::Login);

        let user = panel
            .login(&backend, &store, &mut state, &Credentials::new("alice", "secret"))
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert!(state.user().is_some());
        assert_eq!(panel.dialog(), None);
        assert!(store.load().unwrap().is_some());
    }

    #[tokio::test]
    async fn test_login_failure_keeps_dialog_open() {
        let backend = FakeBackend::new().with_account("alice", "secret");
        let store = MemorySessionStore::new();
        let mut state = AppState::default();
        let mut panel = UserPanel::new();
        panel.open(Dialog::Login);

        let err = panel
            .login(&backend, &store, &mut state, &Credentials::new("alice", "nope"))
            .await
            .unwrap_err();

        assert!(matches!(err, PanelError::Api(_)));
        assert!(state.user().is_none());
        assert_eq!(panel.dialog(), Some(Dialog::Login));
        assert!(panel.error().unwrap().contains("Authentication failed."));
        assert_eq!(store.load().unwrap(), None);
    }

    #[tokio::test]
    async fn test_register_mismatch_sends_nothing() {
        let backend = FakeBackend::new();
        let store = MemorySessionStore::new();
        let mut state = AppState::default();
        let mut panel = UserPanel::new();

        let err = panel
            .register(&backend, &store, &mut state, &Credentials::new("bob", "a"), "b")
            .await
            .unwrap_err();

        assert!(matches!(err, PanelError::PasswordMismatch));
        assert!(backend.calls().is_empty());
        assert!(state.user().is_none());
    }

    #[tokio::test]
    async fn test_register_sends_exactly_once() {
        let backend = FakeBackend::new();
        let store = MemorySessionStore::new();
        let mut state = AppState::default();
        let mut panel = UserPanel::new();
        panel.open(Dialog::Register);

        panel
            .register(&backend, &store, &mut state, &Credentials::new("bob", "pw"), "pw")
            .await
            .unwrap();

        assert_eq!(
            backend.calls(),
            vec![Call::Register {
                name: "bob".to_string(),
                password: "pw".to_string()
            }]
        );
        assert_eq!(state.user().unwrap().username, "bob");
        assert_eq!(panel.dialog(), None);
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let backend = FakeBackend::new().with_account("alice", "secret");
        let store = MemorySessionStore::new();
        let mut state = AppState::default();
        let mut panel = UserPanel::new();
        panel
            .login(&backend, &store, &mut state, &Credentials::new("alice", "secret"))
            .await
            .unwrap();
        panel.open(Dialog::Options);

        let user = panel.logout(&store, &mut state).unwrap();
        assert_eq!(user.unwrap().username, "alice");
        assert!(state.user().is_none());
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(panel.dialog(), None);
    }

    #[tokio::test]
    async fn test_login_with_unwritable_store_reports_inline() {
        let backend = FakeBackend::new().with_account("alice", "secret");
        let store = ReadOnlySessionStore::new(None);
        let mut state = AppState::default();
        let mut panel = UserPanel::new();
        panel.open(Dialog::Login);

        let err = panel
            .login(&backend, &store, &mut state, &Credentials::new("alice", "secret"))
            .await
            .unwrap_err();

        assert!(matches!(err, PanelError::Store(_)));
        assert!(state.user().is_none());
        assert_eq!(panel.dialog(), Some(Dialog::Login));
        assert!(panel.error().unwrap().contains("read-only"));
    }

    #[test]
    fn test_logout_forgets_user_when_store_fails() {
        let store = ReadOnlySessionStore::new(Some("tok"));
        let mut state = AppState::default();
        state.set_user(fake::user("u-alice", "alice"));
        let mut panel = UserPanel::new();

        let err = panel.logout(&store, &mut state).unwrap_err();
        assert!(matches!(err, PanelError::Store(_)));
        assert!(state.user().is_none());
        assert!(panel.error().unwrap().contains("read-only"));
    }
}
