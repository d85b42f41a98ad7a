//! One-shot exchange of the stored session token for a user.

use tracing::{debug, info, warn};

use super::SessionStore;
use crate::api::ForumBackend;
use crate::models::User;
use crate::state::AppState;

/// Result of resolving the stored session at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// No token was stored.
    Anonymous,
    /// The token resolved to this user, now the current user.
    Authenticated(User),
    /// The backend rejected the token; it has been removed from the store.
    Expired,
    /// Resolution failed for another reason; state was left unchanged.
    Failed(String),
}

#[cfg(test)]
impl SessionOutcome {
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Resolve the stored session token into the current user.
///
/// Never retries and never fails hard: every problem is reported through the
/// returned outcome.
pub async fn resolve_session(
    backend: &dyn ForumBackend,
    store: &dyn SessionStore,
    state: &mut AppState,
) -> SessionOutcome {
    let token = match store.load() {
        Ok(Some(token)) => token,
        Ok(None) => {
            debug!("no stored session");
            return SessionOutcome::Anonymous;
        }
        Err(e) => {
            warn!(error = %e, "failed to read session store");
            return SessionOutcome::Failed(format!("Failed to read session: {e}"));
        }
    };

    match backend.authenticate(&token).await {
        Ok(user) => {
            info!(user = %user.username, "session resolved");
            state.set_user(user.clone());
            SessionOutcome::Authenticated(user)
        }
        Err(e) if e.is_session_expired() => {
            info!("stored session expired");
            if let Err(e) = store.clear() {
                warn!(error = %e, "failed to clear expired session");
            }
            state.clear_user();
            SessionOutcome::Expired
        }
        Err(e) => {
            warn!(error = %e, "session resolution failed");
            SessionOutcome::Failed(e.to_string())
        }
    }
}
