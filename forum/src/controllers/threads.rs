//! Sidebar thread list.

use tracing::warn;

use crate::api::{ApiError, ForumBackend};
use crate::models::Thread;
use crate::resource::{FetchTicket, Resource, View};
use crate::state::AppState;

/// The thread collection in backend order, refreshed on mount and on a timer.
#[derive(Debug, Default)]
pub struct ThreadList {
    threads: Resource<Vec<Thread>>,
}

impl ThreadList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> FetchTicket {
        self.threads.begin()
    }

    /// Apply a fetch result. Stale data stays visible when the fetch failed.
    pub fn finish(&mut self, ticket: FetchTicket, result: Result<Vec<Thread>, ApiError>) -> bool {
        if let Err(e) = &result {
            warn!(error = %e, "failed to fetch threads");
        }
        self.threads.finish(ticket, result)
    }

    pub async fn refresh(&mut self, backend: &dyn ForumBackend) -> bool {
        let applied = self.threads.refresh(|| backend.list_threads()).await;
        if let Some(e) = self.threads.error() {
            warn!(error = %e, "failed to fetch threads");
        }
        applied
    }

    pub fn threads(&self) -> &[Thread] {
        self.threads.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn view(&self) -> View<'_, Vec<Thread>> {
        self.threads.view()
    }

    pub fn error(&self) -> Option<&str> {
        self.threads.error()
    }

    /// Look a thread up by 1-based position, exact id, or unique id prefix.
    pub fn find(&self, key: &str) -> Option<&Thread> {
        let threads = self.threads();
        let key = key.trim();
        if key.is_empty() {
            return None;
        }

        if let Ok(index) = key.parse::<usize>() {
            if let Some(thread) = index.checked_sub(1).and_then(|i| threads.get(i)) {
                return Some(thread);
            }
        }

        if let Some(thread) = threads.iter().find(|t| t.id == key) {
            return Some(thread);
        }

        let prefix = key.to_lowercase();
        let mut matches = threads
            .iter()
            .filter(|t| t.id.to_lowercase().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(thread), None) => Some(thread),
            _ => None,
        }
    }

    /// Make the thread matching `key` the selected one.
    ///
    /// Purely local: no request is made. Returns `None` when nothing matches,
    /// otherwise whether the selection changed.
    pub fn select(&self, key: &str, state: &mut AppState) -> Option<bool> {
        let thread = self.find(key)?.clone();
        Some(state.select_thread(thread))
    }

    /// Refresh the selected thread's record from the latest list, keeping the selection.
    pub fn sync_selection(&self, state: &mut AppState) {
        let updated = state
            .selected_thread_id()
            .and_then(|id| self.threads().iter().find(|t| t.id == id))
            .cloned();
        if let Some(thread) = updated {
            state.select_thread(thread);
        }
    }
}
