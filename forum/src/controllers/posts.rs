//! Main panel post list for the selected thread.

use tracing::warn;

use crate::api::{ApiError, ForumBackend};
use crate::models::Post;
use crate::resource::{FetchTicket, Resource, View};
use crate::state::AppState;

/// A post fetch in flight: which thread it is for and its ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFetch {
    pub ticket: FetchTicket,
    pub thread_id: String,
}

/// What the main panel shows.
#[derive(Debug, PartialEq, Eq)]
pub enum PostListView<'a> {
    NoThread,
    Loading,
    Failed(&'a str),
    Empty,
    Posts(&'a [Post]),
}

/// Posts of the selected thread.
///
/// Re-fetches whenever the selected thread or the refresh key differs from
/// what the last fetch was made for.
#[derive(Debug, Default)]
pub struct PostList {
    posts: Resource<Vec<Post>>,
    /// Thread id and refresh key of the latest fetch.
    fetched_for: Option<(String, u64)>,
}

impl PostList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the selection or refresh key moved since the last fetch.
    pub fn needs_fetch(&self, state: &AppState) -> bool {
        let Some(thread_id) = state.selected_thread_id() else {
            return false;
        };
        let current = self
            .fetched_for
            .as_ref()
            .map(|(id, key)| (id.as_str(), *key));
        current != Some((thread_id, state.post_refresh_key()))
    }

    /// Start a fetch for the selected thread. `None` when no thread is selected.
    pub fn begin(&mut self, state: &AppState) -> Option<PostFetch> {
        let thread_id = state.selected_thread_id()?.to_string();

        let same_thread = self
            .fetched_for
            .as_ref()
            .is_some_and(|(id, _)| *id == thread_id);
        if !same_thread {
            // Another thread's posts must not show while the new ones load.
            self.posts.reset();
        }

        let ticket = self.posts.begin();
        self.fetched_for = Some((thread_id.clone(), state.post_refresh_key()));
        Some(PostFetch { ticket, thread_id })
    }

    pub fn finish(&mut self, fetch: &PostFetch, result: Result<Vec<Post>, ApiError>) -> bool {
        if let Err(e) = &result {
            warn!(thread = %fetch.thread_id, error = %e, "failed to fetch posts");
        }
        self.posts.finish(fetch.ticket, result)
    }

    /// Fetch if the dependencies changed. Returns whether a result was applied.
    pub async fn sync(&mut self, backend: &dyn ForumBackend, state: &AppState) -> bool {
        if !self.needs_fetch(state) {
            return false;
        }
        self.fetch(backend, state).await
    }

    /// Fetch unconditionally for the selected thread.
    pub async fn fetch(&mut self, backend: &dyn ForumBackend, state: &AppState) -> bool {
        let Some(fetch) = self.begin(state) else {
            return false;
        };
        let result = backend.list_posts(&fetch.thread_id).await;
        self.finish(&fetch, result)
    }

    #[cfg(test)]
    pub fn posts(&self) -> &[Post] {
        self.posts.data().map(Vec::as_slice).unwrap_or_default()
    }

    pub fn error(&self) -> Option<&str> {
        self.posts.error()
    }

    pub fn view(&self, state: &AppState) -> PostListView<'_> {
        if state.selected_thread().is_none() {
            return PostListView::NoThread;
        }
        match self.posts.view() {
            View::Idle | View::Loading => PostListView::Loading,
            View::Failed(msg) => PostListView::Failed(msg),
            View::Ready(posts) if posts.is_empty() => PostListView::Empty,
            View::Ready(posts) => PostListView::Posts(posts),
        }
    }
}
