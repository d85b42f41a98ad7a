//! Application state shared by the controllers.

use crate::models::{Thread, User};

/// The client-wide view state: who is logged in, which thread is open, and
/// the refresh key that forces the post list to re-fetch.
#[derive(Debug, Default)]
pub struct AppState {
    user: Option<User>,
    selected: Option<Thread>,
    post_refresh: u64,
}

impl AppState {
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Forget the current user, returning it.
    pub fn clear_user(&mut self) -> Option<User> {
        self.user.take()
    }

    pub const fn selected_thread(&self) -> Option<&Thread> {
        self.selected.as_ref()
    }

    pub fn selected_thread_id(&self) -> Option<&str> {
        self.selected.as_ref().map(|t| t.id.as_str())
    }

    /// Store the selected thread. Returns `true` when a different thread is now selected.
    pub fn select_thread(&mut self, thread: Thread) -> bool {
        let changed = self.selected_thread_id() != Some(thread.id.as_str());
        self.selected = Some(thread);
        changed
    }

    pub const fn post_refresh_key(&self) -> u64 {
        self.post_refresh
    }

    /// Increment the post refresh key, returning the new value.
    pub fn bump_post_refresh(&mut self) -> u64 {
        self.post_refresh += 1;
        self.post_refresh
    }
}
