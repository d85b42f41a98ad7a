//! The forum shell: sidebar, main panel and the wiring between them.
//!
//! [`Forum`] owns every controller plus the shared [`AppState`]. User actions
//! go through its methods; fetches either run inline (one-shot commands) or
//! in spawned tasks whose results come back as [`Update`]s (the watch loop).

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use tokio::sync::mpsc;

use crate::api::{ApiError, ForumBackend};
use crate::controllers::{
    Composer, ComposerError, ComposerMode, Dialog, PanelError, PostFetch, PostList, PostListView,
    ThreadDialog, ThreadList, UserPanel,
};
use crate::models::{short_id, Credentials, Post, Thread, User};
use crate::resource::{FetchTicket, View};
use crate::session::{resolve_session, SessionOutcome, SessionStore};
use crate::state::AppState;

/// Result of a background fetch, delivered back to the shell.
#[derive(Debug)]
pub enum Update {
    Threads {
        ticket: FetchTicket,
        result: Result<Vec<Thread>, ApiError>,
    },
    Posts {
        fetch: PostFetch,
        result: Result<Vec<Post>, ApiError>,
    },
}

pub struct Forum {
    backend: Arc<dyn ForumBackend>,
    store: Arc<dyn SessionStore>,
    state: AppState,
    threads: ThreadList,
    posts: PostList,
    composer: Composer,
    panel: UserPanel,
    thread_dialog: ThreadDialog,
    session: Option<SessionOutcome>,
}

impl Forum {
    pub fn new(backend: Arc<dyn ForumBackend>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            backend,
            store,
            state: AppState::default(),
            threads: ThreadList::new(),
            posts: PostList::new(),
            composer: Composer::new(),
            panel: UserPanel::new(),
            thread_dialog: ThreadDialog::new(),
            session: None,
        }
    }

    pub const fn state(&self) -> &AppState {
        &self.state
    }

    pub const fn threads(&self) -> &ThreadList {
        &self.threads
    }

    pub const fn posts(&self) -> &PostList {
        &self.posts
    }

    pub const fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn composer_mut(&mut self) -> &mut Composer {
        &mut self.composer
    }

    pub fn panel_mut(&mut self) -> &mut UserPanel {
        &mut self.panel
    }

    /// Resolve the stored session. Only the first call talks to the backend.
    pub async fn resolve_session(&mut self) -> SessionOutcome {
        if let Some(outcome) = &self.session {
            return outcome.clone();
        }
        let outcome = resolve_session(&*self.backend, &*self.store, &mut self.state).await;
        self.session = Some(outcome.clone());
        outcome
    }

    /// Mount the shell: resolve the session and load the thread list.
    pub async fn start(&mut self) -> SessionOutcome {
        let outcome = self.resolve_session().await;
        self.refresh_threads().await;
        outcome
    }

    pub async fn refresh_threads(&mut self) -> bool {
        let applied = self.threads.refresh(&*self.backend).await;
        self.threads.sync_selection(&mut self.state);
        applied
    }

    /// Select a thread without fetching anything.
    pub fn select_local(&mut self, key: &str) -> Result<Thread> {
        self.threads
            .select(key, &mut self.state)
            .with_context(|| format!("No thread matching '{key}'"))?;
        self.state
            .selected_thread()
            .cloned()
            .context("Selection was not stored")
    }

    /// Select a thread and load its posts.
    pub async fn select_thread(&mut self, key: &str) -> Result<Thread> {
        let thread = self.select_local(key)?;
        self.posts.sync(&*self.backend, &self.state).await;
        Ok(thread)
    }

    /// Send the composer content to the selected thread.
    ///
    /// On success the refresh key is bumped and the post list re-fetched.
    pub async fn submit_post(&mut self) -> Result<Option<Post>, ComposerError> {
        let backend = Arc::clone(&self.backend);
        let created = self
            .composer
            .submit(
                self.state.selected_thread(),
                self.state.user(),
                |post| async move { backend.create_post(&post).await },
            )
            .await?;

        if created.is_some() {
            self.state.bump_post_refresh();
            self.posts.sync(&*self.backend, &self.state).await;
        }
        Ok(created)
    }

    /// Create a thread, reload the list, and select the new thread.
    pub async fn create_thread(&mut self, name: &str) -> Result<Option<Thread>, ApiError> {
        if name.trim().is_empty() {
            return Ok(None);
        }
        self.thread_dialog.open();
        self.thread_dialog.set_name(name);
        let Some(thread) = self.thread_dialog.submit(&*self.backend).await? else {
            return Ok(None);
        };

        self.refresh_threads().await;
        self.state.select_thread(thread.clone());
        self.posts.sync(&*self.backend, &self.state).await;
        Ok(Some(thread))
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<User, PanelError> {
        let credentials = Credentials::new(username, password);
        self.panel
            .login(&*self.backend, &*self.store, &mut self.state, &credentials)
            .await
    }

    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
        password_repeat: &str,
    ) -> Result<User, PanelError> {
        let credentials = Credentials::new(username, password);
        self.panel
            .register(
                &*self.backend,
                &*self.store,
                &mut self.state,
                &credentials,
                password_repeat,
            )
            .await
    }

    pub fn logout(&mut self) -> Result<Option<User>, PanelError> {
        self.panel.logout(&*self.store, &mut self.state)
    }

    /// Start a thread-list fetch in the background.
    pub fn spawn_thread_refresh(&mut self, tx: &mpsc::Sender<Update>) {
        let ticket = self.threads.begin();
        let backend = Arc::clone(&self.backend);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = backend.list_threads().await;
            let _ = tx.send(Update::Threads { ticket, result }).await;
        });
    }

    /// Bump the refresh key and fetch posts in the background.
    pub fn spawn_post_refresh(&mut self, tx: &mpsc::Sender<Update>) {
        self.state.bump_post_refresh();
        self.spawn_post_sync(tx);
    }

    /// Fetch posts in the background if the selection or refresh key changed.
    pub fn spawn_post_sync(&mut self, tx: &mpsc::Sender<Update>) {
        if !self.posts.needs_fetch(&self.state) {
            return;
        }
        let Some(fetch) = self.posts.begin(&self.state) else {
            return;
        };

        let backend = Arc::clone(&self.backend);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = backend.list_posts(&fetch.thread_id).await;
            let _ = tx.send(Update::Posts { fetch, result }).await;
        });
    }

    /// Apply a background result. Returns `false` for superseded results.
    pub fn apply(&mut self, update: Update) -> bool {
        match update {
            Update::Threads { ticket, result } => {
                let applied = self.threads.finish(ticket, result);
                self.threads.sync_selection(&mut self.state);
                applied
            }
            Update::Posts { fetch, result } => self.posts.finish(&fetch, result),
        }
    }

    /// Render the whole screen.
    pub fn render(&self) -> String {
        let mut out = self.render_sidebar();
        out.push('\n');
        out.push_str(&self.render_main());
        out
    }

    /// Thread list plus the user line.
    pub fn render_sidebar(&self) -> String {
        let mut out = String::from("Threads\n");
        let selected = self.state.selected_thread_id();

        match self.threads.view() {
            View::Idle | View::Loading => out.push_str("Loading...\n"),
            View::Failed(msg) => {
                let _ = writeln!(out, "Error: {msg}");
            }
            View::Ready(threads) => {
                if threads.is_empty() {
                    out.push_str("No threads yet.\n");
                }
                for (i, thread) in threads.iter().enumerate() {
                    let marker = if selected == Some(thread.id.as_str()) { '>' } else { ' ' };
                    let _ = writeln!(out, "{marker} {:>2}. {}", i + 1, thread.name);
                }
                if let Some(msg) = self.threads.error() {
                    let _ = writeln!(out, "Error: {msg}");
                }
            }
        }

        if self.thread_dialog.is_open() {
            let _ = writeln!(out, "[new thread] {}", self.thread_dialog.name());
            if let Some(msg) = self.thread_dialog.error() {
                let _ = writeln!(out, "Error: {msg}");
            }
        }

        out.push_str(&"-".repeat(30));
        out.push('\n');
        match self.state.user() {
            Some(user) => {
                let _ = writeln!(out, "{}", user.username);
            }
            None => out.push_str("Anonymous / Login\n"),
        }
        if let Some(dialog) = self.panel.dialog() {
            let _ = writeln!(out, "[{}]", dialog_label(dialog));
        }
        if let Some(msg) = self.panel.error() {
            let _ = writeln!(out, "Error: {msg}");
        }
        out
    }

    /// Selected thread with its posts, followed by the composer.
    pub fn render_main(&self) -> String {
        let mut out = String::new();
        let Some(thread) = self.state.selected_thread() else {
            out.push_str("No thread selected.\n");
            return out;
        };

        let _ = writeln!(out, "{}", thread.name);
        out.push_str(&"=".repeat(thread.name.chars().count().max(3)));
        out.push('\n');
        let view = self.posts.view(&self.state);
        out.push_str(&render_posts(&view));
        // Failed refresh with posts still shown: keep them and report below.
        if let (PostListView::Posts(_), Some(msg)) = (&view, self.posts.error()) {
            let _ = writeln!(out, "Error: {msg}");
        }

        if !self.composer.text().is_empty() {
            out.push('\n');
            out.push_str(&self.render_composer());
        }
        out
    }

    pub fn render_composer(&self) -> String {
        let mut out = String::new();
        match self.composer.mode() {
            ComposerMode::Edit => out.push_str("[draft]\n"),
            ComposerMode::Preview => out.push_str("[preview]\n"),
        }
        out.push_str(self.composer.preview());
        out.push('\n');
        out
    }
}

/// Text for the post area of the main panel.
pub fn render_posts(view: &PostListView<'_>) -> String {
    let mut out = String::new();
    match view {
        PostListView::NoThread => out.push_str("No thread selected.\n"),
        PostListView::Loading => out.push_str("Loading...\n"),
        PostListView::Failed(msg) => {
            let _ = writeln!(out, "Error: {msg}");
        }
        PostListView::Empty => out.push_str("No posts in thread\n"),
        PostListView::Posts(posts) => {
            for post in *posts {
                let _ = writeln!(
                    out,
                    "#{} {} · {}",
                    short_id(&post.id),
                    post.display_author(),
                    local_time(post.created_at)
                );
                let _ = writeln!(out, "{}", post.content);
                out.push('\n');
            }
        }
    }
    out
}

pub fn local_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

const fn dialog_label(dialog: Dialog) -> &'static str {
    match dialog {
        Dialog::Login => "login",
        Dialog::Register => "register",
        Dialog::Options => "options",
    }
}
