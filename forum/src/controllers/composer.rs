//! Markdown post composer.

use std::fmt::Display;
use std::future::Future;

use thiserror::Error;

use crate::models::{NewPost, Thread, User};

/// Whether the composer shows the raw buffer or the preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ComposerMode {
    #[default]
    Edit,
    Preview,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposerError {
    #[error("No thread selected")]
    NoThread,
    #[error("Failed to submit post: {0}")]
    Submit(String),
}

/// Buffer for an in-progress post.
///
/// Markdown is never interpreted here; the preview is the buffer verbatim,
/// handed to whatever renders it.
#[derive(Debug, Default)]
pub struct Composer {
    buffer: String,
    mode: ComposerMode,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Append a line, separating it from existing content with a newline.
    pub fn push_line(&mut self, line: &str) {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(line);
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn is_blank(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    pub const fn mode(&self) -> ComposerMode {
        self.mode
    }

    /// Flip between edit and preview, returning the new mode.
    pub fn toggle_preview(&mut self) -> ComposerMode {
        self.mode = match self.mode {
            ComposerMode::Edit => ComposerMode::Preview,
            ComposerMode::Preview => ComposerMode::Edit,
        };
        self.mode
    }

    /// Content for the preview pane.
    pub fn preview(&self) -> &str {
        &self.buffer
    }

    /// Build the payload for the current buffer.
    ///
    /// Blank content yields `Ok(None)`: there is nothing to send.
    pub fn prepare(
        &self,
        thread: Option<&Thread>,
        user: Option<&User>,
    ) -> Result<Option<NewPost>, ComposerError> {
        if self.is_blank() {
            return Ok(None);
        }
        let thread = thread.ok_or(ComposerError::NoThread)?;

        Ok(Some(NewPost {
            thread_id: thread.id.clone(),
            author_id: user.map(|u| u.id.clone()),
            content: self.buffer.clone(),
        }))
    }

    /// Hand the payload to `on_submit` and clear the buffer once it succeeds.
    ///
    /// The composer never talks to the backend itself. A failed submission
    /// keeps the buffer so nothing typed is lost.
    pub async fn submit<F, Fut, T, E>(
        &mut self,
        thread: Option<&Thread>,
        user: Option<&User>,
        on_submit: F,
    ) -> Result<Option<T>, ComposerError>
    where
        F: FnOnce(NewPost) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let Some(payload) = self.prepare(thread, user)? else {
            return Ok(None);
        };

        match on_submit(payload).await {
            Ok(created) => {
                self.clear();
                self.mode = ComposerMode::Edit;
                Ok(Some(created))
            }
            Err(e) => Err(ComposerError::Submit(e.to_string())),
        }
    }
}
