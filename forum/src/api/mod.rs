//! Backend access: the REST surface the forum client consumes.
//!
//! Controllers only see the [`ForumBackend`] trait; the binary plugs in
//! [`ApiClient`], tests plug in a recording fake.

mod client;
mod error;
#[cfg(test)]
pub mod fake;

use async_trait::async_trait;

use crate::models::{Credentials, NewPost, NewThread, Post, Thread, User};

pub use client::ApiClient;
pub use error::ApiError;

/// A user together with the session token the backend issued for them.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    /// Value of the `session_id` cookie, when the backend set one.
    pub session_id: Option<String>,
}

/// Every backend operation the client performs.
#[async_trait]
pub trait ForumBackend: Send + Sync {
    /// `GET /api/threads`
    async fn list_threads(&self) -> Result<Vec<Thread>, ApiError>;

    /// `POST /api/threads`
    async fn create_thread(&self, thread: &NewThread) -> Result<Thread, ApiError>;

    /// `GET /api/posts?thread=<id>`
    async fn list_posts(&self, thread_id: &str) -> Result<Vec<Post>, ApiError>;

    /// `POST /api/posts`
    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError>;

    /// `POST /api/users/login`
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError>;

    /// `POST /api/users/register`
    async fn register(&self, credentials: &Credentials) -> Result<AuthSession, ApiError>;

    /// `POST /api/users/auth`
    ///
    /// Returns [`ApiError::SessionExpired`] when the token is no longer valid.
    async fn authenticate(&self, session_id: &str) -> Result<User, ApiError>;
}
