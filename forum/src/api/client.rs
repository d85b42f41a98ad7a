//! HTTP client for the forum backend.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::error::is_session_timeout_body;
use super::{ApiError, AuthSession, ForumBackend};
use crate::models::{Credentials, NewPost, NewThread, Post, SessionAuth, Thread, User};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// Thin JSON client bound to a single backend origin.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    /// Create a client for the backend at `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("forum/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let resp = self.client.get(&url).send().await?;
        read_json(path, resp).await
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<Response, ApiError> {
        let url = self.url(path);
        debug!(%url, "POST");
        Ok(self.client.post(&url).json(body).send().await?)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let resp = self.post(path, body).await?;
        read_json(path, resp).await
    }

    async fn post_credentials(
        &self,
        path: &str,
        credentials: &Credentials,
    ) -> Result<AuthSession, ApiError> {
        let resp = self.post(path, credentials).await?;
        let session_id = resp
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.value().to_string());

        let user: User = read_json(path, resp).await?;
        debug!(user = %user.username, has_session = session_id.is_some(), "authenticated");
        Ok(AuthSession { user, session_id })
    }
}

/// Read a response body and decode it, mapping failures to [`ApiError`].
async fn read_json<T: DeserializeOwned>(endpoint: &str, resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.text().await?;
    debug!(endpoint, status = status.as_u16(), bytes = body.len(), "response");
    parse_body(endpoint, status, &body)
}

fn parse_body<T: DeserializeOwned>(
    endpoint: &str,
    status: StatusCode,
    body: &str,
) -> Result<T, ApiError> {
    if !status.is_success() {
        return Err(status_error(status, body));
    }

    serde_json::from_str(body).map_err(|e| ApiError::Decode {
        endpoint: endpoint.to_string(),
        reason: e.to_string(),
    })
}

fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = body.trim();
    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("unknown error").to_string()
    } else {
        message.to_string()
    };

    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ForumBackend for ApiClient {
    async fn list_threads(&self) -> Result<Vec<Thread>, ApiError> {
        self.get_json("/api/threads").await
    }

    async fn create_thread(&self, thread: &NewThread) -> Result<Thread, ApiError> {
        if thread.name.trim().is_empty() {
            return Err(ApiError::Validation("Thread name can't be empty".to_string()));
        }
        self.post_json("/api/threads", thread).await
    }

    async fn list_posts(&self, thread_id: &str) -> Result<Vec<Post>, ApiError> {
        let path = format!("/api/posts?thread={}", urlencoding::encode(thread_id));
        self.get_json(&path).await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        if post.content.trim().is_empty() {
            return Err(ApiError::Validation("Post content can't be empty".to_string()));
        }
        self.post_json("/api/posts", post).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        self.post_credentials("/api/users/login", credentials).await
    }

    async fn register(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        self.post_credentials("/api/users/register", credentials)
            .await
    }

    async fn authenticate(&self, session_id: &str) -> Result<User, ApiError> {
        let path = "/api/users/auth";
        let body = SessionAuth {
            session_id: session_id.to_string(),
        };
        let resp = self.post(path, &body).await?;
        let status = resp.status();
        let text = resp.text().await?;

        if is_session_timeout_body(&text)
            || matches!(status, StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND)
        {
            debug!(status = status.as_u16(), "session rejected by backend");
            return Err(ApiError::SessionExpired);
        }

        parse_body(path, status, &text)
    }
}
