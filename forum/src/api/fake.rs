//! In-memory backend that records every call, for controller tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::{ApiError, AuthSession, ForumBackend};
use crate::models::{Credentials, NewPost, NewThread, Post, Thread, User};

/// A backend call as observed by [`FakeBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListThreads,
    CreateThread(String),
    ListPosts(String),
    CreatePost(NewPost),
    Login(String),
    Register { name: String, password: String },
    Authenticate(String),
}

/// How `POST /api/users/auth` answers.
#[derive(Debug, Clone)]
pub enum AuthBehavior {
    Valid(User),
    Expired,
    Unreachable,
}

#[derive(Debug)]
struct Inner {
    calls: Vec<Call>,
    threads: Vec<Thread>,
    posts: HashMap<String, Vec<Post>>,
    fail_threads: Option<String>,
    fail_posts: Option<String>,
    post_delays: HashMap<String, Duration>,
    accounts: HashMap<String, String>,
    auth: AuthBehavior,
    next_id: usize,
}

#[derive(Debug)]
pub struct FakeBackend {
    inner: Mutex<Inner>,
}

pub fn ts(hour: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
}

pub fn thread(id: &str, name: &str) -> Thread {
    Thread {
        id: id.to_string(),
        name: name.to_string(),
        created_at: ts(10),
        last_active: None,
    }
}

pub fn user(id: &str, username: &str) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        created_at: ts(9),
        last_active: None,
    }
}

pub fn post(id: &str, thread_id: &str, author: Option<&User>, content: &str) -> Post {
    Post {
        id: id.to_string(),
        thread_id: thread_id.to_string(),
        author_id: author.map(|u| u.id.clone()),
        author_name: author.map(|u| u.username.clone()).unwrap_or_default(),
        content: content.to_string(),
        created_at: ts(11),
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                calls: Vec::new(),
                threads: Vec::new(),
                posts: HashMap::new(),
                fail_threads: None,
                fail_posts: None,
                post_delays: HashMap::new(),
                accounts: HashMap::new(),
                auth: AuthBehavior::Expired,
                next_id: 0,
            }),
        }
    }

    pub fn with_threads(self, threads: Vec<Thread>) -> Self {
        self.inner.lock().unwrap().threads = threads;
        self
    }

    pub fn with_posts(self, thread_id: &str, posts: Vec<Post>) -> Self {
        self.inner
            .lock()
            .unwrap()
            .posts
            .insert(thread_id.to_string(), posts);
        self
    }

    pub fn with_account(self, name: &str, password: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .accounts
            .insert(name.to_string(), password.to_string());
        self
    }

    pub fn with_auth(self, auth: AuthBehavior) -> Self {
        self.inner.lock().unwrap().auth = auth;
        self
    }

    pub fn with_post_delay(self, thread_id: &str, delay: Duration) -> Self {
        self.inner
            .lock()
            .unwrap()
            .post_delays
            .insert(thread_id.to_string(), delay);
        self
    }

    pub fn fail_threads(&self, message: Option<&str>) {
        self.inner.lock().unwrap().fail_threads = message.map(String::from);
    }

    pub fn fail_posts(&self, message: Option<&str>) {
        self.inner.lock().unwrap().fail_posts = message.map(String::from);
    }

    pub fn set_threads(&self, threads: Vec<Thread>) {
        self.inner.lock().unwrap().threads = threads;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.inner.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.inner.lock().unwrap().calls.push(call);
    }

    fn unavailable(message: &str) -> ApiError {
        ApiError::Status {
            status: 503,
            message: message.to_string(),
        }
    }

    fn session_for(inner: &mut Inner, name: &str) -> AuthSession {
        inner.next_id += 1;
        AuthSession {
            user: user(&format!("u-{name}"), name),
            session_id: Some(format!("session-{}", inner.next_id)),
        }
    }
}

#[async_trait]
impl ForumBackend for FakeBackend {
    async fn list_threads(&self) -> Result<Vec<Thread>, ApiError> {
        self.record(Call::ListThreads);
        let inner = self.inner.lock().unwrap();
        match &inner.fail_threads {
            Some(message) => Err(Self::unavailable(message)),
            None => Ok(inner.threads.clone()),
        }
    }

    async fn create_thread(&self, new: &NewThread) -> Result<Thread, ApiError> {
        self.record(Call::CreateThread(new.name.clone()));
        let mut inner = self.inner.lock().unwrap();
        if let Some(message) = &inner.fail_threads {
            return Err(Self::unavailable(message));
        }
        inner.next_id += 1;
        let created = thread(&format!("t-new-{}", inner.next_id), &new.name);
        inner.threads.push(created.clone());
        Ok(created)
    }

    async fn list_posts(&self, thread_id: &str) -> Result<Vec<Post>, ApiError> {
        self.record(Call::ListPosts(thread_id.to_string()));
        let delay = self.inner.lock().unwrap().post_delays.get(thread_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let inner = self.inner.lock().unwrap();
        if let Some(message) = &inner.fail_posts {
            return Err(Self::unavailable(message));
        }
        Ok(inner.posts.get(thread_id).cloned().unwrap_or_default())
    }

    async fn create_post(&self, new: &NewPost) -> Result<Post, ApiError> {
        self.record(Call::CreatePost(new.clone()));
        let mut inner = self.inner.lock().unwrap();
        if let Some(message) = &inner.fail_posts {
            return Err(Self::unavailable(message));
        }
        inner.next_id += 1;
        let created = Post {
            id: format!("p-new-{}", inner.next_id),
            thread_id: new.thread_id.clone(),
            author_id: new.author_id.clone(),
            author_name: new
                .author_id
                .as_deref()
                .map(|id| id.trim_start_matches("u-").to_string())
                .unwrap_or_default(),
            content: new.content.clone(),
            created_at: ts(12),
        };
        inner
            .posts
            .entry(new.thread_id.clone())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        self.record(Call::Login(credentials.name.clone()));
        let mut inner = self.inner.lock().unwrap();
        if inner.accounts.get(&credentials.name) != Some(&credentials.password) {
            return Err(ApiError::Status {
                status: 401,
                message: "Authentication failed.".to_string(),
            });
        }
        Ok(Self::session_for(&mut inner, &credentials.name))
    }

    async fn register(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        self.record(Call::Register {
            name: credentials.name.clone(),
            password: credentials.password.clone(),
        });
        let mut inner = self.inner.lock().unwrap();
        if inner.accounts.contains_key(&credentials.name) {
            return Err(ApiError::Status {
                status: 500,
                message: "duplicate key value violates unique constraint".to_string(),
            });
        }
        inner
            .accounts
            .insert(credentials.name.clone(), credentials.password.clone());
        Ok(Self::session_for(&mut inner, &credentials.name))
    }

    async fn authenticate(&self, session_id: &str) -> Result<User, ApiError> {
        self.record(Call::Authenticate(session_id.to_string()));
        match self.inner.lock().unwrap().auth.clone() {
            AuthBehavior::Valid(user) => Ok(user),
            AuthBehavior::Expired => Err(ApiError::SessionExpired),
            AuthBehavior::Unreachable => Err(Self::unavailable("backend offline")),
        }
    }
}
