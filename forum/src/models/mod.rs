//! Data models for forum entities and request payloads.

mod post;
mod thread;
mod user;

pub use post::{NewPost, Post, ANONYMOUS};
pub use thread::{NewThread, Thread};
pub use user::{Credentials, SessionAuth, User};

pub(crate) use thread::short_id;
