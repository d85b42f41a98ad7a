//! Session token storage and startup resolution.

mod resolver;
mod store;

pub use resolver::{resolve_session, SessionOutcome};
#[cfg(test)]
pub use store::{MemorySessionStore, ReadOnlySessionStore};
pub use store::{FileSessionStore, SessionStore};
