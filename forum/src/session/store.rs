//! Persistent storage for the session token.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
#[cfg(test)]
use std::sync::Mutex;

use anyhow::{Context, Result};

/// Directory under the home directory holding client state.
const CLIENT_DIR: &str = ".forum";
const SESSION_FILE: &str = "session";

/// Where the session token lives between runs.
///
/// Read, write and clear are the only operations; the medium is up to the
/// implementation.
pub trait SessionStore: Send + Sync {
    /// Load the stored token, `None` when there is none.
    fn load(&self) -> io::Result<Option<String>>;

    /// Replace the stored token.
    fn save(&self, token: &str) -> io::Result<()>;

    /// Remove the stored token. Clearing an empty store is not an error.
    fn clear(&self) -> io::Result<()>;
}

/// Token stored in a single file, by default `~/.forum/session`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The default token location in the user's home directory.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(CLIENT_DIR).join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> io::Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;

        // `mode` only applies on creation; tighten files left by older versions.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }

        file.write_all(token.as_bytes())
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Token kept in memory only; lost when the process exits.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: Mutex<Option<String>>,
}

#[cfg(test)]
impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned slot still holds a usable Option.
        self.token
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
impl SessionStore for MemorySessionStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.slot().clone())
    }

    fn save(&self, token: &str) -> io::Result<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// Store whose writes always fail, holding an optional fixed token.
#[cfg(test)]
#[derive(Debug)]
pub struct ReadOnlySessionStore {
    token: Option<String>,
}

#[cfg(test)]
impl ReadOnlySessionStore {
    pub fn new(token: Option<&str>) -> Self {
        Self {
            token: token.map(String::from),
        }
    }

    fn denied() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "read-only home")
    }
}

#[cfg(test)]
impl SessionStore for ReadOnlySessionStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.token.clone())
    }

    fn save(&self, _token: &str) -> io::Result<()> {
        Err(Self::denied())
    }

    fn clear(&self) -> io::Result<()> {
        Err(Self::denied())
    }
}
