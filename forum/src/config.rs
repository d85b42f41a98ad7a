//! Client configuration resolved from the command line and environment.

use std::path::PathBuf;

use anyhow::{bail, Result};

use crate::cli::Cli;
use crate::session::FileSessionStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend origin without a trailing slash.
    pub server: String,
    /// Where the session token is persisted.
    pub session_file: PathBuf,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let session_file = match &cli.session_file {
            Some(path) => path.clone(),
            None => FileSessionStore::default_path()?,
        };
        Self::new(&cli.server, session_file)
    }

    pub fn new(server: &str, session_file: PathBuf) -> Result<Self> {
        let server = server.trim().trim_end_matches('/');
        if !(server.starts_with("http://") || server.starts_with("https://")) {
            bail!("Server must be an http:// or https:// URL, got '{server}'");
        }
        if server.contains('?') || server.contains('#') {
            bail!("Server must be a bare origin, got '{server}'");
        }

        Ok(Self {
            server: server.to_string(),
            session_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = Config::new("http://localhost:8080/", PathBuf::from("/tmp/s")).unwrap();
        assert_eq!(config.server, "http://localhost:8080");
    }

    #[test]
    fn test_rejects_non_http() {
        assert!(Config::new("localhost:8080", PathBuf::from("/tmp/s")).is_err());
        assert!(Config::new("ftp://example.org", PathBuf::from("/tmp/s")).is_err());
        assert!(Config::new("http://example.org/?x=1", PathBuf::from("/tmp/s")).is_err());
    }

    #[test]
    fn test_from_cli_session_file() {
        let cli = Cli::try_parse_from([
            "forum",
            "--server",
            "https://forum.example.org",
            "--session-file",
            "/tmp/forum-session",
            "whoami",
        ])
        .unwrap();
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.server, "https://forum.example.org");
        assert_eq!(config.session_file, PathBuf::from("/tmp/forum-session"));
    }
}
