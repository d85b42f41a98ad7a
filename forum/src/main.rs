//! Forum - a minimal terminal client for a thread-based discussion board.
//!
//! Lists threads, shows their posts, composes markdown posts, and manages
//! a login session against a REST backend.
//!
//! Architecture:
//! - `api` is the only module that speaks HTTP
//! - `controllers` hold per-view state and never touch the network directly
//! - `app` wires the controllers to the backend and renders the screen
//! - `cli` maps subcommands and watch-mode input onto `app`

mod api;
mod app;
mod cli;
mod config;
mod controllers;
mod models;
mod poller;
mod resource;
mod session;
mod state;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{execute, Cli};

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "forum=debug" } else { "forum=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    execute(cli).await
}
