//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Forum - browse threads and post from the terminal
#[derive(Parser, Debug)]
#[command(name = "forum")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Backend origin
    #[arg(
        long,
        env = "FORUM_SERVER",
        default_value = "http://localhost:8080",
        global = true
    )]
    pub server: String,

    /// File holding the session token (default: ~/.forum/session)
    #[arg(long, env = "FORUM_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Log requests and state changes to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute (default: watch)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List threads
    Threads,

    /// Start a new thread
    NewThread {
        /// Thread name
        #[arg(trailing_var_arg = true, required = true)]
        name: Vec<String>,
    },

    /// Show the posts of a thread
    Posts {
        /// Thread id, id prefix, or position in the thread list
        thread: String,
    },

    /// Post a message to a thread as the current user
    Post {
        /// Thread id, id prefix, or position in the thread list
        thread: String,

        /// Message to post (markdown)
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },

    /// Log in and store the session
    Login {
        username: String,

        #[arg(long, env = "FORUM_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and log in
    Register {
        username: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        password_repeat: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the user of the stored session
    Whoami,

    /// Interactive view that refreshes in the background
    Watch {
        /// Thread to open on start
        thread: Option<String>,

        /// Seconds between refreshes
        #[arg(short, long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
        interval: u64,
    },
}
