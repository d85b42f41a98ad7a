//! CLI command execution.
//!
//! Every command is a thin client of the forum backend; nothing is stored
//! locally except the session token.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::api::ApiClient;
use crate::app::{local_time, render_posts, Forum, Update};
use crate::config::Config;
use crate::controllers::{ComposerMode, Dialog};
use crate::models::{short_id, ANONYMOUS};
use crate::poller::{RefreshTimer, Tick, DEFAULT_REFRESH_INTERVAL};
use crate::session::{FileSessionStore, SessionOutcome};

use super::args::{Cli, Commands};
use super::shell::{self, ShellCommand};

/// Build the forum shell against the configured backend.
fn connect(config: &Config) -> Result<Forum> {
    let client = ApiClient::new(&config.server)
        .with_context(|| format!("Failed to create client for {}", config.server))?;
    let store = FileSessionStore::new(config.session_file.clone());
    debug!(server = %config.server, session = %store.path().display(), "connecting");
    Ok(Forum::new(Arc::new(client), Arc::new(store)))
}

// === Command Execution ===

pub async fn execute(cli: Cli) -> Result<()> {
    let config = Config::from_cli(&cli)?;
    let mut forum = connect(&config)?;

    match cli.command {
        Some(Commands::Threads) => list_threads(&mut forum).await,
        Some(Commands::NewThread { name }) => {
            let name = name.join(" ");
            if name.trim().is_empty() {
                bail!("Name is required for new-thread command");
            }
            new_thread(&mut forum, &name).await
        }
        Some(Commands::Posts { thread }) => show_posts(&mut forum, &thread).await,
        Some(Commands::Post { thread, message }) => {
            let message = message.join(" ");
            if message.trim().is_empty() {
                bail!("Message is required for post command");
            }
            post_message(&mut forum, &thread, &message).await
        }
        Some(Commands::Login { username, password }) => {
            let user = forum.login(&username, &password).await?;
            println!("Logged in as {}", user.username);
            Ok(())
        }
        Some(Commands::Register {
            username,
            password,
            password_repeat,
        }) => {
            let user = forum.register(&username, &password, &password_repeat).await?;
            println!("Registered and logged in as {}", user.username);
            Ok(())
        }
        Some(Commands::Logout) => {
            match forum.logout()? {
                Some(user) => println!("Logged out {}", user.username),
                None => println!("Session cleared"),
            }
            Ok(())
        }
        Some(Commands::Whoami) => whoami(&mut forum).await,
        Some(Commands::Watch { thread, interval }) => {
            watch(forum, thread.as_deref(), Duration::from_secs(interval)).await
        }
        None => watch(forum, None, DEFAULT_REFRESH_INTERVAL).await,
    }
}

/// Load the thread list, failing if the backend could not be reached.
async fn load_threads(forum: &mut Forum) -> Result<()> {
    forum.refresh_threads().await;
    if let Some(msg) = forum.threads().error() {
        bail!("Failed to load threads: {msg}");
    }
    Ok(())
}

async fn list_threads(forum: &mut Forum) -> Result<()> {
    load_threads(forum).await?;

    let threads = forum.threads().threads();
    if threads.is_empty() {
        println!("No threads yet.");
        return Ok(());
    }

    println!(
        "{:<4} {:<10} {:<32} {:<17} {:<17}",
        "#", "ID", "NAME", "CREATED", "LAST ACTIVE"
    );
    println!("{}", "-".repeat(84));

    for (i, thread) in threads.iter().enumerate() {
        let name: String = thread.name.chars().take(30).collect();
        let active = thread
            .last_active
            .map_or_else(|| "-".to_string(), local_time);
        println!(
            "{:<4} {:<10} {:<32} {:<17} {:<17}",
            i + 1,
            thread.short_id(),
            name,
            local_time(thread.created_at),
            active
        );
    }
    Ok(())
}

async fn new_thread(forum: &mut Forum, name: &str) -> Result<()> {
    let thread = forum
        .create_thread(name)
        .await
        .context("Failed to create thread")?
        .context("Thread name is empty")?;
    println!("Created thread {} {}", thread.short_id(), thread.name);
    Ok(())
}

async fn show_posts(forum: &mut Forum, key: &str) -> Result<()> {
    load_threads(forum).await?;
    let thread = forum.select_thread(key).await?;
    if let Some(msg) = forum.posts().error() {
        bail!("Failed to load posts: {msg}");
    }

    println!("{}", thread.name);
    println!("{}", "=".repeat(thread.name.chars().count().max(3)));
    print!("{}", render_posts(&forum.posts().view(forum.state())));
    Ok(())
}

async fn post_message(forum: &mut Forum, key: &str, message: &str) -> Result<()> {
    report_session(&forum.resolve_session().await);
    load_threads(forum).await?;
    forum.select_local(key)?;

    forum.composer_mut().set_text(message);
    let post = forum
        .submit_post()
        .await?
        .context("Message is required for post command")?;
    println!("Posted #{} as {}", short_id(&post.id), post.display_author());
    Ok(())
}

async fn whoami(forum: &mut Forum) -> Result<()> {
    match forum.resolve_session().await {
        SessionOutcome::Authenticated(user) => {
            println!("{} ({})", user.username, user.id);
            println!("Member since {}", local_time(user.created_at));
        }
        SessionOutcome::Anonymous => println!("{ANONYMOUS}"),
        SessionOutcome::Expired => println!("{ANONYMOUS} (session expired, log in again)"),
        SessionOutcome::Failed(msg) => bail!("Failed to resolve session: {msg}"),
    }
    Ok(())
}

/// Mention session problems on stderr so they don't mix with command output.
fn report_session(outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Expired => eprintln!("Session expired, posting as {ANONYMOUS}"),
        SessionOutcome::Failed(msg) => eprintln!("Warning: could not resolve session: {msg}"),
        SessionOutcome::Anonymous | SessionOutcome::Authenticated(_) => {}
    }
}

// === Watch ===

/// Interactive view: redraws on every change and refreshes both lists every `period`.
async fn watch(mut forum: Forum, thread: Option<&str>, period: Duration) -> Result<()> {
    let (update_tx, mut updates) = mpsc::channel::<Update>(16);
    let (tick_tx, mut ticks) = mpsc::channel::<Tick>(4);

    report_session(&forum.start().await);
    if let Some(key) = thread {
        if let Err(e) = forum.select_thread(key).await {
            eprintln!("{e}");
        }
    }

    // Timers stop when dropped at the end of this function.
    let _threads_timer = RefreshTimer::spawn(period, Tick::Threads, tick_tx.clone());
    let _posts_timer = RefreshTimer::spawn(period, Tick::Posts, tick_tx);

    redraw(&forum);
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(tick) = ticks.recv() => {
                debug!(?tick, "refresh");
                match tick {
                    Tick::Threads => forum.spawn_thread_refresh(&update_tx),
                    Tick::Posts => forum.spawn_post_refresh(&update_tx),
                }
            }
            Some(update) = updates.recv() => {
                if forum.apply(update) {
                    redraw(&forum);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match shell::parse(&line) {
                    Ok(ShellCommand::Quit) => break,
                    Ok(command) => {
                        if run_shell_command(&mut forum, command, &update_tx).await {
                            redraw(&forum);
                        }
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
        }
    }

    Ok(())
}

fn redraw(forum: &Forum) {
    println!();
    print!("{}", forum.render());
    println!("{}", "-".repeat(30));
}

/// Apply one shell command. Returns whether the screen should be redrawn.
async fn run_shell_command(
    forum: &mut Forum,
    command: ShellCommand,
    updates: &mpsc::Sender<Update>,
) -> bool {
    match command {
        ShellCommand::Select(key) => match forum.select_local(&key) {
            Ok(_) => {
                forum.spawn_post_sync(updates);
                true
            }
            Err(e) => {
                eprintln!("{e}");
                false
            }
        },
        ShellCommand::Write(text) => {
            forum.composer_mut().push_line(&text);
            true
        }
        ShellCommand::Preview => {
            let mode = forum.composer_mut().toggle_preview();
            if mode == ComposerMode::Preview && forum.composer().is_blank() {
                println!("Nothing to preview.");
            }
            true
        }
        ShellCommand::Send => match forum.submit_post().await {
            Ok(Some(post)) => {
                println!("Posted #{}", short_id(&post.id));
                true
            }
            Ok(None) => {
                println!("Nothing to send.");
                false
            }
            Err(e) => {
                eprintln!("{e}");
                false
            }
        },
        ShellCommand::Clear => {
            forum.composer_mut().clear();
            true
        }
        ShellCommand::NewThread(name) => match forum.create_thread(&name).await {
            Ok(_) => true,
            Err(e) => {
                eprintln!("Failed to create thread: {e}");
                true
            }
        },
        ShellCommand::Login { username, password } => {
            forum.panel_mut().open(Dialog::Login);
            if let Err(e) = forum.login(&username, &password).await {
                eprintln!("{e}");
            }
            true
        }
        ShellCommand::Register {
            username,
            password,
            password_repeat,
        } => {
            forum.panel_mut().open(Dialog::Register);
            if let Err(e) = forum.register(&username, &password, &password_repeat).await {
                eprintln!("{e}");
            }
            true
        }
        ShellCommand::Logout => {
            forum.panel_mut().open(Dialog::Options);
            if let Err(e) = forum.logout() {
                eprintln!("{e}");
            }
            true
        }
        ShellCommand::Refresh => {
            forum.spawn_thread_refresh(updates);
            forum.spawn_post_refresh(updates);
            false
        }
        ShellCommand::Help => {
            println!("{}", shell::HELP);
            false
        }
        ShellCommand::Nothing => true,
        ShellCommand::Quit => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{self, Call, FakeBackend};
    use crate::api::ForumBackend;
    use crate::session::{MemorySessionStore, SessionStore};

    async fn started(backend: &Arc<FakeBackend>) -> Forum {
        let mut forum = Forum::new(
            Arc::clone(backend) as Arc<dyn ForumBackend>,
            Arc::new(MemorySessionStore::new()) as Arc<dyn SessionStore>,
        );
        forum.start().await;
        forum
    }

    #[tokio::test]
    async fn test_shell_select_fetches_in_background() {
        let backend = Arc::new(
            FakeBackend::new()
                .with_threads(vec![fake::thread("t1", "General")])
                .with_posts("t1", vec![fake::post("p1", "t1", None, "hi")]),
        );
        let mut forum = started(&backend).await;
        let (tx, mut rx) = mpsc::channel(4);

        assert!(run_shell_command(&mut forum, ShellCommand::Select("1".into()), &tx).await);
        assert!(forum.apply(rx.recv().await.unwrap()));
        assert!(forum.render_main().contains("hi"));

        assert!(!run_shell_command(&mut forum, ShellCommand::Select("zz".into()), &tx).await);
        assert_eq!(forum.state().selected_thread_id(), Some("t1"));
    }

    #[tokio::test]
    async fn test_shell_write_and_send() {
        let backend = Arc::new(FakeBackend::new().with_threads(vec![fake::thread("t1", "General")]));
        let mut forum = started(&backend).await;
        let (tx, _rx) = mpsc::channel(4);
        forum.select_thread("t1").await.unwrap();

        run_shell_command(&mut forum, ShellCommand::Write("line one".into()), &tx).await;
        run_shell_command(&mut forum, ShellCommand::Write("line two".into()), &tx).await;
        assert!(forum.render_main().contains("[draft]"));

        run_shell_command(&mut forum, ShellCommand::Send, &tx).await;
        assert_eq!(
            backend.count(|c| matches!(c, Call::CreatePost(p) if p.content == "line one\nline two")),
            1
        );
        assert_eq!(forum.composer().text(), "");
    }

    #[tokio::test]
    async fn test_shell_logout_closes_options() {
        let backend = Arc::new(FakeBackend::new().with_account("alice", "pw"));
        let mut forum = started(&backend).await;
        let (tx, _rx) = mpsc::channel(4);
        forum.login("alice", "pw").await.unwrap();

        assert!(run_shell_command(&mut forum, ShellCommand::Logout, &tx).await);
        let sidebar = forum.render_sidebar();
        assert!(sidebar.contains("Anonymous / Login"));
        assert!(!sidebar.contains("[options]"));
    }

    #[tokio::test]
    async fn test_shell_login_failure_is_inline() {
        let backend = Arc::new(FakeBackend::new().with_account("alice", "pw"));
        let mut forum = started(&backend).await;
        let (tx, _rx) = mpsc::channel(4);

        let login = ShellCommand::Login {
            username: "alice".into(),
            password: "wrong".into(),
        };
        assert!(run_shell_command(&mut forum, login, &tx).await);

        let sidebar = forum.render_sidebar();
        assert!(sidebar.contains("[login]"));
        assert!(sidebar.contains("Error: "));
        assert!(sidebar.contains("Anonymous / Login"));
    }
}
