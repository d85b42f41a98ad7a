//! Line commands accepted by the interactive `watch` view.

use thiserror::Error;

pub const HELP: &str = "\
Commands:
  select <n|id>                  open a thread
  write <text>                   add a line to the draft
  preview                        toggle draft preview
  send                           post the draft to the open thread
  clear                          discard the draft
  new <name>                     start a thread
  login <user> <password>        log in
  register <user> <pw> <repeat>  create an account
  logout                         forget the session
  refresh                        reload threads and posts
  help                           show this help
  quit                           leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Select(String),
    Write(String),
    Preview,
    Send,
    Clear,
    NewThread(String),
    Login {
        username: String,
        password: String,
    },
    Register {
        username: String,
        password: String,
        password_repeat: String,
    },
    Logout,
    Refresh,
    Help,
    Quit,
    /// Blank input line.
    Nothing,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShellError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Parse one input line.
pub fn parse(line: &str) -> Result<ShellCommand, ShellError> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let command = match word.to_lowercase().as_str() {
        "" => ShellCommand::Nothing,
        "select" | "s" => ShellCommand::Select(required(rest, "select <n|id>")?),
        // Keep the text as typed; markdown is whitespace-sensitive.
        "write" | "w" => ShellCommand::Write(line[word.len()..].trim_start().to_string()),
        "preview" | "p" => ShellCommand::Preview,
        "send" => ShellCommand::Send,
        "clear" => ShellCommand::Clear,
        "new" => ShellCommand::NewThread(required(rest, "new <name>")?),
        "login" => match words(rest)[..] {
            [username, password] => ShellCommand::Login {
                username: username.to_string(),
                password: password.to_string(),
            },
            _ => return Err(ShellError::Usage("login <user> <password>")),
        },
        "register" => match words(rest)[..] {
            [username, password, repeat] => ShellCommand::Register {
                username: username.to_string(),
                password: password.to_string(),
                password_repeat: repeat.to_string(),
            },
            _ => return Err(ShellError::Usage("register <user> <password> <repeat>")),
        },
        "logout" => ShellCommand::Logout,
        "refresh" | "r" => ShellCommand::Refresh,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        _ => return Err(ShellError::Unknown(word.to_string())),
    };
    Ok(command)
}

fn required(rest: &str, usage: &'static str) -> Result<String, ShellError> {
    if rest.is_empty() {
        Err(ShellError::Usage(usage))
    } else {
        Ok(rest.to_string())
    }
}

fn words(rest: &str) -> Vec<&str> {
    rest.split_whitespace().collect()
}
