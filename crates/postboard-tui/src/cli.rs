//! Command-line arguments.
//!
//! With no arguments the TUI starts. The few subcommands manage the stored
//! session without opening the terminal UI.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start the terminal UI
    Run,
    /// Prompt for credentials on stdin and store the session
    Login { email: Option<String> },
    /// End the stored session
    Logout,
    /// Print whether a session is stored
    Status,
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}\n\n{usage}", usage = USAGE)]
pub struct UsageError(String);

pub const USAGE: &str = "\
Usage: postboard [COMMAND]

Commands:
  (none)          Open the terminal UI
  login [EMAIL]   Log in from the command line
  logout          Log out and forget the stored session
  status          Show whether you are logged in

Options:
  -h, --help      Print help
  -V, --version   Print version

Environment:
  POSTBOARD_API_URL    API base URL (overrides config)
  POSTBOARD_PAGE_SIZE  Posts per page (overrides config)
  RUST_LOG             Log filter, e.g. postboard_core=debug";

/// Parse arguments, excluding the program name
pub fn parse_args<I, S>(args: I) -> Result<Command, UsageError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
    let mut rest = args.iter().map(String::as_str);

    let command = match rest.next() {
        None => Command::Run,
        Some("-h") | Some("--help") | Some("help") => Command::Help,
        Some("-V") | Some("--version") => Command::Version,
        Some("login") => Command::Login {
            email: rest.next().map(str::to_string),
        },
        Some("logout") => Command::Logout,
        Some("status") => Command::Status,
        Some(other) => return Err(UsageError(format!("Unknown command: {}", other))),
    };

    if let Some(extra) = rest.next() {
        return Err(UsageError(format!("Unexpected argument: {}", extra)));
    }
    Ok(command)
}
