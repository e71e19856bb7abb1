// error.rs

use std::io;
use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

/// Every failure the shell reports to the user.
///
/// The `Display` text is the exact message written to the error stream, so each
/// variant carries the name of the command or subsystem it belongs to.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("{0}: too many arguments")]
    TooManyArguments(&'static str),

    #[error("cd: no previous directory")]
    NoPreviousDirectory,

    #[error("cd: unable to resolve home directory")]
    HomeDirectory,

    #[error("cd: {}: {source}", .path.display())]
    ChangeDirectory { path: PathBuf, source: io::Error },

    #[error("{command}: unable to get current directory: {source}")]
    CurrentDirectory {
        command: &'static str,
        source: io::Error,
    },

    #[error("history: no last command")]
    NoLastCommand,

    #[error("history: {0}: invalid history reference")]
    InvalidHistoryReference(String),

    #[error("{0}: argument contains a NUL byte")]
    NulArgument(String),

    #[error("fork: unable to create child process: {0}")]
    Fork(#[source] Errno),

    #[error("shell: unable to wait for child process: {0}")]
    Wait(#[source] Errno),

    #[error("shell: unable to read input: {0}")]
    Read(#[source] io::Error),

    #[error("shell: unable to install interrupt handler: {0}")]
    Signal(#[source] Errno),

    #[error("shell: invalid value for {var}: {value:?}")]
    InvalidConfig { var: &'static str, value: String },

    #[error("shell: line editor: {0}")]
    Editor(#[from] rustyline::error::ReadlineError),

    #[error("shell: {0}")]
    Io(#[from] io::Error),
}
