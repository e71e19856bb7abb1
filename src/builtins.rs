// builtins.rs

use std::env;
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::PathBuf;

use log::debug;
use nix::unistd::{getuid, User};

use crate::error::ShellError;
use crate::history::{History, RECENT_WINDOW};
use crate::parser::{join_tokens, CommandLine};
use crate::session::{Flow, Session};

const EXTERNAL_HELP: &str = "External command or application";

/// Commands the shell runs itself instead of starting a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    Help,
    Pwd,
    Cd,
    History,
}

impl Builtin {
    /// In the order `help` lists them.
    pub const ALL: [Builtin; 5] = [
        Builtin::Exit,
        Builtin::Help,
        Builtin::Pwd,
        Builtin::Cd,
        Builtin::History,
    ];

    pub fn lookup(name: &OsStr) -> Option<Self> {
        Self::ALL.into_iter().find(|builtin| name == builtin.name())
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Exit => "exit",
            Builtin::Help => "help",
            Builtin::Pwd => "pwd",
            Builtin::Cd => "cd",
            Builtin::History => "history",
        }
    }

    fn summary(self) -> &'static str {
        match self {
            Builtin::Exit => "Exit the shell",
            Builtin::Help => "Display information about internal commands",
            Builtin::Pwd => "Display the current working directory",
            Builtin::Cd => "Change the current working directory ('~' is home, '-' is the previous directory)",
            Builtin::History => "Display the last 10 commands; '!!' reruns the last one, '!N' reruns command N",
        }
    }

    pub fn help_line(self) -> String {
        format!("{}: {}\n", self.name(), self.summary())
    }
}

pub fn all_help() -> String {
    Builtin::ALL.iter().map(|builtin| builtin.help_line()).collect()
}

pub fn is_history_reference(name: &OsStr) -> bool {
    name.as_bytes().starts_with(b"!")
}

pub fn run_builtin<O: Write, E: Write>(
    builtin: Builtin,
    session: &mut Session<O, E>,
    command: &CommandLine,
) -> Result<Flow, ShellError> {
    match builtin {
        Builtin::Exit => {
            if command.extra_args() > 0 {
                return Err(ShellError::TooManyArguments("exit"));
            }
            Ok(Flow::Exit)
        }
        Builtin::Pwd => {
            if command.extra_args() > 0 {
                return Err(ShellError::TooManyArguments("pwd"));
            }
            session.record(command);
            let cwd = env::current_dir()
                .map_err(|source| ShellError::CurrentDirectory { command: "pwd", source })?;
            let mut line = cwd.into_os_string().into_vec();
            line.push(b'\n');
            session.write_out(&line)?;
            Ok(Flow::Continue)
        }
        Builtin::Cd => {
            if command.extra_args() > 1 {
                return Err(ShellError::TooManyArguments("cd"));
            }
            let target = command.args.get(1).map(OsString::as_os_str);
            let outcome = cd_target(session.previous_dir.as_ref(), target)
                .and_then(|path| change_directory(&mut session.previous_dir, path));
            // recorded whether or not the change worked
            session.record(command);
            outcome.map(|()| Flow::Continue)
        }
        Builtin::History => {
            session.record(command);
            let listing = session.history.render_recent(RECENT_WINDOW);
            session.write_out(&listing)?;
            Ok(Flow::Continue)
        }
        Builtin::Help => {
            let text = match command.args.as_slice() {
                [_] => all_help().into_bytes(),
                [_, topic] => match Builtin::lookup(topic) {
                    Some(builtin) => builtin.help_line().into_bytes(),
                    None => external_help(topic),
                },
                _ => return Err(ShellError::TooManyArguments("help")),
            };
            session.write_out(&text)?;
            session.record(command);
            Ok(Flow::Continue)
        }
    }
}

/// Handles `!!` and `!N`: echoes the stored command and launches it again as a
/// fresh command line, so it is recorded under a new number only if it succeeds.
pub fn rerun_from_history<O: Write, E: Write>(
    session: &mut Session<O, E>,
    command: &CommandLine,
) -> Result<Flow, ShellError> {
    let resolved = resolve_reference(&session.history, command.program())?.to_vec();
    let mut echo = join_tokens(&resolved);
    echo.push(b'\n');
    session.write_out(&echo)?;
    debug!("rerunning {:?} for {:?}", resolved, command.program());
    match CommandLine::from_tokens(resolved) {
        Some(rerun) => Ok(session.launch(rerun)),
        None => Ok(Flow::Continue),
    }
}

pub fn resolve_reference<'h>(history: &'h History, reference: &OsStr) -> Result<&'h [OsString], ShellError> {
    let invalid = || ShellError::InvalidHistoryReference(reference.to_string_lossy().into_owned());
    let suffix = reference.as_bytes().strip_prefix(b"!").ok_or_else(invalid)?;
    if suffix == b"!" {
        return history.last().ok_or(ShellError::NoLastCommand);
    }
    if suffix.is_empty() || !suffix.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    let sequence = std::str::from_utf8(suffix)
        .ok()
        .and_then(|digits| digits.parse::<u64>().ok())
        .ok_or_else(invalid)?;
    history.resolve(sequence).ok_or_else(invalid)
}

/// `help` on a name the shell does not know, with the name echoed byte for byte.
fn external_help(topic: &OsStr) -> Vec<u8> {
    let mut text = topic.as_bytes().to_vec();
    text.extend_from_slice(format!(": {EXTERNAL_HELP}\n").as_bytes());
    text
}

fn home_dir() -> Result<PathBuf, ShellError> {
    match User::from_uid(getuid()) {
        Ok(Some(user)) => Ok(user.dir),
        _ => Err(ShellError::HomeDirectory),
    }
}

fn cd_target(previous: Option<&PathBuf>, arg: Option<&OsStr>) -> Result<PathBuf, ShellError> {
    let Some(arg) = arg else {
        return home_dir();
    };
    match arg.as_bytes() {
        b"~" => home_dir(),
        b"-" => previous.cloned().ok_or(ShellError::NoPreviousDirectory),
        [b'~', rest @ ..] if rest.starts_with(b"/") => {
            let mut path = home_dir()?.into_os_string().into_vec();
            path.extend_from_slice(rest);
            Ok(PathBuf::from(OsString::from_vec(path)))
        }
        _ => Ok(PathBuf::from(arg)),
    }
}

/// Only a successful change moves the old directory into `previous`.
fn change_directory(previous: &mut Option<PathBuf>, target: PathBuf) -> Result<(), ShellError> {
    let before = env::current_dir().ok();
    if let Err(source) = env::set_current_dir(&target) {
        return Err(ShellError::ChangeDirectory { path: target, source });
    }
    debug!("changed directory to {}", target.display());
    *previous = before;
    Ok(())
}
