// parser.rs

use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;

/// Token that sends a command to the background when it ends the line.
pub const BACKGROUND_TOKEN: &str = "&";

/// Splits a line on ASCII whitespace, keeping at most `max_args` tokens.
///
/// Tokens keep their bytes as read, whatever the encoding.
pub fn tokenize(line: &[u8], max_args: Option<usize>) -> Vec<OsString> {
    line.split(u8::is_ascii_whitespace)
        .filter(|token| !token.is_empty())
        .take(max_args.unwrap_or(usize::MAX))
        .map(|token| OsStr::from_bytes(token).to_os_string())
        .collect()
}

/// Tokens joined by single spaces, as history shows them.
pub fn join_tokens(tokens: &[OsString]) -> Vec<u8> {
    let parts: Vec<&[u8]> = tokens.iter().map(|token| token.as_bytes()).collect();
    parts.join(&b' ')
}

/// One parsed input line, with a trailing `&` already stripped into `background`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub args: Vec<OsString>,
    pub background: bool,
}

impl CommandLine {
    pub fn parse(line: &[u8], max_args: Option<usize>) -> Option<Self> {
        Self::from_tokens(tokenize(line, max_args))
    }

    /// Returns `None` when nothing is left to run.
    pub fn from_tokens(mut args: Vec<OsString>) -> Option<Self> {
        let background = args.last().map(|last| last == BACKGROUND_TOKEN).unwrap_or(false);
        if background {
            args.pop();
        }
        if args.is_empty() {
            return None;
        }
        Some(Self { args, background })
    }

    pub fn program(&self) -> &OsStr {
        &self.args[0]
    }

    /// Number of arguments after the program name.
    pub fn extra_args(&self) -> usize {
        self.args.len() - 1
    }

    /// The tokens as they are stored in history, `&` included for background runs.
    pub fn history_tokens(&self) -> Vec<OsString> {
        let mut tokens = self.args.clone();
        if self.background {
            tokens.push(OsString::from(BACKGROUND_TOKEN));
        }
        tokens
    }
}
