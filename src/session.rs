// session.rs

use std::io::Write;
use std::path::PathBuf;

use crate::builtins::all_help;
use crate::error::ShellError;
use crate::history::History;
use crate::parser::CommandLine;
use crate::util::write_ignore_broken_pipe;

/// What the loop should do after a command has been dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// State owned by one interactive session.
///
/// Only the shell loop touches it, so the builtins and the launcher borrow it
/// mutably one command at a time.
pub struct Session<O: Write, E: Write> {
    pub history: History,
    pub previous_dir: Option<PathBuf>,
    pub out: O,
    pub err: E,
}

impl<O: Write, E: Write> Session<O, E> {
    pub fn new(history_capacity: usize, out: O, err: E) -> Self {
        Self {
            history: History::with_capacity(history_capacity),
            previous_dir: None,
            out,
            err,
        }
    }

    pub fn record(&mut self, command: &CommandLine) -> Option<u64> {
        self.history.record(&command.history_tokens())
    }

    pub fn write_out(&mut self, bytes: &[u8]) -> Result<(), ShellError> {
        write_ignore_broken_pipe(&mut self.out, bytes)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ShellError> {
        self.out.flush()?;
        self.err.flush()?;
        Ok(())
    }

    /// Writes `error` to the error stream. Failures here have nowhere left to go.
    pub fn report(&mut self, error: &ShellError) {
        let message = format!("{error}\n");
        let _ = self.out.flush();
        let _ = write_ignore_broken_pipe(&mut self.err, message.as_bytes());
        let _ = self.err.flush();
    }

    /// Response to a user interrupt: a fresh line and the full help listing.
    pub fn show_interrupt_help(&mut self) -> Result<(), ShellError> {
        self.write_out(b"\n")?;
        self.write_out(all_help().as_bytes())?;
        self.flush()
    }
}
