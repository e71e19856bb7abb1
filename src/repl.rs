// repl.rs

use std::env;
use std::io::{self, Write};
use std::os::unix::ffi::OsStringExt;

use log::debug;

use crate::config::Config;
use crate::error::ShellError;
use crate::input::{EditorInput, LineReader, LineSource, RawStdin, ReadOutcome};
use crate::launcher::reap_background;
use crate::parser::CommandLine;
use crate::session::{Flow, Session};
use crate::signals;

const PROMPT_DELIMITER: &str = "$ ";

/// The prompt/read/parse/dispatch/reap cycle.
pub struct Shell<S, O: Write, E: Write> {
    session: Session<O, E>,
    input: S,
    max_args: Option<usize>,
    interrupted: fn() -> bool,
}

impl<S: LineSource, O: Write, E: Write> Shell<S, O, E> {
    pub fn new(config: &Config, input: S, out: O, err: E) -> Self {
        Self {
            session: Session::new(config.history_capacity, out, err),
            input,
            max_args: config.max_args,
            interrupted: signals::take_pending,
        }
    }

    /// Runs until `exit`, end of input, or a prompt that cannot be rendered.
    pub fn run(&mut self) {
        loop {
            if (self.interrupted)() {
                self.show_interrupt_help();
            }
            let prompt = match render_prompt() {
                Ok(prompt) => prompt,
                Err(error) => {
                    self.session.report(&error);
                    return;
                }
            };
            let line = match self.input.read_line(&prompt, &mut self.session.out) {
                Ok(ReadOutcome::Line(line)) => line,
                Ok(ReadOutcome::Interrupted) => {
                    // the flag may already be gone if the editor caught Ctrl-C itself
                    (self.interrupted)();
                    self.show_interrupt_help();
                    continue;
                }
                Ok(ReadOutcome::Eof) => {
                    debug!("end of input");
                    let _ = self.session.flush();
                    return;
                }
                Err(error) => {
                    self.session.report(&error);
                    continue;
                }
            };
            let Some(command) = CommandLine::parse(&line, self.max_args) else {
                continue;
            };

            reap_background();

            if self.session.launch(command) == Flow::Exit {
                let _ = self.session.flush();
                return;
            }
        }
    }

    fn show_interrupt_help(&mut self) {
        if let Err(error) = self.session.show_interrupt_help() {
            self.session.report(&error);
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session<O, E> {
        &self.session
    }
}

/// Current directory, as raw bytes, followed by the delimiter.
fn render_prompt() -> Result<Vec<u8>, ShellError> {
    let cwd = env::current_dir()
        .map_err(|source| ShellError::CurrentDirectory { command: "shell", source })?;
    let mut prompt = cwd.into_os_string().into_vec();
    prompt.extend_from_slice(PROMPT_DELIMITER.as_bytes());
    Ok(prompt)
}

pub fn start_repl(config: &Config) -> Result<(), ShellError> {
    if config.line_editor {
        let input = EditorInput::new(config.max_line_len)?;
        Shell::new(config, input, io::stdout(), io::stderr()).run();
    } else {
        let input = LineReader::new(RawStdin, config.max_line_len);
        Shell::new(config, input, io::stdout(), io::stderr()).run();
    }
    Ok(())
}
