// input.rs

use std::io::{self, Read, Write};

use bytes::{Buf, BytesMut};
use log::trace;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{CompletionType, Config as EditorConfig, Editor};

use crate::completion::ShellHelper;
use crate::error::ShellError;
use crate::util::write_ignore_broken_pipe;

const READ_CHUNK: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(Vec<u8>),
    Interrupted,
    Eof,
}

/// Where the shell loop gets its next line from.
pub trait LineSource {
    /// Shows `prompt` on `out` and blocks for one line, newline stripped.
    fn read_line(&mut self, prompt: &[u8], out: &mut dyn Write) -> Result<ReadOutcome, ShellError>;
}

/// Line splitter over a raw byte stream.
///
/// Lines come back as the raw bytes read; nothing is decoded. Bytes past
/// `max_len` on a line are dropped. An `EINTR` from the underlying
/// reader surfaces as [`ReadOutcome::Interrupted`] and leaves whatever was
/// already buffered in place for the next call.
pub struct LineReader<R> {
    inner: R,
    pending: BytesMut,
    max_len: usize,
    eof: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R, max_len: usize) -> Self {
        Self {
            inner,
            pending: BytesMut::with_capacity(max_len + 1),
            max_len,
            eof: false,
        }
    }

    pub fn next_line(&mut self) -> io::Result<ReadOutcome> {
        loop {
            if let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
                let mut line = self.pending.split_to(newline);
                self.pending.advance(1);
                line.truncate(self.max_len);
                return Ok(ReadOutcome::Line(line.to_vec()));
            }
            if self.eof {
                if self.pending.is_empty() {
                    return Ok(ReadOutcome::Eof);
                }
                let mut line = self.pending.split();
                line.truncate(self.max_len);
                return Ok(ReadOutcome::Line(line.to_vec()));
            }
            // no newline yet, so nothing past the limit can survive
            self.pending.truncate(self.max_len);

            let mut chunk = [0u8; READ_CHUNK];
            match self.inner.read(&mut chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                    trace!("read interrupted with {} bytes buffered", self.pending.len());
                    return Ok(ReadOutcome::Interrupted);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> LineSource for LineReader<R> {
    fn read_line(&mut self, prompt: &[u8], out: &mut dyn Write) -> Result<ReadOutcome, ShellError> {
        write_ignore_broken_pipe(out, prompt)?;
        out.flush()?;
        self.next_line().map_err(ShellError::Read)
    }
}

/// File descriptor 0, read directly so `EINTR` is never retried behind our back.
pub struct RawStdin;

impl Read for RawStdin {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        nix::unistd::read(libc::STDIN_FILENO, buf).map_err(io::Error::from)
    }
}

/// Interactive input through rustyline, with completion of command names.
pub struct EditorInput {
    editor: Editor<ShellHelper, DefaultHistory>,
    max_len: usize,
}

impl EditorInput {
    pub fn new(max_len: usize) -> Result<Self, ShellError> {
        let config = EditorConfig::builder()
            .completion_type(CompletionType::List)
            .auto_add_history(false)
            .build();
        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(ShellHelper::new()));
        Ok(Self { editor, max_len })
    }
}

impl LineSource for EditorInput {
    /// The editor works on text, so a prompt that is not UTF-8 is shown lossily.
    fn read_line(&mut self, prompt: &[u8], _out: &mut dyn Write) -> Result<ReadOutcome, ShellError> {
        match self.editor.readline(&String::from_utf8_lossy(prompt)) {
            Ok(mut line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                truncate_at_boundary(&mut line, self.max_len);
                Ok(ReadOutcome::Line(line.into_bytes()))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(err.into()),
        }
    }
}

fn truncate_at_boundary(line: &mut String, max_len: usize) {
    if line.len() <= max_len {
        return;
    }
    let mut end = max_len;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    line.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn line(text: &str) -> ReadOutcome {
        ReadOutcome::Line(text.as_bytes().to_vec())
    }

    /// Hands out one scripted result per read call.
    struct Script(Vec<io::Result<Vec<u8>>>);

    impl Read for Script {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() {
                return Ok(0);
            }
            let bytes = self.0.remove(0)?;
            buf[..bytes.len()].copy_from_slice(&bytes);
            Ok(bytes.len())
        }
    }

    #[test]
    fn test_splits_lines_from_one_read() {
        let mut reader = LineReader::new(Cursor::new(b"ls\npwd\n\necho hi".to_vec()), 255);
        assert_eq!(reader.next_line().unwrap(), line("ls"));
        assert_eq!(reader.next_line().unwrap(), line("pwd"));
        assert_eq!(reader.next_line().unwrap(), line(""));
        assert_eq!(reader.next_line().unwrap(), line("echo hi"));
        assert_eq!(reader.next_line().unwrap(), ReadOutcome::Eof);
        assert_eq!(reader.next_line().unwrap(), ReadOutcome::Eof);
    }

    #[test]
    fn test_truncates_long_lines() {
        let mut input = vec![b'a'; 2000];
        input.extend_from_slice(b"\nnext\n");
        let mut reader = LineReader::new(Cursor::new(input), 10);
        assert_eq!(reader.next_line().unwrap(), line("aaaaaaaaaa"));
        assert_eq!(reader.next_line().unwrap(), line("next"));
    }

    #[test]
    fn test_interrupt_keeps_partial_line() {
        let script = Script(vec![
            Ok(b"ech".to_vec()),
            Err(io::Error::from(io::ErrorKind::Interrupted)),
            Ok(b"o hi\n".to_vec()),
        ]);
        let mut reader = LineReader::new(script, 255);
        assert_eq!(reader.next_line().unwrap(), ReadOutcome::Interrupted);
        assert_eq!(reader.next_line().unwrap(), line("echo hi"));
    }

    #[test]
    fn test_genuine_error_is_returned() {
        let script = Script(vec![Err(io::Error::from(io::ErrorKind::PermissionDenied))]);
        let mut reader = LineReader::new(script, 255);
        assert!(reader.next_line().is_err());
    }

    #[test]
    fn test_non_utf8_bytes_pass_through() {
        let mut reader = LineReader::new(Cursor::new(b"cd caf\xe9\necho \xff".to_vec()), 255);
        assert_eq!(reader.next_line().unwrap(), ReadOutcome::Line(b"cd caf\xe9".to_vec()));
        assert_eq!(reader.next_line().unwrap(), ReadOutcome::Line(b"echo \xff".to_vec()));
        assert_eq!(reader.next_line().unwrap(), ReadOutcome::Eof);
    }

    #[test]
    fn test_prompt_is_written() {
        let mut reader = LineReader::new(Cursor::new(b"pwd\n".to_vec()), 255);
        let mut out = Vec::new();
        assert_eq!(reader.read_line(b"/tmp$ ", &mut out).unwrap(), line("pwd"));
        assert_eq!(out, b"/tmp$ ");
    }

    #[test]
    fn test_truncate_at_boundary() {
        let mut text = "héllo".to_string();
        truncate_at_boundary(&mut text, 2);
        assert_eq!(text, "h");
        let mut short = "ok".to_string();
        truncate_at_boundary(&mut short, 10);
        assert_eq!(short, "ok");
    }
}
