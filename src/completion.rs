// completion.rs

use std::os::unix::fs::PermissionsExt;

use itertools::Itertools;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use crate::builtins::Builtin;

/// Completes the command word from builtin names and executables on `PATH`.
pub struct ShellHelper;

impl ShellHelper {
    pub fn new() -> Self {
        Self
    }
}

pub fn candidates(prefix: &str) -> Vec<String> {
    let builtins = Builtin::ALL
        .iter()
        .map(|builtin| builtin.name().to_string())
        .filter(|name| name.starts_with(prefix));
    builtins
        .chain(path_executables(prefix))
        .sorted()
        .dedup()
        .collect()
}

fn path_executables(prefix: &str) -> Vec<String> {
    let Some(path_var) = std::env::var_os("PATH") else {
        return Vec::new();
    };
    let mut names = Vec::new();
    for dir in std::env::split_paths(&path_var) {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if !name.starts_with(prefix) {
                continue;
            }
            // follows symlinks, unlike entry.metadata()
            let is_exec = std::fs::metadata(entry.path())
                .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
                .unwrap_or(false);
            if is_exec {
                names.push(name.to_string());
            }
        }
    }
    names
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Result<(usize, Vec<Pair>), ReadlineError> {
        let prefix = &line[..pos];
        // arguments are not completed
        if prefix.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        let completions = candidates(prefix)
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: format!("{name} "),
            })
            .collect();
        Ok((0, completions))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}
