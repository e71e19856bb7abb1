// config.rs

use std::env;

use crate::error::ShellError;
use crate::history::MAX_HISTORY;

/// Longest input line kept, in bytes; anything past it is dropped.
pub const DEFAULT_MAX_LINE: usize = 255;

const MAX_LINE_VAR: &str = "HISTSH_MAX_LINE";
const HISTORY_SIZE_VAR: &str = "HISTSH_HISTORY_SIZE";
const MAX_ARGS_VAR: &str = "HISTSH_MAX_ARGS";
const EDITOR_VAR: &str = "HISTSH_EDITOR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub max_line_len: usize,
    pub history_capacity: usize,
    pub max_args: Option<usize>,
    pub line_editor: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE,
            history_capacity: MAX_HISTORY,
            max_args: None,
            line_editor: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ShellError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ShellError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        if let Some(value) = lookup(MAX_LINE_VAR) {
            config.max_line_len = parse_positive(MAX_LINE_VAR, value)?;
        }
        if let Some(value) = lookup(HISTORY_SIZE_VAR) {
            config.history_capacity = parse_positive(HISTORY_SIZE_VAR, value)?;
        }
        if let Some(value) = lookup(MAX_ARGS_VAR) {
            config.max_args = Some(parse_positive(MAX_ARGS_VAR, value)?);
        }
        if let Some(value) = lookup(EDITOR_VAR) {
            config.line_editor = match value.trim() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => return Err(ShellError::InvalidConfig { var: EDITOR_VAR, value }),
            };
        }
        Ok(config)
    }
}

fn parse_positive(var: &'static str, value: String) -> Result<usize, ShellError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ShellError::InvalidConfig { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ShellError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.max_line_len, 255);
        assert_eq!(config.max_args, None);
        assert!(!config.line_editor);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("HISTSH_MAX_LINE", "1024"),
            ("HISTSH_HISTORY_SIZE", " 5 "),
            ("HISTSH_MAX_ARGS", "19"),
            ("HISTSH_EDITOR", "true"),
        ])
        .unwrap();
        assert_eq!(config.max_line_len, 1024);
        assert_eq!(config.history_capacity, 5);
        assert_eq!(config.max_args, Some(19));
        assert!(config.line_editor);
    }

    #[test]
    fn test_rejects_zero_and_garbage() {
        assert!(matches!(
            load(&[("HISTSH_HISTORY_SIZE", "0")]),
            Err(ShellError::InvalidConfig { var: "HISTSH_HISTORY_SIZE", .. })
        ));
        assert!(matches!(
            load(&[("HISTSH_MAX_LINE", "lots")]),
            Err(ShellError::InvalidConfig { var: "HISTSH_MAX_LINE", .. })
        ));
        assert!(matches!(
            load(&[("HISTSH_EDITOR", "maybe")]),
            Err(ShellError::InvalidConfig { var: "HISTSH_EDITOR", .. })
        ));
    }
}
