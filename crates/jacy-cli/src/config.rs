// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Command-line options.
//!
//! Options use the single-dash `-name=value` form; `--dev`, `--help` and
//! `--version` are plain switches.

use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_WRAP_LEN: usize = 120;
pub const MIN_WRAP_LEN: usize = 40;

/// Debug dumps requested with `-print=`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintSet {
    pub tokens: bool,
    pub ast: bool,
    pub sugg: bool,
    pub source: bool,
    pub names: bool,
}

impl PrintSet {
    fn add(&mut self, what: &str) -> bool {
        match what {
            "tokens" => self.tokens = true,
            "ast" => self.ast = true,
            "sugg" => self.sugg = true,
            "source" => self.source = true,
            "names" => self.names = true,
            "all" => {
                *self = PrintSet { tokens: true, ast: true, sugg: true, source: true, names: true };
            }
            _ => return false,
        }
        true
    }
}

/// Last stage to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompileDepth {
    Parser,
    #[default]
    NameResolution,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub file: PathBuf,
    pub print: PrintSet,
    pub depth: CompileDepth,
    pub wrap_len: usize,
    pub format: OutputFormat,
    pub dev: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Compile(Config),
    Help,
    Version,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("invalid value `{value}` for `-{option}`, expected {expected}")]
    InvalidValue { option: &'static str, value: String, expected: &'static str },
    #[error("`-wrap-len` must be at least {MIN_WRAP_LEN}, got {0}")]
    WrapTooSmall(usize),
    #[error("no input file")]
    MissingFile,
    #[error("unexpected argument `{0}`, only one input file is supported")]
    ExtraArgument(String),
}

/// Parse the arguments after the program name.
pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command, ConfigError> {
    let mut file = None;
    let mut print = PrintSet::default();
    let mut depth = CompileDepth::default();
    let mut wrap_len = DEFAULT_WRAP_LEN;
    let mut format = OutputFormat::default();
    let mut dev = false;

    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-V" => return Ok(Command::Version),
            "--dev" => dev = true,
            _ if arg.starts_with('-') => {
                let (name, value) = arg[1..].split_once('=').ok_or_else(|| ConfigError::UnknownOption(arg.clone()))?;
                match name {
                    "print" => {
                        for what in value.split(',') {
                            if !print.add(what) {
                                return Err(invalid("print", what, "tokens, ast, sugg, source, names or all"));
                            }
                        }
                    }
                    "compile-depth" => {
                        depth = match value {
                            "parser" => CompileDepth::Parser,
                            "name-resolution" => CompileDepth::NameResolution,
                            _ => return Err(invalid("compile-depth", value, "parser or name-resolution")),
                        }
                    }
                    "wrap-len" => {
                        let len: usize = value.parse().map_err(|_| invalid("wrap-len", value, "a number"))?;
                        if len < MIN_WRAP_LEN {
                            return Err(ConfigError::WrapTooSmall(len));
                        }
                        wrap_len = len;
                    }
                    "format" => {
                        format = match value {
                            "human" => OutputFormat::Human,
                            "json" => OutputFormat::Json,
                            _ => return Err(invalid("format", value, "human or json")),
                        }
                    }
                    _ => return Err(ConfigError::UnknownOption(arg.clone())),
                }
            }
            _ => {
                if file.is_some() {
                    return Err(ConfigError::ExtraArgument(arg));
                }
                file = Some(PathBuf::from(arg));
            }
        }
    }

    let file = file.ok_or(ConfigError::MissingFile)?;
    Ok(Command::Compile(Config { file, print, depth, wrap_len, format, dev }))
}

fn invalid(option: &'static str, value: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidValue { option, value: value.to_string(), expected }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Result<Command, ConfigError> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    fn config(args: &[&str]) -> Config {
        match parse(args) {
            Ok(Command::Compile(config)) => config,
            other => panic!("Expected compile command, got {:?}", other),
        }
    }

    #[test]
    fn defaults() {
        let config = config(&["main.jc"]);
        assert_eq!(config.file, PathBuf::from("main.jc"));
        assert_eq!(config.print, PrintSet::default());
        assert_eq!(config.depth, CompileDepth::NameResolution);
        assert_eq!(config.wrap_len, DEFAULT_WRAP_LEN);
        assert_eq!(config.format, OutputFormat::Human);
        assert!(!config.dev);
    }

    #[test]
    fn all_options() {
        let config = config(&["-print=tokens,names", "-compile-depth=parser", "-wrap-len=80", "-format=json", "--dev", "a.jc"]);
        assert!(config.print.tokens && config.print.names);
        assert!(!config.print.ast);
        assert_eq!(config.depth, CompileDepth::Parser);
        assert_eq!(config.wrap_len, 80);
        assert_eq!(config.format, OutputFormat::Json);
        assert!(config.dev);
    }

    #[test]
    fn print_all() {
        let config = config(&["-print=all", "a.jc"]);
        assert!(config.print.tokens && config.print.ast && config.print.sugg && config.print.source);
    }

    #[test]
    fn help_and_version_win() {
        assert_eq!(parse(&["a.jc", "--help"]), Ok(Command::Help));
        assert_eq!(parse(&["--version"]), Ok(Command::Version));
    }

    #[test]
    fn errors() {
        assert_eq!(parse(&[]), Err(ConfigError::MissingFile));
        assert_eq!(parse(&["-o", "a.jc"]), Err(ConfigError::UnknownOption("-o".into())));
        assert_eq!(parse(&["-color=on", "a.jc"]), Err(ConfigError::UnknownOption("-color=on".into())));
        assert_eq!(parse(&["-wrap-len=10", "a.jc"]), Err(ConfigError::WrapTooSmall(10)));
        assert_eq!(parse(&["a.jc", "b.jc"]), Err(ConfigError::ExtraArgument("b.jc".into())));
        assert_eq!(
            parse(&["-print=bytes", "a.jc"]).map_err(|e| e.to_string()),
            Err("invalid value `bytes` for `-print`, expected tokens, ast, sugg, source, names or all".to_string())
        );
    }
}
