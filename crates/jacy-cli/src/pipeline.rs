// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Stage driver: lex, parse, resolve, with a diagnostics checkpoint after
//! each stage.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use jacy_ast::stmt::Stmt;
use jacy_ast::token::Token;
use jacy_ast::{LineMap, ParseSess, Session};
use jacy_diagnostics::json::SuggestionReport;
use jacy_diagnostics::{RenderConfig, SuggestError, Suggester, Suggestion, ToSuggestion};
use jacy_parser::Parser;
use jacy_resolve::{Namespace, Rib};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{CompileDepth, Config, OutputFormat};
use crate::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
    Resolve,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Lex => "Lex",
            Stage::Parse => "Parse",
            Stage::Resolve => "Resolve",
        }
    }

    fn json_name(self) -> &'static str {
        match self {
            Stage::Lex => "lex",
            Stage::Parse => "parse",
            Stage::Resolve => "resolve",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Errors were reported during `stage`; later stages did not run.
    #[error("{stage} stopped due to errors above")]
    Halt { stage: Stage, errors: usize },
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
    #[error("failed to serialize diagnostics: {0}")]
    Json(#[from] serde_json::Error),
}

/// Compile one file. Dumps and JSON reports go to `out`, rendered
/// diagnostics to `err`.
#[tracing::instrument(level = "debug", skip_all, fields(file = %config.file.display()))]
pub fn run(config: &Config, out: &mut dyn Write, err: &mut dyn Write) -> Result<(), DriverError> {
    let text = fs::read_to_string(&config.file).map_err(|source| DriverError::Read {
        path: config.file.clone(),
        source,
    })?;

    let mut sess = Session::new();
    let file = sess.source_map.add_source(&config.file);
    let parse_sess = ParseSess::new(file);

    if config.print.source {
        print_source(out, &text)?;
    }

    let tokens = match jacy_lexer::lex(&parse_sess, &text) {
        Ok(lexed) => {
            sess.source_map.set_source(file, text, lexed.lines);
            lexed.tokens
        }
        Err(lex_err) => {
            let lines = LineMap::new(&text);
            sess.source_map.set_source(file, text, lines);
            let mut driver = Driver { config, sess: &sess, out, err };
            driver.emit(Stage::Lex, &[lex_err.to_suggestion()])?;
            return Err(DriverError::Halt { stage: Stage::Lex, errors: 1 });
        }
    };
    info!(tokens = tokens.len(), "lexed");

    let mut driver = Driver { config, sess: &sess, out, err };
    if config.print.tokens {
        driver.print_tokens(&tokens)?;
    }

    let parsed = match Parser::new(&parse_sess, tokens).parse() {
        Ok(parsed) => parsed,
        Err(abort) => {
            debug!(message = %abort, "parser aborted");
            driver.emit(Stage::Parse, &abort.suggestions)?;
            let errors = abort.suggestions.iter().filter(|s| s.is_error()).count();
            return Err(DriverError::Halt { stage: Stage::Parse, errors: errors.max(1) });
        }
    };
    driver.emit(Stage::Parse, &parsed.suggestions)?;
    if config.print.ast {
        driver.print_ast(&parsed.stmts)?;
    }
    if config.depth == CompileDepth::Parser {
        driver.banner_ok(Stage::Parse)?;
        return Ok(());
    }

    let resolved = jacy_resolve::resolve(&parsed.stmts);
    driver.emit(Stage::Resolve, &resolved.suggestions)?;
    if config.print.names {
        driver.print_names(&resolved.root_rib)?;
    }
    driver.banner_ok(Stage::Resolve)?;
    Ok(())
}

struct Driver<'a, 'w> {
    config: &'a Config,
    sess: &'a Session,
    out: &'w mut dyn Write,
    err: &'w mut dyn Write,
}

impl Driver<'_, '_> {
    /// Flush one stage's suggestions and halt if any of them is an error.
    fn emit(&mut self, stage: Stage, suggestions: &[Suggestion]) -> Result<(), DriverError> {
        if self.config.print.sugg {
            writeln!(self.out, "{}", output::section("Suggestions", suggestions.len()))?;
            writeln!(self.out, "{:#?}", suggestions)?;
        }

        match self.config.format {
            OutputFormat::Json => {
                let report = SuggestionReport::new(stage.json_name(), suggestions, &self.sess.source_map);
                writeln!(self.out, "{}", report.to_json()?)?;
                match report.error_count {
                    0 => Ok(()),
                    errors => Err(DriverError::Halt { stage, errors }),
                }
            }
            OutputFormat::Human => {
                let config = RenderConfig { wrap_len: self.config.wrap_len, color: output::color_enabled() };
                match Suggester::new(self.sess, config).apply(suggestions, self.err) {
                    Ok(()) => Ok(()),
                    Err(SuggestError::Halt { errors }) => Err(DriverError::Halt { stage, errors }),
                    Err(SuggestError::Io(e)) => Err(DriverError::Write(e)),
                }
            }
        }
    }

    fn banner_ok(&mut self, stage: Stage) -> io::Result<()> {
        if self.config.format == OutputFormat::Human {
            writeln!(self.out, "{}", output::banner_ok(stage.name()))?;
        }
        Ok(())
    }

    fn print_tokens(&mut self, tokens: &[Token]) -> io::Result<()> {
        writeln!(self.out, "{}", output::section("Tokens", tokens.len()))?;
        for tok in tokens {
            let (line, col) = self.sess.source_map.span_to_line_col(tok.span).unwrap_or((0, 0));
            writeln!(self.out, "{:4}:{:<3} {:?}", line, col + 1, tok.kind)?;
        }
        writeln!(self.out)
    }

    fn print_ast(&mut self, stmts: &[Stmt]) -> io::Result<()> {
        writeln!(self.out, "{}", output::section("AST", stmts.len()))?;
        for stmt in stmts {
            writeln!(self.out, "{:#?}", stmt)?;
        }
        writeln!(self.out)
    }

    fn print_names(&mut self, rib: &Rib) -> io::Result<()> {
        let types = rib.names(Namespace::Type);
        let values = rib.names(Namespace::Value);
        writeln!(self.out, "{}", output::section("Names", types.len() + values.len()))?;
        for (label, names) in [("type", types), ("value", values)] {
            for (name, binding) in names {
                writeln!(self.out, "  {:<6}{:<20} {:?}", label, name, binding.res)?;
            }
        }
        writeln!(self.out)
    }
}

fn print_source(out: &mut dyn Write, text: &str) -> io::Result<()> {
    let lines: Vec<&str> = text.lines().collect();
    writeln!(out, "{}", output::section("Source", lines.len()))?;
    for (i, line) in lines.iter().enumerate() {
        writeln!(out, "{:4} | {}", i + 1, line)?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PrintSet, DEFAULT_WRAP_LEN};
    use std::io::Write as _;

    fn config_for(file: &tempfile::NamedTempFile) -> Config {
        Config {
            file: file.path().to_path_buf(),
            print: PrintSet::default(),
            depth: CompileDepth::NameResolution,
            wrap_len: DEFAULT_WRAP_LEN,
            format: OutputFormat::Human,
            dev: false,
        }
    }

    fn source(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".jc").tempfile().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn run_with(config: &Config) -> (Result<(), DriverError>, String, String) {
        colored::control::set_override(false);
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = run(config, &mut out, &mut err);
        (result, String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn clean_file_reaches_resolve() {
        let file = source("val x = 1 + 2\nprint(x)\n");
        let (result, out, err) = run_with(&config_for(&file));
        assert!(result.is_ok(), "{:?}", result);
        assert!(out.contains("=== Resolve OK ==="), "{}", out);
        assert!(err.is_empty(), "{}", err);
    }

    #[test]
    fn parser_depth_stops_early() {
        let file = source("val x = y\n");
        let mut config = config_for(&file);
        config.depth = CompileDepth::Parser;
        let (result, out, _) = run_with(&config);
        assert!(result.is_ok(), "{:?}", result);
        assert!(out.contains("=== Parse OK ==="));
        assert!(!out.contains("Resolve"));
    }

    #[test]
    fn resolve_errors_halt() {
        let file = source("val count = 1\nprint(cout)\n");
        let (result, _, err) = run_with(&config_for(&file));
        assert!(matches!(result, Err(DriverError::Halt { stage: Stage::Resolve, errors: 1 })), "{:?}", result);
        assert!(err.contains("Cannot find `cout` in this scope"), "{}", err);
        assert!(err.contains("did you mean `count`?"), "{}", err);
    }

    #[test]
    fn lexer_error_is_rendered() {
        let file = source("val s = \"open\n");
        let (result, _, err) = run_with(&config_for(&file));
        assert!(matches!(result, Err(DriverError::Halt { stage: Stage::Lex, .. })), "{:?}", result);
        assert!(err.contains("Unterminated string literal"), "{}", err);
    }

    #[test]
    fn parser_abort_is_rendered() {
        let file = source("func main() {\n    val x = 1\n");
        let (result, _, err) = run_with(&config_for(&file));
        assert!(matches!(result, Err(DriverError::Halt { stage: Stage::Parse, .. })), "{:?}", result);
        assert!(err.contains("Expected '}', found end of file"), "{}", err);
    }

    #[test]
    fn dumps() {
        let file = source("struct Point {}\nval origin = 0\n");
        let mut config = config_for(&file);
        config.print = PrintSet { tokens: true, ast: true, sugg: false, source: true, names: true };
        let (result, out, _) = run_with(&config);
        assert!(result.is_ok(), "{:?}", result);
        assert!(out.contains("=== Source (2) ==="), "{}", out);
        assert!(out.contains("=== Tokens ("), "{}", out);
        assert!(out.contains("=== AST (2) ==="), "{}", out);
        assert!(out.contains("=== Names (2) ==="), "{}", out);
        assert!(out.contains("Point"));
        assert!(out.contains("origin"));
    }

    #[test]
    fn json_report_per_stage() {
        let file = source("val x = zz\n");
        let mut config = config_for(&file);
        config.format = OutputFormat::Json;
        let (result, out, err) = run_with(&config);
        assert!(matches!(result, Err(DriverError::Halt { stage: Stage::Resolve, errors: 1 })));
        assert!(err.is_empty());
        let reports: Vec<serde_json::Value> = serde_json::Deserializer::from_str(&out)
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0]["stage"], "parse");
        assert_eq!(reports[1]["stage"], "resolve");
        assert_eq!(reports[1]["error_count"], 1);
    }

    #[test]
    fn missing_file() {
        let config = Config {
            file: PathBuf::from("/nonexistent/dir/main.jc"),
            print: PrintSet::default(),
            depth: CompileDepth::NameResolution,
            wrap_len: DEFAULT_WRAP_LEN,
            format: OutputFormat::Human,
            dev: false,
        };
        let (result, _, _) = run_with(&config);
        assert!(matches!(result, Err(DriverError::Read { .. })));
    }
}
