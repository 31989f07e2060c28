// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal renderer for suggestions.
//!
//! Each message is placed around a caret line under the offending source
//! line, choosing the first layout that fits the wrap width:
//!
//! ```text
//! error: main.jc:1:9
//! 1 | val x = foo
//!       bad---^^^
//! ```
//!
//! then `^^^---message` after the span, then a dashed pointer line with the
//! message (hard-wrapped) on the following lines.

use std::collections::HashMap;
use std::io::Write;

use colored::Colorize;
use jacy_ast::{FileId, Session, SourceFile, Span};
use thiserror::Error;
use tracing::debug;

use crate::{SuggKind, Suggestion};

/// Width of the `---` connector plus the caret it leads to.
const CONNECTOR_LEN: usize = 4;
const HELP_INDENT: &str = "    ";
const HELP_LABEL: &str = "help: ";

#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    /// Maximum width of a rendered line, gutter included.
    pub wrap_len: usize,
    pub color: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { wrap_len: 120, color: false }
    }
}

#[derive(Debug, Error)]
pub enum SuggestError {
    /// At least one suggestion was an error; the pipeline must stop.
    #[error("Stop due to errors above")]
    Halt { errors: usize },
    #[error("failed to write diagnostics: {0}")]
    Io(#[from] std::io::Error),
}

/// Lays out suggestions against the sources in a [`Session`].
pub struct Suggester<'a> {
    sess: &'a Session,
    config: RenderConfig,
    /// Gutter width per file: digits of the last line number plus `" | "`.
    indents: HashMap<FileId, usize>,
}

impl<'a> Suggester<'a> {
    pub fn new(sess: &'a Session, config: RenderConfig) -> Self {
        Self { sess, config, indents: HashMap::new() }
    }

    /// Render a batch and signal a halt if any of it is an error.
    #[tracing::instrument(level = "debug", skip_all, fields(count = suggestions.len()))]
    pub fn apply(&mut self, suggestions: &[Suggestion], out: &mut dyn Write) -> Result<(), SuggestError> {
        if suggestions.is_empty() {
            debug!("no suggestions");
            return Ok(());
        }
        out.write_all(self.render(suggestions).as_bytes())?;
        out.flush()?;

        let errors = suggestions.iter().filter(|s| s.is_error()).count();
        if errors > 0 {
            return Err(SuggestError::Halt { errors });
        }
        Ok(())
    }

    /// Render a batch to text, one block per suggestion.
    pub fn render(&mut self, suggestions: &[Suggestion]) -> String {
        let mut out = String::new();
        for sugg in suggestions {
            self.render_header(&mut out, sugg.kind(), sugg.span());
            self.render_body(&mut out, sugg);
            out.push('\n');
        }
        out
    }

    fn render_body(&mut self, out: &mut String, sugg: &Suggestion) {
        match sugg {
            Suggestion::Msg { message, span, .. } => self.point_msg_to(out, message, *span),
            Suggestion::MsgSpanLink { span_msg, span, link_msg, link, .. } => {
                self.point_msg_to(out, span_msg, *span);
                self.point_msg_to(out, link_msg, *link);
            }
            Suggestion::Help { inner, help } => {
                self.render_body(out, inner);
                let label = if self.config.color {
                    HELP_LABEL.cyan().bold().to_string()
                } else {
                    HELP_LABEL.to_string()
                };
                let wrapped = hard_wrap(help, self.config.wrap_len.saturating_sub(HELP_LABEL.len()));
                for (i, line) in wrapped.lines().enumerate() {
                    out.push_str(HELP_INDENT);
                    if i == 0 {
                        out.push_str(&label);
                    } else {
                        out.push_str(&" ".repeat(HELP_LABEL.len()));
                    }
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
    }

    fn render_header(&self, out: &mut String, kind: SuggKind, span: Span) {
        let label = if self.config.color {
            match kind {
                SuggKind::Error => kind.label().red().bold().to_string(),
                SuggKind::Warn => kind.label().yellow().bold().to_string(),
            }
        } else {
            kind.label().to_string()
        };
        match self.sess.source_map.get_source_file(span.file) {
            Some(file) => {
                let (line, col) = file.lines.offset_to_line_col(span.pos);
                out.push_str(&format!("{}: {}:{}:{}\n", label, file.path.display(), line, col + 1));
            }
            None => out.push_str(&format!("{}:\n", label)),
        }
    }

    fn point_msg_to(&mut self, out: &mut String, msg: &str, span: Span) {
        let indent = self.indent(span.file);
        let width = self.config.wrap_len.saturating_sub(indent);

        let Some(file) = self.sess.source_map.get_source_file(span.file) else {
            push_indented(out, indent, msg, width);
            return;
        };

        let (line, byte_col) = file.lines.offset_to_line_col(span.pos);
        let text = file.lines.line_text(&file.text, line).unwrap_or("");
        let byte_col = byte_col as usize;
        let col = text.get(..byte_col).map_or(byte_col, |s| s.chars().count());
        let span_end = (byte_col + span.len as usize).min(text.len());
        let len = text.get(byte_col..span_end).map_or(0, |s| s.chars().count()).max(1);

        self.render_line(out, file, line, indent, width);

        let msg_len = msg.chars().count();
        let real_msg_len = msg_len + CONNECTOR_LEN;
        let span_max = col + len;

        if real_msg_len <= col {
            let point_line = format!("{:>pad$}---{}", msg, "^".repeat(len), pad = col - 3);
            push_indented(out, indent, &point_line, width);
        } else if width > span_max && width - span_max >= real_msg_len {
            let point_line = format!("{}{}---{}", " ".repeat(col), "^".repeat(len), msg);
            push_indented(out, indent, &point_line, width);
        } else {
            let (point_len, formatted) = if msg_len > width {
                (width, hard_wrap(msg, width))
            } else {
                (msg_len, msg.to_string())
            };
            push_indented(out, indent, &pointer_line(point_len, col, len), width);
            for line in formatted.lines() {
                push_indented(out, indent, line, width);
            }
        }
    }

    fn render_line(&self, out: &mut String, file: &SourceFile, line: u32, indent: usize, width: usize) {
        let text = file.lines.line_text(&file.text, line).unwrap_or("");
        let number = format!("{:>pad$}", line, pad = indent - 3);
        if self.config.color {
            out.push_str(&format!("{} {} {}\n", number.blue().bold(), "|".blue(), clip_end(text, width)));
        } else {
            out.push_str(&format!("{} | {}\n", number, clip_end(text, width)));
        }
    }

    fn indent(&mut self, file: FileId) -> usize {
        let sess = self.sess;
        *self.indents.entry(file).or_insert_with(|| {
            let last_line = sess.source_map.get_lines_count(file).max(1);
            last_line.to_string().len() + 3
        })
    }
}

fn push_indented(out: &mut String, indent: usize, text: &str, width: usize) {
    out.push_str(&" ".repeat(indent));
    out.push_str(clip_end(text, width));
    out.push('\n');
}

/// `-` everywhere except `^` under the span, at least `width` long.
fn pointer_line(width: usize, col: usize, len: usize) -> String {
    (0..width.max(col + len))
        .map(|i| if (col..col + len).contains(&i) { '^' } else { '-' })
        .collect()
}

/// First `width` characters of `text`.
fn clip_end(text: &str, width: usize) -> &str {
    match text.char_indices().nth(width) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Break `text` into lines of exactly `width` characters, ignoring word
/// boundaries.
pub fn hard_wrap(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use jacy_ast::LineMap;
    use pretty_assertions::assert_eq;

    fn session(src: &str) -> (Session, FileId) {
        let mut sess = Session::new();
        let file = sess.source_map.add_source("main.jc");
        sess.source_map.set_source(file, src, LineMap::new(src));
        (sess, file)
    }

    fn render_with(src: &str, wrap_len: usize, sugg: Suggestion) -> String {
        let (sess, _) = session(src);
        Suggester::new(&sess, RenderConfig { wrap_len, color: false }).render(&[sugg])
    }

    fn at(pos: u32, len: u32) -> Span {
        Span::new(pos, len, FileId(0))
    }

    // `foo` sits at column 8, the gutter is 4 wide ("1 | ").

    #[test]
    fn message_fits_before_span() {
        let out = render_with("val x = foo\n", 120, Suggestion::error("bad", at(8, 3)));
        assert_eq!(out, "error: main.jc:1:9\n1 | val x = foo\n      bad---^^^\n\n");
    }

    #[test]
    fn message_exactly_fills_space_before_span() {
        // 4 chars + 4 connector == column 8
        let out = render_with("val x = foo\n", 120, Suggestion::error("abcd", at(8, 3)));
        assert_eq!(out, "error: main.jc:1:9\n1 | val x = foo\n     abcd---^^^\n\n");
    }

    #[test]
    fn message_goes_after_span_when_too_long_for_before() {
        // 5 chars + 4 connector == 9 > column 8; width 20 leaves exactly 9 after the span
        let out = render_with("val x = foo\n", 24, Suggestion::error("abcde", at(8, 3)));
        assert_eq!(out, "error: main.jc:1:9\n1 | val x = foo\n            ^^^---abcde\n\n");
    }

    #[test]
    fn message_goes_to_next_line_when_nothing_fits() {
        // width 19 leaves only 8 after the span
        let out = render_with("val x = foo\n", 23, Suggestion::error("abcde", at(8, 3)));
        assert_eq!(
            out,
            "error: main.jc:1:9\n1 | val x = foo\n    --------^^^\n    abcde\n\n"
        );
    }

    #[test]
    fn long_message_is_hard_wrapped() {
        let out = render_with("foo", 14, Suggestion::warn("abcdefghijklmnop", at(0, 3)));
        assert_eq!(
            out,
            "warning: main.jc:1:1\n1 | foo\n    ^^^-------\n    abcdefghij\n    klmnop\n\n"
        );
    }

    #[test]
    fn gutter_grows_with_line_count() {
        let src = "a\nb\nc\nd\ne\nf\ng\nh\ni\nval j = foo";
        let out = render_with(src, 120, Suggestion::error("bad", at(26, 3)));
        assert_eq!(out, "error: main.jc:10:9\n10 | val j = foo\n       bad---^^^\n\n");
    }

    #[test]
    fn span_link_points_twice() {
        let src = "val x = 1\nval x = 2";
        let sugg = Suggestion::error("`x` has already been declared in this scope", at(14, 1))
            .with_link("first declared here", at(4, 1));
        let out = render_with(src, 120, sugg);
        let expected = [
            "error: main.jc:2:5",
            "2 | val x = 2",
            "        ^---`x` has already been declared in this scope",
            "1 | val x = 1",
            "        ^---first declared here",
            "",
            "",
        ]
        .join("\n");
        assert_eq!(out, expected);
    }

    #[test]
    fn help_follows_inner() {
        let sugg = Suggestion::error("bad", at(8, 3)).with_help("try `bar`");
        let out = render_with("val x = foo", 120, sugg);
        assert_eq!(out, "error: main.jc:1:9\n1 | val x = foo\n      bad---^^^\n    help: try `bar`\n\n");
    }

    #[test]
    fn apply_halts_on_error_only() {
        let (sess, _) = session("val x = foo");
        let mut suggester = Suggester::new(&sess, RenderConfig::default());
        let mut sink = Vec::new();

        let warn = vec![Suggestion::warn("w", at(0, 3))];
        assert!(suggester.apply(&warn, &mut sink).is_ok());

        let err = vec![Suggestion::warn("w", at(0, 3)), Suggestion::error("e", at(8, 3))];
        match suggester.apply(&err, &mut sink) {
            Err(SuggestError::Halt { errors }) => assert_eq!(errors, 1),
            other => panic!("expected halt, got {:?}", other),
        }
        assert!(!sink.is_empty());
    }

    #[test]
    fn wrap_splits_on_width() {
        assert_eq!(hard_wrap("abcdef", 4), "abcd\nef");
        assert_eq!(hard_wrap("abc", 0), "abc");
    }
}
