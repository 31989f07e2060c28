// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Jacy compiler diagnostics.
//!
//! Every stage reports recoverable problems as [`Suggestion`] values. The
//! [`Suggester`] lays them out next to the offending source lines and tells
//! the driver whether the pipeline has to stop.

pub mod json;
pub mod render;
pub mod suggestions;

pub use render::{RenderConfig, SuggestError, Suggester};

use jacy_ast::Span;
use serde::Serialize;

// ============================================================================
// Core Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggKind {
    Error,
    Warn,
}

impl SuggKind {
    pub fn label(self) -> &'static str {
        match self {
            SuggKind::Error => "error",
            SuggKind::Warn => "warning",
        }
    }
}

/// A positioned compiler message.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    /// Message pointing at one span.
    Msg {
        kind: SuggKind,
        message: String,
        span: Span,
    },
    /// Message at `span` plus a second message at a related `link` span.
    MsgSpanLink {
        kind: SuggKind,
        span_msg: String,
        span: Span,
        link_msg: String,
        link: Span,
    },
    /// Another suggestion followed by a `help:` line. Takes the inner kind.
    Help { inner: Box<Suggestion>, help: String },
}

// ============================================================================
// Builder API
// ============================================================================

impl Suggestion {
    pub fn error(message: impl Into<String>, span: Span) -> Self {
        Suggestion::Msg { kind: SuggKind::Error, message: message.into(), span }
    }

    pub fn warn(message: impl Into<String>, span: Span) -> Self {
        Suggestion::Msg { kind: SuggKind::Warn, message: message.into(), span }
    }

    /// Point a second message at `link`. On a `Help` the link goes to the
    /// inner suggestion.
    pub fn with_link(self, link_msg: impl Into<String>, link: Span) -> Self {
        match self {
            Suggestion::Msg { kind, message, span } | Suggestion::MsgSpanLink { kind, span_msg: message, span, .. } => {
                Suggestion::MsgSpanLink { kind, span_msg: message, span, link_msg: link_msg.into(), link }
            }
            Suggestion::Help { inner, help } => Suggestion::Help { inner: Box::new(inner.with_link(link_msg, link)), help },
        }
    }

    pub fn with_help(self, help: impl Into<String>) -> Self {
        Suggestion::Help { inner: Box::new(self), help: help.into() }
    }

    pub fn kind(&self) -> SuggKind {
        match self {
            Suggestion::Msg { kind, .. } | Suggestion::MsgSpanLink { kind, .. } => *kind,
            Suggestion::Help { inner, .. } => inner.kind(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind() == SuggKind::Error
    }

    pub fn message(&self) -> &str {
        match self {
            Suggestion::Msg { message, .. } => message,
            Suggestion::MsgSpanLink { span_msg, .. } => span_msg,
            Suggestion::Help { inner, .. } => inner.message(),
        }
    }

    /// Primary location.
    pub fn span(&self) -> Span {
        match self {
            Suggestion::Msg { span, .. } | Suggestion::MsgSpanLink { span, .. } => *span,
            Suggestion::Help { inner, .. } => inner.span(),
        }
    }

    pub fn help(&self) -> Option<&str> {
        match self {
            Suggestion::Help { help, .. } => Some(help),
            _ => None,
        }
    }
}

/// Convert a stage's fatal error into a suggestion for rendering.
pub trait ToSuggestion {
    fn to_suggestion(&self) -> Suggestion;
}

/// True if any suggestion in the batch is an error.
pub fn has_errors(suggestions: &[Suggestion]) -> bool {
    suggestions.iter().any(Suggestion::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jacy_ast::FileId;

    fn span(pos: u32) -> Span {
        Span::new(pos, 1, FileId(0))
    }

    #[test]
    fn help_takes_inner_kind() {
        let s = Suggestion::warn("unused", span(0)).with_help("remove it");
        assert_eq!(s.kind(), SuggKind::Warn);
        assert_eq!(s.message(), "unused");
        assert_eq!(s.help(), Some("remove it"));
        assert!(!has_errors(&[s]));
    }

    #[test]
    fn link_through_help() {
        let s = Suggestion::error("duplicate", span(4))
            .with_help("rename one")
            .with_link("first here", span(0));
        match s {
            Suggestion::Help { inner, .. } => {
                assert!(matches!(*inner, Suggestion::MsgSpanLink { ref link_msg, .. } if link_msg == "first here"));
            }
            other => panic!("expected help, got {:?}", other),
        }
    }

    #[test]
    fn errors_are_detected() {
        let batch = vec![Suggestion::warn("w", span(0)), Suggestion::error("e", span(1))];
        assert!(has_errors(&batch));
        assert_eq!(batch[1].span(), span(1));
    }
}
