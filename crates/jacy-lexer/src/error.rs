// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexer error types.

use jacy_ast::Span;
use jacy_diagnostics::{Suggestion, ToSuggestion};
use thiserror::Error;

/// A fatal lexing error. Lexing of the file stops at the first one.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("Unexpected character '{ch}'")]
    UnexpectedChar { ch: char, span: Span },
    #[error("Unterminated string literal")]
    UnterminatedString { span: Span },
    #[error("Unterminated block comment")]
    UnterminatedComment { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. }
            | LexError::UnterminatedString { span }
            | LexError::UnterminatedComment { span } => *span,
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            LexError::UnexpectedChar { ch: '#', .. } => Some("comments start with '//'"),
            LexError::UnexpectedChar { ch: '`', .. } => Some("strings use '\"' or '''"),
            LexError::UnexpectedChar { .. } => None,
            LexError::UnterminatedString { .. } => Some("add a closing quote to end the string"),
            LexError::UnterminatedComment { .. } => Some("close the comment with '*/'"),
        }
    }
}

impl ToSuggestion for LexError {
    fn to_suggestion(&self) -> Suggestion {
        let sugg = Suggestion::error(self.to_string(), self.span());
        match self.hint() {
            Some(hint) => sugg.with_help(hint),
            None => sugg,
        }
    }
}
