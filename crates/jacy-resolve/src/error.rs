// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Resolution error types.

use jacy_ast::Span;
use jacy_diagnostics::{Suggestion, ToSuggestion};
use thiserror::Error;

/// A name resolution error.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ResolveError {
    pub kind: ResolveErrorKind,
    pub span: Span,
}

impl ResolveError {
    pub fn redeclared(name: String, span: Span, previous: Option<Span>) -> Self {
        Self { kind: ResolveErrorKind::Redeclared { name, previous }, span }
    }

    pub fn unresolved_value(name: String, span: Span, similar: Option<String>) -> Self {
        Self { kind: ResolveErrorKind::UnresolvedValue { name, similar }, span }
    }

    pub fn unresolved_type(name: String, span: Span, similar: Option<String>) -> Self {
        Self { kind: ResolveErrorKind::UnresolvedType { name, similar }, span }
    }

    pub fn outside_loop(keyword: &'static str, span: Span) -> Self {
        Self { kind: ResolveErrorKind::OutsideLoop { keyword }, span }
    }

    pub fn outside_function(span: Span) -> Self {
        Self { kind: ResolveErrorKind::OutsideFunction, span }
    }

    pub fn outside_type(keyword: &'static str, span: Span) -> Self {
        Self { kind: ResolveErrorKind::OutsideType { keyword }, span }
    }
}

/// The kind of resolution error.
#[derive(Debug, Clone, Error)]
pub enum ResolveErrorKind {
    #[error("`{name}` has already been declared in this scope")]
    Redeclared { name: String, previous: Option<Span> },

    #[error("Cannot find `{name}` in this scope")]
    UnresolvedValue { name: String, similar: Option<String> },

    #[error("Cannot find type `{name}` in this scope")]
    UnresolvedType { name: String, similar: Option<String> },

    #[error("`{keyword}` outside of a loop")]
    OutsideLoop { keyword: &'static str },

    #[error("`return` outside of a function")]
    OutsideFunction,

    #[error("`{keyword}` outside of a class, struct, trait or object")]
    OutsideType { keyword: &'static str },
}

impl ToSuggestion for ResolveError {
    fn to_suggestion(&self) -> Suggestion {
        let sugg = Suggestion::error(self.to_string(), self.span);
        match &self.kind {
            ResolveErrorKind::Redeclared { previous: Some(previous), .. } => {
                sugg.with_link("previously declared here", *previous)
            }
            ResolveErrorKind::UnresolvedValue { similar: Some(similar), .. }
            | ResolveErrorKind::UnresolvedType { similar: Some(similar), .. } => sugg.with_help(similar.clone()),
            _ => sugg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jacy_ast::FileId;

    fn span(pos: u32) -> Span {
        Span::new(pos, 1, FileId(0))
    }

    #[test]
    fn redeclaration_links_previous() {
        let err = ResolveError::redeclared("x".into(), span(10), Some(span(2)));
        match err.to_suggestion() {
            Suggestion::MsgSpanLink { span_msg, link, .. } => {
                assert_eq!(span_msg, "`x` has already been declared in this scope");
                assert_eq!(link, span(2));
            }
            other => panic!("Expected linked suggestion, got {:?}", other),
        }
    }

    #[test]
    fn unresolved_type_with_help() {
        let err = ResolveError::unresolved_type("Strng".into(), span(0), Some("did you mean `String`?".into()));
        let sugg = err.to_suggestion();
        assert_eq!(sugg.message(), "Cannot find type `Strng` in this scope");
        assert_eq!(sugg.help(), Some("did you mean `String`?"));
        assert!(sugg.is_error());
    }
}
