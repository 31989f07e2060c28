// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Abstract Syntax Tree types for the Jacy language.
//!
//! This crate defines the source locations, tokens, and AST nodes shared
//! between the lexer, parser, name resolver, and diagnostics renderer.

pub mod span;
pub mod source_map;
pub mod session;
pub mod token;
pub mod expr;
pub mod stmt;
pub mod item;
pub mod ty;
pub mod res;

pub use span::{FileId, LineMap, Span};
pub use source_map::{SourceFile, SourceMap};
pub use session::{ParseSess, Session};
pub use res::{DefKind, Res, ResSlot};

/// Unique identifier for AST nodes.
///
/// Declarations are referenced by id, never by pointer, so resolution
/// results can live in side tables keyed by `NodeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An identifier with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span }
    }
}

/// Abort on a broken compiler invariant.
///
/// These are programming errors (a resolution slot set twice, an error stub
/// reaching a later stage), never user-facing diagnostics.
#[macro_export]
macro_rules! bug {
    ($($arg:tt)*) => {
        panic!("internal compiler error: {}", format_args!($($arg)*))
    };
}
