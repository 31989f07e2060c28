// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Type expression AST nodes.

use crate::expr::{Expr, PathExpr};
use crate::{NodeId, Span};

/// A type as written in source.
#[derive(Debug, Clone)]
pub struct Type {
    pub id: NodeId,
    pub kind: TypeKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    /// `Vec<int>`, `a::B`
    Path(PathExpr),
    /// `(A, B)`
    Tuple(Vec<Type>),
    /// `(A, B) -> R`
    Func { params: Vec<Type>, ret: Box<Type> },
    /// `[T; size]`
    Array { elem: Box<Type>, size: Box<Expr> },
    /// `[T]`
    Slice(Box<Type>),
    /// `(T)`
    Paren(Box<Type>),
    /// `()`
    Unit,
    /// Placeholder for a type that failed to parse
    Error,
}
