// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Statement AST nodes.

use crate::expr::{Block, Expr};
use crate::item::Item;
use crate::ty::Type;
use crate::{Ident, NodeId, Span};

/// A statement in the AST.
#[derive(Debug, Clone)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

/// The kind of statement.
#[derive(Debug, Clone)]
pub enum StmtKind {
    /// Expression statement
    Expr(Expr),
    /// `var x: T = init` / `val x = init`
    VarDecl(VarDecl),
    /// `for x in iter { ... }`
    For {
        binding: Ident,
        iter: Expr,
        body: Block,
    },
    /// `while cond { ... }`
    While { cond: Expr, body: Block },
    /// Nested declaration
    Item(Item),
    /// Placeholder for a statement that failed to parse
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Val,
}

/// Variable declaration. Its declaring node is the enclosing statement.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub kind: VarKind,
    pub name: Ident,
    pub ty: Option<Type>,
    pub init: Option<Expr>,
}
