// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression AST nodes.

use crate::res::ResSlot;
use crate::stmt::Stmt;
use crate::ty::Type;
use crate::{Ident, NodeId, Span};

/// An expression in the AST.
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

/// The kind of expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// `target = value` or a compound form like `target += value`
    Assign {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
    },
    /// Single identifier
    Id { ident: Ident, res: ResSlot },
    /// Multi-segment path `a::b`, or a global path `::a`
    Path(PathExpr),
    /// Literal value
    Literal(Literal),
    /// Binary operation
    Infix {
        left: Box<Expr>,
        op: InfixOp,
        right: Box<Expr>,
    },
    /// Prefix operation
    Prefix { op: PrefixOp, operand: Box<Expr> },
    /// Postfix operation
    Postfix { op: PostfixOp, operand: Box<Expr> },
    /// Call `callee(args)`
    Invoke {
        callee: Box<Expr>,
        args: Vec<NamedElement>,
    },
    /// Subscript `target[i, j]`
    Subscript {
        target: Box<Expr>,
        indices: Vec<Expr>,
    },
    /// Member access `target.field` or `target?.field`
    MemberAccess {
        target: Box<Expr>,
        field: Ident,
        safe: bool,
    },
    /// List literal `[a, b]`
    List(Vec<Expr>),
    /// Tuple `(a, b)`, elements may be named
    Tuple(Vec<NamedElement>),
    /// `()`
    Unit,
    /// Struct construction `Point { x: 1, y, ...base }`
    Struct {
        path: PathExpr,
        fields: Vec<StructField>,
    },
    /// Block `{ ... }`
    Block(Block),
    /// `if` with optional `elif`/`else`; `elif` is nested as an `If` else branch
    If {
        cond: Box<Expr>,
        then_block: Block,
        else_branch: Option<Box<Expr>>,
    },
    /// `loop { ... }`
    Loop(Block),
    /// `when subject { a, b => ..., else => ... }`
    When {
        subject: Box<Expr>,
        entries: Vec<WhenEntry>,
    },
    /// Lambda `|a, b: T| -> R body`
    Lambda {
        params: Vec<LambdaParam>,
        ret: Option<Box<Type>>,
        body: Box<Expr>,
    },
    Break(Option<Box<Expr>>),
    Continue,
    Return(Option<Box<Expr>>),
    Throw(Box<Expr>),
    /// `try { ... } catch e { ... }`
    TryCatch { body: Block, catch: CatchClause },
    /// Parenthesized expression, kept for diagnostics
    Paren(Box<Expr>),
    /// Spread `...expr`
    Spread(Box<Expr>),
    /// Cast `expr as T` or `expr as? T`
    Cast {
        expr: Box<Expr>,
        ty: Box<Type>,
        safe: bool,
    },
    This,
    Super,
    /// Placeholder for an expression that failed to parse
    Error,
}

/// A path such as `a::b::<T>::c`.
#[derive(Debug, Clone)]
pub struct PathExpr {
    pub global: bool,
    pub segments: Vec<PathSeg>,
    pub span: Span,
    pub res: ResSlot,
}

impl PathExpr {
    /// The segment resolved by name lookup.
    pub fn first(&self) -> &PathSeg {
        match self.segments.first() {
            Some(seg) => seg,
            None => crate::bug!("path without segments at {:?}", self.span),
        }
    }

    pub fn is_simple(&self) -> bool {
        !self.global && self.segments.len() == 1 && self.segments[0].generics.is_empty()
    }
}

impl std::fmt::Display for PathExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.global {
            f.write_str("::")?;
        }
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("::")?;
            }
            f.write_str(&seg.ident.name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PathSeg {
    pub ident: Ident,
    pub generics: Vec<Type>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Dec,
    Bin,
    Oct,
    Hex,
    Float,
    SQString,
    DQString,
    Bool,
}

/// A literal with its lexeme (`0xFF`, `1.5`, the unquoted string body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LitKind,
    pub value: String,
}

/// Binary operators, including custom infix identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfixOp {
    Pipe,
    Or,
    And,
    BitOr,
    Xor,
    BitAnd,
    Eq,
    NotEq,
    RefEq,
    RefNotEq,
    Lt,
    Gt,
    Le,
    Ge,
    Spaceship,
    Is,
    NotIs,
    In,
    NotIn,
    NullCoalesce,
    Shl,
    Shr,
    /// `a max b`
    Custom(Ident),
    Range,
    RangeRE,
    RangeInc,
    RangeLE,
    RangeBothE,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Power,
}

impl std::fmt::Display for InfixOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InfixOp::Pipe => "|>",
            InfixOp::Or => "||",
            InfixOp::And => "&&",
            InfixOp::BitOr => "|",
            InfixOp::Xor => "^",
            InfixOp::BitAnd => "&",
            InfixOp::Eq => "==",
            InfixOp::NotEq => "!=",
            InfixOp::RefEq => "===",
            InfixOp::RefNotEq => "!==",
            InfixOp::Lt => "<",
            InfixOp::Gt => ">",
            InfixOp::Le => "<=",
            InfixOp::Ge => ">=",
            InfixOp::Spaceship => "<=>",
            InfixOp::Is => "is",
            InfixOp::NotIs => "!is",
            InfixOp::In => "in",
            InfixOp::NotIn => "!in",
            InfixOp::NullCoalesce => "??",
            InfixOp::Shl => "<<",
            InfixOp::Shr => ">>",
            InfixOp::Custom(ident) => return f.write_str(&ident.name),
            InfixOp::Range => "..",
            InfixOp::RangeRE => "..<",
            InfixOp::RangeInc => "..=",
            InfixOp::RangeLE => ">..",
            InfixOp::RangeBothE => ">.<",
            InfixOp::Add => "+",
            InfixOp::Sub => "-",
            InfixOp::Mul => "*",
            InfixOp::Div => "/",
            InfixOp::Mod => "%",
            InfixOp::Power => "**",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Power,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    Xor,
    Nullish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `~x`
    Inv,
    /// `&x`
    Borrow,
    /// `&mut x`
    BorrowMut,
    /// `*x`
    Deref,
    /// `++x`
    Inc,
    /// `--x`
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    Inc,
    Dec,
    /// `x?`
    Quest,
}

/// Element of a call argument list or tuple, optionally named: `name: value`.
#[derive(Debug, Clone)]
pub struct NamedElement {
    pub name: Option<Ident>,
    pub value: Expr,
    pub span: Span,
}

/// Field in a struct construction.
#[derive(Debug, Clone)]
pub enum StructField {
    /// `name: value`
    Raw { name: Ident, value: Expr },
    /// `name`, same as `name: name`; holds the `Id` expression
    Shortcut(Expr),
    /// `...base`
    Base(Expr),
}

/// A `{ ... }` block.
#[derive(Debug, Clone)]
pub struct Block {
    pub id: NodeId,
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// One `cond, cond => body` entry of a `when`. Empty `conditions` means `else`.
#[derive(Debug, Clone)]
pub struct WhenEntry {
    pub id: NodeId,
    pub conditions: Vec<Expr>,
    pub body: Box<Expr>,
    pub span: Span,
}

impl WhenEntry {
    pub fn is_else(&self) -> bool {
        self.conditions.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct LambdaParam {
    pub id: NodeId,
    pub name: Ident,
    pub ty: Option<Type>,
}

/// `catch name { ... }`
#[derive(Debug, Clone)]
pub struct CatchClause {
    pub id: NodeId,
    pub binding: Ident,
    pub body: Block,
}
