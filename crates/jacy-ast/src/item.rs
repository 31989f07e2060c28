// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Declaration (item) AST nodes.

use crate::expr::{Block, Expr, NamedElement};
use crate::stmt::VarKind;
use crate::ty::Type;
use crate::{Ident, NodeId, Span};

/// A declaration: function, class, enum, and so on.
#[derive(Debug, Clone)]
pub struct Item {
    pub id: NodeId,
    pub attrs: Vec<Attr>,
    pub modifiers: Vec<Modifier>,
    pub kind: ItemKind,
    pub span: Span,
}

impl Item {
    /// Name the item declares, if any (`init` has none).
    pub fn name(&self) -> Option<&Ident> {
        match &self.kind {
            ItemKind::Func(f) => Some(&f.name),
            ItemKind::Class(c) => Some(&c.name),
            ItemKind::Enum(e) => Some(&e.name),
            ItemKind::Trait(t) => Some(&t.name),
            ItemKind::TypeAlias(t) => Some(&t.name),
            ItemKind::Object(o) => Some(&o.name),
            ItemKind::Field(f) => Some(&f.name),
            ItemKind::Init(_) => None,
        }
    }
}

/// The kind of declaration.
#[derive(Debug, Clone)]
pub enum ItemKind {
    Func(Func),
    /// `class` or `struct`
    Class(Class),
    Enum(Enum),
    Trait(Trait),
    /// `type Name = T`
    TypeAlias(TypeAlias),
    /// Singleton `object Name { ... }`
    Object(Object),
    /// Member field of a class, struct, trait, or object
    Field(Field),
    /// Constructor `init(...) { ... }`
    Init(Init),
}

/// `@name(args)`
#[derive(Debug, Clone)]
pub struct Attr {
    pub name: Ident,
    pub args: Vec<NamedElement>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Pub,
    Pri,
    Static,
    Mut,
    Move,
    Const,
    /// Marks a function usable as a custom infix operator
    Infix,
}

#[derive(Debug, Clone)]
pub struct Func {
    pub name: Ident,
    pub generics: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub ret: Option<Type>,
    /// `None` for a signature without body (trait members).
    pub body: Option<FuncBody>,
}

#[derive(Debug, Clone)]
pub enum FuncBody {
    /// `{ ... }`
    Block(Block),
    /// `=> expr`
    Expr(Box<Expr>),
}

/// Function parameter `name: T = default`.
#[derive(Debug, Clone)]
pub struct Param {
    pub id: NodeId,
    pub name: Ident,
    pub ty: Type,
    pub default: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Class {
    pub name: Ident,
    pub is_struct: bool,
    pub generics: Vec<TypeParam>,
    pub supers: Vec<Type>,
    pub members: Vec<Item>,
}

#[derive(Debug, Clone)]
pub struct Enum {
    pub name: Ident,
    pub generics: Vec<TypeParam>,
    pub entries: Vec<EnumEntry>,
    /// Members after the entry list, separated by `;`
    pub members: Vec<Item>,
}

#[derive(Debug, Clone)]
pub struct EnumEntry {
    pub id: NodeId,
    pub name: Ident,
    pub kind: EnumEntryKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum EnumEntryKind {
    /// `Red`
    Raw,
    /// `Red = 1`
    Discriminant(Expr),
    /// `Rgb(u8, u8, u8)`
    Tuple(Vec<Type>),
    /// `Point { x: int, y: int }`
    Struct(Vec<(Ident, Type)>),
}

#[derive(Debug, Clone)]
pub struct Trait {
    pub name: Ident,
    pub generics: Vec<TypeParam>,
    pub supers: Vec<Type>,
    pub members: Vec<Item>,
}

#[derive(Debug, Clone)]
pub struct TypeAlias {
    pub name: Ident,
    pub generics: Vec<TypeParam>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct Object {
    pub name: Ident,
    pub supers: Vec<Type>,
    pub members: Vec<Item>,
}

#[derive(Debug, Clone)]
pub struct Field {
    pub kind: Option<VarKind>,
    pub name: Ident,
    pub ty: Type,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct Init {
    pub params: Vec<Param>,
    pub body: Block,
}

/// Generic parameter in `<...>`.
#[derive(Debug, Clone)]
pub struct TypeParam {
    pub id: NodeId,
    pub name: Ident,
    pub kind: TypeParamKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeParamKind {
    /// `T` or `T: Bound`
    Type { bound: Option<Type> },
    /// `'a`
    Lifetime,
    /// `const N: usize = 4`
    Const { ty: Type, default: Option<Expr> },
}
