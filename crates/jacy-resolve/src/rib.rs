// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexical ribs for name resolution.
//!
//! Every scope-introducing construct pushes a [`Rib`]. Lookups walk the
//! stack from the innermost rib down to the prelude.

use std::collections::HashMap;

use jacy_ast::{DefKind, Res, Span};

/// Names live in one of two namespaces, so `val Point = 1` and
/// `struct Point {}` do not clash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Value,
    Type,
}

/// The construct that introduced a rib.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RibKind {
    /// Builtin types and functions.
    Prelude,
    /// Top level of a file.
    Module,
    Block,
    Func,
    Lambda,
    Loop,
    /// Body of a type-like item, with the item's kind.
    Item(DefKind),
    WhenEntry,
    Catch,
}

/// A declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameBinding {
    pub res: Res,
    /// Declaration site; builtins have none.
    pub span: Option<Span>,
}

#[derive(Debug)]
pub struct Rib {
    pub kind: RibKind,
    names: HashMap<Namespace, HashMap<String, NameBinding>>,
}

impl Rib {
    pub fn new(kind: RibKind) -> Self {
        Self { kind, names: HashMap::new() }
    }

    /// Register `name`. An existing binding wins and is returned as the error.
    pub fn define(&mut self, ns: Namespace, name: &str, binding: NameBinding) -> Result<(), NameBinding> {
        let names = self.names.entry(ns).or_default();
        if let Some(previous) = names.get(name) {
            return Err(*previous);
        }
        names.insert(name.to_string(), binding);
        Ok(())
    }

    pub fn get(&self, ns: Namespace, name: &str) -> Option<&NameBinding> {
        self.names.get(&ns)?.get(name)
    }

    /// All bindings of a namespace, sorted by name.
    pub fn names(&self, ns: Namespace) -> Vec<(&str, &NameBinding)> {
        let mut names: Vec<_> = self
            .names
            .get(&ns)
            .into_iter()
            .flatten()
            .map(|(name, binding)| (name.as_str(), binding))
            .collect();
        names.sort_by(|a, b| a.0.cmp(b.0));
        names
    }
}

/// Builtin types of the prelude.
pub const PRIM_TYPES: &[&str] = &[
    "bool", "char", "str", "String", "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "int", "uint", "f32",
    "f64",
];

/// Builtin functions of the prelude.
pub const BUILTIN_FUNCS: &[&str] = &["print", "println"];

/// The rib stack. The prelude and the module rib are always present.
#[derive(Debug)]
pub struct Ribs {
    stack: Vec<Rib>,
}

impl Ribs {
    pub fn new() -> Self {
        let mut prelude = Rib::new(RibKind::Prelude);
        for &name in PRIM_TYPES {
            let _ = prelude.define(Namespace::Type, name, NameBinding { res: Res::PrimType(name), span: None });
        }
        for &name in BUILTIN_FUNCS {
            let _ = prelude.define(Namespace::Value, name, NameBinding { res: Res::Builtin(name), span: None });
        }
        Self { stack: vec![prelude, Rib::new(RibKind::Module)] }
    }

    pub fn enter(&mut self, kind: RibKind) {
        tracing::trace!(?kind, depth = self.stack.len(), "enter rib");
        self.stack.push(Rib::new(kind));
    }

    pub fn exit(&mut self) -> Rib {
        if self.stack.len() <= 2 {
            jacy_ast::bug!("tried to exit the {:?} rib", self.current().kind);
        }
        match self.stack.pop() {
            Some(rib) => {
                tracing::trace!(kind = ?rib.kind, depth = self.stack.len(), "exit rib");
                rib
            }
            None => jacy_ast::bug!("rib stack is empty"),
        }
    }

    pub fn current(&self) -> &Rib {
        match self.stack.last() {
            Some(rib) => rib,
            None => jacy_ast::bug!("rib stack is empty"),
        }
    }

    pub fn current_mut(&mut self) -> &mut Rib {
        match self.stack.last_mut() {
            Some(rib) => rib,
            None => jacy_ast::bug!("rib stack is empty"),
        }
    }

    /// Nearest binding of `name`, innermost rib first.
    pub fn lookup(&self, ns: Namespace, name: &str) -> Option<&NameBinding> {
        self.stack.iter().rev().find_map(|rib| rib.get(ns, name))
    }

    /// Lookup that skips everything between the module and the current rib.
    pub fn lookup_global(&self, ns: Namespace, name: &str) -> Option<&NameBinding> {
        self.stack[..2].iter().rev().find_map(|rib| rib.get(ns, name))
    }

    /// Innermost rib matching `pred`, not looking past a rib matching `stop`.
    pub fn find(&self, pred: impl Fn(RibKind) -> bool, stop: impl Fn(RibKind) -> bool) -> Option<RibKind> {
        for rib in self.stack.iter().rev() {
            if pred(rib.kind) {
                return Some(rib.kind);
            }
            if stop(rib.kind) {
                return None;
            }
        }
        None
    }

    /// Every visible name in the given namespaces, innermost rib first.
    pub fn visible_names(&self, namespaces: &[Namespace]) -> Vec<&str> {
        let mut names = Vec::new();
        for rib in self.stack.iter().rev() {
            for &ns in namespaces {
                names.extend(rib.names(ns).into_iter().map(|(name, _)| name));
            }
        }
        names
    }

    /// Consume the stack, keeping the module rib.
    pub fn into_module(mut self) -> Rib {
        if self.stack.len() != 2 {
            jacy_ast::bug!("unbalanced ribs: {} left open", self.stack.len() - 2);
        }
        match self.stack.pop() {
            Some(rib) => rib,
            None => jacy_ast::bug!("rib stack is empty"),
        }
    }
}

impl Default for Ribs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jacy_ast::{FileId, NodeId};

    fn local(id: u32, pos: u32) -> NameBinding {
        NameBinding { res: Res::Def(DefKind::Local, NodeId(id)), span: Some(Span::new(pos, 1, FileId(0))) }
    }

    #[test]
    fn inner_rib_shadows_outer() {
        let mut ribs = Ribs::new();
        ribs.current_mut().define(Namespace::Value, "x", local(1, 0)).unwrap();
        ribs.enter(RibKind::Block);
        ribs.current_mut().define(Namespace::Value, "x", local(2, 5)).unwrap();
        assert_eq!(ribs.lookup(Namespace::Value, "x"), Some(&local(2, 5)));
        ribs.exit();
        assert_eq!(ribs.lookup(Namespace::Value, "x"), Some(&local(1, 0)));
    }

    #[test]
    fn first_declaration_is_kept() {
        let mut rib = Rib::new(RibKind::Block);
        rib.define(Namespace::Value, "x", local(1, 0)).unwrap();
        assert_eq!(rib.define(Namespace::Value, "x", local(2, 4)), Err(local(1, 0)));
        assert_eq!(rib.get(Namespace::Value, "x"), Some(&local(1, 0)));
        assert!(rib.define(Namespace::Type, "x", local(3, 8)).is_ok());
    }

    #[test]
    fn prelude_names() {
        let ribs = Ribs::new();
        assert_eq!(ribs.lookup(Namespace::Type, "int").map(|b| b.res), Some(Res::PrimType("int")));
        assert_eq!(ribs.lookup(Namespace::Value, "println").map(|b| b.res), Some(Res::Builtin("println")));
        assert!(ribs.lookup(Namespace::Value, "int").is_none());
        assert!(ribs.lookup(Namespace::Type, "Self").is_none());
    }

    #[test]
    fn find_stops_at_boundary() {
        let mut ribs = Ribs::new();
        ribs.enter(RibKind::Loop);
        ribs.enter(RibKind::Lambda);
        ribs.enter(RibKind::Block);
        let is_loop = |k: RibKind| k == RibKind::Loop;
        assert_eq!(ribs.find(is_loop, |k| k == RibKind::Lambda), None);
        assert_eq!(ribs.find(is_loop, |_| false), Some(RibKind::Loop));
    }

    #[test]
    #[should_panic(expected = "internal compiler error")]
    fn exiting_module_rib_is_a_bug() {
        let mut ribs = Ribs::new();
        ribs.exit();
    }
}
