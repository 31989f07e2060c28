// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Resolution results attached to referencing AST nodes.

use std::cell::OnceCell;
use std::fmt;

use crate::NodeId;

/// What kind of declaration a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DefKind {
    Local,
    Param,
    Func,
    Class,
    Struct,
    Enum,
    Trait,
    TypeAlias,
    Object,
    Field,
    TypeParam,
    ConstParam,
}

impl DefKind {
    pub fn descr(self) -> &'static str {
        match self {
            DefKind::Local => "local variable",
            DefKind::Param => "parameter",
            DefKind::Func => "function",
            DefKind::Class => "class",
            DefKind::Struct => "struct",
            DefKind::Enum => "enum",
            DefKind::Trait => "trait",
            DefKind::TypeAlias => "type alias",
            DefKind::Object => "object",
            DefKind::Field => "field",
            DefKind::TypeParam => "type parameter",
            DefKind::ConstParam => "const parameter",
        }
    }
}

/// The target of a resolved name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Res {
    /// A declaration in the program, by the id of its declaring node.
    Def(DefKind, NodeId),
    /// A primitive type from the prelude.
    PrimType(&'static str),
    /// A builtin function from the prelude.
    Builtin(&'static str),
}

impl fmt::Display for Res {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Res::Def(kind, id) => write!(f, "{} {}", kind.descr(), id),
            Res::PrimType(name) => write!(f, "primitive type `{}`", name),
            Res::Builtin(name) => write!(f, "builtin `{}`", name),
        }
    }
}

/// Write-once resolution slot owned by a path-like node.
///
/// The resolver fills it exactly once; a second write is a compiler bug.
#[derive(Debug, Clone, Default)]
pub struct ResSlot(OnceCell<Res>);

impl ResSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Res> {
        self.0.get().copied()
    }

    pub fn set(&self, res: Res) {
        if let Err(res) = self.0.set(res) {
            crate::bug!(
                "resolution already set to {:?}, refusing to overwrite with {:?}",
                self.0.get(),
                res
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_starts_empty_and_keeps_value() {
        let slot = ResSlot::new();
        assert_eq!(slot.get(), None);
        slot.set(Res::Def(DefKind::Local, NodeId(3)));
        assert_eq!(slot.get(), Some(Res::Def(DefKind::Local, NodeId(3))));
    }

    #[test]
    #[should_panic(expected = "resolution already set")]
    fn slot_rejects_second_write() {
        let slot = ResSlot::new();
        slot.set(Res::Builtin("print"));
        slot.set(Res::Builtin("println"));
    }
}
