// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The name resolver implementation.

use std::collections::HashMap;

use jacy_ast::expr::{Block, Expr, ExprKind, PathExpr, StructField};
use jacy_ast::item::{EnumEntryKind, Func, FuncBody, Item, ItemKind, Param, TypeParam, TypeParamKind};
use jacy_ast::stmt::{Stmt, StmtKind};
use jacy_ast::ty::{Type, TypeKind};
use jacy_ast::{DefKind, Ident, NodeId, Res, ResSlot, Span};
use jacy_diagnostics::suggestions::did_you_mean;
use jacy_diagnostics::{Suggestion, ToSuggestion};
use tracing::debug;

use crate::error::ResolveError;
use crate::rib::{NameBinding, Namespace, Rib, RibKind, Ribs};

/// Output of resolving one module.
#[derive(Debug)]
pub struct ResolveResult {
    /// Names declared at the top level of the module.
    pub root_rib: Rib,
    /// Referencing node (identifier expression, path or path type) to target.
    pub resolutions: HashMap<NodeId, Res>,
    pub suggestions: Vec<Suggestion>,
}

pub struct NameResolver {
    ribs: Ribs,
    resolutions: HashMap<NodeId, Res>,
    errors: Vec<ResolveError>,
}

impl NameResolver {
    pub fn new() -> Self {
        Self { ribs: Ribs::new(), resolutions: HashMap::new(), errors: Vec::new() }
    }

    /// Resolve a parsed module. The input must be free of error stubs.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn resolve(mut self, stmts: &[Stmt]) -> ResolveResult {
        self.resolve_stmts(stmts);
        debug!(resolved = self.resolutions.len(), errors = self.errors.len(), "resolved");
        ResolveResult {
            root_rib: self.ribs.into_module(),
            resolutions: self.resolutions,
            suggestions: self.errors.iter().map(ToSuggestion::to_suggestion).collect(),
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn define(&mut self, ns: Namespace, ident: &Ident, kind: DefKind, id: NodeId) {
        let binding = NameBinding { res: Res::Def(kind, id), span: Some(ident.span) };
        if let Err(previous) = self.ribs.current_mut().define(ns, &ident.name, binding) {
            self.errors.push(ResolveError::redeclared(ident.name.clone(), ident.span, previous.span));
        }
    }

    /// Forward-declare the items of a statement list in the current rib.
    fn declare_items(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            if let StmtKind::Item(item) = &stmt.kind {
                self.declare_item(item);
            }
        }
    }

    fn declare_item(&mut self, item: &Item) {
        let (ns, kind) = match &item.kind {
            ItemKind::Func(_) => (Namespace::Value, DefKind::Func),
            ItemKind::Class(class) if class.is_struct => (Namespace::Type, DefKind::Struct),
            ItemKind::Class(_) => (Namespace::Type, DefKind::Class),
            ItemKind::Enum(_) => (Namespace::Type, DefKind::Enum),
            ItemKind::Trait(_) => (Namespace::Type, DefKind::Trait),
            ItemKind::TypeAlias(_) => (Namespace::Type, DefKind::TypeAlias),
            ItemKind::Object(_) => (Namespace::Type, DefKind::Object),
            ItemKind::Field(_) => (Namespace::Value, DefKind::Field),
            ItemKind::Init(_) => return,
        };
        if let Some(name) = item.name() {
            self.define(ns, name, kind, item.id);
        }
    }

    fn declare_generics(&mut self, generics: &[TypeParam]) {
        for param in generics {
            match &param.kind {
                TypeParamKind::Type { bound } => {
                    if let Some(bound) = bound {
                        self.resolve_type(bound);
                    }
                    self.define(Namespace::Type, &param.name, DefKind::TypeParam, param.id);
                }
                TypeParamKind::Const { ty, default } => {
                    self.resolve_type(ty);
                    if let Some(default) = default {
                        self.resolve_expr(default);
                    }
                    self.define(Namespace::Value, &param.name, DefKind::ConstParam, param.id);
                }
                // No type or expression form refers to a lifetime.
                TypeParamKind::Lifetime => {}
            }
        }
    }

    fn declare_params(&mut self, params: &[Param]) {
        for param in params {
            self.resolve_type(&param.ty);
            if let Some(default) = &param.default {
                self.resolve_expr(default);
            }
            self.define(Namespace::Value, &param.name, DefKind::Param, param.id);
        }
    }

    // =========================================================================
    // Statement Resolution
    // =========================================================================

    fn resolve_stmts(&mut self, stmts: &[Stmt]) {
        self.declare_items(stmts);
        for stmt in stmts {
            self.resolve_stmt(stmt);
        }
    }

    fn resolve_block(&mut self, block: &Block, kind: RibKind) {
        self.ribs.enter(kind);
        self.resolve_stmts(&block.stmts);
        self.ribs.exit();
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expr(expr) => self.resolve_expr(expr),
            StmtKind::VarDecl(decl) => {
                if let Some(ty) = &decl.ty {
                    self.resolve_type(ty);
                }
                if let Some(init) = &decl.init {
                    self.resolve_expr(init);
                }
                self.define(Namespace::Value, &decl.name, DefKind::Local, stmt.id);
            }
            StmtKind::For { binding, iter, body } => {
                self.resolve_expr(iter);
                self.ribs.enter(RibKind::Loop);
                self.define(Namespace::Value, binding, DefKind::Local, stmt.id);
                self.resolve_block(body, RibKind::Block);
                self.ribs.exit();
            }
            StmtKind::While { cond, body } => {
                self.resolve_expr(cond);
                self.resolve_block(body, RibKind::Loop);
            }
            StmtKind::Item(item) => self.resolve_item(item),
            StmtKind::Error => jacy_ast::bug!("error statement reached name resolution at {:?}", stmt.span),
        }
    }

    // =========================================================================
    // Item Resolution
    // =========================================================================

    fn resolve_item(&mut self, item: &Item) {
        match &item.kind {
            ItemKind::Func(func) => self.resolve_func(func),
            ItemKind::Class(class) => {
                let kind = if class.is_struct { DefKind::Struct } else { DefKind::Class };
                self.ribs.enter(RibKind::Item(kind));
                self.declare_generics(&class.generics);
                self.resolve_types(&class.supers);
                self.resolve_members(&class.members);
                self.ribs.exit();
            }
            ItemKind::Enum(enum_item) => {
                self.ribs.enter(RibKind::Item(DefKind::Enum));
                self.declare_generics(&enum_item.generics);
                for entry in &enum_item.entries {
                    match &entry.kind {
                        EnumEntryKind::Raw => {}
                        EnumEntryKind::Discriminant(expr) => self.resolve_expr(expr),
                        EnumEntryKind::Tuple(types) => self.resolve_types(types),
                        EnumEntryKind::Struct(fields) => {
                            for (_, ty) in fields {
                                self.resolve_type(ty);
                            }
                        }
                    }
                }
                self.resolve_members(&enum_item.members);
                self.ribs.exit();
            }
            ItemKind::Trait(trait_item) => {
                self.ribs.enter(RibKind::Item(DefKind::Trait));
                self.declare_generics(&trait_item.generics);
                self.resolve_types(&trait_item.supers);
                self.resolve_members(&trait_item.members);
                self.ribs.exit();
            }
            ItemKind::TypeAlias(alias) => {
                self.ribs.enter(RibKind::Item(DefKind::TypeAlias));
                self.declare_generics(&alias.generics);
                self.resolve_type(&alias.ty);
                self.ribs.exit();
            }
            ItemKind::Object(object) => {
                self.ribs.enter(RibKind::Item(DefKind::Object));
                self.resolve_types(&object.supers);
                self.resolve_members(&object.members);
                self.ribs.exit();
            }
            ItemKind::Field(field) => {
                self.resolve_type(&field.ty);
                if let Some(default) = &field.default {
                    self.resolve_expr(default);
                }
            }
            ItemKind::Init(init) => {
                self.ribs.enter(RibKind::Func);
                self.declare_params(&init.params);
                self.resolve_block(&init.body, RibKind::Block);
                self.ribs.exit();
            }
        }
    }

    fn resolve_members(&mut self, members: &[Item]) {
        for member in members {
            self.declare_item(member);
        }
        for member in members {
            self.resolve_item(member);
        }
    }

    fn resolve_func(&mut self, func: &Func) {
        self.ribs.enter(RibKind::Func);
        self.declare_generics(&func.generics);
        self.declare_params(&func.params);
        if let Some(ret) = &func.ret {
            self.resolve_type(ret);
        }
        match &func.body {
            Some(FuncBody::Block(block)) => self.resolve_block(block, RibKind::Block),
            Some(FuncBody::Expr(expr)) => self.resolve_expr(expr),
            None => {}
        }
        self.ribs.exit();
    }

    // =========================================================================
    // Expression Resolution
    // =========================================================================

    fn resolve_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Id { ident, res } => self.resolve_value(expr.id, ident, res),
            ExprKind::Path(path) => self.resolve_value_path(expr.id, path),
            ExprKind::Literal(_) | ExprKind::Unit => {}
            ExprKind::Assign { target, value, .. } => {
                self.resolve_expr(target);
                self.resolve_expr(value);
            }
            ExprKind::Infix { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            ExprKind::Prefix { operand, .. } | ExprKind::Postfix { operand, .. } => self.resolve_expr(operand),
            ExprKind::Invoke { callee, args } => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(&arg.value);
                }
            }
            ExprKind::Subscript { target, indices } => {
                self.resolve_expr(target);
                self.resolve_exprs(indices);
            }
            // Fields are resolved once types are known.
            ExprKind::MemberAccess { target, .. } => self.resolve_expr(target),
            ExprKind::List(items) => self.resolve_exprs(items),
            ExprKind::Tuple(elements) => {
                for element in elements {
                    self.resolve_expr(&element.value);
                }
            }
            ExprKind::Struct { path, fields } => {
                self.resolve_type_path(expr.id, path);
                for field in fields {
                    match field {
                        StructField::Raw { value, .. } => self.resolve_expr(value),
                        StructField::Shortcut(value) | StructField::Base(value) => self.resolve_expr(value),
                    }
                }
            }
            ExprKind::Block(block) => self.resolve_block(block, RibKind::Block),
            ExprKind::If { cond, then_block, else_branch } => {
                self.resolve_expr(cond);
                self.resolve_block(then_block, RibKind::Block);
                if let Some(else_branch) = else_branch {
                    self.resolve_expr(else_branch);
                }
            }
            ExprKind::Loop(body) => self.resolve_block(body, RibKind::Loop),
            ExprKind::When { subject, entries } => {
                self.resolve_expr(subject);
                for entry in entries {
                    self.ribs.enter(RibKind::WhenEntry);
                    self.resolve_exprs(&entry.conditions);
                    self.resolve_expr(&entry.body);
                    self.ribs.exit();
                }
            }
            ExprKind::Lambda { params, ret, body } => {
                self.ribs.enter(RibKind::Lambda);
                for param in params {
                    if let Some(ty) = &param.ty {
                        self.resolve_type(ty);
                    }
                    self.define(Namespace::Value, &param.name, DefKind::Param, param.id);
                }
                if let Some(ret) = ret {
                    self.resolve_type(ret);
                }
                self.resolve_expr(body);
                self.ribs.exit();
            }
            ExprKind::Break(value) => {
                self.check_in_loop("break", expr.span);
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
            ExprKind::Continue => self.check_in_loop("continue", expr.span),
            ExprKind::Return(value) => {
                if self.ribs.find(|k| matches!(k, RibKind::Func | RibKind::Lambda), |_| false).is_none() {
                    self.errors.push(ResolveError::outside_function(expr.span));
                }
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
            ExprKind::Throw(value) | ExprKind::Paren(value) | ExprKind::Spread(value) => self.resolve_expr(value),
            ExprKind::TryCatch { body, catch } => {
                self.resolve_block(body, RibKind::Block);
                self.ribs.enter(RibKind::Catch);
                self.define(Namespace::Value, &catch.binding, DefKind::Local, catch.id);
                self.resolve_block(&catch.body, RibKind::Block);
                self.ribs.exit();
            }
            ExprKind::Cast { expr: inner, ty, .. } => {
                self.resolve_expr(inner);
                self.resolve_type(ty);
            }
            ExprKind::This => self.check_in_type("this", expr.span),
            ExprKind::Super => self.check_in_type("super", expr.span),
            ExprKind::Error => jacy_ast::bug!("error expression reached name resolution at {:?}", expr.span),
        }
    }

    fn resolve_exprs(&mut self, exprs: &[Expr]) {
        for expr in exprs {
            self.resolve_expr(expr);
        }
    }

    fn check_in_loop(&mut self, keyword: &'static str, span: Span) {
        let found = self.ribs.find(|k: RibKind| k == RibKind::Loop, |k| matches!(k, RibKind::Func | RibKind::Lambda));
        if found.is_none() {
            self.errors.push(ResolveError::outside_loop(keyword, span));
        }
    }

    fn check_in_type(&mut self, keyword: &'static str, span: Span) {
        let is_type =
            |k: RibKind| matches!(k, RibKind::Item(DefKind::Class | DefKind::Struct | DefKind::Trait | DefKind::Object));
        if self.ribs.find(is_type, |_| false).is_none() {
            self.errors.push(ResolveError::outside_type(keyword, span));
        }
    }

    // =========================================================================
    // Name Lookup
    // =========================================================================

    fn record(&mut self, id: NodeId, slot: &ResSlot, res: Res) {
        slot.set(res);
        self.resolutions.insert(id, res);
    }

    /// Value namespace first, then types for constructors and static access.
    fn lookup_value(&self, name: &str, global: bool) -> Option<Res> {
        let lookup = |ns| {
            if global {
                self.ribs.lookup_global(ns, name)
            } else {
                self.ribs.lookup(ns, name)
            }
        };
        lookup(Namespace::Value).or_else(|| lookup(Namespace::Type)).map(|b| b.res)
    }

    fn resolve_value(&mut self, id: NodeId, ident: &Ident, slot: &ResSlot) {
        match self.lookup_value(&ident.name, false) {
            Some(res) => self.record(id, slot, res),
            None => self.unresolved_value(ident),
        }
    }

    fn unresolved_value(&mut self, ident: &Ident) {
        let similar = did_you_mean(&ident.name, self.ribs.visible_names(&[Namespace::Value, Namespace::Type]));
        self.errors.push(ResolveError::unresolved_value(ident.name.clone(), ident.span, similar));
    }

    /// Only the first segment is resolved; the rest needs type information.
    fn resolve_value_path(&mut self, id: NodeId, path: &PathExpr) {
        self.resolve_path_generics(path);
        let first = &path.first().ident;
        match self.lookup_value(&first.name, path.global) {
            Some(res) => self.record(id, &path.res, res),
            None => self.unresolved_value(first),
        }
    }

    fn resolve_type_path(&mut self, id: NodeId, path: &PathExpr) {
        self.resolve_path_generics(path);
        let first = &path.first().ident;
        let found = if path.global {
            self.ribs.lookup_global(Namespace::Type, &first.name)
        } else {
            self.ribs.lookup(Namespace::Type, &first.name)
        };
        match found.map(|b| b.res) {
            Some(res) => self.record(id, &path.res, res),
            None => {
                let similar = did_you_mean(&first.name, self.ribs.visible_names(&[Namespace::Type]));
                self.errors.push(ResolveError::unresolved_type(first.name.clone(), first.span, similar));
            }
        }
    }

    fn resolve_path_generics(&mut self, path: &PathExpr) {
        for seg in &path.segments {
            self.resolve_types(&seg.generics);
        }
    }

    // =========================================================================
    // Type Resolution
    // =========================================================================

    fn resolve_type(&mut self, ty: &Type) {
        match &ty.kind {
            TypeKind::Path(path) => self.resolve_type_path(ty.id, path),
            TypeKind::Tuple(elements) => self.resolve_types(elements),
            TypeKind::Func { params, ret } => {
                self.resolve_types(params);
                self.resolve_type(ret);
            }
            TypeKind::Array { elem, size } => {
                self.resolve_type(elem);
                self.resolve_expr(size);
            }
            TypeKind::Slice(inner) | TypeKind::Paren(inner) => self.resolve_type(inner),
            TypeKind::Unit => {}
            TypeKind::Error => jacy_ast::bug!("error type reached name resolution at {:?}", ty.span),
        }
    }

    fn resolve_types(&mut self, types: &[Type]) {
        for ty in types {
            self.resolve_type(ty);
        }
    }
}

impl Default for NameResolver {
    fn default() -> Self {
        Self::new()
    }
}
