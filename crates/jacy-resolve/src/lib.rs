// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Name resolution for the Jacy language.
//!
//! Walks a parsed module with a stack of ribs, binding every identifier and
//! path to the declaration it names. Member access stays unresolved until
//! types are known.

mod error;
mod resolver;
mod rib;

pub use error::{ResolveError, ResolveErrorKind};
pub use resolver::{NameResolver, ResolveResult};
pub use rib::{NameBinding, Namespace, Rib, RibKind, Ribs, BUILTIN_FUNCS, PRIM_TYPES};

use jacy_ast::stmt::Stmt;

/// Resolve all names in one module.
pub fn resolve(stmts: &[Stmt]) -> ResolveResult {
    NameResolver::new().resolve(stmts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jacy_ast::expr::{Expr, ExprKind};
    use jacy_ast::item::FuncBody;
    use jacy_ast::stmt::StmtKind;
    use jacy_ast::{DefKind, FileId, ParseSess, Res, Span};
    use jacy_diagnostics::Suggestion;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> Vec<Stmt> {
        let sess = ParseSess::new(FileId(0));
        let lexed = jacy_lexer::lex(&sess, src).expect("lexing failed");
        let output = jacy_parser::Parser::new(&sess, lexed.tokens).parse().expect("parsing aborted");
        assert!(output.suggestions.is_empty(), "Parse suggestions: {:?}", output.suggestions);
        output.stmts
    }

    fn resolve_src(src: &str) -> (Vec<Stmt>, ResolveResult) {
        let stmts = parse(src);
        let result = resolve(&stmts);
        (stmts, result)
    }

    fn messages(result: &ResolveResult) -> Vec<&str> {
        result.suggestions.iter().map(|s| s.message()).collect()
    }

    fn expr_of(stmt: &Stmt) -> &Expr {
        match &stmt.kind {
            StmtKind::Expr(expr) => expr,
            StmtKind::VarDecl(decl) => decl.init.as_ref().expect("declaration without initializer"),
            other => panic!("Expected expression, got {:?}", other),
        }
    }

    fn id_res(expr: &Expr) -> Option<Res> {
        match &expr.kind {
            ExprKind::Id { res, .. } => res.get(),
            ExprKind::Path(path) => path.res.get(),
            ExprKind::Invoke { callee, .. } => id_res(callee),
            other => panic!("Expected name, got {:?}", other),
        }
    }

    #[test]
    fn declares_val_in_root_rib() {
        let (stmts, result) = resolve_src("val x = 1 + 2");
        assert!(result.suggestions.is_empty());
        assert_eq!(result.root_rib.kind, RibKind::Module);
        let binding = result.root_rib.get(Namespace::Value, "x").expect("x not declared");
        assert_eq!(binding.res, Res::Def(DefKind::Local, stmts[0].id));
        assert!(result.root_rib.get(Namespace::Type, "x").is_none());
    }

    #[test]
    fn inner_declaration_shadows_outer() {
        let (stmts, result) = resolve_src("var x = 1\n{\n    var x = 2\n    x\n}\nx");
        assert!(result.suggestions.is_empty(), "{:?}", result.suggestions);

        let ExprKind::Block(block) = &expr_of(&stmts[1]).kind else {
            panic!("Expected block");
        };
        let inner_use = expr_of(&block.stmts[1]);
        assert_eq!(id_res(inner_use), Some(Res::Def(DefKind::Local, block.stmts[0].id)));

        let outer_use = expr_of(&stmts[2]);
        assert_eq!(id_res(outer_use), Some(Res::Def(DefKind::Local, stmts[0].id)));
        assert_eq!(result.resolutions.get(&outer_use.id), Some(&Res::Def(DefKind::Local, stmts[0].id)));
        assert_eq!(result.resolutions.len(), 2);
    }

    #[test]
    fn initializer_sees_outer_binding() {
        let (stmts, result) = resolve_src("val x = 1\n{\n    val x = x\n}");
        assert!(result.suggestions.is_empty());
        let ExprKind::Block(block) = &expr_of(&stmts[1]).kind else {
            panic!("Expected block");
        };
        assert_eq!(id_res(expr_of(&block.stmts[0])), Some(Res::Def(DefKind::Local, stmts[0].id)));
    }

    #[test]
    fn unresolved_value_with_suggestion() {
        let (_, result) = resolve_src("val count = 1\ncout");
        assert_eq!(messages(&result), vec!["Cannot find `cout` in this scope"]);
        assert_eq!(result.suggestions[0].help(), Some("did you mean `count`?"));
        assert_eq!(result.suggestions[0].span(), Span::new(14, 4, FileId(0)));
    }

    #[test]
    fn unresolved_without_close_match() {
        let (_, result) = resolve_src("val a = bogus");
        assert_eq!(messages(&result), vec!["Cannot find `bogus` in this scope"]);
        assert_eq!(result.suggestions[0].help(), None);
    }

    #[test]
    fn unresolved_type_with_suggestion() {
        let (_, result) = resolve_src("func f(s: Strng) {}");
        assert_eq!(messages(&result), vec!["Cannot find type `Strng` in this scope"]);
        assert_eq!(result.suggestions[0].help(), Some("did you mean `String`?"));
    }

    #[test]
    fn redeclaration_keeps_first() {
        let (stmts, result) = resolve_src("val a = 1\nval a = 2");
        assert_eq!(messages(&result), vec!["`a` has already been declared in this scope"]);
        match &result.suggestions[0] {
            Suggestion::MsgSpanLink { span, link, .. } => {
                assert_eq!(*span, Span::new(14, 1, FileId(0)));
                assert_eq!(*link, Span::new(4, 1, FileId(0)));
            }
            other => panic!("Expected linked suggestion, got {:?}", other),
        }
        let binding = result.root_rib.get(Namespace::Value, "a").expect("a not declared");
        assert_eq!(binding.res, Res::Def(DefKind::Local, stmts[0].id));
    }

    #[test]
    fn functions_are_forward_declared() {
        let (stmts, result) = resolve_src("val r = twice(2)\nfunc twice(n: int): int => n * 2");
        assert!(result.suggestions.is_empty(), "{:?}", result.suggestions);
        let StmtKind::Item(item) = &stmts[1].kind else {
            panic!("Expected item");
        };
        assert_eq!(id_res(expr_of(&stmts[0])), Some(Res::Def(DefKind::Func, item.id)));
    }

    #[test]
    fn lifetime_params_declare_nothing() {
        let (_, result) = resolve_src("func pick<'a, T>(x: T): T => x");
        assert!(result.suggestions.is_empty(), "{:?}", result.suggestions);
        // `T` twice and `x`
        assert_eq!(result.resolutions.len(), 3);
    }

    #[test]
    fn params_resolve_inside_body() {
        let (stmts, result) = resolve_src("func id<T>(x: T): T => x");
        assert!(result.suggestions.is_empty(), "{:?}", result.suggestions);
        let StmtKind::Item(item) = &stmts[0].kind else {
            panic!("Expected item");
        };
        let jacy_ast::item::ItemKind::Func(func) = &item.kind else {
            panic!("Expected function");
        };
        let Some(FuncBody::Expr(body)) = &func.body else {
            panic!("Expected expression body");
        };
        assert_eq!(id_res(body), Some(Res::Def(DefKind::Param, func.params[0].id)));
    }

    #[test]
    fn separate_namespaces() {
        let (stmts, result) = resolve_src("struct Point {\n    x: int\n}\nval Point = 1\nval p = Point { x: 1 }");
        assert!(result.suggestions.is_empty(), "{:?}", result.suggestions);
        let StmtKind::Item(item) = &stmts[0].kind else {
            panic!("Expected item");
        };
        let construction = expr_of(&stmts[2]);
        assert_eq!(result.resolutions.get(&construction.id), Some(&Res::Def(DefKind::Struct, item.id)));
        let value = result.root_rib.get(Namespace::Value, "Point").expect("Point value not declared");
        assert_eq!(value.res, Res::Def(DefKind::Local, stmts[1].id));
    }

    #[test]
    fn path_resolves_first_segment() {
        let (stmts, result) = resolve_src("enum Color {\n    Red\n}\nval c = Color::Red");
        assert!(result.suggestions.is_empty(), "{:?}", result.suggestions);
        let StmtKind::Item(item) = &stmts[0].kind else {
            panic!("Expected item");
        };
        assert_eq!(id_res(expr_of(&stmts[1])), Some(Res::Def(DefKind::Enum, item.id)));
    }

    #[test]
    fn builtins_from_prelude() {
        let (stmts, result) = resolve_src("println(\"hi\")\nval n: int = 1");
        assert!(result.suggestions.is_empty());
        assert_eq!(id_res(expr_of(&stmts[0])), Some(Res::Builtin("println")));
    }

    #[test]
    fn control_flow_outside_its_construct() {
        let (_, result) = resolve_src("break\ncontinue\nreturn 1");
        assert_eq!(
            messages(&result),
            vec!["`break` outside of a loop", "`continue` outside of a loop", "`return` outside of a function"]
        );

        let (_, result) = resolve_src("while true { break }\nfunc f() { loop { continue }\n return 1 }");
        assert!(result.suggestions.is_empty(), "{:?}", result.suggestions);

        let (_, result) = resolve_src("loop {\n    val f = || { continue }\n}");
        assert_eq!(messages(&result), vec!["`continue` outside of a loop"]);
    }

    #[test]
    fn this_needs_an_enclosing_type() {
        let (_, result) = resolve_src("func f() { this }");
        assert_eq!(messages(&result), vec!["`this` outside of a class, struct, trait or object"]);

        let (_, result) = resolve_src("class A {\n    val n: int\n    func f() => this.n\n}");
        assert!(result.suggestions.is_empty(), "{:?}", result.suggestions);
    }

    #[test]
    fn catch_and_for_bindings() {
        let (_, result) = resolve_src("for i in 0..10 {\n    println(i)\n}\ntry {\n    println(1)\n} catch e {\n    println(e)\n}");
        assert!(result.suggestions.is_empty(), "{:?}", result.suggestions);

        let (_, result) = resolve_src("for i in 0..10 {}\nprintln(i)");
        assert_eq!(messages(&result), vec!["Cannot find `i` in this scope"]);
    }

    #[test]
    #[should_panic(expected = "resolution already set")]
    fn resolving_twice_is_a_bug() {
        let stmts = parse("val x = 1\nx");
        let _ = resolve(&stmts);
        let _ = resolve(&stmts);
    }

    #[test]
    #[should_panic(expected = "error statement reached name resolution")]
    fn error_stub_is_a_bug() {
        let stmt = Stmt { id: jacy_ast::NodeId(0), kind: StmtKind::Error, span: Span::new(0, 0, FileId(0)) };
        let _ = resolve(&[stmt]);
    }
}
