// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.
//!
//! Kept separate from the main parser to avoid clutter.

use jacy_ast::token::TokenKind;

/// Get a hint for an "expected X" error based on context.
pub fn for_expected(expected: &str, found: &TokenKind) -> Option<&'static str> {
    match (expected, found) {
        ("':'", TokenKind::Assign) => Some("use ':' for types, '=' for values"),
        ("':'", _) => Some("syntax: name: Type"),

        ("'{'", _) => Some("blocks start with '{'"),
        ("'}'", _) => Some("every '{' needs a matching '}'"),
        ("')'", TokenKind::Eof) => Some("add ')' to close the parenthesis"),
        ("']'", TokenKind::Eof) => Some("add ']' to close the bracket"),
        ("'>'", _) => Some("close the generic parameter list with '>'"),
        ("'=>'", _) => Some("`when` entries look like `a, b => body`"),
        ("'in'", _) => Some("syntax: for x in items { ... }"),
        ("'catch'", _) => Some("every `try` block needs a `catch name { ... }`"),

        ("expression", TokenKind::Assign) => Some("put the value after '='"),
        ("expression", TokenKind::Nl | TokenKind::Semi) => Some("statement is incomplete"),
        ("expression", _) => Some("try a value, variable, or function call"),

        ("a name", TokenKind::DecLiteral(_)) => Some("names can't start with a number"),
        ("a name", _) => Some("names start with a letter or '_'"),

        ("type", _) => Some("try a type like 'int', 'str', or a class name"),

        ("';' or new-line", _) => Some("put each statement on its own line or separate them with ';'"),

        (s, _) if s.starts_with("declaration") => {
            Some("start with 'func', 'class', 'struct', 'enum', 'trait', 'type' or 'object'")
        }

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_depend_on_found_token() {
        assert_eq!(for_expected("':'", &TokenKind::Assign), Some("use ':' for types, '=' for values"));
        assert_eq!(for_expected("':'", &TokenKind::Comma), Some("syntax: name: Type"));
        assert_eq!(for_expected("')'", &TokenKind::Comma), None);
        assert!(for_expected("declaration (func, class)", &TokenKind::Eof).is_some());
    }
}
