// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Token definitions for the lexer.

use std::fmt;

use crate::Span;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn is(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.kind) == std::mem::discriminant(kind)
    }
}

/// The kind of token.
///
/// Literal and identifier kinds carry their lexeme. String lexemes exclude
/// the quotes; based integers keep their prefix (`0xFF`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Eof,
    Nl,

    // Literals
    DecLiteral(String),
    BinLiteral(String),
    OctLiteral(String),
    HexLiteral(String),
    FloatLiteral(String),
    SQStringLiteral(String),
    DQStringLiteral(String),

    // Identifier
    Id(String),
    /// `'a` in a generic parameter list, name without the quote
    Lifetime(String),

    // Keywords
    As,
    AsQM,
    Break,
    Catch,
    Class,
    Const,
    Continue,
    Elif,
    Else,
    Enum,
    False,
    For,
    Func,
    If,
    Impl,
    In,
    Infix,
    Init,
    Is,
    Loop,
    Move,
    Mut,
    Object,
    Pri,
    Pub,
    Return,
    Static,
    Struct,
    Super,
    This,
    Throw,
    Trait,
    True,
    Try,
    Type,
    Val,
    Var,
    When,
    While,

    // Assignment
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    PowerAssign,
    ShlAssign,
    ShrAssign,
    BitAndAssign,
    BitOrAssign,
    XorAssign,
    NullishAssign,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Power,
    Inc,
    Dec,

    // Logic and bitwise
    Or,
    And,
    Not,
    BitOr,
    Xor,
    Ampersand,
    Inv,
    Shl,
    Shr,

    // Comparison
    Eq,
    NotEq,
    RefEq,
    RefNotEq,
    LAngle,
    RAngle,
    LE,
    GE,
    Spaceship,
    NotIs,
    NotIn,

    // Ranges
    Range,
    RangeRE,
    RangeInc,
    RangeLE,
    RangeBothE,
    Spread,

    // Punctuation
    NullCoalesce,
    SafeCall,
    Quest,
    Pipe,
    Dot,
    Path,
    Colon,
    Semi,
    Comma,
    Arrow,
    DoubleArrow,
    At,
    Dollar,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
}

impl TokenKind {
    /// Map an identifier-shaped word to its keyword, if it is one.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        Some(match word {
            "as" => TokenKind::As,
            "break" => TokenKind::Break,
            "catch" => TokenKind::Catch,
            "class" => TokenKind::Class,
            "const" => TokenKind::Const,
            "continue" => TokenKind::Continue,
            "elif" => TokenKind::Elif,
            "else" => TokenKind::Else,
            "enum" => TokenKind::Enum,
            "false" => TokenKind::False,
            "for" => TokenKind::For,
            "func" => TokenKind::Func,
            "if" => TokenKind::If,
            "impl" => TokenKind::Impl,
            "in" => TokenKind::In,
            "infix" => TokenKind::Infix,
            "init" => TokenKind::Init,
            "is" => TokenKind::Is,
            "loop" => TokenKind::Loop,
            "move" => TokenKind::Move,
            "mut" => TokenKind::Mut,
            "object" => TokenKind::Object,
            "pri" => TokenKind::Pri,
            "pub" => TokenKind::Pub,
            "return" => TokenKind::Return,
            "static" => TokenKind::Static,
            "struct" => TokenKind::Struct,
            "super" => TokenKind::Super,
            "this" => TokenKind::This,
            "throw" => TokenKind::Throw,
            "trait" => TokenKind::Trait,
            "true" => TokenKind::True,
            "try" => TokenKind::Try,
            "type" => TokenKind::Type,
            "val" => TokenKind::Val,
            "var" => TokenKind::Var,
            "when" => TokenKind::When,
            "while" => TokenKind::While,
            _ => return None,
        })
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::DecLiteral(_)
                | TokenKind::BinLiteral(_)
                | TokenKind::OctLiteral(_)
                | TokenKind::HexLiteral(_)
                | TokenKind::FloatLiteral(_)
                | TokenKind::SQStringLiteral(_)
                | TokenKind::DQStringLiteral(_)
        )
    }

    /// Plain or compound assignment operators.
    pub fn is_assign_op(&self) -> bool {
        matches!(
            self,
            TokenKind::Assign
                | TokenKind::AddAssign
                | TokenKind::SubAssign
                | TokenKind::MulAssign
                | TokenKind::DivAssign
                | TokenKind::ModAssign
                | TokenKind::PowerAssign
                | TokenKind::ShlAssign
                | TokenKind::ShrAssign
                | TokenKind::BitAndAssign
                | TokenKind::BitOrAssign
                | TokenKind::XorAssign
                | TokenKind::NullishAssign
        )
    }

    /// Human-readable name for error messages.
    pub fn display_name(&self) -> String {
        match self {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::Nl => "end of line".to_string(),
            TokenKind::Id(name) => format!("name '{}'", name),
            TokenKind::DecLiteral(_)
            | TokenKind::BinLiteral(_)
            | TokenKind::OctLiteral(_)
            | TokenKind::HexLiteral(_) => "integer".to_string(),
            TokenKind::FloatLiteral(_) => "float".to_string(),
            TokenKind::SQStringLiteral(_) | TokenKind::DQStringLiteral(_) => "string".to_string(),
            TokenKind::Lifetime(name) => format!("lifetime '{}", name),
            other => format!("'{}'", other),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Eof => "[EOF]",
            TokenKind::Nl => "[NL]",
            TokenKind::DecLiteral(s)
            | TokenKind::BinLiteral(s)
            | TokenKind::OctLiteral(s)
            | TokenKind::HexLiteral(s)
            | TokenKind::FloatLiteral(s)
            | TokenKind::Id(s) => return f.write_str(s),
            TokenKind::SQStringLiteral(s) => return write!(f, "'{}'", s),
            TokenKind::Lifetime(s) => return write!(f, "'{}", s),
            TokenKind::DQStringLiteral(s) => return write!(f, "\"{}\"", s),
            TokenKind::As => "as",
            TokenKind::AsQM => "as?",
            TokenKind::Break => "break",
            TokenKind::Catch => "catch",
            TokenKind::Class => "class",
            TokenKind::Const => "const",
            TokenKind::Continue => "continue",
            TokenKind::Elif => "elif",
            TokenKind::Else => "else",
            TokenKind::Enum => "enum",
            TokenKind::False => "false",
            TokenKind::For => "for",
            TokenKind::Func => "func",
            TokenKind::If => "if",
            TokenKind::Impl => "impl",
            TokenKind::In => "in",
            TokenKind::Infix => "infix",
            TokenKind::Init => "init",
            TokenKind::Is => "is",
            TokenKind::Loop => "loop",
            TokenKind::Move => "move",
            TokenKind::Mut => "mut",
            TokenKind::Object => "object",
            TokenKind::Pri => "pri",
            TokenKind::Pub => "pub",
            TokenKind::Return => "return",
            TokenKind::Static => "static",
            TokenKind::Struct => "struct",
            TokenKind::Super => "super",
            TokenKind::This => "this",
            TokenKind::Throw => "throw",
            TokenKind::Trait => "trait",
            TokenKind::True => "true",
            TokenKind::Try => "try",
            TokenKind::Type => "type",
            TokenKind::Val => "val",
            TokenKind::Var => "var",
            TokenKind::When => "when",
            TokenKind::While => "while",
            TokenKind::Assign => "=",
            TokenKind::AddAssign => "+=",
            TokenKind::SubAssign => "-=",
            TokenKind::MulAssign => "*=",
            TokenKind::DivAssign => "/=",
            TokenKind::ModAssign => "%=",
            TokenKind::PowerAssign => "**=",
            TokenKind::ShlAssign => "<<=",
            TokenKind::ShrAssign => ">>=",
            TokenKind::BitAndAssign => "&=",
            TokenKind::BitOrAssign => "|=",
            TokenKind::XorAssign => "^=",
            TokenKind::NullishAssign => "??=",
            TokenKind::Add => "+",
            TokenKind::Sub => "-",
            TokenKind::Mul => "*",
            TokenKind::Div => "/",
            TokenKind::Mod => "%",
            TokenKind::Power => "**",
            TokenKind::Inc => "++",
            TokenKind::Dec => "--",
            TokenKind::Or => "||",
            TokenKind::And => "&&",
            TokenKind::Not => "!",
            TokenKind::BitOr => "|",
            TokenKind::Xor => "^",
            TokenKind::Ampersand => "&",
            TokenKind::Inv => "~",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::Eq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::RefEq => "===",
            TokenKind::RefNotEq => "!==",
            TokenKind::LAngle => "<",
            TokenKind::RAngle => ">",
            TokenKind::LE => "<=",
            TokenKind::GE => ">=",
            TokenKind::Spaceship => "<=>",
            TokenKind::NotIs => "!is",
            TokenKind::NotIn => "!in",
            TokenKind::Range => "..",
            TokenKind::RangeRE => "..<",
            TokenKind::RangeInc => "..=",
            TokenKind::RangeLE => ">..",
            TokenKind::RangeBothE => ">.<",
            TokenKind::Spread => "...",
            TokenKind::NullCoalesce => "??",
            TokenKind::SafeCall => "?.",
            TokenKind::Quest => "?",
            TokenKind::Pipe => "|>",
            TokenKind::Dot => ".",
            TokenKind::Path => "::",
            TokenKind::Colon => ":",
            TokenKind::Semi => ";",
            TokenKind::Comma => ",",
            TokenKind::Arrow => "->",
            TokenKind::DoubleArrow => "=>",
            TokenKind::At => "@",
            TokenKind::Dollar => "$",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
        };
        f.write_str(s)
    }
}
