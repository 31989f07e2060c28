// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Lexer for the Jacy language.
//!
//! Transforms source text into a stream of tokens and the file's line table.

mod error;
mod lexer;

pub use error::LexError;
pub use lexer::{LexOutput, Lexer};

use jacy_ast::ParseSess;

/// Lex a whole file.
pub fn lex(sess: &ParseSess, source: &str) -> Result<LexOutput, LexError> {
    Lexer::new(sess, source).tokenize()
}
