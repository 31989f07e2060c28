// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for the Jacy language.
//!
//! Transforms a token stream into an abstract syntax tree, reporting syntax
//! errors as suggestions and carrying on with error stubs.

mod hints;
mod parser;

pub use parser::{ParseError, ParseOutput, Parser, ParserError};
