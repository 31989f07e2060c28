// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Per-run compilation context.

use crate::source_map::SourceMap;
use crate::span::FileId;

/// State shared by every stage of one compilation run.
///
/// Created once by the driver; the source map is only appended to.
#[derive(Debug, Default)]
pub struct Session {
    pub source_map: SourceMap,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Context for lexing and parsing a single file.
#[derive(Debug, Clone, Copy)]
pub struct ParseSess {
    pub file: FileId,
}

impl ParseSess {
    pub fn new(file: FileId) -> Self {
        Self { file }
    }
}
