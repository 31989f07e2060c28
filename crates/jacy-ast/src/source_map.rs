// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Registry of source files and their line tables.

use std::path::{Path, PathBuf};

use crate::span::{FileId, LineMap, Span};

/// A registered source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
    pub lines: LineMap,
}

/// Append-only map from [`FileId`] to source text.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path and hand out its id. Text is attached later with
    /// [`SourceMap::set_source`].
    pub fn add_source(&mut self, path: impl AsRef<Path>) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile {
            path: path.as_ref().to_path_buf(),
            text: String::new(),
            lines: LineMap::default(),
        });
        id
    }

    /// Attach text and the line table produced by the lexer.
    pub fn set_source(&mut self, file: FileId, text: impl Into<String>, lines: LineMap) {
        match self.files.get_mut(file.0 as usize) {
            Some(f) => {
                f.text = text.into();
                f.lines = lines;
            }
            None => crate::bug!("set_source on unknown file {:?}", file),
        }
    }

    pub fn get_source_file(&self, file: FileId) -> Option<&SourceFile> {
        self.files.get(file.0 as usize)
    }

    pub fn get_lines_count(&self, file: FileId) -> u32 {
        self.get_source_file(file).map_or(0, |f| f.lines.line_count())
    }

    /// Text of a 1-based line.
    pub fn line_text(&self, file: FileId, line: u32) -> Option<&str> {
        let f = self.get_source_file(file)?;
        f.lines.line_text(&f.text, line)
    }

    /// 1-based line and 0-based column of the span start.
    pub fn span_to_line_col(&self, span: Span) -> Option<(u32, u32)> {
        let f = self.get_source_file(span.file)?;
        Some(f.lines.offset_to_line_col(span.pos))
    }

    /// Source text covered by `span`.
    pub fn snippet(&self, span: Span) -> Option<&str> {
        self.get_source_file(span.file)?.text.get(span.range())
    }
}
