// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source location tracking.

/// Identifier of a source file registered in the [`SourceMap`](crate::SourceMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileId(pub u32);

/// A half-open range `[pos, pos + len)` of bytes in one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub pos: u32,
    pub len: u32,
    pub file: FileId,
}

impl Span {
    pub fn new(pos: u32, len: u32, file: FileId) -> Self {
        Self { pos, len, file }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> u32 {
        self.pos + self.len
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(self, other: Span) -> Span {
        if self.file != other.file {
            crate::bug!("cannot merge spans of files {:?} and {:?}", self.file, other.file);
        }
        let pos = self.pos.min(other.pos);
        let end = self.end().max(other.end());
        Span::new(pos, end - pos, self.file)
    }

    /// Byte range for slicing the source text.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.pos as usize..self.end() as usize
    }
}

/// Line-start offsets for O(log n) byte-offset → line:col lookup.
///
/// The lexer fills this in while scanning, one entry per line start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMap {
    /// Byte offset of the start of each line. line_starts[0] is always 0.
    line_starts: Vec<u32>,
}

impl Default for LineMap {
    fn default() -> Self {
        Self { line_starts: vec![0] }
    }
}

impl LineMap {
    /// Build a line map by scanning source for newlines. O(n).
    pub fn new(source: &str) -> Self {
        let mut map = LineMap::default();
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                map.add_line((i + 1) as u32);
            }
        }
        map
    }

    /// Record that a new line starts at `offset`.
    pub fn add_line(&mut self, offset: u32) {
        debug_assert!(self.line_starts.last().map_or(true, |&last| last < offset));
        self.line_starts.push(offset);
    }

    /// Convert byte offset to (line, col): line is 1-based, col is a 0-based
    /// byte column. O(log n).
    pub fn offset_to_line_col(&self, offset: u32) -> (u32, u32) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line = (line_idx + 1) as u32;
        let col = offset - self.line_starts[line_idx];
        (line, col)
    }

    /// Byte range of a 1-based line, excluding its line terminator.
    pub fn line_range(&self, source: &str, line: u32) -> Option<std::ops::Range<usize>> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(idx)? as usize;
        let mut end = self
            .line_starts
            .get(idx + 1)
            .map(|&s| (s as usize).saturating_sub(1))
            .unwrap_or(source.len());
        if end > start && source.as_bytes().get(end - 1) == Some(&b'\r') {
            end -= 1;
        }
        Some(start..end)
    }

    /// Get the source text of a 1-based line number.
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> Option<&'a str> {
        self.line_range(source, line).and_then(|r| source.get(r))
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source() {
        let lm = LineMap::new("");
        assert_eq!(lm.offset_to_line_col(0), (1, 0));
        assert_eq!(lm.line_count(), 1);
    }

    #[test]
    fn multi_line() {
        let src = "val a = 1\nval bb = 2\nc";
        let lm = LineMap::new(src);
        assert_eq!(lm.line_count(), 3);
        assert_eq!(lm.offset_to_line_col(4), (1, 4));
        assert_eq!(lm.offset_to_line_col(10), (2, 0));
        assert_eq!(lm.offset_to_line_col(14), (2, 4));
        assert_eq!(lm.line_text(src, 2), Some("val bb = 2"));
        assert_eq!(lm.line_text(src, 3), Some("c"));
        assert_eq!(lm.line_text(src, 4), None);
    }

    #[test]
    fn trailing_newline() {
        let src = "a\n";
        let lm = LineMap::new(src);
        assert_eq!(lm.line_count(), 2);
        assert_eq!(lm.line_text(src, 1), Some("a"));
        assert_eq!(lm.line_text(src, 2), Some(""));
    }

    #[test]
    fn crlf_is_stripped() {
        let src = "a\r\nb";
        let lm = LineMap::new(src);
        assert_eq!(lm.line_text(src, 1), Some("a"));
        assert_eq!(lm.line_text(src, 2), Some("b"));
    }

    #[test]
    fn span_to_covers_both() {
        let a = Span::new(4, 2, FileId(0));
        let b = Span::new(10, 3, FileId(0));
        assert_eq!(a.to(b), Span::new(4, 9, FileId(0)));
        assert_eq!(b.to(a), Span::new(4, 9, FileId(0)));
    }

    #[test]
    #[should_panic(expected = "cannot merge spans")]
    fn span_to_rejects_foreign_file() {
        let _ = Span::new(0, 1, FileId(0)).to(Span::new(0, 1, FileId(1)));
    }
}
