//! Rope-based text buffer addressed by caret offsets.
//!
//! A caret offset is a zero-based `char` index into the content, the unit the
//! host surface reports. All mutation helpers clamp out-of-range carets to the
//! end of the buffer instead of panicking, since hosts may report a stale caret
//! after a programmatic content swap.

use ropey::Rope;
use std::fmt;
use std::ops::Range;

/// A text buffer backed by a `ropey::Rope`.
#[derive(Clone, Default)]
pub struct Buffer {
    rope: Rope,
}

/// The line containing a caret, as char offsets. `end` excludes the line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

impl LineSpan {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice.
    pub fn from_str(content: &str) -> Self {
        Self {
            rope: Rope::from_str(content),
        }
    }

    /// Owned copy of the full content.
    pub fn contents(&self) -> String {
        self.rope.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Total number of lines in the buffer (an empty buffer has one line).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn clamp_caret(&self, caret: usize) -> usize {
        caret.min(self.rope.len_chars())
    }

    /// Replace the entire content.
    pub fn set(&mut self, content: &str) {
        self.rope = Rope::from_str(content);
    }

    /// Insert `text` at `caret`, returning the caret advanced past the inserted text.
    pub fn insert(&mut self, caret: usize, text: &str) -> usize {
        let at = self.clamp_caret(caret);
        self.rope.insert(at, text);
        at + text.chars().count()
    }

    /// Replace the chars in `range` (clamped) with `text`.
    pub fn replace(&mut self, range: Range<usize>, text: &str) {
        let end = self.clamp_caret(range.end);
        let start = range.start.min(end);
        self.rope.remove(start..end);
        self.rope.insert(start, text);
    }

    /// Locate the line containing `caret`: scan back to the previous `'\n'` and
    /// forward to the next one.
    pub fn line_span(&self, caret: usize) -> LineSpan {
        let at = self.clamp_caret(caret);
        let line = self.rope.char_to_line(at);
        let start = self.rope.line_to_char(line);
        let slice = self.rope.line(line);
        let mut len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len -= 1;
        }
        LineSpan {
            line,
            start,
            end: start + len,
        }
    }

    /// Owned copy of the chars in `range` (clamped).
    pub fn slice(&self, range: Range<usize>) -> String {
        let end = self.clamp_caret(range.end);
        let start = range.start.min(end);
        self.rope.slice(start..end).to_string()
    }

    pub fn eq_str(&self, other: &str) -> bool {
        self.rope == other
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self.rope.chunks() {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("chars", &self.rope.len_chars())
            .field("lines", &self.rope.len_lines())
            .finish()
    }
}
