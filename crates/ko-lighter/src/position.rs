//! Revision-bound positions.
//!
//! A [`Position`] is a character offset *into one revision* of a buffer. Offsets are only
//! meaningful inside the revision they were taken from; moving a position to a newer revision
//! goes through [`TextBuffer::translate`](crate::TextBuffer::translate), which replays the
//! recorded [`TextDelta`](crate::TextDelta)s.

use crate::buffer::RevisionId;
use serde::{Deserialize, Serialize};

/// Which side of an insertion made exactly at a tracked offset the offset ends up on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackingMode {
    /// Move with inserted text (the offset ends after it).
    #[default]
    Positive,
    /// Stay put (the offset ends before inserted text).
    Negative,
}

/// A character offset in a specific buffer revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// The revision this offset belongs to.
    pub revision: RevisionId,
    /// Offset in Unicode scalar values from the start of the buffer.
    pub offset: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(revision: RevisionId, offset: usize) -> Self {
        Self { revision, offset }
    }
}

/// A logical `(line, column)` pair; both zero-based, column counted in chars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineColumn {
    /// Line number (0-based).
    pub line: usize,
    /// Column number (0-based, in chars).
    pub column: usize,
}

impl LineColumn {
    /// Create a new line/column pair.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}
