//! Revisioned text buffers.
//!
//! The matcher never owns the text it scans. It reads one immutable revision through the
//! [`TextBuffer`] protocol, which any host can implement over its own storage. [`Snapshot`] is
//! the provided implementation: a `ropey::Rope` frozen at one revision, plus the tail of edit
//! history needed to re-anchor positions taken from older revisions.
//!
//! [`TextDocument`] is the mutable side. Each edit produces the next revision and returns its
//! snapshot; snapshots are cheap to clone because ropes share their nodes.

use crate::delta::{TextDelta, TextDeltaEdit};
use crate::error::{EditError, TranslateError};
use crate::position::{LineColumn, Position, TrackingMode};
use crate::render::Span;
use ropey::Rope;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// How many deltas a [`TextDocument`] keeps for re-anchoring by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 256;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one document; revisions of different documents never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub u64);

impl DocumentId {
    fn next() -> Self {
        Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One immutable revision of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RevisionId {
    /// Owning document.
    pub document: DocumentId,
    /// Version number, incremented by every edit.
    pub version: u64,
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.document.0, self.version)
    }
}

/// A logical line of one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Line number (0-based).
    pub number: usize,
    /// Char offset of the first character of the line.
    pub start: usize,
    /// Length in chars, excluding the line break.
    pub len: usize,
    /// Line text, excluding the line break.
    pub text: String,
}

impl Line {
    /// Exclusive end offset (the position of the line break, if any).
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// The full-line span of this line in `revision`.
    pub fn span(&self, revision: RevisionId) -> Span {
        Span::new(revision, self.start, self.len)
    }
}

/// Read access to one buffer revision.
///
/// Implementations must be immutable: every call on the same value sees the same text.
pub trait TextBuffer {
    /// The revision this buffer represents.
    fn revision(&self) -> RevisionId;

    /// Number of logical lines (an empty buffer has one empty line).
    fn line_count(&self) -> usize;

    /// Total length in chars.
    fn char_count(&self) -> usize;

    /// Look up a line by number.
    fn line(&self, line_number: usize) -> Option<Line>;

    /// The line number holding `offset`; `offset == char_count()` belongs to the last line.
    fn line_of_offset(&self, offset: usize) -> Option<usize>;

    /// The character at `offset`, or `None` at or past the end.
    fn char_at(&self, offset: usize) -> Option<char>;

    /// Re-anchor `position` onto this revision.
    fn translate(
        &self,
        position: Position,
        mode: TrackingMode,
    ) -> Result<Position, TranslateError>;

    /// The line containing `offset`.
    fn line_containing(&self, offset: usize) -> Option<Line> {
        self.line_of_offset(offset)
            .and_then(|line_number| self.line(line_number))
    }

    /// Decompose a position of this revision into line and column.
    fn line_column(&self, position: Position) -> Option<LineColumn> {
        if position.revision != self.revision() {
            return None;
        }
        let line = self.line_containing(position.offset)?;
        Some(LineColumn::new(line.number, position.offset - line.start))
    }
}

/// Edits retained for re-anchoring: `deltas[i]` turns version `oldest + i` into `oldest + i + 1`.
#[derive(Debug, Default)]
struct History {
    oldest: u64,
    deltas: Vec<Arc<TextDelta>>,
}

/// An immutable, cheaply clonable revision of a [`TextDocument`].
#[derive(Debug, Clone)]
pub struct Snapshot {
    rope: Rope,
    revision: RevisionId,
    history: Arc<History>,
}

impl Snapshot {
    /// A standalone snapshot (revision 0 of a fresh document).
    pub fn from_text(text: &str) -> Self {
        TextDocument::new(text).snapshot()
    }

    /// A standalone snapshot whose lines are joined with `\n`.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let text = lines
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join("\n");
        Self::from_text(&text)
    }

    /// Complete text of this revision.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// The position at `(line, column)`, clamped to the buffer and the line's length.
    pub fn position_at(&self, line: usize, column: usize) -> Position {
        let offset = if line >= self.rope.len_lines() {
            self.rope.len_chars()
        } else {
            let start = self.rope.line_to_char(line);
            start + column.min(line_len(&self.rope, line))
        };
        Position::new(self.revision, offset)
    }

    /// Oldest revision positions can still be re-anchored from.
    pub fn oldest_revision(&self) -> RevisionId {
        RevisionId {
            document: self.revision.document,
            version: self.history.oldest,
        }
    }
}

impl TextBuffer for Snapshot {
    fn revision(&self) -> RevisionId {
        self.revision
    }

    fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    fn line(&self, line_number: usize) -> Option<Line> {
        if line_number >= self.rope.len_lines() {
            return None;
        }

        let mut text = self.rope.line(line_number).to_string();
        trim_line_break(&mut text);

        Some(Line {
            number: line_number,
            start: self.rope.line_to_char(line_number),
            len: text.chars().count(),
            text,
        })
    }

    fn line_of_offset(&self, offset: usize) -> Option<usize> {
        if offset > self.rope.len_chars() {
            return None;
        }
        Some(self.rope.char_to_line(offset))
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        if offset >= self.rope.len_chars() {
            return None;
        }
        Some(self.rope.char(offset))
    }

    fn translate(
        &self,
        position: Position,
        mode: TrackingMode,
    ) -> Result<Position, TranslateError> {
        let from = position.revision;
        if from.document != self.revision.document {
            return Err(TranslateError::ForeignDocument);
        }
        if from.version > self.revision.version {
            return Err(TranslateError::FutureRevision {
                from,
                to: self.revision,
            });
        }
        if from.version < self.history.oldest {
            return Err(TranslateError::RevisionTooOld {
                from,
                oldest: self.oldest_revision(),
            });
        }

        let skip = (from.version - self.history.oldest) as usize;
        let deltas = &self.history.deltas[skip..];

        let source_len = deltas
            .first()
            .map_or(self.rope.len_chars(), |delta| delta.before_char_count);
        if position.offset > source_len {
            return Err(TranslateError::OffsetOutOfRange {
                offset: position.offset,
                revision: from,
                len: source_len,
            });
        }

        let offset = deltas
            .iter()
            .fold(position.offset, |offset, delta| {
                delta.translate_offset(offset, mode)
            })
            .min(self.rope.len_chars());

        Ok(Position::new(self.revision, offset))
    }
}

/// The mutable owner of a document's text and revision history.
#[derive(Debug)]
pub struct TextDocument {
    rope: Rope,
    revision: RevisionId,
    deltas: VecDeque<Arc<TextDelta>>,
    history_limit: usize,
    history: Arc<History>,
}

impl TextDocument {
    /// Create a document at revision 0.
    pub fn new(text: &str) -> Self {
        Self::with_history_limit(text, DEFAULT_HISTORY_LIMIT)
    }

    /// Create a document that keeps at most `history_limit` deltas for re-anchoring.
    pub fn with_history_limit(text: &str, history_limit: usize) -> Self {
        Self {
            rope: Rope::from_str(text),
            revision: RevisionId {
                document: DocumentId::next(),
                version: 0,
            },
            deltas: VecDeque::new(),
            history_limit,
            history: Arc::new(History::default()),
        }
    }

    /// Current revision.
    pub fn revision(&self) -> RevisionId {
        self.revision
    }

    /// Maximum number of retained deltas.
    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Snapshot of the current revision.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            rope: self.rope.clone(),
            revision: self.revision,
            history: Arc::clone(&self.history),
        }
    }

    /// Current text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Total length in chars.
    pub fn char_count(&self) -> usize {
        self.rope.len_chars()
    }

    /// Insert `text` at a char offset.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<Snapshot, EditError> {
        self.replace(offset, 0, text)
    }

    /// Delete `len` chars starting at `start`.
    pub fn delete(&mut self, start: usize, len: usize) -> Result<Snapshot, EditError> {
        self.replace(start, len, "")
    }

    /// Replace `len` chars starting at `start` with `text`.
    pub fn replace(&mut self, start: usize, len: usize, text: &str) -> Result<Snapshot, EditError> {
        let doc_len = self.rope.len_chars();
        let end = start.saturating_add(len);
        if end > doc_len {
            return Err(EditError::OutOfBounds {
                start,
                end,
                len: doc_len,
            });
        }

        let edit = TextDeltaEdit {
            start,
            deleted_text: self.rope.slice(start..end).to_string(),
            inserted_text: text.to_string(),
        };
        let after = doc_len - len + edit.inserted_len();
        self.apply(TextDelta {
            before_char_count: doc_len,
            after_char_count: after,
            edits: vec![edit],
        })
    }

    /// Apply a structured delta atomically and return the new revision's snapshot.
    ///
    /// A delta whose edits are all no-ops does not create a revision.
    pub fn apply(&mut self, mut delta: TextDelta) -> Result<Snapshot, EditError> {
        let len = self.rope.len_chars();
        if delta.before_char_count != len {
            return Err(EditError::CharCountMismatch {
                expected: delta.before_char_count,
                actual: len,
            });
        }

        delta
            .edits
            .retain(|edit| !(edit.deleted_text.is_empty() && edit.inserted_text.is_empty()));
        if delta.is_empty() {
            return Ok(self.snapshot());
        }

        // Edit a copy so a bad edit in the middle of a delta leaves the document untouched.
        let mut rope = self.rope.clone();
        for edit in &delta.edits {
            let end = edit.end();
            if end > rope.len_chars() {
                return Err(EditError::OutOfBounds {
                    start: edit.start,
                    end,
                    len: rope.len_chars(),
                });
            }
            if !rope.slice(edit.start..end).chars().eq(edit.deleted_text.chars()) {
                return Err(EditError::DeletedTextMismatch { start: edit.start });
            }
            rope.remove(edit.start..end);
            rope.insert(edit.start, &edit.inserted_text);
        }
        delta.after_char_count = rope.len_chars();

        self.rope = rope;
        self.revision.version += 1;
        self.push_delta(delta);

        tracing::trace!(revision = %self.revision, "applied text delta");
        Ok(self.snapshot())
    }

    fn push_delta(&mut self, delta: TextDelta) {
        self.deltas.push_back(Arc::new(delta));
        while self.deltas.len() > self.history_limit {
            self.deltas.pop_front();
        }

        self.history = Arc::new(History {
            oldest: self.revision.version - self.deltas.len() as u64,
            deltas: self.deltas.iter().cloned().collect(),
        });
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

fn trim_line_break(text: &mut String) {
    if text.ends_with("\r\n") {
        text.truncate(text.len() - 2);
    } else if text.chars().next_back().is_some_and(is_line_break) {
        text.pop();
    }
}

fn line_len(rope: &Rope, line: usize) -> usize {
    let slice = rope.line(line);
    let mut len = slice.len_chars();
    if len >= 2 && slice.char(len - 2) == '\r' && slice.char(len - 1) == '\n' {
        len -= 2;
    } else if len >= 1 && is_line_break(slice.char(len - 1)) {
        len -= 1;
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_has_one_line() {
        let snapshot = Snapshot::from_text("");
        assert_eq!(snapshot.line_count(), 1);
        assert_eq!(snapshot.char_count(), 0);
        assert_eq!(snapshot.line(0).map(|line| line.len), Some(0));
        assert_eq!(snapshot.char_at(0), None);
    }

    #[test]
    fn test_lines_exclude_line_breaks() {
        let snapshot = Snapshot::from_text("ab\r\ncd\nef");
        assert_eq!(snapshot.line_count(), 3);

        let line = snapshot.line(0).unwrap();
        assert_eq!(line.text, "ab");
        assert_eq!((line.start, line.len), (0, 2));

        let line = snapshot.line(1).unwrap();
        assert_eq!(line.text, "cd");
        assert_eq!((line.start, line.len), (4, 2));

        assert!(snapshot.line(3).is_none());
    }

    #[test]
    fn test_line_of_offset_and_end_of_buffer() {
        let snapshot = Snapshot::from_lines(&["abc", "def"]);
        assert_eq!(snapshot.line_of_offset(0), Some(0));
        assert_eq!(snapshot.line_of_offset(3), Some(0)); // the '\n'
        assert_eq!(snapshot.line_of_offset(4), Some(1));
        assert_eq!(snapshot.line_of_offset(7), Some(1));
        assert_eq!(snapshot.line_of_offset(8), None);
    }

    #[test]
    fn test_position_at_clamps_and_round_trips() {
        let snapshot = Snapshot::from_lines(&["你好", "world"]);
        let position = snapshot.position_at(1, 2);
        assert_eq!(position.offset, 5);
        assert_eq!(snapshot.line_column(position), Some(LineColumn::new(1, 2)));

        assert_eq!(snapshot.position_at(0, 99).offset, 2);
        assert_eq!(snapshot.position_at(9, 0).offset, snapshot.char_count());
    }

    #[test]
    fn test_edits_create_revisions() {
        let mut document = TextDocument::new("hello");
        let before = document.revision();

        let snapshot = document.insert(5, " world").unwrap();
        assert_eq!(snapshot.text(), "hello world");
        assert_eq!(snapshot.revision().version, before.version + 1);
        assert_eq!(snapshot.revision().document, before.document);

        // No-op edits keep the revision.
        let same = document.insert(3, "").unwrap();
        assert_eq!(same.revision(), snapshot.revision());
    }

    #[test]
    fn test_out_of_bounds_edit_is_rejected() {
        let mut document = TextDocument::new("abc");
        let err = document.delete(2, 5).unwrap_err();
        assert_eq!(err, EditError::OutOfBounds { start: 2, end: 7, len: 3 });
        assert_eq!(document.text(), "abc");
    }

    #[test]
    fn test_mismatched_delta_is_rejected_atomically() {
        let mut document = TextDocument::new("abcdef");
        let delta = TextDelta {
            before_char_count: 6,
            after_char_count: 6,
            edits: vec![
                TextDeltaEdit::insert(0, "X"),
                TextDeltaEdit::delete(1, "zz"),
            ],
        };
        assert_eq!(
            document.apply(delta).unwrap_err(),
            EditError::DeletedTextMismatch { start: 1 }
        );
        assert_eq!(document.text(), "abcdef");
        assert_eq!(document.revision().version, 0);
    }

    #[test]
    fn test_translate_across_revisions() {
        let mut document = TextDocument::new("<!--koif: a-->");
        let old = document.snapshot();
        let caret = old.position_at(0, 4);

        let new = document.insert(0, "  ").unwrap();
        let moved = new.translate(caret, TrackingMode::Positive).unwrap();
        assert_eq!(moved, Position::new(new.revision(), 6));

        // Translating onto the same revision validates the offset only.
        assert_eq!(new.translate(moved, TrackingMode::Positive), Ok(moved));
    }

    #[test]
    fn test_translate_failures() {
        let mut document = TextDocument::with_history_limit("abc", 1);
        let v0 = document.snapshot();
        let v1 = document.insert(0, "x").unwrap();
        let v2 = document.insert(0, "y").unwrap();

        let stale = v0.position_at(0, 1);
        assert!(matches!(
            v2.translate(stale, TrackingMode::Positive),
            Err(TranslateError::RevisionTooOld { .. })
        ));

        let future = v2.position_at(0, 0);
        assert!(matches!(
            v1.translate(future, TrackingMode::Positive),
            Err(TranslateError::FutureRevision { .. })
        ));

        let other = Snapshot::from_text("abc");
        assert_eq!(
            v2.translate(other.position_at(0, 0), TrackingMode::Positive),
            Err(TranslateError::ForeignDocument)
        );

        let bogus = Position::new(v1.revision(), 100);
        assert!(matches!(
            v2.translate(bogus, TrackingMode::Positive),
            Err(TranslateError::OffsetOutOfRange { offset: 100, .. })
        ));
    }
}
