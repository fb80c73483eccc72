//! Structured text change deltas.
//!
//! Every edit to a [`TextDocument`](crate::TextDocument) produces a new revision together with
//! the [`TextDelta`] that turns the previous revision into it. Deltas are what make a caret
//! position from an older revision usable again: replaying them moves the offset across the
//! inserted and deleted text (see [`TextBuffer::translate`](crate::TextBuffer::translate)).
//!
//! Offsets are expressed in **character offsets** (Unicode scalar values).

use crate::position::TrackingMode;

/// A single text edit expressed in character offsets.
///
/// Semantics:
/// - `start` is a character offset in the document **at the time this edit is applied**.
/// - The deleted range is defined by the length (in `char`s) of `deleted_text`.
/// - Edits inside a [`TextDelta`] must be applied **in order** to transform the "before" document
///   into the "after" document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDeltaEdit {
    /// Start character offset of the edit.
    pub start: usize,
    /// Exact deleted text (may be empty).
    pub deleted_text: String,
    /// Exact inserted text (may be empty).
    pub inserted_text: String,
}

impl TextDeltaEdit {
    /// An edit that only inserts.
    pub fn insert(start: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            deleted_text: String::new(),
            inserted_text: text.into(),
        }
    }

    /// An edit that only deletes.
    pub fn delete(start: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            deleted_text: text.into(),
            inserted_text: String::new(),
        }
    }

    /// Length of `deleted_text` in characters.
    pub fn deleted_len(&self) -> usize {
        self.deleted_text.chars().count()
    }

    /// Length of `inserted_text` in characters.
    pub fn inserted_len(&self) -> usize {
        self.inserted_text.chars().count()
    }

    /// Exclusive end character offset in the pre-edit document.
    pub fn end(&self) -> usize {
        self.start.saturating_add(self.deleted_len())
    }

    /// Map an offset of the pre-edit document onto the post-edit document.
    ///
    /// Offsets before the edit are unchanged and offsets after it shift by the length
    /// difference. An offset at the edit start or inside the deleted range collapses onto the
    /// edit: [`TrackingMode::Positive`] lands after the inserted text, [`TrackingMode::Negative`]
    /// before it.
    pub fn translate_offset(&self, offset: usize, mode: TrackingMode) -> usize {
        if offset < self.start {
            return offset;
        }

        let end = self.end();
        if offset >= end && offset > self.start {
            return offset - self.deleted_len() + self.inserted_len();
        }

        match mode {
            TrackingMode::Positive => self.start + self.inserted_len(),
            TrackingMode::Negative => self.start,
        }
    }
}

/// A structured description of a document text change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDelta {
    /// Character count before applying `edits`.
    pub before_char_count: usize,
    /// Character count after applying `edits`.
    pub after_char_count: usize,
    /// Ordered list of edits that transforms the "before" document into the "after" document.
    pub edits: Vec<TextDeltaEdit>,
}

impl TextDelta {
    /// Returns `true` if this delta contains no edits.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Map an offset of the "before" document onto the "after" document.
    pub fn translate_offset(&self, offset: usize, mode: TrackingMode) -> usize {
        self.edits
            .iter()
            .fold(offset, |offset, edit| edit.translate_offset(offset, mode))
    }
}
