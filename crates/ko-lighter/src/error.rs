//! Error types.
//!
//! Matching itself never fails: a missing partner is a plain
//! [`MatchResult::NoMatch`](crate::MatchResult::NoMatch). The errors here come from building a
//! matcher out of a configuration, from applying malformed edits to a
//! [`TextDocument`](crate::TextDocument), and from re-anchoring positions across revisions
//! (which the session absorbs).

use crate::buffer::RevisionId;
use crate::markers::MarkerKind;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced while loading or validating a [`MatcherConfig`](crate::MatcherConfig).
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    /// YAML parsing failed.
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    /// Reading the configuration file failed.
    Io(#[from] std::io::Error),

    #[error("no {0} markers configured")]
    /// One of the marker sets is empty.
    MissingMarkers(MarkerKind),

    #[error("empty {0} marker literal")]
    /// A marker literal is the empty string (or only whitespace).
    EmptyMarker(MarkerKind),

    #[error("marker '{0}' can be read as both a start and an end marker")]
    /// A literal of one set contains (or is) a literal of the other set.
    AmbiguousMarker(String),

    #[error("marker '{marker}' does not begin with the trigger character '{trigger}'")]
    /// A literal can never be reached from the trigger character.
    MarkerWithoutTrigger {
        /// The offending literal.
        marker: String,
        /// The configured trigger character.
        trigger: char,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by [`TextDocument`](crate::TextDocument) edits.
pub enum EditError {
    #[error("edit range {start}..{end} is out of bounds (document has {len} chars)")]
    /// The edited range does not lie inside the document.
    OutOfBounds {
        /// Range start (char offset).
        start: usize,
        /// Range end (char offset, exclusive).
        end: usize,
        /// Current document length in chars.
        len: usize,
    },

    #[error("delta expects {expected} chars before applying, document has {actual}")]
    /// A [`TextDelta`](crate::TextDelta) was recorded against a different document length.
    CharCountMismatch {
        /// `before_char_count` of the delta.
        expected: usize,
        /// Actual document length.
        actual: usize,
    },

    #[error("deleted text at {start} does not match the document")]
    /// A [`TextDeltaEdit`](crate::TextDeltaEdit)'s `deleted_text` is not what the document holds.
    DeletedTextMismatch {
        /// Start offset of the edit.
        start: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Reasons a [`Position`](crate::Position) cannot be re-anchored onto a revision.
pub enum TranslateError {
    #[error("position belongs to another document")]
    /// The position was taken from a different document.
    ForeignDocument,

    #[error("revision {from} is older than the retained history (oldest is {oldest})")]
    /// The history needed to replay edits has been discarded.
    RevisionTooOld {
        /// Revision of the position.
        from: RevisionId,
        /// Oldest revision still reachable.
        oldest: RevisionId,
    },

    #[error("revision {from} is newer than target revision {to}")]
    /// Positions only move forward in time.
    FutureRevision {
        /// Revision of the position.
        from: RevisionId,
        /// Target revision.
        to: RevisionId,
    },

    #[error("offset {offset} is outside revision {revision} ({len} chars)")]
    /// The offset never existed in its own revision.
    OffsetOutOfRange {
        /// The offending offset.
        offset: usize,
        /// The revision the offset claims to belong to.
        revision: RevisionId,
        /// Length of that revision in chars.
        len: usize,
    },
}
