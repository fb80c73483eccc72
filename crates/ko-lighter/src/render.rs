//! Render-facing results.
//!
//! The matcher produces data, not paint: a [`RenderRequest`] tells the host which ranges to mark
//! and with which named style. Clearing is a request with no spans. The host maps the style name
//! to an actual color.

use crate::buffer::RevisionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A contiguous char range `start..start + len` in one revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Revision the offsets refer to.
    pub revision: RevisionId,
    /// Start offset (inclusive), in chars.
    pub start: usize,
    /// Length in chars.
    pub len: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(revision: RevisionId, start: usize, len: usize) -> Self {
        Self {
            revision,
            start,
            len,
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// Whether two spans of the same revision share at least one position.
    ///
    /// Empty spans (blank lines) overlap a span that starts at the same offset.
    pub fn overlaps(&self, other: &Span) -> bool {
        if self.revision != other.revision {
            return false;
        }
        if self.start == other.start {
            return true;
        }
        self.start < other.end() && other.start < self.end()
    }
}

/// Named highlight style. One style is shared by both spans of a match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighlightStyle(pub String);

impl HighlightStyle {
    /// Create a style from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The style name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self::new("blue")
    }
}

impl fmt::Display for HighlightStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of matching at one caret position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    /// No marker under the caret, or no partner within reach.
    NoMatch,
    /// The caret's marker line and its partner line.
    Matched {
        /// Full line holding the marker at the caret.
        anchor: Span,
        /// Full line holding the counterpart marker.
        partner: Span,
    },
}

impl MatchResult {
    /// Whether a partner was found.
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }
}

/// What the host should paint after an event: nothing, or exactly two spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Revision the spans belong to; `None` when the session has no current position.
    pub revision: Option<RevisionId>,
    /// Zero or two spans.
    pub spans: Vec<Span>,
    /// Style shared by all spans.
    pub style: HighlightStyle,
}

impl RenderRequest {
    /// A request that removes every highlight.
    pub fn clear(style: HighlightStyle) -> Self {
        Self {
            revision: None,
            spans: Vec::new(),
            style,
        }
    }

    /// Build the request for a match result.
    pub fn from_match(result: MatchResult, style: HighlightStyle) -> Self {
        match result {
            MatchResult::NoMatch => Self::clear(style),
            MatchResult::Matched { anchor, partner } => Self {
                revision: Some(anchor.revision),
                spans: vec![anchor, partner],
                style,
            },
        }
    }

    /// Whether this request removes all highlights.
    pub fn is_clear(&self) -> bool {
        self.spans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::DocumentId;

    fn revision() -> RevisionId {
        RevisionId {
            document: DocumentId(7),
            version: 3,
        }
    }

    #[test]
    fn test_span_overlap() {
        let a = Span::new(revision(), 0, 10);
        let b = Span::new(revision(), 10, 5);
        let c = Span::new(revision(), 9, 1);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&a));

        let blank = Span::new(revision(), 10, 0);
        assert!(blank.overlaps(&b));
        assert!(!blank.overlaps(&a));
    }

    #[test]
    fn test_render_request_from_match() {
        let anchor = Span::new(revision(), 0, 14);
        let partner = Span::new(revision(), 20, 10);
        let request = RenderRequest::from_match(
            MatchResult::Matched { anchor, partner },
            HighlightStyle::default(),
        );
        assert_eq!(request.spans, vec![anchor, partner]);
        assert_eq!(request.revision, Some(revision()));
        assert_eq!(request.style.name(), "blue");

        let request = RenderRequest::from_match(MatchResult::NoMatch, HighlightStyle::new("x"));
        assert!(request.is_clear());
        assert_eq!(request.revision, None);
    }
}
