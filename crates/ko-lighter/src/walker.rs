//! Nesting walker.
//!
//! Given the position of a recognized marker, scan line by line away from it while keeping a
//! signed nesting counter, exactly like balancing parentheses:
//!
//! - the counter starts at `-1`, and counting the trigger marker brings it to `0`;
//! - a marker of the trigger's own kind opens a nested level (`+1`);
//! - an opposite marker closes a nested level when the counter is positive (`-1`), otherwise
//!   it is the partner and its line is returned.
//!
//! Forward walks look for the End matching a Start and read markers left to right; backward
//! walks look for the Start matching an End and read right to left. Lines are visited once, in
//! one direction, so the cost is proportional to the distance to the partner (or to `limit`).

use crate::buffer::TextBuffer;
use crate::markers::{LineMarker, MarkerKind, RecognitionPolicy, Recognizer};
use crate::position::LineColumn;
use crate::render::Span;

/// Scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the end of the buffer, looking for an End marker.
    Forward,
    /// Toward the start of the buffer, looking for a Start marker.
    Backward,
}

impl Direction {
    /// The marker kind that triggers a walk in this direction.
    pub fn trigger_kind(self) -> MarkerKind {
        match self {
            Direction::Forward => MarkerKind::Start,
            Direction::Backward => MarkerKind::End,
        }
    }
}

/// Finds the partner line of a marker in one buffer revision.
pub struct NestingWalker<'a, B: TextBuffer + ?Sized> {
    buffer: &'a B,
    recognizer: &'a Recognizer,
}

impl<'a, B: TextBuffer + ?Sized> NestingWalker<'a, B> {
    /// Create a walker over `buffer`.
    pub fn new(buffer: &'a B, recognizer: &'a Recognizer) -> Self {
        Self { buffer, recognizer }
    }

    /// The End line matching the Start marker at `origin`.
    ///
    /// With `limit`, at most that many lines past the origin line are examined.
    pub fn find_matching_end(&self, origin: LineColumn, limit: Option<usize>) -> Option<Span> {
        self.walk(origin, Direction::Forward, limit)
    }

    /// The Start line matching the End marker at `origin`.
    ///
    /// With `limit`, at most that many lines before the origin line are examined.
    pub fn find_matching_start(&self, origin: LineColumn, limit: Option<usize>) -> Option<Span> {
        self.walk(origin, Direction::Backward, limit)
    }

    /// Walk from the marker at `origin` in `direction`.
    ///
    /// Returns `None` when the buffer boundary or `limit` is reached first, and when the partner
    /// sits on the origin line itself (both full-line spans would be the same line).
    pub fn walk(
        &self,
        origin: LineColumn,
        direction: Direction,
        limit: Option<usize>,
    ) -> Option<Span> {
        let trigger = direction.trigger_kind();
        let origin_line = self.buffer.line(origin.line)?;

        let mut depth: isize = -1;
        // The trigger marker itself.
        balance(&mut depth, trigger, trigger);

        for marker in self.origin_remainder(&origin_line.text, origin.column, direction) {
            if balance(&mut depth, marker.kind, trigger) {
                tracing::trace!(line = origin.line, "marker closed on its own line");
                return None;
            }
        }

        let last_line = self.buffer.line_count().checked_sub(1)?;
        let mut line_number = origin.line;
        let mut scanned = 0usize;

        loop {
            line_number = match direction {
                Direction::Forward if line_number < last_line => line_number + 1,
                Direction::Backward if line_number > 0 => line_number - 1,
                _ => {
                    tracing::trace!(scanned, depth, "reached buffer boundary without a partner");
                    return None;
                }
            };

            scanned += 1;
            if limit.is_some_and(|limit| scanned > limit) {
                tracing::trace!(scanned, depth, "scan limit reached");
                return None;
            }

            let line = self.buffer.line(line_number)?;
            for marker in self.line_markers(&line.text, direction) {
                if balance(&mut depth, marker.kind, trigger) {
                    tracing::trace!(from = origin.line, to = line_number, scanned, "partner found");
                    return Some(line.span(self.buffer.revision()));
                }
            }
        }
    }

    /// Markers of a walked line, in walk order.
    ///
    /// Under the whole-line policy a line holding both kinds counts as the partner kind: End
    /// walking forward, Start walking backward.
    fn line_markers(&self, text: &str, direction: Direction) -> Vec<LineMarker> {
        match self.recognizer.policy() {
            RecognitionPolicy::OffsetExact => {
                let mut markers = self.recognizer.line_markers(text);
                if direction == Direction::Backward {
                    markers.reverse();
                }
                markers
            }
            RecognitionPolicy::WholeLine => {
                let partner = direction.trigger_kind().opposite();
                self.recognizer
                    .classify_line(text, partner)
                    .map(|kind| LineMarker { column: 0, kind })
                    .into_iter()
                    .collect()
            }
        }
    }

    /// Markers on the origin line that come after the trigger in walk order.
    fn origin_remainder(&self, text: &str, column: usize, direction: Direction) -> Vec<LineMarker> {
        let mut markers = match self.recognizer.policy() {
            RecognitionPolicy::OffsetExact => self.recognizer.line_markers(text),
            RecognitionPolicy::WholeLine => {
                // The whole line is the trigger; only a partner on it still counts.
                let partner = direction.trigger_kind().opposite();
                return self
                    .line_markers(text, direction)
                    .into_iter()
                    .filter(|marker| marker.kind == partner)
                    .collect();
            }
        };

        match direction {
            Direction::Forward => markers.retain(|marker| marker.column > column),
            Direction::Backward => {
                markers.retain(|marker| marker.column < column);
                markers.reverse();
            }
        }
        markers
    }
}

/// Count one marker; `true` when it is the partner of the trigger.
fn balance(depth: &mut isize, kind: MarkerKind, trigger: MarkerKind) -> bool {
    if kind == trigger {
        *depth += 1;
        false
    } else if *depth > 0 {
        *depth -= 1;
        false
    } else {
        true
    }
}
