//! Match session: the entry point a host editor drives.
//!
//! A host forwards two events and paints what comes back:
//!
//! - [`MatchSession::on_caret_moved`] returns the [`RenderRequest`] for the new caret;
//! - [`MatchSession::on_buffer_changed`] hands over the next revision, re-anchoring the last
//!   caret onto it. [`MatchSession::refresh`] recomputes highlights afterwards if the host needs
//!   them (e.g. after a layout pass).
//!
//! The session keeps the current buffer, the last caret position and the configuration. It
//! never performs I/O and never scans on its own initiative.
//!
//! # Example
//!
//! ```rust
//! use ko_lighter::{MatchSession, MatcherConfig, Snapshot};
//!
//! let buffer = Snapshot::from_lines(&["<!--koif: x-->", "text", "<!--/ko-->"]);
//! let caret = buffer.position_at(0, 0);
//! let mut session = MatchSession::new(MatcherConfig::default(), buffer).unwrap();
//!
//! let request = session.on_caret_moved(caret);
//! assert_eq!(request.spans.len(), 2);
//! ```

use crate::buffer::TextBuffer;
use crate::config::MatcherConfig;
use crate::error::ConfigError;
use crate::markers::{MarkerKind, Recognizer};
use crate::position::{LineColumn, Position};
use crate::render::{MatchResult, RenderRequest};
use crate::walker::NestingWalker;

/// Whether the session currently tracks a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No usable caret position; nothing is highlighted.
    Idle,
    /// Last known caret, anchored to the session's current revision.
    Armed(Position),
}

/// Reactive matcher for one buffer.
#[derive(Debug)]
pub struct MatchSession<B: TextBuffer> {
    buffer: B,
    config: MatcherConfig,
    recognizer: Recognizer,
    state: SessionState,
}

impl<B: TextBuffer> MatchSession<B> {
    /// Create a session over `buffer`.
    pub fn new(config: MatcherConfig, buffer: B) -> Result<Self, ConfigError> {
        let recognizer = config.recognizer()?;
        Ok(Self {
            buffer,
            config,
            recognizer,
            state: SessionState::Idle,
        })
    }

    /// Create a session only if `content_type` is one the configuration supports.
    pub fn for_content_type(
        config: MatcherConfig,
        content_type: &str,
        buffer: B,
    ) -> Result<Option<Self>, ConfigError> {
        if !config.supports_content_type(content_type) {
            tracing::debug!(content_type, "content type not supported, no session attached");
            return Ok(None);
        }
        Self::new(config, buffer).map(Some)
    }

    /// The current buffer revision.
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// The configuration in effect.
    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// The recognizer built from the configuration.
    pub fn recognizer(&self) -> &Recognizer {
        &self.recognizer
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Last known caret position, if any.
    pub fn anchor(&self) -> Option<Position> {
        match self.state {
            SessionState::Idle => None,
            SessionState::Armed(position) => Some(position),
        }
    }

    /// Whether matching is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Enable or disable matching. Disabling drops the anchor.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
        if !enabled {
            self.state = SessionState::Idle;
        }
    }

    /// Flip the enabled flag and return the new value.
    pub fn toggle_enabled(&mut self) -> bool {
        let enabled = !self.config.enabled;
        self.set_enabled(enabled);
        enabled
    }

    /// Bound walks to `limit` lines past the trigger line (e.g. the visible line count).
    pub fn set_scan_limit(&mut self, limit: Option<usize>) {
        self.config.scan_limit = limit;
    }

    /// React to a caret move.
    ///
    /// The position may come from an older revision; it is re-anchored first, and a position
    /// that cannot be re-anchored leaves the session idle.
    pub fn on_caret_moved(&mut self, position: Position) -> RenderRequest {
        if !self.config.enabled {
            self.state = SessionState::Idle;
            return self.clear();
        }

        match self.buffer.translate(position, self.config.tracking) {
            Ok(position) => {
                self.state = SessionState::Armed(position);
                self.render(position)
            }
            Err(err) => {
                tracing::debug!(%err, "caret could not be re-anchored");
                self.state = SessionState::Idle;
                self.clear()
            }
        }
    }

    /// Adopt a new buffer revision.
    ///
    /// The anchor is moved onto `buffer`; if that fails the session becomes idle until the next
    /// caret move. A buffer of the current revision is ignored.
    pub fn on_buffer_changed(&mut self, buffer: B) {
        if buffer.revision() == self.buffer.revision() {
            return;
        }

        if let SessionState::Armed(position) = self.state {
            self.state = match buffer.translate(position, self.config.tracking) {
                Ok(position) => SessionState::Armed(position),
                Err(err) => {
                    tracing::debug!(%err, "anchor lost on buffer change");
                    SessionState::Idle
                }
            };
        }

        tracing::trace!(revision = %buffer.revision(), state = ?self.state, "buffer changed");
        self.buffer = buffer;
    }

    /// Recompute the render request for the current anchor.
    pub fn refresh(&self) -> RenderRequest {
        match self.state {
            SessionState::Armed(position) if self.config.enabled => self.render(position),
            _ => self.clear(),
        }
    }

    /// Match at a position of the current revision.
    ///
    /// Two characters can trigger: the one under the caret and the one just before it. The first
    /// of them that holds the trigger character and begins a recognized marker decides the
    /// result. A trigger character under the caret that begins no marker does not stop the
    /// search: the character before the caret is still tried, so a caret placed right after a
    /// marker's leading trigger matches even when the next character is a trigger too (as in
    /// `{{/if}}` with `{` as trigger).
    pub fn match_at(&self, position: Position) -> MatchResult {
        if position.revision != self.buffer.revision() {
            return MatchResult::NoMatch;
        }

        let candidates = [Some(position.offset), position.offset.checked_sub(1)];
        for offset in candidates.into_iter().flatten() {
            if self.buffer.char_at(offset) != Some(self.recognizer.trigger()) {
                continue;
            }
            let Some(line) = self.buffer.line_containing(offset) else {
                continue;
            };
            let origin = LineColumn::new(line.number, offset - line.start);
            let Some(kind) = self.recognizer.recognize(&line.text, origin.column) else {
                continue;
            };

            let walker = NestingWalker::new(&self.buffer, &self.recognizer);
            let partner = match kind {
                MarkerKind::Start => walker.find_matching_end(origin, self.config.scan_limit),
                MarkerKind::End => walker.find_matching_start(origin, self.config.scan_limit),
            };

            let result = match partner {
                Some(partner) => MatchResult::Matched {
                    anchor: line.span(self.buffer.revision()),
                    partner,
                },
                None => MatchResult::NoMatch,
            };
            if let MatchResult::Matched { anchor, partner } = &result {
                debug_assert!(!anchor.overlaps(partner), "highlighted lines must be distinct");
            }

            tracing::debug!(
                line = origin.line,
                column = origin.column,
                %kind,
                matched = result.is_match(),
                "marker under caret"
            );
            return result;
        }

        MatchResult::NoMatch
    }

    fn render(&self, position: Position) -> RenderRequest {
        RenderRequest::from_match(self.match_at(position), self.config.style.clone())
    }

    fn clear(&self) -> RenderRequest {
        RenderRequest::clear(self.config.style.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Snapshot, TextDocument};

    fn session(lines: &[&str]) -> MatchSession<Snapshot> {
        MatchSession::new(MatcherConfig::default(), Snapshot::from_lines(lines)).unwrap()
    }

    #[test]
    fn test_caret_just_after_trigger_matches() {
        let mut session = session(&["<!--koif: x-->", "<!--/ko-->"]);
        let caret = session.buffer().position_at(1, 1);
        let request = session.on_caret_moved(caret);
        assert_eq!(request.spans.len(), 2);
        assert_eq!(request.spans[0].start, 15);
        assert_eq!(request.spans[1].start, 0);
    }

    #[test]
    fn test_trigger_without_marker_falls_back_to_previous_char() {
        let config = MatcherConfig {
            trigger: '{',
            start_markers: vec!["{{#if".to_string()],
            end_markers: vec!["{{/if}}".to_string()],
            ..MatcherConfig::default()
        };
        let buffer = Snapshot::from_lines(&["{{#if ok}}", "x", "{{/if}}"]);
        let session = MatchSession::new(config, buffer).unwrap();

        // The caret sits on the second '{', which begins no marker; the first one does.
        let caret = session.buffer().position_at(2, 1);
        let result = session.match_at(caret);
        assert!(result.is_match());
        let MatchResult::Matched { anchor, partner } = result else {
            unreachable!();
        };
        assert!(!anchor.overlaps(&partner));
        assert_eq!((anchor.start, partner.start), (13, 0));
    }

    #[test]
    fn test_caret_inside_marker_does_not_trigger() {
        let mut session = session(&["<!--koif: x-->", "<!--/ko-->"]);
        let caret = session.buffer().position_at(0, 5);
        assert!(session.on_caret_moved(caret).is_clear());
        assert_eq!(session.state(), SessionState::Armed(caret));
    }

    #[test]
    fn test_caret_past_end_of_buffer() {
        let mut session = session(&["<!--koif: x-->", "<!--/ko-->"]);
        let end = session.buffer().char_count();
        let caret = Position::new(session.buffer().revision(), end);
        assert!(session.on_caret_moved(caret).is_clear());

        let beyond = Position::new(session.buffer().revision(), end + 1);
        assert!(session.on_caret_moved(beyond).is_clear());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_disabled_session_goes_idle() {
        let mut session = session(&["<!--koif: x-->", "<!--/ko-->"]);
        let caret = session.buffer().position_at(0, 0);
        assert!(!session.on_caret_moved(caret).is_clear());

        assert!(!session.toggle_enabled());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.on_caret_moved(caret).is_clear());
        assert!(session.refresh().is_clear());

        assert!(session.toggle_enabled());
        assert!(session.refresh().is_clear());
        assert!(!session.on_caret_moved(caret).is_clear());
    }

    #[test]
    fn test_buffer_change_reanchors() {
        let mut document = TextDocument::new("<!--koif: x-->\n<!--/ko-->");
        let mut session = MatchSession::new(MatcherConfig::default(), document.snapshot()).unwrap();
        let caret = session.buffer().position_at(1, 0);
        assert!(!session.on_caret_moved(caret).is_clear());

        let next = document.insert(0, "<div>\n").unwrap();
        session.on_buffer_changed(next.clone());
        assert_eq!(session.anchor(), Some(next.position_at(2, 0)));

        let request = session.refresh();
        assert_eq!(request.revision, Some(next.revision()));
        assert_eq!(request.spans[1].start, 6);
    }

    #[test]
    fn test_content_type_gate() {
        let buffer = Snapshot::from_text("");
        let attached =
            MatchSession::for_content_type(MatcherConfig::default(), "rust", buffer.clone())
                .unwrap();
        assert!(attached.is_none());

        let attached =
            MatchSession::for_content_type(MatcherConfig::default(), "razor", buffer).unwrap();
        assert!(attached.is_some());
    }
}
