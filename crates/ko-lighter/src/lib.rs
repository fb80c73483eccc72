#![warn(missing_docs)]
//! KoLighter - Headless Matcher for Knockout Comment Directives
//!
//! # Overview
//!
//! `ko-lighter` highlights the partner of a Knockout containerless control-flow comment, the way
//! editors highlight the partner of a bracket. Put the caret on `<!--koif: visible-->` and the
//! line holding its `<!--/ko-->` lights up together with the caret's own line; nested regions are
//! balanced like parentheses.
//!
//! It does not paint anything. The host owns the text, forwards caret moves and buffer
//! revisions, and receives [`RenderRequest`]s naming which ranges to mark with which style.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  MatchSession (caret / buffer events)       │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  RenderRequest / MatchResult                │  ← Rendering Data
//! ├─────────────────────────────────────────────┤
//! │  NestingWalker (depth counting)             │  ← Matching
//! ├─────────────────────────────────────────────┤
//! │  Recognizer + MarkerTable                   │  ← Marker Detection
//! ├─────────────────────────────────────────────┤
//! │  TextBuffer / Snapshot / TextDocument       │  ← Revisioned Text
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use ko_lighter::{MatchSession, MatcherConfig, TextDocument};
//!
//! let mut document = TextDocument::new("<!--koif: ok-->\n  <b>hi</b>\n<!--/ko-->\n");
//! let mut session = MatchSession::new(MatcherConfig::default(), document.snapshot()).unwrap();
//!
//! // Caret on the opening marker: both marker lines are highlighted.
//! let caret = session.buffer().position_at(0, 0);
//! let request = session.on_caret_moved(caret);
//! assert_eq!(request.spans.len(), 2);
//!
//! // An edit produces a new revision; the caret follows it.
//! let next = document.insert(0, "<div>\n").unwrap();
//! session.on_buffer_changed(next);
//! assert_eq!(session.refresh().spans.len(), 2);
//! ```
//!
//! # Module Description
//!
//! - [`buffer`] - Revisioned text (`TextBuffer`, rope-backed `Snapshot`, `TextDocument`)
//! - [`delta`] - Edit deltas used to re-anchor positions across revisions
//! - [`markers`] - Marker table and recognizer
//! - [`walker`] - Nesting walker that finds a marker's partner line
//! - [`render`] - Spans, match results and render requests
//! - [`session`] - Reactive match session
//! - [`config`] - Matcher configuration (YAML loadable)
//!
//! # Coordinates
//!
//! Offsets are char offsets (Unicode scalar values) into one revision. Lines follow `ropey`'s
//! line breaks (`\n`, `\r\n`, `\r` and the Unicode separators); a span covers a line's text
//! without its line break.

pub mod buffer;
pub mod config;
pub mod delta;
pub mod error;
pub mod markers;
pub mod position;
pub mod render;
pub mod session;
pub mod walker;

pub use buffer::{
    DEFAULT_HISTORY_LIMIT, DocumentId, Line, RevisionId, Snapshot, TextBuffer, TextDocument,
};
pub use config::MatcherConfig;
pub use delta::{TextDelta, TextDeltaEdit};
pub use error::{ConfigError, EditError, TranslateError};
pub use markers::{
    DEFAULT_TRIGGER, KNOCKOUT_END_MARKER, KNOCKOUT_START_MARKERS, LineMarker, MarkerKind,
    MarkerTable, RecognitionPolicy, Recognizer,
};
pub use position::{LineColumn, Position, TrackingMode};
pub use render::{HighlightStyle, MatchResult, RenderRequest, Span};
pub use session::{MatchSession, SessionState};
pub use walker::{Direction, NestingWalker};
