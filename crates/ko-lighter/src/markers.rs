//! Marker recognition.
//!
//! A marker is a literal such as `<!--koif:` (opens a directive region) or `<!--/ko-->` (closes
//! one). Recognition works on a single line of text and comes in two policies:
//!
//! - [`RecognitionPolicy::OffsetExact`]: a marker is recognized only when its literal begins at
//!   exactly the given column. Case- and whitespace-sensitive.
//! - [`RecognitionPolicy::WholeLine`]: whitespace is stripped from the line and the line is
//!   tested for containment of any literal. The column is ignored.
//!
//! Every Start literal belongs to the same category: any Start balances any End.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The character every marker literal begins with.
pub const DEFAULT_TRIGGER: char = '<';

/// Knockout containerless control-flow openers.
pub const KNOCKOUT_START_MARKERS: [&str; 5] = [
    "<!--koif:",
    "<!--koifnot:",
    "<!--kotemplate:",
    "<!--koforeach:",
    "<!--kolet:",
];

/// Knockout containerless closer.
pub const KNOCKOUT_END_MARKER: &str = "<!--/ko-->";

/// Whether a marker opens or closes a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerKind {
    /// Opens a region.
    Start,
    /// Closes a region.
    End,
}

impl MarkerKind {
    /// The kind that balances this one.
    pub fn opposite(self) -> Self {
        match self {
            MarkerKind::Start => MarkerKind::End,
            MarkerKind::End => MarkerKind::Start,
        }
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            MarkerKind::Start => "start",
            MarkerKind::End => "end",
        })
    }
}

/// How a line is tested for markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognitionPolicy {
    /// Strip whitespace, then test containment anywhere on the line.
    WholeLine,
    /// Compare the literal character by character from an exact column.
    #[default]
    OffsetExact,
}

/// Ordered Start and End literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerTable {
    start: Vec<String>,
    end: Vec<String>,
}

impl MarkerTable {
    /// Build a table, rejecting empty sets, blank literals and literals that could be read as
    /// both kinds.
    pub fn new<S, E>(start: S, end: E) -> Result<Self, ConfigError>
    where
        S: IntoIterator,
        S::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        let start: Vec<String> = start.into_iter().map(Into::into).collect();
        let end: Vec<String> = end.into_iter().map(Into::into).collect();

        for (kind, literals) in [(MarkerKind::Start, &start), (MarkerKind::End, &end)] {
            if literals.is_empty() {
                return Err(ConfigError::MissingMarkers(kind));
            }
            if literals
                .iter()
                .any(|literal| literal.chars().all(char::is_whitespace))
            {
                return Err(ConfigError::EmptyMarker(kind));
            }
        }

        // Containment in either direction would let one occurrence satisfy both kinds, under
        // either policy.
        for opener in &start {
            for closer in &end {
                let (opener_compact, closer_compact) = (compact(opener), compact(closer));
                if opener_compact.contains(&closer_compact) || closer_compact.contains(&opener_compact)
                {
                    let ambiguous = if opener.len() <= closer.len() { opener } else { closer };
                    return Err(ConfigError::AmbiguousMarker(ambiguous.clone()));
                }
            }
        }

        Ok(Self { start, end })
    }

    /// The Knockout table: `koif`, `koifnot`, `kotemplate`, `koforeach`, `kolet` and `/ko`.
    pub fn knockout() -> Self {
        Self {
            start: KNOCKOUT_START_MARKERS.iter().map(|s| s.to_string()).collect(),
            end: vec![KNOCKOUT_END_MARKER.to_string()],
        }
    }

    /// Start literals in configuration order.
    pub fn start_markers(&self) -> &[String] {
        &self.start
    }

    /// End literals in configuration order.
    pub fn end_markers(&self) -> &[String] {
        &self.end
    }

    /// Literals of one kind.
    pub fn markers(&self, kind: MarkerKind) -> &[String] {
        match kind {
            MarkerKind::Start => &self.start,
            MarkerKind::End => &self.end,
        }
    }
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self::knockout()
    }
}

/// One marker occurrence on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMarker {
    /// Column (in chars) where the literal begins; `0` for whole-line classification.
    pub column: usize,
    /// Kind of the literal.
    pub kind: MarkerKind,
}

/// A [`MarkerTable`] bound to a policy and a trigger character.
#[derive(Debug, Clone)]
pub struct Recognizer {
    table: MarkerTable,
    policy: RecognitionPolicy,
    trigger: char,
    compact_start: Vec<String>,
    compact_end: Vec<String>,
}

impl Recognizer {
    /// Create a recognizer; every literal must begin with `trigger`.
    pub fn new(
        table: MarkerTable,
        policy: RecognitionPolicy,
        trigger: char,
    ) -> Result<Self, ConfigError> {
        if let Some(marker) = table
            .start
            .iter()
            .chain(&table.end)
            .find(|literal| !literal.starts_with(trigger))
        {
            return Err(ConfigError::MarkerWithoutTrigger {
                marker: marker.clone(),
                trigger,
            });
        }

        Ok(Self {
            compact_start: table.start.iter().map(|s| compact(s)).collect(),
            compact_end: table.end.iter().map(|s| compact(s)).collect(),
            table,
            policy,
            trigger,
        })
    }

    /// Knockout markers, offset-exact, triggered by `<`.
    pub fn knockout() -> Self {
        Self::knockout_with_policy(RecognitionPolicy::OffsetExact)
    }

    /// Knockout markers under the given policy.
    pub fn knockout_with_policy(policy: RecognitionPolicy) -> Self {
        let table = MarkerTable::knockout();
        Self {
            compact_start: table.start.iter().map(|s| compact(s)).collect(),
            compact_end: table.end.iter().map(|s| compact(s)).collect(),
            table,
            policy,
            trigger: DEFAULT_TRIGGER,
        }
    }

    /// The active policy.
    pub fn policy(&self) -> RecognitionPolicy {
        self.policy
    }

    /// The trigger character.
    pub fn trigger(&self) -> char {
        self.trigger
    }

    /// Whether a Start marker is at `column` (offset-exact) or on the line (whole-line).
    pub fn is_start(&self, line: &str, column: usize) -> bool {
        self.is_kind(MarkerKind::Start, line, column)
    }

    /// Whether an End marker is at `column` (offset-exact) or on the line (whole-line).
    pub fn is_end(&self, line: &str, column: usize) -> bool {
        self.is_kind(MarkerKind::End, line, column)
    }

    /// Start is tested before End.
    pub fn recognize(&self, line: &str, column: usize) -> Option<MarkerKind> {
        if self.is_start(line, column) {
            Some(MarkerKind::Start)
        } else if self.is_end(line, column) {
            Some(MarkerKind::End)
        } else {
            None
        }
    }

    /// Marker occurrences of a line, left to right.
    ///
    /// Offset-exact: every trigger column where a literal begins. Whole-line: at most one
    /// occurrence classifying the line, End before Start.
    pub fn line_markers(&self, line: &str) -> Vec<LineMarker> {
        match self.policy {
            RecognitionPolicy::OffsetExact => line
                .char_indices()
                .enumerate()
                .filter(|(_, (_, c))| *c == self.trigger)
                .filter_map(|(column, (byte, _))| {
                    let rest = &line[byte..];
                    let kind = if self.table.end.iter().any(|lit| rest.starts_with(lit.as_str())) {
                        MarkerKind::End
                    } else if self.table.start.iter().any(|lit| rest.starts_with(lit.as_str())) {
                        MarkerKind::Start
                    } else {
                        return None;
                    };
                    Some(LineMarker { column, kind })
                })
                .collect(),
            RecognitionPolicy::WholeLine => self
                .classify_line(line, MarkerKind::End)
                .map(|kind| LineMarker { column: 0, kind })
                .into_iter()
                .collect(),
        }
    }

    /// Whole-line classification of `line`, testing `first` before its opposite.
    ///
    /// A line holding both kinds is read as `first`. Columns play no part.
    pub fn classify_line(&self, line: &str, first: MarkerKind) -> Option<MarkerKind> {
        let text = compact(line);
        [first, first.opposite()]
            .into_iter()
            .find(|&kind| contains_any(&text, self.compact_markers(kind)))
    }

    fn compact_markers(&self, kind: MarkerKind) -> &[String] {
        match kind {
            MarkerKind::Start => &self.compact_start,
            MarkerKind::End => &self.compact_end,
        }
    }

    fn is_kind(&self, kind: MarkerKind, line: &str, column: usize) -> bool {
        match self.policy {
            RecognitionPolicy::OffsetExact => {
                let Some(byte) = byte_offset(line, column) else {
                    return false;
                };
                let rest = &line[byte..];
                self.table
                    .markers(kind)
                    .iter()
                    .any(|literal| rest.starts_with(literal.as_str()))
            }
            RecognitionPolicy::WholeLine => {
                contains_any(&compact(line), self.compact_markers(kind))
            }
        }
    }
}

impl Default for Recognizer {
    fn default() -> Self {
        Self::knockout()
    }
}

/// Byte index of char `column`; `column == char count` maps to the end of the string.
fn byte_offset(text: &str, column: usize) -> Option<usize> {
    text.char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .nth(column)
}

fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn contains_any(text: &str, literals: &[String]) -> bool {
    literals.iter().any(|literal| text.contains(literal.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_exact_requires_exact_column() {
        let recognizer = Recognizer::knockout();
        let line = "  <!--koif: visible-->";

        assert!(recognizer.is_start(line, 2));
        assert!(!recognizer.is_start(line, 0));
        assert!(!recognizer.is_start(line, 3));
        assert!(!recognizer.is_end(line, 2));
    }

    #[test]
    fn test_offset_exact_is_whitespace_and_case_sensitive() {
        let recognizer = Recognizer::knockout();
        assert!(!recognizer.is_start("< !--koif: x-->", 0));
        assert!(!recognizer.is_start("<!--KOIF: x-->", 0));
        assert!(!recognizer.is_end("<!-- /ko -->", 0));
    }

    #[test]
    fn test_short_remainder_does_not_match() {
        let recognizer = Recognizer::knockout();
        assert!(!recognizer.is_end("<!--/ko", 0));
        assert!(!recognizer.is_end("<!--/ko-->", 1));
        assert!(!recognizer.is_start("abc", 3));
        assert!(!recognizer.is_start("abc", 42));
    }

    #[test]
    fn test_whole_line_ignores_whitespace_and_column() {
        let recognizer = Recognizer::knockout_with_policy(RecognitionPolicy::WholeLine);
        assert!(recognizer.is_end("<!-- /ko -->", 0));
        assert!(recognizer.is_start("<div>< !-- koforeach: items --></div>", 99));
        assert!(recognizer.is_start("<!-- ko if: x -->", 0));
        assert!(!Recognizer::knockout().is_start("<!-- ko if: x -->", 0));
        assert!(!recognizer.is_start("<!--ko-if: x-->", 0));
    }

    #[test]
    fn test_every_start_literal_is_recognized() {
        let recognizer = Recognizer::knockout();
        for literal in KNOCKOUT_START_MARKERS {
            let line = format!("{literal} x -->");
            assert_eq!(recognizer.recognize(&line, 0), Some(MarkerKind::Start));
        }
        assert_eq!(recognizer.recognize("<!--/ko-->", 0), Some(MarkerKind::End));
        assert_eq!(recognizer.recognize("<div>", 0), None);
    }

    #[test]
    fn test_line_markers_offset_exact_in_order() {
        let recognizer = Recognizer::knockout();
        let markers = recognizer.line_markers("<li><!--kolet: a--><b><!--/ko--></li>");
        assert_eq!(
            markers,
            vec![
                LineMarker {
                    column: 4,
                    kind: MarkerKind::Start
                },
                LineMarker {
                    column: 22,
                    kind: MarkerKind::End
                },
            ]
        );
    }

    #[test]
    fn test_line_markers_whole_line_prefers_end() {
        let recognizer = Recognizer::knockout_with_policy(RecognitionPolicy::WholeLine);
        let markers = recognizer.line_markers("<!--koif: a--> x <!--/ko-->");
        assert_eq!(
            markers,
            vec![LineMarker {
                column: 0,
                kind: MarkerKind::End
            }]
        );
        assert!(recognizer.line_markers("plain").is_empty());
    }

    #[test]
    fn test_classify_line_honors_preferred_kind() {
        let recognizer = Recognizer::knockout_with_policy(RecognitionPolicy::WholeLine);
        let mixed = "<!--koif: a--> x <!--/ko-->";
        assert_eq!(
            recognizer.classify_line(mixed, MarkerKind::End),
            Some(MarkerKind::End)
        );
        assert_eq!(
            recognizer.classify_line(mixed, MarkerKind::Start),
            Some(MarkerKind::Start)
        );
        assert_eq!(
            recognizer.classify_line("<!-- koif: a -->", MarkerKind::End),
            Some(MarkerKind::Start)
        );
        assert_eq!(recognizer.classify_line("plain", MarkerKind::Start), None);
    }

    #[test]
    fn test_multibyte_columns() {
        let recognizer = Recognizer::knockout();
        let line = "你好<!--/ko-->";
        assert!(recognizer.is_end(line, 2));
        assert_eq!(recognizer.line_markers(line)[0].column, 2);
    }

    #[test]
    fn test_table_validation() {
        assert!(matches!(
            MarkerTable::new(Vec::<String>::new(), ["<x>"]),
            Err(ConfigError::MissingMarkers(MarkerKind::Start))
        ));
        assert!(matches!(
            MarkerTable::new(["<a", " "], ["<b"]),
            Err(ConfigError::EmptyMarker(MarkerKind::Start))
        ));
        assert!(matches!(
            MarkerTable::new(["<!--"], ["<!--/ko-->"]),
            Err(ConfigError::AmbiguousMarker(literal)) if literal == "<!--"
        ));
        assert!(MarkerTable::new(["<!--koif:"], ["<!--/ko-->"]).is_ok());
    }

    #[test]
    fn test_literals_must_begin_with_trigger() {
        let table = MarkerTable::new(["{{#if"], ["{{/if}}"]).unwrap();
        assert!(matches!(
            Recognizer::new(table.clone(), RecognitionPolicy::OffsetExact, '<'),
            Err(ConfigError::MarkerWithoutTrigger { trigger: '<', .. })
        ));
        let recognizer = Recognizer::new(table, RecognitionPolicy::OffsetExact, '{').unwrap();
        assert!(recognizer.is_start("{{#if cond}}", 0));
        assert!(recognizer.is_end("{{/if}}", 0));
    }
}
