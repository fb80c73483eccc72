//! Matcher configuration.
//!
//! The configuration is a plain value handed to each [`MatchSession`](crate::MatchSession);
//! nothing reads global settings. It can be built in code or loaded from YAML:
//!
//! ```yaml
//! enabled: true
//! policy: offset-exact        # or whole-line
//! scan-limit: 400             # lines; omit for the whole buffer
//! style: blue
//! start-markers: ["<!--koif:", "<!--koforeach:"]
//! end-markers: ["<!--/ko-->"]
//! content-types: [razor]
//! ```
//!
//! Omitted fields take their defaults (the Knockout marker table, offset-exact recognition,
//! `<` as trigger, no scan limit).

use crate::error::ConfigError;
use crate::markers::{
    DEFAULT_TRIGGER, KNOCKOUT_END_MARKER, KNOCKOUT_START_MARKERS, MarkerTable, RecognitionPolicy,
    Recognizer,
};
use crate::position::TrackingMode;
use crate::render::HighlightStyle;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything a [`MatchSession`](crate::MatchSession) needs to know besides the text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct MatcherConfig {
    /// When false, every caret move clears highlights without scanning.
    pub enabled: bool,
    /// Character every marker begins with; only carets on or just after it trigger matching.
    pub trigger: char,
    /// How lines are tested for markers.
    pub policy: RecognitionPolicy,
    /// Literals opening a region; all are interchangeable for nesting.
    pub start_markers: Vec<String>,
    /// Literals closing a region.
    pub end_markers: Vec<String>,
    /// Maximum number of lines to scan past the trigger line (`None` = unbounded).
    pub scan_limit: Option<usize>,
    /// How the caret is re-anchored across edits.
    pub tracking: TrackingMode,
    /// Style name attached to both highlighted lines.
    pub style: HighlightStyle,
    /// Content types a session may attach to; empty means any.
    pub content_types: Vec<String>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trigger: DEFAULT_TRIGGER,
            policy: RecognitionPolicy::default(),
            start_markers: KNOCKOUT_START_MARKERS.iter().map(|s| s.to_string()).collect(),
            end_markers: vec![KNOCKOUT_END_MARKER.to_string()],
            scan_limit: None,
            tracking: TrackingMode::default(),
            style: HighlightStyle::default(),
            content_types: vec!["razor".to_string(), "html".to_string()],
        }
    }
}

impl MatcherConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(path = %path.display(), "loaded matcher configuration");
        Ok(config)
    }

    /// Serialize to YAML.
    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check that the marker table and trigger form a usable recognizer.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.recognizer().map(|_| ())
    }

    /// Build the recognizer described by this configuration.
    pub fn recognizer(&self) -> Result<Recognizer, ConfigError> {
        let table = MarkerTable::new(self.start_markers.clone(), self.end_markers.clone())?;
        Recognizer::new(table, self.policy, self.trigger)
    }

    /// Whether a session may attach to a buffer of `content_type` (case-insensitive).
    pub fn supports_content_type(&self, content_type: &str) -> bool {
        self.content_types.is_empty()
            || self
                .content_types
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(content_type))
    }

    /// Flip `enabled` and return the new value.
    pub fn toggle_enabled(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }
}
