use ko_lighter::{
    ConfigError, MatchSession, MatcherConfig, RecognitionPolicy, Snapshot, TrackingMode,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ko-lighter-{}-{name}", std::process::id()))
}

#[test]
fn test_load_from_file() {
    let path = temp_path("custom.yaml");
    fs::write(
        &path,
        "policy: whole-line\n\
         tracking: negative\n\
         scan-limit: 200\n\
         style: ko-pair\n\
         start-markers: ['<!--koif:', '<!--koforeach:']\n\
         content-types: []\n",
    )
    .unwrap();

    let config = MatcherConfig::load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(config.policy, RecognitionPolicy::WholeLine);
    assert_eq!(config.tracking, TrackingMode::Negative);
    assert_eq!(config.scan_limit, Some(200));
    assert_eq!(config.style.name(), "ko-pair");
    assert_eq!(config.start_markers.len(), 2);
    assert!(config.supports_content_type("anything"));
}

#[test]
fn test_missing_file_is_io_error() {
    let result = MatcherConfig::load(temp_path("does-not-exist.yaml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[test]
fn test_custom_markers_drive_the_session() {
    let config = MatcherConfig::from_yaml_str(
        "trigger: '{'\n\
         start-markers: ['{{#if', '{{#each']\n\
         end-markers: ['{{/if}}', '{{/each}}']\n",
    )
    .unwrap();

    let buffer = Snapshot::from_lines(&["{{#each rows}}", "  {{#if ok}}x{{/if}}", "{{/each}}"]);
    let caret = buffer.position_at(0, 0);
    let mut session = MatchSession::new(config, buffer).unwrap();

    let request = session.on_caret_moved(caret);
    assert_eq!(request.spans.len(), 2);
    assert_eq!(request.spans[1].start, 36);
}

#[test]
fn test_invalid_marker_tables_are_rejected() {
    let no_trigger = MatcherConfig::from_yaml_str("start-markers: ['ko:']\n");
    assert!(matches!(
        no_trigger,
        Err(ConfigError::MarkerWithoutTrigger { .. })
    ));

    let ambiguous = MatcherConfig::from_yaml_str("start-markers: ['<!--/ko']\n");
    assert!(matches!(ambiguous, Err(ConfigError::AmbiguousMarker(_))));
}
