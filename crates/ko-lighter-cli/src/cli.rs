//! Command-line argument parsing
//!
//! Two modes:
//! - Caret mode (`--line`, optionally `--column`): what a host would highlight for that caret
//! - Report mode (default): every marker in the file with its partner, or `unmatched`

use clap::Parser;
use std::path::{Path, PathBuf};

/// Match Knockout comment directives in a markup file
#[derive(Parser, Debug)]
#[command(name = "ko-lighter", version, about = "Match Knockout comment directives")]
pub struct CliArgs {
    /// File to scan
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Put the caret on line N (1-based) and print what would be highlighted
    #[arg(short, long, value_name = "N")]
    pub line: Option<usize>,

    /// Caret column N (1-based, used with --line)
    #[arg(short, long, value_name = "N", default_value_t = 1, requires = "line")]
    pub column: usize,

    /// YAML matcher configuration
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Content type of FILE (inferred from the extension when omitted)
    #[arg(long, value_name = "TYPE")]
    pub content_type: Option<String>,

    /// Scan at most N lines past a marker's line
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Recognize markers anywhere on a line, ignoring whitespace
    #[arg(long)]
    pub whole_line: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl CliArgs {
    /// Explicit `--content-type`, or one derived from the file extension.
    pub fn content_type(&self) -> String {
        self.content_type
            .clone()
            .unwrap_or_else(|| content_type_for_path(&self.file).to_string())
    }

    /// The caret as 0-based `(line, column)`, if caret mode was requested.
    pub fn caret(&self) -> Option<(usize, usize)> {
        self.line
            .map(|line| (line.saturating_sub(1), self.column.saturating_sub(1)))
    }
}

fn content_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("cshtml" | "razor" | "vbhtml") => "razor",
        Some("html" | "htm" | "xhtml") => "html",
        _ => "text",
    }
}
