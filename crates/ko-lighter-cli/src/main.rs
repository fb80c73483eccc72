//! ko-lighter command line
//!
//! Runs the matcher over a file the way an editor would, without an editor.
//!
//! # Usage
//!
//! ```bash
//! # Every marker and its partner
//! cargo run -p ko-lighter-cli -- Views/Home/Index.cshtml
//!
//! # What would be highlighted with the caret on line 12, column 5
//! cargo run -p ko-lighter-cli -- Views/Home/Index.cshtml --line 12 --column 5 --json
//! ```

mod cli;
mod logging;

use anyhow::{Context, Result, bail};
use clap::Parser;
use cli::CliArgs;
use ko_lighter::{
    LineColumn, MarkerKind, MatchSession, MatcherConfig, NestingWalker, RecognitionPolicy,
    RenderRequest, Snapshot, Span, TextBuffer,
};
use serde_json::json;
use std::fs;

/// One marker occurrence in report mode; lines and columns are 1-based.
#[derive(Debug, Clone)]
struct MarkerReport {
    line: usize,
    column: usize,
    kind: MarkerKind,
    partner: Option<usize>,
}

fn main() -> Result<()> {
    logging::init();
    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => MatcherConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => MatcherConfig::default(),
    };
    if args.limit.is_some() {
        config.scan_limit = args.limit;
    }
    if args.whole_line {
        config.policy = RecognitionPolicy::WholeLine;
    }

    let text = fs::read_to_string(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let buffer = Snapshot::from_text(&text);

    let content_type = args.content_type();
    let Some(mut session) = MatchSession::for_content_type(config, &content_type, buffer)? else {
        bail!("content type '{content_type}' is not enabled (see `content-types` in the config)");
    };

    match args.caret() {
        Some((line, column)) => {
            let caret = session.buffer().position_at(line, column);
            let request = session.on_caret_moved(caret);
            print_request(session.buffer(), &request, args.json)?;
        }
        None => {
            let reports = report(&session);
            print_report(&reports, args.json)?;
        }
    }

    Ok(())
}

/// Every marker in the buffer with the line of its partner.
fn report(session: &MatchSession<Snapshot>) -> Vec<MarkerReport> {
    let buffer = session.buffer();
    let recognizer = session.recognizer();
    let walker = NestingWalker::new(buffer, recognizer);
    let limit = session.config().scan_limit;

    let mut reports = Vec::new();
    for line_number in 0..buffer.line_count() {
        let Some(line) = buffer.line(line_number) else {
            continue;
        };
        for marker in recognizer.line_markers(&line.text) {
            let origin = LineColumn::new(line_number, marker.column);
            let partner = match marker.kind {
                MarkerKind::Start => walker.find_matching_end(origin, limit),
                MarkerKind::End => walker.find_matching_start(origin, limit),
            };
            reports.push(MarkerReport {
                line: line_number + 1,
                column: marker.column + 1,
                kind: marker.kind,
                partner: partner.and_then(|span| line_of(buffer, &span)),
            });
        }
    }
    reports
}

fn line_of(buffer: &Snapshot, span: &Span) -> Option<usize> {
    buffer.line_of_offset(span.start).map(|line| line + 1)
}

fn print_request(buffer: &Snapshot, request: &RenderRequest, as_json: bool) -> Result<()> {
    let lines: Vec<usize> = request
        .spans
        .iter()
        .filter_map(|span| line_of(buffer, span))
        .collect();

    if as_json {
        let value = json!({
            "matched": !request.is_clear(),
            "lines": lines,
            "request": request,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    match lines.as_slice() {
        [anchor, partner] => println!("{anchor} <-> {partner} ({})", request.style),
        _ => println!("no match"),
    }
    Ok(())
}

fn print_report(reports: &[MarkerReport], as_json: bool) -> Result<()> {
    if as_json {
        let value: Vec<_> = reports
            .iter()
            .map(|report| {
                json!({
                    "line": report.line,
                    "column": report.column,
                    "kind": report.kind.to_string(),
                    "partner": report.partner,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for report in reports {
        let partner = report
            .partner
            .map_or_else(|| "unmatched".to_string(), |line| line.to_string());
        println!(
            "{}:{} {:<5} -> {}",
            report.line, report.column, report.kind, partner
        );
    }
    let unmatched = reports.iter().filter(|report| report.partner.is_none()).count();
    if unmatched > 0 {
        tracing::warn!(unmatched, "markers without a partner");
    }
    Ok(())
}
