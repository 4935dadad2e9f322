//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Derivation progress
//!
//! One line per finished task, streamed from the worker pool:
//!
//! ```text
//!     derived rome/colosseum.jpg
//!     FAILED  rome/forum.jpg: Failed to decode ...
//! ```
//!
//! ## Build summary
//!
//! ```text
//! Built 12 records into 5 galleries
//!     Pages: 12 single, 5 index, 5 feed
//!     Copied: 24 files
//!     Derived: 11 of 12 queued
//!
//! Failed derivations
//!     rome/forum.jpg: Failed to decode ...
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::process::ProcessEvent;
use crate::site::BuildSummary;
use std::path::Path;

/// Four spaces per level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Show `path` relative to `root` when it lies inside it.
fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

// ============================================================================
// Derivation progress
// ============================================================================

pub fn format_process_event(event: &ProcessEvent, site_root: &Path) -> Vec<String> {
    match event {
        ProcessEvent::Derived { source } => {
            vec![format!(
                "{}derived {}",
                indent(1),
                display_path(source, site_root)
            )]
        }
        ProcessEvent::Failed { source, error } => {
            vec![format!(
                "{}FAILED  {}: {}",
                indent(1),
                display_path(source, site_root),
                error
            )]
        }
    }
}

// ============================================================================
// Build summary
// ============================================================================

pub fn format_summary(summary: &BuildSummary, site_root: &Path) -> Vec<String> {
    let render = &summary.render;
    let mut lines = vec![
        format!(
            "Built {} records into {} galleries",
            summary.records, summary.galleries
        ),
        format!(
            "{}Pages: {} single, {} index, {} feed",
            indent(1),
            render.pages,
            render.indexes,
            render.feeds
        ),
        format!("{}Copied: {} files", indent(1), summary.copied),
        format!(
            "{}Derived: {} of {} queued",
            indent(1),
            summary.report.derived,
            render.queued
        ),
    ];

    if !summary.report.failures.is_empty() {
        lines.push(String::new());
        lines.push("Failed derivations".to_string());
        for failure in &summary.report.failures {
            lines.push(format!(
                "{}{}: {}",
                indent(1),
                display_path(&failure.source, site_root),
                failure.error
            ));
        }
    }
    lines
}

pub fn print_process_event(event: &ProcessEvent, site_root: &Path) {
    for line in format_process_event(event, site_root) {
        println!("{}", line);
    }
}

pub fn print_summary(summary: &BuildSummary, site_root: &Path) {
    for line in format_summary(summary, site_root) {
        println!("{}", line);
    }
}
