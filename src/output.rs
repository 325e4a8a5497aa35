//! CLI output formatting.
//!
//! # Output Format
//!
//! ```text
//! CHANGED images/hero.jpg: stripped metadata, resized 3000x2000 -> 1600x1067
//! OK images/logo.png: ok (no changes needed)
//! ERROR images/broken.webp: Failed to decode WebP: ...
//!
//! Done. changed=1, ok=1, errors=1, total=3
//! ```
//!
//! In a dry run the changed lines read `CHANGED <path>: would ...`. A directory
//! without candidates prints `No images found in <dir>` and nothing else.
//!
//! # Architecture
//!
//! Each kind of output has a `format_*` function (returns `String` or
//! `Vec<String>`) for testability and a `print_*` wrapper that writes to
//! stdout. Format functions are pure: no I/O, no side effects.

use crate::process::{FileReport, FileStatus, Summary};
use std::path::Path;

pub fn format_report(report: &FileReport) -> String {
    let path = report.path.display();
    match &report.status {
        FileStatus::Changed(desc) | FileStatus::WouldChange(desc) => {
            format!("CHANGED {path}: {desc}")
        }
        FileStatus::Unchanged => format!("OK {path}: ok (no changes needed)"),
        FileStatus::Failed(msg) => format!("ERROR {path}: {msg}"),
    }
}

pub fn print_report(report: &FileReport) {
    println!("{}", format_report(report));
}

/// Blank separator line, then the totals.
pub fn format_summary(summary: &Summary) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "Done. changed={}, ok={}, errors={}, total={}",
            summary.changed, summary.unchanged, summary.failed, summary.total
        ),
    ]
}

pub fn print_summary(summary: &Summary) {
    for line in format_summary(summary) {
        println!("{line}");
    }
}

pub fn format_no_images(root: &Path) -> String {
    format!("No images found in {}", root.display())
}

pub fn print_no_images(root: &Path) {
    println!("{}", format_no_images(root));
}
