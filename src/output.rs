//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Info
//!
//! ```text
//! photo.jpg
//!     Format: JPEG
//!     Size: 800x600
//!     Editable: yes
//! ```
//!
//! ## Resize / Overlay
//!
//! ```text
//! Saved photo.jpg (400x300)
//!     Path: out/photo.jpg
//! ```
//!
//! ## Batch
//!
//! ```text
//! Resizing 3 images
//!     001 dawn.jpg → 400x300
//!     002 dusk.png → 400x400
//!     003 broken.jpg failed: Decode failed: ...
//! Processed 2 of 3 images, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::batch::{BatchEvent, BatchSummary};
use crate::imaging::{Image, ImageBackend};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based position as a zero-padded 3-digit index.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// File name of `path`, or the whole path when it has none.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Info
// ============================================================================

/// Format what a header read learned about an image.
pub fn format_image_info<B: ImageBackend>(image: &Image<'_, B>) -> Vec<String> {
    let format = match image.format() {
        Some(f) => f.to_string(),
        None => image.format_name().to_string(),
    };
    let editable = if image.format().is_some() { "yes" } else { "no" };
    vec![
        image.name().to_string(),
        format!("{}Format: {}", indent(1), format),
        format!("{}Size: {}", indent(1), image.dimensions()),
        format!("{}Editable: {}", indent(1), editable),
    ]
}

pub fn print_image_info<B: ImageBackend>(image: &Image<'_, B>) {
    for line in format_image_info(image) {
        println!("{}", line);
    }
}

// ============================================================================
// Resize / Overlay
// ============================================================================

/// Format the result of a single save (resize or overlay).
pub fn format_saved<B: ImageBackend>(image: &Image<'_, B>) -> Vec<String> {
    vec![
        format!("Saved {} ({})", image.name(), image.dimensions()),
        format!("{}Path: {}", indent(1), image.path().display()),
    ]
}

pub fn print_saved<B: ImageBackend>(image: &Image<'_, B>) {
    for line in format_saved(image) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => {
            let noun = if *total == 1 { "image" } else { "images" };
            vec![format!("Resizing {} {}", total, noun)]
        }
        BatchEvent::Processed {
            index,
            source,
            dimensions,
            ..
        } => vec![format!(
            "{}{} {} \u{2192} {}",
            indent(1),
            format_index(*index),
            display_name(source),
            dimensions
        )],
        BatchEvent::Failed {
            index,
            source,
            error,
        } => vec![format!(
            "{}{} {} failed: {}",
            indent(1),
            format_index(*index),
            display_name(source),
            error
        )],
    }
}

/// Format the closing line of a batch run.
pub fn format_batch_summary(summary: &BatchSummary) -> Vec<String> {
    let mut line = format!(
        "Processed {} of {} images",
        summary.processed.len(),
        summary.total()
    );
    if !summary.failed.is_empty() {
        line.push_str(&format!(", {} failed", summary.failed.len()));
    }
    vec![line]
}

pub fn print_batch_summary(summary: &BatchSummary) {
    for line in format_batch_summary(summary) {
        println!("{}", line);
    }
}
