//! Batch resizing of a directory tree.
//!
//! Walks an input directory for PNG and JPEG files (by extension), resizes
//! each one with the same [`BatchJob`] and writes the result under the output
//! directory, mirroring the input's relative layout.
//!
//! ## Parallel Processing
//!
//! Files are processed in parallel using [rayon](https://docs.rs/rayon). Each
//! worker owns its [`Image`] values, so no pixel buffer is shared between
//! threads; only the backend reference is. A failure on one file is recorded
//! in the [`BatchSummary`] and does not stop the others.
//!
//! ## Progress Events
//!
//! Callers can pass an [`mpsc::Sender`] to receive a [`BatchEvent`] per file as
//! it completes. The CLI drains these on a printer thread.

use crate::imaging::{
    Dimensions, Image, ImageBackend, ImageError, ImageFormat, OutputSettings, ResizeMode,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Input directory does not exist: {}", .0.display())]
    InputNotFound(PathBuf),
}

/// The resize applied to every file in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchJob {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub mode: ResizeMode,
    pub output: OutputSettings,
}

/// Progress reported while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    Processed {
        index: usize,
        source: PathBuf,
        output: PathBuf,
        dimensions: Dimensions,
    },
    Failed {
        index: usize,
        source: PathBuf,
        error: String,
    },
}

/// Outcome of a batch run, in input order.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.processed.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Find every file under `dir` whose extension names an editable format.
///
/// Results are sorted by path so batch output is deterministic.
pub fn discover_images(dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::InputNotFound(dir.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let editable = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
            .is_some();
        if editable {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Resize every image under `input_dir` into `output_dir`.
///
/// Only discovery and output directory creation can fail the whole batch;
/// per-file errors land in [`BatchSummary::failed`].
pub fn process_directory<B: ImageBackend>(
    backend: &B,
    input_dir: &Path,
    output_dir: &Path,
    job: &BatchJob,
    events: Option<mpsc::Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    let files = discover_images(input_dir)?;
    std::fs::create_dir_all(output_dir)?;
    debug!(
        input = %input_dir.display(),
        output = %output_dir.display(),
        count = files.len(),
        mode = %job.mode,
        "Starting batch"
    );
    if let Some(tx) = &events {
        tx.send(BatchEvent::Started { total: files.len() }).ok();
    }

    let results: Vec<(PathBuf, Result<Image<'_, B>, ImageError>)> = files
        .par_iter()
        .enumerate()
        .map(|(i, source)| {
            let index = i + 1;
            let result = process_one(backend, input_dir, output_dir, source, job);
            if let Some(tx) = &events {
                let event = match &result {
                    Ok(saved) => BatchEvent::Processed {
                        index,
                        source: source.clone(),
                        output: saved.path().to_path_buf(),
                        dimensions: saved.dimensions(),
                    },
                    Err(e) => BatchEvent::Failed {
                        index,
                        source: source.clone(),
                        error: e.to_string(),
                    },
                };
                tx.send(event).ok();
            }
            (source.clone(), result)
        })
        .collect();

    let mut summary = BatchSummary::default();
    for (source, result) in results {
        match result {
            Ok(saved) => summary.processed.push(saved.path().to_path_buf()),
            Err(e) => {
                warn!(path = %source.display(), error = %e, "Batch item failed");
                summary.failed.push((source, e.to_string()));
            }
        }
    }
    Ok(summary)
}

fn process_one<'a, B: ImageBackend>(
    backend: &'a B,
    input_dir: &Path,
    output_dir: &Path,
    source: &Path,
    job: &BatchJob,
) -> Result<Image<'a, B>, ImageError> {
    let relative_dir = source
        .parent()
        .and_then(|p| p.strip_prefix(input_dir).ok())
        .unwrap_or(Path::new(""));
    let target_dir = output_dir.join(relative_dir);
    std::fs::create_dir_all(&target_dir)?;

    let mut original = Image::new(backend, source)?.with_output_settings(job.output);
    let mut resized = original.resize_to(job.width, job.height, job.mode)?;
    resized.save(&target_dir, None)
}
