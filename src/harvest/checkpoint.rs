//! Per-batch persistence: one CSV workbook per batch, written atomically.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::info;

use crate::core::types::Review;

/// Artifact column order. Must match the field order of [`Review`].
const COLUMNS: [&str; 5] = ["author", "date", "rating", "review_text", "helpful_votes"];

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),

    #[error("could not encode batch rows: {0}")]
    Encode(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes each batch to its own `{prefix}_batch{N}.csv`.
///
/// The artifact is encoded fully in memory, written to a temp file in the
/// destination directory, then renamed over the final name. An interruption
/// at any point leaves either the complete artifact or nothing under that
/// name, never a partial file.
pub struct BatchCheckpointer {
    dir: PathBuf,
    prefix: String,
}

impl BatchCheckpointer {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Deterministic artifact name for a batch number.
    pub fn artifact_path(&self, batch_num: usize) -> PathBuf {
        self.dir
            .join(format!("{}_batch{}.csv", self.prefix, batch_num))
    }

    /// Persist one batch, in row order. Returns the artifact path.
    pub fn persist(&self, records: &[Review], batch_num: usize) -> Result<PathBuf, CheckpointError> {
        ensure_output_dir(&self.dir)?;

        let mut encoder = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        encoder.write_record(COLUMNS)?;
        for record in records {
            encoder.serialize(record)?;
        }
        let encoded = encoder
            .into_inner()
            .map_err(|e| CheckpointError::Io(e.into_error()))?;

        let target = self.artifact_path(batch_num);
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&encoded)?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Replace any existing artifact so same-prefix re-runs stay deterministic.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        tmp.persist(&target)
            .map_err(|e| CheckpointError::Io(e.error))?;

        info!(
            batch = batch_num,
            rows = records.len(),
            path = %target.display(),
            "batch checkpointed"
        );
        Ok(target)
    }
}

fn ensure_output_dir(dir: &Path) -> Result<(), CheckpointError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| CheckpointError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(CheckpointError::OutputDir(
                "path exists but is not a directory".into(),
            ));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| CheckpointError::OutputDir(e.to_string()))?;
    }
    Ok(())
}
