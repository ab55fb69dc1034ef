//! JSONL trajectory storage
//!
//! Appends exported training pairs to a JSONL file, one entry per pair,
//! tagged with the producing model, a timestamp, and whether the run
//! completed. Pairs from truncated runs go to a separate sibling file so
//! they never mix with completed-run samples.

use crate::error::{BraidError, BraidResult};
use crate::trajectory::exporter::TrainingPair;
use chrono::Utc;
use serde_json::json;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only JSONL sink for training pairs
pub struct TrajectorySink {
    path: PathBuf,
}

impl TrajectorySink {
    /// Create a sink writing to `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The file completed-run pairs are appended to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file truncated-run pairs are appended to: the configured file's
    /// name prefixed with `failed_`, in the same directory
    pub fn failed_path(&self) -> PathBuf {
        let name = match self.path.file_name() {
            Some(name) => {
                let mut prefixed = std::ffi::OsString::from("failed_");
                prefixed.push(name);
                prefixed
            }
            None => "failed_trajectories.jsonl".into(),
        };
        self.path.with_file_name(name)
    }

    /// Append pairs as JSON lines
    ///
    /// `completed` says whether the run ended on its own terms; it is
    /// recorded on every entry and selects which file receives them.
    pub fn append(&self, pairs: &[TrainingPair], model: &str, completed: bool) -> BraidResult<usize> {
        if pairs.is_empty() {
            return Ok(0);
        }

        let path = if completed {
            self.path.clone()
        } else {
            self.failed_path()
        };
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| self.storage_err(e))?;

        for pair in pairs {
            let mut line = serde_json::to_value(pair)?;
            line["model"] = json!(model);
            line["completed"] = json!(completed);
            line["timestamp"] = json!(Utc::now().to_rfc3339());
            writeln!(file, "{}", serde_json::to_string(&line)?)
                .map_err(|e| self.storage_err(e))?;
        }

        tracing::info!(pairs = pairs.len(), completed, path = %path.display(), "saved training pairs");
        Ok(pairs.len())
    }

    fn storage_err(&self, err: std::io::Error) -> BraidError {
        BraidError::storage(err.to_string(), Some(self.path.display().to_string()))
    }
}
