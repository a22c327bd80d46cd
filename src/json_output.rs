//! JSON lines output for front ends driving the enhancer
//!
//! When --json-progress is enabled, progress and per-file results are emitted
//! as JSON lines to stdout and all other console output is suppressed.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::image_processing::{BatchOutcome, BatchSummary};

/// Last progress emission timestamp (milliseconds since epoch)
/// Used for throttling progress updates to ~25 FPS (40ms between updates)
static LAST_PROGRESS_MS: AtomicU64 = AtomicU64::new(0);

const PROGRESS_INTERVAL_MS: u64 = 40;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JsonMessage {
    /// Progress update
    Progress {
        current: usize,
        total: usize,
        message: String,
    },
    /// Enhanced image written
    FileCompleted {
        input_path: String,
        output_path: String,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        note: Option<String>,
    },
    /// Input could not be read as an image
    FileSkipped { input_path: String, reason: String },
    /// Enhancing or writing failed
    FileFailed { input_path: String, error: String },
    /// Processing summary
    Summary {
        total_files: usize,
        succeeded: usize,
        skipped: usize,
        failed: usize,
        duration_secs: f64,
    },
    /// Batch-level failure, nothing was processed
    Error { message: String },
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl JsonMessage {
    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn from_outcome(outcome: &BatchOutcome) -> Self {
        match outcome {
            BatchOutcome::Succeeded { source, output, note } => Self::FileCompleted {
                input_path: display(source),
                output_path: display(output),
                note: note.clone(),
            },
            BatchOutcome::Skipped { source, reason } => Self::FileSkipped {
                input_path: display(source),
                reason: reason.clone(),
            },
            BatchOutcome::Failed { source, error } => Self::FileFailed {
                input_path: display(source),
                error: error.clone(),
            },
        }
    }

    pub fn from_summary(summary: &BatchSummary) -> Self {
        Self::Summary {
            total_files: summary.total,
            succeeded: summary.succeeded,
            skipped: summary.skipped,
            failed: summary.failed,
            duration_secs: summary.total_duration.as_secs_f64(),
        }
    }

    /// Create and emit progress message (throttled to ~25 FPS)
    ///
    /// The final progress (current == total) is always emitted.
    pub fn progress(current: usize, total: usize, message: impl Into<String>) {
        let now = now_ms();
        let last = LAST_PROGRESS_MS.load(Ordering::Relaxed);

        if now.saturating_sub(last) >= PROGRESS_INTERVAL_MS || current == total {
            LAST_PROGRESS_MS.store(now, Ordering::Relaxed);
            Self::Progress {
                current,
                total,
                message: message.into(),
            }
            .emit();
        }
    }

    pub fn outcome(outcome: &BatchOutcome) {
        Self::from_outcome(outcome).emit();
    }

    pub fn summary(summary: &BatchSummary) {
        Self::from_summary(summary).emit();
    }

    pub fn error(message: impl Into<String>) {
        Self::Error {
            message: message.into(),
        }
        .emit();
    }
}
