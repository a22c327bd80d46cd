use std::path::PathBuf;
use std::time::Duration;

/// What happened to one batch item
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Enhanced image written to `output`; `note` carries non-fatal diagnostics
    Succeeded {
        source: PathBuf,
        output: PathBuf,
        note: Option<String>,
    },
    /// Input could not be decoded as an image
    Skipped { source: PathBuf, reason: String },
    /// Enhancement or writing failed
    Failed { source: PathBuf, error: String },
}

impl BatchOutcome {
    pub fn source(&self) -> &PathBuf {
        match self {
            BatchOutcome::Succeeded { source, .. }
            | BatchOutcome::Skipped { source, .. }
            | BatchOutcome::Failed { source, .. } => source,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BatchOutcome::Succeeded { .. })
    }

    /// Human-readable status line for logs
    pub fn status_line(&self) -> String {
        match self {
            BatchOutcome::Succeeded { source, output, note: None } => {
                format!("OK   {} -> {}", source.display(), output.display())
            }
            BatchOutcome::Succeeded { source, output, note: Some(note) } => {
                format!("OK   {} -> {} ({})", source.display(), output.display(), note)
            }
            BatchOutcome::Skipped { source, reason } => {
                format!("SKIP {}: {}", source.display(), reason)
            }
            BatchOutcome::Failed { source, error } => {
                format!("FAIL {}: {}", source.display(), error)
            }
        }
    }
}

/// Aggregate counts over a finished batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total_duration: Duration,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[BatchOutcome], total_duration: Duration) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            succeeded: 0,
            skipped: 0,
            failed: 0,
            total_duration,
        };

        for outcome in outcomes {
            match outcome {
                BatchOutcome::Succeeded { .. } => summary.succeeded += 1,
                BatchOutcome::Skipped { .. } => summary.skipped += 1,
                BatchOutcome::Failed { .. } => summary.failed += 1,
            }
        }

        summary
    }

    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.succeeded as f64 / self.total as f64) * 100.0
        }
    }

    pub fn average_duration(&self) -> Duration {
        if self.total == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.total as u32
        }
    }
}
