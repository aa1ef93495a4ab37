//! Batch state tracking.

use std::path::PathBuf;

/// What happened to one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostOutcome {
    /// At least one file was written and none failed.
    Downloaded(Vec<PathBuf>),
    /// Every file of the post was already on disk.
    Duplicate(PathBuf),
    /// Nothing to download: unsupported host or empty post.
    Skipped(String),
    /// Recorded in the failure log. `fatal` stops the batch.
    Failed { reason: String, fatal: bool },
}

/// Final report of a batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub attempted: u64,
    pub duplicates: u64,
    pub failed: u64,
    pub skipped: u64,
    /// `attempted - duplicates - failed - skipped`.
    pub succeeded: u64,
    /// Why the batch stopped early, if it did.
    pub aborted: Option<String>,
    /// Failure log written during the run.
    pub ledger: PathBuf,
}

/// Running counters of a batch.
#[derive(Debug, Default)]
pub struct BatchState {
    pub attempted: u64,
    pub duplicate_count: u64,
    pub failed_count: u64,
    pub skipped_count: u64,
    pub aborted: Option<String>,
}

impl BatchState {
    /// Count one finished post.
    pub fn record(&mut self, outcome: &PostOutcome) {
        self.attempted += 1;
        match outcome {
            PostOutcome::Downloaded(_) => {}
            PostOutcome::Duplicate(_) => self.duplicate_count += 1,
            PostOutcome::Skipped(_) => self.skipped_count += 1,
            PostOutcome::Failed { reason, fatal } => {
                self.failed_count += 1;
                if *fatal && self.aborted.is_none() {
                    self.aborted = Some(reason.clone());
                }
            }
        }
    }

    /// Posts downloaded so far.
    pub fn succeeded(&self) -> u64 {
        self.attempted - self.duplicate_count - self.failed_count - self.skipped_count
    }

    pub fn into_summary(self, ledger: PathBuf) -> BatchSummary {
        BatchSummary {
            attempted: self.attempted,
            duplicates: self.duplicate_count,
            failed: self.failed_count,
            skipped: self.skipped_count,
            succeeded: self.succeeded(),
            aborted: self.aborted,
            ledger,
        }
    }
}
