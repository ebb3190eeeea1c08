use crate::engine::RunSummary;
use crate::pipeline::FileOutcome;
use std::path::Path;

/// Trait for reporting run progress.
///
/// The CLI implements it with indicatif; tests use [`SilentReporter`].
/// All methods have default no-op implementations. With more than one job
/// the file callbacks arrive from worker threads in no particular order.
pub trait ProgressReporter: Send + Sync {
    fn on_run_start(&self, _roots: &[std::path::PathBuf]) {}
    fn on_file_start(&self, _path: &Path) {}
    fn on_file_done(&self, _outcome: &FileOutcome) {}
    fn on_walk_error(&self, _message: &str) {}
    fn on_run_complete(&self, _summary: &RunSummary) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
