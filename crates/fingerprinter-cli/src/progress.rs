use colored::*;
use fingerprinter_core::{FileOutcome, ProgressReporter, RunSummary};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Spinner with a running count while files are fingerprinted, then a
/// coloured summary on stderr.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
    done: AtomicUsize,
    saved: AtomicUsize,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            done: AtomicUsize::new(0),
            saved: AtomicUsize::new(0),
        }
    }

    fn bar(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn finish_bar(&self) {
        if let Some(pb) = self.bar().take() {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_run_start(&self, roots: &[PathBuf]) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{elapsed}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(format!("Walking {} root(s)...", roots.len()));
        pb.enable_steady_tick(Duration::from_millis(80));
        *self.bar() = Some(pb);
    }

    fn on_file_start(&self, path: &Path) {
        if let Some(pb) = self.bar().as_ref() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            pb.set_message(format!(
                "{} done, {} saved | {}",
                self.done.load(Ordering::Relaxed),
                self.saved.load(Ordering::Relaxed),
                name
            ));
        }
    }

    fn on_file_done(&self, outcome: &FileOutcome) {
        self.done.fetch_add(1, Ordering::Relaxed);
        if outcome.is_persisted() {
            self.saved.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn on_walk_error(&self, message: &str) {
        if let Some(pb) = self.bar().as_ref() {
            pb.println(format!("  {} {}", "!".yellow(), message));
        }
    }

    fn on_run_complete(&self, summary: &RunSummary) {
        self.finish_bar();
        eprintln!(
            "  {} Fingerprinted {} files in {:.2}s",
            "✓".green(),
            summary.files_visited,
            summary.duration.as_secs_f64()
        );
        eprintln!(
            "    {} saved ({} new tracks), {} skipped",
            format!("{}", summary.persisted).green(),
            format!("{}", summary.tracks_created).cyan(),
            format!("{}", summary.skipped()).red(),
        );
        if summary.skipped() > 0 || summary.walk_errors > 0 {
            eprintln!(
                "    skipped: {} unreadable, {} fingerprint errors, {} rejected, {} not saved; {} walk errors",
                summary.open_failures,
                summary.fingerprint_failures,
                summary.rejected,
                summary.persist_failures,
                summary.walk_errors,
            );
        }
        eprintln!("    {} tracks in store", summary.total_tracks);
    }
}
