use crate::config::{self, AppConfig};
use crate::error::{Error, FileError, WalkError};
use crate::fingerprint::{ChromaprintEngine, FingerprintEngine};
use crate::pipeline::{self, FileContext, FileOutcome};
use crate::progress::ProgressReporter;
use crate::scanner::{self, FileWalker};
use crate::storage::Database;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub struct ScanEngine {
    config: AppConfig,
    roots: Vec<PathBuf>,
}

/// Counters for one invocation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub files_visited: usize,
    pub persisted: usize,
    pub tracks_created: usize,
    pub open_failures: usize,
    pub fingerprint_failures: usize,
    pub rejected: usize,
    pub persist_failures: usize,
    pub walk_errors: usize,
    pub packets_skipped: u64,
    pub samples_fed: u64,
    /// Rows in the track table once the run finished.
    pub total_tracks: i64,
    pub duration: Duration,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        self.files_visited += 1;
        self.packets_skipped += outcome.stats.packets_skipped;
        self.samples_fed += outcome.stats.samples_fed;
        match &outcome.result {
            Ok(persisted) => {
                self.persisted += 1;
                if persisted.upsert.track_created {
                    self.tracks_created += 1;
                }
            }
            Err(FileError::Open(_)) => self.open_failures += 1,
            Err(FileError::Fingerprint(_)) => self.fingerprint_failures += 1,
            Err(FileError::Validation(_)) => self.rejected += 1,
            Err(FileError::Persistence(_)) => self.persist_failures += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.files_visited - self.persisted
    }
}

impl ScanEngine {
    pub fn new(config: AppConfig, roots: Vec<PathBuf>) -> Self {
        Self { config, roots }
    }

    pub fn with_db_path(mut self, path: &str) -> Self {
        self.config.db_path = path.to_string();
        self
    }

    pub fn with_max_length(mut self, secs: u32) -> Self {
        self.config.length = secs;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.config.jobs = jobs;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Fingerprint every file under the roots with Chromaprint.
    pub fn run(&self, reporter: &dyn ProgressReporter) -> Result<RunSummary, Error> {
        self.run_with(ChromaprintEngine::new, reporter)
    }

    /// Walk the roots and push each file through the pipeline.
    ///
    /// `make_engine` is called once per worker. Only opening the store can
    /// fail the run; per-file problems land in the summary.
    pub fn run_with<E, F>(
        &self,
        make_engine: F,
        reporter: &dyn ProgressReporter,
    ) -> Result<RunSummary, Error>
    where
        E: FingerprintEngine,
        F: Fn() -> E + Send + Sync,
    {
        let start = Instant::now();

        let roots = config::non_overlapping_roots(
            self.roots.iter().map(|r| config::normalize_root(r)).collect(),
        );
        info!("Processing roots: {:?}", roots);
        reporter.on_run_start(&roots);

        let db = Mutex::new(Database::open(&self.config.db_path)?);
        debug!("Opened store at {}", self.config.db_path);

        let walker = FileWalker::new(
            roots,
            scanner::build_ignore_patterns(&self.config.ignore_patterns),
        );
        let max_length = self.config.length;
        let summary = Mutex::new(RunSummary::default());

        if self.config.jobs <= 1 {
            let mut ctx = FileContext::new(make_engine(), max_length);
            for item in walker.files() {
                dispatch(&mut ctx, item, &db, &summary, reporter);
            }
        } else {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.jobs)
                .build()?;
            debug!("Running with {} workers", self.config.jobs);
            pool.install(|| {
                walker.files().par_bridge().for_each_init(
                    || FileContext::new(make_engine(), max_length),
                    |ctx, item| dispatch(ctx, item, &db, &summary, reporter),
                );
            });
        }

        let mut summary = summary.into_inner().unwrap_or_else(PoisonError::into_inner);
        let db = db.into_inner().unwrap_or_else(PoisonError::into_inner);
        summary.total_tracks = db.count_tracks()?;
        summary.duration = start.elapsed();

        info!(
            "Run completed in {:.2}s: {} files, {} saved, {} skipped",
            summary.duration.as_secs_f64(),
            summary.files_visited,
            summary.persisted,
            summary.skipped(),
        );
        reporter.on_run_complete(&summary);

        Ok(summary)
    }
}

fn dispatch<E: FingerprintEngine>(
    ctx: &mut FileContext<E>,
    item: Result<PathBuf, WalkError>,
    db: &Mutex<Database>,
    summary: &Mutex<RunSummary>,
    reporter: &dyn ProgressReporter,
) {
    match item {
        Ok(path) => {
            reporter.on_file_start(&path);
            let outcome = pipeline::process_file(ctx, &path, db);
            reporter.on_file_done(&outcome);
            summary
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .record(&outcome);
        }
        Err(err) => {
            error!("Walk error: {}", err);
            reporter.on_walk_error(&err.to_string());
            summary
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .walk_errors += 1;
        }
    }
}
