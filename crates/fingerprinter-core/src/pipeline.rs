use crate::audio::{AudioStream, DecodeStats};
use crate::error::{FileError, ValidationError};
use crate::fingerprint::{Fingerprint, FingerprintEngine};
use crate::storage::{Database, FingerprintRecord, UpsertOutcome};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{error, info, warn};

/// Per-worker state threaded through every file: the engine is reset for
/// each stream, never shared.
pub struct FileContext<E: FingerprintEngine> {
    pub engine: E,
    /// Seconds of audio to fingerprint; 0 feeds the whole stream.
    pub max_length: u32,
}

impl<E: FingerprintEngine> FileContext<E> {
    pub fn new(engine: E, max_length: u32) -> Self {
        Self { engine, max_length }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persisted {
    pub record: FingerprintRecord,
    pub upsert: UpsertOutcome,
}

/// Result of running one file through the pipeline.
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<Persisted, FileError>,
    pub stats: DecodeStats,
}

impl FileOutcome {
    pub fn is_persisted(&self) -> bool {
        self.result.is_ok()
    }
}

/// Remaining interleaved samples the engine may still receive.
#[derive(Debug, Clone, Copy)]
pub struct SampleBudget {
    remaining: Option<u64>,
}

impl SampleBudget {
    pub fn new(max_length_secs: u32, sample_rate: u32, channels: u32) -> Self {
        let remaining = (max_length_secs > 0).then(|| {
            u64::from(max_length_secs) * u64::from(channels) * u64::from(sample_rate)
        });
        Self { remaining }
    }

    pub fn unbounded() -> Self {
        Self { remaining: None }
    }

    /// Claim up to `available` samples and return how many may be fed.
    pub fn take(&mut self, available: usize) -> usize {
        match &mut self.remaining {
            None => available,
            Some(remaining) => {
                let granted = (*remaining).min(available as u64);
                *remaining -= granted;
                granted as usize
            }
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// Run one file through every stage and store the result.
///
/// Never panics or propagates: every failure ends up in the outcome and in
/// the log, and the caller moves on to the next file.
pub fn process_file<E: FingerprintEngine>(
    ctx: &mut FileContext<E>,
    path: &Path,
    db: &Mutex<Database>,
) -> FileOutcome {
    info!("Decoding file: {}", path.display());

    let mut stats = DecodeStats::default();
    let result = fingerprint_file(ctx, path, &mut stats).and_then(|record| {
        let db = db.lock().unwrap_or_else(PoisonError::into_inner);
        let upsert = db.upsert_fingerprint(&record)?;
        Ok(Persisted { record, upsert })
    });

    match &result {
        Ok(persisted) => info!(
            "Saved {} (duration {}s, track {})",
            path.display(),
            persisted.record.duration,
            persisted.upsert.track_id
        ),
        Err(FileError::Validation(e)) => {
            warn!("{} {}, ignoring", path.display(), e)
        }
        Err(e) => error!(
            "Unable to fingerprint {} at {} stage, skipping: {}",
            path.display(),
            e.stage(),
            e
        ),
    }

    FileOutcome {
        path: path.to_path_buf(),
        result,
        stats,
    }
}

/// Open, decode, fingerprint and validate a file without touching storage.
pub fn fingerprint_file<E: FingerprintEngine>(
    ctx: &mut FileContext<E>,
    path: &Path,
    stats: &mut DecodeStats,
) -> Result<FingerprintRecord, FileError> {
    let stream = AudioStream::open(path)?;
    fingerprint_stream(ctx, path, stream, stats)
}

pub(crate) fn fingerprint_stream<E: FingerprintEngine>(
    ctx: &mut FileContext<E>,
    path: &Path,
    mut stream: AudioStream,
    stats: &mut DecodeStats,
) -> Result<FingerprintRecord, FileError> {
    ctx.engine.start(stream.sample_rate(), stream.channels())?;
    let mut budget = SampleBudget::new(ctx.max_length, stream.sample_rate(), stream.channels());

    let fed = feed_stream(&mut ctx.engine, &mut stream, &mut budget);
    *stats = stream.stats();
    fed?;
    let duration = stream.duration_secs();

    ctx.engine.finish()?;
    let fingerprint = ctx.engine.fingerprint()?;
    validate(duration, &fingerprint)?;

    Ok(FingerprintRecord {
        path: path.to_string_lossy().into_owned(),
        fingerprint: fingerprint.encoded,
        duration,
    })
}

fn feed_stream<E: FingerprintEngine>(
    engine: &mut E,
    stream: &mut AudioStream,
    budget: &mut SampleBudget,
) -> Result<(), FileError> {
    while !budget.is_exhausted() {
        let Some(chunk) = stream.next_chunk() else {
            break;
        };
        let take = budget.take(chunk.len());
        engine.feed(&chunk[..take])?;
        stream.record_fed(take);
    }
    Ok(())
}

pub fn validate(duration: u32, fingerprint: &Fingerprint) -> Result<(), ValidationError> {
    if duration == 0 {
        return Err(ValidationError::ZeroDuration);
    }
    if fingerprint.is_degenerate() {
        return Err(ValidationError::DegenerateFingerprint);
    }
    Ok(())
}
