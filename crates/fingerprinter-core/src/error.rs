use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Run-level errors. Anything here stops the whole run; per-file problems
/// are reported through [`FileError`] instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("{0}")]
    Other(String),
}

/// Pipeline stage a file was in when it was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Opened,
    Probed,
    Decoding,
    Finalized,
    Validated,
    Persisted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Opened => "open",
            Stage::Probed => "probe",
            Stage::Decoding => "decode",
            Stage::Finalized => "finalize",
            Stage::Validated => "validate",
            Stage::Persisted => "persist",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum OpenError {
    #[error("couldn't open the file: {0}")]
    Io(#[from] std::io::Error),

    #[error("couldn't find stream information in the file: {0}")]
    UnsupportedContainer(String),

    #[error("couldn't find any audio stream in the file")]
    NoAudioStream,

    #[error("unknown codec: {0}")]
    UnsupportedCodec(String),

    #[error("unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    #[error("no channels found in the audio stream")]
    NoChannels,
}

impl OpenError {
    pub fn stage(&self) -> Stage {
        match self {
            OpenError::Io(_) | OpenError::UnsupportedContainer(_) => Stage::Opened,
            _ => Stage::Probed,
        }
    }
}

#[derive(Error, Debug)]
pub enum FingerprintError {
    #[error("fingerprint engine rejected stream parameters: {0}")]
    Start(String),

    #[error("fingerprint calculation failed: {0}")]
    Feed(String),

    #[error("fingerprint finalization failed: {0}")]
    Finish(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("file has no duration")]
    ZeroDuration,

    #[error("file has degenerate fingerprint")]
    DegenerateFingerprint,
}

/// Why a single file was skipped. Never aborts the run.
#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Open(#[from] OpenError),

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("could not save record: {0}")]
    Persistence(#[from] rusqlite::Error),
}

impl FileError {
    pub fn stage(&self) -> Stage {
        match self {
            FileError::Open(e) => e.stage(),
            FileError::Fingerprint(FingerprintError::Finish(_)) => Stage::Finalized,
            FileError::Fingerprint(_) => Stage::Decoding,
            FileError::Validation(_) => Stage::Validated,
            FileError::Persistence(_) => Stage::Persisted,
        }
    }
}

/// A walk failure that was reported and stepped over.
#[derive(Debug)]
pub struct WalkError {
    pub path: Option<PathBuf>,
    pub message: String,
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path.display(), self.message),
            None => f.write_str(&self.message),
        }
    }
}
