pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod pipeline;
pub mod progress;
pub mod scanner;
pub mod storage;

pub use config::AppConfig;
pub use engine::{RunSummary, ScanEngine};
pub use error::{Error, FileError, Stage};
pub use fingerprint::{
    ChromaprintEngine, Fingerprint, FingerprintEngine, DEGENERATE_FINGERPRINT, SILENCE_SUBFINGERPRINT,
};
pub use pipeline::{process_file, FileContext, FileOutcome};
pub use progress::{ProgressReporter, SilentReporter};
