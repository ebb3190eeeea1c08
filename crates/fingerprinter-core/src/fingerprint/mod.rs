pub mod compress;

use crate::error::FingerprintError;
use rusty_chromaprint::{Configuration, Fingerprinter};

pub use compress::{is_degenerate, DEGENERATE_FINGERPRINT, SILENCE_SUBFINGERPRINT};

/// A finished fingerprint: the engine's raw items and their compact string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub raw: Vec<u32>,
    pub encoded: String,
}

impl Fingerprint {
    pub fn new(raw: Vec<u32>, config: &Configuration) -> Self {
        let encoded = compress::encode(&raw, config);
        Self { raw, encoded }
    }

    /// Too short to analyse, or silent throughout.
    pub fn is_degenerate(&self) -> bool {
        compress::is_degenerate(&self.raw)
    }
}

/// Streaming fingerprint calculator.
///
/// One instance is reused across files: `start` resets it for the next
/// stream. Implementations need not be `Send`; each worker builds its own.
pub trait FingerprintEngine {
    fn start(&mut self, sample_rate: u32, channels: u32) -> Result<(), FingerprintError>;

    /// Interleaved signed 16-bit samples.
    fn feed(&mut self, samples: &[i16]) -> Result<(), FingerprintError>;

    fn finish(&mut self) -> Result<(), FingerprintError>;

    /// Fingerprint of the last finished stream.
    fn fingerprint(&self) -> Result<Fingerprint, FingerprintError>;
}

impl<E: FingerprintEngine + ?Sized> FingerprintEngine for Box<E> {
    fn start(&mut self, sample_rate: u32, channels: u32) -> Result<(), FingerprintError> {
        (**self).start(sample_rate, channels)
    }

    fn feed(&mut self, samples: &[i16]) -> Result<(), FingerprintError> {
        (**self).feed(samples)
    }

    fn finish(&mut self) -> Result<(), FingerprintError> {
        (**self).finish()
    }

    fn fingerprint(&self) -> Result<Fingerprint, FingerprintError> {
        (**self).fingerprint()
    }
}

/// Chromaprint (TEST2 preset) via `rusty-chromaprint`.
pub struct ChromaprintEngine {
    config: Configuration,
    printer: Fingerprinter,
    finished: bool,
}

impl ChromaprintEngine {
    pub fn new() -> Self {
        let config = Configuration::preset_test2();
        Self {
            printer: Fingerprinter::new(&config),
            config,
            finished: false,
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }
}

impl Default for ChromaprintEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintEngine for ChromaprintEngine {
    fn start(&mut self, sample_rate: u32, channels: u32) -> Result<(), FingerprintError> {
        self.finished = false;
        self.printer
            .start(sample_rate, channels)
            .map_err(|e| FingerprintError::Start(format!("{:?}", e)))
    }

    fn feed(&mut self, samples: &[i16]) -> Result<(), FingerprintError> {
        if self.finished {
            return Err(FingerprintError::Feed(
                "stream already finished".to_string(),
            ));
        }
        self.printer.consume(samples);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), FingerprintError> {
        self.printer.finish();
        self.finished = true;
        Ok(())
    }

    fn fingerprint(&self) -> Result<Fingerprint, FingerprintError> {
        if !self.finished {
            return Err(FingerprintError::Finish(
                "fingerprint requested before finish".to_string(),
            ));
        }
        Ok(Fingerprint::new(
            self.printer.fingerprint().to_vec(),
            &self.config,
        ))
    }
}
