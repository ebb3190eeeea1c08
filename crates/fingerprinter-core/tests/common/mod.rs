#![allow(dead_code)]

use fingerprinter_core::error::FingerprintError;
use fingerprinter_core::{ChromaprintEngine, Fingerprint, FingerprintEngine};
use rusty_chromaprint::Configuration;
use std::f32::consts::PI;
use std::path::Path;

/// Write a 16-bit PCM WAV holding a sine tone on every channel.
pub fn write_sine_wav(path: &Path, sample_rate: u32, channels: u16, frames: u32, freq: f32) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for n in 0..frames {
        let t = n as f32 / sample_rate as f32;
        let value = ((2.0 * PI * freq * t).sin() * 0.5 * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(value).unwrap();
        }
    }
    writer.finalize().unwrap();
}

/// Mono 11025 Hz tone, long enough for Chromaprint to produce a real fingerprint.
pub fn write_tone(path: &Path, secs: u32, freq: f32) {
    write_sine_wav(path, 11025, 1, 11025 * secs, freq);
}

/// Chromaprint output for 12 seconds of a mono 11025 Hz tone.
pub fn tone_fingerprint(freq: f32) -> Fingerprint {
    let mut engine = ChromaprintEngine::new();
    engine.start(11025, 1).unwrap();
    let samples: Vec<i16> = (0..11025 * 12)
        .map(|n| {
            let t = n as f32 / 11025.0;
            ((2.0 * PI * freq * t).sin() * 0.5 * i16::MAX as f32) as i16
        })
        .collect();
    engine.feed(&samples).unwrap();
    engine.finish().unwrap();
    engine.fingerprint().unwrap()
}

/// What an engine reports when it saw too little audio.
pub fn empty_fingerprint() -> Fingerprint {
    Fingerprint::new(Vec::new(), &Configuration::preset_test2())
}

/// A valid WAV cut off in the middle of its format chunk.
pub fn write_truncated_wav(path: &Path) {
    let tmp = path.with_extension("full.tmp");
    write_sine_wav(&tmp, 8000, 1, 8000, 440.0);
    let bytes = std::fs::read(&tmp).unwrap();
    std::fs::remove_file(&tmp).unwrap();
    std::fs::write(path, &bytes[..20]).unwrap();
}

/// Engine double that records what it was given and returns a canned result.
pub struct ScriptedEngine {
    pub fingerprint: Fingerprint,
    pub fail_finish: bool,
    pub started: Option<(u32, u32)>,
    pub fed: u64,
    pub chunks: usize,
    pub largest_chunk: usize,
}

impl ScriptedEngine {
    pub fn returning(fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint,
            fail_finish: false,
            started: None,
            fed: 0,
            chunks: 0,
            largest_chunk: 0,
        }
    }

    pub fn failing_finish() -> Self {
        Self {
            fail_finish: true,
            ..Self::returning(tone_fingerprint(440.0))
        }
    }
}

impl FingerprintEngine for ScriptedEngine {
    fn start(&mut self, sample_rate: u32, channels: u32) -> Result<(), FingerprintError> {
        self.started = Some((sample_rate, channels));
        self.fed = 0;
        self.chunks = 0;
        self.largest_chunk = 0;
        Ok(())
    }

    fn feed(&mut self, samples: &[i16]) -> Result<(), FingerprintError> {
        self.fed += samples.len() as u64;
        self.chunks += 1;
        self.largest_chunk = self.largest_chunk.max(samples.len());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), FingerprintError> {
        if self.fail_finish {
            return Err(FingerprintError::Finish("scripted failure".to_string()));
        }
        Ok(())
    }

    fn fingerprint(&self) -> Result<Fingerprint, FingerprintError> {
        Ok(self.fingerprint.clone())
    }
}
