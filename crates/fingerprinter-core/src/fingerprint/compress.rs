use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rusty_chromaprint::{Configuration, FingerprintCompressor};

/// Compact form of a fingerprint with no items: too little audio was fed for
/// the engine to fill a single classifier window.
pub const DEGENERATE_FINGERPRINT: &str = "AQAAAA";

/// Item the TEST2 classifiers emit for an all-zero chroma image, which is
/// what digital silence decodes to.
pub const SILENCE_SUBFINGERPRINT: u32 = 0x256d_f977;

/// Chromaprint's compact layout, as URL-safe base64 without padding.
pub fn encode(raw: &[u32], config: &Configuration) -> String {
    URL_SAFE_NO_PAD.encode(FingerprintCompressor::from(config).compress(raw))
}

/// Empty, or nothing but silence items.
pub fn is_degenerate(raw: &[u32]) -> bool {
    raw.iter().all(|&item| item == SILENCE_SUBFINGERPRINT)
}
