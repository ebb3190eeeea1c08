/// A validated (path, fingerprint, duration) tuple ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintRecord {
    pub path: String,
    pub fingerprint: String,
    /// Whole seconds, from container metadata. Always > 0 once validated.
    pub duration: u32,
}

/// One row per distinct fingerprint; many paths may map to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: i64,
    pub fingerprint: String,
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub track_id: i64,
    /// False when the fingerprint already had a track row.
    pub track_created: bool,
}
