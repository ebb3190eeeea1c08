pub mod models;
mod queries;
mod sqlite;

pub use models::{FingerprintRecord, Track, UpsertOutcome};
pub use sqlite::Database;
