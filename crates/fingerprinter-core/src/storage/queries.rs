use super::models::*;
use super::sqlite::Database;
use rusqlite::{params, OptionalExtension, Result};
use tracing::debug;

impl Database {
    // ── Upsert ───────────────────────────────────────────────────

    /// Store one record as a single unit of work:
    /// 1. replace the path → fingerprint mapping,
    /// 2. insert the track row for the fingerprint if it is new,
    /// 3. overwrite the track's duration.
    ///
    /// Any failure rolls all three back.
    pub fn upsert_fingerprint(&self, record: &FingerprintRecord) -> Result<UpsertOutcome> {
        let tx = self.connection().unchecked_transaction()?;
        let outcome = {
            tx.prepare_cached(
                "INSERT INTO track_path_fingerprint (path, fingerprint) VALUES (?1, ?2) \
                 ON CONFLICT(path) DO UPDATE SET fingerprint = excluded.fingerprint",
            )?
            .execute(params![record.path, record.fingerprint])?;

            let inserted = tx
                .prepare_cached("INSERT OR IGNORE INTO track (fingerprint) VALUES (?1)")?
                .execute(params![record.fingerprint])?;

            tx.prepare_cached("UPDATE track SET duration = ?1 WHERE fingerprint = ?2")?
                .execute(params![record.duration, record.fingerprint])?;

            let track_id: i64 = tx
                .prepare_cached("SELECT id FROM track WHERE fingerprint = ?1")?
                .query_row(params![record.fingerprint], |row| row.get(0))?;

            UpsertOutcome {
                track_id,
                track_created: inserted > 0,
            }
        };
        tx.commit()?;
        debug!(
            "Upserted {} -> track {} (new: {})",
            record.path, outcome.track_id, outcome.track_created
        );
        Ok(outcome)
    }

    // ── Lookups ──────────────────────────────────────────────────

    pub fn fingerprint_for_path(&self, path: &str) -> Result<Option<String>> {
        self.connection()
            .query_row(
                "SELECT fingerprint FROM track_path_fingerprint WHERE path = ?1",
                params![path],
                |row| row.get(0),
            )
            .optional()
    }

    pub fn track_by_fingerprint(&self, fingerprint: &str) -> Result<Option<Track>> {
        self.connection()
            .query_row(
                "SELECT id, fingerprint, duration FROM track WHERE fingerprint = ?1",
                params![fingerprint],
                |row| {
                    Ok(Track {
                        id: row.get(0)?,
                        fingerprint: row.get(1)?,
                        duration: row.get(2)?,
                    })
                },
            )
            .optional()
    }

    /// All paths currently mapped to a fingerprint, sorted.
    pub fn paths_for_fingerprint(&self, fingerprint: &str) -> Result<Vec<String>> {
        let mut stmt = self.connection().prepare(
            "SELECT path FROM track_path_fingerprint WHERE fingerprint = ?1 ORDER BY path",
        )?;
        let paths = stmt
            .query_map(params![fingerprint], |row| row.get(0))?
            .collect::<Result<Vec<String>>>()?;
        Ok(paths)
    }

    pub fn count_tracks(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM track", [], |row| row.get(0))
    }

    pub fn count_paths(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM track_path_fingerprint", [], |row| {
                row.get(0)
            })
    }
}
