mod common;

use common::{write_tone, write_truncated_wav};
use fingerprinter_core::storage::Database;
use fingerprinter_core::{AppConfig, ScanEngine, SilentReporter};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn engine_for(roots: Vec<PathBuf>, db_path: &Path) -> ScanEngine {
    ScanEngine::new(AppConfig::default(), roots).with_db_path(db_path.to_str().unwrap())
}

fn stored_paths(db: &Database) -> Vec<(String, String)> {
    db.connection()
        .prepare("SELECT path, fingerprint FROM track_path_fingerprint ORDER BY path")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

/// Layout:
///   library/
///     good.wav        (12s tone)
///     readme.txt      (not audio)
///     broken.wav      (truncated header)
fn create_mixed_library(root: &Path) {
    fs::create_dir_all(root).unwrap();
    write_tone(&root.join("good.wav"), 12, 440.0);
    fs::write(root.join("readme.txt"), "rip log, no audio here").unwrap();
    write_truncated_wav(&root.join("broken.wav"));
}

#[test]
fn test_mixed_directory_persists_only_valid_audio() {
    let tmp = tempdir().unwrap();
    let library = tmp.path().join("library");
    create_mixed_library(&library);
    let db_path = tmp.path().join("media.sqlite");

    let summary = engine_for(vec![library.clone()], &db_path)
        .run(&SilentReporter)
        .unwrap();

    assert_eq!(summary.files_visited, 3);
    assert_eq!(summary.persisted, 1);
    assert_eq!(summary.open_failures, 2);
    assert_eq!(summary.skipped(), 2);
    assert_eq!(summary.total_tracks, 1);
    assert_eq!(summary.walk_errors, 0);

    let db = Database::open(&db_path).unwrap();
    let rows = stored_paths(&db);
    assert_eq!(rows.len(), 1);
    let good = fs::canonicalize(library.join("good.wav")).unwrap();
    assert_eq!(rows[0].0, good.to_string_lossy());
}

#[test]
fn test_duplicate_audio_shares_one_track_with_last_duration() {
    let tmp = tempdir().unwrap();
    let library = tmp.path().join("library");
    fs::create_dir_all(library.join("nested")).unwrap();
    // Same first 10 seconds, different total lengths. Walk order is by name.
    write_tone(&library.join("a_short.wav"), 12, 440.0);
    write_tone(&library.join("nested/b_long.wav"), 15, 440.0);
    let db_path = tmp.path().join("media.sqlite");

    let summary = engine_for(vec![library], &db_path)
        .with_max_length(10)
        .run(&SilentReporter)
        .unwrap();

    assert_eq!(summary.persisted, 2);
    assert_eq!(summary.tracks_created, 1);
    assert_eq!(summary.total_tracks, 1);
    assert_eq!(summary.samples_fed, 2 * 10 * 11025);

    let db = Database::open(&db_path).unwrap();
    let rows = stored_paths(&db);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].1, rows[1].1);

    let track = db.track_by_fingerprint(&rows[0].1).unwrap().unwrap();
    assert_eq!(track.duration, Some(15));
}

#[test]
fn test_rerun_replaces_rather_than_duplicates() {
    let tmp = tempdir().unwrap();
    let library = tmp.path().join("library");
    fs::create_dir_all(&library).unwrap();
    write_tone(&library.join("song.wav"), 12, 659.25);
    let db_path = tmp.path().join("media.sqlite");

    let first = engine_for(vec![library.clone()], &db_path)
        .run(&SilentReporter)
        .unwrap();
    let second = engine_for(vec![library], &db_path)
        .run(&SilentReporter)
        .unwrap();

    assert_eq!(first.tracks_created, 1);
    assert_eq!(second.tracks_created, 0);
    assert_eq!(second.persisted, 1);

    let db = Database::open(&db_path).unwrap();
    assert_eq!(db.count_paths().unwrap(), 1);
    assert_eq!(db.count_tracks().unwrap(), 1);
}

#[test]
fn test_overlapping_roots_visit_each_file_once() {
    let tmp = tempdir().unwrap();
    let library = tmp.path().join("library");
    let album = library.join("album");
    fs::create_dir_all(&album).unwrap();
    write_tone(&album.join("one.wav"), 11, 440.0);
    let db_path = tmp.path().join("media.sqlite");

    let summary = engine_for(vec![album.clone(), library, album.join("one.wav")], &db_path)
        .run(&SilentReporter)
        .unwrap();

    assert_eq!(summary.files_visited, 1);
    assert_eq!(summary.persisted, 1);
}

#[test]
fn test_missing_root_does_not_abort_run() {
    let tmp = tempdir().unwrap();
    let library = tmp.path().join("library");
    fs::create_dir_all(&library).unwrap();
    write_tone(&library.join("song.wav"), 11, 440.0);
    let db_path = tmp.path().join("media.sqlite");

    let summary = engine_for(vec![tmp.path().join("not-there"), library], &db_path)
        .run(&SilentReporter)
        .unwrap();

    assert_eq!(summary.walk_errors, 1);
    assert_eq!(summary.persisted, 1);
}

#[test]
fn test_unopenable_store_fails_the_run() {
    let tmp = tempdir().unwrap();
    let library = tmp.path().join("library");
    fs::create_dir_all(&library).unwrap();
    let db_path = tmp.path().join("no/such/dir/media.sqlite");

    let result = engine_for(vec![library], &db_path).run(&SilentReporter);
    assert!(matches!(result, Err(fingerprinter_core::Error::Database(_))));
}

#[test]
fn test_worker_pool_matches_sequential_run() {
    let tmp = tempdir().unwrap();
    let library = tmp.path().join("library");
    fs::create_dir_all(library.join("disc1")).unwrap();
    fs::create_dir_all(library.join("disc2")).unwrap();
    write_tone(&library.join("disc1/01.wav"), 11, 440.0);
    write_tone(&library.join("disc1/02.wav"), 12, 554.37);
    write_tone(&library.join("disc2/01.wav"), 13, 659.25);
    write_tone(&library.join("disc2/02.wav"), 11, 783.99);
    fs::write(library.join("disc2/cover.txt"), "not audio").unwrap();

    let seq_db = tmp.path().join("seq.sqlite");
    let par_db = tmp.path().join("par.sqlite");

    let seq = engine_for(vec![library.clone()], &seq_db)
        .run(&SilentReporter)
        .unwrap();
    let par = engine_for(vec![library], &par_db)
        .with_jobs(3)
        .run(&SilentReporter)
        .unwrap();

    assert_eq!(seq.files_visited, 5);
    assert_eq!(par.files_visited, 5);
    assert_eq!(seq.persisted, 4);
    assert_eq!(par.persisted, 4);

    let seq_rows = stored_paths(&Database::open(&seq_db).unwrap());
    let par_rows = stored_paths(&Database::open(&par_db).unwrap());
    assert_eq!(seq_rows, par_rows);
}

#[test]
fn test_ignore_patterns_skip_matching_files() {
    let tmp = tempdir().unwrap();
    let library = tmp.path().join("library");
    fs::create_dir_all(library.join("samples")).unwrap();
    write_tone(&library.join("keep.wav"), 11, 440.0);
    write_tone(&library.join("samples/loop.wav"), 11, 440.0);
    let db_path = tmp.path().join("media.sqlite");

    let config = AppConfig {
        ignore_patterns: vec!["*/samples".to_string()],
        ..AppConfig::default()
    };
    let summary = ScanEngine::new(config, vec![library])
        .with_db_path(db_path.to_str().unwrap())
        .run(&SilentReporter)
        .unwrap();

    assert_eq!(summary.files_visited, 1);
    assert_eq!(summary.persisted, 1);
}
