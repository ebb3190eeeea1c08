use crate::error::WalkError;
use glob::Pattern;
use std::path::{Path, PathBuf};
use tracing::error;
use walkdir::{DirEntry, WalkDir};

pub fn build_ignore_patterns(ignore_globs: &[String]) -> Vec<Pattern> {
    ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect()
}

/// Recursive walk over several roots yielding every regular file.
///
/// Symlinks are followed. Directories and special files are skipped
/// silently; unreadable entries come out as `Err` and the walk carries on
/// with their siblings. Entries are visited in file-name order.
pub struct FileWalker {
    roots: Vec<PathBuf>,
    ignore_patterns: Vec<Pattern>,
}

impl FileWalker {
    pub fn new(roots: Vec<PathBuf>, ignore_patterns: Vec<Pattern>) -> Self {
        Self {
            roots,
            ignore_patterns,
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn files(&self) -> impl Iterator<Item = Result<PathBuf, WalkError>> + Send + '_ {
        self.roots.iter().flat_map(move |root| {
            WalkDir::new(root)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(move |entry| !self.is_ignored(entry.path()))
                .filter_map(|entry| match entry {
                    Ok(entry) => regular_file(entry).map(Ok),
                    Err(err) => Some(Err(WalkError {
                        path: err.path().map(Path::to_path_buf),
                        message: err.to_string(),
                    })),
                })
        })
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
    }
}

fn regular_file(entry: DirEntry) -> Option<PathBuf> {
    if entry.file_type().is_file() {
        Some(entry.into_path())
    } else {
        None
    }
}
