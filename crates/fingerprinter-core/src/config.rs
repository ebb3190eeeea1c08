use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_PATH: &str = "../db/media.sqlite";
pub const DEFAULT_MAX_LENGTH_SECS: u32 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Seconds of audio fed to the fingerprinter per file; 0 means the whole stream.
    pub length: u32,
    pub db_path: String,
    pub jobs: usize,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_MAX_LENGTH_SECS,
            db_path: DEFAULT_DB_PATH.to_string(),
            jobs: 1,
            ignore_patterns: Vec::new(),
        }
    }
}

/// Defaults, then `Fingerprinter.toml` if present, then `FINGERPRINTER_*` env vars.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .set_default("length", i64::from(DEFAULT_MAX_LENGTH_SECS))?
        .set_default("db_path", DEFAULT_DB_PATH)?
        .set_default("jobs", 1)?
        .set_default("ignore_patterns", Vec::<String>::new())?
        .add_source(ConfigFile::with_name("Fingerprinter").required(false))
        .add_source(
            Environment::with_prefix("FINGERPRINTER")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Drop roots nested under another root so every file is walked once.
/// Order of the surviving roots is preserved.
pub fn non_overlapping_roots(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for root in roots {
        if result.iter().any(|kept| root.starts_with(kept)) {
            continue;
        }
        result.retain(|kept| !kept.starts_with(&root));
        result.push(root);
    }

    result
}

pub fn normalize_root(root: &Path) -> PathBuf {
    std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf())
}
