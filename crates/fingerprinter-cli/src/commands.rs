use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fingerprinter")]
#[command(about = "Fingerprint audio files and record them in a SQLite store", long_about = None)]
pub struct Cli {
    /// Files or directories to fingerprint
    pub files: Vec<PathBuf>,

    /// Seconds of audio to analyse per file (0 for the whole file)
    #[arg(long, value_name = "SECONDS")]
    pub length: Option<u32>,

    /// Path to the SQLite store
    #[arg(long, value_name = "PATH")]
    pub db: Option<String>,

    /// Number of files fingerprinted in parallel
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,
}

const LEGACY_FLAGS: [&str; 3] = ["length", "db", "jobs"];

/// Rewrite `-length`, `-db` and `-jobs` (and their `-flag=value` forms) to
/// the double-dash spelling. Everything after a bare `--` is left alone.
pub fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut seen_terminator = false;
    args.into_iter()
        .map(|arg| {
            if seen_terminator {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                seen_terminator = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') && is_legacy_flag(rest) => {
                    OsString::from(format!("-{}", text))
                }
                _ => arg,
            }
        })
        .collect()
}

fn is_legacy_flag(flag: &str) -> bool {
    let name = flag.split_once('=').map_or(flag, |(name, _)| name);
    LEGACY_FLAGS.contains(&name)
}
