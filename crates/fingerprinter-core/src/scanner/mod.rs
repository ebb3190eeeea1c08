mod walk;

pub use walk::{build_ignore_patterns, FileWalker};
