use std::path::PathBuf;

use thiserror::Error;

/// The only failures the compiler itself reports. Everything past I/O is
/// best-effort lowering: malformed input degrades to skipped tokens, never
/// to an error (see the statement and expression parsers).
#[derive(Debug, Error)]
pub enum SoulError {
    #[error("failed to read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    WriteArtifact {
        path: PathBuf,
        source: std::io::Error,
    },
}
