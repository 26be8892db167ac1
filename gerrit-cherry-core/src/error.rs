use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a cherry run
#[derive(Error, Debug)]
pub enum CherryError {
    #[error("Failed to open repository at {}: {source}", path.display())]
    OpenRepository {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("Cannot resolve '{reference}' to a commit (tried: {})", tried.join(", "))]
    UnresolvedReference { reference: String, tried: Vec<String> },

    #[error("History walk failed: {0}")]
    Walk(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("git executable not found in PATH")]
    GitNotFound,

    #[error("git log failed (exit code {exit_code}): {stderr}")]
    GitCommand { exit_code: i32, stderr: String },

    #[error("Unexpected git log line before any commit header: {line}")]
    MalformedLog { line: String },
}

pub type Result<T> = std::result::Result<T, CherryError>;
