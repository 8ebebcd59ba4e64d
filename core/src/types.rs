use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto::CryptoError;

/// Unified stream error covering discovery, per-file I/O, cipher failures and job setup.
/// - `#[from]` conversions enable `?` across the pipeline.
/// - Per-file variants carry the offending path so reports can name the file.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Input path does not exist (or vanished before it was opened).
    #[error("{} is not found", path.display())]
    NotFound { path: PathBuf },

    /// I/O failure while reading, creating or appending.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Cipher-level failure while transforming one file.
    #[error("encryption/decryption failed for {}: {source}", path.display())]
    Transform {
        path: PathBuf,
        #[source]
        source: CryptoError,
    },

    /// Job-level cipher error (key size, catalog lookup).
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// The job has no files to process.
    #[error("no files to process{}", under_root(root))]
    EmptyFileList { root: PathBuf },

    /// Generic high-level validation with a descriptive message.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl StreamError {
    /// Classify an `io::Error` raised for `path`.
    pub fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            StreamError::NotFound { path: path.to_path_buf() }
        } else {
            StreamError::Io { path: path.to_path_buf(), source }
        }
    }

    pub fn transform(path: &Path, source: CryptoError) -> Self {
        StreamError::Transform { path: path.to_path_buf(), source }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            StreamError::NotFound { .. } => FailureKind::NotFound,
            StreamError::Io { .. } => FailureKind::IoFailure,
            StreamError::Transform { .. } => FailureKind::TransformFailure,
            StreamError::Crypto(CryptoError::InvalidKeySize { .. }) => FailureKind::InvalidKeySize,
            StreamError::Crypto(_) => FailureKind::TransformFailure,
            StreamError::EmptyFileList { .. }
            | StreamError::InvalidConfig(_) => FailureKind::Setup,
        }
    }

    /// Job-setup errors abort the run before any worker starts.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::InvalidKeySize | FailureKind::Setup
        )
    }
}

fn under_root(root: &Path) -> String {
    if root.as_os_str().is_empty() {
        String::new()
    } else {
        format!(" under {}", root.display())
    }
}

/// Failure taxonomy surfaced to users and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureKind {
    NotFound,
    InvalidKeySize,
    TransformFailure,
    IoFailure,
    Setup,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::NotFound => "not found",
            FailureKind::InvalidKeySize => "invalid key size",
            FailureKind::TransformFailure => "encryption/decryption failed",
            FailureKind::IoFailure => "I/O error",
            FailureKind::Setup => "setup error",
        };
        f.write_str(name)
    }
}
