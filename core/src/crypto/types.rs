//! crypto/types.rs
//! Cipher catalog, transform direction and crypto errors.

use std::fmt;
use std::str::FromStr;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::dir_labels;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Key length does not match the algorithm's required key size.
    #[error("invalid key size: expected={expected} byte(s), actual={actual} byte(s)")]
    InvalidKeySize { expected: usize, actual: usize },

    /// Illegal block size, bad padding or any other cipher-level failure.
    #[error("{0}")]
    TransformFailure(String),

    /// Catalog lookup by id or menu number failed.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}

/// Supported block-cipher transforms (ECB with PKCS#5/PKCS#7 padding).
///
/// The discriminant doubles as the 1-based menu number.
#[repr(u8)]
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize, Deserialize,
)]
pub enum Algorithm {
    Aes128 = 1,
    Aes192 = 2,
    Aes256 = 3,
    Des = 4,
    TripleDes = 5,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Aes128,
        Algorithm::Aes192,
        Algorithm::Aes256,
        Algorithm::Des,
        Algorithm::TripleDes,
    ];

    /// Required key length in bytes.
    pub const fn key_size(self) -> usize {
        match self {
            Algorithm::Aes128 => 16,
            Algorithm::Aes192 => 24,
            Algorithm::Aes256 => 32,
            Algorithm::Des => 8,
            Algorithm::TripleDes => 24,
        }
    }

    pub const fn block_size(self) -> usize {
        match self {
            Algorithm::Aes128 | Algorithm::Aes192 | Algorithm::Aes256 => 16,
            Algorithm::Des | Algorithm::TripleDes => 8,
        }
    }

    /// Stable identifier used on the command line.
    pub const fn id(self) -> &'static str {
        match self {
            Algorithm::Aes128 => "aes-128",
            Algorithm::Aes192 => "aes-192",
            Algorithm::Aes256 => "aes-256",
            Algorithm::Des => "des",
            Algorithm::TripleDes => "3des",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            Algorithm::Aes128 => "AES-128",
            Algorithm::Aes192 => "AES-192",
            Algorithm::Aes256 => "AES-256",
            Algorithm::Des => "DES",
            Algorithm::TripleDes => "3DES",
        }
    }

    pub fn menu_number(self) -> u8 {
        self.into()
    }

    pub fn from_menu_number(n: u8) -> Result<Self, CryptoError> {
        Algorithm::try_from_primitive(n).map_err(|_| CryptoError::UnknownAlgorithm(n.to_string()))
    }

    /// Check `key` against the required key size.
    pub fn validate_key(self, key: &[u8]) -> Result<(), CryptoError> {
        if key.len() != self.key_size() {
            return Err(CryptoError::InvalidKeySize {
                expected: self.key_size(),
                actual: key.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Algorithm {
    type Err = CryptoError;

    /// Accepts the id (`aes-128`), the display name (`AES-128`) or the menu number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        if let Ok(n) = needle.parse::<u8>() {
            return Algorithm::from_menu_number(n);
        }
        Algorithm::ALL
            .iter()
            .copied()
            .find(|a| a.id().eq_ignore_ascii_case(needle) || a.display_name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CryptoError::UnknownAlgorithm(needle.to_string()))
    }
}

/// Transform direction with the per-variant labels used for output naming.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Encrypt,
    Decrypt,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Encrypt, Mode::Decrypt];

    pub const fn label(self) -> &'static str {
        match self {
            Mode::Encrypt => "Encrypt",
            Mode::Decrypt => "Decrypt",
        }
    }

    /// Prefix of the timestamped output directory.
    pub const fn dir_label(self) -> &'static str {
        match self {
            Mode::Encrypt => dir_labels::ENCRYPTION,
            Mode::Decrypt => dir_labels::DECRYPTION,
        }
    }

    pub const fn is_encrypt(self) -> bool {
        matches!(self, Mode::Encrypt)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable, validated cipher selection shared by every worker of a job.
///
/// Holds no mutable state; each file builds its own `StreamCipher` from it.
#[derive(Clone, PartialEq, Eq)]
pub struct CipherSpec {
    algorithm: Algorithm,
    mode: Mode,
    key: Vec<u8>,
}

impl CipherSpec {
    pub fn new(algorithm: Algorithm, mode: Mode, key: &[u8]) -> Result<Self, CryptoError> {
        algorithm.validate_key(key)?;
        Ok(Self {
            algorithm,
            mode,
            key: key.to_vec(),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

// Keep key bytes out of debug output and logs.
impl fmt::Debug for CipherSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherSpec")
            .field("algorithm", &self.algorithm)
            .field("mode", &self.mode)
            .field("key", &format_args!("<{} bytes>", self.key.len()))
            .finish()
    }
}
