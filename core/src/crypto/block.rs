//! crypto/block.rs
//! Raw block-cipher interface for AES-128/192/256, DES and 3DES (EDE3).
//!
//! Design notes:
//! - Works on whole blocks only; the caller owns buffering and padding.
//! - Every block is transformed independently (electronic codebook).
//! - Cipher selection is driven by `Algorithm` (closed catalog).

use aes::{Aes128, Aes192, Aes256};
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use des::{Des, TdesEde3};

use crate::crypto::types::{Algorithm, CryptoError};

/// Unified block cipher implementation selected by `Algorithm`.
#[derive(Clone)]
pub enum BlockCipherImpl {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
    Des(Des),
    TripleDes(TdesEde3),
}

impl BlockCipherImpl {
    /// Construct the cipher for `algorithm` from a raw key.
    pub fn new(algorithm: Algorithm, key: &[u8]) -> Result<Self, CryptoError> {
        algorithm.validate_key(key)?;

        let invalid = |_| CryptoError::InvalidKeySize {
            expected: algorithm.key_size(),
            actual: key.len(),
        };

        let cipher = match algorithm {
            Algorithm::Aes128 => Self::Aes128(Aes128::new_from_slice(key).map_err(invalid)?),
            Algorithm::Aes192 => Self::Aes192(Aes192::new_from_slice(key).map_err(invalid)?),
            Algorithm::Aes256 => Self::Aes256(Aes256::new_from_slice(key).map_err(invalid)?),
            Algorithm::Des => Self::Des(Des::new_from_slice(key).map_err(invalid)?),
            Algorithm::TripleDes => Self::TripleDes(TdesEde3::new_from_slice(key).map_err(invalid)?),
        };
        Ok(cipher)
    }

    pub fn block_size(&self) -> usize {
        match self {
            Self::Aes128(_) | Self::Aes192(_) | Self::Aes256(_) => 16,
            Self::Des(_) | Self::TripleDes(_) => 8,
        }
    }

    /// Encrypt `buf` in place. `buf.len()` must be a multiple of the block size.
    pub fn encrypt_blocks(&self, buf: &mut [u8]) -> Result<(), CryptoError> {
        self.check_aligned(buf.len())?;
        let bs = self.block_size();
        match self {
            Self::Aes128(c) => encrypt_with(c, bs, buf),
            Self::Aes192(c) => encrypt_with(c, bs, buf),
            Self::Aes256(c) => encrypt_with(c, bs, buf),
            Self::Des(c) => encrypt_with(c, bs, buf),
            Self::TripleDes(c) => encrypt_with(c, bs, buf),
        }
        Ok(())
    }

    /// Decrypt `buf` in place. `buf.len()` must be a multiple of the block size.
    pub fn decrypt_blocks(&self, buf: &mut [u8]) -> Result<(), CryptoError> {
        self.check_aligned(buf.len())?;
        let bs = self.block_size();
        match self {
            Self::Aes128(c) => decrypt_with(c, bs, buf),
            Self::Aes192(c) => decrypt_with(c, bs, buf),
            Self::Aes256(c) => decrypt_with(c, bs, buf),
            Self::Des(c) => decrypt_with(c, bs, buf),
            Self::TripleDes(c) => decrypt_with(c, bs, buf),
        }
        Ok(())
    }

    fn check_aligned(&self, len: usize) -> Result<(), CryptoError> {
        let bs = self.block_size();
        if len % bs != 0 {
            return Err(CryptoError::TransformFailure(format!(
                "illegal block size: input length {len} is not a multiple of {bs}"
            )));
        }
        Ok(())
    }
}

fn encrypt_with<C: BlockEncrypt>(cipher: &C, bs: usize, buf: &mut [u8]) {
    for block in buf.chunks_exact_mut(bs) {
        cipher.encrypt_block(GenericArray::from_mut_slice(block));
    }
}

fn decrypt_with<C: BlockDecrypt>(cipher: &C, bs: usize, buf: &mut [u8]) {
    for block in buf.chunks_exact_mut(bs) {
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
    }
}
