//! crypto/padding.rs
//! PKCS#7 padding (PKCS#5 for 8-byte blocks).

use crate::crypto::types::CryptoError;

/// Append 1..=block_size padding bytes, each equal to the pad length.
pub fn pad(buf: &mut Vec<u8>, block_size: usize) {
    let pad_len = block_size - (buf.len() % block_size);
    buf.resize(buf.len() + pad_len, pad_len as u8);
}

/// Validate trailing padding and return the unpadded length.
pub fn unpad(buf: &[u8], block_size: usize) -> Result<usize, CryptoError> {
    let bad_padding = || CryptoError::TransformFailure("bad padding: given final block not properly padded".into());

    let pad_len = *buf.last().ok_or_else(bad_padding)? as usize;
    if pad_len == 0 || pad_len > block_size || pad_len > buf.len() {
        return Err(bad_padding());
    }
    let body = buf.len() - pad_len;
    if buf[body..].iter().any(|&b| b as usize != pad_len) {
        return Err(bad_padding());
    }
    Ok(body)
}
