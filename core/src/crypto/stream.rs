//! crypto/stream.rs
//! Chunk-at-a-time cipher with a carry buffer for partial blocks.
//!
//! Summary: callers feed arbitrary-sized chunks in file order and get back
//! whole transformed blocks. Bytes that do not complete a block stay in the
//! carry buffer until the next call. When decrypting, the last complete block
//! is held back too, since it may be the padded one. The final call pads
//! (encrypt) or strips padding (decrypt) and always leaves the carry empty.

use std::mem;

use crate::crypto::block::BlockCipherImpl;
use crate::crypto::padding;
use crate::crypto::types::{CipherSpec, CryptoError, Mode};

pub struct StreamCipher {
    inner: BlockCipherImpl,
    mode: Mode,
    carry: Vec<u8>,
}

impl StreamCipher {
    /// Build a fresh cipher state for one file.
    pub fn new(spec: &CipherSpec) -> Result<Self, CryptoError> {
        let inner = BlockCipherImpl::new(spec.algorithm(), spec.key())?;
        let carry = Vec::with_capacity(inner.block_size() * 2);
        Ok(Self {
            inner,
            mode: spec.mode(),
            carry,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn block_size(&self) -> usize {
        self.inner.block_size()
    }

    /// Bytes currently held back waiting for more input.
    pub fn carry_len(&self) -> usize {
        self.carry.len()
    }

    /// Transform the next chunk. Output is always a whole number of blocks,
    /// except the final decrypt output which has its padding removed.
    pub fn update(&mut self, chunk: &[u8], is_final: bool) -> Result<Vec<u8>, CryptoError> {
        self.carry.extend_from_slice(chunk);

        match (self.mode, is_final) {
            (Mode::Encrypt, false) => {
                let ready = self.ready_len(false);
                let mut out: Vec<u8> = self.carry.drain(..ready).collect();
                self.inner.encrypt_blocks(&mut out)?;
                Ok(out)
            }
            (Mode::Encrypt, true) => {
                let mut out = mem::take(&mut self.carry);
                padding::pad(&mut out, self.block_size());
                self.inner.encrypt_blocks(&mut out)?;
                Ok(out)
            }
            (Mode::Decrypt, false) => {
                let ready = self.ready_len(true);
                let mut out: Vec<u8> = self.carry.drain(..ready).collect();
                self.inner.decrypt_blocks(&mut out)?;
                Ok(out)
            }
            (Mode::Decrypt, true) => {
                let mut out = mem::take(&mut self.carry);
                if out.is_empty() {
                    return Ok(out);
                }
                self.inner.decrypt_blocks(&mut out)?;
                let len = padding::unpad(&out, self.block_size())?;
                out.truncate(len);
                Ok(out)
            }
        }
    }

    /// Length of the carry prefix that can be transformed now.
    fn ready_len(&self, hold_last_block: bool) -> usize {
        let bs = self.block_size();
        let mut ready = self.carry.len() / bs * bs;
        if hold_last_block && ready == self.carry.len() && ready > 0 {
            ready -= bs;
        }
        ready
    }
}
