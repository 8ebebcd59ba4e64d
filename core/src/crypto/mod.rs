//! crypto: cipher catalog, raw block ciphers, padding and the chunked stream cipher.

pub mod types;
pub mod block;
pub mod padding;
pub mod stream;

pub use types::*;
pub use block::*;
pub use stream::*;
