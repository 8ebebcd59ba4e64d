//! constants.rs
//! Fixed values shared by the reader, the pipeline and the CLI.

/// Suffix appended to encrypted outputs and stripped from decrypt targets.
pub const CIPHER_SUFFIX: &str = ".ciph";

/// Defaults when Option<T> is None
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024; // 64 KiB

/// Max chunk size sanity bound (32 MiB).
pub const MAX_CHUNK_SIZE: usize = 32 * 1024 * 1024;

/// Upper bound on worker threads accepted from configuration.
pub const MAX_WORKERS: usize = 256;

/// Directory labels used in `<label>_<epoch millis>` output directories.
pub mod dir_labels {
    pub const ENCRYPTION: &str = "Encryption";
    pub const DECRYPTION: &str = "Decryption";
}
