//! utils.rs
//! Output naming and timestamp helpers.
//!
//! Summary: maps a source file name to its output name and stamps the
//! per-job output directory.

use std::ffi::{OsStr, OsString};

use chrono::Utc;

use crate::constants::CIPHER_SUFFIX;
use crate::crypto::Mode;

/// Milliseconds since the Unix epoch, used to stamp output directories.
pub fn epoch_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `<Encryption|Decryption>_<millis>`
pub fn output_dir_name(mode: Mode, started_at_millis: i64) -> String {
    format!("{}_{}", mode.dir_label(), started_at_millis)
}

/// Output file name for `source` under `mode`.
///
/// Encrypting appends `.ciph`. Decrypting strips a trailing `.ciph` when the
/// remaining stem is non-empty, otherwise the name passes through unchanged.
pub fn output_file_name(source: &OsStr, mode: Mode) -> OsString {
    match mode {
        Mode::Encrypt => {
            let mut name = source.to_os_string();
            name.push(CIPHER_SUFFIX);
            name
        }
        Mode::Decrypt => {
            // Non-UTF-8 names cannot carry the ASCII suffix in a form we can slice.
            match source.to_str() {
                Some(s) => match s.strip_suffix(CIPHER_SUFFIX) {
                    Some(stem) if !stem.is_empty() => OsString::from(stem),
                    _ => source.to_os_string(),
                },
                None => source.to_os_string(),
            }
        }
    }
}
