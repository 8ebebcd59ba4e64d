//! bulkcrypt-core
//!
//! Parallel, chunked block-cipher transforms over directory trees.
//! Pure Rust, no terminal I/O beyond `tracing` events.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

pub mod crypto;
pub mod discovery;
pub mod telemetry;

// Stream layers
pub mod stream;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::crypto::{Algorithm, CipherSpec, CryptoError, Mode, StreamCipher};
    pub use crate::discovery::collect_files;
    pub use crate::stream::{
        run_job, EngineConfig, FileReport, Job, JobObserver, JobReport, ParallelismProfile, SilentObserver,
    };
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::types::{FailureKind, StreamError};
}
