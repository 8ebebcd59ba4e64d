//! telemetry/mod.rs
//! Counters, stage timers and immutable run snapshots.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
