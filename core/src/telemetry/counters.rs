//! telemetry/counters.rs
//! Mutable counters used during a bulk transform run.
//!
//! Summary: Collects file outcomes and byte counts as reports arrive.
//! Converted into an immutable TelemetrySnapshot at the end of the run.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::types::FailureKind;

/// Deterministic counters collected during a run
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub files_ok: u64,
    pub files_failed: u64,
    pub files_not_found: u64,
    pub chunks: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl TelemetryCounters {
    /// Record one fully transformed file.
    ///
    /// - `chunks`: chunk events consumed from the input
    /// - `bytes_in`: input bytes read
    /// - `bytes_out`: output bytes appended
    pub fn add_file(&mut self, chunks: u64, bytes_in: u64, bytes_out: u64) {
        self.files_ok += 1;
        self.chunks += chunks;
        self.bytes_in += bytes_in;
        self.bytes_out += bytes_out;
    }

    /// Record one failed file. Not-found inputs are counted on their own as well.
    pub fn add_failure(&mut self, kind: FailureKind) {
        self.files_failed += 1;
        if kind == FailureKind::NotFound {
            self.files_not_found += 1;
        }
    }

    pub fn files_total(&self) -> u64 {
        self.files_ok + self.files_failed
    }

    // Per-worker counters are merged once on the collecting thread: no locks or atomics.
    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.files_ok += other.files_ok;
        self.files_failed += other.files_failed;
        self.files_not_found += other.files_not_found;
        self.chunks += other.chunks;
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
