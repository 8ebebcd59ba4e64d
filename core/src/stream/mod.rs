//! stream: parallel, chunked bulk transforms over a list of files.
//!
//! Layers, leaf to root: `io` (chunk reader, append writer), `parallelism`
//! (partitioner, executor), `pipeline` (one file), `core` (one job).

pub mod io;
pub mod parallelism;
pub mod pipeline;
pub mod core;

pub use io::{AppendWriter, ChunkEvent, ChunkReader};
pub use parallelism::{partition, run_parallel, ParallelismProfile, Partition};
pub use pipeline::{FileReport, FileStats, TransformPipeline};
pub use self::core::{run_job, EngineConfig, Job, JobObserver, JobReport, SilentObserver};
