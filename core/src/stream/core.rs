//! stream/core.rs
//! Stable public API: job construction, engine configuration and the runner.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam::channel::unbounded;

use crate::constants::{DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, MAX_WORKERS};
use crate::crypto::{Algorithm, CipherSpec, Mode};
use crate::discovery::collect_files;
use crate::stream::parallelism::{run_parallel, ParallelismProfile};
use crate::stream::pipeline::{FileReport, TransformPipeline};
use crate::telemetry::{TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::StreamError;
use crate::utils::{epoch_millis, output_dir_name};

/// Everything one run needs. Immutable once built.
#[derive(Clone)]
pub struct Job {
    mode: Mode,
    algorithm: Algorithm,
    key: Vec<u8>,
    files: Vec<PathBuf>,
    output_dir_name: String,
}

impl Job {
    /// Build a job over an explicit file list.
    ///
    /// The key is checked against the algorithm first; an empty list is
    /// rejected. The output directory is stamped with the current time.
    pub fn new(mode: Mode, algorithm: Algorithm, key: &[u8], files: Vec<PathBuf>) -> Result<Self, StreamError> {
        algorithm.validate_key(key)?;
        if files.is_empty() {
            return Err(StreamError::EmptyFileList { root: PathBuf::new() });
        }
        Ok(Self {
            mode,
            algorithm,
            key: key.to_vec(),
            files,
            output_dir_name: output_dir_name(mode, epoch_millis()),
        })
    }

    /// Build a job over every regular file under `root`.
    pub fn from_root(mode: Mode, algorithm: Algorithm, key: &[u8], root: &Path) -> Result<Self, StreamError> {
        algorithm.validate_key(key)?;
        let files = collect_files(root)?;
        if files.is_empty() {
            return Err(StreamError::EmptyFileList { root: root.to_path_buf() });
        }
        Self::new(mode, algorithm, key, files)
    }

    /// Override the timestamped output directory name.
    pub fn with_output_dir_name(mut self, name: impl Into<String>) -> Self {
        self.output_dir_name = name.into();
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn output_dir_name(&self) -> &str {
        &self.output_dir_name
    }

    pub fn cipher_spec(&self) -> Result<CipherSpec, StreamError> {
        Ok(CipherSpec::new(self.algorithm, self.mode, &self.key)?)
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("mode", &self.mode)
            .field("algorithm", &self.algorithm)
            .field("key", &format_args!("<{} bytes>", self.key.len()))
            .field("files", &self.files.len())
            .field("output_dir_name", &self.output_dir_name)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bytes requested from the input per read.
    pub chunk_size: usize,
    pub profile: ParallelismProfile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            profile: ParallelismProfile::dynamic(),
        }
    }
}

impl EngineConfig {
    pub fn new(chunk_size: usize, profile: ParallelismProfile) -> Self {
        Self { chunk_size, profile }
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(StreamError::InvalidConfig(format!(
                "chunk size must be within 1..={MAX_CHUNK_SIZE} bytes, got {}",
                self.chunk_size
            )));
        }
        if self.profile.max_workers == 0 || self.profile.max_workers > MAX_WORKERS {
            return Err(StreamError::InvalidConfig(format!(
                "worker count must be within 1..={MAX_WORKERS}, got {}",
                self.profile.max_workers
            )));
        }
        Ok(())
    }
}

/// Receives per-file outcomes on the thread that called `run_job`.
pub trait JobObserver {
    fn on_job_started(&mut self, _job: &Job, _workers: usize) {}

    fn on_file_completed(&mut self, _report: &FileReport) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl JobObserver for SilentObserver {}

#[derive(Debug)]
pub struct JobReport {
    pub mode: Mode,
    pub algorithm: Algorithm,
    pub output_dir_name: String,
    /// Per-file outcomes in completion order.
    pub files: Vec<FileReport>,
    pub snapshot: TelemetrySnapshot,
}

impl JobReport {
    pub fn has_failures(&self) -> bool {
        self.files.iter().any(|r| !r.is_success())
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|r| r.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|r| !r.is_success())
    }

    pub fn report_for(&self, source: &Path) -> Option<&FileReport> {
        self.files.iter().find(|r| r.source == source)
    }
}

/// Run `job` to completion.
///
/// Setup errors (config, key) are returned before any worker starts. Per-file
/// failures never abort the run; they show up in the report.
pub fn run_job(job: &Job, config: &EngineConfig, observer: &mut dyn JobObserver) -> Result<JobReport, StreamError> {
    config.validate()?;
    let spec = job.cipher_spec()?;
    let pipeline = TransformPipeline::new(&spec, job.output_dir_name(), config.chunk_size);

    let files = job.files();
    let conflicts = conflicting_destinations(&pipeline, files);
    let workers = config.profile.worker_count_for(files.len());
    tracing::info!(
        mode = %job.mode(),
        algorithm = %job.algorithm(),
        files = files.len(),
        workers,
        output_dir = job.output_dir_name(),
        "job started"
    );
    observer.on_job_started(job, workers);

    let mut timer = TelemetryTimer::new();
    let mut counters = TelemetryCounters::default();
    let mut reports = Vec::with_capacity(files.len());

    let (tx, rx) = unbounded::<FileReport>();

    thread::scope(|scope| {
        let pipeline = &pipeline;
        let profile = &config.profile;
        let conflicts = &conflicts;

        // Coordinator: fans the work out and drops the sender once every worker joined.
        scope.spawn(move || {
            run_parallel(files.len(), profile, |part| {
                for idx in part.range() {
                    let path = &files[idx];
                    let report = match conflicts.get(&idx) {
                        Some(dest) => pipeline.reject_conflict(part.rank, path, dest),
                        None => pipeline.run_file(part.rank, path),
                    };
                    if tx.send(report).is_err() {
                        break;
                    }
                }
            });
        });

        for report in rx.iter() {
            match &report.result {
                Ok(stats) => {
                    counters.add_file(stats.chunks, stats.bytes_in, stats.bytes_out);
                    timer.stage_times.merge(&stats.stage_times);
                }
                Err(e) => counters.add_failure(e.kind()),
            }
            observer.on_file_completed(&report);
            reports.push(report);
        }
    });

    timer.finish();
    let snapshot = TelemetrySnapshot::from(&counters, &timer);
    tracing::info!(
        ok = counters.files_ok,
        failed = counters.files_failed,
        elapsed_ms = snapshot.elapsed_ms() as u64,
        "job finished"
    );

    Ok(JobReport {
        mode: job.mode(),
        algorithm: job.algorithm(),
        output_dir_name: job.output_dir_name().to_string(),
        files: reports,
        snapshot,
    })
}

/// Files whose output path an earlier file of the job already maps to, keyed
/// by index. Decrypting both `x` and `x.ciph` from one directory is the usual
/// case; only the first of them may write.
fn conflicting_destinations(pipeline: &TransformPipeline<'_>, files: &[PathBuf]) -> HashMap<usize, PathBuf> {
    let mut claimed = HashSet::with_capacity(files.len());
    let mut conflicts = HashMap::new();
    for (idx, path) in files.iter().enumerate() {
        let Ok(dest) = pipeline.output_path_for(path) else {
            continue;
        };
        if !claimed.insert(dest.clone()) {
            conflicts.insert(idx, dest);
        }
    }
    conflicts
}
