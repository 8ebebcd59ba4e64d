//! stream/pipeline.rs
//! Per-file read -> transform -> write loop.
//!
//! Summary: one `TransformPipeline` is shared by every worker of a job. Each
//! `run_file` call builds its own `StreamCipher`, so no cipher state is ever
//! shared between files or threads. Every error is folded into the returned
//! `FileReport`; nothing escapes past one file.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::crypto::{CipherSpec, StreamCipher};
use crate::stream::io::{create_dir_if_absent, AppendWriter, ChunkReader};
use crate::telemetry::{Stage, StageTimes};
use crate::types::StreamError;
use crate::utils::output_file_name;

/// Counters for one successfully transformed file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileStats {
    pub chunks: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub stage_times: StageTimes,
}

/// Outcome of one file, sent from the worker to the collecting thread.
#[derive(Debug)]
pub struct FileReport {
    /// Rank of the worker that handled the file.
    pub rank: usize,
    pub source: PathBuf,
    /// Output path, once it could be resolved.
    pub destination: Option<PathBuf>,
    pub result: Result<FileStats, StreamError>,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn error(&self) -> Option<&StreamError> {
        self.result.as_ref().err()
    }

    /// `<output dir>/<output name>` when the destination is known.
    pub fn display_destination(&self) -> Option<String> {
        let dest = self.destination.as_ref()?;
        let name = dest.file_name()?.to_string_lossy();
        match dest.parent().and_then(Path::file_name) {
            Some(dir) => Some(format!("{}/{}", dir.to_string_lossy(), name)),
            None => Some(name.into_owned()),
        }
    }

    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

pub struct TransformPipeline<'a> {
    spec: &'a CipherSpec,
    output_dir_name: &'a str,
    chunk_size: usize,
}

impl<'a> TransformPipeline<'a> {
    pub fn new(spec: &'a CipherSpec, output_dir_name: &'a str, chunk_size: usize) -> Self {
        Self { spec, output_dir_name, chunk_size }
    }

    /// `<parent of source>/<output dir name>/<output file name>`
    pub fn output_path_for(&self, source: &Path) -> Result<PathBuf, StreamError> {
        let name = source.file_name().ok_or_else(|| StreamError::Io {
            path: source.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        })?;
        let parent = source.parent().unwrap_or_else(|| Path::new(""));
        Ok(parent
            .join(self.output_dir_name)
            .join(output_file_name(name, self.spec.mode())))
    }

    /// Transform one file and report the outcome.
    pub fn run_file(&self, rank: usize, source: &Path) -> FileReport {
        let mut destination = None;
        let result = self.transform(source, &mut destination);

        match &result {
            Ok(stats) => tracing::debug!(
                rank,
                path = %source.display(),
                chunks = stats.chunks,
                bytes_in = stats.bytes_in,
                bytes_out = stats.bytes_out,
                "file transformed"
            ),
            Err(e) => tracing::warn!(rank, path = %source.display(), kind = %e.kind(), error = %e, "file failed"),
        }

        FileReport {
            rank,
            source: source.to_path_buf(),
            destination,
            result,
        }
    }

    /// Fail `source` without touching the file system because another input
    /// of the same job already owns `destination`.
    pub fn reject_conflict(&self, rank: usize, source: &Path, destination: &Path) -> FileReport {
        let err = StreamError::Io {
            path: destination.to_path_buf(),
            source: io::Error::new(io::ErrorKind::AlreadyExists, "output path is taken by another input"),
        };
        tracing::warn!(rank, path = %source.display(), dest = %destination.display(), "output path conflict");
        FileReport {
            rank,
            source: source.to_path_buf(),
            destination: None,
            result: Err(err),
        }
    }

    fn transform(&self, source: &Path, destination: &mut Option<PathBuf>) -> Result<FileStats, StreamError> {
        // Input first: a missing file must not leave an output directory behind.
        let reader = ChunkReader::open(source, self.chunk_size)?;

        let out_path = self.output_path_for(source)?;
        if let Some(dir) = out_path.parent() {
            create_dir_if_absent(dir)?;
        }
        *destination = Some(out_path.clone());

        let mut cipher = StreamCipher::new(self.spec).map_err(|e| StreamError::transform(source, e))?;
        let mut writer = AppendWriter::create(&out_path)?;
        let mut stats = FileStats::default();

        let mut read_started = Instant::now();
        for event in reader {
            let event = event?;
            stats.stage_times.add(Stage::Read, read_started.elapsed());
            stats.chunks += 1;
            stats.bytes_in += event.len() as u64;

            let t = Instant::now();
            let out = cipher
                .update(&event.bytes, event.is_final)
                .map_err(|e| StreamError::transform(source, e))?;
            stats.stage_times.add(Stage::Transform, t.elapsed());

            let t = Instant::now();
            writer.append(&out)?;
            stats.stage_times.add(Stage::Write, t.elapsed());

            read_started = Instant::now();
        }

        let t = Instant::now();
        stats.bytes_out = writer.finish()?;
        stats.stage_times.add(Stage::Write, t.elapsed());

        Ok(stats)
    }
}
