//! stream/io.rs
//! Chunked file channel: a pull-based chunk reader and an appending writer.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::types::StreamError;

/// One chunk of a file, in file order.
///
/// The last event of a file always has `is_final = true`, even when empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkEvent {
    pub bytes: Bytes,
    pub is_final: bool,
}

impl ChunkEvent {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Fill up to `len` bytes from `r`, stopping early only at end of input.
pub fn read_exact_or_eof<R: Read>(r: &mut R, len: usize) -> io::Result<Bytes> {
    let mut buf = vec![0u8; len];
    let mut off = 0;

    while off < len {
        match r.read(&mut buf[off..]) {
            Ok(0) => break,
            Ok(n) => off += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    buf.truncate(off);
    Ok(Bytes::from(buf))
}

/// Sequential chunk reader over any `Read`.
///
/// Yields `Ok(ChunkEvent)` until the final event, then `None`. An I/O error is
/// yielded once and ends the sequence.
pub struct ChunkReader<R: Read> {
    inner: R,
    path: PathBuf,
    chunk_size: usize,
    done: bool,
}

impl ChunkReader<File> {
    /// Open `path` for chunked reading. A missing file is `NotFound`.
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self, StreamError> {
        let file = File::open(path).map_err(|e| StreamError::io(path, e))?;
        Ok(Self::new(file, path, chunk_size))
    }
}

impl<R: Read> ChunkReader<R> {
    /// `path` is only used to label errors. A zero `chunk_size` is bumped to 1.
    pub fn new(inner: R, path: &Path, chunk_size: usize) -> Self {
        Self {
            inner,
            path: path.to_path_buf(),
            chunk_size: chunk_size.max(1),
            done: false,
        }
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<ChunkEvent, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match read_exact_or_eof(&mut self.inner, self.chunk_size) {
            Ok(bytes) => {
                let is_final = bytes.len() < self.chunk_size;
                self.done = is_final;
                Some(Ok(ChunkEvent { bytes, is_final }))
            }
            Err(e) => {
                self.done = true;
                Some(Err(StreamError::io(&self.path, e)))
            }
        }
    }
}

/// Append-only output file. Created (or truncated) on open; the handle is
/// released when the writer is dropped, on every path.
pub struct AppendWriter {
    inner: BufWriter<File>,
    path: PathBuf,
    written: u64,
}

impl AppendWriter {
    pub fn create(path: &Path) -> Result<Self, StreamError> {
        let file = File::create(path).map_err(|e| StreamError::io(path, e))?;
        Ok(Self {
            inner: BufWriter::new(file),
            path: path.to_path_buf(),
            written: 0,
        })
    }

    pub fn append(&mut self, data: &[u8]) -> Result<(), StreamError> {
        if data.is_empty() {
            return Ok(());
        }
        self.inner
            .write_all(data)
            .map_err(|e| StreamError::Io { path: self.path.clone(), source: e })?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Bytes appended so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush buffered bytes and close the file.
    pub fn finish(mut self) -> Result<u64, StreamError> {
        self.inner
            .flush()
            .map_err(|e| StreamError::Io { path: self.path.clone(), source: e })?;
        Ok(self.written)
    }
}

/// Create `dir` (and parents) unless it already exists as a directory.
///
/// Safe to race from several workers: losing the race is success.
pub fn create_dir_if_absent(dir: &Path) -> Result<(), StreamError> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(StreamError::Io { path: dir.to_path_buf(), source: e }),
    }
}
