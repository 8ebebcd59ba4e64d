//! stream/parallelism.rs
//! Work partitioning and the scoped-thread executor.

use std::ops::Range;
use std::thread;

/// Contiguous slice `[start, end)` of the job's file list owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub rank: usize,
    pub start: usize,
    pub end: usize,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Split `[0, item_count)` into `worker_count` contiguous partitions.
///
/// The first `item_count % worker_count` partitions get one extra item.
/// Partitions past the item count are empty. A worker count of zero is
/// treated as one.
pub fn partition(item_count: usize, worker_count: usize) -> Vec<Partition> {
    let workers = worker_count.max(1);
    let base = item_count / workers;
    let remainder = item_count % workers;

    let mut parts = Vec::with_capacity(workers);
    let mut start = 0;
    for rank in 0..workers {
        let len = base + usize::from(rank < remainder);
        parts.push(Partition { rank, start, end: start + len });
        start += len;
    }
    parts
}

/// Parallelism configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelismProfile {
    pub max_workers: usize,
}

impl ParallelismProfile {
    pub fn single_threaded() -> Self {
        Self { max_workers: 1 }
    }

    pub fn new(max_workers: usize) -> Self {
        Self { max_workers: max_workers.max(1) }
    }

    /// One worker per logical core.
    pub fn dynamic() -> Self {
        Self::new(num_cpus::get())
    }

    /// Workers actually launched for `item_count` items: never more than the
    /// items, never fewer than one.
    pub fn worker_count_for(&self, item_count: usize) -> usize {
        item_count.min(self.max_workers).max(1)
    }
}

impl Default for ParallelismProfile {
    fn default() -> Self {
        Self::dynamic()
    }
}

/// Run `worker_fn` once per non-empty partition, each on its own thread named
/// `worker-<rank>`, and block until all of them have finished.
///
/// A panicking worker is re-raised on the caller once every other worker has
/// joined.
pub fn run_parallel<F>(item_count: usize, profile: &ParallelismProfile, worker_fn: F)
where
    F: Fn(Partition) + Sync,
{
    let workers = profile.worker_count_for(item_count);
    let parts = partition(item_count, workers);
    let worker_fn = &worker_fn;

    thread::scope(|scope| {
        for part in parts.into_iter().filter(|p| !p.is_empty()) {
            let spawned = thread::Builder::new()
                .name(format!("worker-{}", part.rank))
                .spawn_scoped(scope, move || {
                    tracing::debug!(rank = part.rank, start = part.start, end = part.end, "worker started");
                    worker_fn(part);
                    tracing::debug!(rank = part.rank, "worker finished");
                });

            // Thread creation failed: do the partition on the caller instead of dropping it.
            if let Err(e) = spawned {
                tracing::warn!(rank = part.rank, error = %e, "could not spawn worker thread, running inline");
                worker_fn(part);
            }
        }
    });
}
