//! Bounded worker pool for the parallel block merge.

use std::sync::{
    OnceLock,
    atomic::{AtomicUsize, Ordering},
};

use rayon::prelude::*;

/// A fixed-size pool that evaluates independent block operations.
///
/// Work is submitted as a slice of items and returned in the order of that
/// slice, regardless of which worker finishes first. The calling thread blocks
/// until every item has been evaluated; there is no cancellation.
pub struct MergePool {
    thread_pool: rayon::ThreadPool,
}

static GLOBAL_POOL_SIZE: AtomicUsize = AtomicUsize::new(0);

impl MergePool {
    /// Smallest number of items handed to a worker as one unit.
    const MIN_CHUNK_LEN: usize = 16;

    /// Creates a pool with `num_threads` workers.
    pub fn new(num_threads: usize) -> Result<MergePool, rayon::ThreadPoolBuildError> {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads.max(1))
            .thread_name(|i| format!("polarbits_merge_{i}"))
            .build()?;
        Ok(MergePool { thread_pool })
    }

    /// Sets the size of the global pool.
    ///
    /// Only effective when called before the first use of [`global()`](Self::global).
    /// Values less than 1 are clamped to 1.
    pub fn configure_global_pool_size(pool_size: usize) {
        GLOBAL_POOL_SIZE.store(pool_size.max(1), Ordering::SeqCst);
    }

    /// The process-wide pool, started on first use.
    ///
    /// Returns `None` if the worker threads could not be started; callers
    /// then evaluate sequentially.
    pub fn global() -> Option<&'static MergePool> {
        static POOL: OnceLock<Option<MergePool>> = OnceLock::new();
        POOL.get_or_init(|| {
            let size = Self::get_global_pool_size();
            match MergePool::new(size) {
                Ok(pool) => {
                    log::debug!("started merge pool with {size} threads");
                    Some(pool)
                }
                Err(e) => {
                    log::warn!("failed to start merge pool: {e}");
                    None
                }
            }
        })
        .as_ref()
    }

    pub fn thread_count(&self) -> usize {
        self.thread_pool.current_num_threads()
    }

    /// Number of items per work chunk for `len` items.
    pub fn chunk_len(&self, len: usize, max_degree: Option<usize>) -> usize {
        let by_threads = len / (self.thread_count() * 4).max(1);
        let by_degree = max_degree.map_or(0, |degree| len.div_ceil(degree.max(1)));
        by_threads.max(by_degree).max(Self::MIN_CHUNK_LEN)
    }

    /// Applies `f` to every item and returns the results in item order.
    pub fn map_ordered<T, R, F>(&self, items: &[T], max_degree: Option<usize>, f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Send + Sync,
    {
        let chunk_len = self.chunk_len(items.len(), max_degree);
        self.thread_pool.install(|| {
            items
                .par_chunks(chunk_len)
                .map(|chunk| chunk.iter().map(&f).collect::<Vec<_>>())
                .collect::<Vec<_>>()
                .into_iter()
                .flatten()
                .collect()
        })
    }

    fn get_global_pool_size() -> usize {
        let size = GLOBAL_POOL_SIZE.load(Ordering::SeqCst);
        if size == 0 {
            std::thread::available_parallelism()
                .map(|n| (n.get() * 3 + 1) / 2)
                .unwrap_or(8)
        } else {
            size
        }
    }
}
