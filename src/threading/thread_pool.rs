use log::info;
use rayon::ThreadPoolBuilder;

use crate::error::Result;

// A wrapper around Rayon's ThreadPool that keeps chunk building off rayon's global pool
#[derive(Debug)]
pub struct ThreadPool {
    pool: rayon::ThreadPool,
    num_threads: usize,
}

impl ThreadPool {
    // Create a new ThreadPool with the specified number of threads
    // If size is 0, it will use num_cpus::get() to determine the optimal number
    pub fn new(size: usize) -> Result<ThreadPool> {
        let num_threads = if size > 0 { size } else { num_cpus::get() };

        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|index| format!("chunkland-worker-{}", index))
            .build()?;

        info!("ThreadPool: created with {} threads", num_threads);

        Ok(ThreadPool { pool, num_threads })
    }

    // Run a closure inside the pool so nested rayon iterators use its workers (blocking)
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.pool.install(f)
    }

    // Get the number of threads in the pool
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }
}
