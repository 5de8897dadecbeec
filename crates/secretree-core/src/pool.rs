//! Bounded worker pool
//!
//! A caller-owned pool: it holds only its size, and each [`WorkerPool::run`]
//! call spawns at most that many scoped threads. Jobs go through a bounded
//! queue; results flow back to the calling thread, which is the single
//! collector. `run` returns only after every job has finished, so no worker
//! outlives the call.

use std::thread;

use crossbeam::channel;
use tracing::debug;

/// Concurrency used when none (or zero) is configured
pub const DEFAULT_CONCURRENCY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPool {
    size: usize,
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl WorkerPool {
    /// Create a pool running at most `size` jobs at once; 0 means the default
    pub fn new(size: usize) -> Self {
        let size = if size == 0 { DEFAULT_CONCURRENCY } else { size };
        Self { size }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run `work` over every job and return the results in job order
    pub fn run<J, R, F>(&self, jobs: Vec<J>, work: F) -> Vec<R>
    where
        J: Send,
        R: Send,
        F: Fn(J) -> R + Sync,
    {
        let total = jobs.len();
        if total == 0 {
            return Vec::new();
        }

        let workers = self.size.min(total);
        debug!(jobs = total, workers, "starting worker pool");

        let (job_tx, job_rx) = channel::bounded::<(usize, J)>(workers);
        let (result_tx, result_rx) = channel::unbounded::<(usize, R)>();

        let mut results = thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let work = &work;
                scope.spawn(move || {
                    for (index, job) in job_rx.iter() {
                        if result_tx.send((index, work(job))).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(job_rx);
            drop(result_tx);

            for job in jobs.into_iter().enumerate() {
                if job_tx.send(job).is_err() {
                    break;
                }
            }
            drop(job_tx);

            result_rx.iter().collect::<Vec<_>>()
        });

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_zero_uses_default() {
        assert_eq!(WorkerPool::new(0).size(), DEFAULT_CONCURRENCY);
        assert_eq!(WorkerPool::default().size(), DEFAULT_CONCURRENCY);
        assert_eq!(WorkerPool::new(3).size(), 3);
    }

    #[test]
    fn test_empty_jobs() {
        let results: Vec<u32> = WorkerPool::new(4).run(Vec::<u32>::new(), |j| j);
        assert!(results.is_empty());
    }

    #[test]
    fn test_results_in_job_order() {
        let jobs: Vec<u64> = (0..100).collect();
        let results = WorkerPool::new(8).run(jobs, |j| {
            thread::sleep(Duration::from_micros((100 - j) * 10));
            j * 2
        });
        assert_eq!(results, (0..100).map(|j| j * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_never_exceeds_ceiling() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let done = AtomicUsize::new(0);

        WorkerPool::new(3).run((0..30).collect::<Vec<_>>(), |_| {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            in_flight.fetch_sub(1, Ordering::SeqCst);
            done.fetch_add(1, Ordering::SeqCst);
        });

        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(done.load(Ordering::SeqCst), 30);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }
}
