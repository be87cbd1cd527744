use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, JoinHandle},
};

use tracing::{debug, warn, Dispatch};

use crate::{
    bounded_channel::BoundedChannel,
    errors::PoolError,
    oneshot::{self, Receiver},
};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed number of named worker threads pulling jobs off a bounded channel.
///
/// Dropping the pool (or calling [`shutdown`](Self::shutdown)) closes the
/// job channel, lets the workers finish whatever is queued and joins them.
pub struct WorkerPool {
    jobs: Arc<BoundedChannel<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `size` workers, each logging through `dispatch`.
    pub fn new(size: usize, dispatch: &Dispatch) -> Result<Self, PoolError> {
        if size == 0 {
            return Err(PoolError::NoWorkers);
        }
        let mut pool = Self {
            jobs: Arc::new(BoundedChannel::new(size)),
            workers: Vec::with_capacity(size),
        };
        for id in 0..size {
            let jobs = pool.jobs.clone();
            let dispatch = dispatch.clone();
            let handle = thread::Builder::new()
                .name(format!("worker-{id}"))
                .spawn(move || {
                    tracing::dispatcher::with_default(&dispatch, || run_worker(&jobs))
                })?;
            pool.workers.push(handle);
        }
        Ok(pool)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn submit<F, R>(&self, f: F) -> Result<TaskHandle<R>, PoolError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let job: Job = Box::new(move || sender.send(f()));
        self.jobs.push(job).map_err(|_| PoolError::ShutDown)?;
        Ok(TaskHandle { receiver })
    }

    /// Runs `f` over every input on the pool and collects the results in
    /// input order.
    pub fn map<I, F, R>(&self, inputs: I, f: F) -> Result<Vec<R>, PoolError>
    where
        I: IntoIterator,
        I::Item: Send + 'static,
        F: Fn(I::Item) -> R + Send + Sync + 'static,
        R: Send + 'static,
    {
        let f = Arc::new(f);
        let handles = inputs
            .into_iter()
            .map(|input| {
                let f = f.clone();
                self.submit(move || f(input))
            })
            .collect::<Result<Vec<_>, _>>()?;
        handles.into_iter().map(TaskHandle::join).collect()
    }

    pub fn shutdown(mut self) -> Result<(), PoolError> {
        self.close_and_join()
    }

    fn close_and_join(&mut self) -> Result<(), PoolError> {
        self.jobs.close();
        let mut result = Ok(());
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                result = Err(PoolError::TaskPanicked);
            }
        }
        result
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if let Err(err) = self.close_and_join() {
            warn!("worker pool shut down uncleanly: {}", err);
        }
    }
}

fn run_worker(jobs: &BoundedChannel<Job>) {
    while let Ok(job) = jobs.pop() {
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            warn!("task panicked");
        }
    }
    debug!("job channel closed, worker exiting");
}

/// The pending result of one [`WorkerPool::submit`]. Must be joined on the
/// thread that submitted it.
pub struct TaskHandle<R> {
    receiver: Receiver<R>,
}

impl<R> TaskHandle<R> {
    pub fn is_finished(&self) -> bool {
        self.receiver.is_ready()
    }

    pub fn join(self) -> Result<R, PoolError> {
        self.receiver
            .receive()
            .map_err(|_| PoolError::TaskPanicked)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::{Duration, Instant},
    };

    use super::*;
    use crate::logging::capture::Captured;

    #[test]
    fn test_submit_returns_result() {
        let pool = WorkerPool::new(2, &Dispatch::none()).unwrap();
        assert_eq!(pool.size(), 2);
        let handle = pool.submit(|| 40 + 2).unwrap();
        while !handle.is_finished() {
            thread::yield_now();
        }
        assert_eq!(handle.join().unwrap(), 42);
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        assert!(matches!(
            WorkerPool::new(0, &Dispatch::none()),
            Err(PoolError::NoWorkers)
        ));
    }

    #[test]
    fn test_map_keeps_input_order() {
        let pool = WorkerPool::new(3, &Dispatch::none()).unwrap();
        let results = pool
            .map(0..10u64, |i| {
                thread::sleep(Duration::from_millis(10 - i));
                i * i
            })
            .unwrap();
        assert_eq!(results, (0..10).map(|i| i * i).collect::<Vec<_>>());
    }

    #[test]
    fn test_workers_run_in_parallel() {
        let pool = WorkerPool::new(3, &Dispatch::none()).unwrap();
        let start = Instant::now();
        pool.map(0..3, |_| thread::sleep(Duration::from_millis(100)))
            .unwrap();
        assert!(start.elapsed() < Duration::from_millis(250));
    }

    #[test]
    fn test_panicking_task_surfaces_error_and_keeps_worker() {
        let pool = WorkerPool::new(1, &Dispatch::none()).unwrap();
        let failing = pool
            .submit(|| -> i32 { panic!("task failure") })
            .unwrap();
        assert!(matches!(failing.join(), Err(PoolError::TaskPanicked)));

        let handle = pool.submit(|| 7).unwrap();
        assert_eq!(handle.join().unwrap(), 7);
    }

    #[test]
    fn test_drop_waits_for_queued_jobs() {
        let done = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::new(2, &Dispatch::none()).unwrap();
            for _ in 0..5 {
                let done = done.clone();
                pool.submit(move || {
                    thread::sleep(Duration::from_millis(10));
                    done.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
            }
        }
        assert_eq!(done.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_submit_after_close_is_rejected() {
        let pool = WorkerPool::new(1, &Dispatch::none()).unwrap();
        pool.jobs.close();
        assert!(matches!(pool.submit(|| ()), Err(PoolError::ShutDown)));
        pool.shutdown().unwrap();
    }

    #[test]
    fn test_drop_logs_panicked_worker() {
        let captured = Captured::default();
        let pool = WorkerPool {
            jobs: Arc::new(BoundedChannel::new(1)),
            workers: vec![thread::spawn(|| panic!("worker failure"))],
        };
        tracing::dispatcher::with_default(&captured.dispatch(), || drop(pool));
        assert!(captured.contains("worker pool shut down uncleanly"));
    }

    #[test]
    fn test_workers_log_through_injected_dispatch() {
        let captured = Captured::default();
        let pool = WorkerPool::new(2, &captured.dispatch()).unwrap();
        pool.submit(|| tracing::info!("hello from the pool"))
            .unwrap()
            .join()
            .unwrap();
        pool.shutdown().unwrap();

        let line = captured
            .lines()
            .into_iter()
            .find(|line| line.contains("hello from the pool"))
            .unwrap();
        assert!(line.contains("worker-"));
    }
}
