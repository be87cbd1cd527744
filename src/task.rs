use std::thread::{self, JoinHandle};

use tracing::{debug, Dispatch};

use crate::errors::PoolError;

/// What happens to a running [`Task`] when its owner lets go of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskLifetime {
    /// Dropping the task blocks until the thread has finished.
    Joined,
    /// Dropping the task leaves the thread running. If the process exits
    /// first, the work is cut short.
    Detached,
}

/// A named thread whose lifetime policy is fixed at spawn time.
pub struct Task {
    handle: Option<JoinHandle<()>>,
    lifetime: TaskLifetime,
}

impl Task {
    pub fn spawn<F>(
        name: &str,
        lifetime: TaskLifetime,
        dispatch: &Dispatch,
        f: F,
    ) -> Result<Self, PoolError>
    where
        F: FnOnce() + Send + 'static,
    {
        let dispatch = dispatch.clone();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || tracing::dispatcher::with_default(&dispatch, f))?;
        Ok(Self {
            handle: Some(handle),
            lifetime,
        })
    }

    pub fn lifetime(&self) -> TaskLifetime {
        self.lifetime
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Waits for the thread whatever the lifetime policy.
    pub fn join(mut self) -> Result<(), PoolError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| PoolError::TaskPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for Task {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        match self.lifetime {
            TaskLifetime::Joined => {
                debug!("waiting for joined task to finish");
                let _ = handle.join();
            }
            TaskLifetime::Detached => {
                debug!("leaving detached task running");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
        time::{Duration, Instant},
    };

    use super::*;

    fn sleeper(duration: Duration) -> (Arc<AtomicBool>, impl FnOnce() + Send + 'static) {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        (finished, move || {
            thread::sleep(duration);
            flag.store(true, Ordering::Release);
        })
    }

    #[test]
    fn test_dropping_joined_task_waits() {
        let (finished, work) = sleeper(Duration::from_millis(50));
        let task = Task::spawn("joined", TaskLifetime::Joined, &Dispatch::none(), work).unwrap();
        drop(task);
        assert!(finished.load(Ordering::Acquire));
    }

    #[test]
    fn test_dropping_detached_task_does_not_wait() {
        let (finished, work) = sleeper(Duration::from_millis(300));
        let start = Instant::now();
        let task =
            Task::spawn("detached", TaskLifetime::Detached, &Dispatch::none(), work).unwrap();
        assert_eq!(task.lifetime(), TaskLifetime::Detached);
        drop(task);
        assert!(start.elapsed() < Duration::from_millis(300));
        assert!(!finished.load(Ordering::Acquire));
    }

    #[test]
    fn test_explicit_join_on_detached_task() {
        let (finished, work) = sleeper(Duration::from_millis(20));
        let task =
            Task::spawn("detached", TaskLifetime::Detached, &Dispatch::none(), work).unwrap();
        task.join().unwrap();
        assert!(finished.load(Ordering::Acquire));
    }

    #[test]
    fn test_panicking_task_reports_on_join() {
        let task = Task::spawn("failing", TaskLifetime::Joined, &Dispatch::none(), || {
            panic!("task failure")
        })
        .unwrap();
        assert!(matches!(task.join(), Err(PoolError::TaskPanicked)));
    }
}
