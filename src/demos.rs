//! One entry point per demonstration. Each takes the log sink to hand to the
//! threads it starts plus its settings, and reports what it observed.

use std::{sync::Arc, thread, time::Duration};

use tracing::{info, Dispatch};

use crate::{
    bounded_channel::BoundedChannel,
    counter::SharedCounter,
    errors::PoolError,
    logging,
    pool::WorkerPool,
    stop_signal::StopSignal,
    task::{Task, TaskLifetime},
    workers::{consumer, long_task, producer, random_message},
};

/// Runs `demo` with a stdout sink installed for the calling thread and
/// handed to everything the demo spawns.
pub fn run<F, T>(demo: F) -> Result<T, PoolError>
where
    F: FnOnce(&Dispatch) -> Result<T, PoolError>,
{
    let dispatch = logging::stdout_dispatch();
    tracing::dispatcher::with_default(&dispatch, || demo(&dispatch))
}

pub struct ProducerConsumerSettings {
    pub capacity: usize,
    pub workers: usize,
    /// How long the producer runs before the stop signal is set.
    pub run_for: Duration,
    /// How often blocked workers re-check the stop signal.
    pub poll: Duration,
}

impl Default for ProducerConsumerSettings {
    fn default() -> Self {
        Self {
            capacity: 3,
            workers: 2,
            run_for: Duration::from_millis(1),
            poll: Duration::from_millis(10),
        }
    }
}

#[derive(Debug)]
pub struct Exchanged {
    pub published: Vec<u32>,
    pub consumed: Vec<u32>,
}

pub fn producer_consumer(
    dispatch: &Dispatch,
    settings: &ProducerConsumerSettings,
) -> Result<Exchanged, PoolError> {
    let channel = Arc::new(BoundedChannel::new(settings.capacity));
    let stop = StopSignal::new();
    let pool = WorkerPool::new(settings.workers, dispatch)?;
    let poll = settings.poll;

    info!("Starting to send messages to producer.");
    let published = {
        let channel = channel.clone();
        let stop = stop.clone();
        pool.submit(move || producer(&channel, &stop, poll, random_message))?
    };
    let consumed = {
        let channel = channel.clone();
        let stop = stop.clone();
        pool.submit(move || consumer(&channel, &stop, poll))?
    };

    thread::sleep(settings.run_for);
    stop.set();
    info!("Stopping to send messages to producer.");

    let exchanged = Exchanged {
        published: published.join()?,
        consumed: consumed.join()?,
    };
    pool.shutdown()?;
    Ok(exchanged)
}

pub struct LockSettings {
    pub workers: usize,
    /// Simulated work between reading and writing the counter.
    pub latency: Duration,
    /// Gap between the unguarded and the guarded run.
    pub pause: Duration,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            workers: 3,
            latency: Duration::from_secs(1),
            pause: Duration::from_millis(500),
        }
    }
}

/// Final counter values of the unguarded and the guarded run.
#[derive(Debug)]
pub struct LockOutcome {
    pub unguarded: i64,
    pub guarded: i64,
}

pub fn lock(dispatch: &Dispatch, settings: &LockSettings) -> Result<LockOutcome, PoolError> {
    let counter = Arc::new(SharedCounter::new(settings.latency));

    info!("Updating state without lock.");
    {
        let pool = WorkerPool::new(settings.workers, dispatch)?;
        let counter = counter.clone();
        pool.map(1..3, move |delta| counter.no_lock_update(delta))?;
    }
    let unguarded = counter.value();
    info!("Final state without lock = {}.", unguarded);

    thread::sleep(settings.pause);
    counter.reset();

    info!("Updating state with lock.");
    {
        let pool = WorkerPool::new(settings.workers, dispatch)?;
        let counter = counter.clone();
        pool.map(1..3, move |delta| counter.guarded_update(delta))?;
    }
    let guarded = counter.value();
    info!("Final state with lock = {}.", guarded);

    Ok(LockOutcome { unguarded, guarded })
}

pub struct LongTaskSettings {
    pub workers: usize,
    /// How long one long task sleeps.
    pub duration: Duration,
    /// Gap between the two halves of a comparison.
    pub gap: Duration,
}

impl Default for LongTaskSettings {
    fn default() -> Self {
        Self {
            workers: 3,
            duration: Duration::from_secs(2),
            gap: Duration::from_secs(4),
        }
    }
}

pub fn thread_pooling(
    dispatch: &Dispatch,
    settings: &LongTaskSettings,
) -> Result<Vec<usize>, PoolError> {
    let pool = WorkerPool::new(settings.workers, dispatch)?;
    let duration = settings.duration;
    let finished = pool.map(0..settings.workers, move |id| long_task(id, duration))?;
    pool.shutdown()?;
    Ok(finished)
}

pub fn thread_no_thread(
    dispatch: &Dispatch,
    settings: &LongTaskSettings,
) -> Result<(), PoolError> {
    let duration = settings.duration;

    info!("Without threading...");
    info!("Starting program.");
    info!("No threading - run task directly.");
    long_task(0, duration);
    info!("Stopping program.");

    thread::sleep(settings.gap);

    info!("With threading...");
    info!("Starting program.");
    let task = Task::spawn("long-task", TaskLifetime::Joined, dispatch, move || {
        long_task(1, duration);
    })?;
    info!("Started thread.");
    info!("Stopping program.");
    //  joined: the program can't end before the task does
    drop(task);
    Ok(())
}

/// Returns the detached task so callers can observe it was left running.
pub fn daemon_no_daemon(
    dispatch: &Dispatch,
    settings: &LongTaskSettings,
) -> Result<Task, PoolError> {
    let duration = settings.duration;

    info!("Joined task...");
    info!("Starting program.");
    let joined = Task::spawn("joined-task", TaskLifetime::Joined, dispatch, move || {
        long_task(0, duration);
    })?;
    info!("Started joined task.");
    info!("Stopping program.");

    thread::sleep(settings.gap);

    info!("Detached task...");
    info!("Starting program.");
    let detached = Task::spawn("detached-task", TaskLifetime::Detached, dispatch, move || {
        long_task(1, duration);
    })?;
    info!("Started detached task.");
    info!("Stopping program.");

    drop(joined);
    Ok(detached)
}
