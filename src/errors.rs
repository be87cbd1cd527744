use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    #[error("channel is closed")]
    Closed,

    #[error("stop signal is set, item rejected")]
    Stopped,
}

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("pool has been shut down")]
    ShutDown,

    #[error("a worker pool needs at least one worker")]
    NoWorkers,

    #[error("task panicked before producing a result")]
    TaskPanicked,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}
