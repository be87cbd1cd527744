pub mod bounded_channel;
pub mod counter;
pub mod demos;
pub mod errors;
pub mod exclusive_lock;
pub mod logging;
pub mod oneshot;
pub mod pool;
pub mod stop_signal;
pub mod task;
pub mod workers;
