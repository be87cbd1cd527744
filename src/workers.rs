use std::{fmt::Display, thread, time::Duration};

use rand::Rng;
use tracing::{debug, info};

use crate::{bounded_channel::BoundedChannel, stop_signal::StopSignal};

/// Simulated slow work: logs, sleeps `duration`, logs again.
pub fn long_task(id: usize, duration: Duration) -> usize {
    info!("Starting long task {}.", id);
    thread::sleep(duration);
    info!("Ending long task {}.", id);
    id
}

/// A message for the producer, uniformly drawn from `1..101`.
pub fn random_message() -> u32 {
    rand::thread_rng().gen_range(1..101)
}

/// Publishes generated messages until `stop` is set and returns what was
/// actually accepted by the channel, in order.
pub fn producer<T, G>(
    channel: &BoundedChannel<T>,
    stop: &StopSignal,
    poll: Duration,
    mut generate: G,
) -> Vec<T>
where
    T: Copy + Display,
    G: FnMut() -> T,
{
    let mut published = Vec::new();
    while !stop.is_set() {
        let message = generate();
        info!(
            "Publishing message: {} - Queue size: {}.",
            message,
            channel.len()
        );
        if let Err(err) = channel.push_unless_stopped(message, stop, poll) {
            debug!("Dropped message {}: {}.", message, err);
            break;
        }
        published.push(message);
        info!(
            "Published message {} - Queue size: {}.",
            message,
            channel.len()
        );
    }
    info!("No more messages to produce.");
    published
}

/// Consumes messages until `stop` is set and the channel is empty, returning
/// them in the order they were popped.
pub fn consumer<T>(channel: &BoundedChannel<T>, stop: &StopSignal, poll: Duration) -> Vec<T>
where
    T: Display,
{
    let mut consumed = Vec::new();
    while let Some(message) = channel.pop_unless_drained(stop, poll) {
        info!(
            "Consumed message: {} - Queue size: {}.",
            message,
            channel.len()
        );
        consumed.push(message);
    }
    info!("No more messages to consume.");
    consumed
}
