use std::{
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use crate::{errors::ChannelError, stop_signal::StopSignal};

/// Fixed size ring buffer. Callers check `is_full` before `put`.
struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    producer: usize,
    consumer: usize,
    len: usize,
}

impl<T> RingBuffer<T> {
    fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            producer: 0,
            consumer: 0,
            len: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    fn put(&mut self, value: T) {
        debug_assert!(!self.is_full());
        self.slots[self.producer] = Some(value);
        self.producer = (self.producer + 1) % self.slots.len();
        self.len += 1;
    }

    fn get(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.slots[self.consumer].take();
        self.consumer = (self.consumer + 1) % self.slots.len();
        self.len -= 1;
        value
    }
}

struct State<T> {
    queue: RingBuffer<T>,
    closed: bool,
}

/// A fixed capacity FIFO shared between producers and consumers.
///
/// `push` blocks while the channel is full and `pop` blocks while it is
/// empty. Slots and the item count are only touched under the channel's
/// mutex; `not_full` and `not_empty` wake one waiter of the opposite side per
/// completed operation.
///
/// Closing is monotonic. After `close`, pushes fail with
/// [`ChannelError::Closed`] while pops keep draining buffered items and only
/// fail once the channel is empty.
pub struct BoundedChannel<T> {
    state: Mutex<State<T>>,
    not_full: Condvar,
    not_empty: Condvar,
    capacity: usize,
}

impl<T> BoundedChannel<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            panic!("cannot create a bounded channel with capacity 0");
        }
        Self {
            state: Mutex::new(State {
                queue: RingBuffer::new(capacity),
                closed: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().queue.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn close(&self) {
        self.lock().closed = true;
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    pub fn push(&self, item: T) -> Result<(), ChannelError> {
        let mut state = self.lock();
        loop {
            if state.closed {
                return Err(ChannelError::Closed);
            }
            if !state.queue.is_full() {
                break;
            }
            state = self
                .not_full
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        self.put(state, item);
        Ok(())
    }

    /// Pushes `item` unless `stop` is set.
    ///
    /// The signal is checked while holding the channel lock, the same lock
    /// [`pop_unless_drained`](Self::pop_unless_drained) holds when it decides
    /// the channel is drained. An item is therefore either rejected with
    /// [`ChannelError::Stopped`] or seen by that consumer, never stranded.
    /// While full, re-checks the signal every `poll`.
    pub fn push_unless_stopped(
        &self,
        item: T,
        stop: &StopSignal,
        poll: Duration,
    ) -> Result<(), ChannelError> {
        let mut state = self.lock();
        loop {
            if stop.is_set() {
                return Err(ChannelError::Stopped);
            }
            if state.closed {
                return Err(ChannelError::Closed);
            }
            if !state.queue.is_full() {
                break;
            }
            state = Self::wait(&self.not_full, state, poll);
        }
        self.put(state, item);
        Ok(())
    }

    pub fn pop(&self) -> Result<T, ChannelError> {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.queue.get() {
                return Ok(self.taken(state, item));
            }
            if state.closed {
                return Err(ChannelError::Closed);
            }
            state = self
                .not_empty
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Pops the next item, or returns `None` once the channel is drained:
    /// empty while `stop` is set or the channel is closed.
    ///
    /// Buffered items are always handed out before `None`, so the exit
    /// condition is re-evaluated after every pop. While empty, re-checks the
    /// signal every `poll`.
    pub fn pop_unless_drained(&self, stop: &StopSignal, poll: Duration) -> Option<T> {
        let mut state = self.lock();
        loop {
            if let Some(item) = state.queue.get() {
                return Some(self.taken(state, item));
            }
            if stop.is_set() || state.closed {
                return None;
            }
            state = Self::wait(&self.not_empty, state, poll);
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(
        cond_var: &Condvar,
        state: MutexGuard<'a, State<T>>,
        timeout: Duration,
    ) -> MutexGuard<'a, State<T>> {
        let (state, _) = cond_var
            .wait_timeout(state, timeout)
            .unwrap_or_else(PoisonError::into_inner);
        state
    }

    fn put(&self, mut state: MutexGuard<'_, State<T>>, item: T) {
        state.queue.put(item);
        drop(state);
        self.not_empty.notify_one();
    }

    fn taken(&self, state: MutexGuard<'_, State<T>>, item: T) -> T {
        drop(state);
        self.not_full.notify_one();
        item
    }
}
