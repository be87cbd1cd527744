use std::{
    cell::UnsafeCell,
    marker::PhantomData,
    mem::MaybeUninit,
    rc::Rc,
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    thread::{self, Thread},
};

const EMPTY: u8 = 0;
const READY: u8 = 1;
const TAKEN: u8 = 2;
const ABANDONED: u8 = 3;

struct Slot<T> {
    state: AtomicU8,
    message: UnsafeCell<MaybeUninit<T>>,
}

unsafe impl<T> Sync for Slot<T> where T: Send {}

impl<T> Drop for Slot<T> {
    fn drop(&mut self) {
        if *self.state.get_mut() == READY {
            unsafe { self.message.get_mut().assume_init_drop() };
        }
    }
}

/// Creates a single-use channel. The receiver stays on the calling thread,
/// which is the one the sender unparks.
pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let slot = Arc::new(Slot {
        state: AtomicU8::new(EMPTY),
        message: UnsafeCell::new(MaybeUninit::uninit()),
    });
    let sender = Sender {
        slot: slot.clone(),
        recv_thread: thread::current(),
        sent: false,
    };
    let receiver = Receiver {
        slot,
        _no_send: PhantomData,
    };
    (sender, receiver)
}

pub struct Sender<T> {
    slot: Arc<Slot<T>>,
    recv_thread: Thread,
    sent: bool,
}

impl<T> Sender<T> {
    pub fn send(mut self, message: T) {
        unsafe { (*self.slot.message.get()).write(message) };
        self.slot.state.store(READY, Ordering::Release);
        self.sent = true;
        self.recv_thread.unpark();
    }
}

impl<T> Drop for Sender<T> {
    fn drop(&mut self) {
        //  dropped without sending, e.g. while unwinding out of a task
        if !self.sent {
            self.slot.state.store(ABANDONED, Ordering::Release);
            self.recv_thread.unpark();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Abandoned;

pub struct Receiver<T> {
    slot: Arc<Slot<T>>,
    _no_send: PhantomData<Rc<()>>,
}

impl<T> Receiver<T> {
    pub fn is_ready(&self) -> bool {
        self.slot.state.load(Ordering::Acquire) != EMPTY
    }

    /// Parks until the sender either sends or is dropped.
    pub fn receive(self) -> Result<T, Abandoned> {
        loop {
            match self.slot.state.load(Ordering::Acquire) {
                READY => {
                    self.slot.state.store(TAKEN, Ordering::Relaxed);
                    return Ok(unsafe { (*self.slot.message.get()).assume_init_read() });
                }
                ABANDONED => return Err(Abandoned),
                _ => thread::park(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_send_then_receive() {
        let (sender, receiver) = channel();
        sender.send(42);
        assert!(receiver.is_ready());
        assert_eq!(receiver.receive(), Ok(42));
    }

    #[test]
    fn test_receive_from_thread() {
        let (sender, receiver) = channel();
        thread::scope(|s| {
            s.spawn(move || {
                thread::sleep(Duration::from_millis(10));
                sender.send(String::from("done"));
            });
            assert_eq!(receiver.receive().unwrap(), "done");
        });
    }

    #[test]
    fn test_dropped_sender_abandons() {
        let (sender, receiver) = channel::<i32>();
        thread::scope(|s| {
            s.spawn(move || drop(sender));
            assert_eq!(receiver.receive(), Err(Abandoned));
        });
    }

    #[test]
    fn test_unreceived_message_is_dropped() {
        use std::sync::atomic::AtomicUsize;

        static DROPS: AtomicUsize = AtomicUsize::new(0);

        struct DropCounter;

        impl Drop for DropCounter {
            fn drop(&mut self) {
                DROPS.fetch_add(1, Ordering::SeqCst);
            }
        }

        let (sender, receiver) = channel();
        sender.send(DropCounter);
        drop(receiver);
        assert_eq!(DROPS.load(Ordering::SeqCst), 1);
    }
}
