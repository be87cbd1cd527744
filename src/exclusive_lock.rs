use std_semaphore::{Semaphore, SemaphoreGuard};
use tracing::info;

/// Binary semaphore used as a mutual exclusion token.
///
/// Unlike a `Mutex<T>` it protects no data of its own, callers decide what
/// the critical section covers. The token is handed back when the guard is
/// dropped, which includes unwinding out of a panicking critical section.
pub struct ExclusiveLock {
    token: Semaphore,
}

impl Default for ExclusiveLock {
    fn default() -> Self {
        Self::new()
    }
}

impl ExclusiveLock {
    pub fn new() -> Self {
        Self {
            token: Semaphore::new(1),
        }
    }

    pub fn lock(&self) -> ExclusiveGuard<'_> {
        let token = self.token.access();
        info!("acquired exclusive lock");
        ExclusiveGuard { _token: token }
    }
}

pub struct ExclusiveGuard<'a> {
    _token: SemaphoreGuard<'a>,
}

impl Drop for ExclusiveGuard<'_> {
    fn drop(&mut self) {
        //  the token itself is released right after this, when `_token` drops
        info!("releasing exclusive lock");
    }
}
