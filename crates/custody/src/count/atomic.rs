use std::sync::atomic::{
    fence, AtomicUsize,
    Ordering::{Acquire, Relaxed, Release},
};

/// A thread-safe reference count
pub(crate) struct Count(AtomicUsize);

impl Count {
    pub fn new(value: usize) -> Self {
        Self(AtomicUsize::new(value))
    }

    pub fn get(&self) -> usize {
        self.0.load(Acquire)
    }

    /// Adds a reference, returning the previous count
    ///
    /// New references are only created from a handle that already holds one,
    /// so a relaxed increment is sufficient.
    pub fn inc(&self) -> usize {
        self.0.fetch_add(1, Relaxed)
    }

    /// Adds a reference unless the count is zero
    ///
    /// The check and the increment are a single atomic step: once a
    /// concurrent [Count::dec] has taken the count to zero this can no
    /// longer succeed.
    pub fn inc_if_nonzero(&self) -> bool {
        let mut count = self.0.load(Relaxed);
        loop {
            if count == 0 {
                return false;
            }

            match self
                .0
                .compare_exchange_weak(count, count + 1, Acquire, Relaxed)
            {
                Ok(_) => return true,
                Err(current) => count = current,
            }
        }
    }

    /// Removes a reference, returning the previous count
    ///
    /// The release ordering publishes every write made through the departing
    /// handle; the handle that observes the transition to zero must call
    /// [Count::acquire_fence] before touching the resource.
    pub fn dec(&self) -> usize {
        self.0.fetch_sub(1, Release)
    }

    pub fn acquire_fence(&self) {
        fence(Acquire);
    }
}
