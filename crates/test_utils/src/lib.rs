//! Testing utilities for the custody crate
//!
//! The helpers here observe resource releases from the outside: a
//! [DropTally] counts them, a [Probe] reports its own drop, and
//! [counting_deleter] builds a deleter that records each handle it frees.

#![warn(missing_docs)]

use std::{
    ptr::NonNull,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

/// A cloneable counter for observing how often a resource has been released
#[derive(Clone, Debug, Default)]
pub struct DropTally(Arc<AtomicUsize>);

impl DropTally {
    /// Creates a tally starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of releases recorded so far
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// Records one release
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// A value that bumps its tally when dropped
#[derive(Debug)]
pub struct Probe {
    tally: DropTally,
}

impl Probe {
    /// Creates a probe reporting to `tally`
    pub fn new(tally: &DropTally) -> Self {
        Self {
            tally: tally.clone(),
        }
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.tally.bump();
    }
}

/// Builds a deleter that records each release on `tally` and frees the
/// boxed handle
///
/// For handles produced by [Box::into_raw].
pub fn counting_deleter<T: 'static>(
    tally: &DropTally,
) -> impl FnMut(NonNull<T>) + Send + Sync + 'static {
    let tally = tally.clone();

    move |handle: NonNull<T>| {
        tally.bump();
        // Safety: handles given to this deleter come from Box::into_raw,
        // and owners release a handle at most once.
        unsafe { drop(Box::from_raw(handle.as_ptr())) };
    }
}
