use std::{
    alloc::{self, Layout},
    fmt,
    marker::PhantomData,
    ptr::NonNull,
};

use crate::{
    deleter::{BoxDeleter, Deleter},
    error::Error,
    Result,
};

/// A move-only owner that releases its resource exactly once
///
/// An exclusive owner pairs a raw handle with the deleter that will release
/// it. The deleter is part of the owner's type: owners with different
/// deleter types are different types, and there is no control block and no
/// indirection between the owner and its resource.
///
/// The owner is either armed (holding a handle) or empty. Dropping an armed
/// owner invokes the deleter; [reset][Exclusive::reset] does so early, and
/// [release][Exclusive::release] disarms the owner without invoking it.
///
/// ```
/// # use custody::Exclusive;
/// let mut owner = Exclusive::new(5);
/// assert_eq!(owner.get(), Some(&5));
///
/// *owner.get_mut().unwrap() += 1;
/// assert_eq!(owner.get(), Some(&6));
/// ```
pub struct Exclusive<T: ?Sized, D: Deleter<T> = BoxDeleter> {
    handle: Option<NonNull<T>>,
    deleter: D,
    _owns: PhantomData<T>,
}

impl<T> Exclusive<T> {
    /// Moves `value` into a heap allocation owned exclusively by the result
    ///
    /// The resource is released by the default [BoxDeleter]. See
    /// [Exclusive::try_new] for the variant that reports allocation
    /// failure instead of aborting.
    pub fn new(value: T) -> Self {
        let handle = NonNull::from(Box::leak(Box::new(value)));

        // Safety: the handle was just produced by Box::into_raw (via leak)
        // and nothing else owns it.
        unsafe { Self::from_raw(handle, BoxDeleter) }
    }

    /// Fallible variant of [Exclusive::new]
    ///
    /// Allocation and construction are one combined step: on failure
    /// nothing is constructed, `value` is dropped, and
    /// [Error::AllocationFailed] is returned.
    ///
    /// ```
    /// # use custody::Exclusive;
    /// let owner = Exclusive::try_new(5)?;
    /// assert_eq!(owner.get(), Some(&5));
    /// # Ok::<(), custody::Error>(())
    /// ```
    pub fn try_new(value: T) -> Result<Self> {
        let layout = Layout::new::<T>();

        let handle = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            let raw = unsafe { alloc::alloc(layout) } as *mut T;
            NonNull::new(raw).ok_or_else(|| Error::allocation_failed(layout))?
        };

        unsafe {
            handle.as_ptr().write(value);
            Ok(Self::from_raw(handle, BoxDeleter))
        }
    }
}

impl<T: ?Sized, D: Deleter<T>> Exclusive<T, D> {
    /// Takes ownership of `handle`, to be released by `deleter`
    ///
    /// # Safety
    ///
    /// `handle` must be live and releasable by `deleter`, and no other
    /// owner may release it. A deleter must only be given handles it
    /// understands; the default [BoxDeleter] requires a handle produced by
    /// [Box::into_raw].
    pub unsafe fn from_raw(handle: NonNull<T>, deleter: D) -> Self {
        Self {
            handle: Some(handle),
            deleter,
            _owns: PhantomData,
        }
    }

    /// Releases the held resource, if any, leaving the owner empty
    ///
    /// ```
    /// # use custody::Exclusive;
    /// let mut owner = Exclusive::new(5);
    /// owner.reset();
    /// assert!(owner.is_empty());
    /// ```
    pub fn reset(&mut self) {
        if let Some(handle) = self.handle.take() {
            // Safety: the handle was armed by a constructor whose caller
            // guaranteed it is releasable by this deleter, and take()
            // ensures this is its only release.
            unsafe { self.deleter.release(handle) };
        }
    }

    /// Releases the held resource and adopts `handle` in its place
    ///
    /// # Safety
    ///
    /// Same contract as [Exclusive::from_raw].
    pub unsafe fn reset_with(&mut self, handle: NonNull<T>) {
        self.reset();
        self.handle = Some(handle);
    }

    /// Relinquishes the resource without releasing it
    ///
    /// The caller becomes responsible for the returned handle. Calling this
    /// on an empty owner returns `None`; the same handle is never returned
    /// twice, and the deleter is never invoked for a relinquished handle.
    ///
    /// ```
    /// # use custody::Exclusive;
    /// let mut owner = Exclusive::new(5);
    /// let handle = owner.release().unwrap();
    /// assert!(owner.release().is_none());
    ///
    /// // the caller owns the handle again
    /// drop(unsafe { Box::from_raw(handle.as_ptr()) });
    /// ```
    #[must_use]
    pub fn release(&mut self) -> Option<NonNull<T>> {
        self.handle.take()
    }

    /// Returns a reference to the resource without transferring ownership
    pub fn get(&self) -> Option<&T> {
        // Safety: an armed handle is live until released by this owner.
        self.handle.map(|handle| unsafe { &*handle.as_ptr() })
    }

    /// Mutable variant of [Exclusive::get]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self.handle {
            // Safety: exclusive ownership makes the unique borrow sound.
            Some(handle) => Some(unsafe { &mut *handle.as_ptr() }),
            None => None,
        }
    }

    /// True when the owner holds no resource
    pub fn is_empty(&self) -> bool {
        self.handle.is_none()
    }
}

impl<T, D: Deleter<T>> Exclusive<T, D> {
    /// Returns the raw handle without transferring ownership
    ///
    /// Null when the owner is empty.
    pub fn as_ptr(&self) -> *const T {
        match self.handle {
            Some(handle) => handle.as_ptr(),
            None => std::ptr::null(),
        }
    }
}

impl<T: ?Sized, D: Deleter<T>> Drop for Exclusive<T, D> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T: ?Sized, D: Deleter<T> + Default> Default for Exclusive<T, D> {
    /// An empty owner
    fn default() -> Self {
        Self {
            handle: None,
            deleter: D::default(),
            _owns: PhantomData,
        }
    }
}

impl<T: ?Sized + fmt::Debug, D: Deleter<T>> fmt::Debug for Exclusive<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_tuple("Exclusive");
        if let Some(value) = self.get() {
            f.field(&value);
        }
        f.finish()
    }
}

unsafe impl<T: ?Sized + Send, D: Deleter<T> + Send> Send for Exclusive<T, D> {}

unsafe impl<T: ?Sized + Sync, D: Deleter<T> + Sync> Sync for Exclusive<T, D> {}
