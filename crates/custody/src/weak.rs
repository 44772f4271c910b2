use std::{fmt, ptr::NonNull};

use crate::{block::Header, shared::Shared};

/// A non-owning observer of a shared resource
///
/// A `Weak` is created from a [Shared] owner (or cloned from another
/// observer), never from a raw handle. It keeps the control block's
/// bookkeeping alive without keeping the resource alive: once the last
/// owner is dropped the resource is released even while observers remain.
///
/// Observers reach the value only by promotion: [Weak::upgrade] returns a
/// new [Shared] owner while the resource still exists, and `None` once it
/// is gone.
///
/// ```
/// # use custody::Shared;
/// let owner = Shared::new(5);
/// let observer = Shared::downgrade(&owner);
///
/// assert_eq!(observer.upgrade().as_deref(), Some(&5));
///
/// drop(owner);
/// assert!(observer.upgrade().is_none());
/// ```
pub struct Weak<T: ?Sized> {
    ptr: NonNull<T>,
    header: NonNull<Header>,
}

impl<T: ?Sized> Weak<T> {
    pub(crate) fn from_parts(header: NonNull<Header>, ptr: NonNull<T>) -> Self {
        Self { ptr, header }
    }

    fn header(&self) -> &Header {
        // Safety: the weak reference held by `self` keeps the header alive.
        unsafe { self.header.as_ref() }
    }

    /// Attempts to promote the observer into an owner
    ///
    /// Succeeds only while the resource is alive. The check and the count
    /// increment are one atomic step, so a successful promotion can never
    /// return a resource that a concurrent final drop has begun to
    /// destroy. The returned owner dereferences the same (possibly
    /// projected) address the observer was created from.
    pub fn upgrade(&self) -> Option<Shared<T>> {
        if self.header().try_promote() {
            Some(Shared::from_parts(self.header, self.ptr))
        } else {
            None
        }
    }

    /// True once no owners remain
    ///
    /// A best-effort snapshot, not a synchronization point: another thread
    /// can drop the last owner right after this returns false. Use
    /// [Weak::upgrade] when the answer matters.
    pub fn expired(&self) -> bool {
        self.strong_count() == 0
    }

    /// Returns the number of owners of the observed control block
    ///
    /// Unlike [Shared::ref_count] this can return zero.
    pub fn strong_count(&self) -> usize {
        self.header().strong_count()
    }

    /// Returns the number of weak observers of the observed control block
    ///
    /// Always positive, since the count includes `self`.
    pub fn weak_count(&self) -> usize {
        self.header().weak_observers()
    }
}

impl<T: ?Sized> Clone for Weak<T> {
    fn clone(&self) -> Self {
        self.header().inc_weak();
        Self::from_parts(self.header, self.ptr)
    }
}

impl<T: ?Sized> Drop for Weak<T> {
    fn drop(&mut self) {
        let header = self.header();
        if header.dec_weak() {
            // Happens after the resource destruction performed by the last
            // owner, so the block can be freed here.
            unsafe { Header::dealloc_block(self.header.as_ptr()) };
        }
    }
}

impl<T: ?Sized> From<&Shared<T>> for Weak<T> {
    fn from(owner: &Shared<T>) -> Self {
        Shared::downgrade(owner)
    }
}

impl<T: ?Sized> fmt::Debug for Weak<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(Weak)")
    }
}

#[cfg(feature = "atomic")]
unsafe impl<T: ?Sized + Send + Sync> Send for Weak<T> {}

#[cfg(feature = "atomic")]
unsafe impl<T: ?Sized + Send + Sync> Sync for Weak<T> {}
