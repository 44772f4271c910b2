use std::ptr::NonNull;

/// Releases a resource handle exactly once
///
/// A deleter is invoked with the handle an owner was constructed with, when
/// the last owner of that resource is dropped or reset. Implementations
/// decide what releasing means: freeing a heap block, closing a file
/// descriptor, returning a device allocation.
///
/// [Exclusive][crate::Exclusive] owners carry their deleter as a type
/// parameter, with no indirection. [Shared][crate::Shared] owners store the
/// deleter in the resource's control block instead, which keeps owners with
/// differing deleters interchangeable as long as they share that block.
///
/// Any `FnMut(NonNull<T>)` closure can be used as a deleter.
///
/// ```
/// # use custody::Exclusive;
/// # use std::ptr::NonNull;
/// let handle = NonNull::from(Box::leak(Box::new(5)));
/// let _owner = unsafe {
///     Exclusive::from_raw(handle, |h: NonNull<i32>| {
///         // close, unmap, or free the resource behind `h`
///         drop(unsafe { Box::from_raw(h.as_ptr()) });
///     })
/// };
/// ```
pub trait Deleter<T: ?Sized> {
    /// Releases the resource behind `handle`
    ///
    /// # Safety
    ///
    /// `handle` must be the live handle the owner was constructed with, and
    /// it must never be released again afterwards.
    unsafe fn release(&mut self, handle: NonNull<T>);
}

impl<T: ?Sized, F: FnMut(NonNull<T>)> Deleter<T> for F {
    unsafe fn release(&mut self, handle: NonNull<T>) {
        self(handle)
    }
}

/// The default deleter: frees a handle that was produced by [Box::into_raw]
///
/// This is the deleter attached by the allocating factories
/// ([Exclusive::new][crate::Exclusive::new] and friends), and the one
/// assumed by the plain `from_raw` constructors.
#[derive(Copy, Clone, Debug, Default)]
pub struct BoxDeleter;

impl<T: ?Sized> Deleter<T> for BoxDeleter {
    unsafe fn release(&mut self, handle: NonNull<T>) {
        drop(Box::from_raw(handle.as_ptr()));
    }
}
