use std::{
    alloc::{self, Layout},
    borrow::Borrow,
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem,
    ops::Deref,
    ptr::NonNull,
};

use crate::{
    address::Address,
    block::{AdoptedBlock, Header, InlineBlock},
    deleter::{BoxDeleter, Deleter},
    send_sync::{MaybeSend, MaybeSync},
    weak::Weak,
    Result,
};

/// A reference-counted owner of a resource
///
/// Cloning a `Shared` creates another owner of the same resource; the
/// resource is released exactly once, when the last owner is dropped. The
/// deleter is stored in a control block shared by all owners, so two owners
/// over the same block are always interchangeable, no matter how the
/// resource will eventually be released.
///
/// An owner dereferences a pointer that can differ from the one its control
/// block manages (see [Shared::project]); destruction always targets the
/// block's own resource.
///
/// Reference counts are atomic by default. With the `local` feature the
/// counts are plain cells and `Shared` is neither [Send] nor [Sync].
///
/// ```
/// # use custody::Shared;
/// let first = Shared::new(5);
/// let second = first.clone();
///
/// assert_eq!(*second, 5);
/// assert_eq!(Shared::ref_count(&first), 2);
/// ```
pub struct Shared<T: ?Sized> {
    ptr: NonNull<T>,
    header: NonNull<Header>,
    _owns: PhantomData<T>,
}

impl<T> Shared<T> {
    /// Moves `value` into a new allocation shared by the resulting owners
    ///
    /// The value and its control block live in one combined allocation. See
    /// [Shared::try_new] for the variant that reports allocation failure
    /// instead of aborting.
    pub fn new(value: T) -> Self {
        match Self::try_new(value) {
            Ok(shared) => shared,
            Err(_) => alloc::handle_alloc_error(Layout::new::<InlineBlock<T>>()),
        }
    }

    /// Fallible variant of [Shared::new]
    ///
    /// Allocation and construction are one combined step: on failure
    /// nothing is constructed, `value` is dropped, and
    /// [Error::AllocationFailed][crate::Error::AllocationFailed] is
    /// returned.
    ///
    /// The combined allocation is retained until the weak count also
    /// reaches zero, so a lingering [Weak] observer keeps the value's
    /// storage (not the value) alive longer than a separately allocated
    /// control block would.
    ///
    /// ```
    /// # use custody::Shared;
    /// let owner = Shared::try_new(5)?;
    /// assert_eq!(*owner, 5);
    /// # Ok::<(), custody::Error>(())
    /// ```
    pub fn try_new(value: T) -> Result<Self> {
        let (header, ptr) = InlineBlock::try_allocate(value)?;
        Ok(Self::from_parts(header, ptr))
    }
}

impl<T: ?Sized> Shared<T> {
    pub(crate) fn from_parts(header: NonNull<Header>, ptr: NonNull<T>) -> Self {
        Self {
            ptr,
            header,
            _owns: PhantomData,
        }
    }

    fn header(&self) -> &Header {
        // Safety: the header outlives every owner holding a reference to it.
        unsafe { self.header.as_ref() }
    }

    /// Adopts a handle that was produced by [Box::into_raw]
    ///
    /// Equivalent to [Shared::from_raw_with] with [BoxDeleter].
    ///
    /// # Safety
    ///
    /// Same contract as [Shared::from_raw_with], with the handle required
    /// to come from [Box::into_raw].
    pub unsafe fn from_raw(handle: NonNull<T>) -> Self {
        Self::from_raw_with(handle, BoxDeleter)
    }

    /// Adopts `handle`, to be released by `deleter` when the last owner is
    /// dropped
    ///
    /// A new control block is allocated for the handle; the deleter moves
    /// into the block and disappears from the owner's type. Aborts on
    /// allocation failure, see [Shared::try_from_raw_with].
    ///
    /// # Safety
    ///
    /// `handle` must be live and releasable by `deleter`, no other owner
    /// may release it, and no second control block may ever be created
    /// over the same handle. Adopting one handle twice makes the second
    /// owner tree release it twice.
    pub unsafe fn from_raw_with<D>(handle: NonNull<T>, deleter: D) -> Self
    where
        D: Deleter<T> + MaybeSend + MaybeSync + 'static,
    {
        match Self::try_from_raw_with(handle, deleter) {
            Ok(shared) => shared,
            Err(_) => alloc::handle_alloc_error(AdoptedBlock::<T, D>::layout()),
        }
    }

    /// Fallible variant of [Shared::from_raw_with]
    ///
    /// On failure the handle is untouched and remains owned by the caller,
    /// and the deleter is dropped without being invoked.
    ///
    /// # Safety
    ///
    /// Same contract as [Shared::from_raw_with].
    pub unsafe fn try_from_raw_with<D>(handle: NonNull<T>, deleter: D) -> Result<Self>
    where
        D: Deleter<T> + MaybeSend + MaybeSync + 'static,
    {
        let header = AdoptedBlock::try_allocate(handle, deleter)?;
        Ok(Self::from_parts(header, handle))
    }

    /// Returns a reference to the value this owner dereferences
    pub fn get(this: &Self) -> &T {
        // Safety: the strong reference held by `this` keeps the value alive.
        unsafe { this.ptr.as_ref() }
    }

    /// Returns true if the two owners dereference the same address
    ///
    /// Owners over one control block can disagree here after
    /// [Shared::project], and owners over different blocks can agree; see
    /// also [Shared::address].
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.ptr == other.ptr
    }

    /// Returns the address this owner dereferences
    pub fn address(this: &Self) -> Address {
        (this.ptr.as_ptr() as *const T).into()
    }

    /// Returns the number of owners of this owner's control block
    ///
    /// Always positive, since the count includes `this`. Weak observers are
    /// not counted.
    ///
    /// ```
    /// # use custody::Shared;
    /// let first = Shared::new(5);
    /// assert_eq!(Shared::ref_count(&first), 1);
    ///
    /// let second = first.clone();
    /// assert_eq!(Shared::ref_count(&first), 2);
    ///
    /// drop(second);
    /// assert_eq!(Shared::ref_count(&first), 1);
    /// ```
    pub fn ref_count(this: &Self) -> usize {
        this.header().strong_count()
    }

    /// Returns the number of weak observers of this owner's control block
    pub fn weak_count(this: &Self) -> usize {
        this.header().weak_observers()
    }

    /// Creates a weak observer of this owner's control block
    ///
    /// The observer keeps only the block's bookkeeping alive and remembers
    /// the address this owner dereferences.
    ///
    /// ```
    /// # use custody::Shared;
    /// let owner = Shared::new(5);
    /// let observer = Shared::downgrade(&owner);
    ///
    /// assert_eq!(Shared::ref_count(&owner), 1);
    /// assert_eq!(observer.upgrade().as_deref(), Some(&5));
    /// ```
    pub fn downgrade(this: &Self) -> Weak<T> {
        this.header().inc_weak();
        Weak::from_parts(this.header, this.ptr)
    }

    /// Returns a mutable reference if `this` is the only owner
    ///
    /// Fails while other owners or weak observers exist, since any of them
    /// could reach the value (observers by promotion).
    pub fn get_mut(this: &mut Self) -> Option<&mut T> {
        if this.header().is_unique() {
            // Safety: no other owner or observer can reach the value.
            Some(unsafe { this.ptr.as_mut() })
        } else {
            None
        }
    }

    /// Returns an owner for a component of the value, sharing this owner's
    /// control block
    ///
    /// The result dereferences whatever `f` selects (a field, a slice
    /// element, a trait object view of the whole value) while the control
    /// block, its reference counts, and its destruction behavior stay those
    /// of the original resource: dropping the last owner releases the
    /// resource the block manages, not the projected component.
    ///
    /// ```
    /// # use custody::Shared;
    /// struct Sample {
    ///     id: u32,
    ///     payload: Vec<u8>,
    /// }
    ///
    /// let sample = Shared::new(Sample { id: 7, payload: vec![1, 2, 3] });
    /// let id = Shared::project(sample.clone(), |sample| &sample.id);
    ///
    /// assert_eq!(*id, 7);
    /// assert_eq!(Shared::ref_count(&sample), 2);
    /// ```
    pub fn project<U, F>(this: Self, f: F) -> Shared<U>
    where
        T: MaybeSend + MaybeSync,
        U: ?Sized,
        F: for<'a> FnOnce(&'a T) -> &'a U,
    {
        let ptr = NonNull::from(f(Shared::get(&this)));
        let header = this.header;

        // The new owner takes over this owner's strong reference.
        mem::forget(this);

        Shared::from_parts(header, ptr)
    }

    /// Fallible variant of [Shared::project]
    ///
    /// If `f` selects nothing the owner is dropped normally and `None` is
    /// returned.
    pub fn try_project<U, F>(this: Self, f: F) -> Option<Shared<U>>
    where
        T: MaybeSend + MaybeSync,
        U: ?Sized,
        F: for<'a> FnOnce(&'a T) -> Option<&'a U>,
    {
        let ptr = match f(Shared::get(&this)) {
            Some(component) => NonNull::from(component),
            None => return None,
        };
        let header = this.header;

        mem::forget(this);

        Some(Shared::from_parts(header, ptr))
    }
}

impl<T: ?Sized> Clone for Shared<T> {
    fn clone(&self) -> Self {
        self.header().inc_strong();
        Self::from_parts(self.header, self.ptr)
    }

    fn clone_from(&mut self, source: &Self) {
        // Acquire the new block before releasing the current one, so that
        // assigning an owner to itself, or to another owner of the same
        // block, stays balanced.
        let adopted = source.clone();
        *self = adopted;
    }
}

impl<T: ?Sized> Drop for Shared<T> {
    fn drop(&mut self) {
        let header = self.header();
        if !header.dec_strong() {
            return;
        }

        // Last owner: destroy the resource the block manages (not
        // necessarily the pointer this owner dereferences), then drop the
        // weak reference held by the strong side.
        unsafe {
            Header::destroy_resource(self.header.as_ptr());

            if header.dec_weak() {
                Header::dealloc_block(self.header.as_ptr());
            }
        }
    }
}

impl<T> From<T> for Shared<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized> Deref for Shared<T> {
    type Target = T;

    fn deref(&self) -> &T {
        Shared::get(self)
    }
}

impl<T: ?Sized> AsRef<T> for Shared<T> {
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T: ?Sized> Borrow<T> for Shared<T> {
    fn borrow(&self) -> &T {
        self
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

impl<T: ?Sized> fmt::Pointer for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.ptr, f)
    }
}

impl<T: ?Sized + PartialEq> PartialEq for Shared<T> {
    fn eq(&self, other: &Self) -> bool {
        **self == **other
    }
}

impl<T: ?Sized + Eq> Eq for Shared<T> {}

impl<T: ?Sized + PartialOrd> PartialOrd for Shared<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        (**self).partial_cmp(&**other)
    }
}

impl<T: ?Sized + Ord> Ord for Shared<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (**self).cmp(&**other)
    }
}

impl<T: ?Sized + Hash> Hash for Shared<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (**self).hash(state)
    }
}

#[cfg(feature = "atomic")]
unsafe impl<T: ?Sized + Send + Sync> Send for Shared<T> {}

#[cfg(feature = "atomic")]
unsafe impl<T: ?Sized + Send + Sync> Sync for Shared<T> {}
