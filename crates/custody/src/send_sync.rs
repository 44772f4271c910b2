//! Marker traits that adapt to the enabled counting strategy
//!
//! With the `atomic` feature [MaybeSend] and [MaybeSync] are aliases for
//! [Send] and [Sync], and they bound everything a control block erases from
//! an owner's type (adopted deleters, projected-away pointee types) so that
//! a thread-safe owner can never smuggle a thread-bound value across
//! threads. With the `local` feature the owners themselves are thread-bound
//! and the markers are empty traits implemented for all types.

#[cfg(feature = "local")]
mod traits {
    /// An empty trait for single-threaded builds, implemented for all types
    pub trait MaybeSend {}
    impl<T: ?Sized> MaybeSend for T {}

    /// An empty trait for single-threaded builds, implemented for all types
    pub trait MaybeSync {}
    impl<T: ?Sized> MaybeSync for T {}
}

#[cfg(not(feature = "local"))]
mod traits {
    pub use Send as MaybeSend;
    pub use Sync as MaybeSync;
}

pub use traits::*;
