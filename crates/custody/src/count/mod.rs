//! The reference counts used by control blocks
//!
//! Exactly one implementation is compiled in, selected by the `atomic` and
//! `local` features. Both expose the same operations, so the rest of the
//! crate is written once against [Count].

#[cfg(feature = "atomic")]
mod atomic;
#[cfg(feature = "atomic")]
pub(crate) use atomic::Count;

#[cfg(feature = "local")]
mod cell;
#[cfg(feature = "local")]
pub(crate) use cell::Count;
