//! Ownership-tracking pointers for raw resource handles
//!
//! Every resource that must be released exactly once (a heap value, a file
//! handle, a device allocation) can be placed behind one of three owners:
//!
//! - [Exclusive]: a move-only owner with no control block. The deleter is
//!   part of the owner's type and is invoked with the raw handle when the
//!   owner is dropped or reset.
//! - [Shared]: a reference-counted owner. The deleter lives in a control
//!   block shared by all owners of the resource, so owners stay clonable and
//!   interchangeable regardless of the deleter that will eventually run.
//! - [Weak]: a non-owning observer of a control block. It keeps only the
//!   block's bookkeeping alive, and can attempt to promote itself back into
//!   a [Shared] owner while the resource still exists.
//!
//! Reference counts are atomic by default; the `local` feature swaps in
//! plain counters for single-threaded deployments.
//!
//! Strong reference cycles are never collected. The owner graph must be kept
//! acyclic by the caller, by weakening one edge of any cycle with [Weak].

#![warn(missing_docs)]

#[cfg(all(feature = "atomic", feature = "local"))]
compile_error!("A single reference-counting feature can be enabled at a time");

mod address;
mod block;
mod count;
mod deleter;
mod error;
mod exclusive;
mod send_sync;
mod shared;
mod weak;

pub use crate::{
    address::Address,
    deleter::{BoxDeleter, Deleter},
    error::{Error, Result},
    exclusive::Exclusive,
    send_sync::{MaybeSend, MaybeSync},
    shared::Shared,
    weak::Weak,
};
