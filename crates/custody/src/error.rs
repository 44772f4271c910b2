use std::alloc::Layout;

use thiserror::Error;

/// The errors that can be produced by the owner factories
///
/// Acquiring storage is the only fallible operation in this crate; ownership
/// transitions (clone, move, drop, promotion) never fail.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Storage for a resource or its control block couldn't be obtained
    #[error("failed to allocate {size} bytes with alignment {align}")]
    AllocationFailed {
        /// Size of the rejected allocation request in bytes
        size: usize,
        /// Alignment of the rejected allocation request
        align: usize,
    },
}

impl Error {
    pub(crate) fn allocation_failed(layout: Layout) -> Self {
        Self::AllocationFailed {
            size: layout.size(),
            align: layout.align(),
        }
    }
}

/// The Result type returned by the fallible factories
pub type Result<T> = std::result::Result<T, Error>;
