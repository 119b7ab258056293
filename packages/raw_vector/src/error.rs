use std::alloc::Layout;

use thiserror::Error;

/// Errors that can occur when acquiring storage for a vector.
///
/// Only the fallible `try_*` operations return these. The infallible counterparts treat the same
/// conditions as fatal: capacity overflow panics and allocator failure is routed through
/// [`std::alloc::handle_alloc_error`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The requested number of slots cannot be represented as a single memory block.
    #[error("capacity overflow: {requested} slots of {element_type} do not fit in one allocation")]
    CapacityOverflow {
        /// The number of slots that was requested.
        requested: usize,

        /// The name of the element type, for diagnostics.
        element_type: &'static str,
    },

    /// The allocator was unable to provide a block of the requested size.
    #[error(
        "out of memory: the allocator could not provide {} bytes aligned to {}",
        .layout.size(),
        .layout.align()
    )]
    OutOfMemory {
        /// The layout of the block that could not be allocated.
        layout: Layout,
    },
}

/// A specialized `Result` type for storage operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
