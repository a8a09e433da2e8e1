//! Writer errors.

use std::io;

use thiserror::Error;

/// A writer bundle that cannot be used, or a destination that failed.
#[derive(Debug, Error)]
pub enum WriterError {
    /// An alias names a key that has no handler.
    #[error("writer alias '{key}' points at unknown handler '{target}'")]
    UnknownAlias {
        /// The aliased key.
        key: String,
        /// The missing target.
        target: String,
    },
    /// Writing to the destination failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}
