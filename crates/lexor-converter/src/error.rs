//! Converter errors.

use lexor_dom::DomError;
use thiserror::Error;

/// Why a conversion could not run.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Only documents and fragments can be converted.
    #[error("cannot convert '{name}': not a document or document fragment")]
    NotADocument {
        /// Name of the node that was passed.
        name: String,
    },
    /// A handler asked for a tree change that is not allowed.
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// Failure reported by an [`Expander`](crate::Expander).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ExpandError(pub String);
