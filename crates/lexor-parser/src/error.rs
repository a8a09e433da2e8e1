//! Parser configuration errors.

use lexor_dom::DomError;
use thiserror::Error;

/// A parser bundle that cannot be used, or a handler that produced a node
/// the tree cannot hold.
///
/// Malformed *input* is never an error; it becomes diagnostics.
#[derive(Debug, Error)]
pub enum ParserError {
    /// A rule's boundary character class does not compile.
    #[error("invalid boundary class '{class}' for '{key}': {source}")]
    InvalidBoundary {
        /// Container name of the rule.
        key: String,
        /// The offending class body.
        class: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
    /// The bundle has no `__default__` rule.
    #[error("parser style '{lang}:{style}' has no default rule")]
    MissingDefaultRule {
        /// Bundle language.
        lang: String,
        /// Bundle style.
        style: String,
    },
    /// A rule refers to a handler that was never registered.
    #[error("rule '{key}' refers to unknown handler {index}")]
    UnknownHandler {
        /// Container name of the rule.
        key: String,
        /// Handler index.
        index: usize,
    },
    /// A handler returned a node that could not be attached.
    #[error(transparent)]
    Dom(#[from] DomError),
}
