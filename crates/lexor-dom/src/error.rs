//! Structural errors.
//!
//! Every error here means a caller or handler asked for something the tree
//! model cannot represent. They are reported immediately and never repaired.

use thiserror::Error;

/// A tree mutation that would break a structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The target node kind never has children (text, void, raw text...).
    #[error("node '{name}' cannot have children")]
    ChildrenNotAllowed {
        /// Name of the childless node.
        name: String,
    },
    /// A `DocumentFragment` was passed where a single node is expected.
    #[error("document fragments must be added with extend_children or extend_before")]
    FragmentNotAllowed,
    /// A node would become its own ancestor.
    #[error("a node cannot contain itself")]
    SelfContainment,
    /// Slice replacement with a different number of nodes.
    #[error("attempt to assign sequence of size {found} to extended slice of size {expected}")]
    LengthMismatch {
        /// Number of slots addressed by the slice.
        expected: usize,
        /// Number of replacement nodes supplied.
        found: usize,
    },
    /// Replacement node is already a child of the target.
    #[error("node is already the child at index {index}")]
    AlreadyChild {
        /// Current index of the node.
        index: usize,
    },
    /// Sibling-relative insertion on a node without a parent.
    #[error("node '{name}' has no parent")]
    Detached {
        /// Name of the parentless node.
        name: String,
    },
    /// Single child index outside `0..len` (after negative wrap-around).
    #[error("child index {index} out of range for {len} children")]
    IndexOutOfRange {
        /// Requested index.
        index: isize,
        /// Number of children.
        len: usize,
    },
    /// A slice with a step of zero.
    #[error("slice step cannot be zero")]
    ZeroStep,
    /// Attribute access on a node kind without attributes.
    #[error("node '{name}' has no attributes")]
    NoAttributes {
        /// Name of the node.
        name: String,
    },
}
