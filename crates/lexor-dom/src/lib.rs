//! Document tree for the lexor pipeline.
//!
//! This crate provides the node model every engine works on: an arena of
//! nodes addressed by [`NodeId`], with a closed set of kinds ([`NodeKind`]).
//!
//! # Design
//!
//! One [`Dom`] arena holds every tree of a run: parsed documents, converted
//! documents, fragments and diagnostics logs. Nodes carry derived fields
//! (index, sibling links, level, owning document) that are kept consistent
//! by the mutation protocol in [`mutation`]. Traversal is iterative
//! ([`Walk`]), so documents of arbitrary depth never exhaust the stack.

pub mod attributes;
pub mod check;
pub mod diagnostics;
pub mod dump;
pub mod error;
pub mod mutation;
pub mod node;
pub mod slice;
pub mod tree;
pub mod walk;

pub use attributes::Attributes;
pub use diagnostics::{Diagnostic, Position};
pub use dump::print_tree;
pub use error::DomError;
pub use mutation::{Batch, NewChild};
pub use node::{DocumentData, Node, NodeData, NodeId, NodeKind};
pub use slice::Slice;
pub use tree::{AncestorIterator, Dom};
pub use walk::{Descendants, Direction, Step, Visitor, Walk};
