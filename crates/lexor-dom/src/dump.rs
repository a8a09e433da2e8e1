//! Debug rendering and structural comparison.

use std::fmt::Write as _;

use crate::node::{NodeData, NodeId};
use crate::tree::Dom;

impl Dom {
    /// Indented one-line-per-node dump of a subtree.
    ///
    /// Each line is indented four spaces per level and shows the name, id,
    /// attributes, document information and character data.
    #[must_use]
    pub fn repr(&self, root: NodeId) -> String {
        let mut out = String::new();
        for id in self.descendants(root) {
            let node = &self[id];
            let depth = usize::try_from(node.level().max(0)).unwrap_or_default();
            out.push_str(&"    ".repeat(depth));
            let _ = write!(out, "{}[{}", node.name(), id.0);
            if let Some(attrs) = node.attrs() {
                for (k, v) in attrs.iter() {
                    let _ = write!(out, " {k}={v:?}");
                }
            }
            out.push(']');
            match node.data() {
                NodeData::Document(d) | NodeData::DocumentFragment(d) => {
                    let _ = write!(
                        out,
                        ": ({}:{}:{})",
                        d.uri.as_deref().unwrap_or("-"),
                        d.lang,
                        d.style
                    );
                }
                data => {
                    out.push(':');
                    if let Some(text) = data.text() {
                        let _ = write!(out, " {text:?}");
                    }
                }
            }
            out.push('\n');
        }
        out
    }

    /// Returns true if the subtrees have the same shape, names, attributes
    /// and character data.
    #[must_use]
    pub fn same_tree(&self, a: NodeId, other: &Self, b: NodeId) -> bool {
        let left: Vec<NodeId> = self.descendants(a).collect();
        let right: Vec<NodeId> = other.descendants(b).collect();
        left.len() == right.len()
            && left.iter().zip(&right).all(|(&x, &y)| {
                let (nx, ny) = (&self[x], &other[y]);
                nx.name() == ny.name()
                    && nx.kind() == ny.kind()
                    && nx.attrs() == ny.attrs()
                    && nx.text() == ny.text()
                    && nx.children().len() == ny.children().len()
            })
    }
}

/// Print a subtree to stdout.
pub fn print_tree(dom: &Dom, root: NodeId) {
    print!("{}", dom.repr(root));
}
