//! Iterative depth-first traversal.
//!
//! Trees produced by parsers can be arbitrarily deep, so nothing in the
//! pipeline recurses. [`Walk`] is a cursor that produces an enter step and an
//! exit step for every node, using parent pointers instead of a stack. It
//! borrows the arena only for the duration of each step, so callers may
//! mutate *other* trees in the same arena between steps.

use strum_macros::Display;

use crate::node::NodeId;
use crate::tree::Dom;

/// One traversal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The node is visited before its children.
    Enter(NodeId),
    /// The node is visited after its children (or after being skipped).
    Exit(NodeId),
}

impl Step {
    /// The node this step refers to.
    #[must_use]
    pub const fn node(self) -> NodeId {
        match self {
            Self::Enter(id) | Self::Exit(id) => id,
        }
    }
}

/// The move the cursor makes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    /// Into the first child.
    Descend,
    /// To the next sibling or up to the parent.
    Advance,
    /// Nothing left.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Entered { skip: bool },
    Exited,
    Done,
}

/// Depth-first cursor over one subtree.
///
/// Traversal ends when the root is exited, even if the root has siblings.
#[derive(Debug, Clone)]
pub struct Walk {
    root: NodeId,
    current: NodeId,
    state: State,
}

impl Walk {
    /// Cursor positioned before `root`.
    #[must_use]
    pub const fn new(root: NodeId) -> Self {
        Self {
            root,
            current: root,
            state: State::Start,
        }
    }

    /// Root of the traversal.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Do not descend into the node that was just entered.
    pub fn skip_children(&mut self) {
        if let State::Entered { skip } = &mut self.state {
            *skip = true;
        }
    }

    /// What the next call to [`Walk::next_step`] will attempt.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self.state {
            State::Start | State::Entered { skip: false } => Direction::Descend,
            State::Entered { skip: true } | State::Exited => Direction::Advance,
            State::Done => Direction::Finished,
        }
    }

    /// Produce the next step, or `None` once the root has been exited.
    pub fn next_step(&mut self, dom: &Dom) -> Option<Step> {
        match self.state {
            State::Start => {
                self.state = State::Entered { skip: false };
                Some(Step::Enter(self.root))
            }
            State::Entered { skip } => {
                let first = if skip {
                    None
                } else {
                    dom.first_child(self.current)
                };
                if let Some(first) = first {
                    self.current = first;
                    self.state = State::Entered { skip: false };
                    return Some(Step::Enter(first));
                }
                self.state = State::Exited;
                Some(Step::Exit(self.current))
            }
            State::Exited => {
                if self.current == self.root {
                    self.state = State::Done;
                    return None;
                }
                if let Some(next) = dom.next_sibling(self.current) {
                    self.current = next;
                    self.state = State::Entered { skip: false };
                    return Some(Step::Enter(next));
                }
                if let Some(parent) = dom.parent(self.current) {
                    self.current = parent;
                    Some(Step::Exit(parent))
                } else {
                    self.state = State::Done;
                    None
                }
            }
            State::Done => None,
        }
    }
}

/// Callbacks driven by [`Dom::accept`].
pub trait Visitor {
    /// Called when a node is entered. Return `false` to skip its children.
    fn enter(&mut self, dom: &Dom, node: NodeId) -> bool;

    /// Called when a node is exited.
    fn exit(&mut self, _dom: &Dom, _node: NodeId) {}
}

impl Dom {
    /// Drive `visitor` over the subtree rooted at `root`.
    pub fn accept<V: Visitor + ?Sized>(&self, root: NodeId, visitor: &mut V) {
        let mut walk = Walk::new(root);
        while let Some(step) = walk.next_step(self) {
            match step {
                Step::Enter(id) => {
                    if !visitor.enter(self, id) {
                        walk.skip_children();
                    }
                }
                Step::Exit(id) => visitor.exit(self, id),
            }
        }
    }
}

/// Pre-order iterator built on [`Walk`].
pub struct Descendants<'a> {
    dom: &'a Dom,
    walk: Walk,
}

impl<'a> Descendants<'a> {
    pub(crate) const fn new(dom: &'a Dom, root: NodeId) -> Self {
        Self {
            dom,
            walk: Walk::new(root),
        }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.walk.next_step(self.dom)? {
                Step::Enter(id) => return Some(id),
                Step::Exit(_) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let root = dom.create_element("root");
        let a = dom.create_element("a");
        let b = dom.create_element("b");
        let c = dom.create_text("c");
        let _ = dom.append_child(root, a).unwrap();
        let _ = dom.append_child(a, b).unwrap();
        let _ = dom.append_child(root, c).unwrap();
        (dom, root)
    }

    #[test]
    fn test_enter_exit_order() {
        let (dom, root) = sample();
        let mut walk = Walk::new(root);
        let mut events = Vec::new();
        while let Some(step) = walk.next_step(&dom) {
            let tag = if matches!(step, Step::Enter(_)) { "+" } else { "-" };
            events.push(format!("{tag}{}", dom.name(step.node())));
        }
        assert_eq!(
            events,
            vec!["+root", "+a", "+b", "-b", "-a", "+#text", "-#text", "-root"]
        );
        assert_eq!(walk.direction(), Direction::Finished);
    }

    #[test]
    fn test_skip_children() {
        let (dom, root) = sample();
        let mut walk = Walk::new(root);
        let mut entered = Vec::new();
        while let Some(step) = walk.next_step(&dom) {
            if let Step::Enter(id) = step {
                entered.push(dom.name(id).to_string());
                if dom.name(id) == "a" {
                    walk.skip_children();
                    assert_eq!(walk.direction(), Direction::Advance);
                }
            }
        }
        assert_eq!(entered, vec!["root", "a", "#text"]);
    }

    #[test]
    fn test_walk_stops_at_subtree_root() {
        let (dom, root) = sample();
        let a = dom.first_child(root).unwrap();
        let names: Vec<_> = dom.descendants(a).map(|id| dom.name(id)).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_visitor_skip() {
        struct Names(Vec<String>);
        impl Visitor for Names {
            fn enter(&mut self, dom: &Dom, node: NodeId) -> bool {
                self.0.push(dom.name(node).to_string());
                dom.name(node) != "a"
            }
        }
        let (dom, root) = sample();
        let mut names = Names(Vec::new());
        dom.accept(root, &mut names);
        assert_eq!(names.0, vec!["root", "a", "#text"]);
    }
}
