//! Invariant checks.
//!
//! [`verify_structure`] walks a subtree and confirms every derived field
//! agrees with the child lists. Tests call it after each mutation.

use crate::node::NodeId;
use crate::tree::Dom;
use crate::walk::Descendants;

/// Check parent, index, sibling, level and owner consistency for the subtree
/// rooted at `root`, and that every id index entry inside it is current.
pub fn verify_structure(dom: &Dom, root: NodeId) -> Result<(), String> {
    let root_node = dom.get(root).ok_or_else(|| format!("{root} is not in the arena"))?;
    if root_node.parent().is_none() {
        let is_document = root_node.kind().is_document();
        let level = if is_document { -1 } else { 0 };
        if root_node.level() != level {
            return Err(format!("detached {root} has level {}", root_node.level()));
        }
        let owner = is_document.then_some(root);
        if root_node.owner() != owner {
            return Err(format!("detached {root} has owner {:?}", root_node.owner()));
        }
    }
    for id in Descendants::new(dom, root) {
        let node = &dom[id];
        if !node.accepts_children() && !node.children().is_empty() {
            return Err(format!("childless {id} has children"));
        }
        let children = node.children();
        for (i, &child) in children.iter().enumerate() {
            let c = &dom[child];
            if c.parent() != Some(id) {
                return Err(format!("{child} under {id} has parent {:?}", c.parent()));
            }
            if c.index() != Some(i) {
                return Err(format!("{child} at {i} has index {:?}", c.index()));
            }
            let prev = i.checked_sub(1).map(|p| children[p]);
            let next = children.get(i + 1).copied();
            if c.prev() != prev || c.next() != next {
                return Err(format!("{child} has broken sibling links"));
            }
            let expected = if c.kind().is_document() {
                node.level()
            } else {
                node.level() + 1
            };
            if c.level() != expected {
                return Err(format!(
                    "{child} has level {} instead of {expected}",
                    c.level()
                ));
            }
            if c.owner() != node.owner() {
                return Err(format!(
                    "{child} has owner {:?} instead of {:?}",
                    c.owner(),
                    node.owner()
                ));
            }
        }
        if node.owner() == Some(id) {
            if let Some(doc) = node.document() {
                for (key, &target) in &doc.ids {
                    if dom.owner(target) != Some(id) || dom.attr(target, "id") != Some(key) {
                        return Err(format!("id index of {id} has stale entry '{key}'"));
                    }
                }
            }
        }
    }
    Ok(())
}
