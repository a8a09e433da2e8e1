//! The tree mutation protocol.
//!
//! Every structural change goes through the methods in this module. Each
//! one keeps the derived fields consistent: `parent`, `index`, sibling
//! links, `level`, `owner` and the owner's id index. Descendant updates
//! are iterative, so a subtree of any depth can be moved.
//!
//! Validation happens before anything is touched; a failed call leaves the
//! arena unchanged.

use crate::attributes::Attributes;
use crate::error::DomError;
use crate::node::{NodeData, NodeId, NodeKind};
use crate::slice::Slice;
use crate::tree::Dom;
use crate::walk::{Step, Walk};

/// A child to append: an existing node or a string that becomes a text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewChild {
    /// An existing node; it is detached from its current parent first.
    Node(NodeId),
    /// Text for a new text node.
    Text(String),
}

impl From<NodeId> for NewChild {
    fn from(id: NodeId) -> Self {
        Self::Node(id)
    }
}

impl From<&str> for NewChild {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for NewChild {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// A group of nodes to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Batch {
    /// These nodes in order. Fragments and temporary documents in the list
    /// contribute their children instead of themselves.
    Nodes(Vec<NodeId>),
    /// All children of this container, which is left empty.
    ChildrenOf(NodeId),
}

impl From<Vec<NodeId>> for Batch {
    fn from(nodes: Vec<NodeId>) -> Self {
        Self::Nodes(nodes)
    }
}

impl From<&[NodeId]> for Batch {
    fn from(nodes: &[NodeId]) -> Self {
        Self::Nodes(nodes.to_vec())
    }
}

impl<const N: usize> From<[NodeId; N]> for Batch {
    fn from(nodes: [NodeId; N]) -> Self {
        Self::Nodes(nodes.to_vec())
    }
}

impl From<NodeId> for Batch {
    fn from(container: NodeId) -> Self {
        Self::ChildrenOf(container)
    }
}

impl Dom {
    // ========== Validation ==========

    fn ensure_children(&self, parent: NodeId) -> Result<(), DomError> {
        if self.accepts_children(parent) {
            Ok(())
        } else {
            Err(DomError::ChildrenNotAllowed {
                name: self.name(parent).to_string(),
            })
        }
    }

    /// `node` may become a child of `parent`: not a fragment and not an
    /// inclusive ancestor of `parent`.
    fn ensure_insertable(&self, parent: NodeId, node: NodeId) -> Result<(), DomError> {
        if self.kind(node) == Some(NodeKind::DocumentFragment) {
            return Err(DomError::FragmentNotAllowed);
        }
        if node == parent || self.is_descendant_of(parent, node) {
            return Err(DomError::SelfContainment);
        }
        Ok(())
    }

    fn is_container(&self, node: NodeId) -> bool {
        match self.get(node).map(|n| n.data()) {
            Some(NodeData::DocumentFragment(_)) => true,
            Some(NodeData::Document(d)) => d.temporary,
            _ => false,
        }
    }

    fn push_drained(
        &self,
        parent: NodeId,
        container: NodeId,
        out: &mut Vec<NodeId>,
    ) -> Result<(), DomError> {
        for &child in self.children(container) {
            self.ensure_insertable(parent, child)?;
            out.push(child);
        }
        Ok(())
    }

    /// Flatten a batch into the nodes that will be inserted, validating each.
    fn expand_batch(&self, parent: NodeId, batch: &Batch) -> Result<Vec<NodeId>, DomError> {
        let mut out = Vec::new();
        match batch {
            Batch::ChildrenOf(container) => self.push_drained(parent, *container, &mut out)?,
            Batch::Nodes(nodes) => {
                for &node in nodes {
                    if self.is_container(node) {
                        self.push_drained(parent, node, &mut out)?;
                    } else {
                        self.ensure_insertable(parent, node)?;
                        out.push(node);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Temporary documents in a batch hand their metadata to `host`'s owner.
    fn absorb_meta(&mut self, host: NodeId, batch: &Batch) {
        let sources: Vec<NodeId> = match batch {
            Batch::ChildrenOf(container) => vec![*container],
            Batch::Nodes(nodes) => nodes.clone(),
        };
        let Some(owner) = self.owner(host) else {
            return;
        };
        for source in sources {
            let is_temporary = self.document(source).is_some_and(|d| d.temporary);
            if !is_temporary || source == owner {
                continue;
            }
            let meta = self
                .document_mut(source)
                .map(|d| std::mem::take(&mut d.meta))
                .unwrap_or_default();
            if let Some(doc) = self.document_mut(owner) {
                doc.meta.extend(meta);
            }
        }
    }

    // ========== Bookkeeping ==========

    /// Rewrite `index` and sibling links of the children of `parent` from
    /// position `from` onwards.
    fn relink(&mut self, parent: NodeId, from: usize) {
        let children = self.children(parent).to_vec();
        for i in from..children.len() {
            let node = self.node_mut(children[i]);
            node.index = Some(i);
            node.prev = i.checked_sub(1).map(|p| children[p]);
            node.next = children.get(i + 1).copied();
        }
    }

    fn unindex_id(&mut self, owner: Option<NodeId>, key: &str, node: NodeId) {
        let Some(doc) = owner.and_then(|o| self.nodes[o.0].data.document_mut()) else {
            return;
        };
        if doc.ids.get(key) == Some(&node) {
            let _ = doc.ids.remove(key);
        }
    }

    fn index_id(&mut self, owner: Option<NodeId>, key: String, node: NodeId) {
        if let Some(doc) = owner.and_then(|o| self.nodes[o.0].data.document_mut()) {
            let _ = doc.ids.insert(key, node);
        }
    }

    fn id_key(&self, node: NodeId) -> Option<String> {
        self.get(node)
            .filter(|n| !n.kind().is_document())
            .and_then(|n| n.attr("id"))
            .map(str::to_string)
    }

    /// Move `node` to `owner`, keeping both id indexes current.
    fn set_owner(&mut self, node: NodeId, owner: Option<NodeId>) {
        if let Some(key) = self.id_key(node) {
            let old = self.owner(node);
            if old != owner {
                self.unindex_id(old, &key, node);
            }
            self.index_id(owner, key, node);
        }
        self.node_mut(node).owner = owner;
    }

    /// Recompute level and owner for everything below `root`.
    fn propagate(&mut self, root: NodeId) {
        let owner = self.owner(root);
        let mut walk = Walk::new(root);
        while let Some(step) = walk.next_step(self) {
            let Step::Enter(id) = step else { continue };
            if id == root {
                continue;
            }
            let parent_level = self.parent(id).map_or(0, |p| self.level(p));
            let is_document = self.kind(id).is_some_and(NodeKind::is_document);
            self.node_mut(id).level = if is_document {
                parent_level
            } else {
                parent_level + 1
            };
            self.set_owner(id, owner);
        }
    }

    /// Give `child` its place under `parent` at `index`.
    fn attach(&mut self, parent: NodeId, child: NodeId, index: usize) {
        let parent_level = self.level(parent);
        let owner = self.owner(parent);
        let is_document = self.kind(child).is_some_and(NodeKind::is_document);
        let node = self.node_mut(child);
        node.parent = Some(parent);
        node.index = Some(index);
        node.level = if is_document {
            parent_level
        } else {
            parent_level + 1
        };
        self.set_owner(child, owner);
        self.propagate(child);
    }

    /// Clear the parent-side fields of `child`. The caller removes it from
    /// the parent's child list.
    fn disconnect(&mut self, child: NodeId) {
        let is_document = self.kind(child).is_some_and(NodeKind::is_document);
        let node = self.node_mut(child);
        node.parent = None;
        node.index = None;
        node.prev = None;
        node.next = None;
        node.level = if is_document { -1 } else { 0 };
        self.set_owner(child, is_document.then_some(child));
        self.propagate(child);
    }

    fn child_list(&mut self, parent: NodeId) -> &mut Vec<NodeId> {
        self.node_mut(parent)
            .children
            .get_or_insert_with(Vec::new)
    }

    /// Insert without validation. Used internally once checks passed.
    pub(crate) fn insert_unchecked(&mut self, parent: NodeId, index: usize, child: NodeId) {
        self.detach(child);
        let len = self.children(parent).len();
        let index = index.min(len);
        self.child_list(parent).insert(index, child);
        self.attach(parent, child, index);
        self.relink(parent, index.saturating_sub(1));
    }

    pub(crate) fn push_unchecked(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_unchecked(parent, len, child);
    }

    fn remove_at(&mut self, parent: NodeId, index: usize) -> NodeId {
        let child = self.child_list(parent).remove(index);
        self.disconnect(child);
        self.relink(parent, index.saturating_sub(1));
        child
    }

    fn materialize(&mut self, child: NewChild) -> NodeId {
        match child {
            NewChild::Node(id) => id,
            NewChild::Text(text) => self.create_text(text),
        }
    }

    // ========== Public protocol ==========

    /// Remove `node` from its parent, if it has one. The node keeps its
    /// subtree; levels and owners below it are recomputed.
    pub fn detach(&mut self, node: NodeId) {
        if let (Some(parent), Some(index)) = (self.parent(node), self.index(node)) {
            let _ = self.remove_at(parent, index);
        }
    }

    /// Append a node (or a new text node) as the last child of `parent`.
    ///
    /// Returns the appended node.
    pub fn append_child(
        &mut self,
        parent: NodeId,
        child: impl Into<NewChild>,
    ) -> Result<NodeId, DomError> {
        self.ensure_children(parent)?;
        let child = self.materialize(child.into());
        self.ensure_insertable(parent, child)?;
        self.push_unchecked(parent, child);
        Ok(child)
    }

    /// Append text to `parent`, extending a trailing text child instead of
    /// creating a new node when there is one. Returns the text node.
    pub fn push_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, DomError> {
        self.ensure_children(parent)?;
        if let Some(last) = self.last_child(parent) {
            if let NodeData::Text(data) = &mut self.node_mut(last).data {
                data.push_str(text);
                return Ok(last);
            }
        }
        let node = self.create_text(text);
        self.push_unchecked(parent, node);
        Ok(node)
    }

    /// Append a batch of nodes in order.
    ///
    /// Fragments and temporary documents are drained rather than inserted;
    /// a temporary document's metadata is merged into the owner of `parent`.
    pub fn extend_children(
        &mut self,
        parent: NodeId,
        batch: impl Into<Batch>,
    ) -> Result<(), DomError> {
        self.ensure_children(parent)?;
        let batch = batch.into();
        let nodes = self.expand_batch(parent, &batch)?;
        self.absorb_meta(parent, &batch);
        for node in nodes {
            self.push_unchecked(parent, node);
        }
        Ok(())
    }

    /// Insert a node at `index` (clamped to the child count).
    ///
    /// The node is detached from its current parent first, so when it moves
    /// within the same parent `index` refers to the list without it.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        index: usize,
        child: impl Into<NewChild>,
    ) -> Result<NodeId, DomError> {
        self.ensure_children(parent)?;
        let child = self.materialize(child.into());
        self.ensure_insertable(parent, child)?;
        self.insert_unchecked(parent, index, child);
        Ok(child)
    }

    /// Insert a batch of nodes starting at `index`.
    pub fn extend_before(
        &mut self,
        parent: NodeId,
        index: usize,
        batch: impl Into<Batch>,
    ) -> Result<(), DomError> {
        self.ensure_children(parent)?;
        let batch = batch.into();
        let nodes = self.expand_batch(parent, &batch)?;
        self.absorb_meta(parent, &batch);
        let mut at = index;
        for node in nodes {
            self.insert_unchecked(parent, at, node);
            at = self.index(node).map_or(at, |i| i + 1);
        }
        Ok(())
    }

    /// Delete the children addressed by `slice`. Returns the removed nodes
    /// in list order; they are detached, not freed.
    pub fn delete_children(
        &mut self,
        parent: NodeId,
        slice: impl Into<Slice>,
    ) -> Result<Vec<NodeId>, DomError> {
        self.ensure_children(parent)?;
        let mut indices = slice.into().indices(self.children(parent).len())?;
        indices.sort_unstable();
        let mut removed = Vec::with_capacity(indices.len());
        for &index in indices.iter().rev() {
            removed.push(self.remove_at(parent, index));
        }
        removed.reverse();
        Ok(removed)
    }

    /// Replace the children addressed by `slice`.
    ///
    /// `replacement` is a single node, or a fragment whose children are used
    /// in order. The number of nodes must match the number of addressed
    /// slots. Returns the replaced nodes.
    pub fn replace_children(
        &mut self,
        parent: NodeId,
        slice: impl Into<Slice>,
        replacement: NodeId,
    ) -> Result<Vec<NodeId>, DomError> {
        self.ensure_children(parent)?;
        if replacement == parent {
            return Err(DomError::SelfContainment);
        }
        let nodes = if self.kind(replacement) == Some(NodeKind::DocumentFragment) {
            self.children(replacement).to_vec()
        } else {
            vec![replacement]
        };
        let indices = slice.into().indices(self.children(parent).len())?;
        if indices.len() != nodes.len() {
            return Err(DomError::LengthMismatch {
                expected: indices.len(),
                found: nodes.len(),
            });
        }
        for &node in &nodes {
            if self.parent(node) == Some(parent) {
                return Err(DomError::AlreadyChild {
                    index: self.index(node).unwrap_or_default(),
                });
            }
            self.ensure_insertable(parent, node)?;
        }
        let mut replaced = Vec::with_capacity(nodes.len());
        for (&index, &node) in indices.iter().zip(&nodes) {
            self.detach(node);
            let old = std::mem::replace(&mut self.child_list(parent)[index], node);
            self.disconnect(old);
            self.attach(parent, node, index);
            replaced.push(old);
        }
        self.relink(parent, 0);
        Ok(replaced)
    }

    /// Replace `old` with the nodes of `batch`, in place.
    pub fn replace_node(&mut self, old: NodeId, batch: impl Into<Batch>) -> Result<(), DomError> {
        let (parent, index) = self.position(old)?;
        self.extend_before(parent, index, batch)?;
        self.detach(old);
        Ok(())
    }

    /// Detach every child of `parent`.
    pub fn remove_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        let children = self.children(parent).to_vec();
        if let Some(list) = self.nodes[parent.0].children.as_mut() {
            list.clear();
        }
        for &child in &children {
            self.disconnect(child);
        }
        children
    }

    fn position(&self, node: NodeId) -> Result<(NodeId, usize), DomError> {
        match (self.parent(node), self.index(node)) {
            (Some(parent), Some(index)) => Ok((parent, index)),
            _ => Err(DomError::Detached {
                name: self.name(node).to_string(),
            }),
        }
    }

    /// Insert `child` as the next sibling of `node`.
    pub fn append_after(
        &mut self,
        node: NodeId,
        child: impl Into<NewChild>,
    ) -> Result<NodeId, DomError> {
        let (parent, index) = self.position(node)?;
        let child = self.materialize(child.into());
        if child == node {
            return Ok(child);
        }
        self.ensure_insertable(parent, child)?;
        self.detach(child);
        let index = self.index(node).unwrap_or(index);
        self.insert_unchecked(parent, index + 1, child);
        Ok(child)
    }

    /// Insert a batch right after `node`.
    pub fn append_nodes_after(
        &mut self,
        node: NodeId,
        batch: impl Into<Batch>,
    ) -> Result<(), DomError> {
        let (parent, index) = self.position(node)?;
        self.extend_before(parent, index + 1, batch)
    }

    /// Insert `child` as the previous sibling of `node`.
    pub fn prepend_before(
        &mut self,
        node: NodeId,
        child: impl Into<NewChild>,
    ) -> Result<NodeId, DomError> {
        let (parent, _) = self.position(node)?;
        let child = self.materialize(child.into());
        if child == node {
            return Ok(child);
        }
        self.ensure_insertable(parent, child)?;
        self.detach(child);
        let index = self.index(node).unwrap_or_default();
        self.insert_unchecked(parent, index, child);
        Ok(child)
    }

    /// Insert a batch right before `node`.
    pub fn prepend_nodes_before(
        &mut self,
        node: NodeId,
        batch: impl Into<Batch>,
    ) -> Result<(), DomError> {
        let (parent, index) = self.position(node)?;
        self.extend_before(parent, index, batch)
    }

    // ========== Content edits ==========

    /// Set an attribute, keeping the owner's id index current.
    pub fn set_attr(
        &mut self,
        node: NodeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, DomError> {
        let key = key.into();
        let value = value.into();
        let indexed = key == "id" && !self.kind(node).is_some_and(NodeKind::is_document);
        let previous = self.attrs_mut(node)?.set(key, value.clone());
        if indexed {
            let owner = self.owner(node);
            if let Some(old) = &previous {
                self.unindex_id(owner, old, node);
            }
            self.index_id(owner, value, node);
        }
        Ok(previous)
    }

    /// Remove an attribute, keeping the owner's id index current.
    pub fn remove_attr(&mut self, node: NodeId, key: &str) -> Result<Option<String>, DomError> {
        let removed = self.attrs_mut(node)?.remove(key);
        if key == "id" {
            if let Some(old) = &removed {
                let owner = self.owner(node);
                self.unindex_id(owner, old, node);
            }
        }
        Ok(removed)
    }

    fn attrs_mut(&mut self, node: NodeId) -> Result<&mut Attributes, DomError> {
        let name = self.name(node).to_string();
        self.nodes
            .get_mut(node.0)
            .and_then(|n| n.data.attrs_mut())
            .ok_or(DomError::NoAttributes { name })
    }

    /// Replace the character data payload of a node. Returns false for kinds
    /// without a payload.
    pub fn set_text(&mut self, node: NodeId, data: impl Into<String>) -> bool {
        match self.nodes.get_mut(node.0).and_then(|n| n.data.text_mut()) {
            Some(slot) => {
                *slot = data.into();
                true
            }
            None => false,
        }
    }

    // ========== Normalization and cloning ==========

    /// Merge adjacent text children of `parent` and drop empty ones. Only
    /// the direct children are affected.
    pub fn normalize_children(&mut self, parent: NodeId) {
        let mut i = 0;
        while let Some(child) = self.child(parent, i) {
            if !matches!(self[child].data(), NodeData::Text(_)) {
                i += 1;
                continue;
            }
            if self.text(child).is_some_and(str::is_empty) {
                let _ = self.remove_at(parent, i);
                continue;
            }
            while let Some(next) = self.child(parent, i + 1) {
                let NodeData::Text(extra) = self[next].data() else {
                    break;
                };
                let extra = extra.clone();
                if let Some(slot) = self.node_mut(child).data.text_mut() {
                    slot.push_str(&extra);
                }
                let _ = self.remove_at(parent, i + 1);
            }
            i += 1;
        }
    }

    /// Normalize every child list in the subtree of `root`.
    pub fn normalize(&mut self, root: NodeId) {
        let containers: Vec<NodeId> = self
            .descendants(root)
            .filter(|&id| self.accepts_children(id))
            .collect();
        for container in containers {
            self.normalize_children(container);
        }
    }

    /// Copy a node.
    ///
    /// A shallow copy has the same name, attributes and payload but no
    /// children. A deep copy also copies the subtree; each copied child list
    /// is normalized. The copy is detached.
    pub fn clone_node(&mut self, node: NodeId, deep: bool) -> NodeId {
        let root = self.shallow_copy(node);
        if !deep {
            return root;
        }
        let mut cursor = root;
        let mut walk = Walk::new(node);
        while let Some(step) = walk.next_step(self) {
            match step {
                Step::Enter(id) if id == node => {}
                Step::Enter(id) => {
                    let copy = self.shallow_copy(id);
                    self.push_unchecked(cursor, copy);
                    cursor = copy;
                }
                Step::Exit(id) => {
                    if self.accepts_children(cursor) {
                        self.normalize_children(cursor);
                    }
                    if id == node {
                        break;
                    }
                    cursor = self.parent(cursor).unwrap_or(root);
                }
            }
        }
        root
    }

    fn shallow_copy(&mut self, node: NodeId) -> NodeId {
        let source = &self[node];
        let name = source.name().to_string();
        let data = source.data().shallow_copy();
        self.alloc(name, data)
    }
}
