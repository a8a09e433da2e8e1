//! The node arena: allocation and read-only queries.

use std::ops::Index;

use crate::attributes::Attributes;
use crate::node::{
    CDATA_NAME, COMMENT_NAME, DOCTYPE_NAME, DOCUMENT_NAME, DocumentData, ENTITY_NAME,
    FRAGMENT_NAME, Node, NodeData, NodeId, NodeKind, TEXT_NAME,
};
use crate::walk::Descendants;

/// Arena holding every node of every tree in a pipeline run.
///
/// Documents, fragments, diagnostics logs and detached nodes all live side
/// by side. Relationships are [`NodeId`] indices, so any node can be reached
/// in O(1) and trees can be traversed without recursion.
#[derive(Debug, Clone, Default)]
pub struct Dom {
    pub(crate) nodes: Vec<Node>,
}

impl Dom {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever allocated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing was allocated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node by id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Allocate a detached node.
    pub fn alloc(&mut self, name: impl Into<String>, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        let is_document = data.kind().is_document();
        let mut node = Node::new(name.into(), data);
        if is_document {
            node.owner = Some(id);
        }
        self.nodes.push(node);
        id
    }

    // ========== Constructors ==========

    /// New text node.
    pub fn create_text(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(TEXT_NAME, NodeData::Text(data.into()))
    }

    /// New comment without a comment style.
    pub fn create_comment(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(
            COMMENT_NAME,
            NodeData::Comment {
                data: data.into(),
                kind: None,
            },
        )
    }

    /// New comment tagged with a comment style.
    pub fn create_styled_comment(
        &mut self,
        data: impl Into<String>,
        kind: impl Into<String>,
    ) -> NodeId {
        self.alloc(
            COMMENT_NAME,
            NodeData::Comment {
                data: data.into(),
                kind: Some(kind.into()),
            },
        )
    }

    /// New CDATA section.
    pub fn create_cdata(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(CDATA_NAME, NodeData::CData(data.into()))
    }

    /// New entity reference holding its full source text.
    pub fn create_entity(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(ENTITY_NAME, NodeData::Entity(data.into()))
    }

    /// New document type declaration.
    pub fn create_doctype(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(DOCTYPE_NAME, NodeData::DocumentType(data.into()))
    }

    /// New processing instruction; its name is the target.
    pub fn create_pi(&mut self, target: impl Into<String>, data: impl Into<String>) -> NodeId {
        let target = target.into();
        self.alloc(
            target.clone(),
            NodeData::ProcessingInstruction {
                target,
                data: data.into(),
            },
        )
    }

    /// New element without attributes.
    pub fn create_element(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(name, NodeData::Element(Attributes::new()))
    }

    /// New element with attributes.
    pub fn create_element_with(&mut self, name: impl Into<String>, attrs: Attributes) -> NodeId {
        self.alloc(name, NodeData::Element(attrs))
    }

    /// New raw text element.
    pub fn create_raw_text(&mut self, name: impl Into<String>, data: impl Into<String>) -> NodeId {
        self.alloc(
            name,
            NodeData::RawText {
                attrs: Attributes::new(),
                data: data.into(),
            },
        )
    }

    /// New raw text element with attributes.
    pub fn create_raw_text_with(
        &mut self,
        name: impl Into<String>,
        attrs: Attributes,
        data: impl Into<String>,
    ) -> NodeId {
        self.alloc(
            name,
            NodeData::RawText {
                attrs,
                data: data.into(),
            },
        )
    }

    /// New void element.
    pub fn create_void(&mut self, name: impl Into<String>) -> NodeId {
        self.alloc(name, NodeData::Void(Attributes::new()))
    }

    /// New void element with attributes.
    pub fn create_void_with(&mut self, name: impl Into<String>, attrs: Attributes) -> NodeId {
        self.alloc(name, NodeData::Void(attrs))
    }

    /// New document. It owns itself.
    pub fn create_document(&mut self, lang: impl Into<String>, style: impl Into<String>) -> NodeId {
        self.alloc(
            DOCUMENT_NAME,
            NodeData::Document(Box::new(DocumentData::new(lang, style))),
        )
    }

    /// New document marked temporary: when passed to `extend_children` its
    /// children are spliced in and its metadata merged into the host.
    pub fn create_temporary_document(
        &mut self,
        lang: impl Into<String>,
        style: impl Into<String>,
    ) -> NodeId {
        let mut data = DocumentData::new(lang, style);
        data.temporary = true;
        self.alloc(DOCUMENT_NAME, NodeData::Document(Box::new(data)))
    }

    /// New document fragment.
    pub fn create_fragment(&mut self, lang: impl Into<String>, style: impl Into<String>) -> NodeId {
        self.alloc(
            FRAGMENT_NAME,
            NodeData::DocumentFragment(Box::new(DocumentData::new(lang, style))),
        )
    }

    // ========== Queries ==========

    /// Node name.
    #[must_use]
    pub fn name(&self, id: NodeId) -> &str {
        self.get(id).map_or("", Node::name)
    }

    /// Node kind.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(Node::kind)
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    /// Get the `index`-th child.
    #[must_use]
    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev)
    }

    /// Position of a node within its parent.
    #[must_use]
    pub fn index(&self, id: NodeId) -> Option<usize> {
        self.get(id).and_then(|n| n.index)
    }

    /// Depth of a node.
    #[must_use]
    pub fn level(&self, id: NodeId) -> i32 {
        self.get(id).map_or(0, |n| n.level)
    }

    /// Owning document of a node.
    #[must_use]
    pub fn owner(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.owner)
    }

    /// Whether `id` holds a child list.
    #[must_use]
    pub fn accepts_children(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::accepts_children)
    }

    /// Attributes of element-like nodes.
    #[must_use]
    pub fn attrs(&self, id: NodeId) -> Option<&Attributes> {
        self.get(id).and_then(Node::attrs)
    }

    /// A single attribute value.
    #[must_use]
    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.get(id).and_then(|n| n.attr(key))
    }

    /// Character data payload.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(Node::text)
    }

    /// Document information of documents and fragments.
    #[must_use]
    pub fn document(&self, id: NodeId) -> Option<&DocumentData> {
        self.get(id).and_then(Node::document)
    }

    /// Mutable document information. The id index stays internal.
    pub fn document_mut(&mut self, id: NodeId) -> Option<&mut DocumentData> {
        self.nodes.get_mut(id.0).and_then(|n| n.data.document_mut())
    }

    /// Look up an element by `id` attribute within an owning document.
    #[must_use]
    pub fn element_by_id(&self, owner: NodeId, id: &str) -> Option<NodeId> {
        self.document(owner).and_then(|d| d.element_by_id(id))
    }

    /// Returns true if `descendant` is strictly below `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            dom: self,
            current: self.parent(id),
        }
    }

    /// The topmost ancestor, or the node itself.
    #[must_use]
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Pre-order iterator over `root` and everything below it.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants::new(self, root)
    }

    /// All nodes in the subtree of `root` with the given name, in document
    /// order.
    #[must_use]
    pub fn nodes_by_name(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(root)
            .filter(|&id| self.name(id) == name)
            .collect()
    }

    /// Concatenated text and CDATA content of a subtree.
    #[must_use]
    pub fn text_content(&self, root: NodeId) -> String {
        self.descendants(root)
            .filter_map(|id| match self.get(id).map(Node::data) {
                Some(NodeData::Text(s) | NodeData::CData(s)) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Number of element-kind siblings before `id`. For an element this is
    /// its position among the element children of its parent.
    #[must_use]
    pub fn element_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        let index = self.index(id)?;
        Some(
            self.children(parent)[..index]
                .iter()
                .filter(|&&c| self.kind(c).is_some_and(NodeKind::is_element))
                .count(),
        )
    }

    /// Element-kind children of `id`.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.kind(c).is_some_and(NodeKind::is_element))
    }

    /// Closest preceding sibling of element kind.
    #[must_use]
    pub fn prev_element(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.prev_sibling(id);
        while let Some(sibling) = current {
            if self.kind(sibling).is_some_and(NodeKind::is_element) {
                return Some(sibling);
            }
            current = self.prev_sibling(sibling);
        }
        None
    }

    /// Closest following sibling of element kind.
    #[must_use]
    pub fn next_element(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling(id);
        while let Some(sibling) = current {
            if self.kind(sibling).is_some_and(NodeKind::is_element) {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }
}

impl Index<NodeId> for Dom {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    dom: &'a Dom,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.dom.parent(id);
        Some(id)
    }
}
