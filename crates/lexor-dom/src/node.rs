//! Node identities, kinds and payloads.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use lexor_common::StyleOptions;
use strum_macros::{Display, EnumIter};

use crate::attributes::Attributes;

/// A type-safe index into a [`Dom`](crate::Dom) arena.
///
/// Ids are only meaningful for the arena that produced them. Nodes are never
/// freed individually, so an id stays valid for the lifetime of the arena even
/// after its node is detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node name of text nodes.
pub const TEXT_NAME: &str = "#text";
/// Node name of comments.
pub const COMMENT_NAME: &str = "#comment";
/// Node name of CDATA sections.
pub const CDATA_NAME: &str = "#cdata-section";
/// Node name of entity references.
pub const ENTITY_NAME: &str = "#entity";
/// Node name of document type declarations.
pub const DOCTYPE_NAME: &str = "#doctype";
/// Node name of documents.
pub const DOCUMENT_NAME: &str = "#document";
/// Node name of document fragments.
pub const FRAGMENT_NAME: &str = "#document-fragment";

/// The closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum NodeKind {
    /// Plain character data.
    Text,
    /// A comment, optionally tagged with a comment style.
    Comment,
    /// A CDATA section.
    CData,
    /// An entity reference, stored as its full source text.
    Entity,
    /// A document type declaration.
    DocumentType,
    /// A processing instruction; the node name is the target.
    ProcessingInstruction,
    /// A named node with attributes and children.
    Element,
    /// An element whose content is one opaque string.
    RawText,
    /// An element that never has children.
    Void,
    /// Root of a tree with language, style and an id index.
    Document,
    /// A document used as a transient container of siblings.
    DocumentFragment,
}

impl NodeKind {
    /// Kinds that carry a string payload.
    #[must_use]
    pub const fn is_character_data(self) -> bool {
        matches!(
            self,
            Self::Text
                | Self::Comment
                | Self::CData
                | Self::Entity
                | Self::DocumentType
                | Self::ProcessingInstruction
                | Self::RawText
        )
    }

    /// Kinds that carry attributes.
    #[must_use]
    pub const fn is_element(self) -> bool {
        matches!(
            self,
            Self::Element | Self::RawText | Self::Void | Self::Document | Self::DocumentFragment
        )
    }

    /// Documents and fragments.
    #[must_use]
    pub const fn is_document(self) -> bool {
        matches!(self, Self::Document | Self::DocumentFragment)
    }

    /// Kinds that hold a child list.
    #[must_use]
    pub const fn accepts_children(self) -> bool {
        matches!(
            self,
            Self::Element | Self::Document | Self::DocumentFragment
        )
    }
}

/// Per-document information.
///
/// The id index is maintained by the mutation protocol and is read-only
/// from the outside.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentData {
    /// Attributes of the document node itself.
    pub attrs: Attributes,
    /// Language the document is written in.
    pub lang: String,
    /// Style the document was parsed or converted with.
    pub style: String,
    /// Where the document came from, if anywhere.
    pub uri: Option<String>,
    /// Options handed on to writers.
    pub defaults: StyleOptions,
    /// Free-form metadata. Merged into the host when a temporary document
    /// is spliced into another tree.
    pub meta: BTreeMap<String, String>,
    /// Marks a document that only exists to carry nodes and metadata.
    pub temporary: bool,
    pub(crate) ids: HashMap<String, NodeId>,
}

impl DocumentData {
    /// A document in `lang` using `style`.
    #[must_use]
    pub fn new(lang: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            style: style.into(),
            ..Self::default()
        }
    }

    /// Look up an element by its `id` attribute.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Number of indexed ids.
    #[must_use]
    pub fn id_count(&self) -> usize {
        self.ids.len()
    }

    /// Copy of everything except the id index.
    #[must_use]
    pub(crate) fn detached_copy(&self) -> Self {
        Self {
            attrs: self.attrs.clone(),
            lang: self.lang.clone(),
            style: self.style.clone(),
            uri: self.uri.clone(),
            defaults: self.defaults.clone(),
            meta: self.meta.clone(),
            temporary: self.temporary,
            ids: HashMap::new(),
        }
    }
}

/// Kind-specific node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// Text content.
    Text(String),
    /// Comment content and an optional comment style.
    Comment {
        /// Comment body.
        data: String,
        /// Comment flavor, if the language has several.
        kind: Option<String>,
    },
    /// CDATA content.
    CData(String),
    /// Full entity reference text, e.g. `&amp;`.
    Entity(String),
    /// Declaration body.
    DocumentType(String),
    /// Processing instruction; the node name holds the target.
    ProcessingInstruction {
        /// Instruction target.
        target: String,
        /// Instruction body.
        data: String,
    },
    /// Attributes of an element.
    Element(Attributes),
    /// Attributes and opaque content.
    RawText {
        /// Element attributes.
        attrs: Attributes,
        /// Uninterpreted content.
        data: String,
    },
    /// Attributes of an element without children.
    Void(Attributes),
    /// Document information.
    Document(Box<DocumentData>),
    /// Fragment information.
    DocumentFragment(Box<DocumentData>),
}

impl NodeData {
    /// The kind of this payload.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::Text(_) => NodeKind::Text,
            Self::Comment { .. } => NodeKind::Comment,
            Self::CData(_) => NodeKind::CData,
            Self::Entity(_) => NodeKind::Entity,
            Self::DocumentType(_) => NodeKind::DocumentType,
            Self::ProcessingInstruction { .. } => NodeKind::ProcessingInstruction,
            Self::Element(_) => NodeKind::Element,
            Self::RawText { .. } => NodeKind::RawText,
            Self::Void(_) => NodeKind::Void,
            Self::Document(_) => NodeKind::Document,
            Self::DocumentFragment(_) => NodeKind::DocumentFragment,
        }
    }

    /// Character data payload, if this kind has one.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(s)
            | Self::CData(s)
            | Self::Entity(s)
            | Self::DocumentType(s)
            | Self::Comment { data: s, .. }
            | Self::ProcessingInstruction { data: s, .. }
            | Self::RawText { data: s, .. } => Some(s),
            _ => None,
        }
    }

    pub(crate) fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Text(s)
            | Self::CData(s)
            | Self::Entity(s)
            | Self::DocumentType(s)
            | Self::Comment { data: s, .. }
            | Self::ProcessingInstruction { data: s, .. }
            | Self::RawText { data: s, .. } => Some(s),
            _ => None,
        }
    }

    /// Attributes, if this kind has them.
    #[must_use]
    pub fn attrs(&self) -> Option<&Attributes> {
        match self {
            Self::Element(a) | Self::Void(a) | Self::RawText { attrs: a, .. } => Some(a),
            Self::Document(d) | Self::DocumentFragment(d) => Some(&d.attrs),
            _ => None,
        }
    }

    pub(crate) fn attrs_mut(&mut self) -> Option<&mut Attributes> {
        match self {
            Self::Element(a) | Self::Void(a) | Self::RawText { attrs: a, .. } => Some(a),
            Self::Document(d) | Self::DocumentFragment(d) => Some(&mut d.attrs),
            _ => None,
        }
    }

    /// Document information of documents and fragments.
    #[must_use]
    pub fn document(&self) -> Option<&DocumentData> {
        match self {
            Self::Document(d) | Self::DocumentFragment(d) => Some(d),
            _ => None,
        }
    }

    pub(crate) fn document_mut(&mut self) -> Option<&mut DocumentData> {
        match self {
            Self::Document(d) | Self::DocumentFragment(d) => Some(d),
            _ => None,
        }
    }

    /// Payload copy used by cloning. Documents lose their id index.
    pub(crate) fn shallow_copy(&self) -> Self {
        match self {
            Self::Document(d) => Self::Document(Box::new(d.detached_copy())),
            Self::DocumentFragment(d) => Self::DocumentFragment(Box::new(d.detached_copy())),
            other => other.clone(),
        }
    }
}

/// One slot of the arena.
///
/// All fields are maintained by [`Dom`](crate::Dom); read them through the
/// accessors.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) index: Option<usize>,
    pub(crate) prev: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
    pub(crate) children: Option<Vec<NodeId>>,
    pub(crate) level: i32,
    pub(crate) owner: Option<NodeId>,
}

impl Node {
    pub(crate) fn new(name: String, data: NodeData) -> Self {
        let kind = data.kind();
        Self {
            name,
            data,
            parent: None,
            index: None,
            prev: None,
            next: None,
            children: kind.accepts_children().then(Vec::new),
            level: if kind.is_document() { -1 } else { 0 },
            owner: None,
        }
    }

    /// Node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node payload.
    #[must_use]
    pub const fn data(&self) -> &NodeData {
        &self.data
    }

    /// Node kind.
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        self.data.kind()
    }

    /// Parent, if attached.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Position within the parent's children.
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    /// Previous sibling.
    #[must_use]
    pub const fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    /// Next sibling.
    #[must_use]
    pub const fn next(&self) -> Option<NodeId> {
        self.next
    }

    /// Children; empty for childless kinds.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Whether this node holds a child list.
    #[must_use]
    pub const fn accepts_children(&self) -> bool {
        self.children.is_some()
    }

    /// Depth; documents do not add a level.
    #[must_use]
    pub const fn level(&self) -> i32 {
        self.level
    }

    /// The document that owns this node.
    #[must_use]
    pub const fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    /// Attributes, if any.
    #[must_use]
    pub fn attrs(&self) -> Option<&Attributes> {
        self.data.attrs()
    }

    /// Shortcut for one attribute.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.data.attrs().and_then(|a| a.get(key))
    }

    /// Character data payload, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.data.text()
    }

    /// Document information, if this is a document or fragment.
    #[must_use]
    pub fn document(&self) -> Option<&DocumentData> {
        self.data.document()
    }

    /// Whitespace-separated tokens of the `class` attribute, in order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class")
            .unwrap_or_default()
            .split_whitespace()
    }
}
