//! The built-in `xml` to `xml` converter styles.
//!
//! `default` copies the tree. `clean` drops comments, drops text that is
//! only whitespace between elements, and replaces processing instructions
//! with their expansion when the converter has an expander.

use lexor_converter::{Conversion, ConverterBundle, DEFAULT_KEY, NodeConverter, SkipNode};
use lexor_dom::node::COMMENT_NAME;
use lexor_dom::{DomError, NodeId, NodeKind};
use log::trace;

use crate::xml::{DEFAULT_STYLE, XML};

/// Name of the tidying style.
pub const CLEAN_STYLE: &str = "clean";

/// The `xml` to `xml` identity converter.
#[must_use]
pub fn identity() -> ConverterBundle {
    ConverterBundle::new(XML, XML, DEFAULT_STYLE)
}

/// The `xml` to `xml` tidying converter.
#[must_use]
pub fn clean() -> ConverterBundle {
    let mut bundle = ConverterBundle::new(XML, XML, CLEAN_STYLE);
    let _ = bundle
        .handler(COMMENT_NAME, || Box::new(SkipNode))
        .handler(DEFAULT_KEY, || Box::new(Tidy))
        .finish(drop_blank_text);
    bundle
}

/// Expands processing instructions, copies the rest.
#[derive(Debug, Clone, Copy, Default)]
struct Tidy;

impl NodeConverter for Tidy {
    fn start(&mut self, cx: &mut Conversion<'_>, node: NodeId) -> Result<NodeId, DomError> {
        if cx.dom().kind(node) == Some(NodeKind::ProcessingInstruction) && cx.can_expand() {
            return cx.expand(node);
        }
        Ok(node)
    }
}

/// Remove whitespace-only text that sits next to an element.
fn drop_blank_text(cx: &mut Conversion<'_>) -> Result<(), DomError> {
    let root = cx.document();
    let dom = cx.dom_mut();
    let blank: Vec<NodeId> = dom
        .descendants(root)
        .filter(|&id| {
            dom.kind(id) == Some(NodeKind::Text)
                && dom.text(id).is_some_and(|t| t.trim().is_empty())
                && [dom.prev_sibling(id), dom.next_sibling(id)]
                    .into_iter()
                    .flatten()
                    .any(|s| dom.kind(s).is_some_and(NodeKind::is_element))
        })
        .collect();
    trace!(target: "lexor.converter", "dropping {} blank text nodes", blank.len());
    for id in blank {
        dom.detach(id);
    }
    Ok(())
}
