//! The `xml:default` writer style.

use lexor_dom::{NodeId, NodeKind};
use lexor_dom::node::{DOCUMENT_NAME, ENTITY_NAME, FRAGMENT_NAME, TEXT_NAME};
use lexor_writer::{Context, DEFAULT_KEY, NodeWriter, TagWriter, WriterBundle};

use super::syntax::escape_markup;
use super::{DEFAULT_STYLE, XML};

/// The `xml:default` writer bundle.
#[must_use]
pub fn bundle() -> WriterBundle {
    let mut bundle = WriterBundle::new(XML, DEFAULT_STYLE);
    let _ = bundle.handler(DEFAULT_KEY, || Box::new(Markup));
    for key in [DOCUMENT_NAME, FRAGMENT_NAME, TEXT_NAME, ENTITY_NAME] {
        let _ = bundle.alias(key, DEFAULT_KEY);
    }
    bundle
}

/// Writes every node kind back as markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct Markup;

impl NodeWriter for Markup {
    fn start(&mut self, cx: &mut Context<'_>, node: NodeId) {
        let dom = cx.dom();
        match dom.kind(node) {
            Some(NodeKind::Comment) => cx.write("<!--"),
            Some(NodeKind::CData) => cx.write("<![CDATA["),
            Some(NodeKind::DocumentType) => cx.write("<!DOCTYPE "),
            Some(NodeKind::ProcessingInstruction) => {
                cx.write("<?");
                cx.write(dom.name(node));
                if dom.text(node).is_some_and(|data| !data.is_empty()) {
                    cx.write(" ");
                }
            }
            Some(NodeKind::Element | NodeKind::Void | NodeKind::RawText) => {
                TagWriter.start(cx, node);
            }
            _ => {}
        }
    }

    fn data(&mut self, cx: &mut Context<'_>, node: NodeId) {
        let dom = cx.dom();
        let Some(text) = dom.text(node) else {
            return;
        };
        if dom.kind(node) == Some(NodeKind::Text) {
            cx.write(&escape_markup(text));
        } else {
            cx.write(text);
        }
    }

    fn end(&mut self, cx: &mut Context<'_>, node: NodeId) {
        match cx.dom().kind(node) {
            Some(NodeKind::Comment) => cx.write("-->"),
            Some(NodeKind::CData) => cx.write("]]>"),
            Some(NodeKind::DocumentType) => cx.write(">"),
            Some(NodeKind::ProcessingInstruction) => cx.write("?>"),
            Some(NodeKind::Element | NodeKind::Void | NodeKind::RawText) => {
                TagWriter.end(cx, node);
            }
            _ => {}
        }
    }
}
