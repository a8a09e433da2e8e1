//! The `text:default` writer style: character data only, wrapped to the
//! `width` option.

use lexor_dom::node::{DOCUMENT_NAME, ENTITY_NAME, FRAGMENT_NAME, TEXT_NAME};
use lexor_dom::{NodeId, NodeKind};
use lexor_writer::{Context, DEFAULT_KEY, NodeWriter, WriterBundle};

use crate::xml::DEFAULT_STYLE;
use crate::xml::syntax::decode_entity;

/// Language name.
pub const TEXT: &str = "text";

/// The `text:default` writer bundle.
#[must_use]
pub fn bundle() -> WriterBundle {
    let mut bundle = WriterBundle::new(TEXT, DEFAULT_STYLE);
    let _ = bundle.handler(DEFAULT_KEY, || Box::new(TextOnly));
    for key in [DOCUMENT_NAME, FRAGMENT_NAME, TEXT_NAME, ENTITY_NAME] {
        let _ = bundle.alias(key, DEFAULT_KEY);
    }
    bundle
}

/// Writes text, CDATA and decoded entities; drops everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOnly;

impl NodeWriter for TextOnly {
    fn data(&mut self, cx: &mut Context<'_>, node: NodeId) {
        let dom = cx.dom();
        let Some(text) = dom.text(node) else {
            return;
        };
        match dom.kind(node) {
            Some(NodeKind::Text | NodeKind::CData) => cx.wrap(text),
            Some(NodeKind::Entity) => match decode_entity(text) {
                Some(c) => cx.wrap(c.encode_utf8(&mut [0; 4])),
                None => cx.wrap(text),
            },
            _ => {}
        }
    }
}
