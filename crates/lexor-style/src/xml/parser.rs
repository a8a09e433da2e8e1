//! The `xml:default` parser style.
//!
//! Handlers are tried in this order at every `<` or `&`:
//!
//! | handler       | reads                          | makes              |
//! |---------------|--------------------------------|--------------------|
//! | `xml.comment` | `<!-- ... -->`                 | comment            |
//! | `xml.cdata`   | `<![CDATA[ ... ]]>`            | CDATA section      |
//! | `xml.doctype` | `<!DOCTYPE ... >`              | doctype            |
//! | `xml.pi`      | `<?target ... ?>`              | processing instr.  |
//! | `xml.element` | `<name attr="v">` / `<name/>`  | element / void     |
//! | `xml.close`   | `</name>` matching nothing     | nothing, `E100`    |
//! | `xml.entity`  | `&name;` / `&#N;` / `&#xH;`    | entity             |
//!
//! `script` and `style` elements hold raw text up to their closing tag.
//! A `<` or `&` that starts none of these is plain text.

use lexor_common::MessageTable;
use lexor_dom::{Attributes, NodeId, Position};
use lexor_parser::{DEFAULT_KEY, Made, NodeParser, ParserBundle, Scanner};

use super::syntax::{entity_len, is_doctype, is_name_char, name_len, unescape};
use super::{DEFAULT_STYLE, XML};

/// A closing tag matched no open element.
pub const STRAY_CLOSE: &str = "E100";

/// A construct ran to the end of the input.
pub const UNTERMINATED: &str = "E101";

/// Elements whose content is not parsed.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Message templates of the xml parser.
#[must_use]
pub fn messages() -> MessageTable {
    MessageTable::new()
        .with(STRAY_CLOSE, "stray closing tag '</{0}>' ignored")
        .with(UNTERMINATED, "unterminated {0}, read to end of input")
}

/// The `xml:default` parser bundle.
#[must_use]
pub fn bundle() -> ParserBundle {
    let mut bundle = ParserBundle::new(XML, DEFAULT_STYLE);
    let handlers = [
        bundle.handler(|| Box::new(Delimited::COMMENT)),
        bundle.handler(|| Box::new(Delimited::CDATA)),
        bundle.handler(|| Box::new(Doctype)),
        bundle.handler(|| Box::new(Instruction)),
        bundle.handler(|| Box::new(Element)),
        bundle.handler(|| Box::new(StrayClose)),
        bundle.handler(|| Box::new(Entity)),
    ];
    bundle.rule(DEFAULT_KEY, "<&", &handlers);
    bundle.messages(&messages());
    bundle
}

/// Read from `from` up to `close`. Without a `close` the rest of the input
/// is taken and `what` is reported as unterminated.
fn read_until<'a>(cx: &mut Scanner<'a>, start: Position, from: usize, close: &str, what: &str) -> &'a str {
    let text = cx.text();
    if let Some(at) = text[from..].find(close) {
        cx.advance_to(from + at + close.len());
        return &text[from..from + at];
    }
    cx.error(start, UNTERMINATED, [what]);
    cx.advance_to(text.len());
    &text[from..]
}

// ========== Character data ==========

/// Comments and CDATA sections: fixed open and close strings.
#[derive(Debug, Clone, Copy)]
struct Delimited {
    name: &'static str,
    open: &'static str,
    close: &'static str,
    comment: bool,
}

impl Delimited {
    const COMMENT: Self = Self {
        name: "xml.comment",
        open: "<!--",
        close: "-->",
        comment: true,
    };

    const CDATA: Self = Self {
        name: "xml.cdata",
        open: "<![CDATA[",
        close: "]]>",
        comment: false,
    };
}

impl NodeParser for Delimited {
    fn name(&self) -> &'static str {
        self.name
    }

    fn make_node(&mut self, cx: &mut Scanner<'_>) -> Option<Made> {
        if !cx.starts_with(self.open) {
            return None;
        }
        let start = cx.pos();
        let from = cx.caret() + self.open.len();
        let what = if self.comment { "comment" } else { "CDATA section" };
        let data = read_until(cx, start, from, self.close, what);
        let node = if self.comment {
            cx.dom().create_comment(data)
        } else {
            cx.dom().create_cdata(data)
        };
        Some(Made::Closed(node))
    }
}

struct Doctype;

impl NodeParser for Doctype {
    fn name(&self) -> &'static str {
        "xml.doctype"
    }

    fn make_node(&mut self, cx: &mut Scanner<'_>) -> Option<Made> {
        if !cx.starts_with("<") || !is_doctype(&cx.rest()[1..]) {
            return None;
        }
        let start = cx.pos();
        let from = cx.caret() + "<!DOCTYPE".len();
        let data = read_until(cx, start, from, ">", "doctype");
        Some(Made::Closed(cx.dom().create_doctype(data.trim())))
    }
}

struct Instruction;

impl NodeParser for Instruction {
    fn name(&self) -> &'static str {
        "xml.pi"
    }

    fn make_node(&mut self, cx: &mut Scanner<'_>) -> Option<Made> {
        let rest = cx.rest().strip_prefix("<?")?;
        let len = name_len(rest);
        if len == 0 {
            return None;
        }
        let target = &rest[..len];
        let start = cx.pos();
        let from = cx.caret() + 2 + len;
        let data = read_until(cx, start, from, "?>", "processing instruction");
        Some(Made::Closed(cx.dom().create_pi(target, data.trim_start())))
    }
}

struct Entity;

impl NodeParser for Entity {
    fn name(&self) -> &'static str {
        "xml.entity"
    }

    fn make_node(&mut self, cx: &mut Scanner<'_>) -> Option<Made> {
        let len = entity_len(cx.rest());
        if len == 0 {
            return None;
        }
        let text = &cx.rest()[..len];
        let node = cx.dom().create_entity(text);
        cx.advance(len);
        Some(Made::Closed(node))
    }
}

// ========== Tags ==========

/// A parsed start tag, minus its name.
#[derive(Debug, Default)]
struct StartTag {
    attrs: Attributes,
    len: usize,
    empty: bool,
}

/// Read attributes up to `>` or `/>`. Returns `None` when the tag is not
/// closed before the end of the input, a quoted value never ends, or a `<`
/// shows up outside a quoted value.
fn read_start_tag(text: &str) -> Option<StartTag> {
    let mut tag = StartTag::default();
    let mut rest = text;
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("/>") {
            tag.empty = true;
            rest = after;
            break;
        }
        if let Some(after) = rest.strip_prefix('>') {
            rest = after;
            break;
        }
        let len = name_len(rest);
        if len == 0 {
            // Garbage inside the tag is dropped.
            let c = rest.chars().next().filter(|&c| c != '<')?;
            rest = &rest[c.len_utf8()..];
            continue;
        }
        let key = &rest[..len];
        rest = &rest[len..];
        let Some(after) = rest.trim_start().strip_prefix('=') else {
            let _ = tag.attrs.set(key, "");
            continue;
        };
        rest = after.trim_start();
        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let end = rest[1..].find(quote)?;
                let value = &rest[1..=end];
                rest = &rest[end + 2..];
                value
            }
            _ => {
                let end = rest
                    .char_indices()
                    .find(|&(i, c)| {
                        c.is_whitespace() || c == '>' || c == '<' || rest[i..].starts_with("/>")
                    })
                    .map_or(rest.len(), |(i, _)| i);
                let value = &rest[..end];
                rest = &rest[end..];
                value
            }
        };
        let _ = tag.attrs.set(key, unescape(value));
    }
    tag.len = text.len() - rest.len();
    Some(tag)
}

/// Length of `</name>` at the start of `text`, allowing spaces before `>`.
fn close_tag_len(text: &str, name: &str) -> Option<usize> {
    let rest = text.strip_prefix("</")?.strip_prefix(name)?;
    if rest.chars().next().is_some_and(is_name_char) {
        return None;
    }
    let after = rest.trim_start().strip_prefix('>')?;
    Some(text.len() - after.len())
}

struct Element;

impl NodeParser for Element {
    fn name(&self) -> &'static str {
        "xml.element"
    }

    fn make_node(&mut self, cx: &mut Scanner<'_>) -> Option<Made> {
        let rest = cx.rest().strip_prefix('<')?;
        let len = name_len(rest);
        if len == 0 {
            return None;
        }
        let name = &rest[..len];
        let tag = read_start_tag(&rest[len..])?;
        let start = cx.pos();
        let body = cx.caret() + 1 + len + tag.len;
        if tag.empty {
            cx.advance_to(body);
            return Some(Made::Closed(cx.dom().create_void_with(name, tag.attrs)));
        }
        if RAW_TEXT_ELEMENTS.contains(&name) {
            let text = cx.text();
            let close = format!("</{name}");
            let found = text[body..]
                .match_indices(&close)
                .find_map(|(at, _)| Some((at, close_tag_len(&text[body + at..], name)?)));
            let (data, end) = match found {
                Some((at, len)) => (&text[body..body + at], body + at + len),
                None => {
                    cx.error(start, UNTERMINATED, [format!("<{name}>")]);
                    (&text[body..], text.len())
                }
            };
            cx.advance_to(end);
            return Some(Made::Closed(cx.dom().create_raw_text_with(name, tag.attrs, data)));
        }
        cx.advance_to(body);
        Some(Made::Open(cx.dom().create_element_with(name, tag.attrs)))
    }

    fn close(&mut self, cx: &mut Scanner<'_>, node: NodeId) -> Option<Position> {
        let name = cx.dom().name(node).to_string();
        let len = close_tag_len(cx.rest(), &name)?;
        let at = cx.pos();
        cx.advance(len);
        Some(at)
    }
}

struct StrayClose;

impl NodeParser for StrayClose {
    fn name(&self) -> &'static str {
        "xml.close"
    }

    fn make_node(&mut self, cx: &mut Scanner<'_>) -> Option<Made> {
        let rest = cx.rest().strip_prefix("</")?;
        let len = name_len(rest);
        if len == 0 {
            return None;
        }
        let name = &rest[..len];
        let end = close_tag_len(cx.rest(), name)?;
        let pos = cx.pos();
        cx.error(pos, STRAY_CLOSE, [name]);
        cx.advance(end);
        Some(Made::Closed(cx.dom().create_fragment(XML, DEFAULT_STYLE)))
    }
}
