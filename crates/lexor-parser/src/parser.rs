//! The parse loop.

use std::collections::HashMap;
use std::sync::Arc;

use lexor_common::StyleOptions;
use lexor_dom::{Diagnostic, Dom, NodeId, NodeKind, Position};
use log::{debug, trace};
use regex::Regex;

use crate::bundle::{AUTO_CLOSED, DEFAULT_KEY, Made, NodeParser, ParserBundle, UNCLOSED};
use crate::error::ParserError;
use crate::scanner::Scanner;

const TARGET: &str = "lexor.parser";

struct CompiledRule {
    boundary: Option<Regex>,
    handlers: Vec<usize>,
}

/// A node that was opened and is waiting for its closing condition.
#[derive(Debug, Clone, Copy)]
struct InProgress {
    node: NodeId,
    handler: usize,
    start: Position,
}

/// Result of [`Parser::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    /// The document (with a uri) or fragment (without one).
    pub document: NodeId,
    /// Diagnostics collected while parsing.
    pub log: NodeId,
    /// Name the input was reported under.
    pub uri: String,
}

/// Turns text into a tree using the handlers of one style.
pub struct Parser {
    bundle: Arc<ParserBundle>,
    handlers: Vec<Box<dyn NodeParser>>,
    rules: HashMap<String, CompiledRule>,
    options: StyleOptions,
}

impl Parser {
    /// Build a parser for `bundle`, compiling its text boundaries.
    ///
    /// # Errors
    /// Fails when a boundary is not a valid character class, a rule names
    /// a handler the bundle does not have, or there is no default rule.
    pub fn new(bundle: Arc<ParserBundle>) -> Result<Self, ParserError> {
        let handlers = bundle.instantiate();
        let mut rules = HashMap::new();
        for (key, rule) in bundle.rules() {
            if let Some(bad) = rule.handlers.iter().find(|h| h.0 >= handlers.len()) {
                return Err(ParserError::UnknownHandler {
                    key: key.clone(),
                    index: bad.0,
                });
            }
            let boundary = if rule.boundary.is_empty() {
                None
            } else {
                let pattern = format!("[{}]", rule.boundary);
                let compiled = Regex::new(&pattern).map_err(|source| ParserError::InvalidBoundary {
                    key: key.clone(),
                    class: rule.boundary.clone(),
                    source,
                })?;
                Some(compiled)
            };
            let compiled = CompiledRule {
                boundary,
                handlers: rule.handlers.iter().map(|h| h.0).collect(),
            };
            let _ = rules.insert(key.clone(), compiled);
        }
        if !rules.contains_key(DEFAULT_KEY) {
            return Err(ParserError::MissingDefaultRule {
                lang: bundle.lang().to_string(),
                style: bundle.style().to_string(),
            });
        }
        let options = bundle.default_options().clone();
        debug!(target: TARGET, "parser ready for {}:{}", bundle.lang(), bundle.style());
        Ok(Self {
            bundle,
            handlers,
            rules,
            options,
        })
    }

    /// Override some of the style's default options.
    #[must_use]
    pub fn with_options(mut self, options: &StyleOptions) -> Self {
        self.options.merge(options);
        self
    }

    /// Language being parsed.
    #[must_use]
    pub fn language(&self) -> &str {
        self.bundle.lang()
    }

    /// Style in use.
    #[must_use]
    pub fn style(&self) -> &str {
        self.bundle.style()
    }

    /// Effective options.
    #[must_use]
    pub const fn options(&self) -> &StyleOptions {
        &self.options
    }

    /// The bundle this parser was built from.
    #[must_use]
    pub const fn bundle(&self) -> &Arc<ParserBundle> {
        &self.bundle
    }

    /// Parse `text` into a new tree in `dom`.
    ///
    /// Malformed input never fails: unclosed nodes are closed and reported
    /// in the returned log. Without a `uri`, or with an empty one, the result
    /// is a fragment.
    ///
    /// # Errors
    /// Only a handler producing a node that cannot be attached where it was
    /// made fails the parse.
    pub fn parse(
        &mut self,
        dom: &mut Dom,
        text: &str,
        uri: Option<&str>,
    ) -> Result<Parsed, ParserError> {
        let lang = self.bundle.lang();
        let style = self.bundle.style();
        let uri = uri.filter(|u| !u.is_empty());
        let root = match uri {
            Some(_) => dom.create_document(lang, style),
            None => dom.create_fragment(lang, style),
        };
        if let Some(doc) = dom.document_mut(root) {
            doc.uri = uri.map(str::to_string);
            doc.defaults = self.options.clone();
        }
        let log = dom.create_log();
        let name = uri.map_or_else(|| format!("string@{}", text.len()), str::to_string);
        debug!(target: TARGET, "parsing {name} ({} bytes)", text.len());

        let mut cx = Scanner::new(text, dom, root, log, &name, &self.options);
        let mut stack: Vec<InProgress> = Vec::new();
        while !cx.at_end() {
            if let Some(crt) = close_nodes(&mut self.handlers, &mut cx, &mut stack) {
                cx.container = crt.unwrap_or(root);
                continue;
            }
            let key = cx.dom.name(cx.container);
            let rule = self
                .rules
                .get(key)
                .or_else(|| self.rules.get(DEFAULT_KEY))
                .ok_or_else(|| ParserError::MissingDefaultRule {
                    lang: lang.to_string(),
                    style: style.to_string(),
                })?;

            let mut made = None;
            for &h in &rule.handlers {
                let start = cx.pos();
                let before = cx.caret();
                cx.reporter = self.handlers[h].name();
                if let Some(result) = self.handlers[h].make_node(&mut cx) {
                    made = Some((h, result, start, before));
                    break;
                }
                if cx.at_end() {
                    break;
                }
            }
            cx.reporter = TARGET;

            match made {
                Some((h, result, start, before)) => {
                    trace!(target: TARGET, "{} made {:?} at {start}", self.handlers[h].name(), result);
                    if let Some(open) = attach(&mut cx, result)? {
                        stack.push(InProgress {
                            node: open,
                            handler: h,
                            start,
                        });
                        cx.container = open;
                    } else if cx.caret() == before {
                        consume_text(&mut cx, rule.boundary.as_ref())?;
                    }
                }
                None => consume_text(&mut cx, rule.boundary.as_ref())?,
            }
        }

        for open in &stack {
            let label = cx.dom.name(open.node).to_string();
            debug!(target: TARGET, "'{label}' still open at end of input");
            report(&mut cx, open.start, UNCLOSED, vec![label]);
        }
        Ok(Parsed {
            document: root,
            log,
            uri: name,
        })
    }
}

/// Ask open nodes, innermost first, whether the caret closes them.
///
/// Returns `Some(new_container)` when something closed; `None` inside means
/// the root. Every node inside the one that closed is auto-closed.
fn close_nodes(
    handlers: &mut [Box<dyn NodeParser>],
    cx: &mut Scanner<'_>,
    stack: &mut Vec<InProgress>,
) -> Option<Option<NodeId>> {
    for depth in (0..stack.len()).rev() {
        let open = stack[depth];
        cx.reporter = handlers[open.handler].name();
        let closed = handlers[open.handler].close(cx, open.node);
        cx.reporter = TARGET;
        let Some(at) = closed else {
            continue;
        };
        while stack.len() > depth + 1 {
            if let Some(inner) = stack.pop() {
                let name = cx.dom.name(inner.node).to_string();
                debug!(target: TARGET, "auto closing '{name}' at {at}");
                report(
                    cx,
                    inner.start,
                    AUTO_CLOSED,
                    vec![name, at.line.to_string(), at.column.to_string()],
                );
            }
        }
        let _ = stack.pop();
        return Some(stack.last().map(|top| top.node));
    }
    None
}

/// Attach what a handler made to the current container.
///
/// Returns the node when it stays open.
fn attach(cx: &mut Scanner<'_>, made: Made) -> Result<Option<NodeId>, ParserError> {
    let container = cx.container;
    let node = made.node();
    let kind = cx.dom.kind(node);
    if kind.is_some_and(NodeKind::is_document) {
        cx.dom.extend_children(container, node)?;
        return Ok(None);
    }
    if kind == Some(NodeKind::Text) {
        let data = cx.dom.text(node).unwrap_or_default().to_string();
        let trailing_text = cx
            .dom
            .last_child(container)
            .is_some_and(|last| cx.dom.kind(last) == Some(NodeKind::Text));
        if trailing_text {
            let _ = cx.dom.push_text(container, &data)?;
        } else {
            let _ = cx.dom.append_child(container, node)?;
        }
        return Ok(None);
    }
    let _ = cx.dom.append_child(container, node)?;
    match made {
        Made::Open(node) if cx.dom.accepts_children(node) => Ok(Some(node)),
        _ => Ok(None),
    }
}

/// Read plain text up to the next boundary character.
fn consume_text(cx: &mut Scanner<'_>, boundary: Option<&Regex>) -> Result<(), ParserError> {
    if cx.at_end() {
        return Ok(());
    }
    let caret = cx.caret();
    let end = match boundary.and_then(|re| re.find_at(cx.text(), caret)) {
        Some(m) if m.start() == caret => {
            let width = cx.rest().chars().next().map_or(1, char::len_utf8);
            caret + width
        }
        Some(m) => m.start(),
        None => cx.text().len(),
    };
    let content = &cx.text()[caret..end];
    let container = cx.container;
    let _ = cx.dom.push_text(container, content)?;
    cx.advance_to(end);
    Ok(())
}

fn report(cx: &mut Scanner<'_>, at: Position, code: &str, args: Vec<String>) {
    let entry = Diagnostic::new(TARGET)
        .at(at)
        .code(code)
        .args(args)
        .file(cx.uri());
    let log = cx.log;
    let _ = cx.dom.push_diagnostic(log, &entry);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::HandlerId;

    struct Never;

    impl NodeParser for Never {
        fn name(&self) -> &'static str {
            "never"
        }

        fn make_node(&mut self, _cx: &mut Scanner<'_>) -> Option<Made> {
            None
        }
    }

    fn bundle_with(boundary: &str) -> ParserBundle {
        let mut bundle = ParserBundle::new("plain", "default");
        let never = bundle.handler(|| Box::new(Never));
        bundle.rule(DEFAULT_KEY, boundary, &[never]);
        bundle
    }

    #[test]
    fn test_missing_default_rule() {
        let bundle = ParserBundle::new("plain", "default");
        let err = Parser::new(Arc::new(bundle)).err();
        assert!(matches!(err, Some(ParserError::MissingDefaultRule { .. })));
    }

    #[test]
    fn test_invalid_boundary() {
        let err = Parser::new(Arc::new(bundle_with("\\"))).err();
        assert!(matches!(err, Some(ParserError::InvalidBoundary { .. })));
    }

    #[test]
    fn test_unknown_handler() {
        let mut bundle = bundle_with("<");
        bundle.rule("x", "<", &[HandlerId(7)]);
        let err = Parser::new(Arc::new(bundle)).err();
        assert!(matches!(err, Some(ParserError::UnknownHandler { index: 7, .. })));
    }

    #[test]
    fn test_text_only_input_is_one_text_node() {
        let mut parser = Parser::new(Arc::new(bundle_with("<&"))).unwrap();
        let mut dom = Dom::new();
        let parsed = parser.parse(&mut dom, "a<b&c\nd", None).unwrap();
        let children = dom.children(parsed.document);
        assert_eq!(children.len(), 1);
        assert_eq!(dom.text(children[0]), Some("a<b&c\nd"));
        assert!(dom.children(parsed.log).is_empty());
        assert_eq!(parsed.uri, "string@7");
    }

    #[test]
    fn test_empty_boundary_reads_to_end() {
        let mut parser = Parser::new(Arc::new(bundle_with(""))).unwrap();
        let mut dom = Dom::new();
        let parsed = parser.parse(&mut dom, "no boundaries", Some("f.txt")).unwrap();
        assert_eq!(dom.kind(parsed.document), Some(NodeKind::Document));
        assert_eq!(dom.text_content(parsed.document), "no boundaries");
    }

    #[test]
    fn test_empty_uri_makes_a_fragment() {
        let mut parser = Parser::new(Arc::new(bundle_with("<"))).unwrap();
        let mut dom = Dom::new();
        let parsed = parser.parse(&mut dom, "abc", Some("")).unwrap();
        assert_eq!(dom.kind(parsed.document), Some(NodeKind::DocumentFragment));
        assert_eq!(dom.document(parsed.document).unwrap().uri, None);
        assert_eq!(parsed.uri, "string@3");
    }

    #[test]
    fn test_empty_input() {
        let mut parser = Parser::new(Arc::new(bundle_with("<"))).unwrap();
        let mut dom = Dom::new();
        let parsed = parser.parse(&mut dom, "", None).unwrap();
        assert!(dom.children(parsed.document).is_empty());
        assert_eq!(parsed.uri, "string@0");
    }

    #[test]
    fn test_options_reach_document_defaults() {
        let mut opts = StyleOptions::new();
        let _ = opts.set("flavor", "strict");
        let mut parser = Parser::new(Arc::new(bundle_with("<")))
            .unwrap()
            .with_options(&opts);
        assert_eq!(parser.options().get("flavor"), Some("strict"));
        let mut dom = Dom::new();
        let parsed = parser.parse(&mut dom, "x", Some("in.xml")).unwrap();
        let doc = dom.document(parsed.document).unwrap();
        assert_eq!(doc.defaults.get("flavor"), Some("strict"));
        assert_eq!(doc.uri.as_deref(), Some("in.xml"));
        assert_eq!(parser.language(), "plain");
        assert_eq!(parser.style(), "default");
    }
}
