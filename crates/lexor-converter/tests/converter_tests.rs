//! Conversion traversal, hooks, directives and expansion.

use std::sync::Arc;

use lexor_dom::check::verify_structure;
use lexor_dom::{Attributes, Dom, DomError, NodeId, NodeKind};
use lexor_converter::{
    Conversion, ConvertError, ConverterBundle, Converter, DirectiveSpec, Directives,
    EXPANSION_ERROR, EXPANSION_FAILED, ExpandError, ExpandHandler, Expander, NodeConverter,
    SkipNode, collect_directives, core_messages,
};
use lexor_parser::{DEFAULT_KEY, Parser, ParserBundle};
use lexor_writer::{Writer, WriterBundle};

// ========== Helpers ==========

fn element(dom: &mut Dom, parent: NodeId, name: &str, attrs: &[(&str, &str)]) -> NodeId {
    let mut map = Attributes::new();
    for (k, v) in attrs {
        let _ = map.set(*k, *v);
    }
    let node = dom.create_element_with(name, map);
    dom.append_child(parent, node).unwrap()
}

/// `<a id="x">hi<br/></a>` in a document with a uri.
fn sample(dom: &mut Dom) -> NodeId {
    let doc = dom.create_document("xml", "default");
    dom.document_mut(doc).unwrap().uri = Some("in.xml".to_string());
    let a = element(dom, doc, "a", &[("id", "x")]);
    let _ = dom.append_child(a, "hi").unwrap();
    let br = dom.create_void("br");
    let _ = dom.append_child(a, br).unwrap();
    doc
}

fn xml(dom: &Dom, root: NodeId) -> String {
    let mut w = Writer::new(Arc::new(WriterBundle::new("xml", "default"))).unwrap();
    w.write_to_string(dom, root)
}

fn converter(bundle: ConverterBundle) -> Converter {
    Converter::new(Arc::new(bundle))
}

/// Replaces the copy with an element of another name.
struct Rename(&'static str);

impl NodeConverter for Rename {
    fn start(&mut self, cx: &mut Conversion<'_>, node: NodeId) -> Result<NodeId, DomError> {
        let attrs = cx.dom().attrs(node).cloned().unwrap_or_default();
        let dom = cx.dom_mut();
        let renamed = dom.create_element_with(self.0, attrs);
        dom.replace_node(node, vec![renamed])?;
        Ok(renamed)
    }
}

/// Keeps the node but not its children.
struct Shallow;

impl NodeConverter for Shallow {
    fn copy_children(&self) -> bool {
        false
    }
}

/// Records its calls in the `trace` variable.
struct Tracer(&'static str);

impl Tracer {
    fn record(cx: &mut Conversion<'_>, event: String) {
        let trace = cx.vars_mut().entry("trace".to_string()).or_default();
        if !trace.is_empty() {
            trace.push(' ');
        }
        trace.push_str(&event);
    }
}

impl NodeConverter for Tracer {
    fn start(&mut self, cx: &mut Conversion<'_>, node: NodeId) -> Result<NodeId, DomError> {
        Self::record(cx, format!("start:{}", self.0));
        Ok(node)
    }

    fn end(&mut self, cx: &mut Conversion<'_>, _node: NodeId) -> Result<(), DomError> {
        Self::record(cx, format!("end:{}", self.0));
        Ok(())
    }
}

/// Nests the converted children in an `inner` element.
struct Wrap;

impl NodeConverter for Wrap {
    fn start(&mut self, cx: &mut Conversion<'_>, node: NodeId) -> Result<NodeId, DomError> {
        let inner = cx.dom_mut().create_element("inner");
        cx.dom_mut().append_child(node, inner)
    }
}

/// Logs one coded message and one warning per node.
struct Loud;

impl NodeConverter for Loud {
    fn start(&mut self, cx: &mut Conversion<'_>, node: NodeId) -> Result<NodeId, DomError> {
        cx.msg(node, "loud", "E1", ["a"], None);
        cx.warn(node, "careful");
        Ok(node)
    }
}

// ========== Traversal ==========

#[test]
fn test_default_conversion_copies_the_tree() {
    let mut dom = Dom::new();
    let doc = sample(&mut dom);
    let mut conv = converter(ConverterBundle::new("xml", "html", "default"));
    let out = conv.convert(&mut dom, doc).unwrap();

    verify_structure(&dom, out.document).unwrap();
    assert_eq!(xml(&dom, out.document), "<a id=\"x\">hi<br/></a>");
    let data = dom.document(out.document).unwrap();
    assert_eq!(data.lang, "html");
    assert_eq!(data.uri.as_deref(), Some("in.xml"));
    assert_eq!(dom.kind(out.document), Some(NodeKind::Document));
    let (a, b) = (dom.first_child(doc).unwrap(), dom.first_child(out.document).unwrap());
    assert_ne!(a, b);
    assert!(dom.same_tree(a, &dom, b));
    assert!(dom.diagnostics(out.log).is_empty());
    assert_eq!(conv.from_language(), "xml");
    assert_eq!(conv.to_language(), "html");
}

#[test]
fn test_fragment_stays_a_fragment() {
    let mut dom = Dom::new();
    let frag = dom.create_fragment("xml", "default");
    let _ = dom.append_child(frag, "loose").unwrap();
    let mut conv = converter(ConverterBundle::new("xml", "xml", "default"));
    let out = conv.convert(&mut dom, frag).unwrap();
    assert_eq!(dom.kind(out.document), Some(NodeKind::DocumentFragment));
    assert_eq!(dom.text_content(out.document), "loose");
}

#[test]
fn test_only_documents_convert() {
    let mut dom = Dom::new();
    let a = dom.create_element("a");
    let mut conv = converter(ConverterBundle::new("xml", "xml", "default"));
    let err = conv.convert(&mut dom, a).unwrap_err();
    assert!(matches!(err, ConvertError::NotADocument { ref name } if name == "a"));
}

#[test]
fn test_skipped_nodes_leave_merged_text() {
    let mut dom = Dom::new();
    let doc = dom.create_document("xml", "default");
    let a = element(&mut dom, doc, "a", &[]);
    let _ = dom.append_child(a, "x").unwrap();
    let secret = element(&mut dom, a, "secret", &[]);
    let _ = dom.append_child(secret, "y").unwrap();
    let _ = dom.append_child(a, "z").unwrap();

    let mut bundle = ConverterBundle::new("xml", "xml", "default");
    let _ = bundle.handler("secret", || Box::new(SkipNode));
    let out = converter(bundle).convert(&mut dom, doc).unwrap();

    let copy = dom.first_child(out.document).unwrap();
    assert_eq!(xml(&dom, out.document), "<a>xz</a>");
    assert_eq!(dom.children(copy).len(), 1);
}

#[test]
fn test_children_can_be_left_out() {
    let mut dom = Dom::new();
    let doc = sample(&mut dom);
    let _ = element(&mut dom, doc, "after", &[]);
    let mut bundle = ConverterBundle::new("xml", "xml", "default");
    let _ = bundle.handler("a", || Box::new(Shallow));
    let out = converter(bundle).convert(&mut dom, doc).unwrap();
    assert_eq!(xml(&dom, out.document), "<a id=\"x\"></a><after></after>");
}

#[test]
fn test_start_can_replace_the_copy() {
    let mut dom = Dom::new();
    let doc = sample(&mut dom);
    let mut bundle = ConverterBundle::new("xml", "html", "default");
    let _ = bundle.handler("a", || Box::new(Rename("b")));
    let out = converter(bundle).convert(&mut dom, doc).unwrap();
    verify_structure(&dom, out.document).unwrap();
    assert_eq!(xml(&dom, out.document), "<b id=\"x\">hi<br/></b>");
}

// ========== Hooks and logging ==========

#[test]
fn test_hooks_and_variables() {
    let mut dom = Dom::new();
    let doc = sample(&mut dom);
    let mut bundle = ConverterBundle::new("xml", "xml", "default");
    let _ = bundle
        .init_converter(|_, vars| {
            let _ = vars.insert("inits".to_string(), "1".to_string());
        })
        .init_conversion(|cx| {
            let runs = cx.vars().get("runs").map_or(0, |r| r.parse::<u32>().unwrap_or(0));
            let _ = cx.vars_mut().insert("runs".to_string(), (runs + 1).to_string());
            Ok(())
        })
        .finish(|cx| {
            let document = cx.document();
            let end = cx.dom_mut().create_comment("end");
            let _ = cx.dom_mut().append_child(document, end)?;
            Ok(())
        });
    let mut conv = converter(bundle);
    let first = conv.convert(&mut dom, doc).unwrap();
    let _ = conv.convert(&mut dom, doc).unwrap();

    assert_eq!(conv.vars().get("inits").map(String::as_str), Some("1"));
    assert_eq!(conv.vars().get("runs").map(String::as_str), Some("2"));
    let last = dom.last_child(first.document).unwrap();
    assert_eq!(dom.kind(last), Some(NodeKind::Comment));
    assert_eq!(dom.text(last), Some("end"));
}

#[test]
fn test_messages_go_to_the_conversion_log() {
    let mut dom = Dom::new();
    let doc = sample(&mut dom);
    let mut bundle = ConverterBundle::new("xml", "xml", "default");
    let _ = bundle.handler("a", || Box::new(Loud));
    let out = converter(bundle).convert(&mut dom, doc).unwrap();

    let entries = dom.diagnostics(out.log);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].reporter, "loud");
    assert_eq!(entries[0].code.as_deref(), Some("E1"));
    assert_eq!(entries[0].args, vec!["a".to_string()]);
    assert_eq!(entries[1].message.as_deref(), Some("careful"));
    for entry in &entries {
        assert_eq!(entry.file.as_deref(), Some("in.xml"));
        let node = NodeId(entry.node.unwrap());
        assert_eq!(dom.name(node), "a");
        assert_eq!(dom.owner(node), Some(out.document));
    }
}

// ========== Directives ==========

fn specs() -> Vec<DirectiveSpec> {
    vec![
        DirectiveSpec::new("e2", "E"),
        DirectiveSpec::new("a1", "A").priority(1),
        DirectiveSpec::new("a2", "A").terminal(),
        DirectiveSpec::new("c1", "C").priority(1),
        DirectiveSpec::new("c3", "C").priority(3),
    ]
}

fn names(specs: &[DirectiveSpec], found: &[usize]) -> Vec<String> {
    found
        .iter()
        .map(|&i| format!("{}:{}", specs[i].name, specs[i].priority))
        .collect()
}

#[test]
fn test_directives_are_sorted_by_priority() {
    let mut dom = Dom::new();
    let doc = dom.create_document("xml", "default");
    let node = element(&mut dom, doc, "e2", &[("a1", ""), ("class", "c1 c3")]);
    let specs = specs();
    let found = collect_directives(&dom, node, &specs);
    assert_eq!(names(&specs, &found), ["c3:3", "a1:1", "c1:1", "e2:0"]);
}

#[test]
fn test_terminal_directive_stops_collection() {
    let mut dom = Dom::new();
    let doc = dom.create_document("xml", "default");
    let node = element(&mut dom, doc, "e2", &[("a2", ""), ("a1", ""), ("class", "c3")]);
    let specs = specs();
    let found = collect_directives(&dom, node, &specs);
    assert_eq!(names(&specs, &found), ["e2:0", "a2:0"]);
}

#[test]
fn test_directive_restriction_is_honored() {
    let mut dom = Dom::new();
    let doc = dom.create_document("xml", "default");
    // `a1` is an attribute directive only.
    let node = element(&mut dom, doc, "a1", &[("class", "e2")]);
    assert!(collect_directives(&dom, node, &specs()).is_empty());
}

#[test]
fn test_directive_handlers_run_after_the_node_handler() {
    let mut dom = Dom::new();
    let doc = dom.create_document("xml", "default");
    let p = element(&mut dom, doc, "p", &[("d1", ""), ("d2", "")]);
    let _ = dom.append_child(p, "t").unwrap();

    let mut bundle = ConverterBundle::new("xml", "xml", "default");
    let _ = bundle
        .handler("p", || Box::new(Tracer("p")))
        .directive(DirectiveSpec::new("d1", "A").priority(1), || Box::new(Tracer("d1")))
        .directive(DirectiveSpec::new("d2", "A").priority(2), || Box::new(Tracer("d2")));
    let mut conv = converter(bundle);
    let out = conv.convert(&mut dom, doc).unwrap();

    assert_eq!(
        conv.vars().get("trace").map(String::as_str),
        Some("start:p start:d2 start:d1 end:d1 end:d2 end:p")
    );
    let copy = dom.first_child(out.document).unwrap();
    assert_eq!(out.directives.get(copy), [("d2".to_string(), 2), ("d1".to_string(), 1)]);
    assert!(out.directives.has(copy, "d1"));
}

#[test]
fn test_directive_start_chooses_the_container() {
    let mut dom = Dom::new();
    let doc = dom.create_document("xml", "default");
    let p = element(&mut dom, doc, "p", &[("wrap", "")]);
    let _ = dom.append_child(p, "t").unwrap();

    let mut bundle = ConverterBundle::new("xml", "xml", "default");
    let _ = bundle.directive(DirectiveSpec::new("wrap", "A"), || Box::new(Wrap));
    let out = converter(bundle).convert(&mut dom, doc).unwrap();
    assert_eq!(xml(&dom, out.document), "<p wrap=\"\"><inner>t</inner></p>");
}

#[test]
fn test_requirement_lookup_along_ancestors() {
    let mut dom = Dom::new();
    let doc = dom.create_document("xml", "default");
    let lvl0 = element(&mut dom, doc, "lvl0", &[]);
    let lvl1 = element(&mut dom, lvl0, "lvl1", &[]);
    let lvl2 = element(&mut dom, lvl1, "lvl2", &[]);
    let node = element(&mut dom, lvl2, "lvl3", &[]);

    let mut table = Directives::new();
    let set = |names: &[&str]| -> Vec<(String, i32)> {
        names.iter().map(|n| ((*n).to_string(), 0)).collect()
    };
    table.set(lvl0, set(&["other", "l0-1", "l0-2"]));
    table.set(lvl1, set(&["l1-1", "l1-2"]));
    table.set(lvl2, set(&["other", "l2-1", "l2-2"]));
    table.set(node, set(&["l3-1", "other"]));

    let cases = [
        ("l3-1", Some(node)),
        ("^other", Some(node)),
        ("^^other", Some(lvl0)),
        ("gone|other", Some(node)),
        ("^1l2-2", Some(lvl2)),
        ("^3l0-2", Some(lvl0)),
        ("$^2l0-2", None),
        ("^2l1-2", Some(lvl1)),
        ("$gone|other", None),
        ("^(2)l1-1", Some(lvl1)),
    ];
    for (req, expected) in cases {
        let found = table.get_requirement(&dom, node, req).map(|(_, n)| n);
        assert_eq!(found, expected, "{req}");
    }
    assert_eq!(
        table.get_requirement(&dom, node, "gone|^l1-1"),
        Some(("l1-1".to_string(), lvl1))
    );
}

// ========== Expansion ==========

/// Upper-cases its input, or fails on `fail`.
struct Shout;

impl Expander for Shout {
    fn expand(&mut self, code: &str, _uri: Option<&str>) -> Result<String, ExpandError> {
        if code == "fail" {
            return Err(ExpandError("boom".to_string()));
        }
        Ok(code.to_uppercase())
    }
}

fn text_parser() -> Parser {
    let mut bundle = ParserBundle::new("text", "default");
    bundle.rule(DEFAULT_KEY, "", &[]);
    Parser::new(Arc::new(bundle)).unwrap()
}

fn with_pi(dom: &mut Dom, code: &str) -> NodeId {
    let doc = dom.create_document("xml", "default");
    let a = element(dom, doc, "a", &[]);
    let _ = dom.append_child(a, "<").unwrap();
    let pi = dom.create_pi("run", code);
    let _ = dom.append_child(a, pi).unwrap();
    let _ = dom.append_child(a, ">").unwrap();
    doc
}

fn expanding() -> ConverterBundle {
    let mut bundle = ConverterBundle::new("xml", "xml", "default");
    let _ = bundle.handler("run", || Box::new(ExpandHandler));
    bundle
}

#[test]
fn test_expansion_replaces_the_instruction() {
    let mut dom = Dom::new();
    let doc = with_pi(&mut dom, "hello");
    let mut conv = converter(expanding()).with_expander(Box::new(Shout), text_parser());
    let out = conv.convert(&mut dom, doc).unwrap();

    verify_structure(&dom, out.document).unwrap();
    let a = dom.first_child(out.document).unwrap();
    assert_eq!(dom.children(a).len(), 1);
    assert_eq!(dom.text_content(a), "<HELLO>");
    assert!(dom.diagnostics(out.log).is_empty());
}

#[test]
fn test_failed_expansion_leaves_a_marker() {
    let mut dom = Dom::new();
    let doc = with_pi(&mut dom, "fail");
    let mut conv = converter(expanding()).with_expander(Box::new(Shout), text_parser());
    let out = conv.convert(&mut dom, doc).unwrap();

    let a = dom.first_child(out.document).unwrap();
    let marker = dom.child(a, 1).unwrap();
    assert_eq!(dom.name(marker), EXPANSION_ERROR);
    assert_eq!(dom.text_content(marker), "boom");
    let entries = dom.diagnostics(out.log);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].code.as_deref(), Some(EXPANSION_FAILED));
    assert_eq!(entries[0].render(&core_messages()), "expansion failed: boom");
}

#[test]
fn test_expansion_is_off_without_an_expander() {
    let mut dom = Dom::new();
    let doc = with_pi(&mut dom, "hello");
    let out = converter(expanding()).convert(&mut dom, doc).unwrap();
    let a = dom.first_child(out.document).unwrap();
    let pi = dom.child(a, 1).unwrap();
    assert_eq!(dom.kind(pi), Some(NodeKind::ProcessingInstruction));
    assert_eq!(dom.text(pi), Some("hello"));
}
