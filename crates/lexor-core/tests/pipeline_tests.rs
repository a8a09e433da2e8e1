//! The parse, convert and write entry points end to end.

use lexor_common::StyleKind;
use lexor_core::{Error, ResolveError, StyleOptions, StyleRegistry, convert, parse, write, write_to_string};
use lexor_dom::{Dom, NodeKind};

const PAGE: &str = "<page>\n  <!-- draft -->\n  <title>One &amp; two</title>\n</page>";

#[test]
fn test_parse_convert_write() {
    let registry = StyleRegistry::with_builtins();
    let mut dom = Dom::new();
    let options = StyleOptions::new();
    let parsed = parse(&registry, &mut dom, PAGE, Some("page.xml"), "xml", "_", &options).unwrap();
    assert_eq!(dom.kind(parsed.document), Some(NodeKind::Document));
    assert!(dom.diagnostics(parsed.log).is_empty());

    let converted = convert(&registry, &mut dom, parsed.document, "xml", "xml", "clean").unwrap();
    let text = write_to_string(&registry, &dom, converted.document, "xml", "", &options).unwrap();
    assert_eq!(text, "<page><title>One &amp; two</title></page>");
}

#[test]
fn test_write_into_a_destination() {
    let registry = StyleRegistry::with_builtins();
    let mut dom = Dom::new();
    let options = StyleOptions::new();
    let parsed = parse(&registry, &mut dom, PAGE, None, "xml", "default", &options).unwrap();
    assert_eq!(dom.kind(parsed.document), Some(NodeKind::DocumentFragment));

    let mut out = Vec::new();
    write(&registry, &dom, parsed.document, "xml", "default", &options, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), PAGE);
}

#[test]
fn test_options_reach_the_writer() {
    let registry = StyleRegistry::with_builtins();
    let mut dom = Dom::new();
    let mut options = StyleOptions::new();
    let parsed = parse(&registry, &mut dom, "<p>one two three</p>", None, "xml", "_", &options).unwrap();
    let _ = options.set("width", "8");
    let text = write_to_string(&registry, &dom, parsed.document, "text", "_", &options).unwrap();
    assert_eq!(text, "one two\nthree");
}

#[test]
fn test_missing_styles_fail_before_any_work() {
    let registry = StyleRegistry::with_builtins();
    let mut dom = Dom::new();
    let options = StyleOptions::new();

    let err = parse(&registry, &mut dom, "x", None, "md", "_", &options).unwrap_err();
    assert!(err.is_resolve());
    assert!(matches!(
        err,
        Error::Resolve(ResolveError::Missing { kind: StyleKind::Parser, .. })
    ));
    assert_eq!(err.to_string(), "no parser style 'default' installed for language 'md'");

    let parsed = parse(&registry, &mut dom, "x", None, "xml", "_", &options).unwrap();
    let err = write_to_string(&registry, &dom, parsed.document, "xml", "pretty", &options).unwrap_err();
    assert!(err.is_resolve());
    let err = convert(&registry, &mut dom, parsed.document, "xml", "html", "_").unwrap_err();
    assert!(matches!(err, Error::Resolve(ResolveError::MissingConverter { .. })));
}

#[test]
fn test_converting_a_non_document_fails() {
    let registry = StyleRegistry::with_builtins();
    let mut dom = Dom::new();
    let element = dom.create_element("a");
    let err = convert(&registry, &mut dom, element, "xml", "xml", "_").unwrap_err();
    assert!(!err.is_resolve());
    assert!(matches!(err, Error::Convert(_)));
}
