//! Node accessor, sibling navigation and child-list tests.

use lexor_dom::check::verify_structure;
use lexor_dom::{Batch, Dom, DomError, NodeId, NodeKind, Slice};

// ========== Helpers ==========

/// Element `name` with children `child0..child{n-1}`.
fn numbered(dom: &mut Dom, name: &str, n: usize) -> NodeId {
    let root = dom.create_element(name);
    for i in 0..n {
        let child = dom.create_element(format!("child{i}"));
        let _ = dom.append_child(root, child).unwrap();
    }
    root
}

fn names(dom: &Dom, parent: NodeId) -> Vec<String> {
    dom.children(parent)
        .iter()
        .map(|&c| dom.name(c).to_string())
        .collect()
}

fn child_names(prefix: &str, order: &[usize]) -> Vec<String> {
    order.iter().map(|i| format!("{prefix}{i}")).collect()
}

/// void, text, text, elem, python PI, text, last
fn mixed(dom: &mut Dom) -> NodeId {
    let root = dom.create_element("root");
    let void = dom.create_void("void");
    let _ = dom.append_child(root, void).unwrap();
    let _ = dom.append_child(root, "text").unwrap();
    let _ = dom.append_child(root, "text").unwrap();
    let elem = dom.create_element("elem");
    let _ = dom.append_child(root, elem).unwrap();
    let pi = dom.create_pi("python", "");
    let _ = dom.append_child(root, pi).unwrap();
    let _ = dom.append_child(root, "text").unwrap();
    let last = dom.create_element("last");
    let _ = dom.append_child(root, last).unwrap();
    root
}

/// Every node at level `l` gets `l + 1` children named `lvl{l+1}`.
fn grow(dom: &mut Dom, node: NodeId, depth: usize) {
    if depth == 0 {
        return;
    }
    let level = dom.level(node);
    for _ in 0..=level {
        let child = dom.create_element(format!("lvl{}", level + 1));
        let _ = dom.append_child(node, child).unwrap();
        grow(dom, child, depth - 1);
    }
}

// ========== Basic accessors ==========

#[test]
fn test_owner_document() {
    let mut dom = Dom::new();
    let doc = dom.create_document("xml", "default");
    let node = dom.create_element("tagname");
    let _ = dom.append_child(doc, node).unwrap();
    assert_eq!(dom.owner(node), Some(doc));
    assert_eq!(dom.owner(doc), Some(doc));
}

#[test]
fn test_node_index() {
    let mut dom = Dom::new();
    let parent = numbered(&mut dom, "parent", 3);
    for (i, &child) in dom.children(parent).iter().enumerate() {
        assert_eq!(dom.index(child), Some(i));
        assert_eq!(dom.parent(child), Some(parent));
        assert_eq!(dom.child(parent, i), Some(child));
    }
}

#[test]
fn test_node_level() {
    let mut dom = Dom::new();
    let doc = dom.create_document("xml", "default");
    let lvl0 = dom.create_element("lvl0");
    let _ = dom.append_child(doc, lvl0).unwrap();
    grow(&mut dom, lvl0, 3);
    for id in dom.descendants(doc).skip(1) {
        assert_eq!(dom.name(id), format!("lvl{}", dom.level(id)));
    }
    assert_eq!(dom.level(doc), -1);
    verify_structure(&dom, doc).unwrap();
}

#[test]
fn test_element_index() {
    let mut dom = Dom::new();
    let root = mixed(&mut dom);
    let got: Vec<_> = dom
        .children(root)
        .iter()
        .map(|&c| dom.element_index(c).unwrap())
        .collect();
    assert_eq!(got, vec![0, 1, 1, 1, 2, 2, 2]);
    verify_structure(&dom, root).unwrap();
}

#[test]
fn test_first_child() {
    let mut dom = Dom::new();
    let root = dom.create_element("root");
    let child = dom.create_element("empty");
    let _ = dom.append_child(root, child).unwrap();
    assert_eq!(dom.first_child(root), Some(child));
    assert_eq!(dom.first_child(child), None);
    assert_eq!(dom.child(child, 0), None);
}

#[test]
fn test_siblings() {
    let mut dom = Dom::new();
    let root = numbered(&mut dom, "root", 3);
    let c = dom.children(root).to_vec();
    assert_eq!(dom.prev_sibling(c[2]), Some(c[1]));
    assert_eq!(dom.prev_sibling(c[1]), Some(c[0]));
    assert_eq!(dom.prev_sibling(c[0]), None);
    assert_eq!(dom.next_sibling(c[0]), Some(c[1]));
    assert_eq!(dom.next_sibling(c[1]), Some(c[2]));
    assert_eq!(dom.next_sibling(c[2]), None);
}

#[test]
fn test_previous_and_next_element() {
    let mut dom = Dom::new();
    let root = mixed(&mut dom);
    let c = dom.children(root).to_vec();
    let prev: Vec<_> = c.iter().map(|&n| dom.prev_element(n)).collect();
    assert_eq!(
        prev,
        vec![None, Some(c[0]), Some(c[0]), Some(c[0]), Some(c[3]), Some(c[3]), Some(c[3])]
    );
    let next: Vec<_> = c.iter().map(|&n| dom.next_element(n)).collect();
    assert_eq!(
        next,
        vec![Some(c[3]), Some(c[3]), Some(c[3]), Some(c[6]), Some(c[6]), Some(c[6]), None]
    );
}

#[test]
fn test_child_elements() {
    let mut dom = Dom::new();
    let root = mixed(&mut dom);
    let got: Vec<_> = dom.child_elements(root).map(|c| dom.name(c)).collect();
    assert_eq!(got, vec!["void", "elem", "last"]);
}

#[test]
fn test_remove_children() {
    let mut dom = Dom::new();
    let root = mixed(&mut dom);
    let removed = dom.remove_children(root);
    assert_eq!(removed.len(), 7);
    assert!(dom.children(root).is_empty());
    for node in removed {
        assert_eq!(dom.parent(node), None);
        assert_eq!(dom.index(node), None);
        assert_eq!(dom.prev_sibling(node), None);
        assert_eq!(dom.next_sibling(node), None);
        verify_structure(&dom, node).unwrap();
    }
    verify_structure(&dom, root).unwrap();
}

#[test]
fn test_repr() {
    let mut dom = Dom::new();
    let doc = dom.create_document("xml", "default");
    let attrs = [("a", "b")].into_iter().collect();
    let lvl0 = dom.create_element_with("lvl0", attrs);
    let _ = dom.append_child(doc, lvl0).unwrap();
    let _ = dom.append_child(lvl0, "hi").unwrap();
    assert_eq!(
        dom.repr(doc),
        "#document[0]: (-:xml:default)\nlvl0[1 a=\"b\"]:\n    #text[2]: \"hi\"\n"
    );
}

#[test]
fn test_nodes_by_name() {
    let mut dom = Dom::new();
    let root = dom.create_element("root");
    grow(&mut dom, root, 5);
    assert_eq!(dom.nodes_by_name(root, "lvl4").len(), 4 * 3 * 2);
}

#[test]
fn test_kind_predicates() {
    use strum::IntoEnumIterator;
    let containers: Vec<_> = NodeKind::iter().filter(|k| k.accepts_children()).collect();
    assert_eq!(
        containers,
        vec![NodeKind::Element, NodeKind::Document, NodeKind::DocumentFragment]
    );
    assert!(NodeKind::RawText.is_character_data());
    assert!(NodeKind::RawText.is_element());
    assert!(!NodeKind::ProcessingInstruction.is_element());
}

// ========== Insertion ==========

#[test]
fn test_insert_before() {
    let mut dom = Dom::new();
    let root1 = numbered(&mut dom, "root", 10);
    let root2 = numbered(&mut dom, "root", 10);
    let fragment = dom.create_fragment("xml", "default");
    assert_eq!(
        dom.insert_before(root1, 5, fragment),
        Err(DomError::FragmentNotAllowed)
    );
    for _ in 0..5 {
        let first = dom.first_child(root2).unwrap();
        let _ = dom.insert_before(root1, 5, first).unwrap();
    }
    assert_eq!(
        names(&dom, root1),
        child_names("child", &[0, 1, 2, 3, 4, 4, 3, 2, 1, 0, 5, 6, 7, 8, 9])
    );
    assert_eq!(names(&dom, root2), child_names("child", &[5, 6, 7, 8, 9]));
    verify_structure(&dom, root1).unwrap();
    verify_structure(&dom, root2).unwrap();
}

#[test]
fn test_extend_before_list() {
    let mut dom = Dom::new();
    let root1 = numbered(&mut dom, "root", 10);
    let root2 = numbered(&mut dom, "root", 10);
    let reversed: Vec<NodeId> = dom.children(root2)[..5].iter().rev().copied().collect();
    dom.extend_before(root1, 5, reversed).unwrap();
    assert_eq!(
        names(&dom, root1),
        child_names("child", &[0, 1, 2, 3, 4, 4, 3, 2, 1, 0, 5, 6, 7, 8, 9])
    );
    assert_eq!(names(&dom, root2), child_names("child", &[5, 6, 7, 8, 9]));
    verify_structure(&dom, root1).unwrap();
    verify_structure(&dom, root2).unwrap();
}

#[test]
fn test_extend_before_drains_element_and_fragment() {
    let mut dom = Dom::new();
    let root = numbered(&mut dom, "root", 10);
    let host = dom.create_element("host");
    let node = dom.create_element("child10");
    let _ = dom.append_child(host, node).unwrap();
    dom.extend_before(host, 0, root).unwrap();
    assert!(dom.children(root).is_empty());
    assert_eq!(names(&dom, host), child_names("child", &(0..11).collect::<Vec<_>>()));

    let fragment = dom.create_fragment("xml", "default");
    for i in 0..3 {
        let node = dom.create_element(format!("f{i}"));
        let _ = dom.append_child(fragment, node).unwrap();
    }
    let host = dom.create_fragment("xml", "default");
    let node = dom.create_element("f3");
    let _ = dom.append_child(host, node).unwrap();
    dom.extend_before(host, 0, fragment).unwrap();
    assert!(dom.children(fragment).is_empty());
    assert_eq!(names(&dom, host), child_names("f", &[0, 1, 2, 3]));
    verify_structure(&dom, host).unwrap();
}

#[test]
fn test_extend_children() {
    let mut dom = Dom::new();
    let root1 = numbered(&mut dom, "root", 10);
    let root2 = numbered(&mut dom, "root", 10);
    let reversed: Vec<NodeId> = dom.children(root2)[..5].iter().rev().copied().collect();
    dom.extend_children(root1, reversed).unwrap();
    assert_eq!(
        names(&dom, root1),
        child_names("child", &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 4, 3, 2, 1, 0])
    );
    assert_eq!(names(&dom, root2), child_names("child", &[5, 6, 7, 8, 9]));
}

#[test]
fn test_append_after_and_prepend_before() {
    let mut dom = Dom::new();
    let root = numbered(&mut dom, "root", 10);
    for (i, child) in dom.children(root).to_vec().into_iter().enumerate() {
        let new = dom.create_element(format!("child{}", i * 100));
        let _ = dom.append_after(child, new).unwrap();
    }
    for i in 0..10 {
        assert_eq!(dom.name(dom.child(root, 2 * i).unwrap()), format!("child{i}"));
        assert_eq!(dom.name(dom.child(root, 2 * i + 1).unwrap()), format!("child{}", i * 100));
    }

    let root = numbered(&mut dom, "root", 10);
    for (i, child) in dom.children(root).to_vec().into_iter().enumerate() {
        let new = dom.create_element(format!("child{}", i * 100));
        let _ = dom.prepend_before(child, new).unwrap();
    }
    for i in 0..10 {
        assert_eq!(dom.name(dom.child(root, 2 * i).unwrap()), format!("child{}", i * 100));
        assert_eq!(dom.name(dom.child(root, 2 * i + 1).unwrap()), format!("child{i}"));
    }
    verify_structure(&dom, root).unwrap();
}

#[test]
fn test_append_nodes_after() {
    let mut dom = Dom::new();
    let root = dom.create_element("root");
    let elems: Vec<NodeId> = (0..10).map(|i| dom.create_element(format!("child{i}"))).collect();
    assert_eq!(
        dom.append_nodes_after(root, elems.clone()),
        Err(DomError::Detached {
            name: "root".to_string()
        })
    );
    let doc = dom.create_document("xml", "default");
    let _ = dom.append_child(doc, root).unwrap();
    dom.append_nodes_after(root, elems).unwrap();
    assert_eq!(dom.children(doc).len(), 11);
    assert_eq!(dom.name(dom.child(doc, 0).unwrap()), "root");
    for i in 1..11 {
        assert_eq!(dom.name(dom.child(doc, i).unwrap()), format!("child{}", i - 1));
    }
    verify_structure(&dom, doc).unwrap();
}

#[test]
fn test_prepend_nodes_before() {
    let mut dom = Dom::new();
    let root = dom.create_element("root");
    let elems: Vec<NodeId> = (0..10).map(|i| dom.create_element(format!("child{i}"))).collect();
    assert!(matches!(
        dom.prepend_nodes_before(root, Batch::Nodes(elems.clone())),
        Err(DomError::Detached { .. })
    ));
    let doc = dom.create_document("xml", "default");
    let _ = dom.append_child(doc, root).unwrap();
    dom.prepend_nodes_before(root, elems).unwrap();
    assert_eq!(dom.children(doc).len(), 11);
    assert_eq!(dom.index(root), Some(10));
    for i in 0..10 {
        assert_eq!(dom.name(dom.child(doc, i).unwrap()), format!("child{i}"));
    }
    verify_structure(&dom, doc).unwrap();
}

// ========== Deletion and replacement ==========

#[test]
fn test_delete_by_index() {
    let mut dom = Dom::new();
    let root = numbered(&mut dom, "root", 10);
    let even: Vec<NodeId> = dom.children(root).iter().step_by(2).copied().collect();
    for child in even {
        let index = dom.index(child).unwrap();
        let _ = dom.delete_children(root, index).unwrap();
    }
    assert_eq!(names(&dom, root), child_names("child", &[1, 3, 5, 7, 9]));
}

#[test]
fn test_delete_slices() {
    let mut dom = Dom::new();
    let root = numbered(&mut dom, "root", 10);
    let removed = dom.delete_children(root, Slice::every(2)).unwrap();
    assert_eq!(removed.len(), 5);
    assert_eq!(names(&dom, root), child_names("child", &[1, 3, 5, 7, 9]));

    let root = numbered(&mut dom, "root", 10);
    let _ = dom
        .delete_children(root, Slice::new(Some(1), Some(9), 4))
        .unwrap();
    assert_eq!(
        names(&dom, root),
        child_names("child", &[0, 2, 3, 4, 6, 7, 8, 9])
    );
    verify_structure(&dom, root).unwrap();

    assert_eq!(
        dom.delete_children(root, 20_usize),
        Err(DomError::IndexOutOfRange { index: 20, len: 8 })
    );
}

#[test]
fn test_delete_with_huge_step() {
    let mut dom = Dom::new();
    let root = numbered(&mut dom, "root", 5);
    let removed = dom
        .delete_children(root, Slice::new(Some(1), None, isize::MAX))
        .unwrap();
    assert_eq!(removed.len(), 1);
    assert_eq!(names(&dom, root), child_names("child", &[0, 2, 3, 4]));
    verify_structure(&dom, root).unwrap();
}

#[test]
fn test_replace_single() {
    let mut dom = Dom::new();
    let root = numbered(&mut dom, "root", 10);
    for i in 0..5_usize {
        let void = dom.create_void(format!("void{i}"));
        let _ = dom.replace_children(root, 2 * i, void).unwrap();
    }
    assert_eq!(
        names(&dom, root),
        vec![
            "void0", "child1", "void1", "child3", "void2", "child5", "void3", "child7", "void4",
            "child9"
        ]
    );
    verify_structure(&dom, root).unwrap();
}

#[test]
fn test_replace_slices() {
    let mut dom = Dom::new();
    let root = numbered(&mut dom, "root", 10);
    let fragment = dom.create_fragment("xml", "default");
    for i in 0..5 {
        let node = dom.create_void(format!("void{i}"));
        let _ = dom.append_child(fragment, node).unwrap();
    }
    let replaced = dom.replace_children(root, Slice::every(2), fragment).unwrap();
    assert_eq!(replaced.len(), 5);
    assert!(dom.children(fragment).is_empty());
    assert_eq!(
        names(&dom, root),
        vec![
            "void0", "child1", "void1", "child3", "void2", "child5", "void3", "child7", "void4",
            "child9"
        ]
    );

    let root = numbered(&mut dom, "root", 10);
    for i in 0..5 {
        let node = dom.create_void(format!("void{i}"));
        let _ = dom.append_child(fragment, node).unwrap();
    }
    let _ = dom
        .replace_children(root, Slice::new(Some(9), Some(0), -2), fragment)
        .unwrap();
    assert_eq!(
        names(&dom, root),
        vec![
            "child0", "void4", "child2", "void3", "child4", "void2", "child6", "void1", "child8",
            "void0"
        ]
    );
    verify_structure(&dom, root).unwrap();

    assert_eq!(
        dom.replace_children(root, 0_usize, root),
        Err(DomError::SelfContainment)
    );
    for text in ["1", "2", "3"] {
        let _ = dom.append_child(fragment, text).unwrap();
    }
    assert_eq!(
        dom.replace_children(root, 0..6_usize, fragment),
        Err(DomError::LengthMismatch {
            expected: 6,
            found: 3
        })
    );
    assert_eq!(dom.children(fragment).len(), 3);
}

#[test]
fn test_replace_rejects_existing_child() {
    let mut dom = Dom::new();
    let root = numbered(&mut dom, "root", 3);
    let second = dom.child(root, 1).unwrap();
    assert_eq!(
        dom.replace_children(root, 0_usize, second),
        Err(DomError::AlreadyChild { index: 1 })
    );
}

#[test]
fn test_move_deep_node_between_trees() {
    let mut dom = Dom::new();
    let root = dom.create_element("root");
    grow(&mut dom, root, 5);
    let host = dom.create_element("host");
    let lvl1 = dom.child(root, 0).unwrap();
    let lvl2 = dom.child(lvl1, 1).unwrap();
    let lvl3 = dom.child(lvl2, 2).unwrap();
    let _ = dom.append_child(host, lvl3).unwrap();
    assert_eq!(dom.children(lvl2).len(), 2);
    assert_eq!(dom.level(lvl3), 1);
    verify_structure(&dom, root).unwrap();
    verify_structure(&dom, host).unwrap();
}

// ========== Normalize and clone ==========

#[test]
fn test_normalize() {
    let mut dom = Dom::new();
    let root = dom.create_element("numbers");
    let _ = dom.append_child(root, "1").unwrap();
    let _ = dom.append_child(root, "2").unwrap();
    let container = dom.create_element("container");
    let _ = dom.append_child(root, container).unwrap();
    let _ = dom.append_child(container, "3").unwrap();
    let _ = dom.append_child(container, "4").unwrap();
    let _ = dom.append_child(root, "5").unwrap();
    let _ = dom.append_child(root, "6").unwrap();
    dom.normalize(root);
    let c = dom.children(root).to_vec();
    assert_eq!(c.len(), 3);
    assert_eq!(dom.text(c[0]), Some("12"));
    assert_eq!(dom.text(dom.child(c[1], 0).unwrap()), Some("34"));
    assert_eq!(dom.text(c[2]), Some("56"));
    verify_structure(&dom, root).unwrap();
}

#[test]
fn test_clone_deep_matches_source() {
    let mut dom = Dom::new();
    let root = dom.create_element("root");
    grow(&mut dom, root, 5);
    let copy = dom.clone_node(root, true);
    assert!(dom.same_tree(root, &dom, copy));
    assert_eq!(dom.parent(copy), None);
    verify_structure(&dom, copy).unwrap();

    let shallow = dom.clone_node(root, false);
    assert_eq!(dom.name(shallow), "root");
    assert!(dom.children(shallow).is_empty());
}
