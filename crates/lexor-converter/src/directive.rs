//! Directives and requirement lookup.
//!
//! A directive is a converter extension attached to elements by element
//! name (`E`), attribute name (`A`) or class (`C`). Each converted element
//! records the directives it carries, and handlers can ask whether an
//! element or one of its ancestors carries a directive with a requirement
//! string:
//!
//! | form        | meaning                                          |
//! |-------------|--------------------------------------------------|
//! | `name`      | the element itself                               |
//! | `^name`     | the element or its nearest ancestor              |
//! | `^^name`    | the outermost of the element and its ancestors   |
//! | `^N name`   | the ancestor exactly `N` levels up (`^(N)name`)  |
//! | `$...`      | required: stop looking if this one is missing    |
//!
//! Alternatives are separated by `|` and tried in order.

use std::collections::HashMap;
use std::fmt;

use lexor_dom::{Dom, NodeId};

// ========== Directive specs ==========

/// Where a directive may appear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Restrict {
    /// As the element name.
    pub element: bool,
    /// As an attribute name.
    pub attribute: bool,
    /// As a class.
    pub class: bool,
}

impl Restrict {
    /// Parse letters from `EAC`; other characters are ignored.
    #[must_use]
    pub fn parse(letters: &str) -> Self {
        Self {
            element: letters.contains('E'),
            attribute: letters.contains('A'),
            class: letters.contains('C'),
        }
    }
}

impl fmt::Display for Restrict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (on, letter) in [(self.element, 'E'), (self.attribute, 'A'), (self.class, 'C')] {
            if on {
                write!(f, "{letter}")?;
            }
        }
        Ok(())
    }
}

/// A directive a converter style understands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectiveSpec {
    /// Directive name.
    pub name: String,
    /// Where it may appear.
    pub restrict: Restrict,
    /// Higher runs first.
    pub priority: i32,
    /// No further directives are collected after this one.
    pub terminal: bool,
}

impl DirectiveSpec {
    /// Directive `name` allowed where `restrict` says, with priority 0.
    #[must_use]
    pub fn new(name: impl Into<String>, restrict: &str) -> Self {
        Self {
            name: name.into(),
            restrict: Restrict::parse(restrict),
            priority: 0,
            terminal: false,
        }
    }

    /// Set the priority.
    #[must_use]
    pub const fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Mark as terminal.
    #[must_use]
    pub const fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }
}

/// Directives carried by `node`, as indices into `specs`.
///
/// Element matches come first, then attributes in attribute order, then
/// classes in class order. Collection stops after the first terminal
/// directive; the result is stably sorted by descending priority.
#[must_use]
pub fn collect_directives(dom: &Dom, node: NodeId, specs: &[DirectiveSpec]) -> Vec<usize> {
    let mut found = Vec::new();
    let find = |name: &str, allowed: fn(&Restrict) -> bool| {
        specs
            .iter()
            .position(|s| s.name == name && allowed(&s.restrict))
    };
    let mut candidates = Vec::new();
    candidates.push(find(dom.name(node), |r| r.element));
    if let Some(attrs) = dom.attrs(node) {
        candidates.extend(attrs.keys().map(|key| find(key, |r| r.attribute)));
    }
    if let Some(n) = dom.get(node) {
        candidates.extend(n.classes().map(|class| find(class, |r| r.class)));
    }
    for index in candidates.into_iter().flatten() {
        if found.contains(&index) {
            continue;
        }
        found.push(index);
        if specs[index].terminal {
            break;
        }
    }
    found.sort_by_key(|&i| std::cmp::Reverse(specs[i].priority));
    found
}

// ========== Per-node directive table ==========

/// Directives recorded per converted node, with their priorities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    table: HashMap<NodeId, Vec<(String, i32)>>,
}

impl Directives {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the directives of `node`, replacing earlier ones.
    pub fn set(&mut self, node: NodeId, directives: Vec<(String, i32)>) {
        let _ = self.table.insert(node, directives);
    }

    /// Directives of `node`.
    #[must_use]
    pub fn get(&self, node: NodeId) -> &[(String, i32)] {
        self.table.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if `node` carries `name`.
    #[must_use]
    pub fn has(&self, node: NodeId, name: &str) -> bool {
        self.get(node).iter().any(|(n, _)| n == name)
    }

    /// Resolve a requirement string for `node`.
    ///
    /// Returns the directive name and the node carrying it.
    #[must_use]
    pub fn get_requirement(&self, dom: &Dom, node: NodeId, req: &str) -> Option<(String, NodeId)> {
        for requirement in parse_requirement(req) {
            let holder = match requirement.scope {
                Scope::Here => Some(node).filter(|&n| self.has(n, &requirement.name)),
                Scope::Nearest => std::iter::once(node)
                    .chain(dom.ancestors(node))
                    .find(|&n| self.has(n, &requirement.name)),
                Scope::Outermost => std::iter::once(node)
                    .chain(dom.ancestors(node))
                    .filter(|&n| self.has(n, &requirement.name))
                    .last(),
                Scope::Up(levels) => dom
                    .ancestors(node)
                    .nth(usize::try_from(levels).unwrap_or(usize::MAX).saturating_sub(1))
                    .filter(|&n| self.has(n, &requirement.name)),
            };
            match holder {
                Some(found) => return Some((requirement.name, found)),
                None if requirement.required => return None,
                None => {}
            }
        }
        None
    }
}

// ========== Requirement strings ==========

/// Which nodes a requirement looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The node itself.
    Here,
    /// The node, then each ancestor.
    Nearest,
    /// The outermost match among the node and its ancestors.
    Outermost,
    /// The ancestor this many levels up.
    Up(u32),
}

/// One alternative of a requirement string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Requirement {
    /// Set by a leading `$`.
    pub required: bool,
    /// Where to look.
    pub scope: Scope,
    /// Directive name.
    pub name: String,
}

impl Requirement {
    /// Parse a single alternative. Text that does not fit the grammar is
    /// taken as a plain name.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let (required, rest) = match text.strip_prefix('$') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (scope, name) = split_scope(rest);
        Self {
            required,
            scope,
            name: name.to_string(),
        }
    }
}

fn split_scope(text: &str) -> (Scope, &str) {
    let Some(rest) = text.strip_prefix('^') else {
        return (Scope::Here, text);
    };
    if let Some(name) = rest.strip_prefix('^') {
        return (Scope::Outermost, name);
    }
    if let Some(inner) = rest.strip_prefix('(') {
        let digits = inner.len() - inner.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits > 0 && inner[digits..].starts_with(')') {
            return (levels(&inner[..digits]), &inner[digits + 1..]);
        }
        return (Scope::Nearest, rest);
    }
    let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits > 0 {
        return (levels(&rest[..digits]), &rest[digits..]);
    }
    (Scope::Nearest, rest)
}

fn levels(digits: &str) -> Scope {
    match digits.parse::<u32>() {
        Ok(0) => Scope::Here,
        Ok(n) => Scope::Up(n),
        Err(_) => Scope::Up(u32::MAX),
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.required {
            f.write_str("$")?;
        }
        match self.scope {
            Scope::Here => {}
            Scope::Nearest => f.write_str("^")?,
            Scope::Outermost => f.write_str("^^")?,
            Scope::Up(n) => write!(f, "^({n})")?,
        }
        f.write_str(&self.name)
    }
}

/// Split a requirement string into its alternatives.
#[must_use]
pub fn parse_requirement(text: &str) -> Vec<Requirement> {
    text.split('|').map(Requirement::parse).collect()
}

/// Inverse of [`parse_requirement`], using the `^(N)` form for levels.
#[must_use]
pub fn encode_requirement(requirements: &[Requirement]) -> String {
    requirements
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|")
}
