//! Markup parser and tree comparer stand-ins.
//!
//! `SimpleMarkupParser` handles the well-formed markup the stub renderer
//! and hand-written tests produce; `TreeComparer` is a recursive semantic
//! diff over the parsed trees. Production embeddings supply their own
//! implementations behind the same traits.

use std::sync::OnceLock;

use regex::Regex;

use render_harness_core::{
    Attribute, CompareSettings, ElementNode, Error, Node, NodeChange, NodeDiff, NodeTree, Result,
};

use crate::markup::{MarkupComparer, MarkupParser};

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

static ATTR_PATTERN: OnceLock<Regex> = OnceLock::new();

fn attr_pattern() -> &'static Regex {
    ATTR_PATTERN.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#)
            .unwrap()
    })
}

/// Parser for the well-formed markup used in harness tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMarkupParser;

impl SimpleMarkupParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self
    }
}

impl MarkupParser for SimpleMarkupParser {
    fn parse(&self, markup: &str) -> Result<NodeTree> {
        let mut roots: Vec<Node> = Vec::new();
        let mut stack: Vec<ElementNode> = Vec::new();
        let mut rest = markup;

        loop {
            let Some(open) = rest.find('<') else {
                push_text(rest, &mut stack, &mut roots);
                break;
            };
            push_text(&rest[..open], &mut stack, &mut roots);
            rest = &rest[open..];

            if rest.starts_with("<!--") {
                let end = rest
                    .find("-->")
                    .ok_or_else(|| Error::Parse("unterminated comment".to_string()))?;
                rest = &rest[end + 3..];
                continue;
            }

            let end = rest
                .find('>')
                .ok_or_else(|| Error::Parse("unterminated tag".to_string()))?;
            let tag_body = rest[1..end].trim();
            rest = &rest[end + 1..];

            // Doctype and other declarations carry no structure.
            if tag_body.starts_with('!') {
                continue;
            }

            if let Some(name) = tag_body.strip_prefix('/') {
                let name = name.trim().to_ascii_lowercase();
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::Parse(format!("unexpected closing tag </{name}>")))?;
                if element.tag != name {
                    return Err(Error::Parse(format!(
                        "mismatched closing tag: expected </{}>, found </{name}>",
                        element.tag
                    )));
                }
                attach(Node::Element(element), &mut stack, &mut roots);
                continue;
            }

            let (tag_body, self_closing) = match tag_body.strip_suffix('/') {
                Some(body) => (body.trim_end(), true),
                None => (tag_body, false),
            };
            if tag_body.is_empty() {
                return Err(Error::Parse("empty tag name".to_string()));
            }

            let name_end = tag_body
                .find(char::is_whitespace)
                .unwrap_or(tag_body.len());
            let tag = tag_body[..name_end].to_ascii_lowercase();
            let mut element = ElementNode::new(tag.clone());
            for capture in attr_pattern().captures_iter(&tag_body[name_end..]) {
                let name = capture[1].to_ascii_lowercase();
                let value = capture
                    .get(2)
                    .or_else(|| capture.get(3))
                    .or_else(|| capture.get(4))
                    .map(|m| unescape(m.as_str()))
                    .unwrap_or_default();
                element.attributes.push(Attribute::new(name, value));
            }

            if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
                attach(Node::Element(element), &mut stack, &mut roots);
            } else {
                stack.push(element);
            }
        }

        if let Some(unclosed) = stack.last() {
            return Err(Error::Parse(format!("unclosed tag <{}>", unclosed.tag)));
        }
        Ok(NodeTree::new(roots))
    }
}

fn attach(node: Node, stack: &mut Vec<ElementNode>, roots: &mut Vec<Node>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

fn push_text(text: &str, stack: &mut Vec<ElementNode>, roots: &mut Vec<Node>) {
    if text.trim().is_empty() {
        return;
    }
    attach(Node::Text(unescape(text)), stack, roots);
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];
        if let Some(tail) = rest.strip_prefix("&amp;") {
            out.push('&');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("&lt;") {
            out.push('<');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("&gt;") {
            out.push('>');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("&quot;") {
            out.push('"');
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("&#39;") {
            out.push('\'');
            rest = tail;
        } else {
            out.push('&');
            rest = &rest[1..];
        }
    }
    out.push_str(rest);
    out
}

/// Recursive semantic diff between two parsed markup trees.
#[derive(Debug, Clone, Copy)]
pub struct TreeComparer {
    ignore_whitespace: bool,
    ignore_attribute_order: bool,
}

impl Default for TreeComparer {
    fn default() -> Self {
        Self {
            ignore_whitespace: true,
            ignore_attribute_order: true,
        }
    }
}

impl TreeComparer {
    /// Create a comparer with the default semantic settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a comparer from comparison settings.
    pub fn from_settings(settings: &CompareSettings) -> Self {
        Self {
            ignore_whitespace: settings.ignore_whitespace,
            ignore_attribute_order: settings.ignore_attribute_order,
        }
    }

    /// Compare text with whitespace collapsed.
    pub fn with_ignore_whitespace(mut self, enabled: bool) -> Self {
        self.ignore_whitespace = enabled;
        self
    }

    /// Ignore attribute declaration order.
    pub fn with_ignore_attribute_order(mut self, enabled: bool) -> Self {
        self.ignore_attribute_order = enabled;
        self
    }

    fn compare_children(
        &self,
        path: &str,
        expected: &[Node],
        actual: &[Node],
        diffs: &mut Vec<NodeDiff>,
    ) {
        let siblings = expected.len().max(actual.len());
        for index in 0..siblings {
            match (expected.get(index), actual.get(index)) {
                (Some(expected_node), Some(actual_node)) => {
                    let node_path = child_path(path, expected_node.name(), index, siblings);
                    self.compare_nodes(&node_path, expected_node, actual_node, diffs);
                }
                (Some(expected_node), None) => diffs.push(NodeDiff::new(
                    child_path(path, expected_node.name(), index, siblings),
                    NodeChange::Removed,
                )),
                (None, Some(actual_node)) => diffs.push(NodeDiff::new(
                    child_path(path, actual_node.name(), index, siblings),
                    NodeChange::Added,
                )),
                (None, None) => unreachable!("index bounded by sibling count"),
            }
        }
    }

    fn compare_nodes(&self, path: &str, expected: &Node, actual: &Node, diffs: &mut Vec<NodeDiff>) {
        match (expected, actual) {
            (Node::Text(expected_text), Node::Text(actual_text)) => {
                if !self.text_eq(expected_text, actual_text) {
                    diffs.push(NodeDiff::new(
                        path,
                        NodeChange::TextChanged {
                            expected: expected_text.clone(),
                            actual: actual_text.clone(),
                        },
                    ));
                }
            }
            (Node::Element(expected_element), Node::Element(actual_element)) => {
                if expected_element.tag != actual_element.tag {
                    // Different element entirely; descending would only
                    // produce noise.
                    diffs.push(NodeDiff::new(
                        path,
                        NodeChange::TagChanged {
                            expected: expected_element.tag.clone(),
                            actual: actual_element.tag.clone(),
                        },
                    ));
                    return;
                }
                self.compare_attributes(path, expected_element, actual_element, diffs);
                self.compare_children(
                    path,
                    &expected_element.children,
                    &actual_element.children,
                    diffs,
                );
            }
            _ => diffs.push(NodeDiff::new(
                path,
                NodeChange::TagChanged {
                    expected: expected.name().to_string(),
                    actual: actual.name().to_string(),
                },
            )),
        }
    }

    fn compare_attributes(
        &self,
        path: &str,
        expected: &ElementNode,
        actual: &ElementNode,
        diffs: &mut Vec<NodeDiff>,
    ) {
        if self.ignore_attribute_order {
            for attribute in &expected.attributes {
                match actual.attribute(&attribute.name) {
                    Some(value) if value == attribute.value => {}
                    actual_value => diffs.push(NodeDiff::new(
                        path,
                        NodeChange::AttributeChanged {
                            name: attribute.name.clone(),
                            expected: Some(attribute.value.clone()),
                            actual: actual_value.map(str::to_string),
                        },
                    )),
                }
            }
            for attribute in &actual.attributes {
                if expected.attribute(&attribute.name).is_none() {
                    diffs.push(NodeDiff::new(
                        path,
                        NodeChange::AttributeChanged {
                            name: attribute.name.clone(),
                            expected: None,
                            actual: Some(attribute.value.clone()),
                        },
                    ));
                }
            }
            return;
        }

        let count = expected.attributes.len().max(actual.attributes.len());
        for index in 0..count {
            match (expected.attributes.get(index), actual.attributes.get(index)) {
                (Some(exp), Some(act)) if exp == act => {}
                (exp, act) => {
                    if let Some(exp) = exp {
                        diffs.push(NodeDiff::new(
                            path,
                            NodeChange::AttributeChanged {
                                name: exp.name.clone(),
                                expected: Some(exp.value.clone()),
                                actual: act
                                    .filter(|a| a.name == exp.name)
                                    .map(|a| a.value.clone()),
                            },
                        ));
                    }
                    if let Some(act) = act {
                        if exp.map(|e| e.name != act.name).unwrap_or(true) {
                            diffs.push(NodeDiff::new(
                                path,
                                NodeChange::AttributeChanged {
                                    name: act.name.clone(),
                                    expected: None,
                                    actual: Some(act.value.clone()),
                                },
                            ));
                        }
                    }
                }
            }
        }
    }

    fn text_eq(&self, expected: &str, actual: &str) -> bool {
        if self.ignore_whitespace {
            normalize_whitespace(expected) == normalize_whitespace(actual)
        } else {
            expected == actual
        }
    }
}

impl MarkupComparer for TreeComparer {
    fn compare(&self, expected: &NodeTree, actual: &NodeTree) -> Vec<NodeDiff> {
        let mut diffs = Vec::new();
        self.compare_children("", &expected.roots, &actual.roots, &mut diffs);
        diffs
    }
}

fn child_path(base: &str, name: &str, index: usize, siblings: usize) -> String {
    let label = if siblings > 1 {
        format!("{name}[{index}]")
    } else {
        name.to_string()
    };
    if base.is_empty() {
        label
    } else {
        format!("{base} > {label}")
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
