//! Comparable node trees produced by markup parsing.

use serde::{Deserialize, Serialize};

/// A single `name="value"` attribute on an element node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Attribute value
    pub value: String,
}

impl Attribute {
    /// Create a new attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An element node within a parsed markup tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementNode {
    /// Tag name (lowercase)
    pub tag: String,
    /// Attributes in document order
    pub attributes: Vec<Attribute>,
    /// Child nodes in document order
    pub children: Vec<Node>,
}

impl ElementNode {
    /// Create an element node with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Look up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

/// A node within a parsed markup tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// An element with a tag, attributes and children
    Element(ElementNode),
    /// A text node
    Text(String),
}

impl Node {
    /// Node name: the tag for elements, `#text` for text nodes.
    pub fn name(&self) -> &str {
        match self {
            Node::Element(element) => &element.tag,
            Node::Text(_) => "#text",
        }
    }

    /// Whether this node is a text node.
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// A parsed markup tree, the unit the comparer operates on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeTree {
    /// Root nodes in document order
    pub roots: Vec<Node>,
}

impl NodeTree {
    /// Create a tree from its root nodes.
    pub fn new(roots: Vec<Node>) -> Self {
        Self { roots }
    }

    /// Whether the tree contains no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Concatenated text content of the whole tree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            root.collect_text(&mut out);
        }
        out
    }

    /// All element nodes with the given tag, in document order.
    pub fn find_by_tag(&self, tag: &str) -> Vec<&ElementNode> {
        let mut found = Vec::new();
        for root in &self.roots {
            Self::walk_tag(root, tag, &mut found);
        }
        found
    }

    fn walk_tag<'a>(node: &'a Node, tag: &str, found: &mut Vec<&'a ElementNode>) {
        if let Node::Element(element) = node {
            if element.tag == tag {
                found.push(element);
            }
            for child in &element.children {
                Self::walk_tag(child, tag, found);
            }
        }
    }
}
