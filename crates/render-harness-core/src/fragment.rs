//! Declarative fragments describing UI structure to be rendered.

use serde::{Deserialize, Serialize};

use crate::node::Attribute;

/// A declarative, side-effect-free description of UI structure.
///
/// Fragments are immutable once built; a renderer turns them into
/// markup and an opaque render identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fragment {
    /// An element with a tag, attributes and children
    Element(ElementFragment),
    /// A text node
    Text(String),
    /// Pre-rendered markup passed through to the renderer verbatim
    Raw(String),
}

impl Fragment {
    /// Start building an element fragment.
    pub fn element(tag: impl Into<String>) -> ElementFragment {
        ElementFragment::new(tag)
    }

    /// Create a text fragment.
    pub fn text(text: impl Into<String>) -> Fragment {
        Fragment::Text(text.into())
    }

    /// Create a raw markup fragment.
    pub fn raw(markup: impl Into<String>) -> Fragment {
        Fragment::Raw(markup.into())
    }

    /// Serialize this fragment to markup text.
    ///
    /// Text and attribute values are escaped; raw fragments pass through
    /// unchanged. Elements without children serialize self-closing.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        match self {
            Fragment::Text(text) => out.push_str(&escape_text(text)),
            Fragment::Raw(markup) => out.push_str(markup),
            Fragment::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for attribute in &element.attributes {
                    out.push(' ');
                    out.push_str(&attribute.name);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(&attribute.value));
                    out.push('"');
                }
                if element.children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for child in &element.children {
                    child.write_markup(out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

impl From<ElementFragment> for Fragment {
    fn from(element: ElementFragment) -> Self {
        Fragment::Element(element)
    }
}

/// Builder for an element fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementFragment {
    /// Tag name
    pub tag: String,
    /// Attributes in declaration order
    pub attributes: Vec<Attribute>,
    /// Child fragments in declaration order
    pub children: Vec<Fragment>,
}

impl ElementFragment {
    /// Create an element fragment with no attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute.
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Add a child fragment.
    pub fn child(mut self, child: impl Into<Fragment>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Add a text child.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Fragment::text(text))
    }
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
