//! Differences between an expected and an actual markup tree.

use serde::{Deserialize, Serialize};

use crate::node::NodeTree;

/// Describes a change at a single node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeChange {
    /// Node present in the actual tree only
    Added,
    /// Node present in the expected tree only
    Removed,
    /// Node name changed (`#text` for text nodes)
    TagChanged {
        /// Expected node name
        expected: String,
        /// Actual node name
        actual: String,
    },
    /// Attribute value changed, or attribute present on one side only
    AttributeChanged {
        /// Attribute name
        name: String,
        /// Expected value, if the attribute exists in the expected tree
        expected: Option<String>,
        /// Actual value, if the attribute exists in the actual tree
        actual: Option<String>,
    },
    /// Text content changed
    TextChanged {
        /// Expected text
        expected: String,
        /// Actual text
        actual: String,
    },
}

impl std::fmt::Display for NodeChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeChange::Added => write!(f, "unexpected node in actual output"),
            NodeChange::Removed => write!(f, "expected node missing from actual output"),
            NodeChange::TagChanged { expected, actual } => {
                write!(f, "tag changed from `{expected}` to `{actual}`")
            }
            NodeChange::AttributeChanged {
                name,
                expected,
                actual,
            } => write!(
                f,
                "attribute `{name}` changed (expected {}, actual {})",
                fmt_attr_value(expected),
                fmt_attr_value(actual)
            ),
            NodeChange::TextChanged { expected, actual } => {
                write!(f, "text changed (expected \"{expected}\", actual \"{actual}\")")
            }
        }
    }
}

fn fmt_attr_value(value: &Option<String>) -> String {
    match value {
        Some(v) => format!("\"{v}\""),
        None => "(absent)".to_string(),
    }
}

/// A single difference between two markup trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDiff {
    /// Readable path to the node, e.g. `div > ul > li[2]`
    pub path: String,
    /// The change at that node
    pub change: NodeChange,
}

impl NodeDiff {
    /// Create a new diff entry.
    pub fn new(path: impl Into<String>, change: NodeChange) -> Self {
        Self {
            path: path.into(),
            change,
        }
    }
}

impl std::fmt::Display for NodeDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.change)
    }
}

/// Payload of a failed snapshot comparison.
///
/// Carries everything a test author needs to diagnose the failure: the
/// diff list, both parsed trees and the optional test description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMismatch {
    /// Optional human-readable test description
    pub description: Option<String>,
    /// Detected differences, never empty
    pub diffs: Vec<NodeDiff>,
    /// Expected markup tree
    pub expected: NodeTree,
    /// Actual markup tree
    pub actual: NodeTree,
}

impl SnapshotMismatch {
    /// One-line summary of the mismatch.
    pub fn summary(&self) -> String {
        let count = self.diffs.len();
        let plural = if count == 1 { "" } else { "s" };
        match &self.description {
            Some(description) => {
                format!("Snapshot mismatch ({description}): {count} difference{plural}")
            }
            None => format!("Snapshot mismatch: {count} difference{plural}"),
        }
    }
}

impl std::fmt::Display for SnapshotMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary())?;
        for diff in &self.diffs {
            write!(f, "\n  - {diff}")?;
        }
        Ok(())
    }
}
