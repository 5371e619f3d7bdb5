//! # render-harness-core
//!
//! Core types for the render harness.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other render-harness crates. It provides:
//!
//! - Fragment types describing UI structure declaratively
//! - Node tree types for parsed markup
//! - Diff types describing differences between two markup trees
//! - Render identifiers and render-completed notifications
//! - Configuration types
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - the harness crate depends on this
//! one, but this crate has no dependencies on other render-harness crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Re-export all modules
pub mod config;
pub mod diff;
pub mod error;
pub mod fragment;
pub mod node;
pub mod render;

// Re-export commonly used types
pub use config::{CompareSettings, HarnessConfig, WaitSettings};
pub use diff::{NodeChange, NodeDiff, SnapshotMismatch};
pub use error::{BoxError, Error, Result};
pub use fragment::{ElementFragment, Fragment};
pub use node::{Attribute, ElementNode, Node, NodeTree};
pub use render::{RenderEvent, RenderId};
