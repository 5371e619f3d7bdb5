//! # render-harness
//!
//! Wait helpers and snapshot comparison for component rendering tests.
//!
//! This crate provides:
//! - Wait helpers that re-evaluate a predicate or assertion after every
//!   render of a fragment, with async and blocking entry points
//! - Snapshot test orchestration (render two fragments, diff their markup)
//! - The external-collaborator seams: renderer, markup parser, markup
//!   comparer and the singleton service registry
//! - Test-support implementations of those seams in [`testing`]
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on render-harness-core
//! for types and supplies all harness behavior. The rendering engine and
//! the markup diff algorithm themselves stay behind the [`Renderer`],
//! [`MarkupParser`] and [`MarkupComparer`] traits.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod markup;
pub mod renderer;
pub mod services;
pub mod snapshot;
pub mod testing;
pub mod wait;

// Re-export commonly used types
pub use markup::{MarkupComparer, MarkupParser};
pub use renderer::{RenderEvents, Renderer};
pub use services::{BridgeHandle, NoopRuntimeBridge, RuntimeBridge, Services};
pub use snapshot::{SetupFuture, SnapshotTest};
pub use wait::{
    wait_for_assertion, wait_for_assertion_blocking, wait_for_markup, wait_for_markup_blocking,
    wait_for_state, wait_for_state_blocking, WaitForHelper, DEFAULT_WAIT_TIMEOUT,
};
