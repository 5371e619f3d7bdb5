//! In-memory renderer for exercising the harness in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use render_harness_core::{Error, Fragment, RenderEvent, RenderId, Result};

use crate::renderer::{RenderEvents, Renderer};

#[derive(Debug)]
struct RenderEntry {
    markup: String,
    sequence: u64,
    events: broadcast::Sender<RenderEvent>,
}

/// A [`Renderer`] stand-in that "renders" a fragment by serializing it
/// to markup and lets tests drive re-renders explicitly.
///
/// Cheap to clone; clones share the same render table, so a test can
/// hand one clone to a background task that triggers re-renders.
#[derive(Clone)]
pub struct StubRenderer {
    renders: Arc<RwLock<HashMap<RenderId, RenderEntry>>>,
    render_calls: Arc<AtomicUsize>,
    event_buffer: usize,
}

impl StubRenderer {
    /// Create a stub renderer with the default event buffer.
    pub fn new() -> Self {
        Self {
            renders: Arc::new(RwLock::new(HashMap::new())),
            render_calls: Arc::new(AtomicUsize::new(0)),
            event_buffer: 16,
        }
    }

    /// Set the notification buffer capacity used for future renders.
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }

    /// Number of `render_fragment` calls made so far.
    pub fn render_count(&self) -> usize {
        self.render_calls.load(Ordering::SeqCst)
    }

    /// Replace the markup of a render and emit a render notification.
    pub fn rerender(&self, id: RenderId, markup: impl Into<String>) -> Result<()> {
        self.update(id, Some(markup.into()))
    }

    /// Emit a render notification without changing the markup.
    pub fn rerender_unchanged(&self, id: RenderId) -> Result<()> {
        self.update(id, None)
    }

    fn update(&self, id: RenderId, markup: Option<String>) -> Result<()> {
        let mut renders = self.renders.write().unwrap();
        let entry = renders.get_mut(&id).ok_or(Error::RenderNotFound(id))?;
        if let Some(markup) = markup {
            entry.markup = markup;
        }
        entry.sequence += 1;
        // A send error only means nobody is listening right now.
        let _ = entry.events.send(RenderEvent::new(id, entry.sequence));
        Ok(())
    }
}

impl Default for StubRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Renderer for StubRenderer {
    async fn render_fragment(&self, fragment: &Fragment) -> Result<RenderId> {
        let id = RenderId::new();
        let (events, _) = broadcast::channel(self.event_buffer);
        let markup = fragment.to_markup();
        debug!(%id, markup_len = markup.len(), "stub render");

        self.renders.write().unwrap().insert(
            id,
            RenderEntry {
                markup,
                sequence: 0,
                events,
            },
        );
        self.render_calls.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    fn markup(&self, id: RenderId) -> Result<String> {
        self.renders
            .read()
            .unwrap()
            .get(&id)
            .map(|entry| entry.markup.clone())
            .ok_or(Error::RenderNotFound(id))
    }

    fn subscribe(&self, id: RenderId) -> Result<RenderEvents> {
        self.renders
            .read()
            .unwrap()
            .get(&id)
            .map(|entry| RenderEvents::new(entry.events.subscribe()))
            .ok_or(Error::RenderNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_render_produces_markup() {
        let renderer = StubRenderer::new();
        let fragment: Fragment = Fragment::element("p").text("hi").into();
        let id = renderer.render_fragment(&fragment).await.unwrap();

        assert_eq!(renderer.markup(id).unwrap(), "<p>hi</p>");
        assert_eq!(renderer.render_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_render_id() {
        let renderer = StubRenderer::new();
        let err = renderer.markup(RenderId::new()).unwrap_err();
        assert!(matches!(err, Error::RenderNotFound(_)));

        let err = renderer.subscribe(RenderId::new()).unwrap_err();
        assert!(matches!(err, Error::RenderNotFound(_)));

        let err = renderer.rerender_unchanged(RenderId::new()).unwrap_err();
        assert!(matches!(err, Error::RenderNotFound(_)));
    }

    #[tokio::test]
    async fn test_rerender_updates_markup_and_notifies() {
        let renderer = StubRenderer::new();
        let fragment: Fragment = Fragment::element("p").text("before").into();
        let id = renderer.render_fragment(&fragment).await.unwrap();

        let mut events = renderer.subscribe(id).unwrap();
        renderer.rerender(id, "<p>after</p>").unwrap();

        let event = events.next().await.unwrap();
        assert_eq!(event.render_id, id);
        assert_eq!(event.sequence, 1);
        assert_eq!(renderer.markup(id).unwrap(), "<p>after</p>");
    }

    #[tokio::test]
    async fn test_rerender_without_subscribers_is_fine() {
        let renderer = StubRenderer::new();
        let fragment: Fragment = Fragment::element("p").text("x").into();
        let id = renderer.render_fragment(&fragment).await.unwrap();

        renderer.rerender_unchanged(id).unwrap();
        renderer.rerender_unchanged(id).unwrap();

        // A later subscriber only sees renders from subscription on.
        let mut events = renderer.subscribe(id).unwrap();
        renderer.rerender_unchanged(id).unwrap();
        assert_eq!(events.next().await.unwrap().sequence, 3);
    }
}
