//! Renderer seam and render-notification subscriptions.

use async_trait::async_trait;
use tokio::sync::broadcast;

use render_harness_core::{Fragment, RenderEvent, RenderId, Result};

/// The external rendering engine, as the harness consumes it.
///
/// Rendering is asynchronous; markup extraction and notification
/// subscription operate on the opaque [`RenderId`] the renderer returned.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render a fragment, returning an opaque render identifier.
    async fn render_fragment(&self, fragment: &Fragment) -> Result<RenderId>;

    /// Serialized markup of the current state of a render.
    fn markup(&self, id: RenderId) -> Result<String>;

    /// Subscribe to render-completed notifications for a render.
    fn subscribe(&self, id: RenderId) -> Result<RenderEvents>;
}

/// A subscription to render-completed notifications.
///
/// Each subscription belongs to exactly one wait helper; dropping it
/// detaches from the notification stream, so the listener is released
/// on every exit path including cancellation.
#[derive(Debug)]
pub struct RenderEvents {
    rx: broadcast::Receiver<RenderEvent>,
}

impl RenderEvents {
    /// Wrap a broadcast receiver.
    pub fn new(rx: broadcast::Receiver<RenderEvent>) -> Self {
        Self { rx }
    }

    /// Receive the next render notification.
    ///
    /// A lagged receiver skips ahead to the oldest buffered event: a
    /// missed notification still means a render occurred, which is all a
    /// waiter needs to know. Returns `None` once the sender side is gone.
    pub async fn next(&mut self) -> Option<RenderEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
