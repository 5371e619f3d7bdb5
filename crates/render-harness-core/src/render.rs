//! Render identifiers and render-completed notifications.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier for a single rendered fragment.
///
/// Returned by the renderer when a fragment is rendered and used to
/// retrieve its markup and subscribe to its render notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderId(Uuid);

impl RenderId {
    /// Create a new random render ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for RenderId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for RenderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RenderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single render-completed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderEvent {
    /// Render this notification belongs to
    pub render_id: RenderId,
    /// Render sequence number, starting at 1 for the first re-render
    pub sequence: u64,
}

impl RenderEvent {
    /// Create a new render event.
    pub fn new(render_id: RenderId, sequence: u64) -> Self {
        Self {
            render_id,
            sequence,
        }
    }
}
