//! Error types for the render harness.

use thiserror::Error;

use crate::diff::SnapshotMismatch;
use crate::RenderId;

/// Boxed error type used to carry caller-supplied predicate and
/// assertion failures through the wait machinery.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for render harness operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Required snapshot test parameter was not supplied
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input or parameters (generic)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Render identifier not known to the renderer
    #[error("Render not found: {0}")]
    RenderNotFound(RenderId),

    /// Renderer-reported failure
    #[error("Render error: {0}")]
    Render(String),

    /// Render event source dropped while a wait was still pending
    #[error("Render event source closed before the condition was met")]
    RenderSourceClosed,

    /// Timeout waiting for a condition across re-renders
    #[error("Timeout waiting for condition after {waited_ms}ms")]
    WaitTimeout {
        /// Time waited in milliseconds
        waited_ms: u64,
        /// Latest assertion failure observed before the deadline, if any
        #[source]
        cause: Option<BoxError>,
    },

    /// Predicate raised during evaluation
    #[error("Condition evaluation failed: {0}")]
    WaitEvaluation(#[source] BoxError),

    /// Markup could not be parsed into a node tree
    #[error("Parse error: {0}")]
    Parse(String),

    /// Rendered markup differs from the expected markup
    #[error("{0}")]
    SnapshotMismatch(Box<SnapshotMismatch>),

    /// Multiple distinct failures reported together
    #[error("{} failures occurred during the test", .0.len())]
    Aggregate(Vec<Error>),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Collapse a set of failures into a single error.
    ///
    /// Exactly one underlying error is returned as-is so the caller sees
    /// a clean cause chain; two or more are wrapped in [`Error::Aggregate`]
    /// and reported together rather than arbitrarily discarded.
    pub fn aggregate(mut errors: Vec<Error>) -> Error {
        match errors.len() {
            0 => Error::Other("empty error aggregate".to_string()),
            1 => errors.remove(0),
            _ => Error::Aggregate(errors),
        }
    }

    /// Whether this error is a wait timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::WaitTimeout { .. })
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
