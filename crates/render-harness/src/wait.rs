//! Wait helpers that poll a condition across successive renders.
//!
//! A wait subscribes to a fragment's render notifications, evaluates the
//! caller's condition immediately and again after every render, and
//! resolves exactly once: success, timeout, or evaluation failure. The
//! async core is shared; blocking entry points are thin adapters over it.

use std::future::Future;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::{debug, trace};

use render_harness_core::{BoxError, Error, RenderId, Result};

use crate::renderer::{RenderEvents, Renderer};

/// Default time a wait helper keeps re-evaluating before timing out.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Outcome of a single condition evaluation.
enum Evaluation {
    /// Condition holds, resolve successfully
    Met,
    /// Condition does not hold yet; assertions carry their failure
    NotYet(Option<BoxError>),
    /// Evaluation itself failed, resolve immediately
    Failed(BoxError),
}

/// Polls a predicate or assertion across successive renders.
///
/// The helper owns its render-notification subscription and is consumed
/// by the wait, so it resolves at most once and the subscription is
/// released on every exit path - success, timeout, evaluation failure,
/// or cancellation of the wait future itself.
pub struct WaitForHelper {
    events: RenderEvents,
    timeout: Duration,
}

impl WaitForHelper {
    /// Create a helper over an existing subscription with the default
    /// one second timeout.
    pub fn new(events: RenderEvents) -> Self {
        Self {
            events,
            timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wait until the predicate returns `Ok(true)`.
    ///
    /// The predicate is evaluated once immediately and again after every
    /// render notification. A predicate error is not a "not yet" signal:
    /// the wait fails immediately with [`Error::WaitEvaluation`] wrapping
    /// it. Never succeeding within the timeout fails with
    /// [`Error::WaitTimeout`].
    pub async fn wait_for_state<F>(self, mut predicate: F) -> Result<()>
    where
        F: FnMut() -> std::result::Result<bool, BoxError>,
    {
        self.wait(move || match predicate() {
            Ok(true) => Evaluation::Met,
            Ok(false) => Evaluation::NotYet(None),
            Err(error) => Evaluation::Failed(error),
        })
        .await
    }

    /// Wait until the assertion returns `Ok(())`.
    ///
    /// Assertion failures are the expected "not true yet" signal and are
    /// retried on every render; if the deadline passes, the latest
    /// failure is attached to [`Error::WaitTimeout`] as its cause so the
    /// test author sees what was still wrong.
    pub async fn wait_for_assertion<F>(self, mut assertion: F) -> Result<()>
    where
        F: FnMut() -> std::result::Result<(), BoxError>,
    {
        self.wait(move || match assertion() {
            Ok(()) => Evaluation::Met,
            Err(error) => Evaluation::NotYet(Some(error)),
        })
        .await
    }

    async fn wait(mut self, mut evaluate: impl FnMut() -> Evaluation) -> Result<()> {
        let started = Instant::now();
        let mut last_failure: Option<BoxError> = None;

        // The subscription already exists, so a render landing between
        // this first evaluation and the first poll of the stream is
        // queued rather than lost.
        match evaluate() {
            Evaluation::Met => return Ok(()),
            Evaluation::NotYet(failure) => {
                if failure.is_some() {
                    last_failure = failure;
                }
            }
            Evaluation::Failed(error) => return Err(Error::WaitEvaluation(error)),
        }

        let deadline = tokio::time::sleep(self.timeout);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => {
                    let waited_ms = started.elapsed().as_millis() as u64;
                    debug!(waited_ms, "wait timed out");
                    return Err(Error::WaitTimeout {
                        waited_ms,
                        cause: last_failure,
                    });
                }
                event = self.events.next() => match event {
                    None => return Err(Error::RenderSourceClosed),
                    Some(event) => {
                        trace!(sequence = event.sequence, "re-evaluating after render");
                        match evaluate() {
                            Evaluation::Met => return Ok(()),
                            Evaluation::NotYet(failure) => {
                                if failure.is_some() {
                                    last_failure = failure;
                                }
                            }
                            Evaluation::Failed(error) => {
                                return Err(Error::WaitEvaluation(error));
                            }
                        }
                    }
                },
            }
        }
    }
}

/// Wait until `predicate` returns `Ok(true)`, re-evaluating after every
/// render of the given render. `timeout` defaults to one second.
pub async fn wait_for_state<F>(
    renderer: &dyn Renderer,
    id: RenderId,
    predicate: F,
    timeout: Option<Duration>,
) -> Result<()>
where
    F: FnMut() -> std::result::Result<bool, BoxError>,
{
    helper(renderer, id, timeout)?.wait_for_state(predicate).await
}

/// Blocking form of [`wait_for_state`] for ordinary test-method bodies.
pub fn wait_for_state_blocking<F>(
    renderer: &dyn Renderer,
    id: RenderId,
    predicate: F,
    timeout: Option<Duration>,
) -> Result<()>
where
    F: FnMut() -> std::result::Result<bool, BoxError>,
{
    block_on(wait_for_state(renderer, id, predicate, timeout))
}

/// Wait until `assertion` returns `Ok(())`, re-evaluating after every
/// render of the given render. `timeout` defaults to one second.
pub async fn wait_for_assertion<F>(
    renderer: &dyn Renderer,
    id: RenderId,
    assertion: F,
    timeout: Option<Duration>,
) -> Result<()>
where
    F: FnMut() -> std::result::Result<(), BoxError>,
{
    helper(renderer, id, timeout)?
        .wait_for_assertion(assertion)
        .await
}

/// Blocking form of [`wait_for_assertion`].
pub fn wait_for_assertion_blocking<F>(
    renderer: &dyn Renderer,
    id: RenderId,
    assertion: F,
    timeout: Option<Duration>,
) -> Result<()>
where
    F: FnMut() -> std::result::Result<(), BoxError>,
{
    block_on(wait_for_assertion(renderer, id, assertion, timeout))
}

/// Wait until the render's current markup matches a regex pattern.
pub async fn wait_for_markup(
    renderer: &dyn Renderer,
    id: RenderId,
    pattern: &str,
    timeout: Option<Duration>,
) -> Result<()> {
    let regex =
        Regex::new(pattern).map_err(|e| Error::InvalidInput(format!("Invalid regex: {e}")))?;

    wait_for_state(
        renderer,
        id,
        move || Ok(regex.is_match(&renderer.markup(id)?)),
        timeout,
    )
    .await
}

/// Blocking form of [`wait_for_markup`].
pub fn wait_for_markup_blocking(
    renderer: &dyn Renderer,
    id: RenderId,
    pattern: &str,
    timeout: Option<Duration>,
) -> Result<()> {
    block_on(wait_for_markup(renderer, id, pattern, timeout))
}

fn helper(renderer: &dyn Renderer, id: RenderId, timeout: Option<Duration>) -> Result<WaitForHelper> {
    let events = renderer.subscribe(id)?;
    Ok(WaitForHelper::new(events).with_timeout(timeout.unwrap_or(DEFAULT_WAIT_TIMEOUT)))
}

/// Drive a wait future to completion from a synchronous context.
///
/// Inside an async context this fails with a configuration error rather
/// than deadlocking or panicking; the suspending form is the correct
/// entry point there.
pub(crate) fn block_on<T>(future: impl Future<Output = Result<T>>) -> Result<T> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(Error::Config(
            "blocking wait called from within an async context; use the suspending form instead"
                .to_string(),
        ));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(future)
}
