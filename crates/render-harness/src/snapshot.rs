//! Snapshot comparison orchestration.
//!
//! A snapshot test renders a test-input fragment and an expected-output
//! fragment through the external renderer, parses the markup of both into
//! node trees, diffs them, and fails with a descriptive error when
//! differences exist.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::debug;

use render_harness_core::{Error, Fragment, Result, SnapshotMismatch};

use crate::markup::{MarkupComparer, MarkupParser};
use crate::renderer::Renderer;
use crate::services::{BridgeHandle, NoopRuntimeBridge, Services};
use crate::wait::block_on;

/// Boxed future returned by asynchronous setup callbacks.
pub type SetupFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

type SetupFn = Box<dyn FnOnce(Services) -> Result<()> + Send>;
type SetupAsyncFn = Box<dyn FnOnce(Services) -> SetupFuture + Send>;

/// A declared snapshot test: two fragments plus optional setup.
///
/// Both the test input and the expected output are mandatory; a test
/// missing either fails with a configuration error naming the absent
/// parameter before anything is rendered.
pub struct SnapshotTest {
    renderer: Arc<dyn Renderer>,
    parser: Arc<dyn MarkupParser>,
    comparer: Arc<dyn MarkupComparer>,
    services: Services,
    description: Option<String>,
    setup: Option<SetupFn>,
    setup_async: Option<SetupAsyncFn>,
    test_input: Option<Fragment>,
    expected_output: Option<Fragment>,
}

impl SnapshotTest {
    /// Declare a snapshot test over the given collaborators.
    pub fn new(
        renderer: Arc<dyn Renderer>,
        parser: Arc<dyn MarkupParser>,
        comparer: Arc<dyn MarkupComparer>,
    ) -> Self {
        Self {
            renderer,
            parser,
            comparer,
            services: Services::new(),
            description: None,
            setup: None,
            setup_async: None,
            test_input: None,
            expected_output: None,
        }
    }

    /// Attach a human-readable description, included in mismatch reports.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Run a synchronous setup callback before rendering.
    ///
    /// Setup may mutate shared test state that both fragments read.
    pub fn with_setup<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(Services) -> Result<()> + Send + 'static,
    {
        self.setup = Some(Box::new(setup));
        self
    }

    /// Run an asynchronous setup callback before rendering, after the
    /// synchronous one.
    pub fn with_setup_async<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(Services) -> SetupFuture + Send + 'static,
    {
        self.setup_async = Some(Box::new(setup));
        self
    }

    /// The fragment under test.
    pub fn with_test_input(mut self, fragment: impl Into<Fragment>) -> Self {
        self.test_input = Some(fragment.into());
        self
    }

    /// The fragment describing the expected output.
    pub fn with_expected_output(mut self, fragment: impl Into<Fragment>) -> Self {
        self.expected_output = Some(fragment.into());
        self
    }

    /// Handle to the test's service registry, for registering singletons
    /// ahead of the run.
    pub fn services(&self) -> Services {
        self.services.clone()
    }

    /// Execute the snapshot test.
    ///
    /// Passes silently when the two rendered markups are semantically
    /// equivalent; fails with [`Error::SnapshotMismatch`] carrying the
    /// diff list and both parsed trees otherwise.
    pub async fn run(mut self) -> Result<()> {
        let test_input = self
            .test_input
            .take()
            .ok_or(Error::MissingParameter("TestInput"))?;
        let expected_output = self
            .expected_output
            .take()
            .ok_or(Error::MissingParameter("ExpectedOutput"))?;

        // Component code that expects a host bridge must not fail merely
        // because no real bridge exists in the test context. A bridge the
        // caller registered takes precedence.
        if !self.services.contains::<BridgeHandle>() {
            self.services
                .register_singleton::<BridgeHandle>(Arc::new(NoopRuntimeBridge));
        }

        if let Some(setup) = self.setup.take() {
            setup(self.services.clone())?;
        }
        if let Some(setup_async) = self.setup_async.take() {
            setup_async(self.services.clone()).await?;
        }

        let input_id = self.renderer.render_fragment(&test_input).await?;
        let expected_id = self.renderer.render_fragment(&expected_output).await?;
        debug!(%input_id, %expected_id, "both fragments rendered");

        let actual_markup = self.renderer.markup(input_id)?;
        let expected_markup = self.renderer.markup(expected_id)?;

        let expected_parse = self.parser.parse(&expected_markup);
        let actual_parse = self.parser.parse(&actual_markup);
        let (expected_tree, actual_tree) = match (expected_parse, actual_parse) {
            (Ok(expected), Ok(actual)) => (expected, actual),
            (expected, actual) => {
                let errors: Vec<Error> =
                    expected.err().into_iter().chain(actual.err()).collect();
                return Err(Error::aggregate(errors));
            }
        };

        let diffs = self.comparer.compare(&expected_tree, &actual_tree);
        if diffs.is_empty() {
            debug!("snapshot test passed");
            return Ok(());
        }

        Err(Error::SnapshotMismatch(Box::new(SnapshotMismatch {
            description: self.description.take(),
            diffs,
            expected: expected_tree,
            actual: actual_tree,
        })))
    }

    /// Blocking form of [`SnapshotTest::run`] for ordinary test-method
    /// bodies.
    pub fn run_blocking(self) -> Result<()> {
        block_on(self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::RuntimeBridge;
    use crate::testing::{SimpleMarkupParser, StubRenderer, TreeComparer};
    use render_harness_core::NodeChange;
    use std::sync::Mutex;

    fn counter(value: &str) -> Fragment {
        Fragment::element("div")
            .attribute("class", "counter")
            .child(Fragment::element("span").text(value))
            .into()
    }

    fn harness() -> (Arc<StubRenderer>, SnapshotTest) {
        let renderer = Arc::new(StubRenderer::new());
        let test = SnapshotTest::new(
            renderer.clone(),
            Arc::new(SimpleMarkupParser::new()),
            Arc::new(TreeComparer::new()),
        );
        (renderer, test)
    }

    #[tokio::test]
    async fn test_identical_fragments_pass() {
        let (_renderer, test) = harness();
        test.with_test_input(counter("0"))
            .with_expected_output(counter("0"))
            .run()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_attribute_difference_fails_with_diffs() {
        let (_renderer, test) = harness();
        let err = test
            .with_description("counter renders zero")
            .with_test_input(counter("0"))
            .with_expected_output(
                Fragment::element("div")
                    .attribute("class", "counter done")
                    .child(Fragment::element("span").text("0")),
            )
            .run()
            .await
            .unwrap_err();

        match err {
            Error::SnapshotMismatch(mismatch) => {
                assert!(!mismatch.diffs.is_empty());
                assert_eq!(
                    mismatch.description.as_deref(),
                    Some("counter renders zero")
                );
                // Both parsed trees travel with the error.
                let expected_div = &mismatch.expected.find_by_tag("div")[0];
                let actual_div = &mismatch.actual.find_by_tag("div")[0];
                assert_eq!(expected_div.attribute("class"), Some("counter done"));
                assert_eq!(actual_div.attribute("class"), Some("counter"));
                assert!(mismatch.diffs.iter().any(|d| matches!(
                    d.change,
                    NodeChange::AttributeChanged { ref name, .. } if name == "class"
                )));
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_test_input_fails_before_rendering() {
        let (renderer, test) = harness();
        let err = test
            .with_expected_output(counter("0"))
            .run()
            .await
            .unwrap_err();

        match err {
            Error::MissingParameter(name) => assert_eq!(name, "TestInput"),
            other => panic!("expected configuration error, got {other:?}"),
        }
        assert_eq!(renderer.render_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_expected_output_fails_before_rendering() {
        let (renderer, test) = harness();
        let err = test.with_test_input(counter("0")).run().await.unwrap_err();

        match err {
            Error::MissingParameter(name) => assert_eq!(name, "ExpectedOutput"),
            other => panic!("expected configuration error, got {other:?}"),
        }
        assert_eq!(renderer.render_count(), 0);
    }

    #[tokio::test]
    async fn test_setup_callbacks_run_in_order_before_rendering() {
        let (renderer, test) = harness();
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        let sync_order = order.clone();
        let sync_renderer = renderer.clone();
        let async_order = order.clone();
        let async_renderer = renderer.clone();

        test.with_setup(move |_services| {
            assert_eq!(sync_renderer.render_count(), 0);
            sync_order.lock().unwrap().push("setup");
            Ok(())
        })
        .with_setup_async(move |_services| {
            Box::pin(async move {
                assert_eq!(async_renderer.render_count(), 0);
                async_order.lock().unwrap().push("setup_async");
                Ok(())
            })
        })
        .with_test_input(counter("0"))
        .with_expected_output(counter("0"))
        .run()
        .await
        .unwrap();

        assert_eq!(*order.lock().unwrap(), vec!["setup", "setup_async"]);
        assert_eq!(renderer.render_count(), 2);
    }

    #[tokio::test]
    async fn test_setup_error_aborts_before_rendering() {
        let (renderer, test) = harness();
        let err = test
            .with_setup(|_services| Err(Error::Other("seed data unavailable".to_string())))
            .with_test_input(counter("0"))
            .with_expected_output(counter("0"))
            .run()
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "seed data unavailable");
        assert_eq!(renderer.render_count(), 0);
    }

    #[tokio::test]
    async fn test_noop_bridge_registered_by_default() {
        let (_renderer, test) = harness();
        let services = test.services();

        test.with_test_input(counter("0"))
            .with_expected_output(counter("0"))
            .run()
            .await
            .unwrap();

        let bridge = services.get::<BridgeHandle>().expect("bridge registered");
        assert_eq!(bridge.invoke("host.focus", &[]).unwrap(), serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_caller_registered_bridge_preserved() {
        struct RecordingBridge;
        impl RuntimeBridge for RecordingBridge {
            fn invoke(&self, _identifier: &str, _args: &[serde_json::Value]) -> Result<serde_json::Value> {
                Ok(serde_json::Value::Bool(true))
            }
        }

        let (_renderer, test) = harness();
        let custom: BridgeHandle = Arc::new(RecordingBridge);
        test.services().register_singleton::<BridgeHandle>(custom.clone());
        let services = test.services();

        test.with_test_input(counter("0"))
            .with_expected_output(counter("0"))
            .run()
            .await
            .unwrap();

        let bridge = services.get::<BridgeHandle>().unwrap();
        assert!(Arc::ptr_eq(&bridge, &custom));
    }

    #[tokio::test]
    async fn test_both_parse_failures_reported_together() {
        let (renderer, test) = harness();
        let err = test
            .with_test_input(Fragment::raw("<div>"))
            .with_expected_output(Fragment::raw("<span>"))
            .run()
            .await
            .unwrap_err();

        match err {
            Error::Aggregate(errors) => {
                assert_eq!(errors.len(), 2);
                assert!(errors.iter().all(|e| matches!(e, Error::Parse(_))));
            }
            other => panic!("expected aggregate, got {other:?}"),
        }
        assert_eq!(renderer.render_count(), 2);
    }

    #[tokio::test]
    async fn test_single_parse_failure_surfaces_directly() {
        let (_renderer, test) = harness();
        let err = test
            .with_test_input(Fragment::raw("<div>"))
            .with_expected_output(counter("0"))
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_run_blocking_from_sync_context() {
        let (_renderer, test) = harness();
        test.with_test_input(counter("0"))
            .with_expected_output(counter("0"))
            .run_blocking()
            .unwrap();
    }
}
