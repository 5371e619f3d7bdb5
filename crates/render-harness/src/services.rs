//! Singleton service registration and the runtime bridge placeholder.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

use render_harness_core::Result;

/// Host/browser bridge a rendered component may call into.
///
/// Real implementations forward invocations to a live host runtime; the
/// harness only needs the seam so component code that expects a bridge
/// does not fail in a test context.
pub trait RuntimeBridge: Send + Sync {
    /// Invoke a host function by identifier.
    fn invoke(&self, identifier: &str, args: &[Value]) -> Result<Value>;
}

/// Placeholder bridge that accepts every invocation and returns null.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRuntimeBridge;

impl RuntimeBridge for NoopRuntimeBridge {
    fn invoke(&self, _identifier: &str, _args: &[Value]) -> Result<Value> {
        Ok(Value::Null)
    }
}

/// Handle type under which a runtime bridge is registered.
pub type BridgeHandle = Arc<dyn RuntimeBridge>;

/// Singleton service registry shared by a single test execution.
///
/// Cheap to clone; all clones share the same underlying map. This is the
/// registration seam the snapshot orchestration consumes, not a general
/// dependency-injection container.
#[derive(Clone, Default)]
pub struct Services {
    inner: Arc<RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>>,
}

impl Services {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a singleton, replacing any previous registration of the
    /// same type.
    pub fn register_singleton<T: Any + Send + Sync>(&self, instance: T) {
        self.inner
            .write()
            .unwrap()
            .insert(TypeId::of::<T>(), Box::new(instance));
    }

    /// Get a clone of a registered singleton.
    pub fn get<T: Any + Send + Sync + Clone>(&self) -> Option<T> {
        self.inner
            .read()
            .unwrap()
            .get(&TypeId::of::<T>())
            .and_then(|instance| instance.downcast_ref::<T>())
            .cloned()
    }

    /// Whether a singleton of the given type is registered.
    pub fn contains<T: Any>(&self) -> bool {
        self.inner.read().unwrap().contains_key(&TypeId::of::<T>())
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let len = self.inner.read().unwrap().len();
        f.debug_struct("Services").field("registered", &len).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_get() {
        let services = Services::new();
        services.register_singleton::<u32>(7);
        assert_eq!(services.get::<u32>(), Some(7));
        assert!(services.contains::<u32>());
        assert!(!services.contains::<String>());
    }

    #[test]
    fn test_register_replaces_previous() {
        let services = Services::new();
        services.register_singleton::<u32>(1);
        services.register_singleton::<u32>(2);
        assert_eq!(services.get::<u32>(), Some(2));
    }

    #[test]
    fn test_clones_share_state() {
        let services = Services::new();
        let clone = services.clone();
        clone.register_singleton::<String>("shared".to_string());
        assert_eq!(services.get::<String>(), Some("shared".to_string()));
    }

    #[test]
    fn test_bridge_registration() {
        let services = Services::new();
        let bridge: BridgeHandle = Arc::new(NoopRuntimeBridge);
        services.register_singleton::<BridgeHandle>(bridge);

        let registered = services.get::<BridgeHandle>().unwrap();
        let result = registered.invoke("console.log", &[]).unwrap();
        assert_eq!(result, Value::Null);
    }

    #[test]
    fn test_noop_bridge_accepts_arguments() {
        let bridge = NoopRuntimeBridge;
        let args = vec![Value::String("message".to_string()), Value::Bool(true)];
        assert_eq!(bridge.invoke("host.notify", &args).unwrap(), Value::Null);
    }
}
