//! Host-function bridge: the contract for invoking platform methods.
//!
//! This is the only impure seam of the interpreter, so it sits behind a small
//! injected trait. The invoker resolves a method by class name, method name,
//! and declared argument-type names, then calls it with values unpacked by
//! the configured [`crate::mapper::ValueMapper`]. Resolution failures map to
//! the `fail to load class ...` / `fail to get method ...` error values;
//! failures during the call map to `fail to invoke ...`.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// A resolved host method, callable with unpacked argument values.
pub type HostFn =
    Arc<dyn Fn(&[serde_json::Value]) -> std::result::Result<serde_json::Value, String> + Send + Sync>;

/// Resolver for host methods.
pub trait HostBridge: Send + Sync {
    fn resolve(
        &self,
        class_name: &str,
        method_name: &str,
        arg_types: &[Arc<str>],
    ) -> Result<HostFn>;
}

/// Bridge with no registered classes; every resolution fails.
#[derive(Debug, Default)]
pub struct NoHostBridge;

impl HostBridge for NoHostBridge {
    fn resolve(
        &self,
        class_name: &str,
        _method_name: &str,
        _arg_types: &[Arc<str>],
    ) -> Result<HostFn> {
        Err(Error::ClassNotFound(class_name.to_string()))
    }
}

/// One registered method of a host class.
#[derive(Clone)]
pub struct HostMethod {
    pub name: Arc<str>,
    pub arg_types: Vec<Arc<str>>,
    pub call: HostFn,
}

impl HostMethod {
    pub fn new(
        name: impl Into<Arc<str>>,
        arg_types: &[&str],
        call: impl Fn(&[serde_json::Value]) -> std::result::Result<serde_json::Value, String>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arg_types: arg_types.iter().map(|t| Arc::from(*t)).collect(),
            call: Arc::new(call),
        }
    }
}

/// Registry-backed bridge: hosts register classes and methods up front.
#[derive(Default)]
pub struct StaticHostBridge {
    classes: HashMap<Arc<str>, Vec<HostMethod>>,
}

impl StaticHostBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method under a class name.
    pub fn register(&mut self, class_name: impl Into<Arc<str>>, method: HostMethod) -> &mut Self {
        self.classes.entry(class_name.into()).or_default().push(method);
        self
    }
}

impl HostBridge for StaticHostBridge {
    fn resolve(
        &self,
        class_name: &str,
        method_name: &str,
        arg_types: &[Arc<str>],
    ) -> Result<HostFn> {
        let methods = self
            .classes
            .get(class_name)
            .ok_or_else(|| Error::ClassNotFound(class_name.to_string()))?;

        methods
            .iter()
            .find(|m| &*m.name == method_name && m.arg_types == arg_types)
            .map(|m| m.call.clone())
            .ok_or_else(|| Error::MethodNotFound {
                class: class_name.to_string(),
                method: method_name.to_string(),
                arg_types: arg_types.join(", "),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_static_bridge_resolution() {
        let mut bridge = StaticHostBridge::new();
        bridge.register(
            "java.lang.Math",
            HostMethod::new("max", &["int", "int"], |args| {
                let a = args[0].as_i64().ok_or("not a number")?;
                let b = args[1].as_i64().ok_or("not a number")?;
                Ok(json!(a.max(b)))
            }),
        );

        let arg_types: Vec<Arc<str>> = vec![Arc::from("int"), Arc::from("int")];
        let max = bridge.resolve("java.lang.Math", "max", &arg_types).unwrap();
        assert_eq!((*max)(&[json!(3), json!(7)]).unwrap(), json!(7));

        assert!(matches!(
            bridge.resolve("java.lang.Nope", "max", &arg_types),
            Err(Error::ClassNotFound(_))
        ));
        assert!(matches!(
            bridge.resolve("java.lang.Math", "min", &arg_types),
            Err(Error::MethodNotFound { .. })
        ));
    }
}
