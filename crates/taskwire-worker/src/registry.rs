use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;
use taskwire_common::DISCOVER_ACTION;

/// Boxed future returned by an action handler.
///
/// `Ok` carries the return value, `Err` carries the raised error value.
/// Both sides are structural JSON values so they survive the channel intact.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, Value>> + Send>>;

/// An invocable action: positional JSON arguments in, value or error out.
pub type Handler = Arc<dyn Fn(Vec<Value>) -> HandlerFuture + Send + Sync>;

/// Immutable mapping from action name to handler.
///
/// Built once by [`RegistryBuilder`] before the worker starts serving and
/// never mutated afterwards, so the dispatcher can share it freely across
/// concurrently executing calls.
pub struct Registry {
    handlers: HashMap<String, Handler>,
}

impl Registry {
    /// Starts building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Looks up a handler by action name.
    pub fn get(&self, action: &str) -> Option<&Handler> {
        self.handlers.get(action)
    }

    /// True when the named action is registered.
    pub fn contains(&self, action: &str) -> bool {
        self.handlers.contains_key(action)
    }

    /// Sorted list of registered action names.
    ///
    /// This is exactly the payload of a discovery reply; the reserved
    /// discovery action is never part of it.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True when no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Builder for [`Registry`].
///
/// Accepts both async and plain synchronous handlers; synchronous ones are
/// adapted into an already-ready future so the dispatcher awaits every
/// invocation uniformly.
///
/// # Example
///
/// ```
/// use taskwire_worker::Registry;
/// use serde_json::{json, Value};
///
/// let registry = Registry::builder()
///     .register_fn("add", |args: Vec<Value>| {
///         let a = args[0].as_i64().ok_or(json!("expected a number"))?;
///         let b = args[1].as_i64().ok_or(json!("expected a number"))?;
///         Ok(json!(a + b))
///     })
///     .build();
///
/// assert!(registry.contains("add"));
/// ```
pub struct RegistryBuilder {
    handlers: HashMap<String, Handler>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        RegistryBuilder {
            handlers: HashMap::new(),
        }
    }

    /// Registers an async handler under the given action name.
    ///
    /// Registering the reserved discovery name is ignored: that action is
    /// always answered by the dispatcher itself. Re-registering a name
    /// replaces the previous handler.
    pub fn register<F, Fut>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, Value>> + Send + 'static,
    {
        let name = name.into();
        if name == DISCOVER_ACTION {
            tracing::warn!(action = %name, "ignoring attempt to register the reserved discovery action");
            return self;
        }

        // Defer the handler call to the first poll so that nothing runs
        // outside the dispatcher's catch_unwind boundary.
        let handler = Arc::new(handler);
        let handler: Handler = Arc::new(move |args| {
            let handler = handler.clone();
            Box::pin(async move { handler(args).await })
        });
        self.handlers.insert(name, handler);
        self
    }

    /// Registers a synchronous handler under the given action name.
    pub fn register_fn<F>(self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, Value> + Send + Sync + 'static,
    {
        self.register(name, move |args| std::future::ready(handler(args)))
    }

    /// Finalizes the registry. No registrations are possible afterwards.
    pub fn build(self) -> Registry {
        Registry {
            handlers: self.handlers,
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
