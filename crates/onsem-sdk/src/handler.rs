//! Name-based dispatch of boundary entry points

use std::collections::HashMap;
use std::sync::Arc;

use crate::context::HostContext;
use crate::value::HostValue;

// ============================================================================
// NativeCallResult
// ============================================================================

/// Result of a boundary call
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCallResult {
    /// Call handled successfully, returned a value
    Value(HostValue),
    /// Entry point name not recognized by the registry
    Unhandled,
    /// Call failed; the message is what the host raises
    Error(String),
}

impl NativeCallResult {
    /// Create a successful result with null value
    #[inline]
    pub fn null() -> Self {
        Self::Value(HostValue::null())
    }

    /// Create a successful result with an i32 value
    #[inline]
    pub fn i32(val: i32) -> Self {
        Self::Value(HostValue::i32(val))
    }

    /// Create a successful result with a bool value
    #[inline]
    pub fn bool(val: bool) -> Self {
        Self::Value(HostValue::bool(val))
    }

    /// The returned value, if the call succeeded
    pub fn value(&self) -> Option<HostValue> {
        match self {
            Self::Value(v) => Some(*v),
            _ => None,
        }
    }

    /// The error message, if the call failed
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Check if the call failed
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

// ============================================================================
// Native Function Registry
// ============================================================================

/// A boundary entry point (for symbolic name-based dispatch)
pub type NativeHandlerFn = Arc<dyn Fn(&dyn HostContext, &[HostValue]) -> NativeCallResult + Send + Sync>;

/// Registry of entry points indexed by symbolic name.
///
/// The host glue resolves its native method names (e.g.
/// `"semanticMemory.new"`) to handlers once, then dispatches every call
/// through the resolved handler.
pub struct NativeFunctionRegistry {
    handlers: HashMap<String, NativeHandlerFn>,
}

impl NativeFunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register an entry point by name
    pub fn register(
        &mut self,
        name: &str,
        handler: impl Fn(&dyn HostContext, &[HostValue]) -> NativeCallResult + Send + Sync + 'static,
    ) {
        self.handlers.insert(name.to_string(), Arc::new(handler));
    }

    /// Get a handler by name
    pub fn get(&self, name: &str) -> Option<NativeHandlerFn> {
        self.handlers.get(name).cloned()
    }

    /// Resolve and invoke an entry point.
    ///
    /// Returns [`NativeCallResult::Unhandled`] when nothing is registered
    /// under `name`.
    pub fn call(&self, name: &str, ctx: &dyn HostContext, args: &[HostValue]) -> NativeCallResult {
        match self.handlers.get(name) {
            Some(handler) => handler(ctx, args),
            None => NativeCallResult::Unhandled,
        }
    }

    /// Check if a handler is registered
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for NativeFunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
