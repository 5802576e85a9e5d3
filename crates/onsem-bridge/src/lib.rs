//! Boundary layer between a managed host runtime and the onsem semantic
//! engine.
//!
//! The host never holds a native object. Every engine object lives in a
//! handle [`Registry`] owned by the application context [`Onsem`], and every
//! boundary call goes through the single [`BoundaryLock`] guarding those
//! registries.
//!
//! Entry points are exposed two ways:
//! - typed methods on [`Onsem`], for Rust callers
//! - named handlers in a [`NativeFunctionRegistry`](onsem_sdk::NativeFunctionRegistry),
//!   installed by [`register_onsem`], for the host glue

#![warn(missing_docs)]

pub mod config;
pub mod diagnostics;
pub mod enums;
pub mod expression;
pub mod guard;
pub mod handles;
pub mod linguistic_database;
pub mod lock;
pub mod memory;
pub mod operations;
pub mod recommendations;
pub mod registry;
pub mod replacer;
pub mod text_context;
pub mod triggers;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use onsem_engine::{Language, SemanticEngine};
use onsem_sdk::{BridgeError, BridgeResult, HostContext};

pub use config::{BridgeConfig, ConfigError};
pub use diagnostics::LiveCounts;
pub use enums::{EnumBridgeCache, EnumOrdinalBridge, SemanticEnumBridges};
pub use guard::guard;
pub use handles::{allocate, Registry};
pub use lock::BoundaryLock;
pub use memory::{AccumulatedFacts, MemoryEntry};
pub use registry::register_onsem;

/// Host class of the objects wrapping a semantic expression handle
pub const SEMANTIC_EXPRESSION_CLASS: &str = "com/onsem/SemanticExpression";

/// Host class of the objects wrapping an expression-in-memory handle
pub const EXPRESSION_HANDLE_IN_MEMORY_CLASS: &str = "com/onsem/ExpressionHandleInMemory";

/// Every registry reachable from the host
pub struct Registries<E: SemanticEngine> {
    /// Loaded linguistic databases
    pub databases: Registry<E::LinguisticDatabase>,
    /// Text processing contexts
    pub text_contexts: Registry<E::TextProcessingContext>,
    /// Semantic memories with their links and buffers
    pub memories: Registry<MemoryEntry<E>>,
    /// Semantic expressions
    pub expressions: Registry<E::Expression>,
    /// Links to expressions stored in a memory
    pub expression_links: Registry<E::MemoryLink>,
    /// Recommendation containers
    pub recommendations: Registry<E::Recommendations>,
    /// String replacers
    pub replacers: Registry<E::Replacer>,
}

impl<E: SemanticEngine> Registries<E> {
    fn new() -> Self {
        Self {
            databases: Registry::new("linguistic database"),
            text_contexts: Registry::new("text processing context"),
            memories: Registry::new("semantic memory"),
            expressions: Registry::new("semantic expression"),
            expression_links: Registry::new("expression handle in memory"),
            recommendations: Registry::new("recommendations"),
            replacers: Registry::new("string replacer"),
        }
    }
}

/// Application context of the boundary layer.
///
/// Shared by `Arc` between every registered entry point; nothing lives in
/// globals.
pub struct Onsem<E: SemanticEngine> {
    engine: E,
    config: BridgeConfig,
    registries: BoundaryLock<Registries<E>>,
    enum_bridges: EnumBridgeCache,
    databases_created: AtomicUsize,
}

impl<E: SemanticEngine> Onsem<E> {
    /// Create a context around `engine`
    pub fn new(engine: E, config: BridgeConfig) -> Self {
        Self {
            engine,
            config,
            registries: BoundaryLock::new(Registries::new()),
            enum_bridges: EnumBridgeCache::new(),
            databases_created: AtomicUsize::new(0),
        }
    }

    /// Create a context ready to be shared with [`register_onsem`]
    pub fn shared(engine: E, config: BridgeConfig) -> Arc<Self> {
        Arc::new(Self::new(engine, config))
    }

    /// The engine behind the boundary
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Active configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Run `body` with every registry, holding the boundary lock
    pub fn with_registries<R>(&self, body: impl FnOnce(&mut Registries<E>) -> R) -> R {
        self.registries.with_lock(body)
    }

    /// Enum bridges of the environment `host` belongs to
    pub fn enum_bridges(&self, host: &dyn HostContext) -> BridgeResult<Arc<SemanticEnumBridges>> {
        self.enum_bridges.get_or_build(host)
    }
}

/// Native language for an ISO 639-1 code
pub fn language_from_iso(code: &str) -> BridgeResult<Language> {
    Language::from_iso(code).ok_or_else(|| BridgeError::UnsupportedValue(format!("language {}", code)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_iso() {
        assert_eq!(language_from_iso("ja"), Ok(Language::Japanese));
        assert_eq!(
            language_from_iso("de").unwrap_err().to_string(),
            "language de is not supported"
        );
    }
}
