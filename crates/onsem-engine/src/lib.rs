//! Onsem engine seam
//!
//! The bridge never links against a concrete semantic engine. It programs
//! against [`SemanticEngine`], whose associated types are the native objects
//! the bridge keeps in its registries, and against the native enums the host
//! ordinals are translated into.
//!
//! The `reference` feature ships [`reference::ReferenceEngine`], a small
//! deterministic implementation used by the test suites and the CLI.

#![warn(missing_docs)]

pub mod engine;
pub mod enums;
pub mod error;
#[cfg(any(test, feature = "reference"))]
pub mod reference;

pub use engine::{
    DatabaseRequest, Executor, Informed, LearnedBehavior, LearnedBehaviorSink, MemoryScope, ResourceRequest,
    SemanticEngine, TextContextOptions, TextDirection, TriggerAnswer,
};
pub use enums::{
    ContextualAnnotation, GrammaticalType, Language, NaturalLanguagePolarity, QuantityType, ReferenceType,
    SemanticSource, SemanticTypeOfFeedback, VerbGoal, VerbTense,
};
pub use error::{EngineError, EngineResult};
