//! SemanticEngine trait: the native side of the boundary
//!
//! The bridge owns every engine object in a registry and hands the engine
//! borrowed objects for the duration of one call. Operations that consume an
//! expression receive a fresh copy made with
//! [`SemanticEngine::clone_expression`], never the registry's instance.

use std::collections::{BTreeMap, BTreeSet};

use crate::enums::{ContextualAnnotation, Language, SemanticSource, SemanticTypeOfFeedback};
use crate::error::EngineResult;

// ============================================================================
// Call payloads
// ============================================================================

/// Which side of the conversation a text processing context describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextDirection {
    /// Text said by the user to the robot
    ToRobot,
    /// Text said by the robot
    FromRobot,
}

/// Everything needed to load a linguistic database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseRequest {
    /// Languages to load
    pub languages: BTreeSet<Language>,
    /// Folder holding the binary databases
    pub root_folder: String,
}

/// Settings of a text processing context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContextOptions {
    /// Speaker side
    pub direction: TextDirection,
    /// Language of the text
    pub language: Language,
    /// Labels of the resources that may appear inline in the text
    pub resource_labels: Vec<String>,
    /// Address the listener formally
    pub formal_address: bool,
}

/// A resource the robot can run (an animation, an action, a web page...)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceRequest {
    /// Resource type, e.g. `"action"`
    pub label: String,
    /// Resource identifier
    pub value: String,
    /// Language of the resource, if any
    pub language: Option<Language>,
    /// Parameter name to the questions that fill it
    pub parameters: BTreeMap<String, Vec<String>>,
}

/// What a trigger answers with
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerAnswer<X> {
    /// An expression said by the robot
    Expression(X),
    /// A resource to run
    Resource(ResourceRequest),
}

/// A behaviour the memory learned, rendered as text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnedBehavior {
    /// First way to ask for the behaviour
    pub formulation: String,
    /// Second way to ask for the behaviour
    pub alternative_formulation: String,
    /// What the behaviour does, in the future indicative
    pub future_result: String,
}

/// Callback receiving learned behaviours
pub type LearnedBehaviorSink = Box<dyn Fn(LearnedBehavior) + Send + Sync>;

/// Outcome of an inform operation
pub struct Informed<L, X> {
    /// Link to the stored expression
    pub link: Option<L>,
    /// Actions the memory proposed while absorbing the expression
    pub action_proposals: Vec<X>,
}

/// A memory together with its optional subordinate memory.
///
/// The subordinate memory is consulted by read operations but never
/// modified through this scope.
pub struct MemoryScope<'a, M> {
    /// The memory being operated on
    pub memory: &'a mut M,
    /// The linked subordinate memory, if any
    pub sub: Option<&'a M>,
}

impl<'a, M> MemoryScope<'a, M> {
    /// Scope over a memory without a subordinate memory
    pub fn alone(memory: &'a mut M) -> Self {
        Self { memory, sub: None }
    }
}

/// Receiver of what the robot should say or run
pub trait Executor {
    /// The robot should say `text`
    fn on_text_to_say(&mut self, text: &str) -> EngineResult<()>;

    /// The robot should run the resource `label` with `value`
    fn on_resource(&mut self, label: &str, value: &str) -> EngineResult<()>;
}

// ============================================================================
// SemanticEngine
// ============================================================================

/// The semantic engine behind the boundary.
///
/// Engine objects are not thread-safe; the bridge serializes every call.
/// They only need to be movable between threads.
pub trait SemanticEngine: Send + Sync + 'static {
    /// Loaded linguistic database
    type LinguisticDatabase: Send;
    /// Semantic memory
    type Memory: Send;
    /// Semantic expression
    type Expression: Send;
    /// Text processing context
    type TextProcessingContext: Send;
    /// Recommendations container
    type Recommendations: Send;
    /// String replacer
    type Replacer: Send;
    /// Link to an expression stored in a memory
    type MemoryLink: Send;
    /// Live learned-behaviour subscription; dropping it unsubscribes
    type Subscription: Send;

    // ========================================================================
    // Object construction
    // ========================================================================

    /// Load a linguistic database; `None` when nothing could be loaded
    fn new_linguistic_database(&self, request: &DatabaseRequest) -> EngineResult<Option<Self::LinguisticDatabase>>;

    /// Create a text processing context
    fn new_text_processing_context(&self, options: TextContextOptions) -> Self::TextProcessingContext;

    /// Create an empty memory
    fn new_memory(&self) -> Self::Memory;

    /// Create a recommendations container
    fn new_recommendations(&self, db: &Self::LinguisticDatabase) -> EngineResult<Self::Recommendations>;

    /// Create a string replacer
    fn new_replacer(&self, case_sensitive: bool, separators_between_words: bool) -> Self::Replacer;

    /// Independent copy of an expression
    fn clone_expression(&self, expr: &Self::Expression) -> Self::Expression;

    // ========================================================================
    // Memory
    // ========================================================================

    /// Set the id of the user currently talking
    fn set_current_user_id(&self, memory: &mut Self::Memory, user_id: &str);

    /// Id of the user currently talking
    fn current_user_id(&self, memory: &Self::Memory) -> String;

    /// Forget everything stored locally, keeping the subordinate link
    fn clear_local_information(&self, memory: &mut Self::Memory);

    /// Teach the memory the full name of a user
    fn link_user_id_to_full_name(
        &self,
        scope: MemoryScope<'_, Self::Memory>,
        user_id: &str,
        names: &[String],
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<Option<Self::MemoryLink>>;

    /// Deliver every behaviour the memory learns to `sink`
    fn subscribe_to_learned_behaviors(
        &self,
        memory: &mut Self::Memory,
        db: &Self::LinguisticDatabase,
        sink: LearnedBehaviorSink,
    ) -> Self::Subscription;

    /// Let the memory learn the generic "say" command
    fn learn_say_command(&self, scope: MemoryScope<'_, Self::Memory>, db: &Self::LinguisticDatabase);

    /// Let the memory explain to the user how to teach it
    fn allow_to_inform_the_user_how_to_teach(&self, memory: &mut Self::Memory);

    // ========================================================================
    // Text conversion
    // ========================================================================

    /// Parse text into an expression, merged with the memory context when a
    /// scope is given
    fn text_to_expression(
        &self,
        text: &str,
        context: &Self::TextProcessingContext,
        source: SemanticSource,
        scope: Option<MemoryScope<'_, Self::Memory>>,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<Self::Expression>;

    /// Render an expression as text said by the robot
    fn expression_to_text(
        &self,
        expr: Self::Expression,
        language: Language,
        formal_address: bool,
        scope: MemoryScope<'_, Self::Memory>,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<String>;

    /// Annotation carried by a reaction
    fn contextual_annotation(&self, expr: &Self::Expression) -> Option<ContextualAnnotation>;

    /// Whether `text` is a proper noun
    fn is_a_proper_noun(&self, text: &str, db: &Self::LinguisticDatabase) -> bool;

    /// Language `text` is written in, if recognized
    fn detect_language(&self, text: &str, db: &Self::LinguisticDatabase) -> Option<Language>;

    // ========================================================================
    // Memory operations
    // ========================================================================

    /// Store an expression in memory
    fn inform(
        &self,
        expr: Self::Expression,
        scope: MemoryScope<'_, Self::Memory>,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<Informed<Self::MemoryLink, Self::Expression>>;

    /// Store an expression as an axiom
    fn inform_axiom(
        &self,
        expr: Self::Expression,
        scope: MemoryScope<'_, Self::Memory>,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<Option<Self::MemoryLink>>;

    /// Remove a stored expression
    fn forget(
        &self,
        link: Self::MemoryLink,
        scope: MemoryScope<'_, Self::Memory>,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<()>;

    /// Reaction to an expression
    fn react(
        &self,
        expr: Self::Expression,
        scope: MemoryScope<'_, Self::Memory>,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<Option<Self::Expression>>;

    /// Reaction using triggers only
    fn react_from_trigger(
        &self,
        expr: Self::Expression,
        scope: MemoryScope<'_, Self::Memory>,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<Option<Self::Expression>>;

    /// Statement that the robot does not know the answer
    fn not_knowing(&self, expr: &Self::Expression) -> Option<Self::Expression>;

    /// Answer to a question
    fn answer(
        &self,
        expr: Self::Expression,
        scope: MemoryScope<'_, Self::Memory>,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<Option<Self::Expression>>;

    /// What to do for an order
    fn execute(
        &self,
        expr: &Self::Expression,
        scope: MemoryScope<'_, Self::Memory>,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<Option<Self::Expression>>;

    /// What to do for an order, using triggers only
    fn execute_from_trigger(
        &self,
        expr: &Self::Expression,
        scope: MemoryScope<'_, Self::Memory>,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<Option<Self::Expression>>;

    /// Feedback about an expression
    fn say_feedback(
        &self,
        expr: &Self::Expression,
        kind: SemanticTypeOfFeedback,
        scope: MemoryScope<'_, Self::Memory>,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<Option<Self::Expression>>;

    /// Run an expression said by the robot through an executor
    fn run(
        &self,
        expr: Self::Expression,
        language: Language,
        scope: MemoryScope<'_, Self::Memory>,
        db: &Self::LinguisticDatabase,
        executor: &mut dyn Executor,
    ) -> EngineResult<()>;

    // ========================================================================
    // Triggers
    // ========================================================================

    /// Answer `trigger` with `answer`
    fn add_trigger(
        &self,
        trigger: Self::Expression,
        answer: TriggerAnswer<Self::Expression>,
        scope: MemoryScope<'_, Self::Memory>,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<()>;

    /// Answer an imperative `trigger` with a planner action, and teach the
    /// matching behaviour
    fn add_planner_action(
        &self,
        trigger: Self::Expression,
        action: ResourceRequest,
        scope: MemoryScope<'_, Self::Memory>,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<()>;

    // ========================================================================
    // Recommendations and replacements
    // ========================================================================

    /// Add a recommendation identified by `id`
    fn add_recommendation(
        &self,
        container: &mut Self::Recommendations,
        expr: Self::Expression,
        id: &str,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<()>;

    /// Recommendation ids grouped by score, looking at no more than
    /// `search_limit` candidates
    fn recommendations(
        &self,
        container: &Self::Recommendations,
        expr: &Self::Expression,
        search_limit: usize,
        db: &Self::LinguisticDatabase,
    ) -> EngineResult<BTreeMap<i32, BTreeSet<String>>>;

    /// Register a replacement
    fn add_replacement_pattern(&self, replacer: &mut Self::Replacer, pattern: &str, output: &str);

    /// Apply every replacement to `input`
    fn replace(&self, replacer: &Self::Replacer, input: &str) -> String;
}
