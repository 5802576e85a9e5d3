//! ReferenceEngine: a small deterministic semantic engine.
//!
//! It understands just enough text to drive the bridge end to end: facts
//! are stored verbatim, questions are answered by word overlap with stored
//! facts, "to X means Y" teaches a behaviour, and triggers match on the
//! normalized trigger text.

mod analysis;
mod replacer;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

pub use analysis::ExpressionKind;
pub use replacer::RefReplacer;

use crate::engine::{
    DatabaseRequest, Executor, Informed, LearnedBehavior, LearnedBehaviorSink, MemoryScope, ResourceRequest,
    SemanticEngine, TextContextOptions, TextDirection, TriggerAnswer,
};
use crate::enums::{ContextualAnnotation, Language, SemanticSource, SemanticTypeOfFeedback};
use crate::error::{EngineError, EngineResult};

/// Nested behaviours are followed this deep when running an expression
const MAX_RUN_DEPTH: usize = 4;

// ============================================================================
// Engine objects
// ============================================================================

/// Loaded "database": the languages it covers
#[derive(Debug, Clone)]
pub struct RefLinguisticDatabase {
    languages: BTreeSet<Language>,
    root_folder: String,
}

impl RefLinguisticDatabase {
    /// Languages covered
    pub fn languages(&self) -> &BTreeSet<Language> {
        &self.languages
    }

    /// Folder the database was loaded from
    pub fn root_folder(&self) -> &str {
        &self.root_folder
    }
}

/// Parsed sentence
#[derive(Debug, Clone, PartialEq)]
pub struct RefExpression {
    /// Original text
    pub text: String,
    /// Coarse shape
    pub kind: ExpressionKind,
    /// Where the text came from
    pub source: SemanticSource,
    /// Language of the text
    pub language: Option<Language>,
    /// Annotation, set on reactions
    pub annotation: Option<ContextualAnnotation>,
    /// Resource to run instead of text to say
    pub resource: Option<ResourceRequest>,
    /// User who said it
    pub speaker: Option<String>,
}

impl RefExpression {
    fn said(sentence: impl Into<String>, annotation: ContextualAnnotation) -> Self {
        let text = sentence.into();
        Self {
            kind: analysis::classify(&text),
            text,
            source: SemanticSource::SemReaction,
            language: None,
            annotation: Some(annotation),
            resource: None,
            speaker: None,
        }
    }

    fn resource(resource: ResourceRequest, annotation: Option<ContextualAnnotation>) -> Self {
        Self {
            text: format!("\\{}={}\\", resource.label, resource.value),
            kind: ExpressionKind::Statement,
            source: SemanticSource::SemReaction,
            language: resource.language,
            annotation,
            resource: Some(resource),
            speaker: None,
        }
    }
}

/// Text processing settings
#[derive(Debug, Clone)]
pub struct RefTextContext {
    options: TextContextOptions,
}

impl RefTextContext {
    /// Settings this context was built with
    pub fn options(&self) -> &TextContextOptions {
        &self.options
    }
}

#[derive(Debug, Clone)]
struct Fact {
    id: u64,
    text: String,
    axiom: bool,
}

#[derive(Debug, Clone)]
enum Behavior {
    Say(String),
    Run(ResourceRequest),
}

type Subscribers = Arc<Mutex<Vec<(u64, Arc<LearnedBehaviorSink>)>>>;

/// Semantic memory
pub struct RefMemory {
    user_id: String,
    facts: Vec<Fact>,
    next_fact_id: u64,
    triggers: Vec<(String, TriggerAnswer<RefExpression>)>,
    behaviors: BTreeMap<String, Behavior>,
    user_names: BTreeMap<String, Vec<String>>,
    knows_say_command: bool,
    informs_how_to_teach: bool,
    subscribers: Subscribers,
    next_subscriber_id: u64,
}

impl RefMemory {
    fn new() -> Self {
        Self {
            user_id: String::new(),
            facts: Vec::new(),
            next_fact_id: 1,
            triggers: Vec::new(),
            behaviors: BTreeMap::new(),
            user_names: BTreeMap::new(),
            knows_say_command: false,
            informs_how_to_teach: false,
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_subscriber_id: 1,
        }
    }

    /// Stored fact texts, oldest first
    pub fn facts(&self) -> Vec<&str> {
        self.facts.iter().map(|f| f.text.as_str()).collect()
    }

    /// Facts stored as axioms
    pub fn axiom_count(&self) -> usize {
        self.facts.iter().filter(|f| f.axiom).count()
    }

    /// Labels of the learned behaviours
    pub fn behavior_labels(&self) -> Vec<&str> {
        self.behaviors.keys().map(String::as_str).collect()
    }

    /// Full name taught for `user_id`
    pub fn full_name(&self, user_id: &str) -> Option<String> {
        self.user_names.get(user_id).map(|names| names.join(" "))
    }

    /// Number of live learned-behaviour subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    fn store(&mut self, text: &str, axiom: bool) -> RefMemoryLink {
        let id = self.next_fact_id;
        self.next_fact_id += 1;
        self.facts.push(Fact {
            id,
            text: text.to_string(),
            axiom,
        });
        RefMemoryLink { fact_id: id }
    }

    fn learn(&mut self, label: &str, behavior: Behavior) {
        let result = match &behavior {
            Behavior::Say(text) => text.clone(),
            Behavior::Run(resource) => format!("run {}", resource.value),
        };
        self.behaviors.insert(label.to_string(), behavior);
        let learned = LearnedBehavior {
            formulation: format!("can you {}", label),
            alternative_formulation: label.to_string(),
            future_result: format!("I will {}", result),
        };
        let sinks: Vec<_> = self.subscribers.lock().iter().map(|(_, s)| s.clone()).collect();
        tracing::debug!(label, subscribers = sinks.len(), "behaviour learned");
        for sink in sinks {
            sink(learned.clone());
        }
    }

    fn trigger_answer(&self, expr: &RefExpression) -> Option<RefExpression> {
        let key = analysis::normalize(&expr.text);
        self.triggers
            .iter()
            .rev()
            .find(|(trigger, _)| *trigger == key)
            .map(|(_, answer)| match answer {
                TriggerAnswer::Expression(x) => {
                    let mut x = x.clone();
                    x.annotation = Some(ContextualAnnotation::Answer);
                    x
                }
                TriggerAnswer::Resource(resource) => {
                    RefExpression::resource(resource.clone(), Some(ContextualAnnotation::Behavior))
                }
            })
    }
}

/// Link to a stored fact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefMemoryLink {
    fact_id: u64,
}

/// Learned-behaviour subscription; dropping it unsubscribes
pub struct RefSubscription {
    subscribers: Weak<Mutex<Vec<(u64, Arc<LearnedBehaviorSink>)>>>,
    id: u64,
}

impl Drop for RefSubscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

/// Recommendation ids with the words that select them
#[derive(Debug, Clone, Default)]
pub struct RefRecommendations {
    entries: Vec<(String, BTreeSet<String>)>,
    boosted: BTreeSet<String>,
}

// ============================================================================
// ReferenceEngine
// ============================================================================

/// Deterministic engine used by tests and the demo session
#[derive(Debug, Clone, Default)]
pub struct ReferenceEngine;

impl ReferenceEngine {
    /// Create the engine
    pub fn new() -> Self {
        Self
    }

    fn lookup(&self, scope: &MemoryScope<'_, RefMemory>, question: &str) -> Option<String> {
        let wanted = analysis::content_words(question);
        if wanted.is_empty() {
            return None;
        }
        let matches = |fact: &Fact| {
            let have = analysis::words(&fact.text);
            wanted.iter().all(|w| have.contains(w))
        };
        scope
            .memory
            .facts
            .iter()
            .rev()
            .find(|f| matches(f))
            .or_else(|| scope.sub.and_then(|sub| sub.facts.iter().rev().find(|f| matches(f))))
            .map(|f| f.text.clone())
    }

    fn resolve_command(&self, scope: &MemoryScope<'_, RefMemory>, expr: &RefExpression) -> Option<RefExpression> {
        let key = analysis::normalize(&expr.text);
        let key = key.strip_prefix("please ").unwrap_or(&key);
        let behavior = scope
            .memory
            .behaviors
            .get(key)
            .or_else(|| scope.sub.and_then(|sub| sub.behaviors.get(key)));
        if let Some(behavior) = behavior {
            return Some(match behavior {
                Behavior::Say(text) => RefExpression::said(text.clone(), ContextualAnnotation::Behavior),
                Behavior::Run(resource) => RefExpression::resource(resource.clone(), Some(ContextualAnnotation::Behavior)),
            });
        }
        if scope.memory.knows_say_command {
            if let Some(rest) = key.strip_prefix("say ") {
                let mut said = RefExpression::said(rest, ContextualAnnotation::Behavior);
                said.kind = ExpressionKind::Statement;
                return Some(said);
            }
        }
        None
    }

    fn run_at_depth(
        &self,
        expr: RefExpression,
        scope: &MemoryScope<'_, RefMemory>,
        executor: &mut dyn Executor,
        depth: usize,
    ) -> EngineResult<()> {
        if let Some(resource) = &expr.resource {
            return executor.on_resource(&resource.label, &resource.value);
        }
        if expr.kind == ExpressionKind::Command && depth < MAX_RUN_DEPTH {
            if let Some(next) = self.resolve_command(scope, &expr) {
                return self.run_at_depth(next, scope, executor, depth + 1);
            }
        }
        executor.on_text_to_say(&expr.text)
    }

    fn learn_from(&self, memory: &mut RefMemory, expr: &RefExpression) {
        if let ExpressionKind::Teaching { label, result } = &expr.kind {
            memory.learn(label, Behavior::Say(result.clone()));
        }
    }
}

impl SemanticEngine for ReferenceEngine {
    type LinguisticDatabase = RefLinguisticDatabase;
    type Memory = RefMemory;
    type Expression = RefExpression;
    type TextProcessingContext = RefTextContext;
    type Recommendations = RefRecommendations;
    type Replacer = RefReplacer;
    type MemoryLink = RefMemoryLink;
    type Subscription = RefSubscription;

    fn new_linguistic_database(&self, request: &DatabaseRequest) -> EngineResult<Option<RefLinguisticDatabase>> {
        if request.root_folder.is_empty() {
            return Err(EngineError::MissingResource("linguistic database root folder".to_string()));
        }
        if request.languages.is_empty() {
            return Ok(None);
        }
        Ok(Some(RefLinguisticDatabase {
            languages: request.languages.clone(),
            root_folder: request.root_folder.clone(),
        }))
    }

    fn new_text_processing_context(&self, options: TextContextOptions) -> RefTextContext {
        RefTextContext { options }
    }

    fn new_memory(&self) -> RefMemory {
        RefMemory::new()
    }

    fn new_recommendations(&self, _db: &RefLinguisticDatabase) -> EngineResult<RefRecommendations> {
        Ok(RefRecommendations {
            entries: Vec::new(),
            boosted: ["i", "me", "you", "je", "moi", "tu", "vous"]
                .iter()
                .map(|w| w.to_string())
                .collect(),
        })
    }

    fn new_replacer(&self, case_sensitive: bool, separators_between_words: bool) -> RefReplacer {
        RefReplacer::new(case_sensitive, separators_between_words)
    }

    fn clone_expression(&self, expr: &RefExpression) -> RefExpression {
        expr.clone()
    }

    fn set_current_user_id(&self, memory: &mut RefMemory, user_id: &str) {
        memory.user_id = user_id.to_string();
    }

    fn current_user_id(&self, memory: &RefMemory) -> String {
        memory.user_id.clone()
    }

    fn clear_local_information(&self, memory: &mut RefMemory) {
        memory.facts.clear();
        memory.triggers.clear();
        memory.behaviors.clear();
        memory.user_names.clear();
    }

    fn link_user_id_to_full_name(
        &self,
        scope: MemoryScope<'_, RefMemory>,
        user_id: &str,
        names: &[String],
        _db: &RefLinguisticDatabase,
    ) -> EngineResult<Option<RefMemoryLink>> {
        if names.is_empty() {
            return Ok(None);
        }
        scope.memory.user_names.insert(user_id.to_string(), names.to_vec());
        let fact = format!("{} is {}", user_id, names.join(" "));
        Ok(Some(scope.memory.store(&fact, false)))
    }

    fn subscribe_to_learned_behaviors(
        &self,
        memory: &mut RefMemory,
        _db: &RefLinguisticDatabase,
        sink: LearnedBehaviorSink,
    ) -> RefSubscription {
        let id = memory.next_subscriber_id;
        memory.next_subscriber_id += 1;
        memory.subscribers.lock().push((id, Arc::new(sink)));
        RefSubscription {
            subscribers: Arc::downgrade(&memory.subscribers),
            id,
        }
    }

    fn learn_say_command(&self, scope: MemoryScope<'_, RefMemory>, _db: &RefLinguisticDatabase) {
        scope.memory.knows_say_command = true;
    }

    fn allow_to_inform_the_user_how_to_teach(&self, memory: &mut RefMemory) {
        memory.informs_how_to_teach = true;
    }

    fn text_to_expression(
        &self,
        text: &str,
        context: &RefTextContext,
        source: SemanticSource,
        scope: Option<MemoryScope<'_, RefMemory>>,
        db: &RefLinguisticDatabase,
    ) -> EngineResult<RefExpression> {
        let language = context.options.language;
        if !db.languages.contains(&language) {
            return Err(EngineError::Unsupported(format!(
                "language {} in this linguistic database",
                language.iso_code()
            )));
        }
        if let Some((label, value)) = analysis::inline_resource(text, &context.options.resource_labels) {
            let resource = ResourceRequest {
                label: label.to_string(),
                value: value.to_string(),
                language: Some(language),
                parameters: BTreeMap::new(),
            };
            let mut expr = RefExpression::resource(resource, None);
            expr.source = source;
            return Ok(expr);
        }
        let speaker = match (context.options.direction, scope) {
            (TextDirection::ToRobot, Some(scope)) if !scope.memory.user_id.is_empty() => {
                Some(scope.memory.user_id.clone())
            }
            _ => None,
        };
        Ok(RefExpression {
            text: text.trim().to_string(),
            kind: analysis::classify(text),
            source,
            language: Some(language),
            annotation: None,
            resource: None,
            speaker,
        })
    }

    fn expression_to_text(
        &self,
        expr: RefExpression,
        language: Language,
        formal_address: bool,
        _scope: MemoryScope<'_, RefMemory>,
        _db: &RefLinguisticDatabase,
    ) -> EngineResult<String> {
        if language == Language::French && !formal_address {
            let mut r = RefReplacer::new(false, true);
            r.add("vous", "tu");
            return Ok(r.apply(&expr.text));
        }
        Ok(expr.text)
    }

    fn contextual_annotation(&self, expr: &RefExpression) -> Option<ContextualAnnotation> {
        expr.annotation
    }

    fn is_a_proper_noun(&self, text: &str, _db: &RefLinguisticDatabase) -> bool {
        analysis::is_a_proper_noun(text)
    }

    fn detect_language(&self, text: &str, db: &RefLinguisticDatabase) -> Option<Language> {
        analysis::detect_language(text).filter(|l| db.languages.contains(l))
    }

    fn inform(
        &self,
        expr: RefExpression,
        scope: MemoryScope<'_, RefMemory>,
        _db: &RefLinguisticDatabase,
    ) -> EngineResult<Informed<RefMemoryLink, RefExpression>> {
        self.learn_from(scope.memory, &expr);
        let link = scope.memory.store(&expr.text, false);
        let action_proposals = if expr.kind == ExpressionKind::Command {
            vec![expr]
        } else {
            Vec::new()
        };
        Ok(Informed {
            link: Some(link),
            action_proposals,
        })
    }

    fn inform_axiom(
        &self,
        expr: RefExpression,
        scope: MemoryScope<'_, RefMemory>,
        _db: &RefLinguisticDatabase,
    ) -> EngineResult<Option<RefMemoryLink>> {
        self.learn_from(scope.memory, &expr);
        Ok(Some(scope.memory.store(&expr.text, true)))
    }

    fn forget(
        &self,
        link: RefMemoryLink,
        scope: MemoryScope<'_, RefMemory>,
        _db: &RefLinguisticDatabase,
    ) -> EngineResult<()> {
        let before = scope.memory.facts.len();
        scope.memory.facts.retain(|f| f.id != link.fact_id);
        if scope.memory.facts.len() == before {
            return Err(EngineError::Operation(format!(
                "fact {} is no longer in this memory",
                link.fact_id
            )));
        }
        Ok(())
    }

    fn react(
        &self,
        expr: RefExpression,
        scope: MemoryScope<'_, RefMemory>,
        db: &RefLinguisticDatabase,
    ) -> EngineResult<Option<RefExpression>> {
        if let Some(answer) = scope.memory.trigger_answer(&expr) {
            return Ok(Some(answer));
        }
        let reaction = match expr.kind.clone() {
            ExpressionKind::Question => match self.lookup(&scope, &expr.text) {
                Some(fact) => RefExpression::said(fact, ContextualAnnotation::Answer),
                None => RefExpression::said("I don't know", ContextualAnnotation::AnswerNotFound),
            },
            ExpressionKind::Command => match self.resolve_command(&scope, &expr) {
                Some(found) => found,
                None if scope.memory.informs_how_to_teach => RefExpression::said(
                    format!(
                        "I don't know how to {}. You can teach me by saying: to {} means ...",
                        analysis::normalize(&expr.text),
                        analysis::normalize(&expr.text)
                    ),
                    ContextualAnnotation::BehaviorNotFound,
                ),
                None => RefExpression::said(
                    format!("I don't know how to {}", analysis::normalize(&expr.text)),
                    ContextualAnnotation::BehaviorNotFound,
                ),
            },
            ExpressionKind::Teaching { label, .. } => {
                self.inform(expr, scope, db)?;
                RefExpression::said(format!("Ok, I know how to {} now", label), ContextualAnnotation::TeachingFeedback)
            }
            ExpressionKind::Statement => {
                self.inform(expr, scope, db)?;
                RefExpression::said("Ok", ContextualAnnotation::Feedback)
            }
        };
        Ok(Some(reaction))
    }

    fn react_from_trigger(
        &self,
        expr: RefExpression,
        scope: MemoryScope<'_, RefMemory>,
        _db: &RefLinguisticDatabase,
    ) -> EngineResult<Option<RefExpression>> {
        Ok(scope
            .memory
            .trigger_answer(&expr)
            .or_else(|| scope.sub.and_then(|sub| sub.trigger_answer(&expr))))
    }

    fn not_knowing(&self, expr: &RefExpression) -> Option<RefExpression> {
        match expr.kind {
            ExpressionKind::Question => Some(RefExpression::said("I don't know", ContextualAnnotation::AnswerNotFound)),
            _ => None,
        }
    }

    fn answer(
        &self,
        expr: RefExpression,
        scope: MemoryScope<'_, RefMemory>,
        _db: &RefLinguisticDatabase,
    ) -> EngineResult<Option<RefExpression>> {
        if expr.kind != ExpressionKind::Question {
            return Ok(None);
        }
        Ok(self
            .lookup(&scope, &expr.text)
            .map(|fact| RefExpression::said(fact, ContextualAnnotation::Answer)))
    }

    fn execute(
        &self,
        expr: &RefExpression,
        scope: MemoryScope<'_, RefMemory>,
        _db: &RefLinguisticDatabase,
    ) -> EngineResult<Option<RefExpression>> {
        if expr.kind != ExpressionKind::Command {
            return Ok(None);
        }
        Ok(self
            .resolve_command(&scope, expr)
            .or_else(|| scope.memory.trigger_answer(expr)))
    }

    fn execute_from_trigger(
        &self,
        expr: &RefExpression,
        scope: MemoryScope<'_, RefMemory>,
        _db: &RefLinguisticDatabase,
    ) -> EngineResult<Option<RefExpression>> {
        Ok(scope.memory.trigger_answer(expr))
    }

    fn say_feedback(
        &self,
        expr: &RefExpression,
        kind: SemanticTypeOfFeedback,
        scope: MemoryScope<'_, RefMemory>,
        _db: &RefLinguisticDatabase,
    ) -> EngineResult<Option<RefExpression>> {
        Ok(match kind {
            SemanticTypeOfFeedback::AskForAdditionalInformation => {
                Some(RefExpression::said("Can you tell me more?", ContextualAnnotation::Question))
            }
            SemanticTypeOfFeedback::ReactOnSimilarities => {
                let words = analysis::content_words(&expr.text);
                scope
                    .memory
                    .facts
                    .iter()
                    .rev()
                    .find(|f| f.text != expr.text && analysis::words(&f.text).iter().any(|w| words.contains(w)))
                    .map(|f| RefExpression::said(format!("It reminds me that {}", f.text), ContextualAnnotation::Feedback))
            }
            SemanticTypeOfFeedback::Sentiment => {
                Some(RefExpression::said("I am glad to hear that", ContextualAnnotation::Feedback))
            }
        })
    }

    fn run(
        &self,
        expr: RefExpression,
        _language: Language,
        scope: MemoryScope<'_, RefMemory>,
        _db: &RefLinguisticDatabase,
        executor: &mut dyn Executor,
    ) -> EngineResult<()> {
        self.run_at_depth(expr, &scope, executor, 0)
    }

    fn add_trigger(
        &self,
        trigger: RefExpression,
        answer: TriggerAnswer<RefExpression>,
        scope: MemoryScope<'_, RefMemory>,
        _db: &RefLinguisticDatabase,
    ) -> EngineResult<()> {
        let key = analysis::normalize(&trigger.text);
        if key.is_empty() {
            return Err(EngineError::Operation("a trigger needs at least one word".to_string()));
        }
        scope.memory.triggers.retain(|(t, _)| *t != key);
        scope.memory.triggers.push((key, answer));
        Ok(())
    }

    fn add_planner_action(
        &self,
        trigger: RefExpression,
        action: ResourceRequest,
        scope: MemoryScope<'_, RefMemory>,
        db: &RefLinguisticDatabase,
    ) -> EngineResult<()> {
        if trigger.kind == ExpressionKind::Command {
            let label = analysis::normalize(&trigger.text);
            scope.memory.learn(&label, Behavior::Run(action.clone()));
        }
        self.add_trigger(trigger, TriggerAnswer::Resource(action), scope, db)
    }

    fn add_recommendation(
        &self,
        container: &mut RefRecommendations,
        expr: RefExpression,
        id: &str,
        _db: &RefLinguisticDatabase,
    ) -> EngineResult<()> {
        let words = analysis::words(&expr.text).into_iter().collect();
        container.entries.push((id.to_string(), words));
        Ok(())
    }

    fn recommendations(
        &self,
        container: &RefRecommendations,
        expr: &RefExpression,
        search_limit: usize,
        _db: &RefLinguisticDatabase,
    ) -> EngineResult<BTreeMap<i32, BTreeSet<String>>> {
        let wanted: BTreeSet<String> = analysis::words(&expr.text).into_iter().collect();
        let mut scored: BTreeMap<i32, BTreeSet<String>> = BTreeMap::new();
        for (id, words) in container.entries.iter().take(search_limit) {
            let score: i32 = words
                .intersection(&wanted)
                .map(|w| if container.boosted.contains(w) { 2 } else { 1 })
                .sum();
            if score > 0 {
                scored.entry(score).or_default().insert(id.clone());
            }
        }
        Ok(scored)
    }

    fn add_replacement_pattern(&self, replacer: &mut RefReplacer, pattern: &str, output: &str) {
        replacer.add(pattern, output);
    }

    fn replace(&self, replacer: &RefReplacer, input: &str) -> String {
        replacer.apply(input)
    }
}
