//! Entry points called by name, the way the host glue calls them

mod common;

use common::{declared_host, dispatcher, error, value};
use onsem_bridge::enums::class;
use onsem_bridge::{EXPRESSION_HANDLE_IN_MEMORY_CLASS, SEMANTIC_EXPRESSION_CLASS};
use std::collections::BTreeMap;

use onsem_sdk::testing::{HostObject, InMemoryHost, RecordedCall};
use onsem_sdk::{
    BridgeError, BridgeResult, EnvironmentId, Handle, HostContext, HostValue, NativeCallResult,
    NativeFunctionRegistry,
};

struct Glue {
    registry: NativeFunctionRegistry,
    host: InMemoryHost,
}

impl Glue {
    fn new() -> Self {
        let (registry, _) = dispatcher();
        Self {
            registry,
            host: declared_host(1),
        }
    }

    fn call(&self, name: &str, args: &[HostValue]) -> NativeCallResult {
        self.registry.call(name, &self.host, args)
    }

    fn db(&self) -> HostValue {
        let locales = self.host.strings(&["en", "fr"]);
        let root = self.host.string("/linguistic");
        value(self.call("linguisticDatabase.new", &[locales, root]))
    }

    fn parse(&self, text: &str, tpc: HostValue, mem: HostValue, db: HostValue) -> HostValue {
        let text = self.host.string(text);
        let source = self.host.enum_constant(class::SOURCE, "WRITTENTEXT").unwrap();
        value(self.call("semanticExpression.fromText", &[text, tpc, source, mem, db]))
    }

    fn to_robot(&self) -> HostValue {
        let locale = self.host.locale("en");
        let labels = self.host.strings(&[]);
        value(self.call("textProcessingContext.new", &[HostValue::bool(true), locale, labels]))
    }

    fn read_string(&self, val: HostValue) -> String {
        match self.host.object(val) {
            Some(HostObject::Str(s)) => s,
            other => panic!("not a string: {:?}", other),
        }
    }
}

#[test]
fn test_conversation_through_the_boundary() {
    let glue = Glue::new();
    let db = glue.db();
    assert_eq!(db.as_i32(), Some(1));
    let mem = value(glue.call("semanticMemory.new", &[]));
    let tpc = glue.to_robot();

    let fact = glue.parse("Paul likes chocolate", tpc, mem, db);
    assert_eq!(
        glue.host.object(fact),
        Some(HostObject::HandleObject {
            class: SEMANTIC_EXPRESSION_CLASS.to_string(),
            handle: 1
        })
    );

    let executor = glue.host.recorder();
    let en = glue.host.locale("en");
    let link = value(glue.call("onsem.inform", &[fact, en, mem, db, executor]));
    assert!(matches!(
        glue.host.object(link),
        Some(HostObject::HandleObject { class, .. }) if class == EXPRESSION_HANDLE_IN_MEMORY_CLASS
    ));
    assert!(glue.host.recorded_calls(executor).is_empty());

    let question = glue.parse("Who likes chocolate?", tpc, mem, db);
    let annotation = value(glue.call("onsem.react", &[question, en, mem, db, executor]));
    assert_eq!(glue.read_string(annotation), "answer");
    assert_eq!(
        glue.host.recorded_calls(executor),
        vec![RecordedCall {
            method: "onTextToSay".to_string(),
            args: vec!["Paul likes chocolate".to_string()],
        }]
    );

    let answer = value(glue.call("onsem.answer", &[question, mem, db]));
    let text = value(glue.call("semanticExpression.toText", &[answer, en, mem, db]));
    assert_eq!(glue.read_string(text), "Paul likes chocolate");

    assert!(value(glue.call("onsem.notKnowing", &[fact, mem, db])).is_null());
}

#[test]
fn test_errors_become_messages() {
    let glue = Glue::new();
    assert_eq!(
        error(glue.call("semanticMemory.getCurrentUserId", &[HostValue::i32(99)])),
        "wrong semantic memory id: 99"
    );
    assert_eq!(
        error(glue.call("semanticMemory.new", &[HostValue::i32(1)])),
        "Argument error: semanticMemory.new: expected 0 arguments, got 1"
    );

    let de = glue.host.locale("de");
    let labels = glue.host.strings(&[]);
    assert_eq!(
        error(glue.call("textProcessingContext.new", &[HostValue::bool(true), de, labels])),
        "language de is not supported"
    );

    let db = glue.db();
    let mem = value(glue.call("semanticMemory.new", &[]));
    let tpc = glue.to_robot();
    let text = glue.host.string("hello");
    let msg = error(glue.call(
        "semanticExpression.fromText",
        &[text, tpc, HostValue::i32(42), mem, db],
    ));
    assert_eq!(msg, "invalid com/onsem/SemanticSourceEnum ordinal 42");

    assert_eq!(glue.call("semanticMemory.teleport", &[]), NativeCallResult::Unhandled);
}

#[test]
fn test_inconsistent_host_enum_is_refused() {
    let (registry, onsem) = dispatcher();
    let broken = InMemoryHost::with_environment(EnvironmentId(7));
    for (name, constants) in onsem_bridge::SemanticEnumBridges::declarations() {
        if name == class::SOURCE {
            broken.declare_enum(name, &["ASR", "EVENT", "VISION"]);
        } else {
            broken.declare_enum(name, &constants);
        }
    }
    let mem = value(registry.call("semanticMemory.new", &broken, &[]));
    let text = broken.string("hello");
    let args = [text, HostValue::i32(1), HostValue::i32(0), mem, HostValue::i32(1)];
    let msg = error(registry.call("semanticExpression.fromText", &broken, &args));
    assert!(msg.contains("com/onsem/SemanticSourceEnum"), "{}", msg);
    assert!(msg.contains("is missing"), "{}", msg);
    assert!(onsem.enum_bridges(&broken).is_err());

    // A consistent host is unaffected by the broken one
    let host = declared_host(8);
    assert!(onsem.enum_bridges(&host).is_ok());
}

#[test]
fn test_learned_behaviours_flattened_for_the_host() {
    let glue = Glue::new();
    let db = glue.db();
    let mem = value(glue.call("semanticMemory.new", &[]));
    let tpc = glue.to_robot();
    value(glue.call("semanticMemory.subscribeToLearnedBehaviors", &[mem, db]));

    let teaching = glue.parse("to greet means to say hello", tpc, mem, db);
    let en = glue.host.locale("en");
    let executor = glue.host.recorder();
    let annotation = value(glue.call("onsem.react", &[teaching, en, mem, db, executor]));
    assert_eq!(glue.read_string(annotation), "teaching_feedback");

    let facts = value(glue.call("semanticMemory.flushFactsToAdd", &[mem]));
    assert_eq!(
        glue.host.object(facts),
        Some(HostObject::StrArray(vec!["robot_learnt_a_behavior".to_string()]))
    );
    let variables = value(glue.call("semanticMemory.flushVariablesToValue", &[mem]));
    let expected: Vec<String> = [
        "comportement_appris",
        "can you greet",
        "comportement_appris_2",
        "greet",
        "comportement_appris_resultat",
        "I will say hello",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    assert_eq!(glue.host.object(variables), Some(HostObject::StrArray(expected)));

    let variables = value(glue.call("semanticMemory.flushVariablesToValue", &[mem]));
    assert_eq!(glue.host.object(variables), Some(HostObject::StrArray(Vec::new())));
}

#[test]
fn test_planner_action_reaches_the_executor() {
    let glue = Glue::new();
    let db = glue.db();
    let mem = value(glue.call("semanticMemory.new", &[]));
    let tpc = glue.to_robot();
    let en = glue.host.locale("en");

    let trigger = glue.host.string("dance");
    let kind = glue.host.string("action");
    let id = glue.host.string("dance_42");
    let parameters = glue.host.string_list_map(&[("speed", &["how fast?"])]);
    value(glue.call(
        "triggers.addPlannerAction",
        &[trigger, kind, id, parameters, en, mem, db],
    ));

    let order = glue.parse("Dance", tpc, mem, db);
    let executor = glue.host.recorder();
    let annotation = value(glue.call("onsem.reactFromTrigger", &[order, en, mem, db, executor]));
    assert_eq!(glue.read_string(annotation), "behavior");
    assert_eq!(
        glue.host.recorded_calls(executor),
        vec![RecordedCall {
            method: "onResource".to_string(),
            args: vec!["action".to_string(), "dance_42".to_string()],
        }]
    );
}

#[test]
fn test_executor_must_be_an_object() {
    let glue = Glue::new();
    let db = glue.db();
    let mem = value(glue.call("semanticMemory.new", &[]));
    let en = glue.host.locale("en");
    let text = glue.host.string("say hi");
    let msg = error(glue.call("onsem.executeRobotStr", &[text, en, mem, db, HostValue::i32(3)]));
    assert!(msg.starts_with("Argument error"), "{}", msg);
}

#[test]
fn test_small_services() {
    let glue = Glue::new();
    let db = glue.db();

    let text = glue.host.string("je suis content");
    let locale = value(glue.call("onsem.getLocaleFromText", &[text, db]));
    assert_eq!(glue.read_string(locale), "fr");

    let name = glue.host.string("Paul Dupont");
    assert_eq!(value(glue.call("onsem.isAProperNoun", &[name, db])).as_bool(), Some(true));

    let replacer = value(glue.call("stringReplacer.new", &[HostValue::bool(false), HostValue::bool(true)]));
    let pattern = glue.host.string("hi");
    let output = glue.host.string("hello");
    value(glue.call("stringReplacer.addPattern", &[replacer, pattern, output]));
    let input = glue.host.string("hi this is Hi");
    let replaced = value(glue.call("stringReplacer.replace", &[replacer, input]));
    assert_eq!(glue.read_string(replaced), "hello this is hello");
    value(glue.call("stringReplacer.delete", &[replacer]));

    let count = value(glue.call("linguisticDatabase.count", &[]));
    assert_eq!(count.as_i32(), Some(1));
    value(glue.call("linguisticDatabase.delete", &[db]));

    let report = value(glue.call("onsem.leakReport", &[]));
    assert_eq!(glue.read_string(report), "");
}

#[test]
fn test_recommendations_through_the_boundary() {
    let glue = Glue::new();
    let db = glue.db();
    let mem = value(glue.call("semanticMemory.new", &[]));
    let tpc = glue.to_robot();
    let en = glue.host.locale("en");
    let container = value(glue.call("recommendations.new", &[db]));
    for (text, id) in [("play some music", "music"), ("tell me a joke", "joke")] {
        let text = glue.host.string(text);
        let id = glue.host.string(id);
        value(glue.call("recommendations.add", &[container, text, id, en, db]));
    }
    let query = glue.parse("tell me something", tpc, mem, db);
    let ids = value(glue.call("recommendations.get", &[container, query, db]));
    assert_eq!(glue.host.object(ids), Some(HostObject::StrArray(vec!["joke".to_string()])));
}

/// Host that cannot allocate handle-bearing objects
struct NoHandleObjects(InMemoryHost);

impl HostContext for NoHandleObjects {
    fn environment_id(&self) -> EnvironmentId {
        self.0.environment_id()
    }

    fn read_string(&self, val: HostValue) -> BridgeResult<String> {
        self.0.read_string(val)
    }

    fn create_string(&self, s: &str) -> BridgeResult<HostValue> {
        self.0.create_string(s)
    }

    fn read_string_array(&self, val: HostValue) -> BridgeResult<Vec<String>> {
        self.0.read_string_array(val)
    }

    fn create_string_array(&self, items: &[String]) -> BridgeResult<HostValue> {
        self.0.create_string_array(items)
    }

    fn read_string_list_map(&self, val: HostValue) -> BridgeResult<BTreeMap<String, Vec<String>>> {
        self.0.read_string_list_map(val)
    }

    fn handle_of(&self, val: HostValue) -> BridgeResult<Handle> {
        self.0.handle_of(val)
    }

    fn new_handle_object(&self, _class: &str, _handle: Handle) -> BridgeResult<HostValue> {
        Err(BridgeError::Host("out of memory".to_string()))
    }

    fn enum_constant_ordinal(&self, class: &str, constant: &str) -> BridgeResult<Option<i32>> {
        self.0.enum_constant_ordinal(class, constant)
    }

    fn enum_constant_count(&self, class: &str) -> BridgeResult<usize> {
        self.0.enum_constant_count(class)
    }

    fn ordinal_of(&self, val: HostValue) -> BridgeResult<i32> {
        self.0.ordinal_of(val)
    }

    fn locale_language(&self, val: HostValue) -> BridgeResult<String> {
        self.0.locale_language(val)
    }

    fn call_method(&self, receiver: HostValue, method: &str, args: &[HostValue]) -> BridgeResult<HostValue> {
        self.0.call_method(receiver, method, args)
    }
}

#[test]
fn test_failed_wrapping_releases_the_new_object() {
    let (registry, onsem) = dispatcher();
    let host = NoHandleObjects(declared_host(9));
    let call = |name: &str, args: &[HostValue]| registry.call(name, &host, args);

    let locales = host.0.strings(&["en"]);
    let root = host.0.string("/linguistic");
    let db = value(call("linguisticDatabase.new", &[locales, root]));
    let mem = value(call("semanticMemory.new", &[]));
    let en = host.0.locale("en");
    let labels = host.0.strings(&[]);
    let tpc = value(call("textProcessingContext.new", &[HostValue::bool(true), en, labels]));
    let before = onsem.leak_report();

    let text = host.0.string("Who likes chocolate?");
    let source = host.0.enum_constant(class::SOURCE, "ASR").unwrap();
    assert_eq!(
        error(call("semanticExpression.fromText", &[text, tpc, source, mem, db])),
        "Host error: out of memory"
    );
    assert_eq!(onsem.live_counts().expressions, 0);

    let question = onsem
        .expression_from_text("Who likes chocolate?", tpc.as_i32().unwrap(), onsem_engine::SemanticSource::Asr, 1, 1)
        .unwrap();
    let fact = onsem
        .expression_from_text("Paul likes chocolate", tpc.as_i32().unwrap(), onsem_engine::SemanticSource::Asr, 1, 1)
        .unwrap();
    let executor = host.0.recorder();
    let raw = |h: i32| HostValue::i32(h);
    error(call("onsem.inform", &[raw(fact), en, mem, db, executor]));
    error(call("onsem.informAxiom", &[raw(fact), mem, db]));
    error(call("onsem.answer", &[raw(question), mem, db]));
    error(call("onsem.notKnowing", &[raw(question), mem, db]));
    let user = host.0.string("u1");
    let full_name = host.0.string("Paul Dupont");
    error(call("semanticMemory.linkUserIdToFullName", &[mem, user, full_name, db]));

    let counts = onsem.live_counts();
    assert_eq!(counts.expression_links, 0);
    assert_eq!(counts.expressions, 2);
    onsem.delete_expression(question);
    onsem.delete_expression(fact);
    assert_eq!(onsem.leak_report(), before);
}
