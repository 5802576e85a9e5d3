//! `onsem demo`: a scripted conversation through the boundary entry points.
//!
//! The session drives the registry exactly like host glue would, with the
//! in-memory host standing in for the host runtime.

use std::path::Path;

use anyhow::{anyhow, bail};
use onsem_bridge::enums::class;
use onsem_bridge::{register_onsem, BridgeConfig, Onsem, SemanticEnumBridges};
use onsem_engine::reference::ReferenceEngine;
use onsem_sdk::testing::{HostObject, InMemoryHost};
use onsem_sdk::{HostValue, NativeCallResult, NativeFunctionRegistry};

const SCRIPT: &[&str] = &[
    "Paul likes chocolate",
    "Who likes chocolate?",
    "to greet means to say hello",
    "greet!",
    "fly!",
];

pub fn execute(config: Option<&Path>) -> anyhow::Result<()> {
    let config = match config {
        Some(path) => BridgeConfig::load(path)?,
        None => BridgeConfig::default(),
    };
    let transcript = run(config)?;
    for line in &transcript.lines {
        println!("{}", line);
    }
    if transcript.leaks.is_empty() {
        println!("no leaked objects");
    } else {
        println!("leaked:{}", transcript.leaks);
    }
    Ok(())
}

/// What the session printed and what it left behind
pub struct Transcript {
    pub lines: Vec<String>,
    pub leaks: String,
}

struct Session {
    registry: NativeFunctionRegistry,
    host: InMemoryHost,
}

impl Session {
    fn call(&self, name: &str, args: &[HostValue]) -> anyhow::Result<HostValue> {
        match self.registry.call(name, &self.host, args) {
            NativeCallResult::Value(v) => Ok(v),
            NativeCallResult::Error(msg) => bail!("{}: {}", name, msg),
            NativeCallResult::Unhandled => bail!("{} is not registered", name),
        }
    }

    fn text(&self, val: HostValue) -> anyhow::Result<String> {
        match self.host.object(val) {
            Some(HostObject::Str(s)) => Ok(s),
            other => Err(anyhow!("expected a string, got {:?}", other)),
        }
    }

    fn strings(&self, val: HostValue) -> anyhow::Result<Vec<String>> {
        match self.host.object(val) {
            Some(HostObject::StrArray(items)) => Ok(items),
            other => Err(anyhow!("expected a string array, got {:?}", other)),
        }
    }
}

pub fn run(config: BridgeConfig) -> anyhow::Result<Transcript> {
    let onsem = Onsem::shared(ReferenceEngine::new(), config);
    let mut registry = NativeFunctionRegistry::new();
    register_onsem(&mut registry, onsem);

    let host = InMemoryHost::new();
    for (enum_class, constants) in SemanticEnumBridges::declarations() {
        host.declare_enum(enum_class, &constants);
    }
    let s = Session { registry, host };

    let locales = s.host.strings(&["en", "fr"]);
    let root = s.host.string("/usr/share/linguistic");
    let db = s.call("linguisticDatabase.new", &[locales, root])?;
    let mem = s.call("semanticMemory.new", &[])?;
    let en = s.host.locale("en");
    let labels = s.host.strings(&[]);
    let tpc = s.call("textProcessingContext.new", &[HostValue::bool(true), en, labels])?;
    let source = s.host.enum_constant(class::SOURCE, "ASR")?;

    s.call("semanticMemory.subscribeToLearnedBehaviors", &[mem, db])?;
    s.call("onsem.learnSayCommand", &[mem, db])?;
    s.call("onsem.allowToInformTheUserHowToTeach", &[mem])?;

    let mut lines = Vec::new();
    for text in SCRIPT {
        tracing::debug!(text, "user says");
        lines.push(format!("> {}", text));
        let said = s.host.string(text);
        let expr = s.call("semanticExpression.fromText", &[said, tpc, source, mem, db])?;
        let executor = s.host.recorder();
        let annotation = s.call("onsem.react", &[expr, en, mem, db, executor])?;
        let annotation = s.text(annotation)?;
        for call in s.host.recorded_calls(executor) {
            lines.push(format!("< {} [{}]", call.args.join(" "), annotation));
        }
        s.call("semanticExpression.delete", &[expr])?;

        let facts = s.call("semanticMemory.flushFactsToAdd", &[mem])?;
        for fact in s.strings(facts)? {
            let variables = s.call("semanticMemory.flushVariablesToValue", &[mem])?;
            let variables = s.strings(variables)?;
            lines.push(format!("  {} {}", fact, variables.join(" ")));
        }
    }

    s.call("textProcessingContext.delete", &[tpc])?;
    s.call("semanticMemory.delete", &[mem])?;
    s.call("linguisticDatabase.delete", &[db])?;
    let leaks = s.call("onsem.leakReport", &[])?;
    Ok(Transcript {
        lines,
        leaks: s.text(leaks)?,
    })
}
