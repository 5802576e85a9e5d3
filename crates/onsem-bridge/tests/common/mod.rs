//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use onsem_bridge::{register_onsem, BridgeConfig, Onsem, SemanticEnumBridges};
use onsem_engine::reference::ReferenceEngine;
use onsem_engine::{EngineResult, Executor, Language};
use onsem_sdk::testing::InMemoryHost;
use onsem_sdk::{EnvironmentId, Handle, HostValue, NativeCallResult, NativeFunctionRegistry};

pub type TestOnsem = Onsem<ReferenceEngine>;

pub fn onsem() -> TestOnsem {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Onsem::new(ReferenceEngine::new(), BridgeConfig::default())
}

/// Memory and database ready for operations
pub struct Session {
    pub onsem: TestOnsem,
    pub db: Handle,
    pub mem: Handle,
    pub to_robot: Handle,
}

impl Session {
    pub fn new() -> Self {
        let onsem = onsem();
        let db = onsem
            .new_linguistic_database(&[Language::English, Language::French], "/linguistic")
            .unwrap();
        let mem = onsem.new_memory();
        let to_robot = onsem.new_text_processing_context(true, Language::English, Vec::new());
        Self {
            onsem,
            db,
            mem,
            to_robot,
        }
    }

    pub fn parse(&self, text: &str) -> Handle {
        self.onsem
            .expression_from_text(text, self.to_robot, onsem_engine::SemanticSource::WrittenText, self.mem, self.db)
            .unwrap()
    }

    pub fn say(&self, text: &str) -> (String, Recorder) {
        let expr = self.parse(text);
        let mut recorder = Recorder::default();
        let annotation = self
            .onsem
            .react(expr, Language::English, self.mem, self.db, &mut recorder)
            .unwrap();
        self.onsem.delete_expression(expr);
        (annotation, recorder)
    }
}

/// Executor remembering what it was asked to do
#[derive(Debug, Default)]
pub struct Recorder {
    pub said: Vec<String>,
    pub resources: Vec<(String, String)>,
}

impl Executor for Recorder {
    fn on_text_to_say(&mut self, text: &str) -> EngineResult<()> {
        self.said.push(text.to_string());
        Ok(())
    }

    fn on_resource(&mut self, label: &str, value: &str) -> EngineResult<()> {
        self.resources.push((label.to_string(), value.to_string()));
        Ok(())
    }
}

/// In-memory host declaring every bridged enum in canonical order
pub fn declared_host(env: u64) -> InMemoryHost {
    let host = InMemoryHost::with_environment(EnvironmentId(env));
    for (class, constants) in SemanticEnumBridges::declarations() {
        host.declare_enum(class, &constants);
    }
    host
}

/// Entry point registry over a fresh context
pub fn dispatcher() -> (NativeFunctionRegistry, Arc<TestOnsem>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let onsem = Onsem::shared(ReferenceEngine::new(), BridgeConfig::default());
    let mut registry = NativeFunctionRegistry::new();
    register_onsem(&mut registry, onsem.clone());
    (registry, onsem)
}

pub fn value(result: NativeCallResult) -> HostValue {
    match result {
        NativeCallResult::Value(v) => v,
        other => panic!("call failed: {:?}", other),
    }
}

pub fn error(result: NativeCallResult) -> String {
    match result {
        NativeCallResult::Error(msg) => msg,
        other => panic!("call succeeded: {:?}", other),
    }
}
