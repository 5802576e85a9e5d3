//! Many host threads sharing one bridge

mod common;

use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Barrier, Mutex};
use std::thread;

use common::{declared_host, Recorder, TestOnsem};
use onsem_bridge::{BridgeConfig, Onsem};
use onsem_engine::reference::ReferenceEngine;
use onsem_engine::{Language, SemanticSource};
use onsem_sdk::BridgeError;
use tracing::Dispatch;

fn shared() -> Arc<TestOnsem> {
    Onsem::shared(ReferenceEngine::new(), BridgeConfig::default())
}

#[test]
fn test_handles_stay_unique_across_threads() {
    let onsem = shared();
    let workers: Vec<_> = (0..8)
        .map(|_| {
            let onsem = onsem.clone();
            thread::spawn(move || (0..50).map(|_| onsem.new_memory()).collect::<Vec<_>>())
        })
        .collect();
    let mut seen = HashSet::new();
    for worker in workers {
        for handle in worker.join().unwrap() {
            assert!(seen.insert(handle), "handle {} handed out twice", handle);
        }
    }
    assert_eq!(seen.len(), 400);
    assert_eq!(seen.iter().min(), Some(&1));
    assert_eq!(seen.iter().max(), Some(&400));

    let handles: Vec<_> = seen.into_iter().collect();
    let workers: Vec<_> = handles
        .chunks(50)
        .map(|chunk| {
            let onsem = onsem.clone();
            let chunk = chunk.to_vec();
            thread::spawn(move || {
                for handle in chunk {
                    onsem.delete_memory(handle);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(onsem.live_counts().memories, 0);
    assert_eq!(onsem.new_memory(), 1);
}

#[test]
fn test_flush_while_learning_loses_nothing() {
    const TEACHINGS: usize = 40;

    let onsem = shared();
    let db = onsem.new_linguistic_database(&[Language::English], "/linguistic").unwrap();
    let mem = onsem.new_memory();
    let tpc = onsem.new_text_processing_context(true, Language::English, Vec::new());
    onsem.subscribe_to_learned_behaviors(mem, db).unwrap();

    let learner = {
        let onsem = onsem.clone();
        thread::spawn(move || {
            for i in 0..TEACHINGS {
                let text = format!("to move{} means to say step {}", i, i);
                let expr = onsem
                    .expression_from_text(&text, tpc, SemanticSource::Asr, mem, db)
                    .unwrap();
                onsem
                    .react(expr, Language::English, mem, db, &mut Recorder::default())
                    .unwrap();
                onsem.delete_expression(expr);
            }
        })
    };
    let flusher = {
        let onsem = onsem.clone();
        thread::spawn(move || {
            let mut facts = 0;
            let mut variables = 0;
            for _ in 0..TEACHINGS {
                facts += onsem.flush_facts_to_add(mem).unwrap().len();
                variables += onsem.flush_variables_to_value(mem).unwrap().len();
                thread::yield_now();
            }
            (facts, variables)
        })
    };

    learner.join().unwrap();
    let (mut facts, mut variables) = flusher.join().unwrap();
    facts += onsem.flush_facts_to_add(mem).unwrap().len();
    variables += onsem.flush_variables_to_value(mem).unwrap().len();

    // Facts pile up; variables are overwritten by the latest behaviour
    assert_eq!(facts, TEACHINGS);
    assert!(variables >= 3);
}

#[test]
fn test_enum_bridges_built_once_per_environment() {
    let onsem = shared();
    let host = Arc::new(declared_host(3));
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let onsem = onsem.clone();
            let host = host.clone();
            thread::spawn(move || onsem.enum_bridges(host.as_ref()).unwrap())
        })
        .collect();
    let bridges: Vec<_> = workers.into_iter().map(|w| w.join().unwrap()).collect();
    for bridge in &bridges[1..] {
        assert!(Arc::ptr_eq(&bridges[0], bridge));
    }
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_enum_bridges_ready_logged_once() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let dispatch = Dispatch::new(
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish(),
    );

    let onsem = shared();
    let host = Arc::new(declared_host(4));
    let start = Arc::new(Barrier::new(8));
    let workers: Vec<_> = (0..8)
        .map(|_| {
            let onsem = onsem.clone();
            let host = host.clone();
            let start = start.clone();
            let dispatch = dispatch.clone();
            thread::spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || {
                    start.wait();
                    onsem.enum_bridges(host.as_ref()).unwrap();
                })
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert_eq!(output.matches("enum bridges ready").count(), 1, "{}", output);
}

#[test]
fn test_reads_during_create_and_delete_see_whole_memories() {
    const ROUNDS: usize = 200;
    const HANDLES: i32 = 8;

    let onsem = shared();
    let writers: Vec<_> = (0..4)
        .map(|_| {
            let onsem = onsem.clone();
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    let mem = onsem.new_memory();
                    onsem.set_current_user_id(mem, &format!("user-{}", mem)).unwrap();
                    thread::yield_now();
                    onsem.delete_memory(mem);
                }
            })
        })
        .collect();
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let onsem = onsem.clone();
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    for mem in 1..=HANDLES {
                        match onsem.current_user_id(mem) {
                            Ok(user) => assert!(
                                user.is_empty() || user == format!("user-{}", mem),
                                "memory {} answered {:?}",
                                mem,
                                user
                            ),
                            Err(err) => assert_eq!(
                                err,
                                BridgeError::NotFound {
                                    registry: "semantic memory",
                                    handle: mem
                                }
                            ),
                        }
                    }
                }
            })
        })
        .collect();

    for worker in writers.into_iter().chain(readers) {
        worker.join().unwrap();
    }
    assert_eq!(onsem.live_counts().memories, 0);
}
