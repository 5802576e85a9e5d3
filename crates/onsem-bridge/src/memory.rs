//! Semantic memories
//!
//! A memory entry bundles the engine's memory with what the host attached
//! to it: a subordinate memory consulted on reads, and the learned-behaviour
//! subscription feeding the accumulation buffer the host drains with the
//! flush calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use onsem_engine::{LearnedBehavior, MemoryScope, SemanticEngine};
use onsem_sdk::{Args, BridgeError, BridgeResult, Handle, HostValue};
use parking_lot::Mutex;

use crate::expression::wrap_or_release;
use crate::handles::Registry;
use crate::{Onsem, EXPRESSION_HANDLE_IN_MEMORY_CLASS};

/// Fact pushed when the memory learned a behaviour
pub const LEARNED_BEHAVIOR_FACT: &str = "robot_learnt_a_behavior";
/// Variable holding the first formulation of the learned behaviour
pub const LEARNED_BEHAVIOR_VAR: &str = "comportement_appris";
/// Variable holding the alternative formulation
pub const LEARNED_BEHAVIOR_ALTERNATIVE_VAR: &str = "comportement_appris_2";
/// Variable holding what the behaviour will do
pub const LEARNED_BEHAVIOR_RESULT_VAR: &str = "comportement_appris_resultat";

/// What a memory accumulated for the host since the last flush
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulatedFacts {
    /// Facts to add, in arrival order
    pub facts: Vec<String>,
    /// Variables to value
    pub variables: BTreeMap<String, String>,
}

impl AccumulatedFacts {
    fn record(&mut self, learned: LearnedBehavior) {
        self.facts.push(LEARNED_BEHAVIOR_FACT.to_string());
        self.variables
            .insert(LEARNED_BEHAVIOR_VAR.to_string(), learned.formulation);
        self.variables
            .insert(LEARNED_BEHAVIOR_ALTERNATIVE_VAR.to_string(), learned.alternative_formulation);
        self.variables
            .insert(LEARNED_BEHAVIOR_RESULT_VAR.to_string(), learned.future_result);
    }
}

/// A memory and everything the host attached to it
pub struct MemoryEntry<E: SemanticEngine> {
    subscription: Option<E::Subscription>,
    pub(crate) memory: E::Memory,
    sub_memory: Option<Handle>,
    buffer: Arc<Mutex<AccumulatedFacts>>,
}

impl<E: SemanticEngine> MemoryEntry<E> {
    fn new(memory: E::Memory) -> Self {
        Self {
            subscription: None,
            memory,
            sub_memory: None,
            buffer: Arc::new(Mutex::new(AccumulatedFacts::default())),
        }
    }

    /// The engine's memory
    pub fn memory(&self) -> &E::Memory {
        &self.memory
    }

    /// Handle of the linked subordinate memory
    pub fn sub_memory(&self) -> Option<Handle> {
        self.sub_memory
    }

    /// Whether a learned-behaviour subscription is live
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Borrow the memory behind `handle` together with its subordinate
    /// memory
    pub fn scope(memories: &mut Registry<Self>, handle: Handle) -> BridgeResult<MemoryScope<'_, E::Memory>> {
        let sub_handle = memories.get(handle)?.sub_memory;
        let (entry, sub) = memories.get_mut_with(handle, sub_handle)?;
        if sub_handle.is_some() && sub.is_none() {
            tracing::debug!(handle, sub = ?sub_handle, "subordinate memory is gone");
        }
        Ok(MemoryScope {
            memory: &mut entry.memory,
            sub: sub.map(|s| &s.memory),
        })
    }
}

impl<E: SemanticEngine> Onsem<E> {
    /// Create an empty memory
    pub fn new_memory(&self) -> Handle {
        let memory = self.engine().new_memory();
        self.with_registries(|regs| regs.memories.insert(MemoryEntry::new(memory)))
    }

    /// Delete a memory; links pointing at it from other memories are cut
    pub fn delete_memory(&self, handle: Handle) {
        self.with_registries(|regs| {
            if regs.memories.remove(handle).is_none() {
                return;
            }
            for (_, entry) in regs.memories.iter_mut() {
                if entry.sub_memory == Some(handle) {
                    entry.sub_memory = None;
                }
            }
        })
    }

    /// Let `main` consult `sub` on reads
    pub fn link_sub_memory(&self, main: Handle, sub: Handle) -> BridgeResult<()> {
        if main == sub {
            return Err(BridgeError::InvalidArgument(format!(
                "semantic memory {} cannot be its own sub memory",
                main
            )));
        }
        self.with_registries(|regs| -> BridgeResult<()> {
            regs.memories.get(sub)?;
            regs.memories.get_mut(main)?.sub_memory = Some(sub);
            Ok(())
        })
    }

    /// Set the id of the user currently talking
    pub fn set_current_user_id(&self, mem: Handle, user_id: &str) -> BridgeResult<()> {
        self.with_registries(|regs| -> BridgeResult<()> {
            let entry = regs.memories.get_mut(mem)?;
            self.engine().set_current_user_id(&mut entry.memory, user_id);
            Ok(())
        })
    }

    /// Id of the user currently talking
    pub fn current_user_id(&self, mem: Handle) -> BridgeResult<String> {
        self.with_registries(|regs| -> BridgeResult<String> {
            let entry = regs.memories.get(mem)?;
            Ok(self.engine().current_user_id(&entry.memory))
        })
    }

    /// Forget what the memory stored itself; the subordinate memory is
    /// untouched
    pub fn clear_local_information(&self, mem: Handle) -> BridgeResult<()> {
        self.with_registries(|regs| -> BridgeResult<()> {
            let entry = regs.memories.get_mut(mem)?;
            self.engine().clear_local_information(&mut entry.memory);
            Ok(())
        })
    }

    /// Teach the memory the full name of a user and return the link to the
    /// stored information
    pub fn link_user_id_to_full_name(
        &self,
        mem: Handle,
        user_id: &str,
        full_name: &str,
        db: Handle,
    ) -> BridgeResult<Handle> {
        let names: Vec<String> = full_name.split_whitespace().map(str::to_string).collect();
        self.with_registries(|regs| -> BridgeResult<Handle> {
            let db = regs.databases.get(db)?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            let link = self.engine().link_user_id_to_full_name(scope, user_id, &names, db)?;
            regs.expression_links.insert_present(link, "ExpressionHandleInMemory")
        })
    }

    /// Accumulate every behaviour the memory learns from now on.
    ///
    /// Subscribing again replaces the previous subscription.
    pub fn subscribe_to_learned_behaviors(&self, mem: Handle, db: Handle) -> BridgeResult<()> {
        self.with_registries(|regs| -> BridgeResult<()> {
            let db = regs.databases.get(db)?;
            let entry = regs.memories.get_mut(mem)?;
            entry.subscription = None;
            let buffer = entry.buffer.clone();
            let sink = Box::new(move |learned: LearnedBehavior| buffer.lock().record(learned));
            entry.subscription = Some(self.engine().subscribe_to_learned_behaviors(&mut entry.memory, db, sink));
            Ok(())
        })
    }

    /// Take the facts accumulated since the last flush
    pub fn flush_facts_to_add(&self, mem: Handle) -> BridgeResult<Vec<String>> {
        self.with_registries(|regs| -> BridgeResult<Vec<String>> {
            let entry = regs.memories.get(mem)?;
            let facts = std::mem::take(&mut entry.buffer.lock().facts);
            Ok(facts)
        })
    }

    /// Take the variables accumulated since the last flush
    pub fn flush_variables_to_value(&self, mem: Handle) -> BridgeResult<BTreeMap<String, String>> {
        self.with_registries(|regs| -> BridgeResult<BTreeMap<String, String>> {
            let entry = regs.memories.get(mem)?;
            let variables = std::mem::take(&mut entry.buffer.lock().variables);
            Ok(variables)
        })
    }
}

// ============================================================================
// Entry points
// ============================================================================

pub(crate) fn new<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(0)?;
    Ok(HostValue::handle(onsem.new_memory()))
}

pub(crate) fn delete<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(1)?;
    onsem.delete_memory(args.handle(0)?);
    Ok(HostValue::null())
}

pub(crate) fn link_sub_memory<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(2)?;
    onsem.link_sub_memory(args.handle(0)?, args.handle(1)?)?;
    Ok(HostValue::null())
}

pub(crate) fn set_current_user_id<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(2)?;
    onsem.set_current_user_id(args.handle(0)?, &args.string(1)?)?;
    Ok(HostValue::null())
}

pub(crate) fn get_current_user_id<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(1)?;
    let user_id = onsem.current_user_id(args.handle(0)?)?;
    args.ctx().create_string(&user_id)
}

pub(crate) fn clear_local_information<E: SemanticEngine>(
    onsem: &Onsem<E>,
    args: Args<'_>,
) -> BridgeResult<HostValue> {
    args.expect_len(1)?;
    onsem.clear_local_information(args.handle(0)?)?;
    Ok(HostValue::null())
}

pub(crate) fn link_user_id_to_full_name<E: SemanticEngine>(
    onsem: &Onsem<E>,
    args: Args<'_>,
) -> BridgeResult<HostValue> {
    args.expect_len(4)?;
    let user_id = args.string(1)?;
    let full_name = args.string(2)?;
    let link = onsem.link_user_id_to_full_name(args.handle(0)?, &user_id, &full_name, args.handle(3)?)?;
    wrap_or_release(&args, EXPRESSION_HANDLE_IN_MEMORY_CLASS, link, |h| onsem.delete_expression_link(h))
}

pub(crate) fn subscribe_to_learned_behaviors<E: SemanticEngine>(
    onsem: &Onsem<E>,
    args: Args<'_>,
) -> BridgeResult<HostValue> {
    args.expect_len(2)?;
    onsem.subscribe_to_learned_behaviors(args.handle(0)?, args.handle(1)?)?;
    Ok(HostValue::null())
}

pub(crate) fn flush_facts_to_add<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(1)?;
    let facts = onsem.flush_facts_to_add(args.handle(0)?)?;
    args.ctx().create_string_array(&facts)
}

pub(crate) fn flush_variables_to_value<E: SemanticEngine>(
    onsem: &Onsem<E>,
    args: Args<'_>,
) -> BridgeResult<HostValue> {
    args.expect_len(1)?;
    let flat: Vec<String> = onsem
        .flush_variables_to_value(args.handle(0)?)?
        .into_iter()
        .flat_map(|(name, value)| [name, value])
        .collect();
    args.ctx().create_string_array(&flat)
}
