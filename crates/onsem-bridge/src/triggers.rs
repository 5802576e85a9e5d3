//! Triggers: fixed answers to given sentences

use std::collections::BTreeMap;

use onsem_engine::{Language, ResourceRequest, SemanticEngine, TextDirection, TriggerAnswer};
use onsem_sdk::{Args, BridgeResult, Handle, HostValue};

use crate::memory::MemoryEntry;
use crate::{language_from_iso, Onsem};

impl<E: SemanticEngine> Onsem<E> {
    /// Answer `trigger` with the robot saying `answer`
    pub fn add_trigger(&self, trigger: &str, answer: &str, language: Language, mem: Handle, db: Handle) -> BridgeResult<()> {
        self.with_registries(|regs| -> BridgeResult<()> {
            let db = regs.databases.get(db)?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            let trigger = self.parse_detached(db, trigger, TextDirection::ToRobot, language)?;
            let answer = self.parse_detached(db, answer, TextDirection::FromRobot, language)?;
            Ok(self
                .engine()
                .add_trigger(trigger, TriggerAnswer::Expression(answer), scope, db)?)
        })
    }

    /// Answer `trigger` by running a resource
    #[allow(clippy::too_many_arguments)]
    pub fn add_trigger_to_resource(
        &self,
        trigger: &str,
        resource_type: &str,
        resource_id: &str,
        parameters: BTreeMap<String, Vec<String>>,
        language: Language,
        mem: Handle,
        db: Handle,
    ) -> BridgeResult<()> {
        let resource = ResourceRequest {
            label: resource_type.to_string(),
            value: resource_id.to_string(),
            language: Some(language),
            parameters,
        };
        self.with_registries(|regs| -> BridgeResult<()> {
            let db = regs.databases.get(db)?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            let trigger = self.parse_detached(db, trigger, TextDirection::ToRobot, language)?;
            Ok(self
                .engine()
                .add_trigger(trigger, TriggerAnswer::Resource(resource), scope, db)?)
        })
    }

    /// Teach the memory that the order `trigger` runs the planner action
    /// `action_id`. An empty trigger teaches nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn add_planner_action(
        &self,
        trigger: &str,
        it_is_an_action_id: &str,
        action_id: &str,
        parameters: BTreeMap<String, Vec<String>>,
        language: Language,
        mem: Handle,
        db: Handle,
    ) -> BridgeResult<()> {
        let action = ResourceRequest {
            label: it_is_an_action_id.to_string(),
            value: action_id.to_string(),
            language: Some(language),
            parameters,
        };
        self.with_registries(|regs| -> BridgeResult<()> {
            let db = regs.databases.get(db)?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            if trigger.is_empty() {
                return Ok(());
            }
            let trigger = self.parse_detached(db, trigger, TextDirection::ToRobot, language)?;
            Ok(self.engine().add_planner_action(trigger, action, scope, db)?)
        })
    }
}

// ============================================================================
// Entry points
// ============================================================================

pub(crate) fn add<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(5)?;
    let trigger = args.string(0)?;
    let answer = args.string(1)?;
    let language = language_from_iso(&args.locale(2)?)?;
    onsem.add_trigger(&trigger, &answer, language, args.handle(3)?, args.handle(4)?)?;
    Ok(HostValue::null())
}

pub(crate) fn add_to_a_resource<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(7)?;
    let trigger = args.string(0)?;
    let resource_type = args.string(1)?;
    let resource_id = args.string(2)?;
    let parameters = args.string_list_map(3)?;
    let language = language_from_iso(&args.locale(4)?)?;
    onsem.add_trigger_to_resource(
        &trigger,
        &resource_type,
        &resource_id,
        parameters,
        language,
        args.handle(5)?,
        args.handle(6)?,
    )?;
    Ok(HostValue::null())
}

pub(crate) fn add_planner_action<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(7)?;
    let trigger = args.string(0)?;
    let it_is_an_action_id = args.string(1)?;
    let action_id = args.string(2)?;
    let parameters = args.string_list_map(3)?;
    let language = language_from_iso(&args.locale(4)?)?;
    onsem.add_planner_action(
        &trigger,
        &it_is_an_action_id,
        &action_id,
        parameters,
        language,
        args.handle(5)?,
        args.handle(6)?,
    )?;
    Ok(HostValue::null())
}
