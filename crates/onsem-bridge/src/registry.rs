//! Symbolic native function registry for the onsem bridge
//!
//! Registers every boundary entry point by symbolic name
//! (e.g., "semanticMemory.new", "onsem.react") into a
//! `NativeFunctionRegistry`. Each handler runs behind [`guard`], so the
//! host only ever receives a value or an error message.

use std::sync::Arc;

use onsem_engine::SemanticEngine;
use onsem_sdk::{Args, BridgeResult, HostValue, NativeFunctionRegistry};

use crate::guard::guard;
use crate::Onsem;

type EntryFn<E> = fn(&Onsem<E>, Args<'_>) -> BridgeResult<HostValue>;

/// Register all onsem entry points into the given registry.
pub fn register_onsem<E: SemanticEngine>(registry: &mut NativeFunctionRegistry, onsem: Arc<Onsem<E>>) {
    register_linguistic_database(registry, &onsem);
    register_text_processing_context(registry, &onsem);
    register_semantic_memory(registry, &onsem);
    register_semantic_expression(registry, &onsem);
    register_operations(registry, &onsem);
    register_triggers(registry, &onsem);
    register_recommendations(registry, &onsem);
    register_string_replacer(registry, &onsem);
}

fn entry<E: SemanticEngine>(
    registry: &mut NativeFunctionRegistry,
    onsem: &Arc<Onsem<E>>,
    name: &'static str,
    body: EntryFn<E>,
) {
    let onsem = onsem.clone();
    registry.register(name, move |ctx, args| {
        guard(name, || body(&onsem, Args::new(ctx, name, args)))
    });
}

fn register_linguistic_database<E: SemanticEngine>(registry: &mut NativeFunctionRegistry, onsem: &Arc<Onsem<E>>) {
    entry(registry, onsem, "linguisticDatabase.new", crate::linguistic_database::new);
    entry(registry, onsem, "linguisticDatabase.delete", crate::linguistic_database::delete);
    entry(registry, onsem, "linguisticDatabase.count", crate::linguistic_database::count);
}

fn register_text_processing_context<E: SemanticEngine>(registry: &mut NativeFunctionRegistry, onsem: &Arc<Onsem<E>>) {
    entry(registry, onsem, "textProcessingContext.new", crate::text_context::new);
    entry(registry, onsem, "textProcessingContext.delete", crate::text_context::delete);
}

fn register_semantic_memory<E: SemanticEngine>(registry: &mut NativeFunctionRegistry, onsem: &Arc<Onsem<E>>) {
    entry(registry, onsem, "semanticMemory.new", crate::memory::new);
    entry(registry, onsem, "semanticMemory.delete", crate::memory::delete);
    entry(registry, onsem, "semanticMemory.linkSubMemory", crate::memory::link_sub_memory);
    entry(registry, onsem, "semanticMemory.setCurrentUserId", crate::memory::set_current_user_id);
    entry(registry, onsem, "semanticMemory.getCurrentUserId", crate::memory::get_current_user_id);
    entry(registry, onsem, "semanticMemory.clearLocalInformation", crate::memory::clear_local_information);
    entry(registry, onsem, "semanticMemory.linkUserIdToFullName", crate::memory::link_user_id_to_full_name);
    entry(registry, onsem, "semanticMemory.subscribeToLearnedBehaviors", crate::memory::subscribe_to_learned_behaviors);
    entry(registry, onsem, "semanticMemory.flushFactsToAdd", crate::memory::flush_facts_to_add);
    entry(registry, onsem, "semanticMemory.flushVariablesToValue", crate::memory::flush_variables_to_value);
}

fn register_semantic_expression<E: SemanticEngine>(registry: &mut NativeFunctionRegistry, onsem: &Arc<Onsem<E>>) {
    entry(registry, onsem, "semanticExpression.fromText", crate::expression::from_text);
    entry(registry, onsem, "semanticExpression.toText", crate::expression::to_text);
    entry(registry, onsem, "semanticExpression.delete", crate::expression::delete);
    entry(registry, onsem, "expressionHandleInMemory.delete", crate::expression::delete_link);
}

fn register_operations<E: SemanticEngine>(registry: &mut NativeFunctionRegistry, onsem: &Arc<Onsem<E>>) {
    entry(registry, onsem, "onsem.inform", crate::operations::inform);
    entry(registry, onsem, "onsem.informAxiom", crate::operations::inform_axiom);
    entry(registry, onsem, "onsem.react", crate::operations::react);
    entry(registry, onsem, "onsem.reactFromTrigger", crate::operations::react_from_trigger);
    entry(registry, onsem, "onsem.forget", crate::operations::forget);
    entry(registry, onsem, "onsem.notKnowing", crate::operations::not_knowing);
    entry(registry, onsem, "onsem.answer", crate::operations::answer);
    entry(registry, onsem, "onsem.execute", crate::operations::execute);
    entry(registry, onsem, "onsem.executeFromTrigger", crate::operations::execute_from_trigger);
    entry(registry, onsem, "onsem.sayFeedback", crate::operations::say_feedback);
    entry(registry, onsem, "onsem.isAProperNoun", crate::operations::is_a_proper_noun);
    entry(registry, onsem, "onsem.getLocaleFromText", crate::operations::get_locale_from_text);
    entry(registry, onsem, "onsem.executeRobotStr", crate::operations::execute_robot_str);
    entry(registry, onsem, "onsem.learnSayCommand", crate::operations::learn_say_command);
    entry(
        registry,
        onsem,
        "onsem.allowToInformTheUserHowToTeach",
        crate::operations::allow_to_inform_the_user_how_to_teach,
    );
    entry(registry, onsem, "onsem.leakReport", crate::diagnostics::leak_report);
}

fn register_triggers<E: SemanticEngine>(registry: &mut NativeFunctionRegistry, onsem: &Arc<Onsem<E>>) {
    entry(registry, onsem, "triggers.add", crate::triggers::add);
    entry(registry, onsem, "triggers.addToAResource", crate::triggers::add_to_a_resource);
    entry(registry, onsem, "triggers.addPlannerAction", crate::triggers::add_planner_action);
}

fn register_recommendations<E: SemanticEngine>(registry: &mut NativeFunctionRegistry, onsem: &Arc<Onsem<E>>) {
    entry(registry, onsem, "recommendations.new", crate::recommendations::new);
    entry(registry, onsem, "recommendations.delete", crate::recommendations::delete);
    entry(registry, onsem, "recommendations.add", crate::recommendations::add);
    entry(registry, onsem, "recommendations.get", crate::recommendations::get);
}

fn register_string_replacer<E: SemanticEngine>(registry: &mut NativeFunctionRegistry, onsem: &Arc<Onsem<E>>) {
    entry(registry, onsem, "stringReplacer.new", crate::replacer::new);
    entry(registry, onsem, "stringReplacer.addPattern", crate::replacer::add_pattern);
    entry(registry, onsem, "stringReplacer.replace", crate::replacer::replace);
    entry(registry, onsem, "stringReplacer.delete", crate::replacer::delete);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BridgeConfig;
    use onsem_engine::reference::ReferenceEngine;

    #[test]
    fn test_every_entry_point_is_registered() {
        let mut registry = NativeFunctionRegistry::new();
        register_onsem(&mut registry, Onsem::shared(ReferenceEngine::new(), BridgeConfig::default()));
        assert_eq!(registry.len(), 46);
        for name in [
            "linguisticDatabase.count",
            "semanticMemory.flushVariablesToValue",
            "expressionHandleInMemory.delete",
            "onsem.leakReport",
            "triggers.addPlannerAction",
            "stringReplacer.replace",
        ] {
            assert!(registry.contains(name), "{} is not registered", name);
        }
    }
}
