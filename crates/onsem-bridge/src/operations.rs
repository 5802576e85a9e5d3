//! Operations on a memory: inform, react, answer, execute and friends
//!
//! Every operation works on a copy of the expression it is given; the
//! registry's instance stays untouched and reusable.

use onsem_engine::{EngineResult, Executor, Language, SemanticEngine, SemanticTypeOfFeedback, TextDirection};
use onsem_sdk::{Args, BridgeError, BridgeResult, Handle, HostContext, HostValue};

use crate::expression::{to_host, wrap_or_release};
use crate::memory::MemoryEntry;
use crate::{language_from_iso, Onsem, EXPRESSION_HANDLE_IN_MEMORY_CLASS};

/// Executor forwarding what the robot should do to a host callback object
pub struct HostExecutor<'a> {
    ctx: &'a dyn HostContext,
    receiver: HostValue,
}

impl<'a> HostExecutor<'a> {
    /// Forward to `receiver`, which must answer `onTextToSay(text)` and
    /// `onResource(label, value)`
    pub fn new(ctx: &'a dyn HostContext, receiver: HostValue) -> BridgeResult<Self> {
        if !receiver.is_reference() {
            return Err(BridgeError::InvalidArgument(format!(
                "executor must be a host object, got {}",
                receiver.type_name()
            )));
        }
        Ok(Self { ctx, receiver })
    }
}

impl Executor for HostExecutor<'_> {
    fn on_text_to_say(&mut self, text: &str) -> EngineResult<()> {
        let text = self.ctx.create_string(text)?;
        self.ctx.call_method(self.receiver, "onTextToSay", &[text])?;
        Ok(())
    }

    fn on_resource(&mut self, label: &str, value: &str) -> EngineResult<()> {
        let label = self.ctx.create_string(label)?;
        let value = self.ctx.create_string(value)?;
        self.ctx.call_method(self.receiver, "onResource", &[label, value])?;
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Reaction {
    Full,
    TriggersOnly,
}

#[derive(Clone, Copy)]
enum Order {
    Full,
    TriggersOnly,
}

impl<E: SemanticEngine> Onsem<E> {
    /// Store an expression in memory, run the actions the memory proposes
    /// in return, and return the link to the stored expression
    pub fn inform(
        &self,
        expr: Handle,
        language: Language,
        mem: Handle,
        db: Handle,
        executor: &mut dyn Executor,
    ) -> BridgeResult<Handle> {
        self.with_registries(|regs| -> BridgeResult<Handle> {
            let db = regs.databases.get(db)?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            let expr = self.engine().clone_expression(regs.expressions.get(expr)?);
            let informed = self.engine().inform(expr, scope, db)?;
            for proposal in informed.action_proposals {
                let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
                self.engine().run(proposal, language, scope, db, executor)?;
            }
            regs.expression_links
                .insert_present(informed.link, "ExpressionHandleInMemory")
        })
    }

    /// Store an expression as an axiom
    pub fn inform_axiom(&self, expr: Handle, mem: Handle, db: Handle) -> BridgeResult<Handle> {
        self.with_registries(|regs| -> BridgeResult<Handle> {
            let db = regs.databases.get(db)?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            let expr = self.engine().clone_expression(regs.expressions.get(expr)?);
            let link = self.engine().inform_axiom(expr, scope, db)?;
            regs.expression_links.insert_present(link, "ExpressionHandleInMemory")
        })
    }

    /// React to an expression and run the reaction.
    ///
    /// Returns the contextual annotation of the reaction, empty when there
    /// is no reaction or no annotation.
    pub fn react(
        &self,
        expr: Handle,
        language: Language,
        mem: Handle,
        db: Handle,
        executor: &mut dyn Executor,
    ) -> BridgeResult<String> {
        self.react_with(Reaction::Full, expr, language, mem, db, executor)
    }

    /// Like [`Onsem::react`], considering triggers only
    pub fn react_from_trigger(
        &self,
        expr: Handle,
        language: Language,
        mem: Handle,
        db: Handle,
        executor: &mut dyn Executor,
    ) -> BridgeResult<String> {
        self.react_with(Reaction::TriggersOnly, expr, language, mem, db, executor)
    }

    fn react_with(
        &self,
        kind: Reaction,
        expr: Handle,
        language: Language,
        mem: Handle,
        db: Handle,
        executor: &mut dyn Executor,
    ) -> BridgeResult<String> {
        self.with_registries(|regs| -> BridgeResult<String> {
            let db = regs.databases.get(db)?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            let expr = self.engine().clone_expression(regs.expressions.get(expr)?);
            let reaction = match kind {
                Reaction::Full => self.engine().react(expr, scope, db)?,
                Reaction::TriggersOnly => self.engine().react_from_trigger(expr, scope, db)?,
            };
            let Some(reaction) = reaction else {
                return Ok(String::new());
            };
            let annotation = self
                .engine()
                .contextual_annotation(&reaction)
                .map(|a| a.as_str().to_string())
                .unwrap_or_default();
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            self.engine().run(reaction, language, scope, db, executor)?;
            Ok(annotation)
        })
    }

    /// Remove a stored expression from memory; the link is consumed
    pub fn forget(&self, link: Handle, mem: Handle, db: Handle) -> BridgeResult<()> {
        self.with_registries(|regs| -> BridgeResult<()> {
            let db = regs.databases.get(db)?;
            regs.memories.get(mem)?;
            let link = regs
                .expression_links
                .remove(link)
                .ok_or_else(|| BridgeError::NotFound {
                    registry: regs.expression_links.name(),
                    handle: link,
                })?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            Ok(self.engine().forget(link, scope, db)?)
        })
    }

    /// Statement that the robot does not know how to answer `expr`
    pub fn not_knowing(&self, expr: Handle, mem: Handle, db: Handle) -> BridgeResult<Option<Handle>> {
        self.with_registries(|regs| -> BridgeResult<Option<Handle>> {
            regs.databases.get(db)?;
            regs.memories.get(mem)?;
            let result = self.engine().not_knowing(regs.expressions.get(expr)?);
            Ok(result.map(|r| regs.expressions.insert(r)))
        })
    }

    /// Answer to a question, if the memory knows it
    pub fn answer(&self, expr: Handle, mem: Handle, db: Handle) -> BridgeResult<Option<Handle>> {
        self.with_registries(|regs| -> BridgeResult<Option<Handle>> {
            let db = regs.databases.get(db)?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            let expr = self.engine().clone_expression(regs.expressions.get(expr)?);
            let result = self.engine().answer(expr, scope, db)?;
            Ok(result.map(|r| regs.expressions.insert(r)))
        })
    }

    /// What to do for an order
    pub fn execute(&self, expr: Handle, mem: Handle, db: Handle) -> BridgeResult<Option<Handle>> {
        self.execute_with(Order::Full, expr, mem, db)
    }

    /// What to do for an order, considering triggers only
    pub fn execute_from_trigger(&self, expr: Handle, mem: Handle, db: Handle) -> BridgeResult<Option<Handle>> {
        self.execute_with(Order::TriggersOnly, expr, mem, db)
    }

    fn execute_with(&self, kind: Order, expr: Handle, mem: Handle, db: Handle) -> BridgeResult<Option<Handle>> {
        self.with_registries(|regs| -> BridgeResult<Option<Handle>> {
            let db = regs.databases.get(db)?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            let expr = regs.expressions.get(expr)?;
            let result = match kind {
                Order::Full => self.engine().execute(expr, scope, db)?,
                Order::TriggersOnly => self.engine().execute_from_trigger(expr, scope, db)?,
            };
            Ok(result.map(|r| regs.expressions.insert(r)))
        })
    }

    /// Feedback of the given kind about an expression
    pub fn say_feedback(
        &self,
        expr: Handle,
        kind: SemanticTypeOfFeedback,
        mem: Handle,
        db: Handle,
    ) -> BridgeResult<Option<Handle>> {
        self.with_registries(|regs| -> BridgeResult<Option<Handle>> {
            let db = regs.databases.get(db)?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            let expr = regs.expressions.get(expr)?;
            let result = self.engine().say_feedback(expr, kind, scope, db)?;
            Ok(result.map(|r| regs.expressions.insert(r)))
        })
    }

    /// Whether `text` is a proper noun
    pub fn is_a_proper_noun(&self, text: &str, db: Handle) -> BridgeResult<bool> {
        self.with_registries(|regs| -> BridgeResult<bool> {
            let db = regs.databases.get(db)?;
            Ok(self.engine().is_a_proper_noun(text, db))
        })
    }

    /// ISO code of the language `text` is written in: `"fr"`, `"en"`, or
    /// `"un"` when unknown
    pub fn locale_from_text(&self, text: &str, db: Handle) -> BridgeResult<&'static str> {
        self.with_registries(|regs| -> BridgeResult<&'static str> {
            let db = regs.databases.get(db)?;
            Ok(match self.engine().detect_language(text, db) {
                Some(Language::French) => "fr",
                Some(Language::English) => "en",
                Some(Language::Japanese) | None => "un",
            })
        })
    }

    /// Run a text said by the robot
    pub fn execute_robot_str(
        &self,
        text: &str,
        language: Language,
        mem: Handle,
        db: Handle,
        executor: &mut dyn Executor,
    ) -> BridgeResult<()> {
        self.with_registries(|regs| -> BridgeResult<()> {
            let db = regs.databases.get(db)?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            let expr = self.parse_detached(db, text, TextDirection::FromRobot, language)?;
            Ok(self.engine().run(expr, language, scope, db, executor)?)
        })
    }

    /// Let the memory learn the generic "say" command
    pub fn learn_say_command(&self, mem: Handle, db: Handle) -> BridgeResult<()> {
        self.with_registries(|regs| -> BridgeResult<()> {
            let db = regs.databases.get(db)?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            self.engine().learn_say_command(scope, db);
            Ok(())
        })
    }

    /// Let the memory explain to the user how to teach it
    pub fn allow_to_inform_the_user_how_to_teach(&self, mem: Handle) -> BridgeResult<()> {
        self.with_registries(|regs| -> BridgeResult<()> {
            let entry = regs.memories.get_mut(mem)?;
            self.engine().allow_to_inform_the_user_how_to_teach(&mut entry.memory);
            Ok(())
        })
    }
}

// ============================================================================
// Entry points
// ============================================================================

pub(crate) fn inform<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(5)?;
    let language = language_from_iso(&args.locale(1)?)?;
    let mut executor = HostExecutor::new(args.ctx(), args.value(4)?)?;
    let link = onsem.inform(args.handle(0)?, language, args.handle(2)?, args.handle(3)?, &mut executor)?;
    wrap_or_release(&args, EXPRESSION_HANDLE_IN_MEMORY_CLASS, link, |h| onsem.delete_expression_link(h))
}

pub(crate) fn inform_axiom<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(3)?;
    let link = onsem.inform_axiom(args.handle(0)?, args.handle(1)?, args.handle(2)?)?;
    wrap_or_release(&args, EXPRESSION_HANDLE_IN_MEMORY_CLASS, link, |h| onsem.delete_expression_link(h))
}

pub(crate) fn react<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(5)?;
    let language = language_from_iso(&args.locale(1)?)?;
    let mut executor = HostExecutor::new(args.ctx(), args.value(4)?)?;
    let annotation = onsem.react(args.handle(0)?, language, args.handle(2)?, args.handle(3)?, &mut executor)?;
    args.ctx().create_string(&annotation)
}

pub(crate) fn react_from_trigger<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(5)?;
    let language = language_from_iso(&args.locale(1)?)?;
    let mut executor = HostExecutor::new(args.ctx(), args.value(4)?)?;
    let annotation =
        onsem.react_from_trigger(args.handle(0)?, language, args.handle(2)?, args.handle(3)?, &mut executor)?;
    args.ctx().create_string(&annotation)
}

pub(crate) fn forget<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(3)?;
    onsem.forget(args.handle(0)?, args.handle(1)?, args.handle(2)?)?;
    Ok(HostValue::null())
}

pub(crate) fn not_knowing<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(3)?;
    let result = onsem.not_knowing(args.handle(0)?, args.handle(1)?, args.handle(2)?)?;
    to_host(onsem, &args, result)
}

pub(crate) fn answer<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(3)?;
    let result = onsem.answer(args.handle(0)?, args.handle(1)?, args.handle(2)?)?;
    to_host(onsem, &args, result)
}

pub(crate) fn execute<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(3)?;
    let result = onsem.execute(args.handle(0)?, args.handle(1)?, args.handle(2)?)?;
    to_host(onsem, &args, result)
}

pub(crate) fn execute_from_trigger<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(3)?;
    let result = onsem.execute_from_trigger(args.handle(0)?, args.handle(1)?, args.handle(2)?)?;
    to_host(onsem, &args, result)
}

pub(crate) fn say_feedback<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(4)?;
    let kind = onsem
        .enum_bridges(args.ctx())?
        .type_of_feedback
        .translate(args.ordinal(1)?)?;
    let result = onsem.say_feedback(args.handle(0)?, kind, args.handle(2)?, args.handle(3)?)?;
    to_host(onsem, &args, result)
}

pub(crate) fn is_a_proper_noun<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(2)?;
    let text = args.string(0)?;
    Ok(HostValue::bool(onsem.is_a_proper_noun(&text, args.handle(1)?)?))
}

pub(crate) fn get_locale_from_text<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(2)?;
    let text = args.string(0)?;
    let code = onsem.locale_from_text(&text, args.handle(1)?)?;
    args.ctx().create_string(code)
}

pub(crate) fn execute_robot_str<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(5)?;
    let text = args.string(0)?;
    let language = language_from_iso(&args.locale(1)?)?;
    let mut executor = HostExecutor::new(args.ctx(), args.value(4)?)?;
    onsem.execute_robot_str(&text, language, args.handle(2)?, args.handle(3)?, &mut executor)?;
    Ok(HostValue::null())
}

pub(crate) fn learn_say_command<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(2)?;
    onsem.learn_say_command(args.handle(0)?, args.handle(1)?)?;
    Ok(HostValue::null())
}

pub(crate) fn allow_to_inform_the_user_how_to_teach<E: SemanticEngine>(
    onsem: &Onsem<E>,
    args: Args<'_>,
) -> BridgeResult<HostValue> {
    args.expect_len(1)?;
    onsem.allow_to_inform_the_user_how_to_teach(args.handle(0)?)?;
    Ok(HostValue::null())
}
