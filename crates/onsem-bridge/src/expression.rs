//! Semantic expressions and links to expressions stored in a memory

use onsem_engine::{Language, SemanticEngine, SemanticSource, TextDirection};
use onsem_sdk::{Args, BridgeResult, Handle, HostValue};

use crate::memory::MemoryEntry;
use crate::{language_from_iso, Onsem, SEMANTIC_EXPRESSION_CLASS};

impl<E: SemanticEngine> Onsem<E> {
    /// Parse `text` with the context `tpc`, resolving references against the
    /// memory `mem`
    pub fn expression_from_text(
        &self,
        text: &str,
        tpc: Handle,
        source: SemanticSource,
        mem: Handle,
        db: Handle,
    ) -> BridgeResult<Handle> {
        self.with_registries(|regs| -> BridgeResult<Handle> {
            let db = regs.databases.get(db)?;
            let context = regs.text_contexts.get(tpc)?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            let expr = self.engine().text_to_expression(text, context, source, Some(scope), db)?;
            Ok(regs.expressions.insert(expr))
        })
    }

    /// Render an expression as text said by the robot
    pub fn expression_to_text(&self, expr: Handle, language: Language, mem: Handle, db: Handle) -> BridgeResult<String> {
        let formal_address = self.config().text.formal_address;
        self.with_registries(|regs| -> BridgeResult<String> {
            let db = regs.databases.get(db)?;
            let scope = MemoryEntry::scope(&mut regs.memories, mem)?;
            let expr = self.engine().clone_expression(regs.expressions.get(expr)?);
            Ok(self
                .engine()
                .expression_to_text(expr, language, formal_address, scope, db)?)
        })
    }

    /// Release a semantic expression
    pub fn delete_expression(&self, handle: Handle) {
        self.with_registries(|regs| regs.expressions.erase(handle));
    }

    /// Release a link to an expression in memory; links consumed by
    /// [`Onsem::forget`] are already gone
    pub fn delete_expression_link(&self, handle: Handle) {
        self.with_registries(|regs| regs.expression_links.erase(handle));
    }

    /// Parse `text` outside any memory context
    pub(crate) fn parse_detached(
        &self,
        db: &E::LinguisticDatabase,
        text: &str,
        direction: TextDirection,
        language: Language,
    ) -> BridgeResult<E::Expression> {
        let context = self
            .engine()
            .new_text_processing_context(self.text_options(direction, language));
        Ok(self
            .engine()
            .text_to_expression(text, &context, SemanticSource::Unknown, None, db)?)
    }
}

// ============================================================================
// Entry points
// ============================================================================

pub(crate) fn from_text<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(5)?;
    let text = args.string(0)?;
    let source = onsem.enum_bridges(args.ctx())?.source.translate(args.ordinal(2)?)?;
    let expr = onsem.expression_from_text(&text, args.handle(1)?, source, args.handle(3)?, args.handle(4)?)?;
    wrap_or_release(&args, SEMANTIC_EXPRESSION_CLASS, expr, |h| onsem.delete_expression(h))
}

pub(crate) fn to_text<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(4)?;
    let language = language_from_iso(&args.locale(1)?)?;
    let text = onsem.expression_to_text(args.handle(0)?, language, args.handle(2)?, args.handle(3)?)?;
    args.ctx().create_string(&text)
}

pub(crate) fn delete<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(1)?;
    onsem.delete_expression(args.handle(0)?);
    Ok(HostValue::null())
}

pub(crate) fn delete_link<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(1)?;
    onsem.delete_expression_link(args.handle(0)?);
    Ok(HostValue::null())
}

/// Wrap a freshly registered handle in a host object of `class`.
///
/// The host holds no reference to the handle until the wrapper exists, so
/// a failed wrap releases the native object through `release`.
pub(crate) fn wrap_or_release(
    args: &Args<'_>,
    class: &str,
    handle: Handle,
    release: impl FnOnce(Handle),
) -> BridgeResult<HostValue> {
    args.ctx()
        .new_handle_object(class, handle)
        .inspect_err(|_| release(handle))
}

/// Wrap an optional expression handle for the host; `None` becomes null
pub(crate) fn to_host<E: SemanticEngine>(
    onsem: &Onsem<E>,
    args: &Args<'_>,
    expr: Option<Handle>,
) -> BridgeResult<HostValue> {
    match expr {
        Some(handle) => wrap_or_release(args, SEMANTIC_EXPRESSION_CLASS, handle, |h| onsem.delete_expression(h)),
        None => Ok(HostValue::null()),
    }
}
