//! Recommendation containers

use onsem_engine::{Language, SemanticEngine, TextDirection};
use onsem_sdk::{Args, BridgeResult, Handle, HostValue};

use crate::{language_from_iso, Onsem};

impl<E: SemanticEngine> Onsem<E> {
    /// Create an empty recommendations container
    pub fn new_recommendations(&self, db: Handle) -> BridgeResult<Handle> {
        self.with_registries(|regs| -> BridgeResult<Handle> {
            let db = regs.databases.get(db)?;
            let container = self.engine().new_recommendations(db)?;
            Ok(regs.recommendations.insert(container))
        })
    }

    /// Release a recommendations container
    pub fn delete_recommendations(&self, handle: Handle) {
        self.with_registries(|regs| regs.recommendations.erase(handle));
    }

    /// Add the recommendation `id`, selected by sentences close to `text`
    pub fn add_recommendation(
        &self,
        container: Handle,
        text: &str,
        id: &str,
        language: Language,
        db: Handle,
    ) -> BridgeResult<()> {
        self.with_registries(|regs| -> BridgeResult<()> {
            let db = regs.databases.get(db)?;
            let container = regs.recommendations.get_mut(container)?;
            let expr = self.parse_detached(db, text, TextDirection::ToRobot, language)?;
            Ok(self.engine().add_recommendation(container, expr, id, db)?)
        })
    }

    /// Ids of the recommendations closest to `expr`, best first
    pub fn recommendations(&self, container: Handle, expr: Handle, db: Handle) -> BridgeResult<Vec<String>> {
        let limits = &self.config().recommendations;
        self.with_registries(|regs| -> BridgeResult<Vec<String>> {
            let db = regs.databases.get(db)?;
            let container = regs.recommendations.get(container)?;
            let expr = regs.expressions.get(expr)?;
            let scored = self
                .engine()
                .recommendations(container, expr, limits.search_limit, db)?;
            Ok(scored
                .into_iter()
                .rev()
                .flat_map(|(_, ids)| ids)
                .take(limits.max_results)
                .collect())
        })
    }
}

// ============================================================================
// Entry points
// ============================================================================

pub(crate) fn new<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(1)?;
    Ok(HostValue::handle(onsem.new_recommendations(args.handle(0)?)?))
}

pub(crate) fn delete<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(1)?;
    onsem.delete_recommendations(args.handle(0)?);
    Ok(HostValue::null())
}

pub(crate) fn add<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(5)?;
    let text = args.string(1)?;
    let id = args.string(2)?;
    let language = language_from_iso(&args.locale(3)?)?;
    onsem.add_recommendation(args.handle(0)?, &text, &id, language, args.handle(4)?)?;
    Ok(HostValue::null())
}

pub(crate) fn get<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(3)?;
    let ids = onsem.recommendations(args.handle(0)?, args.handle(1)?, args.handle(2)?)?;
    args.ctx().create_string_array(&ids)
}
