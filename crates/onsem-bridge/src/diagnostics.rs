//! Leak report

use std::fmt::Write;

use onsem_engine::SemanticEngine;
use onsem_sdk::{Args, BridgeResult, HostValue};

use crate::Onsem;

/// Live object count of every registry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveCounts {
    /// Links to expressions in memory
    pub expression_links: usize,
    /// Text processing contexts
    pub text_contexts: usize,
    /// Semantic memories
    pub memories: usize,
    /// Semantic expressions
    pub expressions: usize,
    /// Linguistic databases
    pub databases: usize,
    /// Recommendation containers
    pub recommendations: usize,
    /// String replacers
    pub replacers: usize,
}

impl LiveCounts {
    /// Total number of live objects
    pub fn total(&self) -> usize {
        self.expression_links
            + self.text_contexts
            + self.memories
            + self.expressions
            + self.databases
            + self.recommendations
            + self.replacers
    }
}

impl<E: SemanticEngine> Onsem<E> {
    /// Snapshot of the live counts
    pub fn live_counts(&self) -> LiveCounts {
        self.with_registries(|regs| LiveCounts {
            expression_links: regs.expression_links.len(),
            text_contexts: regs.text_contexts.len(),
            memories: regs.memories.len(),
            expressions: regs.expressions.len(),
            databases: regs.databases.len(),
            recommendations: regs.recommendations.len(),
            replacers: regs.replacers.len(),
        })
    }

    /// One ` Name(count)` item per registry holding live objects; empty
    /// when nothing leaked
    pub fn leak_report(&self) -> String {
        let counts = self.live_counts();
        let mut report = String::new();
        for (name, count) in [
            ("ExpressionHandleInMemory", counts.expression_links),
            ("TextProcessingContext", counts.text_contexts),
            ("SemanticMemory", counts.memories),
            ("SemanticExpression", counts.expressions),
            ("LinguisticDatabase", counts.databases),
            ("Recommendations", counts.recommendations),
            ("StringReplacer", counts.replacers),
        ] {
            if count > 0 {
                let _ = write!(report, " {}({})", name, count);
            }
        }
        let created = self.databases_created();
        if self.config().diagnostics.report_database_creations && created > 1 {
            let _ = write!(report, " LinguisticDatabaseCreatedSinceBeginOfRunTime({})", created);
        }
        report
    }
}

pub(crate) fn leak_report<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(0)?;
    args.ctx().create_string(&onsem.leak_report())
}

#[cfg(test)]
mod tests {
    use crate::{BridgeConfig, Onsem};
    use onsem_engine::reference::ReferenceEngine;
    use onsem_engine::Language;

    #[test]
    fn test_report_lists_live_registries_in_order() {
        let onsem = Onsem::new(ReferenceEngine::new(), BridgeConfig::default());
        assert_eq!(onsem.leak_report(), "");

        let db = onsem.new_linguistic_database(&[Language::English], "/db").unwrap();
        let mem = onsem.new_memory();
        onsem.new_memory();
        onsem.new_string_replacer(true, false);
        assert_eq!(onsem.leak_report(), " SemanticMemory(2) LinguisticDatabase(1) StringReplacer(1)");

        onsem.delete_linguistic_database(db);
        onsem.new_linguistic_database(&[Language::French], "/db").unwrap();
        onsem.delete_memory(mem);
        assert_eq!(
            onsem.leak_report(),
            " SemanticMemory(1) LinguisticDatabase(1) StringReplacer(1) LinguisticDatabaseCreatedSinceBeginOfRunTime(2)"
        );
        assert_eq!(onsem.live_counts().total(), 3);
    }

    #[test]
    fn test_creation_count_can_be_silenced() {
        let config = BridgeConfig::from_toml_str("[diagnostics]\nreport_database_creations = false\n").unwrap();
        let onsem = Onsem::new(ReferenceEngine::new(), config);
        for _ in 0..3 {
            let db = onsem.new_linguistic_database(&[Language::English], "/db").unwrap();
            onsem.delete_linguistic_database(db);
        }
        assert_eq!(onsem.leak_report(), "");
    }
}
