//! Linguistic databases

use std::collections::BTreeSet;
use std::sync::atomic::Ordering;

use onsem_engine::{DatabaseRequest, Language, SemanticEngine};
use onsem_sdk::{Args, BridgeResult, Handle, HostValue};

use crate::{language_from_iso, Onsem};

impl<E: SemanticEngine> Onsem<E> {
    /// Load a linguistic database covering `languages` from `root_folder`.
    ///
    /// Loading runs outside the boundary lock; only the registration is
    /// serialized.
    pub fn new_linguistic_database(&self, languages: &[Language], root_folder: &str) -> BridgeResult<Handle> {
        let request = DatabaseRequest {
            languages: languages.iter().copied().collect::<BTreeSet<_>>(),
            root_folder: root_folder.to_string(),
        };
        let db = self.engine().new_linguistic_database(&request)?;
        let handle = self.with_registries(|regs| regs.databases.insert_present(db, "LinguisticDatabase"))?;
        self.databases_created.fetch_add(1, Ordering::Relaxed);
        Ok(handle)
    }

    /// Release a linguistic database
    pub fn delete_linguistic_database(&self, handle: Handle) {
        self.with_registries(|regs| regs.databases.erase(handle));
    }

    /// Number of live linguistic databases
    pub fn linguistic_database_count(&self) -> usize {
        self.with_registries(|regs| regs.databases.len())
    }

    /// Linguistic databases created since start, deleted ones included
    pub fn databases_created(&self) -> usize {
        self.databases_created.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Entry points
// ============================================================================

pub(crate) fn new<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(2)?;
    let languages = args
        .strings(0)?
        .iter()
        .map(|code| language_from_iso(code))
        .collect::<BridgeResult<Vec<_>>>()?;
    let root_folder = args.string(1)?;
    Ok(HostValue::handle(onsem.new_linguistic_database(&languages, &root_folder)?))
}

pub(crate) fn delete<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(1)?;
    onsem.delete_linguistic_database(args.handle(0)?);
    Ok(HostValue::null())
}

pub(crate) fn count<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(0)?;
    Ok(HostValue::i32(onsem.linguistic_database_count() as i32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BridgeConfig;
    use onsem_engine::reference::ReferenceEngine;
    use onsem_sdk::BridgeError;

    #[test]
    fn test_counts_live_and_created() {
        let onsem = Onsem::new(ReferenceEngine::new(), BridgeConfig::default());
        let a = onsem.new_linguistic_database(&[Language::English], "/db").unwrap();
        let b = onsem.new_linguistic_database(&[Language::French], "/db").unwrap();
        assert_eq!((a, b), (1, 2));
        onsem.delete_linguistic_database(a);
        onsem.delete_linguistic_database(a);
        assert_eq!(onsem.linguistic_database_count(), 1);
        assert_eq!(onsem.databases_created(), 2);
    }

    #[test]
    fn test_nothing_loaded_is_an_empty_object() {
        let onsem = Onsem::new(ReferenceEngine::new(), BridgeConfig::default());
        let err = onsem.new_linguistic_database(&[], "/db").unwrap_err();
        assert_eq!(err, BridgeError::EmptyObject("LinguisticDatabase".to_string()));
        assert_eq!(onsem.databases_created(), 0);

        let err = onsem.new_linguistic_database(&[Language::English], "").unwrap_err();
        assert!(matches!(err, BridgeError::Engine(_)));
    }
}
