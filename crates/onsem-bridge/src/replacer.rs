//! String replacers

use onsem_engine::SemanticEngine;
use onsem_sdk::{Args, BridgeResult, Handle, HostValue};

use crate::Onsem;

impl<E: SemanticEngine> Onsem<E> {
    /// Create a replacer; with `separators_between_words` only whole words
    /// are replaced
    pub fn new_string_replacer(&self, case_sensitive: bool, separators_between_words: bool) -> Handle {
        let replacer = self.engine().new_replacer(case_sensitive, separators_between_words);
        self.with_registries(|regs| regs.replacers.insert(replacer))
    }

    /// Register a replacement
    pub fn add_replacement_pattern(&self, handle: Handle, pattern: &str, output: &str) -> BridgeResult<()> {
        self.with_registries(|regs| -> BridgeResult<()> {
            let replacer = regs.replacers.get_mut(handle)?;
            self.engine().add_replacement_pattern(replacer, pattern, output);
            Ok(())
        })
    }

    /// Apply every replacement to `input`
    pub fn replace(&self, handle: Handle, input: &str) -> BridgeResult<String> {
        self.with_registries(|regs| -> BridgeResult<String> {
            let replacer = regs.replacers.get(handle)?;
            Ok(self.engine().replace(replacer, input))
        })
    }

    /// Release a replacer
    pub fn delete_string_replacer(&self, handle: Handle) {
        self.with_registries(|regs| regs.replacers.erase(handle));
    }
}

pub(crate) fn new<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(2)?;
    let handle = onsem.new_string_replacer(args.bool(0)?, args.bool(1)?);
    Ok(HostValue::handle(handle))
}

pub(crate) fn add_pattern<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(3)?;
    let pattern = args.string(1)?;
    let output = args.string(2)?;
    onsem.add_replacement_pattern(args.handle(0)?, &pattern, &output)?;
    Ok(HostValue::null())
}

pub(crate) fn replace<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(2)?;
    let input = args.string(1)?;
    let output = onsem.replace(args.handle(0)?, &input)?;
    args.ctx().create_string(&output)
}

pub(crate) fn delete<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(1)?;
    onsem.delete_string_replacer(args.handle(0)?);
    Ok(HostValue::null())
}

#[cfg(test)]
mod tests {
    use crate::{BridgeConfig, Onsem};
    use onsem_engine::reference::ReferenceEngine;
    use onsem_sdk::BridgeError;

    #[test]
    fn test_replace_and_unknown_handle() {
        let onsem = Onsem::new(ReferenceEngine::new(), BridgeConfig::default());
        let h = onsem.new_string_replacer(false, true);
        onsem.add_replacement_pattern(h, "hello", "bonjour").unwrap();
        assert_eq!(onsem.replace(h, "Hello world").unwrap(), "bonjour world");

        onsem.delete_string_replacer(h);
        assert!(matches!(
            onsem.replace(h, "hello"),
            Err(BridgeError::NotFound {
                registry: "string replacer",
                ..
            })
        ));
    }
}
