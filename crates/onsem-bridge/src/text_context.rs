//! Text processing contexts

use onsem_engine::{Language, SemanticEngine, TextContextOptions, TextDirection};
use onsem_sdk::{Args, BridgeResult, Handle, HostValue};

use crate::{language_from_iso, Onsem};

impl<E: SemanticEngine> Onsem<E> {
    /// Create a context for text said to the robot (`to_robot`) or by it
    pub fn new_text_processing_context(
        &self,
        to_robot: bool,
        language: Language,
        resource_labels: Vec<String>,
    ) -> Handle {
        let options = TextContextOptions {
            direction: if to_robot {
                TextDirection::ToRobot
            } else {
                TextDirection::FromRobot
            },
            language,
            resource_labels,
            formal_address: self.config().text.formal_address,
        };
        let context = self.engine().new_text_processing_context(options);
        self.with_registries(|regs| regs.text_contexts.insert(context))
    }

    /// Release a text processing context
    pub fn delete_text_processing_context(&self, handle: Handle) {
        self.with_registries(|regs| regs.text_contexts.erase(handle));
    }

    pub(crate) fn text_options(&self, direction: TextDirection, language: Language) -> TextContextOptions {
        TextContextOptions {
            direction,
            language,
            resource_labels: Vec::new(),
            formal_address: self.config().text.formal_address,
        }
    }
}

pub(crate) fn new<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(3)?;
    let to_robot = args.bool(0)?;
    let language = language_from_iso(&args.locale(1)?)?;
    let resource_labels = args.strings(2)?;
    Ok(HostValue::handle(onsem.new_text_processing_context(
        to_robot,
        language,
        resource_labels,
    )))
}

pub(crate) fn delete<E: SemanticEngine>(onsem: &Onsem<E>, args: Args<'_>) -> BridgeResult<HostValue> {
    args.expect_len(1)?;
    onsem.delete_text_processing_context(args.handle(0)?);
    Ok(HostValue::null())
}
