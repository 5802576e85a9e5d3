//! Enum ordinal bridges
//!
//! The host and the engine each declare their own version of every shared
//! enum. A bridge maps host ordinals to native values by constant name, and
//! refuses to exist if the two declarations disagree.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use onsem_engine::{
    GrammaticalType, NaturalLanguagePolarity, QuantityType, ReferenceType, SemanticSource, SemanticTypeOfFeedback,
    VerbGoal, VerbTense,
};
use onsem_sdk::{BridgeError, BridgeResult, EnvironmentId, HostContext};

/// Host class names of the bridged enums
pub mod class {
    /// Verb tense
    pub const VERB_TENSE: &str = "com/onsem/VerbTense";
    /// Grammatical type
    pub const GRAMMATICAL_TYPE: &str = "com/onsem/GrammaticalType";
    /// Verb goal
    pub const VERB_GOAL: &str = "com/onsem/VerbGoal";
    /// Polarity
    pub const POLARITY: &str = "com/onsem/NaturalLanguagePolarity";
    /// Quantity type
    pub const QUANTITY_TYPE: &str = "com/onsem/QuantityType";
    /// Reference type
    pub const REFERENCE_TYPE: &str = "com/onsem/ReferenceType";
    /// Type of feedback
    pub const TYPE_OF_FEEDBACK: &str = "com/onsem/SemanticTypeOfFeedback";
    /// Semantic source
    pub const SOURCE: &str = "com/onsem/SemanticSourceEnum";
}

const VERB_TENSES: &[(&str, VerbTense)] = &[
    ("PRESENT", VerbTense::Present),
    ("PUNCTUALPRESENT", VerbTense::PunctualPresent),
    ("PAST", VerbTense::Past),
    ("PUNCTUALPAST", VerbTense::PunctualPast),
];

const GRAMMATICAL_TYPES: &[(&str, GrammaticalType)] = &[
    ("SUBJECT", GrammaticalType::Subject),
    ("OBJECT", GrammaticalType::Object),
    ("OWNER", GrammaticalType::Owner),
];

const VERB_GOALS: &[(&str, VerbGoal)] = &[
    ("ABILITY", VerbGoal::Ability),
    ("ADVICE", VerbGoal::Advice),
    ("CONDITIONAL", VerbGoal::Conditional),
    ("MANDATORY", VerbGoal::Mandatory),
    ("NOTIFICATION", VerbGoal::Notification),
    ("POSSIBILITY", VerbGoal::Possibility),
];

const POLARITIES: &[(&str, NaturalLanguagePolarity)] = &[
    ("IDENTICAL", NaturalLanguagePolarity::Identical),
    ("OPPOSITE", NaturalLanguagePolarity::Opposite),
];

const QUANTITY_TYPES: &[(&str, QuantityType)] = &[("ONE", QuantityType::One), ("MANY", QuantityType::Many)];

const REFERENCE_TYPES: &[(&str, ReferenceType)] = &[
    ("DEFINITE", ReferenceType::Definite),
    ("INDEFINITE", ReferenceType::Indefinite),
    ("UNDEFINED", ReferenceType::Undefined),
];

const TYPES_OF_FEEDBACK: &[(&str, SemanticTypeOfFeedback)] = &[
    ("ASK_FOR_ADDITIONAL_INFORMATION", SemanticTypeOfFeedback::AskForAdditionalInformation),
    ("REACT_ON_SIMILARITIES", SemanticTypeOfFeedback::ReactOnSimilarities),
    ("SENTIMENT", SemanticTypeOfFeedback::Sentiment),
];

const SOURCES: &[(&str, SemanticSource)] = &[
    ("ASR", SemanticSource::Asr),
    ("EVENT", SemanticSource::Event),
    ("WRITTENTEXT", SemanticSource::WrittenText),
    ("TTS", SemanticSource::Tts),
    ("SEMREACTION", SemanticSource::SemReaction),
    ("METHODCALL", SemanticSource::MethodCall),
    ("PROPERTY", SemanticSource::Property),
    ("UNKNOWN", SemanticSource::Unknown),
];

/// Host ordinal to native value table for one enum
#[derive(Debug, Clone)]
pub struct EnumOrdinalBridge<T> {
    enum_name: String,
    by_ordinal: Vec<T>,
}

impl<T: Copy> EnumOrdinalBridge<T> {
    /// Build the table for the host enum `enum_name` from the native
    /// constants named in `mapping`.
    ///
    /// The host ordinals of the named constants must be exactly
    /// `0..mapping.len()` and the host must declare no other constant.
    pub fn build(enum_name: &str, mapping: &[(&str, T)], host: &dyn HostContext) -> BridgeResult<Self> {
        let inconsistent = || BridgeError::InconsistentEnumMapping {
            enum_name: enum_name.to_string(),
        };

        let mut sorted = BTreeMap::new();
        for &(constant, native) in mapping {
            let ordinal = host.enum_constant_ordinal(enum_name, constant)?.ok_or_else(inconsistent)?;
            if sorted.insert(ordinal, native).is_some() {
                return Err(inconsistent());
            }
        }
        if host.enum_constant_count(enum_name)? != mapping.len() {
            return Err(inconsistent());
        }

        let mut by_ordinal = Vec::with_capacity(sorted.len());
        for (expected, (ordinal, native)) in sorted.into_iter().enumerate() {
            if usize::try_from(ordinal).ok() != Some(expected) {
                return Err(inconsistent());
            }
            by_ordinal.push(native);
        }
        Ok(Self {
            enum_name: enum_name.to_string(),
            by_ordinal,
        })
    }

    /// Native value for a host ordinal
    pub fn translate(&self, ordinal: i32) -> BridgeResult<T> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| self.by_ordinal.get(i))
            .copied()
            .ok_or_else(|| BridgeError::InvalidOrdinal {
                enum_name: self.enum_name.clone(),
                ordinal,
            })
    }

    /// Number of constants
    pub fn len(&self) -> usize {
        self.by_ordinal.len()
    }

    /// Check if the enum has no constant
    pub fn is_empty(&self) -> bool {
        self.by_ordinal.is_empty()
    }

    /// Host class name
    pub fn enum_name(&self) -> &str {
        &self.enum_name
    }
}

/// Every bridged enum of one host environment
#[derive(Debug, Clone)]
pub struct SemanticEnumBridges {
    /// Verb tense
    pub verb_tense: EnumOrdinalBridge<VerbTense>,
    /// Grammatical type
    pub grammatical_type: EnumOrdinalBridge<GrammaticalType>,
    /// Verb goal
    pub verb_goal: EnumOrdinalBridge<VerbGoal>,
    /// Polarity
    pub polarity: EnumOrdinalBridge<NaturalLanguagePolarity>,
    /// Quantity type
    pub quantity_type: EnumOrdinalBridge<QuantityType>,
    /// Reference type
    pub reference_type: EnumOrdinalBridge<ReferenceType>,
    /// Type of feedback
    pub type_of_feedback: EnumOrdinalBridge<SemanticTypeOfFeedback>,
    /// Semantic source
    pub source: EnumOrdinalBridge<SemanticSource>,
}

impl SemanticEnumBridges {
    /// Build all bridges against `host`
    pub fn build(host: &dyn HostContext) -> BridgeResult<Self> {
        Ok(Self {
            verb_tense: EnumOrdinalBridge::build(class::VERB_TENSE, VERB_TENSES, host)?,
            grammatical_type: EnumOrdinalBridge::build(class::GRAMMATICAL_TYPE, GRAMMATICAL_TYPES, host)?,
            verb_goal: EnumOrdinalBridge::build(class::VERB_GOAL, VERB_GOALS, host)?,
            polarity: EnumOrdinalBridge::build(class::POLARITY, POLARITIES, host)?,
            quantity_type: EnumOrdinalBridge::build(class::QUANTITY_TYPE, QUANTITY_TYPES, host)?,
            reference_type: EnumOrdinalBridge::build(class::REFERENCE_TYPE, REFERENCE_TYPES, host)?,
            type_of_feedback: EnumOrdinalBridge::build(class::TYPE_OF_FEEDBACK, TYPES_OF_FEEDBACK, host)?,
            source: EnumOrdinalBridge::build(class::SOURCE, SOURCES, host)?,
        })
    }

    /// Host class and constant names of every bridged enum, in the order the
    /// host declares them
    pub fn declarations() -> Vec<(&'static str, Vec<&'static str>)> {
        fn names<T>(mapping: &[(&'static str, T)]) -> Vec<&'static str> {
            mapping.iter().map(|(name, _)| *name).collect()
        }
        vec![
            (class::VERB_TENSE, names(VERB_TENSES)),
            (class::GRAMMATICAL_TYPE, names(GRAMMATICAL_TYPES)),
            (class::VERB_GOAL, names(VERB_GOALS)),
            (class::POLARITY, names(POLARITIES)),
            (class::QUANTITY_TYPE, names(QUANTITY_TYPES)),
            (class::REFERENCE_TYPE, names(REFERENCE_TYPES)),
            (class::TYPE_OF_FEEDBACK, names(TYPES_OF_FEEDBACK)),
            (class::SOURCE, names(SOURCES)),
        ]
    }
}

/// Enum bridges per host environment, built on first use
#[derive(Default)]
pub struct EnumBridgeCache {
    by_environment: DashMap<EnvironmentId, Arc<SemanticEnumBridges>>,
}

impl EnumBridgeCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridges of the environment `host` belongs to.
    ///
    /// The first caller for an environment builds the whole set while
    /// holding its cache entry. A failed build is not cached.
    pub fn get_or_build(&self, host: &dyn HostContext) -> BridgeResult<Arc<SemanticEnumBridges>> {
        let env = host.environment_id();
        if let Some(bridges) = self.by_environment.get(&env) {
            return Ok(bridges.clone());
        }
        let bridges = self
            .by_environment
            .entry(env)
            .or_try_insert_with(|| {
                let built = SemanticEnumBridges::build(host)?;
                tracing::info!(environment = %env, "enum bridges ready");
                Ok::<_, BridgeError>(Arc::new(built))
            })?
            .clone();
        Ok(bridges)
    }

    /// Number of environments with built bridges
    pub fn len(&self) -> usize {
        self.by_environment.len()
    }

    /// Check if no environment has built bridges
    pub fn is_empty(&self) -> bool {
        self.by_environment.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onsem_sdk::testing::InMemoryHost;

    fn declared_host() -> InMemoryHost {
        let host = InMemoryHost::new();
        for (class, constants) in SemanticEnumBridges::declarations() {
            host.declare_enum(class, &constants);
        }
        host
    }

    #[test]
    fn test_translates_by_name_not_position() {
        let host = InMemoryHost::new();
        host.declare_enum_with_ordinals(class::POLARITY, &[("OPPOSITE", 0), ("IDENTICAL", 1)]);
        let bridge = EnumOrdinalBridge::build(class::POLARITY, POLARITIES, &host).unwrap();
        assert_eq!(bridge.translate(0), Ok(NaturalLanguagePolarity::Opposite));
        assert_eq!(bridge.translate(1), Ok(NaturalLanguagePolarity::Identical));
        assert_eq!(bridge.len(), 2);
    }

    #[test]
    fn test_out_of_range_ordinal() {
        let host = declared_host();
        let bridge = EnumOrdinalBridge::build(class::VERB_TENSE, VERB_TENSES, &host).unwrap();
        for ordinal in [-1, 4, i32::MAX] {
            assert_eq!(
                bridge.translate(ordinal),
                Err(BridgeError::InvalidOrdinal {
                    enum_name: class::VERB_TENSE.to_string(),
                    ordinal
                })
            );
        }
    }

    #[test]
    fn test_missing_mapping_is_inconsistent() {
        let host = InMemoryHost::new();
        host.declare_enum(class::QUANTITY_TYPE, &["ONE", "MANY", "SOME"]);
        let err = EnumOrdinalBridge::build(class::QUANTITY_TYPE, QUANTITY_TYPES, &host).unwrap_err();
        assert!(matches!(err, BridgeError::InconsistentEnumMapping { .. }));
        let msg = err.to_string();
        assert!(msg.contains(class::QUANTITY_TYPE));
        assert!(msg.contains("is missing"));
        assert!(msg.contains("without any gap"));
    }

    #[test]
    fn test_gap_in_host_ordinals_is_inconsistent() {
        let host = InMemoryHost::new();
        host.declare_enum_with_ordinals(class::QUANTITY_TYPE, &[("ONE", 0), ("MANY", 2)]);
        let err = EnumOrdinalBridge::build(class::QUANTITY_TYPE, QUANTITY_TYPES, &host).unwrap_err();
        assert!(matches!(err, BridgeError::InconsistentEnumMapping { .. }));
    }

    #[test]
    fn test_unknown_constant_is_inconsistent() {
        let host = InMemoryHost::new();
        host.declare_enum(class::QUANTITY_TYPE, &["ONE", "SEVERAL"]);
        let err = EnumOrdinalBridge::build(class::QUANTITY_TYPE, QUANTITY_TYPES, &host).unwrap_err();
        assert!(matches!(err, BridgeError::InconsistentEnumMapping { .. }));
    }

    #[test]
    fn test_duplicate_ordinal_is_inconsistent() {
        let host = InMemoryHost::new();
        host.declare_enum_with_ordinals(class::QUANTITY_TYPE, &[("ONE", 0), ("MANY", 0)]);
        let err = EnumOrdinalBridge::build(class::QUANTITY_TYPE, QUANTITY_TYPES, &host).unwrap_err();
        assert!(matches!(err, BridgeError::InconsistentEnumMapping { .. }));
    }

    #[test]
    fn test_cache_builds_once_per_environment() {
        let cache = EnumBridgeCache::new();
        let host = declared_host();
        let first = cache.get_or_build(&host).unwrap();
        let second = cache.get_or_build(&host).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.source.translate(2), Ok(SemanticSource::WrittenText));

        let other = InMemoryHost::with_environment(EnvironmentId(2));
        for (class, constants) in SemanticEnumBridges::declarations() {
            other.declare_enum(class, &constants);
        }
        let third = cache.get_or_build(&other).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let cache = EnumBridgeCache::new();
        let host = InMemoryHost::new();
        assert!(cache.get_or_build(&host).is_err());
        assert!(cache.is_empty());

        for (class, constants) in SemanticEnumBridges::declarations() {
            host.declare_enum(class, &constants);
        }
        assert!(cache.get_or_build(&host).is_ok());
        assert_eq!(cache.len(), 1);
    }
}
