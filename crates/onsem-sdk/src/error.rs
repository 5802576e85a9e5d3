//! Error types for the onsem boundary

use crate::value::Handle;

/// Result type for boundary calls
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failures raised inside the boundary layer.
///
/// The host only ever sees the rendered message; the variants exist so that
/// Rust callers and tests can match on the cause.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// A handle does not exist in its registry
    #[error("wrong {registry} id: {handle}")]
    NotFound {
        /// Logical name of the registry
        registry: &'static str,
        /// The handle that was looked up
        handle: Handle,
    },

    /// A construction or registration produced no native object
    #[error("the {0} is empty")]
    EmptyObject(String),

    /// Invalid argument (count, type or value)
    #[error("Argument error: {0}")]
    InvalidArgument(String),

    /// An enum ordinal outside the bridge range
    #[error("invalid {enum_name} ordinal {ordinal}")]
    InvalidOrdinal {
        /// Host enum class name
        enum_name: String,
        /// Offending ordinal
        ordinal: i32,
    },

    /// Bridge construction found a gap, a duplicate or a missing mapping
    #[error(
        "the mapping of an enum of {enum_name} from host to native is missing, \
         or the ordinals of {enum_name} are not from 0 to x without any gap"
    )]
    InconsistentEnumMapping {
        /// Host enum class name
        enum_name: String,
    },

    /// An input value has no native representation
    #[error("{0} is not supported")]
    UnsupportedValue(String),

    /// The native engine reported a failure
    #[error("{0}")]
    Engine(String),

    /// The host glue failed to convert a value
    #[error("Host error: {0}")]
    Host(String),

    /// Entry point panicked
    #[error("Function panicked: {0}")]
    Panic(String),
}

impl From<String> for BridgeError {
    fn from(s: String) -> Self {
        BridgeError::Host(s)
    }
}

impl From<&str> for BridgeError {
    fn from(s: &str) -> Self {
        BridgeError::Host(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message_carries_registry_and_handle() {
        let err = BridgeError::NotFound {
            registry: "semantic memory",
            handle: 12,
        };
        assert_eq!(err.to_string(), "wrong semantic memory id: 12");
    }

    #[test]
    fn test_inconsistent_mapping_names_both_causes() {
        let err = BridgeError::InconsistentEnumMapping {
            enum_name: "com/onsem/VerbTense".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("is missing"));
        assert!(msg.contains("without any gap"));
        assert!(msg.contains("com/onsem/VerbTense"));
    }

    #[test]
    fn test_invalid_ordinal_message() {
        let err = BridgeError::InvalidOrdinal {
            enum_name: "com/onsem/QuantityType".to_string(),
            ordinal: -1,
        };
        assert_eq!(err.to_string(), "invalid com/onsem/QuantityType ordinal -1");
    }
}
