//! In-memory host used by tests and the demo session.
//!
//! Host objects live in a vector; a [`HostValue::reference`] carries the
//! object's position plus one. Nothing is ever collected.

use std::collections::{BTreeMap, HashMap};

use parking_lot::Mutex;

use crate::context::{EnvironmentId, HostContext};
use crate::error::{BridgeError, BridgeResult};
use crate::value::{Handle, HostValue};

/// Object owned by the in-memory host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostObject {
    /// A string
    Str(String),
    /// An array of strings
    StrArray(Vec<String>),
    /// A map of string to list of strings
    StrListMap(BTreeMap<String, Vec<String>>),
    /// A locale, stored as its ISO language code
    Locale(String),
    /// An enum constant
    EnumConstant {
        /// Enum class name
        class: String,
        /// Constant ordinal
        ordinal: i32,
    },
    /// An object wrapping a native handle
    HandleObject {
        /// Host class name
        class: String,
        /// Wrapped handle
        handle: Handle,
    },
    /// A callback receiver that records every method call
    Recorder(Vec<RecordedCall>),
}

/// A method call received by a recorder object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Method name
    pub method: String,
    /// String arguments, in order
    pub args: Vec<String>,
}

#[derive(Default)]
struct HostState {
    objects: Vec<HostObject>,
    enums: HashMap<String, Vec<(String, i32)>>,
}

/// Host runtime simulated in memory
pub struct InMemoryHost {
    env: EnvironmentId,
    state: Mutex<HostState>,
}

impl InMemoryHost {
    /// Create a host for environment 1
    pub fn new() -> Self {
        Self::with_environment(EnvironmentId(1))
    }

    /// Create a host reporting `env` as its environment identity
    pub fn with_environment(env: EnvironmentId) -> Self {
        Self {
            env,
            state: Mutex::new(HostState::default()),
        }
    }

    // ========================================================================
    // Enum declarations
    // ========================================================================

    /// Declare a host enum whose constants take ordinals in declaration order
    pub fn declare_enum(&self, class: &str, constants: &[&str]) {
        let constants = constants
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i as i32))
            .collect();
        self.state.lock().enums.insert(class.to_string(), constants);
    }

    /// Declare a host enum with explicit ordinals
    pub fn declare_enum_with_ordinals(&self, class: &str, constants: &[(&str, i32)]) {
        let constants = constants
            .iter()
            .map(|(name, ordinal)| (name.to_string(), *ordinal))
            .collect();
        self.state.lock().enums.insert(class.to_string(), constants);
    }

    // ========================================================================
    // Object construction
    // ========================================================================

    fn push(&self, object: HostObject) -> HostValue {
        let mut state = self.state.lock();
        state.objects.push(object);
        HostValue::reference(state.objects.len() as u64)
    }

    /// Allocate a string
    pub fn string(&self, s: &str) -> HostValue {
        self.push(HostObject::Str(s.to_string()))
    }

    /// Allocate an array of strings
    pub fn strings(&self, items: &[&str]) -> HostValue {
        self.push(HostObject::StrArray(items.iter().map(|s| s.to_string()).collect()))
    }

    /// Allocate a map of string to list of strings
    pub fn string_list_map(&self, entries: &[(&str, &[&str])]) -> HostValue {
        let map = entries
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect();
        self.push(HostObject::StrListMap(map))
    }

    /// Allocate a locale
    pub fn locale(&self, language: &str) -> HostValue {
        self.push(HostObject::Locale(language.to_string()))
    }

    /// Allocate an enum constant of a declared enum
    pub fn enum_constant(&self, class: &str, constant: &str) -> BridgeResult<HostValue> {
        let ordinal = self
            .enum_constant_ordinal(class, constant)?
            .ok_or_else(|| BridgeError::Host(format!("{}.{} is not declared", class, constant)))?;
        Ok(self.push(HostObject::EnumConstant {
            class: class.to_string(),
            ordinal,
        }))
    }

    /// Allocate a handle-bearing object
    pub fn handle_object(&self, class: &str, handle: Handle) -> HostValue {
        self.push(HostObject::HandleObject {
            class: class.to_string(),
            handle,
        })
    }

    /// Allocate a callback receiver
    pub fn recorder(&self) -> HostValue {
        self.push(HostObject::Recorder(Vec::new()))
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Snapshot of the object behind `val`
    pub fn object(&self, val: HostValue) -> Option<HostObject> {
        let id = val.as_reference()?;
        let state = self.state.lock();
        id.checked_sub(1)
            .and_then(|i| state.objects.get(i as usize))
            .cloned()
    }

    /// Calls received by a recorder, empty for anything else
    pub fn recorded_calls(&self, val: HostValue) -> Vec<RecordedCall> {
        match self.object(val) {
            Some(HostObject::Recorder(calls)) => calls,
            _ => Vec::new(),
        }
    }

    /// Number of objects allocated so far
    pub fn object_count(&self) -> usize {
        self.state.lock().objects.len()
    }

    fn with_object<R>(
        &self,
        val: HostValue,
        f: impl FnOnce(&mut HostObject) -> BridgeResult<R>,
    ) -> BridgeResult<R> {
        let id = val
            .as_reference()
            .ok_or_else(|| BridgeError::Host(format!("expected a host object, got {}", val.type_name())))?;
        let mut state = self.state.lock();
        let object = id
            .checked_sub(1)
            .and_then(|i| state.objects.get_mut(i as usize))
            .ok_or_else(|| BridgeError::Host(format!("dangling host reference {:#x}", id)))?;
        f(object)
    }
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

fn unexpected(expected: &str, got: &HostObject) -> BridgeError {
    BridgeError::Host(format!("expected {}, got {:?}", expected, got))
}

impl HostContext for InMemoryHost {
    fn environment_id(&self) -> EnvironmentId {
        self.env
    }

    fn read_string(&self, val: HostValue) -> BridgeResult<String> {
        self.with_object(val, |o| match o {
            HostObject::Str(s) => Ok(s.clone()),
            other => Err(unexpected("string", other)),
        })
    }

    fn create_string(&self, s: &str) -> BridgeResult<HostValue> {
        Ok(self.string(s))
    }

    fn read_string_array(&self, val: HostValue) -> BridgeResult<Vec<String>> {
        self.with_object(val, |o| match o {
            HostObject::StrArray(items) => Ok(items.clone()),
            other => Err(unexpected("string[]", other)),
        })
    }

    fn create_string_array(&self, items: &[String]) -> BridgeResult<HostValue> {
        Ok(self.push(HostObject::StrArray(items.to_vec())))
    }

    fn read_string_list_map(&self, val: HostValue) -> BridgeResult<BTreeMap<String, Vec<String>>> {
        self.with_object(val, |o| match o {
            HostObject::StrListMap(map) => Ok(map.clone()),
            other => Err(unexpected("map", other)),
        })
    }

    fn handle_of(&self, val: HostValue) -> BridgeResult<Handle> {
        self.with_object(val, |o| match o {
            HostObject::HandleObject { handle, .. } => Ok(*handle),
            other => Err(unexpected("handle object", other)),
        })
    }

    fn new_handle_object(&self, class: &str, handle: Handle) -> BridgeResult<HostValue> {
        Ok(self.handle_object(class, handle))
    }

    fn enum_constant_ordinal(&self, class: &str, constant: &str) -> BridgeResult<Option<i32>> {
        let state = self.state.lock();
        let constants = state
            .enums
            .get(class)
            .ok_or_else(|| BridgeError::Host(format!("enum class {} not found", class)))?;
        Ok(constants
            .iter()
            .find(|(name, _)| name == constant)
            .map(|(_, ordinal)| *ordinal))
    }

    fn enum_constant_count(&self, class: &str) -> BridgeResult<usize> {
        let state = self.state.lock();
        state
            .enums
            .get(class)
            .map(Vec::len)
            .ok_or_else(|| BridgeError::Host(format!("enum class {} not found", class)))
    }

    fn ordinal_of(&self, val: HostValue) -> BridgeResult<i32> {
        self.with_object(val, |o| match o {
            HostObject::EnumConstant { ordinal, .. } => Ok(*ordinal),
            other => Err(unexpected("enum constant", other)),
        })
    }

    fn locale_language(&self, val: HostValue) -> BridgeResult<String> {
        self.with_object(val, |o| match o {
            HostObject::Locale(language) => Ok(language.clone()),
            other => Err(unexpected("locale", other)),
        })
    }

    fn call_method(&self, receiver: HostValue, method: &str, args: &[HostValue]) -> BridgeResult<HostValue> {
        let args = args
            .iter()
            .map(|a| self.read_string(*a))
            .collect::<BridgeResult<Vec<_>>>()?;
        self.with_object(receiver, |o| match o {
            HostObject::Recorder(calls) => {
                calls.push(RecordedCall {
                    method: method.to_string(),
                    args,
                });
                Ok(HostValue::null())
            }
            other => Err(unexpected("callback receiver", other)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_round_trip_through_context() {
        let host = InMemoryHost::new();
        let v = host.create_string("bonjour").unwrap();
        assert_eq!(host.read_string(v).unwrap(), "bonjour");
    }

    #[test]
    fn test_enum_declaration_order_defines_ordinals() {
        let host = InMemoryHost::new();
        host.declare_enum("E", &["A", "B", "C"]);
        assert_eq!(host.enum_constant_ordinal("E", "C").unwrap(), Some(2));
        assert_eq!(host.enum_constant_ordinal("E", "Z").unwrap(), None);
        assert_eq!(host.enum_constant_count("E").unwrap(), 3);
        let b = host.enum_constant("E", "B").unwrap();
        assert_eq!(host.ordinal_of(b).unwrap(), 1);
    }

    #[test]
    fn test_recorder_keeps_calls() {
        let host = InMemoryHost::new();
        let rec = host.recorder();
        let text = host.string("hello");
        host.call_method(rec, "onTextToSay", &[text]).unwrap();
        assert_eq!(
            host.recorded_calls(rec),
            vec![RecordedCall {
                method: "onTextToSay".to_string(),
                args: vec!["hello".to_string()],
            }]
        );
    }

    #[test]
    fn test_wrong_object_kind_is_host_error() {
        let host = InMemoryHost::new();
        let loc = host.locale("fr");
        assert!(matches!(host.read_string(loc), Err(BridgeError::Host(_))));
        assert!(matches!(host.read_string(HostValue::reference(99)), Err(BridgeError::Host(_))));
    }
}
