//! HostContext trait: abstract host runtime operations
//!
//! Defines the interface that the host glue implements. The boundary entry
//! points program against this trait and never see how the host represents
//! strings, arrays, locales or enum constants.

use std::collections::BTreeMap;

use crate::error::BridgeResult;
use crate::value::{Handle, HostValue};

/// Identity of one host runtime environment.
///
/// Enum bridges are cached per environment: two calls carrying the same id
/// share the same translation tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnvironmentId(pub u64);

impl std::fmt::Display for EnvironmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "env#{}", self.0)
    }
}

/// Abstract host context for boundary entry points.
///
/// Every conversion can fail: the host reports a failure as
/// [`BridgeError::Host`](crate::BridgeError::Host) or
/// [`BridgeError::InvalidArgument`](crate::BridgeError::InvalidArgument) and
/// the entry point propagates it unchanged.
pub trait HostContext {
    /// Identity of the environment issuing the current call
    fn environment_id(&self) -> EnvironmentId;

    // ========================================================================
    // Strings
    // ========================================================================

    /// Read a host string
    fn read_string(&self, val: HostValue) -> BridgeResult<String>;

    /// Allocate a new host string
    fn create_string(&self, s: &str) -> BridgeResult<HostValue>;

    // ========================================================================
    // Arrays and maps
    // ========================================================================

    /// Read a host array of strings
    fn read_string_array(&self, val: HostValue) -> BridgeResult<Vec<String>>;

    /// Allocate a new host array of strings
    fn create_string_array(&self, items: &[String]) -> BridgeResult<HostValue>;

    /// Read a host map of string to list of strings
    fn read_string_list_map(&self, val: HostValue) -> BridgeResult<BTreeMap<String, Vec<String>>>;

    // ========================================================================
    // Handle-bearing objects
    // ========================================================================

    /// Extract the handle stored in a handle-bearing host object
    fn handle_of(&self, val: HostValue) -> BridgeResult<Handle>;

    /// Construct a host object of `class` wrapping `handle`
    fn new_handle_object(&self, class: &str, handle: Handle) -> BridgeResult<HostValue>;

    // ========================================================================
    // Enums
    // ========================================================================

    /// Ordinal of the constant `constant` of the host enum `class`, if the
    /// host declares it
    fn enum_constant_ordinal(&self, class: &str, constant: &str) -> BridgeResult<Option<i32>>;

    /// Number of constants the host enum `class` declares
    fn enum_constant_count(&self, class: &str) -> BridgeResult<usize>;

    /// Ordinal of an enum constant value
    fn ordinal_of(&self, val: HostValue) -> BridgeResult<i32>;

    // ========================================================================
    // Locales and callbacks
    // ========================================================================

    /// ISO language code of a host locale object
    fn locale_language(&self, val: HostValue) -> BridgeResult<String>;

    /// Invoke `method` on a host object
    fn call_method(&self, receiver: HostValue, method: &str, args: &[HostValue]) -> BridgeResult<HostValue>;
}
