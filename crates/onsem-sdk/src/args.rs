//! Typed access to entry point arguments

use std::collections::BTreeMap;

use crate::context::HostContext;
use crate::error::{BridgeError, BridgeResult};
use crate::value::{Handle, HostValue};

/// Argument list of one boundary call.
///
/// Accessors convert through the host context and report the entry point
/// name and argument position on failure.
#[derive(Clone, Copy)]
pub struct Args<'a> {
    ctx: &'a dyn HostContext,
    entry: &'a str,
    values: &'a [HostValue],
}

impl<'a> Args<'a> {
    /// Wrap the raw arguments of `entry`
    pub fn new(ctx: &'a dyn HostContext, entry: &'a str, values: &'a [HostValue]) -> Self {
        Self { ctx, entry, values }
    }

    /// The host context the call came from
    pub fn ctx(&self) -> &'a dyn HostContext {
        self.ctx
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no arguments
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fail unless exactly `n` arguments were passed
    pub fn expect_len(&self, n: usize) -> BridgeResult<()> {
        if self.values.len() != n {
            return Err(BridgeError::InvalidArgument(format!(
                "{}: expected {} arguments, got {}",
                self.entry,
                n,
                self.values.len()
            )));
        }
        Ok(())
    }

    /// Raw value at `index`
    pub fn value(&self, index: usize) -> BridgeResult<HostValue> {
        self.values.get(index).copied().ok_or_else(|| {
            BridgeError::InvalidArgument(format!("{}: missing argument {}", self.entry, index))
        })
    }

    /// Handle at `index`, passed either as a raw i32 or as a handle-bearing
    /// host object
    pub fn handle(&self, index: usize) -> BridgeResult<Handle> {
        let val = self.value(index)?;
        match val.as_i32() {
            Some(handle) => Ok(handle),
            None if val.is_reference() => self.ctx.handle_of(val),
            None => Err(self.mismatch(index, "handle", val)),
        }
    }

    /// Bool at `index`
    pub fn bool(&self, index: usize) -> BridgeResult<bool> {
        let val = self.value(index)?;
        val.as_bool().ok_or_else(|| self.mismatch(index, "bool", val))
    }

    /// Host string at `index`
    pub fn string(&self, index: usize) -> BridgeResult<String> {
        let val = self.value(index)?;
        if !val.is_reference() {
            return Err(self.mismatch(index, "string", val));
        }
        self.ctx.read_string(val)
    }

    /// Host string array at `index`
    pub fn strings(&self, index: usize) -> BridgeResult<Vec<String>> {
        let val = self.value(index)?;
        if !val.is_reference() {
            return Err(self.mismatch(index, "string[]", val));
        }
        self.ctx.read_string_array(val)
    }

    /// Host map of string to list of strings at `index`
    pub fn string_list_map(&self, index: usize) -> BridgeResult<BTreeMap<String, Vec<String>>> {
        let val = self.value(index)?;
        if !val.is_reference() {
            return Err(self.mismatch(index, "map", val));
        }
        self.ctx.read_string_list_map(val)
    }

    /// Enum ordinal at `index`, passed either as a raw i32 or as a host enum
    /// constant
    pub fn ordinal(&self, index: usize) -> BridgeResult<i32> {
        let val = self.value(index)?;
        match val.as_i32() {
            Some(ordinal) => Ok(ordinal),
            None if val.is_reference() => self.ctx.ordinal_of(val),
            None => Err(self.mismatch(index, "enum", val)),
        }
    }

    /// ISO language code of the host locale at `index`
    pub fn locale(&self, index: usize) -> BridgeResult<String> {
        let val = self.value(index)?;
        if !val.is_reference() {
            return Err(self.mismatch(index, "locale", val));
        }
        self.ctx.locale_language(val)
    }

    fn mismatch(&self, index: usize, expected: &str, got: HostValue) -> BridgeError {
        BridgeError::InvalidArgument(format!(
            "{}: argument {} expected {}, got {}",
            self.entry,
            index,
            expected,
            got.type_name()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryHost;

    #[test]
    fn test_handle_accepts_raw_and_wrapped() {
        let host = InMemoryHost::new();
        let wrapped = host.handle_object("com/onsem/SemanticExpression", 9);
        let values = [HostValue::i32(4), wrapped];
        let args = Args::new(&host, "t", &values);
        assert_eq!(args.handle(0), Ok(4));
        assert_eq!(args.handle(1), Ok(9));
    }

    #[test]
    fn test_expect_len_reports_entry() {
        let host = InMemoryHost::new();
        let args = Args::new(&host, "semanticMemory.delete", &[]);
        let err = args.expect_len(1).unwrap_err();
        assert!(err.to_string().contains("semanticMemory.delete"));
    }

    #[test]
    fn test_string_rejects_primitive() {
        let host = InMemoryHost::new();
        let values = [HostValue::bool(true)];
        let args = Args::new(&host, "t", &values);
        assert!(matches!(args.string(0), Err(BridgeError::InvalidArgument(_))));
        assert_eq!(args.bool(0), Ok(true));
    }
}
