//! HostValue: tagged value passed across the host boundary
//!
//! Primitives travel inline. Everything the host owns (strings, arrays,
//! locales, enum constants, handle-bearing wrappers, executors) travels as an
//! opaque host reference that only the host side can interpret.

/// Integer identifying a native object inside one registry.
///
/// Handles are allocated from 1 upwards; 0 and negative values are never
/// handed out, so a host can use them as "no object" sentinels.
pub type Handle = i32;

/// Tagged value exchanged with the host runtime.
///
/// # Layout
///
/// `#[repr(C)]` tag + 64-bit payload so the host glue can build and read
/// values without going through Rust.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostValue {
    tag: u8,
    data: u64,
}

// Value type tags
const TAG_NULL: u8 = 0;
const TAG_BOOL: u8 = 1;
const TAG_I32: u8 = 2;
const TAG_I64: u8 = 3;
const TAG_F64: u8 = 4;
const TAG_REF: u8 = 5;

impl HostValue {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a null value
    #[inline]
    pub const fn null() -> Self {
        Self {
            tag: TAG_NULL,
            data: 0,
        }
    }

    /// Create a boolean value
    #[inline]
    pub const fn bool(b: bool) -> Self {
        Self {
            tag: TAG_BOOL,
            data: b as u64,
        }
    }

    /// Create a 32-bit integer value
    #[inline]
    pub const fn i32(i: i32) -> Self {
        Self {
            tag: TAG_I32,
            data: i as u32 as u64,
        }
    }

    /// Create a 64-bit integer value
    #[inline]
    pub const fn i64(i: i64) -> Self {
        Self {
            tag: TAG_I64,
            data: i as u64,
        }
    }

    /// Create a 64-bit float value
    #[inline]
    pub fn f64(f: f64) -> Self {
        Self {
            tag: TAG_F64,
            data: f.to_bits(),
        }
    }

    /// Create a reference to a host-owned object.
    ///
    /// The id is meaningful only to the host glue that produced it.
    #[inline]
    pub const fn reference(id: u64) -> Self {
        Self {
            tag: TAG_REF,
            data: id,
        }
    }

    /// Wrap a handle as a plain integer value
    #[inline]
    pub const fn handle(handle: Handle) -> Self {
        Self::i32(handle)
    }

    // ========================================================================
    // Type checks
    // ========================================================================

    /// Check if this is null
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.tag == TAG_NULL
    }

    /// Check if this is a host reference
    #[inline]
    pub const fn is_reference(&self) -> bool {
        self.tag == TAG_REF
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get as boolean if this is a bool
    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        if self.tag == TAG_BOOL {
            Some(self.data != 0)
        } else {
            None
        }
    }

    /// Get as i32 if this is an i32
    #[inline]
    pub const fn as_i32(&self) -> Option<i32> {
        if self.tag == TAG_I32 {
            Some(self.data as u32 as i32)
        } else {
            None
        }
    }

    /// Get as i64 if this is an i64
    #[inline]
    pub const fn as_i64(&self) -> Option<i64> {
        if self.tag == TAG_I64 {
            Some(self.data as i64)
        } else {
            None
        }
    }

    /// Get as f64 if this is an f64
    #[inline]
    pub fn as_f64(&self) -> Option<f64> {
        if self.tag == TAG_F64 {
            Some(f64::from_bits(self.data))
        } else {
            None
        }
    }

    /// Get the host reference id if this is a reference
    #[inline]
    pub const fn as_reference(&self) -> Option<u64> {
        if self.tag == TAG_REF {
            Some(self.data)
        } else {
            None
        }
    }

    /// Get type name for error messages
    pub const fn type_name(&self) -> &'static str {
        match self.tag {
            TAG_NULL => "null",
            TAG_BOOL => "bool",
            TAG_I32 => "i32",
            TAG_I64 => "i64",
            TAG_F64 => "f64",
            TAG_REF => "reference",
            _ => "unknown",
        }
    }
}

impl Default for HostValue {
    fn default() -> Self {
        Self::null()
    }
}

impl std::fmt::Debug for HostValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.tag {
            TAG_NULL => write!(f, "HostValue::Null"),
            TAG_BOOL => write!(f, "HostValue::Bool({})", self.data != 0),
            TAG_I32 => write!(f, "HostValue::I32({})", self.data as u32 as i32),
            TAG_I64 => write!(f, "HostValue::I64({})", self.data as i64),
            TAG_F64 => write!(f, "HostValue::F64({})", f64::from_bits(self.data)),
            TAG_REF => write!(f, "HostValue::Ref({:#x})", self.data),
            _ => write!(f, "HostValue::Unknown(tag={}, data={})", self.tag, self.data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null() {
        let v = HostValue::null();
        assert!(v.is_null());
        assert!(!v.is_reference());
        assert_eq!(v.as_i32(), None);
        assert_eq!(HostValue::default(), v);
    }

    #[test]
    fn test_negative_i32_survives_payload() {
        let v = HostValue::i32(-1);
        assert_eq!(v.as_i32(), Some(-1));
        assert_eq!(v.as_i64(), None);
    }

    #[test]
    fn test_reference_is_not_an_integer() {
        let v = HostValue::reference(7);
        assert!(v.is_reference());
        assert_eq!(v.as_reference(), Some(7));
        assert_eq!(v.as_i32(), None);
        assert_eq!(v.type_name(), "reference");
    }

    #[test]
    fn test_handle_is_plain_i32() {
        assert_eq!(HostValue::handle(3), HostValue::i32(3));
    }

    #[test]
    fn test_debug_format() {
        let s = format!("{:?}", HostValue::bool(true));
        assert_eq!(s, "HostValue::Bool(true)");
    }
}
