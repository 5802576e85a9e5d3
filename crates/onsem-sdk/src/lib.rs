//! Onsem SDK - host boundary vocabulary
//!
//! This crate provides the minimal types and traits shared by the host glue
//! and the onsem bridge: the [`HostValue`] passed across the boundary, the
//! [`Handle`] that stands in for every native object, the [`HostContext`]
//! conversions the host provides, and the [`NativeFunctionRegistry`] through
//! which every entry point is dispatched.
//!
//! # Example
//!
//! ```ignore
//! use onsem_sdk::{Args, NativeCallResult, NativeFunctionRegistry};
//!
//! let mut registry = NativeFunctionRegistry::new();
//! registry.register("math.twice", |ctx, args| {
//!     let args = Args::new(ctx, "math.twice", args);
//!     match args.handle(0) {
//!         Ok(n) => NativeCallResult::i32(n * 2),
//!         Err(e) => NativeCallResult::Error(e.to_string()),
//!     }
//! });
//! ```

#![warn(missing_docs)]

pub mod args;
pub mod context;
pub mod error;
pub mod handler;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod value;

pub use args::Args;
pub use context::{EnvironmentId, HostContext};
pub use error::{BridgeError, BridgeResult};
pub use handler::{NativeCallResult, NativeFunctionRegistry, NativeHandlerFn};
pub use value::{Handle, HostValue};
