//! Error translation at the boundary
//!
//! No native failure crosses the boundary in native form: errors and panics
//! both come back to the host as [`NativeCallResult::Error`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use onsem_sdk::{BridgeError, BridgeResult, HostValue, NativeCallResult};

/// Run the body of the entry point `entry` and translate its outcome
pub fn guard(entry: &str, body: impl FnOnce() -> BridgeResult<HostValue>) -> NativeCallResult {
    let err = match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(value)) => return NativeCallResult::Value(value),
        Ok(Err(e)) => e,
        Err(payload) => BridgeError::Panic(panic_message(payload.as_ref())),
    };
    tracing::warn!(entry, error = %err, "boundary call failed");
    NativeCallResult::Error(err.to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
