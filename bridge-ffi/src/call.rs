//! Populating the call status around a native entry point.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use bridge_abi::{
    BufferAllocator, FfiConverter, FfiDefault, ProtocolError, RustBuffer, RustCallStatus,
    RustCallStatusCode,
};
use thiserror::Error;

use crate::buffer::NativeAllocator;

/// Why a native call did not produce a value.
#[derive(Debug, Error)]
pub enum CallFailure {
    /// A typed domain error, already lowered to its tagged-union encoding.
    #[error("Domain error ({} encoded bytes)", .0.len())]
    Error(RustBuffer),

    /// Anything else. Reported to the host as a panic with this message.
    #[error("{0}")]
    Internal(String),
}

impl From<ProtocolError> for CallFailure {
    fn from(err: ProtocolError) -> Self {
        CallFailure::Internal(err.to_string())
    }
}

/// Runs `callback` and records its outcome in `out_status`.
///
/// On success the status code is `SUCCESS` and the value is returned. A domain error sets
/// `ERROR` and attaches the encoded error; an internal failure or a caught panic sets
/// `PANIC` with the message as a plain string. In both failure cases the return value is the
/// type's zero value and must be ignored by the caller.
pub fn rust_call<F, R>(out_status: &mut RustCallStatus, callback: F) -> R
where
    F: FnOnce() -> Result<R, CallFailure>,
    R: FfiDefault,
{
    match panic::catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(value)) => {
            out_status.code = RustCallStatusCode::Success as i8;
            value
        }
        Ok(Err(CallFailure::Error(buf))) => {
            out_status.set_error(buf);
            R::ffi_default()
        }
        Ok(Err(CallFailure::Internal(message))) => {
            tracing::error!("Native call failed: {}", message);
            set_panic_message(out_status, Some(message));
            R::ffi_default()
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::warn!("Caught panic in native call: {}", message.as_deref().unwrap_or("<no message>"));
            set_panic_message(out_status, message);
            R::ffi_default()
        }
    }
}

/// Extracts the message of a `panic!` payload, if it carried one.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
    if let Some(s) = payload.downcast_ref::<&str>() {
        Some((*s).to_string())
    } else {
        payload.downcast_ref::<String>().cloned()
    }
}

fn set_panic_message(out_status: &mut RustCallStatus, message: Option<String>) {
    // Lowering the message must not unwind out of an extern "C" frame; if even that fails
    // the status goes out with an empty buffer.
    let buf = message
        .and_then(|message| {
            panic::catch_unwind(AssertUnwindSafe(|| String::lower(message, &NativeAllocator))).ok()
        })
        .and_then(Result::ok)
        .unwrap_or_default();
    out_status.set_panic(buf);
}

/// Lowers a return value with the native allocator.
pub fn lower_return<T: FfiConverter>(value: T) -> Result<T::FfiType, CallFailure> {
    T::lower(value, &NativeAllocator).map_err(CallFailure::from)
}

/// Lowers a fallible return value; `Err` becomes a typed domain error.
pub fn lower_result<T, E>(result: Result<T, E>) -> Result<T::FfiType, CallFailure>
where
    T: FfiConverter,
    E: FfiConverter<FfiType = RustBuffer>,
{
    match result {
        Ok(value) => lower_return(value),
        Err(err) => Err(CallFailure::Error(E::lower(err, &NativeAllocator)?)),
    }
}

/// Lifts an argument, naming it in the failure message.
pub fn try_lift_arg<T: FfiConverter>(name: &str, value: T::FfiType) -> Result<T, CallFailure> {
    T::try_lift(value, &NativeAllocator)
        .map_err(|e| CallFailure::Internal(format!("Failed to lift argument '{}': {}", name, e)))
}

/// Frees a buffer that will never be handed over, e.g. a result nobody consumed.
pub(crate) fn discard_buffer(buf: RustBuffer) {
    if let Err(e) = NativeAllocator.free(buf) {
        tracing::error!("Failed to free discarded buffer: {}", e);
    }
}
