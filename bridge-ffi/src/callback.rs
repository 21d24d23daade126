//! Calling back into host-implemented interfaces.
//!
//! The host registers one `#[repr(C)]` vtable per callback interface and passes objects as
//! opaque `u64` handles. Native code owns each handle it receives and must release it
//! exactly once through the vtable's `free` entry, which [`ForeignHandle`] does on drop.

use std::sync::{PoisonError, RwLock};

use bridge_abi::{FfiConverter, RustBuffer, RustCallStatus, RustCallStatusCode};
use thiserror::Error;

use crate::buffer::NativeAllocator;
use crate::call::CallFailure;

/// `free` entry of every callback vtable.
pub type ForeignFree = extern "C" fn(handle: u64);

/// A host object referenced from native code.
#[derive(Debug)]
pub struct ForeignHandle {
    handle: u64,
    free: ForeignFree,
}

impl ForeignHandle {
    pub fn new(handle: u64, free: ForeignFree) -> Self {
        Self {
            handle,
            free,
        }
    }

    pub fn handle(&self) -> u64 {
        self.handle
    }
}

impl Drop for ForeignHandle {
    fn drop(&mut self) {
        tracing::debug!("Releasing foreign handle {}", self.handle);
        (self.free)(self.handle);
    }
}

/// Storage for a vtable the host registers at startup.
#[derive(Debug)]
pub struct ForeignVTable<V> {
    name: &'static str,
    vtable: RwLock<Option<V>>,
}

impl<V: Copy> ForeignVTable<V> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            vtable: RwLock::new(None),
        }
    }

    /// Registers (or replaces) the vtable.
    pub fn set(&self, vtable: V) {
        *self.vtable.write().unwrap_or_else(PoisonError::into_inner) = Some(vtable);
        tracing::debug!("Registered callback vtable for {}", self.name);
    }

    pub fn get(&self) -> Result<V, CallFailure> {
        self.vtable
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .ok_or_else(|| CallFailure::Internal(format!("Callback vtable {} not registered", self.name)))
    }
}

/// Outcome of a failed callback method.
#[derive(Debug, Error)]
pub enum ForeignCallError<E> {
    #[error("Callback returned a domain error")]
    Domain(E),

    #[error("Callback failed: {0}")]
    Unexpected(String),
}

impl<E> From<ForeignCallError<E>> for CallFailure
where
    E: FfiConverter<FfiType = RustBuffer>,
{
    fn from(err: ForeignCallError<E>) -> Self {
        match err {
            ForeignCallError::Domain(e) => match E::lower(e, &NativeAllocator) {
                Ok(buf) => CallFailure::Error(buf),
                Err(lower_err) => CallFailure::from(lower_err),
            },
            ForeignCallError::Unexpected(message) => CallFailure::Internal(message),
        }
    }
}

/// Reads the status a callback method left behind.
///
/// Error buffers are allocated by the host through this library's `rustbuffer_alloc`, so
/// they are decoded and freed with the native allocator.
pub fn check_foreign_status<E>(status: RustCallStatus) -> Result<(), ForeignCallError<E>>
where
    E: FfiConverter<FfiType = RustBuffer>,
{
    let RustCallStatus {
        code,
        error_buf,
    } = status;
    match RustCallStatusCode::try_from(code) {
        Ok(RustCallStatusCode::Success) => Ok(()),
        Ok(RustCallStatusCode::Error) => match E::try_lift(error_buf, &NativeAllocator) {
            Ok(e) => Err(ForeignCallError::Domain(e)),
            Err(decode_err) => Err(ForeignCallError::Unexpected(format!(
                "Malformed callback error payload: {}",
                decode_err
            ))),
        },
        Ok(RustCallStatusCode::Panic) => {
            let message = if error_buf.is_unallocated() {
                "callback failed without a message".to_string()
            } else {
                String::try_lift(error_buf, &NativeAllocator)
                    .unwrap_or_else(|e| format!("callback failed with an unreadable message: {}", e))
            };
            Err(ForeignCallError::Unexpected(message))
        }
        Err(other) => Err(ForeignCallError::Unexpected(format!(
            "Unknown callback status code {}",
            other
        ))),
    }
}
