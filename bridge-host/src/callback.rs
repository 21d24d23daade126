//! Host objects implementing callback interfaces for native code.
//!
//! Generated bindings keep one [`CallbackRegistry`] per interface and export one
//! `extern "C"` function per method plus `free`, gathered in a `#[repr(C)]` vtable that is
//! registered with the library once. Each method body runs inside [`foreign_call`].

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use bridge_abi::{BufferAllocator, FfiConverter, FfiDefault, RustBuffer, RustCallStatus, RustCallStatusCode};

use crate::error::InternalResult;
use crate::handle_map::HandleMap;

/// Live callback objects of one interface, keyed by the handle native code holds.
pub struct CallbackRegistry<T: ?Sized> {
    name: &'static str,
    handles: HandleMap<Arc<T>>,
}

impl<T: ?Sized> CallbackRegistry<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            handles: HandleMap::new(),
        }
    }

    /// Exposes `obj` to native code. The returned handle is owned by the receiver, which
    /// must release it through the vtable's `free` exactly once.
    pub fn register(&self, obj: Arc<T>) -> u64 {
        let handle = self.handles.insert(obj);
        tracing::debug!("Registered {} callback {}", self.name, handle);
        handle
    }

    pub fn try_get(&self, handle: u64) -> InternalResult<Arc<T>> {
        self.handles.try_get(handle)
    }

    /// Looks up the object behind a handle, raising if it was already released.
    pub fn get(&self, handle: u64) -> Arc<T> {
        self.handles.get(handle)
    }

    /// Handles native code's `free`. Never unwinds, since it runs inside an `extern "C"` frame.
    pub fn release(&self, handle: u64) {
        match self.handles.try_remove(handle) {
            Ok(_) => tracing::debug!("Released {} callback {}", self.name, handle),
            Err(e) => tracing::error!("Release of {} callback failed: {}", self.name, e),
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Runs a callback method on behalf of native code and records the outcome in
/// `out_status`, the mirror image of the native side's call wrapper.
///
/// A domain error is lowered through `alloc` (the library's allocator, so native code can
/// free it); a panic becomes a `PANIC` status with its message.
pub fn foreign_call<A, R, E, F>(alloc: &A, out_status: &mut RustCallStatus, callback: F) -> R
where
    A: BufferAllocator + ?Sized,
    R: FfiDefault,
    E: FfiConverter<FfiType = RustBuffer>,
    F: FnOnce() -> Result<R, E>,
{
    match panic::catch_unwind(AssertUnwindSafe(callback)) {
        Ok(Ok(value)) => {
            out_status.code = RustCallStatusCode::Success as i8;
            value
        }
        Ok(Err(err)) => {
            match E::lower(err, alloc) {
                Ok(buf) => out_status.set_error(buf),
                Err(e) => set_panic(alloc, out_status, format!("Failed to lower callback error: {}", e)),
            }
            R::ffi_default()
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "callback panicked".to_string());
            tracing::warn!("Caught panic in callback: {}", message);
            set_panic(alloc, out_status, message);
            R::ffi_default()
        }
    }
}

fn set_panic<A: BufferAllocator + ?Sized>(alloc: &A, out_status: &mut RustCallStatus, message: String) {
    let buf = String::lower(message, alloc).unwrap_or_else(|e| {
        tracing::error!("Failed to lower callback panic message: {}", e);
        RustBuffer::new()
    });
    out_status.set_panic(buf);
}
