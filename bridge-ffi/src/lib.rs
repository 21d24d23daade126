//! Native ("producer") half of the FFI bridge.
//!
//! A native library built on this crate exposes plain `extern "C"` entry points. Each one
//! takes its arguments in lowered form plus a `&mut RustCallStatus`, runs the domain code
//! under [`rust_call`], and returns a lowered value. Asynchronous entry points return a
//! [`RustFutureHandle`](bridge_abi::RustFutureHandle) that the host drives through the
//! poll/cancel/complete/free quartet of the matching category.
//!
//! The [`export_buffer_fns!`] and [`export_future_fns!`] macros stamp out the fixed
//! lifecycle symbols for a namespace.

pub mod buffer;
pub mod call;
pub mod callback;
pub mod future;
mod macros;

pub use bridge_abi;

pub use buffer::{
    rustbuffer_alloc, rustbuffer_free, rustbuffer_from_bytes, rustbuffer_reserve, NativeAllocator,
};
pub use call::{lower_result, lower_return, rust_call, try_lift_arg, CallFailure};
pub use callback::{check_foreign_status, ForeignCallError, ForeignFree, ForeignHandle, ForeignVTable};
pub use future::{
    rust_future_cancel, rust_future_complete, rust_future_free, rust_future_new, rust_future_poll,
    RustFuture,
};

#[cfg(test)]
#[path = "../tests/unit/test_call_status.rs"]
mod test_call_status;

#[cfg(test)]
#[path = "../tests/unit/test_buffer_lifecycle.rs"]
mod test_buffer_lifecycle;

#[cfg(test)]
#[path = "../tests/unit/test_rust_future.rs"]
mod test_rust_future;

#[cfg(test)]
#[path = "../tests/unit/test_foreign_callbacks.rs"]
mod test_foreign_callbacks;
