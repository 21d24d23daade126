//! Consumer side of the FFI bridge.
//!
//! Generated bindings use this crate to talk to a native library built with `bridge-ffi`:
//!
//! - [`LazyLibrary`] resolves the library once per process and validates its contract
//!   version and checksums before anything is called
//! - [`rust_call`] and friends pass a fresh [`RustCallStatus`](bridge_abi::RustCallStatus)
//!   into each call and turn its outcome into a domain error or an internal fault
//! - [`rust_call_async`] awaits a native future through poll continuations
//! - [`HandleMap`] and [`CallbackRegistry`] give host objects stable handles native code
//!   can hold on to
//!
//! Faults are split into three tiers, see [`error`].

pub mod buffer;
pub mod call;
pub mod callback;
pub mod config;
pub mod contract;
pub mod error;
pub mod future;
pub mod handle_map;
pub mod library;
pub mod logging;

pub use bridge_abi;

pub use buffer::OwnedBuffer;
pub use call::{
    check_internal_status, check_status, lift_return, lower_arg, raise, rust_call, rust_call_with_error,
    try_rust_call, try_rust_call_with_error,
};
pub use callback::{foreign_call, CallbackRegistry};
pub use config::LibraryConfig;
pub use contract::{ContractManifest, LazyLibrary, LibraryLoader};
pub use error::{CallError, InternalError, InternalResult, LoggingError, LoggingResult, StartupError};
pub use future::{pending_continuations, rust_call_async, try_rust_call_async};
pub use handle_map::HandleMap;
pub use library::{DynamicLibrary, FutureFfiType, NativeLibrary, RustFutureFns, StaticSymbols, SymbolResolver};
pub use logging::{init_console_logging, init_logging, LoggingConfig};

// Re-export for consumers
pub use tracing::level_filters::LevelFilter;
