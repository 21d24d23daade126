//! Fixture native library for the bridge's tests.
//!
//! Exports a small domain under the namespace `fixture` with every kind of entry point the
//! bridge supports: plain and fallible synchronous functions, functions that panic,
//! asynchronous functions of several return categories, and a function driving a
//! host-implemented callback interface. It builds both as an `rlib`, so host tests can link
//! it and load it through [`exported_symbols`], and as a `cdylib` for dynamic loading.

pub mod api;
pub mod async_api;
pub mod logger;
pub mod scaffolding;
pub mod types;

pub use async_api::dropped_waits;
pub use logger::LoggerVTable;
pub use scaffolding::{exported_symbols, CHECKSUMS};
pub use types::{Activity, FixtureError, LogError, Network, PaymentState};

/// Namespace of every exported symbol.
pub const NAMESPACE: &str = "fixture";
