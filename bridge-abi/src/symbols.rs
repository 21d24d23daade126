//! Exported symbol naming convention.
//!
//! These names are part of the ABI and must match the native library byte for byte.

use crate::future::FutureCategory;

/// The four async entry points exported per [`FutureCategory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FutureOp {
    Poll,
    Cancel,
    Free,
    Complete,
}

impl FutureOp {
    fn as_str(self) -> &'static str {
        match self {
            FutureOp::Poll => "poll",
            FutureOp::Cancel => "cancel",
            FutureOp::Free => "free",
            FutureOp::Complete => "complete",
        }
    }
}

/// Computes symbol names for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolNames {
    namespace: String,
}

impl SymbolNames {
    pub fn new(namespace: impl Into<String>) -> Self {
        SymbolNames {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn rustbuffer_alloc(&self) -> String {
        format!("ffi_{}_rustbuffer_alloc", self.namespace)
    }

    pub fn rustbuffer_from_bytes(&self) -> String {
        format!("ffi_{}_rustbuffer_from_bytes", self.namespace)
    }

    pub fn rustbuffer_free(&self) -> String {
        format!("ffi_{}_rustbuffer_free", self.namespace)
    }

    pub fn rustbuffer_reserve(&self) -> String {
        format!("ffi_{}_rustbuffer_reserve", self.namespace)
    }

    pub fn rust_future(&self, op: FutureOp, category: FutureCategory) -> String {
        format!("ffi_{}_rust_future_{}_{}", self.namespace, op.as_str(), category.symbol_suffix())
    }

    pub fn contract_version(&self) -> String {
        format!("ffi_{}_uniffi_contract_version", self.namespace)
    }

    /// Call entry point of a domain function.
    pub fn func(&self, name: &str) -> String {
        format!("uniffi_{}_fn_func_{}", self.namespace, name)
    }

    /// Load-time checksum of a domain function's signature.
    pub fn checksum_func(&self, name: &str) -> String {
        format!("uniffi_{}_checksum_func_{}", self.namespace, name)
    }

    /// Registers the vtable of a callback interface.
    pub fn callback_vtable(&self, interface: &str) -> String {
        format!("uniffi_{}_fn_init_callback_vtable_{}", self.namespace, interface)
    }
}
