//! Load-time validation of a native library against its bindings.

use bridge_abi::CONTRACT_VERSION;
use once_cell::sync::OnceCell;

use crate::error::StartupError;
use crate::library::{NativeLibrary, SymbolResolver};

/// What the bindings were generated against.
#[derive(Debug, Clone, Copy)]
pub struct ContractManifest {
    pub namespace: &'static str,
    pub contract_version: u32,
    /// `(function name, expected checksum)` for every domain function.
    pub checksums: &'static [(&'static str, u16)],
}

impl ContractManifest {
    pub const fn new(namespace: &'static str, checksums: &'static [(&'static str, u16)]) -> Self {
        Self {
            namespace,
            contract_version: CONTRACT_VERSION,
            checksums,
        }
    }

    /// Compares the contract version, then every checksum. Stops at the first difference.
    pub fn validate(&self, lib: &NativeLibrary) -> Result<(), StartupError> {
        let actual = lib.contract_version();
        if actual != self.contract_version {
            return Err(StartupError::ContractVersionMismatch {
                expected: self.contract_version,
                actual,
            });
        }
        for (function, expected) in self.checksums {
            let actual = lib.checksum(function)?;
            if actual != *expected {
                return Err(StartupError::ChecksumMismatch {
                    function: function.to_string(),
                    expected: *expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Opens the symbol source for a library.
pub type LibraryLoader = fn() -> Result<Box<dyn SymbolResolver>, StartupError>;

/// A process-wide library handle, loaded and validated on first use.
///
/// Initialization runs once. A failure is logged once and cached, so every later access sees
/// the same [`StartupError`] without touching the library again.
pub struct LazyLibrary {
    manifest: ContractManifest,
    loader: LibraryLoader,
    cell: OnceCell<Result<NativeLibrary, StartupError>>,
}

impl LazyLibrary {
    pub const fn new(manifest: ContractManifest, loader: LibraryLoader) -> Self {
        Self {
            manifest,
            loader,
            cell: OnceCell::new(),
        }
    }

    pub fn manifest(&self) -> &ContractManifest {
        &self.manifest
    }

    pub fn try_get(&self) -> Result<&NativeLibrary, StartupError> {
        self.cell.get_or_init(|| self.initialize()).as_ref().map_err(Clone::clone)
    }

    /// Returns the library, raising the startup failure if it could not be used.
    pub fn get(&self) -> &NativeLibrary {
        match self.try_get() {
            Ok(lib) => lib,
            Err(e) => std::panic::panic_any(e),
        }
    }

    fn initialize(&self) -> Result<NativeLibrary, StartupError> {
        let result = (self.loader)()
            .and_then(|resolver| NativeLibrary::load(resolver, self.manifest.namespace))
            .and_then(|lib| self.manifest.validate(&lib).map(|()| lib));
        match &result {
            Ok(_) => tracing::info!(
                "Loaded native library for {} (contract version {}, {} functions)",
                self.manifest.namespace,
                self.manifest.contract_version,
                self.manifest.checksums.len()
            ),
            Err(e) => tracing::error!("Native library for {} is unusable: {}", self.manifest.namespace, e),
        }
        result
    }
}
