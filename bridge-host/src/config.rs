//! Which native library to open.

use std::env;
use std::path::PathBuf;

use crate::error::StartupError;
use crate::library::{DynamicLibrary, SymbolResolver};

/// Configuration for locating a native library.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Namespace the library's symbols are exported under.
    pub namespace: String,
    /// Base name of the library, without platform prefix or extension (`fixture` for
    /// `libfixture.so`).
    pub library_name: String,
    /// Directory to look in. If None, the platform loader's search path is used.
    pub search_dir: Option<PathBuf>,
}

impl LibraryConfig {
    pub fn new(namespace: impl Into<String>, library_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            library_name: library_name.into(),
            search_dir: None,
        }
    }

    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dir = Some(dir.into());
        self
    }

    /// `FIXTURE_LIBRARY_OVERRIDE` for namespace `fixture`.
    pub fn override_env_var(&self) -> String {
        format!("{}_LIBRARY_OVERRIDE", self.namespace.to_uppercase())
    }

    /// The path to open. A non-empty override variable wins over everything else.
    pub fn resolve_path(&self) -> PathBuf {
        if let Some(path) = env::var_os(self.override_env_var()).filter(|v| !v.is_empty()) {
            return PathBuf::from(path);
        }
        let file_name = libloading::library_filename(&self.library_name);
        match &self.search_dir {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Opens the resolved library as a symbol source.
    pub fn open(&self) -> Result<Box<dyn SymbolResolver>, StartupError> {
        let path = self.resolve_path();
        tracing::debug!("Library for {} resolved to {}", self.namespace, path.display());
        Ok(Box::new(DynamicLibrary::open(path)?))
    }
}
