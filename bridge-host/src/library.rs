//! Resolving and holding the native library's entry points.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::mem;
use std::os::raw::c_void;

use bridge_abi::{
    BufferAllocator, ForeignBytes, FutureCategory, FutureOp, ProtocolError, ProtocolResult,
    RawPointer, RustBuffer, RustCallStatus, RustCallStatusCode, RustFutureContinuationCallback,
    RustFutureHandle, SymbolNames,
};

use crate::call::raise;
use crate::error::{InternalError, InternalResult, StartupError};

/// Looks up exported symbols by name.
pub trait SymbolResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Option<*const c_void>;
}

/// A fixed name-to-address table, for libraries linked into the current binary.
#[derive(Debug, Clone, Default)]
pub struct StaticSymbols {
    // Stored as addresses so the table is `Send + Sync`.
    symbols: HashMap<String, usize>,
}

impl StaticSymbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one entry.
    pub fn with(mut self, name: impl Into<String>, address: *const c_void) -> Self {
        self.insert(name, address);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, address: *const c_void) {
        self.symbols.insert(name.into(), address as usize);
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, *const c_void)> for StaticSymbols {
    fn from_iter<I: IntoIterator<Item = (S, *const c_void)>>(iter: I) -> Self {
        let mut table = StaticSymbols::new();
        for (name, address) in iter {
            table.insert(name, address);
        }
        table
    }
}

impl SymbolResolver for StaticSymbols {
    fn resolve(&self, name: &str) -> Option<*const c_void> {
        self.symbols.get(name).map(|address| *address as *const c_void)
    }
}

/// A shared library opened at runtime.
#[derive(Debug)]
pub struct DynamicLibrary {
    path: String,
    library: libloading::Library,
}

impl DynamicLibrary {
    /// Opens the library. Its initialization routines run as part of this call.
    pub fn open(path: impl AsRef<OsStr>) -> Result<Self, StartupError> {
        let path = path.as_ref();
        let display_path = path.to_string_lossy().into_owned();
        tracing::debug!("Opening native library {}", display_path);
        // SAFETY: loading runs the library's initializers; libraries built for these bindings
        // have none with preconditions.
        let library = unsafe { libloading::Library::new(path) }.map_err(|e| StartupError::LibraryLoad {
            path: display_path.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            path: display_path,
            library,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl SymbolResolver for DynamicLibrary {
    fn resolve(&self, name: &str) -> Option<*const c_void> {
        // SAFETY: the address is only reinterpreted by callers that know its real type.
        let symbol = unsafe { self.library.get::<*const c_void>(name.as_bytes()) }.ok()?;
        Some(*symbol)
    }
}

type AllocFn = unsafe extern "C" fn(u64, &mut RustCallStatus) -> RustBuffer;
type FromBytesFn = unsafe extern "C" fn(ForeignBytes, &mut RustCallStatus) -> RustBuffer;
type FreeFn = unsafe extern "C" fn(RustBuffer, &mut RustCallStatus);
type ReserveFn = unsafe extern "C" fn(RustBuffer, u64, &mut RustCallStatus) -> RustBuffer;
type ContractVersionFn = unsafe extern "C" fn() -> u32;
type ChecksumFn = unsafe extern "C" fn() -> u16;

/// The poll/cancel/complete/free quartet of one return-type category.
pub struct RustFutureFns<T> {
    pub poll: unsafe extern "C" fn(RustFutureHandle, RustFutureContinuationCallback, u64),
    pub cancel: unsafe extern "C" fn(RustFutureHandle),
    pub complete: unsafe extern "C" fn(RustFutureHandle, &mut RustCallStatus) -> T,
    pub free: unsafe extern "C" fn(RustFutureHandle),
}

impl<T> Clone for RustFutureFns<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RustFutureFns<T> {}

/// Lowered return types an async call can complete with.
pub trait FutureFfiType: Sized {
    const CATEGORY: FutureCategory;

    fn future_fns(lib: &NativeLibrary) -> RustFutureFns<Self>;
}

macro_rules! future_table {
    ($($field:ident: $ty:ty => $category:ident),* $(,)?) => {
        struct FutureTable {
            $($field: RustFutureFns<$ty>,)*
        }

        impl FutureTable {
            fn resolve(resolver: &dyn SymbolResolver, names: &SymbolNames) -> Result<Self, StartupError> {
                Ok(FutureTable {
                    $($field: resolve_future_fns(resolver, names, FutureCategory::$category)?,)*
                })
            }
        }

        $(
            impl FutureFfiType for $ty {
                const CATEGORY: FutureCategory = FutureCategory::$category;

                fn future_fns(lib: &NativeLibrary) -> RustFutureFns<Self> {
                    lib.futures.$field
                }
            }
        )*
    };
}

future_table! {
    u8: u8 => U8,
    i8: i8 => I8,
    u16: u16 => U16,
    i16: i16 => I16,
    u32: u32 => U32,
    i32: i32 => I32,
    u64: u64 => U64,
    i64: i64 => I64,
    f32: f32 => F32,
    f64: f64 => F64,
    pointer: RawPointer => Pointer,
    rust_buffer: RustBuffer => RustBuffer,
    void: () => Void,
}

/// Reinterprets a resolved address as a function pointer of type `F`.
///
/// # Safety
/// The symbol behind `name` must really have type `F`.
unsafe fn resolve_as<F: Copy>(resolver: &dyn SymbolResolver, name: &str) -> Option<F> {
    debug_assert_eq!(mem::size_of::<F>(), mem::size_of::<*const c_void>());
    let address = resolver.resolve(name).filter(|address| !address.is_null())?;
    Some(mem::transmute_copy::<*const c_void, F>(&address))
}

fn require<F: Copy>(resolver: &dyn SymbolResolver, name: String) -> Result<F, StartupError> {
    // SAFETY: every name passed here is a scaffolding symbol whose type is fixed by the
    // contract version, which is checked right after resolution.
    unsafe { resolve_as::<F>(resolver, &name) }.ok_or(StartupError::MissingSymbol(name))
}

fn resolve_future_fns<T>(
    resolver: &dyn SymbolResolver,
    names: &SymbolNames,
    category: FutureCategory,
) -> Result<RustFutureFns<T>, StartupError> {
    Ok(RustFutureFns {
        poll: require(resolver, names.rust_future(FutureOp::Poll, category))?,
        cancel: require(resolver, names.rust_future(FutureOp::Cancel, category))?,
        complete: require(resolver, names.rust_future(FutureOp::Complete, category))?,
        free: require(resolver, names.rust_future(FutureOp::Free, category))?,
    })
}

/// A native library whose scaffolding entry points have all been resolved.
pub struct NativeLibrary {
    names: SymbolNames,
    resolver: Box<dyn SymbolResolver>,
    rustbuffer_alloc: AllocFn,
    rustbuffer_from_bytes: FromBytesFn,
    rustbuffer_free: FreeFn,
    rustbuffer_reserve: ReserveFn,
    contract_version: ContractVersionFn,
    futures: FutureTable,
}

impl NativeLibrary {
    /// Resolves the buffer, contract and future entry points of `namespace`.
    pub fn load(resolver: Box<dyn SymbolResolver>, namespace: &str) -> Result<Self, StartupError> {
        let names = SymbolNames::new(namespace);
        let r = resolver.as_ref();
        let library = NativeLibrary {
            rustbuffer_alloc: require(r, names.rustbuffer_alloc())?,
            rustbuffer_from_bytes: require(r, names.rustbuffer_from_bytes())?,
            rustbuffer_free: require(r, names.rustbuffer_free())?,
            rustbuffer_reserve: require(r, names.rustbuffer_reserve())?,
            contract_version: require(r, names.contract_version())?,
            futures: FutureTable::resolve(r, &names)?,
            names,
            resolver,
        };
        tracing::debug!("Resolved scaffolding for namespace {}", namespace);
        Ok(library)
    }

    pub fn namespace(&self) -> &str {
        self.names.namespace()
    }

    pub fn symbol_names(&self) -> &SymbolNames {
        &self.names
    }

    pub fn contract_version(&self) -> u32 {
        // SAFETY: resolved with the contract's fixed signature.
        unsafe { (self.contract_version)() }
    }

    /// Reads the load-time checksum of a domain function.
    pub fn checksum(&self, function: &str) -> Result<u16, StartupError> {
        let checksum: ChecksumFn = require(self.resolver.as_ref(), self.names.checksum_func(function))?;
        // SAFETY: checksum symbols take nothing and return a u16.
        Ok(unsafe { checksum() })
    }

    /// Resolves the call entry point of a domain function.
    ///
    /// # Safety
    /// `F` must be the exact `extern "C"` signature the library exports for `function`.
    pub unsafe fn try_func<F: Copy>(&self, function: &str) -> InternalResult<F> {
        let name = self.names.func(function);
        resolve_as::<F>(self.resolver.as_ref(), &name).ok_or(InternalError::MissingSymbol(name))
    }

    /// Like [`NativeLibrary::try_func`], raising a missing symbol as an internal fault.
    ///
    /// # Safety
    /// See [`NativeLibrary::try_func`].
    pub unsafe fn func<F: Copy>(&self, function: &str) -> F {
        self.try_func(function).unwrap_or_else(|e| raise(e))
    }

    /// Resolves an arbitrary symbol, e.g. a callback vtable initializer.
    ///
    /// # Safety
    /// `F` must be the exact type of the exported symbol.
    pub unsafe fn symbol<F: Copy>(&self, name: &str) -> InternalResult<F> {
        resolve_as::<F>(self.resolver.as_ref(), name).ok_or_else(|| InternalError::MissingSymbol(name.to_string()))
    }

    pub fn rustbuffer_alloc(&self, size: u64) -> InternalResult<RustBuffer> {
        let mut status = RustCallStatus::new();
        // SAFETY: resolved with the contract's fixed signature.
        let buf = unsafe { (self.rustbuffer_alloc)(size, &mut status) };
        lifecycle_status(status)?;
        if buf.data.is_null() && buf.capacity > 0 {
            return Err(ProtocolError::NullData(buf.capacity).into());
        }
        Ok(buf)
    }

    pub fn rustbuffer_from_bytes(&self, bytes: &[u8]) -> InternalResult<RustBuffer> {
        let foreign = ForeignBytes::from_slice(bytes)?;
        let mut status = RustCallStatus::new();
        // SAFETY: `foreign` borrows `bytes`, which outlives the call.
        let buf = unsafe { (self.rustbuffer_from_bytes)(foreign, &mut status) };
        lifecycle_status(status)?;
        Ok(buf)
    }

    /// Frees a buffer. The value must not be used again, whatever the outcome.
    pub fn rustbuffer_free(&self, buf: RustBuffer) -> InternalResult<()> {
        let mut status = RustCallStatus::new();
        // SAFETY: ownership moves to the library.
        unsafe { (self.rustbuffer_free)(buf, &mut status) };
        lifecycle_status(status)
    }

    /// Grows a buffer, preserving its first `len` bytes. The old value must not be used again.
    pub fn rustbuffer_reserve(&self, buf: RustBuffer, additional: u64) -> InternalResult<RustBuffer> {
        let mut status = RustCallStatus::new();
        // SAFETY: ownership moves to the library and comes back in the result.
        let buf = unsafe { (self.rustbuffer_reserve)(buf, additional, &mut status) };
        lifecycle_status(status)?;
        Ok(buf)
    }
}

/// Checks the status of a buffer lifecycle call.
///
/// A failure message is copied out but its buffer is deliberately leaked: freeing it would go
/// through the very entry point that may be failing.
fn lifecycle_status(status: RustCallStatus) -> InternalResult<()> {
    match status.code() {
        Ok(RustCallStatusCode::Success) => Ok(()),
        Ok(_) => {
            // SAFETY: the library filled in the buffer during the call; it is only read here.
            let message = match status.error_buf.check() {
                Ok(()) => String::from_utf8_lossy(unsafe { status.error_buf.as_slice() }).into_owned(),
                Err(e) => e.to_string(),
            };
            Err(InternalError::BufferLifecycle(message))
        }
        Err(code) => Err(InternalError::UnknownStatusCode(code)),
    }
}

impl BufferAllocator for NativeLibrary {
    fn alloc(&self, size: u64) -> ProtocolResult<RustBuffer> {
        self.rustbuffer_alloc(size).map_err(|e| ProtocolError::Allocation(e.to_string()))
    }

    fn free(&self, buf: RustBuffer) -> ProtocolResult<()> {
        self.rustbuffer_free(buf).map_err(|e| ProtocolError::Allocation(e.to_string()))
    }
}

impl std::fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLibrary").field("namespace", &self.namespace()).finish_non_exhaustive()
    }
}
