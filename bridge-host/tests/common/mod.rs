//! Bindings for the fixture library, written the way generated bindings look.
//!
//! The fixture is linked into the test binary and loaded from its static symbol table.
//! Every type is mirrored here rather than imported, so the wire format is the only
//! thing both sides share.

#![allow(dead_code)]

use std::convert::Infallible;
use std::sync::{Arc, Once};

use bridge_host::bridge_abi::{
    ffi_converter_enum, ffi_converter_record, signature_checksum, Bytes, FfiConverter, RustBuffer, RustCallStatus,
    RustFutureHandle,
};
use bridge_host::{
    foreign_call, lift_return, lower_arg, raise, rust_call, rust_call_async, rust_call_with_error, try_rust_call,
    try_rust_call_async, CallError, CallbackRegistry, ContractManifest, InternalResult, LazyLibrary, NativeLibrary,
    StartupError, StaticSymbols, SymbolResolver,
};
use once_cell::sync::Lazy;

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: String,
    pub amount_sats: u64,
    pub fee_sats: Option<u64>,
    pub tags: Vec<String>,
    pub confirmed: bool,
}

ffi_converter_record!(Activity {
    id: String,
    amount_sats: u64,
    fee_sats: Option<u64>,
    tags: Vec<String>,
    confirmed: bool,
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Bitcoin,
    Testnet,
    Signet,
    Regtest,
}

ffi_converter_enum!(Network {
    1 => Bitcoin,
    2 => Testnet,
    3 => Signet,
    4 => Regtest,
});

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentState {
    Pending,
    Succeeded {
        preimage: String,
        settled_at: u64,
    },
    Failed {
        reason: String,
    },
}

ffi_converter_enum!(PaymentState {
    1 => Pending,
    2 => Succeeded { preimage: String, settled_at: u64 },
    3 => Failed { reason: String },
});

#[derive(Debug, Clone, PartialEq)]
pub enum FixtureError {
    DivisionByZero,
    NotFound {
        key: String,
    },
    Rejected {
        reason: String,
    },
}

ffi_converter_enum!(FixtureError {
    1 => DivisionByZero,
    2 => NotFound { key: String },
    3 => Rejected { reason: String },
});

#[derive(Debug, Clone, PartialEq)]
pub enum LogError {
    Rejected {
        reason: String,
    },
}

ffi_converter_enum!(LogError {
    1 => Rejected { reason: String },
});

pub const CHECKSUMS: &[(&str, u16)] = &[
    ("add", signature_checksum("add(i32,i32)->i32")),
    ("greet", signature_checksum("greet(string)->string")),
    ("echo_activity", signature_checksum("echo_activity(Activity)->Activity")),
    ("echo_activities", signature_checksum("echo_activities(sequence<Activity>)->sequence<Activity>")),
    ("echo_state", signature_checksum("echo_state(PaymentState)->PaymentState")),
    ("echo_network", signature_checksum("echo_network(Network)->Network")),
    ("echo_bytes", signature_checksum("echo_bytes(bytes)->bytes")),
    ("divide", signature_checksum("divide(f64,f64)->f64!FixtureError")),
    ("lookup", signature_checksum("lookup(map<string,string>,string)->string!FixtureError")),
    ("fail_hard", signature_checksum("fail_hard(string)")),
    ("fail_without_message", signature_checksum("fail_without_message()")),
    ("emit_logs", signature_checksum("emit_logs(Logger,sequence<string>)->u32!FixtureError")),
    ("delayed_greet", signature_checksum("async delayed_greet(string,u64)->string")),
    ("delayed_add", signature_checksum("async delayed_add(u32,u32,u64)->u32")),
    ("checked_divide_later", signature_checksum("async checked_divide_later(f64,f64)->f64!FixtureError")),
    ("wait_forever", signature_checksum("async wait_forever()")),
    ("panic_later", signature_checksum("async panic_later(string)")),
];

pub const MANIFEST: ContractManifest = ContractManifest::new("fixture", CHECKSUMS);

pub fn fixture_symbols() -> StaticSymbols {
    StaticSymbols::from_iter(bridge_test_utils::exported_symbols())
}

fn load_fixture() -> Result<Box<dyn SymbolResolver>, StartupError> {
    Ok(Box::new(fixture_symbols()))
}

pub static FIXTURE: LazyLibrary = LazyLibrary::new(MANIFEST, load_fixture);

pub fn lib() -> &'static NativeLibrary {
    FIXTURE.get()
}

type ScalarBinaryFn<T> = unsafe extern "C" fn(T, T, &mut RustCallStatus) -> T;
type BufferUnaryFn = unsafe extern "C" fn(RustBuffer, &mut RustCallStatus) -> RustBuffer;

fn echo<T: FfiConverter<FfiType = RustBuffer>>(function: &str, value: T) -> T {
    let lib = lib();
    // SAFETY: every echo function takes and returns one buffer.
    let func: BufferUnaryFn = unsafe { lib.func(function) };
    let arg = lower_arg(lib, value);
    let ret = rust_call(lib, |status| unsafe { func(arg, status) });
    lift_return(lib, ret)
}

pub fn add(a: i32, b: i32) -> i32 {
    try_add(a, b).unwrap_or_else(|e| raise(e))
}

pub fn try_add(a: i32, b: i32) -> InternalResult<i32> {
    let lib = lib();
    let func: ScalarBinaryFn<i32> = unsafe { lib.func("add") };
    try_rust_call(lib, |status| unsafe { func(a, b, status) })
}

pub fn greet(name: &str) -> String {
    echo("greet", name.to_string())
}

pub fn echo_activity(activity: Activity) -> Activity {
    echo("echo_activity", activity)
}

pub fn echo_activities(activities: Vec<Activity>) -> Vec<Activity> {
    echo("echo_activities", activities)
}

pub fn echo_state(state: PaymentState) -> PaymentState {
    echo("echo_state", state)
}

pub fn echo_network(network: Network) -> Network {
    echo("echo_network", network)
}

pub fn echo_bytes(bytes: Vec<u8>) -> Vec<u8> {
    echo("echo_bytes", Bytes::from(bytes)).into()
}

pub fn divide(a: f64, b: f64) -> Result<f64, FixtureError> {
    let lib = lib();
    let func: ScalarBinaryFn<f64> = unsafe { lib.func("divide") };
    rust_call_with_error(lib, |status| unsafe { func(a, b, status) })
}

pub fn lookup(entries: std::collections::HashMap<String, String>, key: &str) -> Result<String, FixtureError> {
    let lib = lib();
    let func: unsafe extern "C" fn(RustBuffer, RustBuffer, &mut RustCallStatus) -> RustBuffer =
        unsafe { lib.func("lookup") };
    let entries = lower_arg(lib, entries);
    let key = lower_arg(lib, key.to_string());
    let ret = rust_call_with_error(lib, |status| unsafe { func(entries, key, status) })?;
    Ok(lift_return(lib, ret))
}

pub fn try_fail_hard(message: &str) -> InternalResult<()> {
    let lib = lib();
    let func: unsafe extern "C" fn(RustBuffer, &mut RustCallStatus) = unsafe { lib.func("fail_hard") };
    let message = lower_arg(lib, message.to_string());
    try_rust_call(lib, |status| unsafe { func(message, status) })
}

pub fn fail_hard(message: &str) {
    try_fail_hard(message).unwrap_or_else(|e| raise(e))
}

pub fn try_fail_without_message() -> InternalResult<()> {
    let lib = lib();
    let func: unsafe extern "C" fn(&mut RustCallStatus) = unsafe { lib.func("fail_without_message") };
    try_rust_call(lib, |status| unsafe { func(status) })
}

fn never<T>(err: Infallible) -> T {
    match err {}
}

pub async fn delayed_greet(name: &str, delay_ms: u64) -> String {
    let lib = lib();
    let func: unsafe extern "C" fn(RustBuffer, u64) -> RustFutureHandle = unsafe { lib.func("delayed_greet") };
    let handle = unsafe { func(lower_arg(lib, name.to_string()), delay_ms) };
    rust_call_async::<RustBuffer, String, Infallible, _>(lib, handle, |buf| String::try_lift(buf, lib))
        .await
        .unwrap_or_else(never)
}

pub async fn delayed_add(a: u32, b: u32, delay_ms: u64) -> u32 {
    let lib = lib();
    let func: unsafe extern "C" fn(u32, u32, u64) -> RustFutureHandle = unsafe { lib.func("delayed_add") };
    let handle = unsafe { func(a, b, delay_ms) };
    rust_call_async::<u32, u32, Infallible, _>(lib, handle, Ok).await.unwrap_or_else(never)
}

pub async fn checked_divide_later(a: f64, b: f64) -> Result<f64, FixtureError> {
    let lib = lib();
    let func: unsafe extern "C" fn(f64, f64) -> RustFutureHandle = unsafe { lib.func("checked_divide_later") };
    let handle = unsafe { func(a, b) };
    rust_call_async::<f64, f64, FixtureError, _>(lib, handle, Ok).await
}

pub async fn wait_forever() {
    let lib = lib();
    let func: unsafe extern "C" fn() -> RustFutureHandle = unsafe { lib.func("wait_forever") };
    let handle = unsafe { func() };
    rust_call_async::<(), (), Infallible, _>(lib, handle, Ok).await.unwrap_or_else(never)
}

pub async fn try_panic_later(message: &str) -> Result<(), CallError<Infallible>> {
    let lib = lib();
    let func: unsafe extern "C" fn(RustBuffer) -> RustFutureHandle = unsafe { lib.func("panic_later") };
    let handle = unsafe { func(lower_arg(lib, message.to_string())) };
    try_rust_call_async::<(), (), Infallible, _>(lib, handle, Ok).await
}

/// Host-implemented logger passed to `emit_logs`.
pub trait Logger: Send + Sync {
    fn log(&self, message: String) -> Result<(), LogError>;
}

pub static LOGGERS: Lazy<CallbackRegistry<dyn Logger>> = Lazy::new(|| CallbackRegistry::new("logger"));

#[repr(C)]
#[derive(Clone, Copy)]
struct LoggerVTable {
    log: extern "C" fn(handle: u64, message: RustBuffer, out_status: &mut RustCallStatus),
    free: extern "C" fn(handle: u64),
}

static LOGGER_VTABLE: LoggerVTable = LoggerVTable {
    log: logger_log,
    free: logger_free,
};

extern "C" fn logger_log(handle: u64, message: RustBuffer, out_status: &mut RustCallStatus) {
    let lib = lib();
    foreign_call(lib, out_status, || {
        let message: String = lift_return(lib, message);
        LOGGERS.get(handle).log(message)
    })
}

extern "C" fn logger_free(handle: u64) {
    LOGGERS.release(handle);
}

fn register_logger_vtable() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| {
        let lib = lib();
        let name = lib.symbol_names().callback_vtable("logger");
        let init: extern "C" fn(&LoggerVTable) = unsafe { lib.symbol(&name) }.unwrap_or_else(|e| raise(e));
        init(&LOGGER_VTABLE);
    });
}

pub fn emit_logs(logger: Arc<dyn Logger>, messages: Vec<String>) -> Result<u32, FixtureError> {
    register_logger_vtable();
    let lib = lib();
    let func: unsafe extern "C" fn(u64, RustBuffer, &mut RustCallStatus) -> u32 = unsafe { lib.func("emit_logs") };
    let handle = LOGGERS.register(logger);
    let messages = lower_arg(lib, messages);
    rust_call_with_error(lib, |status| unsafe { func(handle, messages, status) })
}
