//! Fixed lifecycle symbols, load-time checksums and the symbol table.

use std::os::raw::c_void;

use bridge_abi::{signature_checksum, RawPointer, RustBuffer, CONTRACT_VERSION};
use bridge_ffi::{export_buffer_fns, export_future_fns};

use crate::api::*;
use crate::async_api::*;
use crate::logger::*;

export_buffer_fns!(
    alloc = ffi_fixture_rustbuffer_alloc,
    from_bytes = ffi_fixture_rustbuffer_from_bytes,
    free = ffi_fixture_rustbuffer_free,
    reserve = ffi_fixture_rustbuffer_reserve,
);

export_future_fns!(
    u8,
    poll = ffi_fixture_rust_future_poll_u8,
    cancel = ffi_fixture_rust_future_cancel_u8,
    complete = ffi_fixture_rust_future_complete_u8,
    free = ffi_fixture_rust_future_free_u8,
);
export_future_fns!(
    i8,
    poll = ffi_fixture_rust_future_poll_i8,
    cancel = ffi_fixture_rust_future_cancel_i8,
    complete = ffi_fixture_rust_future_complete_i8,
    free = ffi_fixture_rust_future_free_i8,
);
export_future_fns!(
    u16,
    poll = ffi_fixture_rust_future_poll_u16,
    cancel = ffi_fixture_rust_future_cancel_u16,
    complete = ffi_fixture_rust_future_complete_u16,
    free = ffi_fixture_rust_future_free_u16,
);
export_future_fns!(
    i16,
    poll = ffi_fixture_rust_future_poll_i16,
    cancel = ffi_fixture_rust_future_cancel_i16,
    complete = ffi_fixture_rust_future_complete_i16,
    free = ffi_fixture_rust_future_free_i16,
);
export_future_fns!(
    u32,
    poll = ffi_fixture_rust_future_poll_u32,
    cancel = ffi_fixture_rust_future_cancel_u32,
    complete = ffi_fixture_rust_future_complete_u32,
    free = ffi_fixture_rust_future_free_u32,
);
export_future_fns!(
    i32,
    poll = ffi_fixture_rust_future_poll_i32,
    cancel = ffi_fixture_rust_future_cancel_i32,
    complete = ffi_fixture_rust_future_complete_i32,
    free = ffi_fixture_rust_future_free_i32,
);
export_future_fns!(
    u64,
    poll = ffi_fixture_rust_future_poll_u64,
    cancel = ffi_fixture_rust_future_cancel_u64,
    complete = ffi_fixture_rust_future_complete_u64,
    free = ffi_fixture_rust_future_free_u64,
);
export_future_fns!(
    i64,
    poll = ffi_fixture_rust_future_poll_i64,
    cancel = ffi_fixture_rust_future_cancel_i64,
    complete = ffi_fixture_rust_future_complete_i64,
    free = ffi_fixture_rust_future_free_i64,
);
export_future_fns!(
    f32,
    poll = ffi_fixture_rust_future_poll_f32,
    cancel = ffi_fixture_rust_future_cancel_f32,
    complete = ffi_fixture_rust_future_complete_f32,
    free = ffi_fixture_rust_future_free_f32,
);
export_future_fns!(
    f64,
    poll = ffi_fixture_rust_future_poll_f64,
    cancel = ffi_fixture_rust_future_cancel_f64,
    complete = ffi_fixture_rust_future_complete_f64,
    free = ffi_fixture_rust_future_free_f64,
);
export_future_fns!(
    RawPointer,
    poll = ffi_fixture_rust_future_poll_pointer,
    cancel = ffi_fixture_rust_future_cancel_pointer,
    complete = ffi_fixture_rust_future_complete_pointer,
    free = ffi_fixture_rust_future_free_pointer,
);
export_future_fns!(
    RustBuffer,
    poll = ffi_fixture_rust_future_poll_rust_buffer,
    cancel = ffi_fixture_rust_future_cancel_rust_buffer,
    complete = ffi_fixture_rust_future_complete_rust_buffer,
    free = ffi_fixture_rust_future_free_rust_buffer,
);
export_future_fns!(
    (),
    poll = ffi_fixture_rust_future_poll_void,
    cancel = ffi_fixture_rust_future_cancel_void,
    complete = ffi_fixture_rust_future_complete_void,
    free = ffi_fixture_rust_future_free_void,
);

#[no_mangle]
pub extern "C" fn ffi_fixture_uniffi_contract_version() -> u32 {
    CONTRACT_VERSION
}

/// Declares the canonical signature of every domain function and exports its checksum.
macro_rules! checksums {
    ($($function:ident => $export:ident = $signature:literal,)*) => {
        /// `(function, checksum)` for every domain function, in declaration order.
        pub const CHECKSUMS: &[(&str, u16)] = &[$((stringify!($function), signature_checksum($signature)),)*];

        $(
            #[no_mangle]
            pub extern "C" fn $export() -> u16 {
                signature_checksum($signature)
            }
        )*

        fn checksum_symbols() -> Vec<(&'static str, *const c_void)> {
            vec![$((stringify!($export), $export as *const c_void),)*]
        }
    };
}

checksums! {
    add => uniffi_fixture_checksum_func_add = "add(i32,i32)->i32",
    greet => uniffi_fixture_checksum_func_greet = "greet(string)->string",
    echo_activity => uniffi_fixture_checksum_func_echo_activity = "echo_activity(Activity)->Activity",
    echo_activities => uniffi_fixture_checksum_func_echo_activities = "echo_activities(sequence<Activity>)->sequence<Activity>",
    echo_state => uniffi_fixture_checksum_func_echo_state = "echo_state(PaymentState)->PaymentState",
    echo_network => uniffi_fixture_checksum_func_echo_network = "echo_network(Network)->Network",
    echo_bytes => uniffi_fixture_checksum_func_echo_bytes = "echo_bytes(bytes)->bytes",
    divide => uniffi_fixture_checksum_func_divide = "divide(f64,f64)->f64!FixtureError",
    lookup => uniffi_fixture_checksum_func_lookup = "lookup(map<string,string>,string)->string!FixtureError",
    fail_hard => uniffi_fixture_checksum_func_fail_hard = "fail_hard(string)",
    fail_without_message => uniffi_fixture_checksum_func_fail_without_message = "fail_without_message()",
    emit_logs => uniffi_fixture_checksum_func_emit_logs = "emit_logs(Logger,sequence<string>)->u32!FixtureError",
    delayed_greet => uniffi_fixture_checksum_func_delayed_greet = "async delayed_greet(string,u64)->string",
    delayed_add => uniffi_fixture_checksum_func_delayed_add = "async delayed_add(u32,u32,u64)->u32",
    checked_divide_later => uniffi_fixture_checksum_func_checked_divide_later = "async checked_divide_later(f64,f64)->f64!FixtureError",
    wait_forever => uniffi_fixture_checksum_func_wait_forever = "async wait_forever()",
    panic_later => uniffi_fixture_checksum_func_panic_later = "async panic_later(string)",
}

/// Lists symbols by name.
macro_rules! symbols {
    ($($symbol:ident),* $(,)?) => {
        vec![$((stringify!($symbol), $symbol as *const c_void)),*]
    };
}

/// Every symbol the fixture exports, by name, for loading it as a static symbol table when
/// it is linked into the host binary instead of opened as a shared library.
pub fn exported_symbols() -> Vec<(&'static str, *const c_void)> {
    let mut table = symbols![
        ffi_fixture_rustbuffer_alloc,
        ffi_fixture_rustbuffer_from_bytes,
        ffi_fixture_rustbuffer_free,
        ffi_fixture_rustbuffer_reserve,
        ffi_fixture_uniffi_contract_version,
        uniffi_fixture_fn_func_add,
        uniffi_fixture_fn_func_greet,
        uniffi_fixture_fn_func_echo_activity,
        uniffi_fixture_fn_func_echo_activities,
        uniffi_fixture_fn_func_echo_state,
        uniffi_fixture_fn_func_echo_network,
        uniffi_fixture_fn_func_echo_bytes,
        uniffi_fixture_fn_func_divide,
        uniffi_fixture_fn_func_lookup,
        uniffi_fixture_fn_func_fail_hard,
        uniffi_fixture_fn_func_fail_without_message,
        uniffi_fixture_fn_func_emit_logs,
        uniffi_fixture_fn_func_delayed_greet,
        uniffi_fixture_fn_func_delayed_add,
        uniffi_fixture_fn_func_checked_divide_later,
        uniffi_fixture_fn_func_wait_forever,
        uniffi_fixture_fn_func_panic_later,
        uniffi_fixture_fn_init_callback_vtable_logger,
    ];
    table.extend(symbols![
        ffi_fixture_rust_future_poll_u8,
        ffi_fixture_rust_future_cancel_u8,
        ffi_fixture_rust_future_complete_u8,
        ffi_fixture_rust_future_free_u8,
        ffi_fixture_rust_future_poll_i8,
        ffi_fixture_rust_future_cancel_i8,
        ffi_fixture_rust_future_complete_i8,
        ffi_fixture_rust_future_free_i8,
        ffi_fixture_rust_future_poll_u16,
        ffi_fixture_rust_future_cancel_u16,
        ffi_fixture_rust_future_complete_u16,
        ffi_fixture_rust_future_free_u16,
        ffi_fixture_rust_future_poll_i16,
        ffi_fixture_rust_future_cancel_i16,
        ffi_fixture_rust_future_complete_i16,
        ffi_fixture_rust_future_free_i16,
        ffi_fixture_rust_future_poll_u32,
        ffi_fixture_rust_future_cancel_u32,
        ffi_fixture_rust_future_complete_u32,
        ffi_fixture_rust_future_free_u32,
        ffi_fixture_rust_future_poll_i32,
        ffi_fixture_rust_future_cancel_i32,
        ffi_fixture_rust_future_complete_i32,
        ffi_fixture_rust_future_free_i32,
        ffi_fixture_rust_future_poll_u64,
        ffi_fixture_rust_future_cancel_u64,
        ffi_fixture_rust_future_complete_u64,
        ffi_fixture_rust_future_free_u64,
        ffi_fixture_rust_future_poll_i64,
        ffi_fixture_rust_future_cancel_i64,
        ffi_fixture_rust_future_complete_i64,
        ffi_fixture_rust_future_free_i64,
        ffi_fixture_rust_future_poll_f32,
        ffi_fixture_rust_future_cancel_f32,
        ffi_fixture_rust_future_complete_f32,
        ffi_fixture_rust_future_free_f32,
        ffi_fixture_rust_future_poll_f64,
        ffi_fixture_rust_future_cancel_f64,
        ffi_fixture_rust_future_complete_f64,
        ffi_fixture_rust_future_free_f64,
        ffi_fixture_rust_future_poll_pointer,
        ffi_fixture_rust_future_cancel_pointer,
        ffi_fixture_rust_future_complete_pointer,
        ffi_fixture_rust_future_free_pointer,
        ffi_fixture_rust_future_poll_rust_buffer,
        ffi_fixture_rust_future_cancel_rust_buffer,
        ffi_fixture_rust_future_complete_rust_buffer,
        ffi_fixture_rust_future_free_rust_buffer,
        ffi_fixture_rust_future_poll_void,
        ffi_fixture_rust_future_cancel_void,
        ffi_fixture_rust_future_complete_void,
        ffi_fixture_rust_future_free_void,
    ]);
    table.extend(checksum_symbols());
    table
}

#[cfg(test)]
#[path = "scaffolding_tests.rs"]
mod scaffolding_tests;
