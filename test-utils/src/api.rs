//! Synchronous entry points.
//!
//! Each takes lowered arguments plus the call status and returns a lowered value.

use std::collections::HashMap;

use bridge_abi::{Bytes, RustBuffer, RustCallStatus};
use bridge_ffi::{lower_result, lower_return, rust_call, try_lift_arg, CallFailure};

use crate::types::{Activity, FixtureError, Network, PaymentState};

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_add(a: i32, b: i32, call_status: &mut RustCallStatus) -> i32 {
    rust_call(call_status, || {
        a.checked_add(b).ok_or_else(|| CallFailure::Internal(format!("{} + {} overflows i32", a, b)))
    })
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_greet(name: RustBuffer, call_status: &mut RustCallStatus) -> RustBuffer {
    rust_call(call_status, || {
        let name: String = try_lift_arg("name", name)?;
        lower_return(format!("Hello, {}!", name))
    })
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_echo_activity(
    activity: RustBuffer,
    call_status: &mut RustCallStatus,
) -> RustBuffer {
    rust_call(call_status, || lower_return(try_lift_arg::<Activity>("activity", activity)?))
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_echo_activities(
    activities: RustBuffer,
    call_status: &mut RustCallStatus,
) -> RustBuffer {
    rust_call(call_status, || lower_return(try_lift_arg::<Vec<Activity>>("activities", activities)?))
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_echo_state(state: RustBuffer, call_status: &mut RustCallStatus) -> RustBuffer {
    rust_call(call_status, || lower_return(try_lift_arg::<PaymentState>("state", state)?))
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_echo_network(
    network: RustBuffer,
    call_status: &mut RustCallStatus,
) -> RustBuffer {
    rust_call(call_status, || lower_return(try_lift_arg::<Network>("network", network)?))
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_echo_bytes(bytes: RustBuffer, call_status: &mut RustCallStatus) -> RustBuffer {
    rust_call(call_status, || lower_return(try_lift_arg::<Bytes>("bytes", bytes)?))
}

pub(crate) fn divide(a: f64, b: f64) -> Result<f64, FixtureError> {
    if b == 0.0 {
        return Err(FixtureError::DivisionByZero);
    }
    Ok(a / b)
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_divide(a: f64, b: f64, call_status: &mut RustCallStatus) -> f64 {
    rust_call(call_status, || lower_result(divide(a, b)))
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_lookup(
    entries: RustBuffer,
    key: RustBuffer,
    call_status: &mut RustCallStatus,
) -> RustBuffer {
    rust_call(call_status, || {
        // Both buffers are consumed before either failure is reported.
        let entries = try_lift_arg::<HashMap<String, String>>("entries", entries);
        let key = try_lift_arg::<String>("key", key);
        let (entries, key) = (entries?, key?);
        let found = match entries.get(&key) {
            Some(value) => Ok(value.clone()),
            None => Err(FixtureError::NotFound {
                key,
            }),
        };
        lower_result(found)
    })
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_fail_hard(message: RustBuffer, call_status: &mut RustCallStatus) {
    rust_call(call_status, || {
        let message: String = try_lift_arg("message", message)?;
        panic!("{}", message)
    })
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_fail_without_message(call_status: &mut RustCallStatus) {
    rust_call(call_status, || -> Result<(), CallFailure> { std::panic::panic_any(0u8) })
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
