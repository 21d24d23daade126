//! Asynchronous entry points.
//!
//! These return a future handle straight away. Buffer arguments are lifted before the future
//! is created, so a future cancelled before its first poll owns no native buffer. A
//! malformed argument still surfaces from `complete` like any other failure. There is no
//! executor: timers are plain threads that wake the future through a oneshot channel.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use bridge_abi::{RustBuffer, RustFutureHandle};
use bridge_ffi::{lower_result, lower_return, rust_future_new, try_lift_arg, CallFailure};
use tokio::sync::oneshot;

use crate::api::divide;

static DROPPED_WAITS: AtomicUsize = AtomicUsize::new(0);

/// Number of `wait_forever` futures dropped so far.
pub fn dropped_waits() -> usize {
    DROPPED_WAITS.load(Ordering::SeqCst)
}

async fn sleep(delay: Duration) {
    let (tx, rx) = oneshot::channel();
    thread::spawn(move || {
        thread::sleep(delay);
        let _ = tx.send(());
    });
    // A dropped sender only happens if the timer thread died; waking early is harmless.
    let _ = rx.await;
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_delayed_greet(name: RustBuffer, delay_ms: u64) -> RustFutureHandle {
    let name = try_lift_arg::<String>("name", name);
    rust_future_new(async move {
        let name = name?;
        sleep(Duration::from_millis(delay_ms)).await;
        lower_return(format!("Hello, {}!", name))
    })
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_delayed_add(a: u32, b: u32, delay_ms: u64) -> RustFutureHandle {
    rust_future_new(async move {
        sleep(Duration::from_millis(delay_ms)).await;
        a.checked_add(b).ok_or_else(|| CallFailure::Internal(format!("{} + {} overflows u32", a, b)))
    })
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_checked_divide_later(a: f64, b: f64) -> RustFutureHandle {
    rust_future_new(async move {
        sleep(Duration::from_millis(1)).await;
        lower_result(divide(a, b))
    })
}

/// Counts itself in [`DROPPED_WAITS`] when the owning future is dropped.
struct WaitGuard;

impl Drop for WaitGuard {
    fn drop(&mut self) {
        DROPPED_WAITS.fetch_add(1, Ordering::SeqCst);
    }
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_wait_forever() -> RustFutureHandle {
    let guard = WaitGuard;
    rust_future_new(async move {
        let _guard = guard;
        std::future::pending::<()>().await;
        Ok::<(), CallFailure>(())
    })
}

fn explode(message: &str) -> Result<(), CallFailure> {
    panic!("{}", message)
}

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_panic_later(message: RustBuffer) -> RustFutureHandle {
    let message = try_lift_arg::<String>("message", message);
    rust_future_new(async move {
        let message = message?;
        sleep(Duration::from_millis(1)).await;
        explode(&message)
    })
}

#[cfg(test)]
#[path = "async_api_tests.rs"]
mod async_api_tests;
