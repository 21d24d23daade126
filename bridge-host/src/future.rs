//! Awaiting native futures.
//!
//! An async call returns a handle immediately. The host then polls it, parking a one-shot
//! continuation in [`CONTINUATIONS`] whose handle travels to native code as the poll's
//! callback data. Native code answers on whatever thread it likes through
//! [`continuation_callback`]; `MaybeReady` means poll again, `Ready` means the result can be
//! collected with `complete`. The handle is freed exactly once, after completion or after
//! cancellation, by [`FutureGuard`].

use bridge_abi::{FfiConverter, ProtocolError, RustBuffer, RustCallStatus, RustFutureHandle, RustFuturePoll};
use once_cell::sync::Lazy;
use tokio::sync::oneshot;

use crate::call::{check_status, raise};
use crate::error::{CallError, InternalError};
use crate::handle_map::HandleMap;
use crate::library::{FutureFfiType, NativeLibrary, RustFutureFns};

/// Continuations waiting for a poll result.
static CONTINUATIONS: Lazy<HandleMap<oneshot::Sender<i8>>> = Lazy::new(HandleMap::new);

/// The continuation passed to every native `poll`.
extern "C" fn continuation_callback(callback_data: u64, poll_result: i8) {
    match CONTINUATIONS.try_remove(callback_data) {
        Ok(sender) => {
            if sender.send(poll_result).is_err() {
                tracing::debug!("Continuation {} resolved after its caller went away", callback_data);
            }
        }
        // Unwinding out of an extern "C" callback would abort, so this is only logged.
        Err(e) => tracing::error!("Poll result {} for unknown continuation: {}", poll_result, e),
    }
}

/// Number of continuations currently parked.
pub fn pending_continuations() -> usize {
    CONTINUATIONS.len()
}

/// Cancels (unless completed) and frees the native future when dropped.
struct FutureGuard<T> {
    handle: RustFutureHandle,
    fns: RustFutureFns<T>,
    completed: bool,
}

impl<T> FutureGuard<T> {
    fn new(handle: RustFutureHandle, fns: RustFutureFns<T>) -> Self {
        Self {
            handle,
            fns,
            completed: false,
        }
    }

    async fn poll_until_ready(&self) -> Result<(), InternalError> {
        loop {
            let (sender, receiver) = oneshot::channel();
            let callback_data = CONTINUATIONS.insert(sender);
            // SAFETY: the handle is live until this guard drops.
            unsafe { (self.fns.poll)(self.handle, continuation_callback, callback_data) };
            let code = receiver.await.map_err(|_| InternalError::ContinuationDropped(callback_data))?;
            match RustFuturePoll::try_from(code) {
                Ok(RustFuturePoll::Ready) => return Ok(()),
                Ok(RustFuturePoll::MaybeReady) => continue,
                Err(other) => return Err(InternalError::UnknownPollResult(other)),
            }
        }
    }

    fn complete(&mut self, status: &mut RustCallStatus) -> T {
        self.completed = true;
        // SAFETY: called once, after a `Ready` poll.
        unsafe { (self.fns.complete)(self.handle, status) }
    }
}

impl<T> Drop for FutureGuard<T> {
    fn drop(&mut self) {
        // SAFETY: the handle has not been freed; this is the only place that frees it.
        unsafe {
            if !self.completed {
                tracing::debug!("Cancelling native future {:#x}", self.handle);
                (self.fns.cancel)(self.handle);
            }
            (self.fns.free)(self.handle);
        }
    }
}

/// Drives a native future to completion and lifts its result.
///
/// `T` is the lowered return type, which selects the native quartet. Dropping the returned
/// future before it resolves cancels the native computation and still frees it.
pub async fn try_rust_call_async<T, R, E, L>(
    lib: &NativeLibrary,
    handle: RustFutureHandle,
    lift: L,
) -> Result<R, CallError<E>>
where
    T: FutureFfiType,
    E: FfiConverter<FfiType = RustBuffer>,
    L: FnOnce(T) -> Result<R, ProtocolError>,
{
    let mut guard = FutureGuard::new(handle, T::future_fns(lib));
    guard.poll_until_ready().await?;

    let mut status = RustCallStatus::new();
    let value = guard.complete(&mut status);
    check_status::<E, _>(lib, status)?;
    Ok(lift(value)?)
}

/// Like [`try_rust_call_async`], returning domain errors and raising faults.
pub async fn rust_call_async<T, R, E, L>(lib: &NativeLibrary, handle: RustFutureHandle, lift: L) -> Result<R, E>
where
    T: FutureFfiType,
    E: FfiConverter<FfiType = RustBuffer>,
    L: FnOnce(T) -> Result<R, ProtocolError>,
{
    match try_rust_call_async(lib, handle, lift).await {
        Ok(value) => Ok(value),
        Err(CallError::Domain(e)) => Err(e),
        Err(CallError::Internal(e)) => raise(e),
    }
}

#[cfg(test)]
#[path = "future_tests.rs"]
mod future_tests;
