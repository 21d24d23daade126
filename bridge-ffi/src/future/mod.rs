//! Native futures driven by host polls.
//!
//! No executor runs on the native side. A [`RustFuture`] only makes progress when the host
//! calls `poll`; when the inner future is not ready, its waker is wired to the continuation
//! the host passed in, so a wake-up on any thread turns into one `MaybeReady` callback.
//!
//! Handles are `Arc<RustFuture<T>>` pointers cast to `u64`. The host owns exactly one
//! strong reference per handle and gives it up with `free`.

mod scheduler;

use std::future::Future;
use std::mem;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Wake, Waker};

use bridge_abi::{
    FfiDefault, RustCallStatus, RustFutureContinuationCallback, RustFutureHandle,
    RustFuturePoll,
};

use self::scheduler::{PendingCallback, Scheduler};
use crate::call::{discard_buffer, panic_message, rust_call, CallFailure};

type BoxedFuture<T> = Pin<Box<dyn Future<Output = Result<T, CallFailure>> + Send + 'static>>;

enum FutureState<T> {
    Running(BoxedFuture<T>),
    Complete(Result<T, CallFailure>),
    Consumed,
}

/// An in-flight native computation producing an already-lowered `T`.
pub struct RustFuture<T> {
    state: Mutex<FutureState<T>>,
    scheduler: Mutex<Scheduler>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> RustFuture<T>
where
    T: FfiDefault + Send + 'static,
{
    pub fn new<F>(future: F) -> Arc<Self>
    where
        F: Future<Output = Result<T, CallFailure>> + Send + 'static,
    {
        Arc::new(Self {
            state: Mutex::new(FutureState::Running(Box::pin(future))),
            scheduler: Mutex::new(Scheduler::Empty),
        })
    }

    /// Polls the inner future once. `callback` fires exactly once for this poll: immediately
    /// with `Ready` if the result is available (or the future was cancelled), otherwise with
    /// `MaybeReady` after the next wake-up.
    pub fn poll(self: &Arc<Self>, callback: RustFutureContinuationCallback, data: u64) {
        // The scheduler lock must be released before polling: the inner future may wake
        // itself synchronously.
        let cancelled = lock(&self.scheduler).is_cancelled();
        let ready = cancelled || self.poll_inner();
        let pending = if ready {
            Some(PendingCallback::new(callback, data, RustFuturePoll::Ready))
        } else {
            lock(&self.scheduler).store(callback, data)
        };
        if let Some(pending) = pending {
            pending.invoke();
        }
    }

    /// Returns true once a result is stored.
    fn poll_inner(self: &Arc<Self>) -> bool {
        let mut state = lock(&self.state);
        let FutureState::Running(future) = &mut *state else {
            return true;
        };
        let waker = Waker::from(Arc::clone(self));
        let mut cx = Context::from_waker(&waker);
        match panic::catch_unwind(AssertUnwindSafe(|| future.as_mut().poll(&mut cx))) {
            Ok(Poll::Pending) => false,
            Ok(Poll::Ready(result)) => {
                *state = FutureState::Complete(result);
                true
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref())
                    .unwrap_or_else(|| "native future panicked".to_string());
                tracing::warn!("Caught panic while polling native future: {}", message);
                *state = FutureState::Complete(Err(CallFailure::Internal(message)));
                true
            }
        }
    }

    /// Requests cancellation. A stored continuation fires with `Ready`, later polls report
    /// `Ready` right away, and the inner future is dropped.
    pub fn cancel(&self) {
        let pending = lock(&self.scheduler).cancel();
        if let Some(pending) = pending {
            pending.invoke();
        }
        let dropped = mem::replace(&mut *lock(&self.state), FutureState::Consumed);
        release(dropped);
    }

    /// Hands the result over through `out_status`. Can only succeed once.
    pub fn complete(&self, out_status: &mut RustCallStatus) -> T {
        let result = {
            let mut state = lock(&self.state);
            match mem::replace(&mut *state, FutureState::Consumed) {
                FutureState::Complete(result) => result,
                FutureState::Running(future) => {
                    *state = FutureState::Running(future);
                    Err(CallFailure::Internal("Future completed before it was ready".to_string()))
                }
                FutureState::Consumed => Err(CallFailure::Internal(
                    "Future result already consumed or cancelled".to_string(),
                )),
            }
        };
        rust_call(out_status, move || result)
    }

    /// Drops the inner future or any unclaimed result. Waker clones held elsewhere keep the
    /// allocation alive but no longer reference the computation.
    pub fn free(&self) {
        let dropped = mem::replace(&mut *lock(&self.state), FutureState::Consumed);
        release(dropped);
    }
}

fn release<T>(state: FutureState<T>) {
    // A typed error nobody collected is the one buffer we still own.
    if let FutureState::Complete(Err(CallFailure::Error(buf))) = state {
        discard_buffer(buf);
    }
}

impl<T> Wake for RustFuture<T>
where
    T: FfiDefault + Send + 'static,
{
    fn wake(self: Arc<Self>) {
        self.wake_by_ref()
    }

    fn wake_by_ref(self: &Arc<Self>) {
        let pending = lock(&self.scheduler).wake();
        if let Some(pending) = pending {
            pending.invoke();
        }
    }
}

/// Leaks a new future into a handle owned by the host.
pub fn rust_future_new<F, T>(future: F) -> RustFutureHandle
where
    F: Future<Output = Result<T, CallFailure>> + Send + 'static,
    T: FfiDefault + Send + 'static,
{
    Arc::into_raw(RustFuture::new(future)) as RustFutureHandle
}

/// Borrows the future behind a handle without consuming the host's reference.
///
/// # Safety
/// `handle` must come from [`rust_future_new`] with the same `T` and not yet be freed.
unsafe fn borrow_handle<T>(handle: RustFutureHandle) -> Arc<RustFuture<T>> {
    let ptr = handle as *const RustFuture<T>;
    Arc::increment_strong_count(ptr);
    Arc::from_raw(ptr)
}

/// # Safety
/// `handle` must come from [`rust_future_new`] with the same `T` and not yet be freed.
pub unsafe fn rust_future_poll<T>(
    handle: RustFutureHandle,
    callback: RustFutureContinuationCallback,
    callback_data: u64,
) where
    T: FfiDefault + Send + 'static,
{
    borrow_handle::<T>(handle).poll(callback, callback_data)
}

/// # Safety
/// `handle` must come from [`rust_future_new`] with the same `T` and not yet be freed.
pub unsafe fn rust_future_cancel<T>(handle: RustFutureHandle)
where
    T: FfiDefault + Send + 'static,
{
    tracing::debug!("Cancelling native future {:#x}", handle);
    borrow_handle::<T>(handle).cancel()
}

/// # Safety
/// `handle` must come from [`rust_future_new`] with the same `T` and not yet be freed.
pub unsafe fn rust_future_complete<T>(handle: RustFutureHandle, out_status: &mut RustCallStatus) -> T
where
    T: FfiDefault + Send + 'static,
{
    borrow_handle::<T>(handle).complete(out_status)
}

/// Releases the host's reference. The handle is dangling afterwards.
///
/// # Safety
/// `handle` must come from [`rust_future_new`] with the same `T` and must not be used again.
pub unsafe fn rust_future_free<T>(handle: RustFutureHandle)
where
    T: FfiDefault + Send + 'static,
{
    let future = Arc::from_raw(handle as *const RustFuture<T>);
    future.free();
}
