use std::mem;

use bridge_abi::{RustFutureContinuationCallback, RustFuturePoll};

/// Tracks the host's continuation between a `Pending` poll and the next wake-up.
///
/// The continuation fires at most once per poll: either when the inner future wakes
/// (`MaybeReady`) or when the future is cancelled (`Ready`).
#[derive(Debug, Default)]
pub(super) enum Scheduler {
    /// No continuation stored and no wake-up seen since the last poll.
    #[default]
    Empty,
    /// Woken before the host stored a continuation; the next `store` fires immediately.
    Waked,
    /// Waiting for a wake-up.
    Set(RustFutureContinuationCallback, u64),
    /// Every continuation, present or future, resolves to `Ready`.
    Cancelled,
}

/// A continuation that has been taken out of the scheduler and must be called once the
/// lock is released.
#[must_use]
pub(super) struct PendingCallback {
    callback: RustFutureContinuationCallback,
    data: u64,
    result: RustFuturePoll,
}

impl PendingCallback {
    pub(super) fn new(
        callback: RustFutureContinuationCallback,
        data: u64,
        result: RustFuturePoll,
    ) -> Self {
        Self {
            callback,
            data,
            result,
        }
    }

    pub(super) fn invoke(self) {
        (self.callback)(self.data, self.result as i8);
    }
}

impl Scheduler {
    /// Stores the continuation for a poll that returned `Pending`.
    pub(super) fn store(
        &mut self,
        callback: RustFutureContinuationCallback,
        data: u64,
    ) -> Option<PendingCallback> {
        match mem::take(self) {
            Scheduler::Empty => {
                *self = Scheduler::Set(callback, data);
                None
            }
            Scheduler::Waked => Some(PendingCallback::new(callback, data, RustFuturePoll::MaybeReady)),
            Scheduler::Set(previous, previous_data) => {
                tracing::warn!(
                    "Future polled again before its continuation fired (callback data {})",
                    previous_data
                );
                *self = Scheduler::Set(callback, data);
                Some(PendingCallback::new(previous, previous_data, RustFuturePoll::MaybeReady))
            }
            Scheduler::Cancelled => {
                *self = Scheduler::Cancelled;
                Some(PendingCallback::new(callback, data, RustFuturePoll::Ready))
            }
        }
    }

    /// Records a wake-up of the inner future.
    pub(super) fn wake(&mut self) -> Option<PendingCallback> {
        match mem::take(self) {
            Scheduler::Empty | Scheduler::Waked => {
                *self = Scheduler::Waked;
                None
            }
            Scheduler::Set(callback, data) => {
                Some(PendingCallback::new(callback, data, RustFuturePoll::MaybeReady))
            }
            Scheduler::Cancelled => {
                *self = Scheduler::Cancelled;
                None
            }
        }
    }

    pub(super) fn cancel(&mut self) -> Option<PendingCallback> {
        match mem::replace(self, Scheduler::Cancelled) {
            Scheduler::Set(callback, data) => {
                Some(PendingCallback::new(callback, data, RustFuturePoll::Ready))
            }
            _ => None,
        }
    }

    pub(super) fn is_cancelled(&self) -> bool {
        matches!(self, Scheduler::Cancelled)
    }
}
