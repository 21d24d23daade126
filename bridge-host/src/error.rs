//! Error types for the consumer side of the bridge.
//!
//! Three tiers:
//! - domain errors, the typed `E` in [`CallError::Domain`], are for callers to handle;
//! - [`InternalError`] means the two sides disagree about the protocol or a lifecycle rule
//!   was broken;
//! - [`StartupError`] means the library does not match the bindings and nothing may be
//!   called.
//!
//! The panicking entry points raise tiers two and three with `std::panic::panic_any`, so a
//! caller that really needs to can still recover them with `catch_unwind` and `downcast`.

use bridge_abi::ProtocolError;
use thiserror::Error;

/// A protocol or lifecycle violation detected while talking to the native library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Native panic: {0}")]
    NativePanic(String),

    #[error("Native panic without a message")]
    NativePanicWithoutMessage,

    #[error("Unknown call status code: {0}")]
    UnknownStatusCode(i8),

    #[error("Native call reported an error but declares no error type")]
    UnexpectedError,

    #[error("Buffer lifecycle call failed: {0}")]
    BufferLifecycle(String),

    #[error("No entry for handle {0}")]
    MissingHandle(u64),

    #[error("Unknown poll result: {0}")]
    UnknownPollResult(i8),

    #[error("Continuation {0} was dropped without a poll result")]
    ContinuationDropped(u64),

    #[error("Symbol not found: {0}")]
    MissingSymbol(String),
}

/// The native library cannot be used with these bindings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartupError {
    #[error("Failed to load native library {path}: {reason}")]
    LibraryLoad {
        path: String,
        reason: String,
    },

    #[error("Native library is missing symbol {0}")]
    MissingSymbol(String),

    #[error("Contract version mismatch: bindings expect {expected}, library provides {actual}")]
    ContractVersionMismatch {
        expected: u32,
        actual: u32,
    },

    #[error("Checksum mismatch for {function}: bindings expect {expected}, library provides {actual}")]
    ChecksumMismatch {
        function: String,
        expected: u16,
        actual: u16,
    },
}

/// Outcome of a failed call that declares the domain error type `E`.
#[derive(Debug, Error)]
pub enum CallError<E> {
    #[error("{0}")]
    Domain(E),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl<E> From<ProtocolError> for CallError<E> {
    fn from(err: ProtocolError) -> Self {
        CallError::Internal(InternalError::Protocol(err))
    }
}

/// Logging setup errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Subscriber initialization failed: {0}")]
    SubscriberInit(String),
}

/// Type alias for internal results.
pub type InternalResult<T> = std::result::Result<T, InternalError>;

/// Type alias for logging results.
pub type LoggingResult<T> = std::result::Result<T, LoggingError>;
