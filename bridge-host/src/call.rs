//! Making calls and checking their status.

use bridge_abi::{BufferAllocator, FfiConverter, RustBuffer, RustCallStatus, RustCallStatusCode};

use crate::buffer::OwnedBuffer;
use crate::error::{CallError, InternalError, InternalResult};
use crate::library::NativeLibrary;

/// Raises an internal fault. These are not meant to be handled by calling code.
pub fn raise(err: InternalError) -> ! {
    tracing::error!("{}", err);
    std::panic::panic_any(err)
}

/// Interprets the status of a call that declares the domain error type `E`.
///
/// The error buffer is always released: by `lift` for a typed error (even when decoding it
/// fails) and by [`OwnedBuffer`] for a panic message.
pub fn check_status<E, A>(alloc: &A, status: RustCallStatus) -> Result<(), CallError<E>>
where
    E: FfiConverter<FfiType = RustBuffer>,
    A: BufferAllocator + ?Sized,
{
    let RustCallStatus {
        code,
        error_buf,
    } = status;
    match RustCallStatusCode::try_from(code) {
        Ok(RustCallStatusCode::Success) => Ok(()),
        Ok(RustCallStatusCode::Error) => {
            // SAFETY: the callee allocated the error buffer for us.
            let error_buf = unsafe { OwnedBuffer::from_raw(alloc, error_buf) };
            Err(CallError::Domain(error_buf.lift::<E>()?))
        }
        Ok(RustCallStatusCode::Panic) => {
            // SAFETY: as above.
            let message = unsafe { OwnedBuffer::from_raw(alloc, error_buf) };
            Err(panic_error(&message).into())
        }
        // The buffer cannot be trusted with an unknown code, so it is not touched.
        Err(code) => Err(InternalError::UnknownStatusCode(code).into()),
    }
}

/// Interprets the status of a call that declares no error type.
pub fn check_internal_status<A>(alloc: &A, status: RustCallStatus) -> InternalResult<()>
where
    A: BufferAllocator + ?Sized,
{
    let RustCallStatus {
        code,
        error_buf,
    } = status;
    match RustCallStatusCode::try_from(code) {
        Ok(RustCallStatusCode::Success) => Ok(()),
        Ok(RustCallStatusCode::Error) => {
            // SAFETY: the callee allocated the error buffer for us; dropping frees it.
            drop(unsafe { OwnedBuffer::from_raw(alloc, error_buf) });
            Err(InternalError::UnexpectedError)
        }
        Ok(RustCallStatusCode::Panic) => {
            // SAFETY: as above.
            let message = unsafe { OwnedBuffer::from_raw(alloc, error_buf) };
            Err(panic_error(&message))
        }
        Err(code) => Err(InternalError::UnknownStatusCode(code)),
    }
}

fn panic_error<A: BufferAllocator + ?Sized>(message: &OwnedBuffer<'_, A>) -> InternalError {
    if message.is_empty() {
        InternalError::NativePanicWithoutMessage
    } else {
        InternalError::NativePanic(String::from_utf8_lossy(message.as_slice()).into_owned())
    }
}

/// Calls into the library with a fresh status and checks it afterwards.
pub fn try_rust_call<F, R>(lib: &NativeLibrary, callback: F) -> InternalResult<R>
where
    F: FnOnce(&mut RustCallStatus) -> R,
{
    let mut status = RustCallStatus::new();
    let value = callback(&mut status);
    check_internal_status(lib, status)?;
    Ok(value)
}

/// Like [`try_rust_call`] for functions that declare the domain error type `E`.
pub fn try_rust_call_with_error<E, F, R>(lib: &NativeLibrary, callback: F) -> Result<R, CallError<E>>
where
    E: FfiConverter<FfiType = RustBuffer>,
    F: FnOnce(&mut RustCallStatus) -> R,
{
    let mut status = RustCallStatus::new();
    let value = callback(&mut status);
    check_status::<E, _>(lib, status)?;
    Ok(value)
}

/// Calls a function without a declared error type, raising any fault.
pub fn rust_call<F, R>(lib: &NativeLibrary, callback: F) -> R
where
    F: FnOnce(&mut RustCallStatus) -> R,
{
    try_rust_call(lib, callback).unwrap_or_else(|e| raise(e))
}

/// Calls a function that declares `E`, returning domain errors and raising faults.
pub fn rust_call_with_error<E, F, R>(lib: &NativeLibrary, callback: F) -> Result<R, E>
where
    E: FfiConverter<FfiType = RustBuffer>,
    F: FnOnce(&mut RustCallStatus) -> R,
{
    match try_rust_call_with_error(lib, callback) {
        Ok(value) => Ok(value),
        Err(CallError::Domain(e)) => Err(e),
        Err(CallError::Internal(e)) => raise(e),
    }
}

/// Lowers an argument through the library's allocator, raising on failure.
pub fn lower_arg<T: FfiConverter>(lib: &NativeLibrary, value: T) -> T::FfiType {
    T::lower(value, lib).unwrap_or_else(|e| raise(e.into()))
}

/// Lifts a return value, raising on failure. Buffers are freed either way.
pub fn lift_return<T: FfiConverter>(lib: &NativeLibrary, value: T::FfiType) -> T {
    T::try_lift(value, lib).unwrap_or_else(|e| raise(e.into()))
}

#[cfg(test)]
#[path = "call_tests.rs"]
mod call_tests;
