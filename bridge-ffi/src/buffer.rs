//! Buffer lifecycle on the native side.
//!
//! Every [`RustBuffer`] is a `Vec<u8>` in disguise: allocated here, handed across the
//! boundary, and turned back into a `Vec` exactly once when it is freed.

use bridge_abi::{BufferAllocator, ForeignBytes, ProtocolError, ProtocolResult, RustBuffer, RustCallStatus};

use crate::call::rust_call;

/// Upper bound on any single buffer, so every length fits the wire's `i32` prefix.
const MAX_BUFFER_SIZE: u64 = i32::MAX as u64;

/// The `Vec<u8>` backed allocator that owns every buffer this library hands out.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeAllocator;

impl BufferAllocator for NativeAllocator {
    fn alloc(&self, size: u64) -> ProtocolResult<RustBuffer> {
        if size > MAX_BUFFER_SIZE {
            return Err(ProtocolError::Allocation(format!(
                "requested {} bytes, limit is {}",
                size, MAX_BUFFER_SIZE
            )));
        }
        Ok(RustBuffer::from_vec(vec![0; size as usize]))
    }

    fn free(&self, buf: RustBuffer) -> ProtocolResult<()> {
        // SAFETY: every buffer reaching this allocator was produced by `RustBuffer::from_vec`
        // in this library, and the caller gives up ownership here.
        unsafe { buf.destroy_into_vec() }.map(drop)
    }
}

/// Allocates a zero-filled buffer of `size` bytes.
pub fn rustbuffer_alloc(size: u64, call_status: &mut RustCallStatus) -> RustBuffer {
    rust_call(call_status, || Ok(NativeAllocator.alloc(size)?))
}

/// Copies caller-owned bytes into a fresh buffer.
///
/// # Safety
/// `bytes.data` must point to `bytes.len` readable bytes for the duration of the call.
pub unsafe fn rustbuffer_from_bytes(bytes: ForeignBytes, call_status: &mut RustCallStatus) -> RustBuffer {
    rust_call(call_status, || {
        let slice = bytes.as_slice()?;
        Ok(RustBuffer::from_vec(slice.to_vec()))
    })
}

/// Releases a buffer.
///
/// # Safety
/// `buf` must have been allocated by this library and must not be used afterwards.
pub unsafe fn rustbuffer_free(buf: RustBuffer, call_status: &mut RustCallStatus) {
    rust_call(call_status, || Ok(NativeAllocator.free(buf)?))
}

/// Grows a buffer so it can hold `additional` more bytes past its current length.
///
/// The first `len` bytes are preserved; `data` may move, so the old value must not be used.
///
/// # Safety
/// `buf` must have been allocated by this library and must not be used afterwards.
pub unsafe fn rustbuffer_reserve(
    buf: RustBuffer,
    additional: u64,
    call_status: &mut RustCallStatus,
) -> RustBuffer {
    rust_call(call_status, || {
        let target = buf.len.saturating_add(additional);
        if target > MAX_BUFFER_SIZE {
            return Err(ProtocolError::Allocation(format!(
                "reserve to {} bytes exceeds limit {}",
                target, MAX_BUFFER_SIZE
            ))
            .into());
        }
        let mut v = buf.destroy_into_vec()?;
        v.reserve(additional as usize);
        Ok(RustBuffer::from_vec(v))
    })
}
