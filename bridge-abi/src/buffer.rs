//! Byte regions that cross the boundary.

use std::mem::ManuallyDrop;
use std::os::raw::c_void;
use std::{ptr, slice};

use crate::error::{ProtocolError, ProtocolResult};

/// A growable byte region owned by the native allocator.
///
/// Layout is `{ capacity: u64, len: u64, data: *mut u8 }` and is passed by value. Invariants:
/// `len <= capacity`, and `data` is non-null whenever `capacity > 0`.
///
/// A `RustBuffer` has exactly one owner at a time. Whoever produces a value allocates the
/// buffer and hands it over; the receiver reads it and frees it exactly once. The type is
/// deliberately neither `Clone` nor `Copy`.
#[repr(C)]
#[derive(Debug)]
pub struct RustBuffer {
    pub capacity: u64,
    pub len: u64,
    pub data: *mut u8,
}

/// # Safety
///
/// A `RustBuffer` is a uniquely owned allocation. Moving it to another thread moves that
/// ownership along with it; nothing else aliases `data` while the value is alive.
unsafe impl Send for RustBuffer {}

impl RustBuffer {
    /// An empty, unallocated buffer.
    pub fn new() -> Self {
        RustBuffer {
            capacity: 0,
            len: 0,
            data: ptr::null_mut(),
        }
    }

    /// Takes ownership of a `Vec<u8>` allocation without copying.
    pub fn from_vec(v: Vec<u8>) -> Self {
        let mut v = ManuallyDrop::new(v);
        RustBuffer {
            capacity: v.capacity() as u64,
            len: v.len() as u64,
            data: v.as_mut_ptr(),
        }
    }

    /// Reclaims the allocation as a `Vec<u8>`.
    ///
    /// # Safety
    /// - The buffer must have been created by [`RustBuffer::from_vec`] in this allocator (or be
    ///   the unallocated [`RustBuffer::new`] value).
    /// - The buffer must not be used again after this call.
    pub unsafe fn destroy_into_vec(self) -> ProtocolResult<Vec<u8>> {
        self.check()?;
        if self.data.is_null() {
            return Ok(Vec::new());
        }
        Ok(Vec::from_raw_parts(self.data, self.len as usize, self.capacity as usize))
    }

    /// Verifies the layout invariants without touching the data.
    pub fn check(&self) -> ProtocolResult<()> {
        if self.data.is_null() && self.capacity > 0 {
            return Err(ProtocolError::NullData(self.capacity));
        }
        if self.len > self.capacity {
            return Err(ProtocolError::LengthExceedsCapacity {
                len: self.len,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Views the first `len` bytes.
    ///
    /// # Safety
    /// `data` must point to at least `len` initialized bytes that stay valid and unmodified for
    /// the lifetime of the returned slice.
    pub unsafe fn as_slice(&self) -> &[u8] {
        if self.data.is_null() || self.len == 0 {
            &[]
        } else {
            slice::from_raw_parts(self.data, self.len as usize)
        }
    }

    /// Mutable view of the first `len` bytes.
    ///
    /// # Safety
    /// Same as [`RustBuffer::as_slice`], and no other reference to the data may exist.
    pub unsafe fn as_mut_slice(&mut self) -> &mut [u8] {
        if self.data.is_null() || self.len == 0 {
            &mut []
        } else {
            slice::from_raw_parts_mut(self.data, self.len as usize)
        }
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    /// True for the `RustBuffer::new()` value, which owns no allocation.
    pub fn is_unallocated(&self) -> bool {
        self.data.is_null() && self.capacity == 0
    }
}

impl Default for RustBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// A borrowed view of bytes owned by the caller, used by `rustbuffer_from_bytes`.
///
/// The length is an `i32`, matching the foreign side's native array length type.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ForeignBytes {
    pub len: i32,
    pub data: *const u8,
}

impl ForeignBytes {
    /// Borrows a slice. The caller must keep `bytes` alive while the view is in use.
    pub fn from_slice(bytes: &[u8]) -> ProtocolResult<Self> {
        let len = i32::try_from(bytes.len()).map_err(|_| ProtocolError::TooLarge(bytes.len() as u64))?;
        Ok(ForeignBytes {
            len,
            data: bytes.as_ptr(),
        })
    }

    /// # Safety
    /// `data` must point to `len` readable bytes for the lifetime `'a`.
    pub unsafe fn as_slice<'a>(&self) -> ProtocolResult<&'a [u8]> {
        if self.len < 0 {
            return Err(ProtocolError::NegativeLength(self.len));
        }
        if self.len == 0 {
            return Ok(&[]);
        }
        if self.data.is_null() {
            return Err(ProtocolError::NullData(self.len as u64));
        }
        Ok(slice::from_raw_parts(self.data, self.len as usize))
    }
}

/// An opaque native pointer returned by pointer-category calls.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPointer(pub *const c_void);

/// # Safety
///
/// The pointer is an opaque token here; it is never dereferenced by the bridge itself.
unsafe impl Send for RawPointer {}

impl RawPointer {
    pub fn null() -> Self {
        RawPointer(ptr::null())
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

/// The boundary-side allocator used by `lower` and `lift`.
///
/// The native side implements this over `Vec<u8>`; the host side implements it by calling
/// the library's exported `rustbuffer_alloc` / `rustbuffer_free` entry points.
pub trait BufferAllocator {
    /// Allocates a zero-filled buffer with `len == size`.
    fn alloc(&self, size: u64) -> ProtocolResult<RustBuffer>;

    /// Releases a buffer. Must be called exactly once per buffer.
    fn free(&self, buf: RustBuffer) -> ProtocolResult<()>;
}
