//! Buffers owned by the host side.

use bridge_abi::{BufferAllocator, FfiConverter, ProtocolError, RustBuffer};

use crate::error::InternalResult;
use crate::library::NativeLibrary;

/// A [`RustBuffer`] the host is responsible for. It is released through the allocator when
/// dropped unless ownership is handed on with [`OwnedBuffer::into_raw`] or
/// [`OwnedBuffer::lift`].
pub struct OwnedBuffer<'a, A: BufferAllocator + ?Sized = NativeLibrary> {
    alloc: &'a A,
    buf: Option<RustBuffer>,
}

impl<'a, A: BufferAllocator + ?Sized> OwnedBuffer<'a, A> {
    /// Takes responsibility for `buf`.
    ///
    /// # Safety
    /// `buf` must have been allocated by `alloc` (or be unallocated) and must not be owned by
    /// anyone else.
    pub unsafe fn from_raw(alloc: &'a A, buf: RustBuffer) -> Self {
        Self {
            alloc,
            buf: Some(buf),
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        match &self.buf {
            // SAFETY: we own the buffer and `check` guards the layout.
            Some(buf) if buf.check().is_ok() => unsafe { buf.as_slice() },
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.buf.as_ref().map_or(0, RustBuffer::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hands the buffer on without freeing it.
    pub fn into_raw(mut self) -> RustBuffer {
        self.buf.take().unwrap_or_default()
    }

    /// Decodes the buffer as an outermost `T`. The buffer is freed whether or not decoding
    /// succeeds.
    pub fn lift<T>(self) -> Result<T, ProtocolError>
    where
        T: FfiConverter<FfiType = RustBuffer>,
    {
        let alloc = self.alloc;
        T::try_lift(self.into_raw(), alloc)
    }
}

impl<'a> OwnedBuffer<'a, NativeLibrary> {
    pub fn alloc(lib: &'a NativeLibrary, size: u64) -> InternalResult<Self> {
        let buf = lib.rustbuffer_alloc(size)?;
        Ok(Self {
            alloc: lib,
            buf: Some(buf),
        })
    }

    pub fn from_bytes(lib: &'a NativeLibrary, bytes: &[u8]) -> InternalResult<Self> {
        let buf = lib.rustbuffer_from_bytes(bytes)?;
        Ok(Self {
            alloc: lib,
            buf: Some(buf),
        })
    }

    /// Grows the buffer in place. On failure the buffer is gone.
    pub fn reserve(&mut self, additional: u64) -> InternalResult<()> {
        let buf = self.buf.take().unwrap_or_default();
        self.buf = Some(self.alloc.rustbuffer_reserve(buf, additional)?);
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.buf.as_ref().map_or(0, RustBuffer::capacity)
    }
}

impl<A: BufferAllocator + ?Sized> Drop for OwnedBuffer<'_, A> {
    fn drop(&mut self) {
        let Some(buf) = self.buf.take() else {
            return;
        };
        if buf.is_unallocated() {
            return;
        }
        if let Err(e) = self.alloc.free(buf) {
            tracing::error!("Failed to free owned buffer: {}", e);
        }
    }
}

impl<A: BufferAllocator + ?Sized> std::fmt::Debug for OwnedBuffer<'_, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnedBuffer").field("buf", &self.buf).finish_non_exhaustive()
    }
}
