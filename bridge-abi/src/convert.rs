//! The type conversion contract.
//!
//! Every type that crosses the boundary implements [`FfiConverter`]. Scalars travel by value;
//! everything else travels as a [`RustBuffer`] holding the type's encoding. Composite
//! encodings are built from the primitive ones:
//!
//! | shape | encoding |
//! |-------|----------|
//! | `Option<T>` | presence byte (0/1), then `T` if present |
//! | `Vec<T>` | `i32` count, then each element |
//! | `HashMap<K, V>` | `i32` count, then `(key, value)` pairs |
//! | record | fields in declaration order, no tags or padding |
//! | enum / tagged union | `i32` 1-based discriminant, then the variant's fields |
//! | `String` / [`Bytes`] | `i32` length then the bytes; as the outermost value the buffer's own `len` is the length |
//!
//! All integers and floats are big-endian.

use std::collections::HashMap;
use std::convert::Infallible;
use std::hash::Hash;
use std::mem::size_of;
use std::ops::Deref;

use crate::buffer::{BufferAllocator, RawPointer, RustBuffer};
use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::{ProtocolError, ProtocolResult};

/// Per-type codec used on both sides of the boundary.
///
/// Implementations are stateless; the allocator passed to `lower`/`try_lift` is the only
/// context. Decoding failures are [`ProtocolError`]s: they signal an ABI mismatch, never a
/// domain failure.
pub trait FfiConverter: Sized {
    /// What actually crosses the boundary: the scalar itself or a [`RustBuffer`].
    type FfiType;

    /// Converts a value into its boundary form, transferring ownership of any buffer to the
    /// receiver.
    fn lower<A: BufferAllocator + ?Sized>(obj: Self, alloc: &A) -> ProtocolResult<Self::FfiType>;

    /// Converts a boundary value back, consuming (and freeing) any buffer it arrived in.
    fn try_lift<A: BufferAllocator + ?Sized>(
        value: Self::FfiType,
        alloc: &A,
    ) -> ProtocolResult<Self>;

    /// Serializes at the cursor's position.
    fn write(obj: &Self, cursor: &mut WriteCursor<'_>) -> ProtocolResult<()>;

    /// Deserializes one value, consuming exactly its bytes.
    fn try_read(cursor: &mut ReadCursor<'_>) -> ProtocolResult<Self>;

    /// Upper bound on the bytes `write` will use.
    fn allocation_size(obj: &Self) -> u64;
}

/// Zero value returned in place of a result when a call fails.
pub trait FfiDefault {
    fn ffi_default() -> Self;
}

impl FfiDefault for RustBuffer {
    fn ffi_default() -> Self {
        RustBuffer::new()
    }
}

impl FfiDefault for RawPointer {
    fn ffi_default() -> Self {
        RawPointer::null()
    }
}

impl FfiDefault for () {
    fn ffi_default() -> Self {}
}

/// Lowers any buffer-borne value: allocate `allocation_size` bytes, write, trim `len` to the
/// bytes actually written.
pub fn lower_into_rust_buffer<T, A>(obj: &T, alloc: &A) -> ProtocolResult<RustBuffer>
where
    T: FfiConverter,
    A: BufferAllocator + ?Sized,
{
    let mut buf = alloc.alloc(T::allocation_size(obj))?;
    buf.check()?;
    let written = {
        // SAFETY: the allocator hands back a fresh zero-filled buffer that nothing else
        // references.
        let mut cursor = WriteCursor::new(unsafe { buf.as_mut_slice() });
        T::write(obj, &mut cursor).map(|()| cursor.position())
    };
    match written {
        Ok(n) => {
            buf.len = n as u64;
            Ok(buf)
        }
        Err(e) => {
            alloc.free(buf)?;
            Err(e)
        }
    }
}

/// Lifts any buffer-borne value. The buffer is freed whether or not decoding succeeds, and
/// unread trailing bytes are a framing fault.
pub fn try_lift_from_rust_buffer<T, A>(buf: RustBuffer, alloc: &A) -> ProtocolResult<T>
where
    T: FfiConverter,
    A: BufferAllocator + ?Sized,
{
    buf.check()?;
    let value = {
        // SAFETY: `check` passed and the buffer is owned by us until it is freed below.
        let mut cursor = ReadCursor::new(unsafe { buf.as_slice() });
        T::try_read(&mut cursor).and_then(|value| cursor.finish().map(|()| value))
    };
    let freed = alloc.free(buf);
    let value = value?;
    freed?;
    Ok(value)
}

fn lower_raw_bytes<A>(bytes: &[u8], alloc: &A) -> ProtocolResult<RustBuffer>
where
    A: BufferAllocator + ?Sized,
{
    let mut buf = alloc.alloc(bytes.len() as u64)?;
    buf.check()?;
    let written = {
        // SAFETY: fresh buffer, exclusively ours.
        let mut cursor = WriteCursor::new(unsafe { buf.as_mut_slice() });
        cursor.put(bytes).map(|()| cursor.position())
    };
    match written {
        Ok(n) => {
            buf.len = n as u64;
            Ok(buf)
        }
        Err(e) => {
            alloc.free(buf)?;
            Err(e)
        }
    }
}

fn lift_raw_bytes<A>(buf: RustBuffer, alloc: &A) -> ProtocolResult<Vec<u8>>
where
    A: BufferAllocator + ?Sized,
{
    buf.check()?;
    // SAFETY: `check` passed and the buffer is owned by us until it is freed below.
    let bytes = unsafe { buf.as_slice() }.to_vec();
    alloc.free(buf)?;
    Ok(bytes)
}

macro_rules! impl_scalar_converter {
    ($($ty:ty => $read:ident, $put:ident;)*) => {
        $(
            impl FfiConverter for $ty {
                type FfiType = $ty;

                fn lower<A: BufferAllocator + ?Sized>(obj: Self, _alloc: &A) -> ProtocolResult<$ty> {
                    Ok(obj)
                }

                fn try_lift<A: BufferAllocator + ?Sized>(value: $ty, _alloc: &A) -> ProtocolResult<Self> {
                    Ok(value)
                }

                fn write(obj: &Self, cursor: &mut WriteCursor<'_>) -> ProtocolResult<()> {
                    cursor.$put(*obj)
                }

                fn try_read(cursor: &mut ReadCursor<'_>) -> ProtocolResult<Self> {
                    cursor.$read()
                }

                fn allocation_size(_obj: &Self) -> u64 {
                    size_of::<$ty>() as u64
                }
            }

            impl FfiDefault for $ty {
                fn ffi_default() -> Self {
                    <$ty>::default()
                }
            }
        )*
    };
}

impl_scalar_converter! {
    u8 => read_u8, put_u8;
    i8 => read_i8, put_i8;
    u16 => read_u16, put_u16;
    i16 => read_i16, put_i16;
    u32 => read_u32, put_u32;
    i32 => read_i32, put_i32;
    u64 => read_u64, put_u64;
    i64 => read_i64, put_i64;
    f32 => read_f32, put_f32;
    f64 => read_f64, put_f64;
}

fn bool_from_i8(value: i8) -> ProtocolResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(ProtocolError::InvalidBool(other)),
    }
}

impl FfiConverter for bool {
    type FfiType = i8;

    fn lower<A: BufferAllocator + ?Sized>(obj: Self, _alloc: &A) -> ProtocolResult<i8> {
        Ok(obj as i8)
    }

    fn try_lift<A: BufferAllocator + ?Sized>(value: i8, _alloc: &A) -> ProtocolResult<Self> {
        bool_from_i8(value)
    }

    fn write(obj: &Self, cursor: &mut WriteCursor<'_>) -> ProtocolResult<()> {
        cursor.put_i8(*obj as i8)
    }

    fn try_read(cursor: &mut ReadCursor<'_>) -> ProtocolResult<Self> {
        bool_from_i8(cursor.read_i8()?)
    }

    fn allocation_size(_obj: &Self) -> u64 {
        1
    }
}

impl FfiConverter for () {
    type FfiType = ();

    fn lower<A: BufferAllocator + ?Sized>(_obj: Self, _alloc: &A) -> ProtocolResult<()> {
        Ok(())
    }

    fn try_lift<A: BufferAllocator + ?Sized>(_value: (), _alloc: &A) -> ProtocolResult<Self> {
        Ok(())
    }

    fn write(_obj: &Self, _cursor: &mut WriteCursor<'_>) -> ProtocolResult<()> {
        Ok(())
    }

    fn try_read(_cursor: &mut ReadCursor<'_>) -> ProtocolResult<Self> {
        Ok(())
    }

    fn allocation_size(_obj: &Self) -> u64 {
        0
    }
}

/// Error type of calls that declare none. Every discriminant is invalid, so an `ERROR`
/// status from such a call decodes to a protocol fault.
impl FfiConverter for Infallible {
    crate::buffer_lift_lower!();

    fn write(obj: &Self, _cursor: &mut WriteCursor<'_>) -> ProtocolResult<()> {
        match *obj {}
    }

    fn try_read(cursor: &mut ReadCursor<'_>) -> ProtocolResult<Self> {
        Err(ProtocolError::InvalidDiscriminant {
            type_name: "Infallible",
            value: cursor.read_i32()?,
        })
    }

    fn allocation_size(obj: &Self) -> u64 {
        match *obj {}
    }
}

impl FfiConverter for String {
    type FfiType = RustBuffer;

    fn lower<A: BufferAllocator + ?Sized>(obj: Self, alloc: &A) -> ProtocolResult<RustBuffer> {
        lower_raw_bytes(obj.as_bytes(), alloc)
    }

    fn try_lift<A: BufferAllocator + ?Sized>(buf: RustBuffer, alloc: &A) -> ProtocolResult<Self> {
        let bytes = lift_raw_bytes(buf, alloc)?;
        String::from_utf8(bytes).map_err(|e| ProtocolError::InvalidUtf8(e.to_string()))
    }

    fn write(obj: &Self, cursor: &mut WriteCursor<'_>) -> ProtocolResult<()> {
        cursor.put_len(obj.len())?;
        cursor.put(obj.as_bytes())
    }

    fn try_read(cursor: &mut ReadCursor<'_>) -> ProtocolResult<Self> {
        let len = cursor.read_len()?;
        let bytes = cursor.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| ProtocolError::InvalidUtf8(e.to_string()))
    }

    fn allocation_size(obj: &Self) -> u64 {
        4 + obj.len() as u64
    }
}

/// Opaque bytes. Encoded like `String` without the UTF-8 check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Bytes(v)
    }
}

impl From<Bytes> for Vec<u8> {
    fn from(b: Bytes) -> Self {
        b.0
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl FfiConverter for Bytes {
    type FfiType = RustBuffer;

    fn lower<A: BufferAllocator + ?Sized>(obj: Self, alloc: &A) -> ProtocolResult<RustBuffer> {
        lower_raw_bytes(&obj.0, alloc)
    }

    fn try_lift<A: BufferAllocator + ?Sized>(buf: RustBuffer, alloc: &A) -> ProtocolResult<Self> {
        lift_raw_bytes(buf, alloc).map(Bytes)
    }

    fn write(obj: &Self, cursor: &mut WriteCursor<'_>) -> ProtocolResult<()> {
        cursor.put_len(obj.0.len())?;
        cursor.put(&obj.0)
    }

    fn try_read(cursor: &mut ReadCursor<'_>) -> ProtocolResult<Self> {
        let len = cursor.read_len()?;
        Ok(Bytes(cursor.take(len)?.to_vec()))
    }

    fn allocation_size(obj: &Self) -> u64 {
        4 + obj.0.len() as u64
    }
}

impl<T: FfiConverter> FfiConverter for Option<T> {
    crate::buffer_lift_lower!();

    fn write(obj: &Self, cursor: &mut WriteCursor<'_>) -> ProtocolResult<()> {
        match obj {
            None => cursor.put_u8(0),
            Some(value) => {
                cursor.put_u8(1)?;
                T::write(value, cursor)
            }
        }
    }

    fn try_read(cursor: &mut ReadCursor<'_>) -> ProtocolResult<Self> {
        match cursor.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(T::try_read(cursor)?)),
            tag => Err(ProtocolError::InvalidOptionalTag(tag)),
        }
    }

    fn allocation_size(obj: &Self) -> u64 {
        1 + obj.as_ref().map_or(0, T::allocation_size)
    }
}

impl<T: FfiConverter> FfiConverter for Vec<T> {
    crate::buffer_lift_lower!();

    fn write(obj: &Self, cursor: &mut WriteCursor<'_>) -> ProtocolResult<()> {
        cursor.put_len(obj.len())?;
        for item in obj {
            T::write(item, cursor)?;
        }
        Ok(())
    }

    fn try_read(cursor: &mut ReadCursor<'_>) -> ProtocolResult<Self> {
        let count = cursor.read_len()?;
        // Bounded by what is left so a corrupt count cannot trigger a huge allocation.
        let mut items = Vec::with_capacity(count.min(cursor.remaining()));
        for _ in 0..count {
            items.push(T::try_read(cursor)?);
        }
        Ok(items)
    }

    fn allocation_size(obj: &Self) -> u64 {
        4 + obj.iter().map(T::allocation_size).sum::<u64>()
    }
}

impl<K, V> FfiConverter for HashMap<K, V>
where
    K: FfiConverter + Eq + Hash,
    V: FfiConverter,
{
    crate::buffer_lift_lower!();

    fn write(obj: &Self, cursor: &mut WriteCursor<'_>) -> ProtocolResult<()> {
        cursor.put_len(obj.len())?;
        for (key, value) in obj {
            K::write(key, cursor)?;
            V::write(value, cursor)?;
        }
        Ok(())
    }

    fn try_read(cursor: &mut ReadCursor<'_>) -> ProtocolResult<Self> {
        let count = cursor.read_len()?;
        let mut map = HashMap::with_capacity(count.min(cursor.remaining()));
        for _ in 0..count {
            let key = K::try_read(cursor)?;
            let value = V::try_read(cursor)?;
            map.insert(key, value);
        }
        Ok(map)
    }

    fn allocation_size(obj: &Self) -> u64 {
        4 + obj.iter().map(|(k, v)| K::allocation_size(k) + V::allocation_size(v)).sum::<u64>()
    }
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
