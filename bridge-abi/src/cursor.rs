//! Big-endian read and write cursors over buffer contents.

use crate::error::{ProtocolError, ProtocolResult};

/// Reads values from the front of a byte slice, advancing past what it consumed.
#[derive(Debug)]
pub struct ReadCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

macro_rules! read_be {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self) -> ProtocolResult<$ty> {
                Ok(<$ty>::from_be_bytes(self.take_array()?))
            }
        )*
    };
}

impl<'a> ReadCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ReadCursor {
            buf,
            pos: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Consumes exactly `n` bytes.
    pub fn take(&mut self, n: usize) -> ProtocolResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(ProtocolError::Truncated {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Consumes everything left.
    pub fn take_rest(&mut self) -> &'a [u8] {
        let bytes = &self.buf[self.pos..];
        self.pos = self.buf.len();
        bytes
    }

    fn take_array<const N: usize>(&mut self) -> ProtocolResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    read_be! {
        read_u8 => u8,
        read_i8 => i8,
        read_u16 => u16,
        read_i16 => i16,
        read_u32 => u32,
        read_i32 => i32,
        read_u64 => u64,
        read_i64 => i64,
        read_f32 => f32,
        read_f64 => f64,
    }

    /// Reads a 4-byte length or count prefix.
    pub fn read_len(&mut self) -> ProtocolResult<usize> {
        let len = self.read_i32()?;
        usize::try_from(len).map_err(|_| ProtocolError::NegativeLength(len))
    }

    /// Fails if any bytes were left unread. A leftover tail means the two sides disagree
    /// about framing.
    pub fn finish(self) -> ProtocolResult<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(ProtocolError::TrailingBytes(n)),
        }
    }
}

/// Writes values into a pre-sized byte slice, advancing its position.
///
/// The slice is sized from `FfiConverter::allocation_size` before writing starts, so running
/// out of room means a size bound was wrong.
#[derive(Debug)]
pub struct WriteCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

macro_rules! put_be {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self, value: $ty) -> ProtocolResult<()> {
                self.put(&value.to_be_bytes())
            }
        )*
    };
}

impl<'a> WriteCursor<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        WriteCursor {
            buf,
            pos: 0,
        }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn available(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn put(&mut self, bytes: &[u8]) -> ProtocolResult<()> {
        if bytes.len() > self.available() {
            return Err(ProtocolError::Overflow {
                needed: bytes.len(),
                available: self.available(),
            });
        }
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    put_be! {
        put_u8 => u8,
        put_i8 => i8,
        put_u16 => u16,
        put_i16 => i16,
        put_u32 => u32,
        put_i32 => i32,
        put_u64 => u64,
        put_i64 => i64,
        put_f32 => f32,
        put_f64 => f64,
    }

    /// Writes a 4-byte length or count prefix.
    pub fn put_len(&mut self, len: usize) -> ProtocolResult<()> {
        let len = i32::try_from(len).map_err(|_| ProtocolError::TooLarge(len as u64))?;
        self.put_i32(len)
    }
}

#[cfg(test)]
#[path = "cursor_tests.rs"]
mod tests;
