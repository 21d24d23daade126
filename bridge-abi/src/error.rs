//! Error types for wire-level faults.

use thiserror::Error;

/// A violation of the wire protocol.
///
/// These never describe a domain failure. They mean the two sides disagree about a layout
/// (framing, discriminants, encodings) or a buffer broke its invariants, which is a build or
/// version mismatch rather than something calling code can recover from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Unexpected end of buffer: needed {needed} bytes, {remaining} remaining")]
    Truncated {
        needed: usize,
        remaining: usize,
    },

    #[error("Buffer still holds {0} unread bytes after decoding")]
    TrailingBytes(usize),

    #[error("Write of {needed} bytes overflows the buffer ({available} available)")]
    Overflow {
        needed: usize,
        available: usize,
    },

    #[error("Invalid discriminant {value} for {type_name}")]
    InvalidDiscriminant {
        type_name: &'static str,
        value: i32,
    },

    #[error("Invalid presence byte {0} for optional value")]
    InvalidOptionalTag(u8),

    #[error("Invalid boolean byte {0}")]
    InvalidBool(i8),

    #[error("Negative length prefix: {0}")]
    NegativeLength(i32),

    #[error("Value of {0} bytes does not fit a 32-bit length prefix")]
    TooLarge(u64),

    #[error("Invalid UTF-8 in string: {0}")]
    InvalidUtf8(String),

    #[error("Buffer has null data but capacity {0}")]
    NullData(u64),

    #[error("Buffer length {len} exceeds capacity {capacity}")]
    LengthExceedsCapacity {
        len: u64,
        capacity: u64,
    },

    #[error("Buffer allocation failed: {0}")]
    Allocation(String),
}

/// Result type alias for wire operations.
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
