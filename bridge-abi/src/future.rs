//! Poll codes and return-type categories for asynchronous calls.

/// Opaque native handle for an in-flight asynchronous call.
pub type RustFutureHandle = u64;

/// Continuation invoked by native code once per poll, from whatever thread it likes, with
/// the `callback_data` that was passed to `poll` and a [`RustFuturePoll`] code.
pub type RustFutureContinuationCallback = extern "C" fn(callback_data: u64, poll_result: i8);

/// Result of one poll round.
#[repr(i8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RustFuturePoll {
    /// The future finished (or was cancelled); call `complete` next.
    Ready = 0,
    /// The future may have progressed; poll again.
    MaybeReady = 1,
}

impl TryFrom<i8> for RustFuturePoll {
    type Error = i8;

    fn try_from(code: i8) -> Result<Self, i8> {
        match code {
            0 => Ok(RustFuturePoll::Ready),
            1 => Ok(RustFuturePoll::MaybeReady),
            other => Err(other),
        }
    }
}

/// Return-type categories. The native library exports one poll/cancel/free/complete quartet
/// per category; the bridging logic is the same for all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FutureCategory {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    Pointer,
    RustBuffer,
    Void,
}

impl FutureCategory {
    pub const ALL: [FutureCategory; 13] = [
        FutureCategory::U8,
        FutureCategory::I8,
        FutureCategory::U16,
        FutureCategory::I16,
        FutureCategory::U32,
        FutureCategory::I32,
        FutureCategory::U64,
        FutureCategory::I64,
        FutureCategory::F32,
        FutureCategory::F64,
        FutureCategory::Pointer,
        FutureCategory::RustBuffer,
        FutureCategory::Void,
    ];

    /// Suffix used in the exported symbol names.
    pub fn symbol_suffix(self) -> &'static str {
        match self {
            FutureCategory::U8 => "u8",
            FutureCategory::I8 => "i8",
            FutureCategory::U16 => "u16",
            FutureCategory::I16 => "i16",
            FutureCategory::U32 => "u32",
            FutureCategory::I32 => "i32",
            FutureCategory::U64 => "u64",
            FutureCategory::I64 => "i64",
            FutureCategory::F32 => "f32",
            FutureCategory::F64 => "f64",
            FutureCategory::Pointer => "pointer",
            FutureCategory::RustBuffer => "rust_buffer",
            FutureCategory::Void => "void",
        }
    }
}
