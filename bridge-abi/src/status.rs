//! The call-status record attached to every fallible foreign call.

use crate::buffer::RustBuffer;

/// Outcome codes stored in [`RustCallStatus::code`].
#[repr(i8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RustCallStatusCode {
    /// The return value is valid; `error_buf` is unused.
    Success = 0,
    /// A typed domain failure; `error_buf` holds the error encoded as a tagged union.
    Error = 1,
    /// An unrecoverable fault; `error_buf` holds a bare UTF-8 message or is empty.
    Panic = 2,
}

impl TryFrom<i8> for RustCallStatusCode {
    type Error = i8;

    fn try_from(code: i8) -> Result<Self, i8> {
        match code {
            0 => Ok(RustCallStatusCode::Success),
            1 => Ok(RustCallStatusCode::Error),
            2 => Ok(RustCallStatusCode::Panic),
            other => Err(other),
        }
    }
}

/// Out-parameter passed by pointer into every call that can fail.
///
/// The caller creates a fresh value right before the call, the callee fills it in, and the
/// caller inspects it right after, freeing `error_buf` if one was attached. `code` is a raw
/// `i8` because the callee is untrusted: values outside [`RustCallStatusCode`] are faults.
#[repr(C)]
#[derive(Debug)]
pub struct RustCallStatus {
    pub code: i8,
    pub error_buf: RustBuffer,
}

impl RustCallStatus {
    pub fn new() -> Self {
        RustCallStatus {
            code: RustCallStatusCode::Success as i8,
            error_buf: RustBuffer::new(),
        }
    }

    pub fn code(&self) -> Result<RustCallStatusCode, i8> {
        RustCallStatusCode::try_from(self.code)
    }

    pub fn is_success(&self) -> bool {
        self.code == RustCallStatusCode::Success as i8
    }

    /// Records a typed failure, taking ownership of the encoded error.
    pub fn set_error(&mut self, error_buf: RustBuffer) {
        self.code = RustCallStatusCode::Error as i8;
        self.error_buf = error_buf;
    }

    /// Records a fault with an optional encoded message (`RustBuffer::new()` for none).
    pub fn set_panic(&mut self, message_buf: RustBuffer) {
        self.code = RustCallStatusCode::Panic as i8;
        self.error_buf = message_buf;
    }
}

impl Default for RustCallStatus {
    fn default() -> Self {
        Self::new()
    }
}
