//! Wire vocabulary shared by both halves of the FFI bridge.
//!
//! Everything that has to look identical on either side of the C ABI lives here:
//!
//! - [`RustBuffer`] and [`ForeignBytes`], the byte regions exchanged across the boundary
//! - [`RustCallStatus`], the out-of-band success/error/panic record attached to every call
//! - [`FfiConverter`], the `lift`/`lower`/`read`/`write`/`size` contract, with converters for
//!   scalars, strings, bytes, optionals, sequences and maps, plus the
//!   [`ffi_converter_record!`] and [`ffi_converter_enum!`] macros for schema-defined types
//! - the exported symbol naming rules ([`symbols`]), the signature checksum and the contract
//!   version ([`checksum`])
//! - poll codes and return-type categories for asynchronous calls ([`future`])
//!
//! The producer half (`bridge-ffi`) and the consumer half (`bridge-host`) both build on this
//! crate and never redefine any of these layouts.

pub mod buffer;
pub mod checksum;
pub mod convert;
pub mod cursor;
pub mod error;
pub mod future;
mod macros;
pub mod status;
pub mod symbols;

pub use buffer::{BufferAllocator, ForeignBytes, RawPointer, RustBuffer};
pub use checksum::{signature_checksum, CONTRACT_VERSION};
pub use convert::{Bytes, FfiConverter, FfiDefault};
pub use cursor::{ReadCursor, WriteCursor};
pub use error::{ProtocolError, ProtocolResult};
pub use future::{FutureCategory, RustFutureContinuationCallback, RustFutureHandle, RustFuturePoll};
pub use status::{RustCallStatus, RustCallStatusCode};
pub use symbols::{FutureOp, SymbolNames};
