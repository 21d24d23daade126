//! The `logger` callback interface, implemented by the host.

use bridge_abi::{RustBuffer, RustCallStatus};
use bridge_ffi::{
    check_foreign_status, lower_result, lower_return, rust_call, try_lift_arg, ForeignCallError, ForeignFree,
    ForeignHandle, ForeignVTable,
};

use crate::types::{FixtureError, LogError};

/// Host functions backing a logger object.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct LoggerVTable {
    /// Takes ownership of `message` (a lowered string).
    pub log: extern "C" fn(handle: u64, message: RustBuffer, out_status: &mut RustCallStatus),
    pub free: ForeignFree,
}

static LOGGER_VTABLE: ForeignVTable<LoggerVTable> = ForeignVTable::new("logger");

#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_init_callback_vtable_logger(vtable: &LoggerVTable) {
    LOGGER_VTABLE.set(*vtable);
}

/// Sends every message to the logger and returns how many it accepted. Stops at the first
/// rejection. The logger handle is released before returning, whatever the outcome.
#[no_mangle]
pub extern "C" fn uniffi_fixture_fn_func_emit_logs(
    logger: u64,
    messages: RustBuffer,
    call_status: &mut RustCallStatus,
) -> u32 {
    rust_call(call_status, || {
        let vtable = LOGGER_VTABLE.get()?;
        let logger = ForeignHandle::new(logger, vtable.free);
        let messages: Vec<String> = try_lift_arg("messages", messages)?;

        let mut delivered = 0u32;
        for message in messages {
            let mut status = RustCallStatus::new();
            (vtable.log)(logger.handle(), lower_return(message)?, &mut status);
            match check_foreign_status::<LogError>(status) {
                Ok(()) => delivered += 1,
                Err(ForeignCallError::Domain(LogError::Rejected {
                    reason,
                })) => {
                    tracing::debug!("Logger {} rejected message {}", logger.handle(), delivered);
                    return lower_result::<u32, _>(Err(FixtureError::Rejected {
                        reason,
                    }));
                }
                Err(e) => return Err(e.into()),
            }
        }
        lower_result::<u32, FixtureError>(Ok(delivered))
    })
}
