//! Export macros for the fixed lifecycle symbols of a namespace.

/// Exports the four buffer lifecycle entry points under the given symbol names.
///
/// ```ignore
/// bridge_ffi::export_buffer_fns!(
///     alloc = ffi_wallet_rustbuffer_alloc,
///     from_bytes = ffi_wallet_rustbuffer_from_bytes,
///     free = ffi_wallet_rustbuffer_free,
///     reserve = ffi_wallet_rustbuffer_reserve,
/// );
/// ```
#[macro_export]
macro_rules! export_buffer_fns {
    (
        alloc = $alloc:ident,
        from_bytes = $from_bytes:ident,
        free = $free:ident,
        reserve = $reserve:ident $(,)?
    ) => {
        #[no_mangle]
        pub extern "C" fn $alloc(
            size: u64,
            call_status: &mut $crate::bridge_abi::RustCallStatus,
        ) -> $crate::bridge_abi::RustBuffer {
            $crate::buffer::rustbuffer_alloc(size, call_status)
        }

        /// # Safety
        /// `bytes` must describe `len` readable bytes.
        #[no_mangle]
        pub unsafe extern "C" fn $from_bytes(
            bytes: $crate::bridge_abi::ForeignBytes,
            call_status: &mut $crate::bridge_abi::RustCallStatus,
        ) -> $crate::bridge_abi::RustBuffer {
            $crate::buffer::rustbuffer_from_bytes(bytes, call_status)
        }

        /// # Safety
        /// `buf` must come from this library and not be used afterwards.
        #[no_mangle]
        pub unsafe extern "C" fn $free(
            buf: $crate::bridge_abi::RustBuffer,
            call_status: &mut $crate::bridge_abi::RustCallStatus,
        ) {
            $crate::buffer::rustbuffer_free(buf, call_status)
        }

        /// # Safety
        /// `buf` must come from this library and not be used afterwards.
        #[no_mangle]
        pub unsafe extern "C" fn $reserve(
            buf: $crate::bridge_abi::RustBuffer,
            additional: u64,
            call_status: &mut $crate::bridge_abi::RustCallStatus,
        ) -> $crate::bridge_abi::RustBuffer {
            $crate::buffer::rustbuffer_reserve(buf, additional, call_status)
        }
    };
}

/// Exports the poll/cancel/complete/free quartet for one return-type category.
///
/// `$ty` is the lowered return type: a scalar, `RustBuffer`, `RawPointer` or `()`.
#[macro_export]
macro_rules! export_future_fns {
    (
        $ty:ty,
        poll = $poll:ident,
        cancel = $cancel:ident,
        complete = $complete:ident,
        free = $free:ident $(,)?
    ) => {
        /// # Safety
        /// `handle` must be a live future handle returning this category.
        #[no_mangle]
        pub unsafe extern "C" fn $poll(
            handle: $crate::bridge_abi::RustFutureHandle,
            callback: $crate::bridge_abi::RustFutureContinuationCallback,
            callback_data: u64,
        ) {
            $crate::future::rust_future_poll::<$ty>(handle, callback, callback_data)
        }

        /// # Safety
        /// `handle` must be a live future handle returning this category.
        #[no_mangle]
        pub unsafe extern "C" fn $cancel(handle: $crate::bridge_abi::RustFutureHandle) {
            $crate::future::rust_future_cancel::<$ty>(handle)
        }

        /// # Safety
        /// `handle` must be a live future handle returning this category.
        #[no_mangle]
        pub unsafe extern "C" fn $complete(
            handle: $crate::bridge_abi::RustFutureHandle,
            call_status: &mut $crate::bridge_abi::RustCallStatus,
        ) -> $ty {
            $crate::future::rust_future_complete::<$ty>(handle, call_status)
        }

        /// # Safety
        /// `handle` must be a live future handle returning this category; it is dangling
        /// afterwards.
        #[no_mangle]
        pub unsafe extern "C" fn $free(handle: $crate::bridge_abi::RustFutureHandle) {
            $crate::future::rust_future_free::<$ty>(handle)
        }
    };
}
