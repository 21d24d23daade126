#[cfg(test)]
mod tests {
    use crate::*;
    use bridge_abi::{ForeignBytes, RustBuffer, RustCallStatus, RustCallStatusCode};
    use proptest::prelude::*;

    fn contents(buf: &RustBuffer) -> Vec<u8> {
        unsafe { buf.as_slice() }.to_vec()
    }

    #[test]
    fn test_alloc_is_zero_filled() {
        let mut status = RustCallStatus::new();
        let buf = rustbuffer_alloc(16, &mut status);
        assert!(status.is_success());
        assert_eq!(buf.len(), 16);
        assert!(buf.capacity() >= 16);
        assert!(!buf.data.is_null());
        assert!(contents(&buf).iter().all(|b| *b == 0));
        unsafe { rustbuffer_free(buf, &mut status) };
        assert!(status.is_success());
    }

    #[test]
    fn test_alloc_over_limit_is_a_fault() {
        let mut status = RustCallStatus::new();
        let buf = rustbuffer_alloc(u64::MAX, &mut status);
        assert_eq!(status.code(), Ok(RustCallStatusCode::Panic));
        assert!(buf.is_unallocated());
        unsafe { rustbuffer_free(status.error_buf, &mut RustCallStatus::new()) };
    }

    #[test]
    fn test_from_bytes_copies() {
        let source = vec![1u8, 2, 3];
        let mut status = RustCallStatus::new();
        let buf = unsafe { rustbuffer_from_bytes(ForeignBytes::from_slice(&source).unwrap(), &mut status) };
        assert!(status.is_success());
        assert_eq!(contents(&buf), source);
        assert_ne!(buf.data as *const u8, source.as_ptr());
        unsafe { rustbuffer_free(buf, &mut status) };
    }

    #[test]
    fn test_from_bytes_rejects_negative_length() {
        let bytes = ForeignBytes {
            len: -1,
            data: std::ptr::null(),
        };
        let mut status = RustCallStatus::new();
        let buf = unsafe { rustbuffer_from_bytes(bytes, &mut status) };
        assert_eq!(status.code(), Ok(RustCallStatusCode::Panic));
        assert!(buf.is_unallocated());
    }

    #[test]
    fn test_free_rejects_broken_layout() {
        let broken = RustBuffer {
            capacity: 4,
            len: 8,
            data: std::ptr::null_mut(),
        };
        let mut status = RustCallStatus::new();
        unsafe { rustbuffer_free(broken, &mut status) };
        assert_eq!(status.code(), Ok(RustCallStatusCode::Panic));
    }

    #[test]
    fn test_free_accepts_unallocated_buffer() {
        let mut status = RustCallStatus::new();
        unsafe { rustbuffer_free(RustBuffer::new(), &mut status) };
        assert!(status.is_success());
    }

    proptest! {
        #[test]
        fn prop_reserve_preserves_prefix(bytes in proptest::collection::vec(any::<u8>(), 0..256), additional in 0u64..4096) {
            let mut status = RustCallStatus::new();
            let buf = RustBuffer::from_vec(bytes.clone());
            let grown = unsafe { rustbuffer_reserve(buf, additional, &mut status) };
            prop_assert!(status.is_success());
            prop_assert_eq!(grown.len(), bytes.len());
            prop_assert!(grown.capacity() as u64 >= bytes.len() as u64 + additional);
            prop_assert_eq!(contents(&grown), bytes);
            unsafe { rustbuffer_free(grown, &mut status) };
            prop_assert!(status.is_success());
        }
    }
}
