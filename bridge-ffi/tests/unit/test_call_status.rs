#[cfg(test)]
mod tests {
    use crate::*;
    use bridge_abi::{FfiConverter, RustBuffer, RustCallStatus, RustCallStatusCode};

    fn lift_string(buf: RustBuffer) -> String {
        String::try_lift(buf, &NativeAllocator).unwrap()
    }

    #[test]
    fn test_success_sets_code_and_returns_value() {
        let mut status = RustCallStatus::new();
        status.code = 9;
        let value: u32 = rust_call(&mut status, || Ok(42));
        assert_eq!(value, 42);
        assert_eq!(status.code(), Ok(RustCallStatusCode::Success));
        assert!(status.error_buf.is_unallocated());
    }

    #[test]
    fn test_domain_error_attaches_encoded_error() {
        let mut status = RustCallStatus::new();
        let value: i64 = rust_call(&mut status, || lower_result::<i64, String>(Err("nope".to_string())));
        assert_eq!(value, 0);
        assert_eq!(status.code(), Ok(RustCallStatusCode::Error));
        assert_eq!(lift_string(status.error_buf), "nope");
    }

    #[test]
    fn test_internal_failure_is_reported_as_panic() {
        let mut status = RustCallStatus::new();
        let value: RustBuffer =
            rust_call(&mut status, || Err(CallFailure::Internal("bad framing".to_string())));
        assert!(value.is_unallocated());
        assert_eq!(status.code(), Ok(RustCallStatusCode::Panic));
        assert_eq!(lift_string(status.error_buf), "bad framing");
    }

    #[test]
    fn test_panic_is_caught_with_message() {
        let mut status = RustCallStatus::new();
        let value: u8 = rust_call(&mut status, || -> Result<u8, CallFailure> { panic!("kaboom {}", 7) });
        assert_eq!(value, 0);
        assert_eq!(status.code(), Ok(RustCallStatusCode::Panic));
        assert_eq!(lift_string(status.error_buf), "kaboom 7");
    }

    #[test]
    fn test_panic_without_message_leaves_buffer_empty() {
        let mut status = RustCallStatus::new();
        rust_call(&mut status, || -> Result<(), CallFailure> { std::panic::panic_any(17u32) });
        assert_eq!(status.code(), Ok(RustCallStatusCode::Panic));
        assert!(status.error_buf.is_unallocated());
    }

    #[test]
    fn test_lift_failure_names_the_argument() {
        let bad = RustBuffer::from_vec(vec![0xff]);
        let err = try_lift_arg::<String>("name", bad).unwrap_err();
        match err {
            CallFailure::Internal(message) => {
                assert!(message.contains("'name'"), "unexpected message: {}", message);
            }
            CallFailure::Error(_) => panic!("lift failures are never domain errors"),
        }
    }

    #[test]
    fn test_lower_result_ok_path() {
        let buf = lower_result::<String, String>(Ok("fine".to_string())).unwrap();
        assert_eq!(lift_string(buf), "fine");
    }
}
