#[cfg(test)]
mod tests {
    use crate::*;
    use bridge_abi::{FfiConverter, RustBuffer, RustCallStatus, RustCallStatusCode};
    use serial_test::serial;
    use std::sync::Mutex;

    static FREED: Mutex<Vec<u64>> = Mutex::new(Vec::new());

    extern "C" fn record_free(handle: u64) {
        FREED.lock().unwrap().push(handle);
    }

    #[derive(Clone, Copy)]
    struct EchoVTable {
        free: ForeignFree,
    }

    static ECHO_VTABLE: ForeignVTable<EchoVTable> = ForeignVTable::new("echo");

    fn status_with(code: RustCallStatusCode, error_buf: RustBuffer) -> RustCallStatus {
        RustCallStatus {
            code: code as i8,
            error_buf,
        }
    }

    #[test]
    #[serial]
    fn test_handle_is_freed_exactly_once_on_drop() {
        FREED.lock().unwrap().clear();
        let handle = ForeignHandle::new(7, record_free);
        assert_eq!(handle.handle(), 7);
        assert!(FREED.lock().unwrap().is_empty());
        drop(handle);
        assert_eq!(*FREED.lock().unwrap(), vec![7]);
    }

    #[test]
    #[serial]
    fn test_vtable_registration() {
        assert!(matches!(ECHO_VTABLE.get(), Err(CallFailure::Internal(_))));
        ECHO_VTABLE.set(EchoVTable {
            free: record_free,
        });
        let vtable = ECHO_VTABLE.get().unwrap();
        FREED.lock().unwrap().clear();
        (vtable.free)(11);
        assert_eq!(*FREED.lock().unwrap(), vec![11]);
    }

    #[test]
    fn test_foreign_success() {
        let status = RustCallStatus::new();
        assert!(check_foreign_status::<String>(status).is_ok());
    }

    #[test]
    fn test_foreign_domain_error_is_decoded() {
        let buf = String::lower("disk full".to_string(), &NativeAllocator).unwrap();
        match check_foreign_status::<String>(status_with(RustCallStatusCode::Error, buf)) {
            Err(ForeignCallError::Domain(e)) => assert_eq!(e, "disk full"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_foreign_panic_is_unexpected() {
        let buf = String::lower("host blew up".to_string(), &NativeAllocator).unwrap();
        match check_foreign_status::<String>(status_with(RustCallStatusCode::Panic, buf)) {
            Err(ForeignCallError::Unexpected(message)) => assert_eq!(message, "host blew up"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_foreign_unknown_code_is_unexpected() {
        let status = RustCallStatus {
            code: 42,
            error_buf: RustBuffer::new(),
        };
        assert!(matches!(check_foreign_status::<String>(status), Err(ForeignCallError::Unexpected(_))));
    }

    #[test]
    fn test_domain_error_converts_to_call_failure() {
        let failure = CallFailure::from(ForeignCallError::<String>::Domain("quota".to_string()));
        match failure {
            CallFailure::Error(buf) => {
                assert_eq!(String::try_lift(buf, &NativeAllocator).unwrap(), "quota");
            }
            CallFailure::Internal(message) => panic!("unexpected internal failure: {}", message),
        }
    }
}
