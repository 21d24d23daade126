#[cfg(test)]
mod tests {
    use crate::*;
    use bridge_abi::{FfiConverter, RustBuffer, RustCallStatus, RustCallStatusCode, RustFuturePoll};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;
    use tokio::sync::oneshot;

    static POLL_RESULTS: Mutex<Vec<(u64, i8)>> = Mutex::new(Vec::new());
    static NEXT_DATA: AtomicU64 = AtomicU64::new(1);

    extern "C" fn record_poll(callback_data: u64, poll_result: i8) {
        POLL_RESULTS.lock().unwrap().push((callback_data, poll_result));
    }

    /// Unique callback data per poll so parallel tests never see each other's results.
    fn next_data() -> u64 {
        NEXT_DATA.fetch_add(1, Ordering::SeqCst)
    }

    fn results_for(data: u64) -> Vec<i8> {
        POLL_RESULTS.lock().unwrap().iter().filter(|(d, _)| *d == data).map(|(_, r)| *r).collect()
    }

    fn wait_for_result(data: u64) -> i8 {
        for _ in 0..500 {
            if let Some(result) = results_for(data).first() {
                return *result;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("continuation {} never fired", data);
    }

    async fn explode() -> Result<i32, CallFailure> {
        panic!("async boom")
    }

    fn poll<T: bridge_abi::FfiDefault + Send + 'static>(handle: u64) -> u64 {
        let data = next_data();
        unsafe { rust_future_poll::<T>(handle, record_poll, data) };
        data
    }

    #[test]
    fn test_ready_future_completes_on_first_poll() {
        let handle = rust_future_new(async { Ok::<_, CallFailure>(5u32) });
        let data = poll::<u32>(handle);
        assert_eq!(results_for(data), vec![RustFuturePoll::Ready as i8]);

        let mut status = RustCallStatus::new();
        let value = unsafe { rust_future_complete::<u32>(handle, &mut status) };
        assert!(status.is_success());
        assert_eq!(value, 5);
        unsafe { rust_future_free::<u32>(handle) };
    }

    #[test]
    fn test_wake_from_another_thread_requests_another_poll() {
        let (tx, rx) = oneshot::channel::<u64>();
        let handle = rust_future_new(async move {
            rx.await.map_err(|_| CallFailure::Internal("sender dropped".to_string()))
        });

        let first = poll::<u64>(handle);
        assert!(results_for(first).is_empty());

        thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            tx.send(99).unwrap();
        });
        assert_eq!(wait_for_result(first), RustFuturePoll::MaybeReady as i8);
        assert_eq!(results_for(first).len(), 1);

        let second = poll::<u64>(handle);
        assert_eq!(results_for(second), vec![RustFuturePoll::Ready as i8]);

        let mut status = RustCallStatus::new();
        assert_eq!(unsafe { rust_future_complete::<u64>(handle, &mut status) }, 99);
        assert!(status.is_success());
        unsafe { rust_future_free::<u64>(handle) };
    }

    #[test]
    fn test_cancel_fires_pending_continuation_with_ready() {
        let (_tx, rx) = oneshot::channel::<()>();
        let handle = rust_future_new(async move {
            let _ = rx.await;
            Ok::<_, CallFailure>(())
        });

        let data = poll::<()>(handle);
        assert!(results_for(data).is_empty());

        unsafe { rust_future_cancel::<()>(handle) };
        assert_eq!(results_for(data), vec![RustFuturePoll::Ready as i8]);

        // Later polls resolve immediately.
        let again = poll::<()>(handle);
        assert_eq!(results_for(again), vec![RustFuturePoll::Ready as i8]);

        let mut status = RustCallStatus::new();
        unsafe { rust_future_complete::<()>(handle, &mut status) };
        assert_eq!(status.code(), Ok(RustCallStatusCode::Panic));
        unsafe {
            rustbuffer_free(status.error_buf, &mut RustCallStatus::new());
            rust_future_free::<()>(handle);
        }
    }

    #[test]
    fn test_panic_inside_future_surfaces_on_complete() {
        let handle = rust_future_new(explode());
        let data = poll::<i32>(handle);
        assert_eq!(results_for(data), vec![RustFuturePoll::Ready as i8]);

        let mut status = RustCallStatus::new();
        let value = unsafe { rust_future_complete::<i32>(handle, &mut status) };
        assert_eq!(value, 0);
        assert_eq!(status.code(), Ok(RustCallStatusCode::Panic));
        assert_eq!(String::try_lift(status.error_buf, &NativeAllocator).unwrap(), "async boom");
        unsafe { rust_future_free::<i32>(handle) };
    }

    #[test]
    fn test_domain_error_surfaces_on_complete() {
        let handle = rust_future_new(async { lower_result::<String, String>(Err("declined".to_string())) });
        poll::<RustBuffer>(handle);

        let mut status = RustCallStatus::new();
        let value = unsafe { rust_future_complete::<RustBuffer>(handle, &mut status) };
        assert!(value.is_unallocated());
        assert_eq!(status.code(), Ok(RustCallStatusCode::Error));
        assert_eq!(String::try_lift(status.error_buf, &NativeAllocator).unwrap(), "declined");
        unsafe { rust_future_free::<RustBuffer>(handle) };
    }

    #[test]
    fn test_complete_before_ready_is_a_fault_and_keeps_future() {
        let (tx, rx) = oneshot::channel::<u8>();
        let handle = rust_future_new(async move { rx.await.map_err(|e| CallFailure::Internal(e.to_string())) });

        let mut status = RustCallStatus::new();
        unsafe { rust_future_complete::<u8>(handle, &mut status) };
        assert_eq!(status.code(), Ok(RustCallStatusCode::Panic));
        unsafe { rustbuffer_free(status.error_buf, &mut RustCallStatus::new()) };

        tx.send(3).unwrap();
        let data = poll::<u8>(handle);
        assert_eq!(results_for(data), vec![RustFuturePoll::Ready as i8]);
        let mut status = RustCallStatus::new();
        assert_eq!(unsafe { rust_future_complete::<u8>(handle, &mut status) }, 3);
        unsafe { rust_future_free::<u8>(handle) };
    }

    #[test]
    fn test_second_complete_is_a_fault() {
        let handle = rust_future_new(async { Ok::<_, CallFailure>(1.5f64) });
        poll::<f64>(handle);
        let mut status = RustCallStatus::new();
        assert_eq!(unsafe { rust_future_complete::<f64>(handle, &mut status) }, 1.5);

        let mut status = RustCallStatus::new();
        unsafe { rust_future_complete::<f64>(handle, &mut status) };
        assert_eq!(status.code(), Ok(RustCallStatusCode::Panic));
        unsafe {
            rustbuffer_free(status.error_buf, &mut RustCallStatus::new());
            rust_future_free::<f64>(handle);
        }
    }
}
