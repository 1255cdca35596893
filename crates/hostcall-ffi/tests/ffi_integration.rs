//! Integration tests for the C API, driven through fake host primitives

use std::ffi::{c_char, CStr};
use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};

use hostcall_ffi::*;
use hostcall_sdk::RoutineId;
use parking_lot::Mutex;

// Serializes tests that install the process-wide primitive
static GLOBAL_LOCK: Mutex<()> = Mutex::new(());

static CALLS: Mutex<Vec<String>> = Mutex::new(Vec::new());
static RESULT: AtomicU64 = AtomicU64::new(0);

extern "C" fn begin_call(routine: u64) {
    CALLS.lock().push(format!("begin {:#x}", routine));
}

extern "C" fn push_word(word: u64) {
    CALLS.lock().push(format!("push {}", word));
}

extern "C" fn execute_call() -> *const u64 {
    CALLS.lock().push("execute".to_string());
    RESULT.as_ptr()
}

fn table() -> HostcallPrimitives {
    HostcallPrimitives {
        begin_call: Some(begin_call),
        push_word: Some(push_word),
        execute_call: Some(execute_call),
    }
}

fn install(config: &CStr) -> Result<(), String> {
    let mut error = ptr::null_mut();
    let code = unsafe { hostcall_install(&table(), config.as_ptr(), &mut error) };
    if code == 0 {
        assert!(error.is_null());
        Ok(())
    } else {
        let message = unsafe { CStr::from_ptr(hostcall_error_message(error)) }
            .to_string_lossy()
            .into_owned();
        unsafe { hostcall_error_free(error) };
        Err(message)
    }
}

#[test]
fn test_install_and_invoke_through_table() {
    let _guard = GLOBAL_LOCK.lock();
    CALLS.lock().clear();
    RESULT.store(99, Ordering::SeqCst);

    install(c"[invoker]\ntrace_calls = true").unwrap();
    assert_eq!(hostcall_is_installed(), 1);

    let value = hostcall_sdk::invoke!(0xABCu64 => u32, 7i32, true);
    assert_eq!(value, 99);
    assert_eq!(
        *CALLS.lock(),
        vec!["begin 0xabc", "push 7", "push 1", "execute"]
    );

    assert_eq!(hostcall_uninstall(), 1);
    assert_eq!(hostcall_uninstall(), 0);
    assert_eq!(hostcall_is_installed(), 0);
}

#[test]
fn test_null_config_means_defaults() {
    let _guard = GLOBAL_LOCK.lock();
    let mut error = ptr::null_mut();
    let code = unsafe { hostcall_install(&table(), ptr::null(), &mut error) };
    assert_eq!(code, 0);
    assert!(error.is_null());
    hostcall_uninstall();
}

#[test]
fn test_missing_primitive_reported() {
    let _guard = GLOBAL_LOCK.lock();
    let incomplete = HostcallPrimitives {
        execute_call: None,
        ..table()
    };
    let mut error = ptr::null_mut();
    let code = unsafe { hostcall_install(&incomplete, ptr::null(), &mut error) };
    assert_eq!(code, -1);
    let message = unsafe { CStr::from_ptr(hostcall_error_message(error)) };
    assert_eq!(
        message.to_str().unwrap(),
        "Missing native call primitive: execute_call"
    );
    unsafe { hostcall_error_free(error) };
    assert_eq!(hostcall_is_installed(), 0);
}

#[test]
fn test_bad_config_reported() {
    let _guard = GLOBAL_LOCK.lock();
    let message = install(c"[invoker]\nthread_policy = \"sometimes\"").unwrap_err();
    assert!(message.starts_with("Config error"), "{}", message);
    assert_eq!(hostcall_is_installed(), 0);
}

#[test]
fn test_routine_lookup_by_name() {
    let _guard = GLOBAL_LOCK.lock();
    install(c"[routines]\nWAIT = \"0x4EDE34FBADD967A6\"\nGET_GAME_TIMER = 40000").unwrap();

    let mut id = 0u64;
    let found = unsafe { hostcall_routine_id(c"WAIT".as_ptr(), &mut id, ptr::null_mut()) };
    assert_eq!(found, 1);
    assert_eq!(id, 0x4EDE34FBADD967A6);

    let missing = unsafe { hostcall_routine_id(c"NOPE".as_ptr(), &mut id, ptr::null_mut()) };
    assert_eq!(missing, 0);

    let mut error = ptr::null_mut();
    let invalid = unsafe { hostcall_routine_id(ptr::null(), &mut id, &mut error) };
    assert_eq!(invalid, -1);
    unsafe { hostcall_error_free(error) };

    let timer = with_catalog(|catalog| catalog.get("GET_GAME_TIMER"));
    assert_eq!(timer, Some(RoutineId::new(40000)));

    hostcall_uninstall();
    assert!(with_catalog(|catalog| catalog.is_empty()));
}

#[test]
fn test_tick_runs_jobs_queued_from_other_threads() {
    let _guard = GLOBAL_LOCK.lock();
    CALLS.lock().clear();
    RESULT.store(0, Ordering::SeqCst);
    install(c"").unwrap();

    std::thread::spawn(|| {
        hostcall_sdk::jobs::schedule(|| hostcall_sdk::invoke!(RoutineId::new(0x10), 3u8));
    })
    .join()
    .unwrap();

    assert!(CALLS.lock().is_empty());
    assert_eq!(hostcall_tick(), 1);
    assert_eq!(*CALLS.lock(), vec!["begin 0x10", "push 3", "execute"]);
    assert_eq!(hostcall_tick(), 0);
    hostcall_uninstall();
}

static LOGGED: Mutex<Vec<(u32, String)>> = Mutex::new(Vec::new());

extern "C" fn capture(_time_ms: u64, level: u32, message: *const c_char) {
    let text = unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned();
    LOGGED.lock().push((level, text));
}

#[test]
fn test_log_handler_receives_install_events() {
    let _guard = GLOBAL_LOCK.lock();
    LOGGED.lock().clear();
    assert_eq!(hostcall_add_log_handler(Some(capture)), 1);
    assert_eq!(hostcall_add_log_handler(Some(capture)), 0);

    install(c"[routines]\nA = 1\nB = 2").unwrap();
    hostcall_uninstall();

    assert_eq!(hostcall_remove_log_handler(Some(capture)), 1);
    assert_eq!(hostcall_remove_log_handler(Some(capture)), 0);

    let logged = LOGGED.lock();
    assert!(logged
        .iter()
        .any(|(level, text)| *level == 2 && text.contains("installing native call primitives")));
}
