//! Logging setup and forwarding to host callbacks
//!
//! Events go to any combination of stderr, a log file truncated at startup,
//! and C callbacks registered with `hostcall_add_log_handler`.

use std::ffi::{c_char, CString};
use std::fmt::Write as _;
use std::fs::File;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use once_cell::sync::{Lazy, OnceCell};
use parking_lot::{Mutex, RwLock};
use serde::Deserialize;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::FfiError;

/// Host log callback: `(unix time in ms, level code, NUL-terminated message)`.
///
/// Level codes: 0 trace, 1 debug, 2 info, 3 warn, 4 error. The message
/// pointer is only valid during the call.
pub type LogHandlerFn = extern "C" fn(time_ms: u64, level: u32, message: *const c_char);

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// Minimum level ("trace", "debug", "info", "warn", "error")
    pub level: String,
    /// Also write to stderr
    pub console: bool,
    /// Log file, truncated when logging starts
    pub file: Option<PathBuf>,
    /// Extra filter directives, e.g. "hostcall_sdk=trace"
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: false,
            file: None,
            filter: None,
        }
    }
}

static INITIALIZED: OnceCell<()> = OnceCell::new();
static FILE_GUARD: Lazy<Mutex<Option<WorkerGuard>>> = Lazy::new(|| Mutex::new(None));
static HANDLERS: Lazy<RwLock<Vec<LogHandlerFn>>> = Lazy::new(|| RwLock::new(Vec::new()));

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(config: &LogConfig) -> Result<(), FfiError> {
    INITIALIZED
        .get_or_try_init(|| {
            let level: Level = config
                .level
                .parse()
                .map_err(|_| FfiError::Config(format!("unknown log level {:?}", config.level)))?;
            let filter = build_filter(level, config.filter.as_deref());

            let console = config
                .console
                .then(|| fmt::layer().with_writer(std::io::stderr).with_target(false));

            let file = match &config.file {
                Some(path) => {
                    let file = File::create(path)
                        .map_err(|e| FfiError::Logging(format!("{}: {}", path.display(), e)))?;
                    let (writer, guard) = tracing_appender::non_blocking(file);
                    *FILE_GUARD.lock() = Some(guard);
                    Some(fmt::layer().with_writer(writer).with_ansi(false))
                }
                None => None,
            };

            tracing_subscriber::registry()
                .with(filter)
                .with(console)
                .with(file)
                .with(CallbackLayer)
                .try_init()
                .map_err(|e| FfiError::Logging(e.to_string()))?;

            tracing::info!("Logging system initialized");
            Ok(())
        })
        .map(|_| ())
}

fn build_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    let base = EnvFilter::from_default_env().add_directive(level.into());
    match directives {
        Some(directives) => directives
            .split(',')
            .filter(|d| !d.trim().is_empty())
            .fold(base, |filter, directive| match directive.trim().parse() {
                Ok(parsed) => filter.add_directive(parsed),
                Err(_) => {
                    tracing::warn!("Invalid filter directive: {}", directive);
                    filter
                }
            }),
        None => base,
    }
}

/// Flush and stop the file writer
pub fn shutdown_logging() {
    FILE_GUARD.lock().take();
}

/// Register a log callback. Returns false if it was already registered.
pub fn add_handler(handler: LogHandlerFn) -> bool {
    let mut handlers = HANDLERS.write();
    if handlers.iter().any(|h| std::ptr::fn_addr_eq(*h, handler)) {
        return false;
    }
    handlers.push(handler);
    true
}

/// Unregister a log callback. Returns false if it was not registered.
pub fn remove_handler(handler: LogHandlerFn) -> bool {
    let mut handlers = HANDLERS.write();
    let before = handlers.len();
    handlers.retain(|h| !std::ptr::fn_addr_eq(*h, handler));
    handlers.len() != before
}

fn level_code(level: &Level) -> u32 {
    match *level {
        Level::TRACE => 0,
        Level::DEBUG => 1,
        Level::INFO => 2,
        Level::WARN => 3,
        Level::ERROR => 4,
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

/// Forwards every event to the registered host callbacks
pub struct CallbackLayer;

impl<S: Subscriber> Layer<S> for CallbackLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // handlers may register or remove handlers, so call out on a copy
        let handlers = HANDLERS.read().clone();
        if handlers.is_empty() {
            return;
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        visitor.message.push_str(&visitor.fields);
        let text = CString::new(visitor.message.replace('\0', "")).unwrap_or_default();

        let time_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let level = level_code(event.metadata().level());

        for handler in handlers.iter() {
            handler(time_ms, level, text.as_ptr());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Serializes tests that register process-wide handlers
    static HANDLER_LOCK: Mutex<()> = Mutex::new(());
    static SEEN: Mutex<Vec<(u32, String)>> = Mutex::new(Vec::new());

    extern "C" fn record(_time_ms: u64, level: u32, message: *const c_char) {
        let text = unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned();
        SEEN.lock().push((level, text));
    }

    #[test]
    fn test_callback_layer_forwards_events() {
        let _guard = HANDLER_LOCK.lock();
        assert!(add_handler(record));
        assert!(!add_handler(record));

        let subscriber = tracing_subscriber::registry().with(CallbackLayer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(routine = 7, "frame misuse");
            tracing::error!("boom");
        });

        assert!(remove_handler(record));
        assert!(!remove_handler(record));

        let seen = SEEN.lock();
        assert!(seen.contains(&(3, "frame misuse routine=7".to_string())));
        assert!(seen.contains(&(4, "boom".to_string())));
    }

    static SELF_REMOVING_CALLS: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn remove_self(_time_ms: u64, _level: u32, _message: *const c_char) {
        SELF_REMOVING_CALLS.fetch_add(1, Ordering::SeqCst);
        remove_handler(remove_self);
    }

    #[test]
    fn test_handler_may_unregister_itself() {
        let _guard = HANDLER_LOCK.lock();
        assert!(add_handler(remove_self));

        let subscriber = tracing_subscriber::registry().with(CallbackLayer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("first");
            tracing::info!("second");
        });

        assert_eq!(SELF_REMOVING_CALLS.load(Ordering::SeqCst), 1);
        assert!(!remove_handler(remove_self));
    }

    #[test]
    fn test_level_codes() {
        assert_eq!(level_code(&Level::TRACE), 0);
        assert_eq!(level_code(&Level::INFO), 2);
        assert_eq!(level_code(&Level::ERROR), 4);
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.console);
        assert!(config.file.is_none());
    }
}
