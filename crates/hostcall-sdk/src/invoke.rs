//! Invocation façade
//!
//! [`Invoker`] composes the encoder, sequencer and decoder into one call path:
//! begin, push every argument in order, execute, decode. The free functions
//! [`invoke`] and [`invoke_as`] drive a process-wide invoker installed with
//! [`install`], which is how hosts expose their single native call frame.

use std::cell::Cell;
use std::thread::{self, ThreadId};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::argument::Argument;
use crate::config::{InvokerConfig, ThreadPolicy};
use crate::convert::FromNative;
use crate::frame::{CallFrameSequencer, CallPrimitive};
use crate::result::ResultHandle;
use crate::value::RoutineId;

/// Typed invocation over one call primitive
pub struct Invoker<P> {
    sequencer: CallFrameSequencer<P>,
    config: InvokerConfig,
}

impl<P: CallPrimitive> Invoker<P> {
    /// Create an invoker driving `primitive`
    pub fn new(primitive: P, config: InvokerConfig) -> Self {
        Self {
            sequencer: CallFrameSequencer::new(primitive),
            config,
        }
    }

    /// Invoke `routine`, discarding any result
    pub fn invoke(&mut self, routine: impl Into<RoutineId>, args: &[Argument]) {
        let _ = self.run(routine.into(), args);
    }

    /// Invoke `routine` and decode its result as `T`.
    ///
    /// # Panics
    /// If the native side produced no result storage.
    pub fn invoke_as<T: FromNative>(&mut self, routine: impl Into<RoutineId>, args: &[Argument]) -> T {
        let routine = routine.into();
        match self.run(routine, args) {
            Some(result) => T::from_native(&result),
            None => panic!(
                "routine {} produced no result storage to decode as `{}`",
                routine,
                std::any::type_name::<T>()
            ),
        }
    }

    fn run(&mut self, routine: RoutineId, args: &[Argument]) -> Option<ResultHandle<'_>> {
        if self.config.trace_calls {
            tracing::trace!(routine = %routine, args = args.len(), "invoke");
        }
        self.sequencer.begin(routine);
        for arg in args {
            self.sequencer.push(arg.encode());
        }
        self.sequencer.execute()
    }

    /// Invoker configuration
    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    /// Borrow the call primitive
    pub fn primitive(&self) -> &P {
        self.sequencer.primitive()
    }

    /// Consume the invoker, returning the call primitive
    pub fn into_primitive(self) -> P {
        self.sequencer.into_primitive()
    }
}

// ============================================================================
// Process-wide invoker
// ============================================================================

type SharedPrimitive = Box<dyn CallPrimitive + Send>;

struct Installed {
    invoker: Invoker<SharedPrimitive>,
    owner: ThreadId,
}

static INVOKER: Lazy<Mutex<Option<Installed>>> = Lazy::new(|| Mutex::new(None));

thread_local! {
    static IN_CALL: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as inside an invocation until dropped.
struct CallGuard;

impl CallGuard {
    fn enter() -> Self {
        if IN_CALL.with(|flag| flag.replace(true)) {
            panic!("nested native invocation: a call frame is already in flight on this thread");
        }
        CallGuard
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        IN_CALL.with(|flag| flag.set(false));
    }
}

/// Install the process-wide call primitive, replacing any previous one.
///
/// Under [`ThreadPolicy::Pinned`] the calling thread becomes the only thread
/// allowed to invoke.
pub fn install(primitive: impl CallPrimitive + Send + 'static, config: InvokerConfig) {
    let _guard = CallGuard::enter();
    let owner = thread::current().id();
    tracing::debug!(policy = ?config.thread_policy, trace_calls = config.trace_calls, "installing native call primitive");
    let primitive: SharedPrimitive = Box::new(primitive);
    let previous = INVOKER.lock().replace(Installed {
        invoker: Invoker::new(primitive, config),
        owner,
    });
    if previous.is_some() {
        tracing::debug!("replaced previously installed call primitive");
    }
}

/// Remove the process-wide call primitive. Returns whether one was installed.
pub fn uninstall() -> bool {
    let _guard = CallGuard::enter();
    let removed = INVOKER.lock().take().is_some();
    if removed {
        tracing::debug!("uninstalled native call primitive");
    }
    removed
}

/// Whether a process-wide call primitive is installed
pub fn is_installed() -> bool {
    // the invoker lock is already held further up this thread's stack
    if IN_CALL.with(|flag| flag.get()) {
        return true;
    }
    INVOKER.lock().is_some()
}

fn with_installed<R>(f: impl FnOnce(&mut Invoker<SharedPrimitive>) -> R) -> R {
    let _guard = CallGuard::enter();
    let mut slot = INVOKER.lock();
    let Some(installed) = slot.as_mut() else {
        panic!("no native call primitive is installed");
    };
    if installed.invoker.config().thread_policy == ThreadPolicy::Pinned {
        let current = thread::current().id();
        if current != installed.owner {
            panic!(
                "native invocation from {:?}, but the call primitive is pinned to {:?}",
                current, installed.owner
            );
        }
    }
    f(&mut installed.invoker)
}

/// Invoke `routine` on the process-wide invoker, discarding any result.
///
/// # Panics
/// If nothing is installed, the thread policy rejects the calling thread, or
/// an invocation is already in flight on this thread.
pub fn invoke(routine: impl Into<RoutineId>, args: &[Argument]) {
    let routine = routine.into();
    with_installed(|invoker| invoker.invoke(routine, args))
}

/// Invoke `routine` on the process-wide invoker and decode the result as `T`.
///
/// The invoker lock is held until decoding finishes, so the result storage
/// cannot be overwritten by another thread's frame.
///
/// # Panics
/// As [`invoke`], and if the routine produced no result storage.
pub fn invoke_as<T: FromNative>(routine: impl Into<RoutineId>, args: &[Argument]) -> T {
    let routine = routine.into();
    with_installed(|invoker| invoker.invoke_as::<T>(routine, args))
}
