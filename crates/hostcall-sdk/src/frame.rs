//! Call-frame sequencing
//!
//! The native convention has a single shared call frame: open it for a
//! routine, push argument words in positional order, execute. There is no
//! reentrancy protocol, so every misuse of that sequence is a caller bug and
//! panics before the native side is touched.
//!
//! ```text
//! Idle --begin--> Open --push--> Open --execute--> Idle
//! ```
//!
//! While control is inside the primitive the frame counts as closed, so a
//! primitive that unwinds abandons its frame instead of wedging the sequencer.

use crate::result::ResultHandle;
use crate::value::{EncodedArgument, RoutineId};

/// The three native call primitives this layer drives.
///
/// # Safety
///
/// Implementors guarantee that the pointer returned by `execute_call` is
/// either null or readable for every word the executed routine produces, until
/// the next call to `begin_call`. When a routine's result is text, the first
/// result word must be null or the address of a NUL-terminated byte sequence
/// that stays readable for the same window.
pub unsafe trait CallPrimitive {
    /// Open the native call frame for `routine`
    fn begin_call(&mut self, routine: RoutineId);

    /// Append one argument word to the open frame
    fn push_word(&mut self, word: u64);

    /// Run the routine and return the address of its result storage
    fn execute_call(&mut self) -> *const u64;
}

unsafe impl<P: CallPrimitive + ?Sized> CallPrimitive for Box<P> {
    #[inline]
    fn begin_call(&mut self, routine: RoutineId) {
        (**self).begin_call(routine)
    }

    #[inline]
    fn push_word(&mut self, word: u64) {
        (**self).push_word(word)
    }

    #[inline]
    fn execute_call(&mut self) -> *const u64 {
        (**self).execute_call()
    }
}

unsafe impl<P: CallPrimitive + ?Sized> CallPrimitive for &mut P {
    #[inline]
    fn begin_call(&mut self, routine: RoutineId) {
        (**self).begin_call(routine)
    }

    #[inline]
    fn push_word(&mut self, word: u64) {
        (**self).push_word(word)
    }

    #[inline]
    fn execute_call(&mut self) -> *const u64 {
        (**self).execute_call()
    }
}

/// Sequencer state.
///
/// There is no separate executed state: executing returns straight to `Idle`,
/// and the lifetime of the returned [`ResultHandle`] stands in for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// No frame is open
    Idle,
    /// A frame is open and accepting arguments
    Open,
}

/// State machine guarding the shared native call frame.
///
/// Ordinary callers go through [`Invoker`](crate::Invoker); this type is the
/// building block underneath it.
pub struct CallFrameSequencer<P> {
    primitive: P,
    state: FrameState,
    routine: Option<RoutineId>,
    pushed: usize,
}

impl<P: CallPrimitive> CallFrameSequencer<P> {
    /// Create an idle sequencer driving `primitive`
    pub fn new(primitive: P) -> Self {
        Self {
            primitive,
            state: FrameState::Idle,
            routine: None,
            pushed: 0,
        }
    }

    /// Open a frame for `routine`.
    ///
    /// # Panics
    /// If a frame is already open.
    pub fn begin(&mut self, routine: RoutineId) {
        if let Some(open) = self.routine {
            panic!(
                "cannot begin call frame for {}: frame for {} is still open",
                routine, open
            );
        }
        self.primitive.begin_call(routine);
        self.state = FrameState::Open;
        self.routine = Some(routine);
        self.pushed = 0;
    }

    /// Push one encoded argument onto the open frame.
    ///
    /// # Panics
    /// If no frame is open.
    pub fn push(&mut self, word: EncodedArgument) {
        if self.state != FrameState::Open {
            panic!("cannot push argument {:?}: no call frame is open", word);
        }
        let routine = self.routine.take();
        self.state = FrameState::Idle;
        self.primitive.push_word(word.to_bits());
        self.state = FrameState::Open;
        self.routine = routine;
        self.pushed += 1;
    }

    /// Execute the open frame and return to idle.
    ///
    /// Returns `None` when the native side produced no result storage. The
    /// handle keeps the sequencer borrowed, so it cannot outlive the frame.
    ///
    /// # Panics
    /// If no frame is open.
    pub fn execute(&mut self) -> Option<ResultHandle<'_>> {
        let Some(routine) = self.routine else {
            panic!("cannot execute: no call frame is open");
        };
        let pushed = self.pushed;
        self.state = FrameState::Idle;
        self.routine = None;
        self.pushed = 0;
        let result = self.primitive.execute_call();
        tracing::trace!(routine = %routine, pushed, "executed call frame");
        // SAFETY: `CallPrimitive` guarantees validity until the next begin_call,
        // which the returned borrow of `self` prevents.
        unsafe { ResultHandle::from_raw(result) }
    }

    /// Current state
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Routine of the open frame, if any
    pub fn open_routine(&self) -> Option<RoutineId> {
        self.routine
    }

    /// Number of words pushed onto the open frame
    pub fn pushed(&self) -> usize {
        self.pushed
    }

    /// Borrow the underlying primitive
    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    /// Consume the sequencer, returning the primitive
    pub fn into_primitive(self) -> P {
        self.primitive
    }
}
