//! Native call primitives supplied by the host as C function pointers

use hostcall_sdk::{CallPrimitive, RoutineId};

use crate::error::FfiError;

/// Function table the host passes to `hostcall_install`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct HostcallPrimitives {
    /// Opens the native call frame for a routine
    pub begin_call: Option<extern "C" fn(routine: u64)>,
    /// Appends one argument word
    pub push_word: Option<extern "C" fn(word: u64)>,
    /// Runs the routine, returning its result address (may be null)
    pub execute_call: Option<extern "C" fn() -> *const u64>,
}

/// [`CallPrimitive`] over a validated [`HostcallPrimitives`] table
#[derive(Clone, Copy)]
pub struct ExternPrimitive {
    begin_call: extern "C" fn(u64),
    push_word: extern "C" fn(u64),
    execute_call: extern "C" fn() -> *const u64,
}

impl ExternPrimitive {
    /// Validate that every entry of the table is present
    pub fn from_table(table: &HostcallPrimitives) -> Result<Self, FfiError> {
        Ok(Self {
            begin_call: table
                .begin_call
                .ok_or(FfiError::MissingPrimitive("begin_call"))?,
            push_word: table
                .push_word
                .ok_or(FfiError::MissingPrimitive("push_word"))?,
            execute_call: table
                .execute_call
                .ok_or(FfiError::MissingPrimitive("execute_call"))?,
        })
    }
}

// SAFETY: the host promises, by installing the table, that execute_call's
// result storage follows the `CallPrimitive` validity contract.
unsafe impl CallPrimitive for ExternPrimitive {
    #[inline]
    fn begin_call(&mut self, routine: RoutineId) {
        (self.begin_call)(routine.raw())
    }

    #[inline]
    fn push_word(&mut self, word: u64) {
        (self.push_word)(word)
    }

    #[inline]
    fn execute_call(&mut self) -> *const u64 {
        (self.execute_call)()
    }
}
