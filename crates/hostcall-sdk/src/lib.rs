//! Hostcall SDK - typed invocation of word-based native routines
//!
//! Native routines are identified by opaque 64-bit codes, take any number of
//! word-sized arguments and return the address of word-sized result storage.
//! No type information crosses that boundary. This crate supplies it from the
//! caller's side:
//!
//! - [`Argument`] encodes each argument into one [`EncodedArgument`]
//! - [`CallFrameSequencer`] drives the single shared native call frame
//! - [`FromNative`] decodes the result into the type the caller asked for;
//!   the derives cover handles, enums and multi-word structs
//! - [`Invoker`] and the process-wide [`invoke`]/[`invoke_as`] tie them together
//!
//! # Example
//!
//! ```ignore
//! use hostcall_sdk::{invoke, NativeHandle, RoutineId};
//!
//! #[derive(NativeHandle)]
//! struct Ped(i32);
//!
//! const GET_PLAYER_PED: RoutineId = RoutineId::new(0x43A66C31C68491C0);
//! const SET_ENTITY_HEALTH: RoutineId = RoutineId::new(0x6B76DC1F3AE6E6A3);
//!
//! let ped = invoke!(GET_PLAYER_PED => Ped, 0i32);
//! invoke!(SET_ENTITY_HEALTH, &ped, 200i32, 0i32);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod argument;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod error;
pub mod frame;
pub mod invoke;
pub mod jobs;
pub mod result;
pub mod value;

pub use argument::Argument;
pub use catalog::RoutineCatalog;
pub use config::{InvokerConfig, ThreadPolicy};
pub use convert::{
    read_text, FromNative, NativeEnum, NativeHandle, ResultShape, ScalarWord, WordSlot,
};
pub use error::{HostcallError, Result};
pub use frame::{CallFrameSequencer, CallPrimitive, FrameState};
pub use invoke::{install, invoke, invoke_as, is_installed, uninstall, Invoker};
pub use result::ResultHandle;
pub use value::{EncodedArgument, RoutineId};

pub use hostcall_derive::{NativeEnum, NativeHandle, NativeStruct};

#[doc(hidden)]
pub mod __private {
    /// Implemented only by this crate's derives
    pub trait Sealed {}
}

pub(crate) use __private::Sealed;

/// Invoke a native routine on the process-wide invoker.
///
/// Each argument is converted with `Argument::from`, so anything with a
/// `From` impl for [`Argument`] can be passed directly.
///
/// ```ignore
/// invoke!(WAIT, 0i32);                          // no result
/// let t = invoke!(GET_GAME_TIMER => u32);       // typed result
/// let h = invoke!(GET_HASH_KEY => u32, "adder");
/// ```
#[macro_export]
macro_rules! invoke {
    ($routine:expr => $ty:ty $(, $arg:expr)* $(,)?) => {
        $crate::invoke_as::<$ty>($routine, &[$($crate::Argument::from($arg)),*])
    };
    ($routine:expr $(, $arg:expr)* $(,)?) => {
        $crate::invoke($routine, &[$($crate::Argument::from($arg)),*])
    };
}
