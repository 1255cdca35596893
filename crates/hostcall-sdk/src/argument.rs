//! Argument encoding
//!
//! [`Argument`] is the heterogeneous argument type accepted by the invocation
//! façade. Each variant maps to exactly one [`EncodedArgument`]:
//!
//! ```text
//! Int(i64)      two's complement bits (narrower ints are sign-extended first)
//! UInt(u64)     the value itself (narrower ints are zero-extended first)
//! Bool(bool)    0 or 1
//! Float(f64)    IEEE 754 double bits (f32 is widened to f64 first)
//! Handle(u64)   the handle word, unchanged
//! Pointer(usize) the address
//! Text(CString) address of the owned NUL-terminated buffer
//! ```

use std::ffi::{CStr, CString};

use crate::error::{HostcallError, Result};
use crate::value::EncodedArgument;

/// A single argument for a native routine
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// Signed integer or enumerated constant
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Boolean
    Bool(bool),
    /// Floating-point number, carried as a double
    Float(f64),
    /// Handle word previously decoded from a native result
    Handle(u64),
    /// Raw address
    Pointer(usize),
    /// NUL-terminated text; the buffer lives as long as the argument
    Text(CString),
}

impl Argument {
    /// Encode into the canonical 64-bit word
    #[inline]
    pub fn encode(&self) -> EncodedArgument {
        let bits = match self {
            Argument::Int(i) => *i as u64,
            Argument::UInt(u) => *u,
            Argument::Bool(b) => *b as u64,
            Argument::Float(f) => f.to_bits(),
            Argument::Handle(word) => *word,
            Argument::Pointer(addr) => *addr as u64,
            Argument::Text(text) => text.as_ptr() as usize as u64,
        };
        EncodedArgument::from_bits(bits)
    }

    /// Create a text argument, rejecting interior NUL bytes
    pub fn try_text(text: &str) -> Result<Self> {
        if let Some(position) = text.bytes().position(|b| b == 0) {
            return Err(HostcallError::InteriorNul(position));
        }
        Ok(Argument::Text(CString::new(text).unwrap_or_default()))
    }

    /// Get type name for debugging
    pub const fn type_name(&self) -> &'static str {
        match self {
            Argument::Int(_) => "int",
            Argument::UInt(_) => "uint",
            Argument::Bool(_) => "bool",
            Argument::Float(_) => "float",
            Argument::Handle(_) => "handle",
            Argument::Pointer(_) => "pointer",
            Argument::Text(_) => "text",
        }
    }
}

macro_rules! impl_from_signed {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Argument {
                #[inline]
                fn from(value: $ty) -> Self {
                    Argument::Int(value as i64)
                }
            }
        )*
    };
}

macro_rules! impl_from_unsigned {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Argument {
                #[inline]
                fn from(value: $ty) -> Self {
                    Argument::UInt(value as u64)
                }
            }
        )*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<bool> for Argument {
    #[inline]
    fn from(value: bool) -> Self {
        Argument::Bool(value)
    }
}

impl From<f32> for Argument {
    #[inline]
    fn from(value: f32) -> Self {
        Argument::Float(value as f64)
    }
}

impl From<f64> for Argument {
    #[inline]
    fn from(value: f64) -> Self {
        Argument::Float(value)
    }
}

impl<T> From<*const T> for Argument {
    #[inline]
    fn from(ptr: *const T) -> Self {
        Argument::Pointer(ptr as usize)
    }
}

impl<T> From<*mut T> for Argument {
    #[inline]
    fn from(ptr: *mut T) -> Self {
        Argument::Pointer(ptr as usize)
    }
}

impl From<CString> for Argument {
    fn from(text: CString) -> Self {
        Argument::Text(text)
    }
}

impl From<&CStr> for Argument {
    fn from(text: &CStr) -> Self {
        Argument::Text(text.to_owned())
    }
}

/// Text is cut at the first NUL, which is where the native side stops reading.
impl From<&str> for Argument {
    fn from(text: &str) -> Self {
        let end = text.bytes().position(|b| b == 0).unwrap_or(text.len());
        Argument::Text(CString::new(&text[..end]).unwrap_or_default())
    }
}

impl From<String> for Argument {
    fn from(text: String) -> Self {
        Argument::from(text.as_str())
    }
}

impl From<&String> for Argument {
    fn from(text: &String) -> Self {
        Argument::from(text.as_str())
    }
}
