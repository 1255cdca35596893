//! Decoding native result words into typed Rust values
//!
//! Nothing about a result's type crosses the native boundary; the caller's
//! requested type picks the decoding strategy. The strategy is resolved by
//! trait selection at compile time, and a type with no [`FromNative`] impl is
//! rejected by the compiler.
//!
//! | Shape    | Types                              | Strategy                          |
//! |----------|------------------------------------|-----------------------------------|
//! | Scalar   | integers, `bool`, `NativeEnum`s    | reinterpret the word's low bits   |
//! | Float    | `f64`, `f32`                       | word as double bits, then convert |
//! | Text     | `String`, `Option<String>`         | copy a NUL-terminated UTF-8 string|
//! | Handle   | `NativeHandle` types               | `from_native_word(word)`          |
//! | Struct   | `NativeStruct` types               | one word slot per field           |
//!
//! `Option<E>` of a `NativeEnum` decodes unknown discriminants as `None`.

use std::ffi::{c_char, CStr};

use crate::result::ResultHandle;
use crate::Sealed;

/// Decoding strategy of a [`FromNative`] type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// Bit reinterpretation of the word
    Scalar,
    /// Double-precision bits, numerically converted
    Float,
    /// Address of NUL-terminated UTF-8 text
    Text,
    /// Single-word handle reconstruction
    Handle,
    /// Consecutive words, one per field
    Struct,
}

/// Decode a value from native result storage.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be decoded from a native result",
    label = "no decoding strategy for `{Self}`",
    note = "supported results are integers, bool, f32/f64, String, Option<String>, and types deriving `NativeHandle` or `NativeEnum`"
)]
pub trait FromNative: Sized {
    /// Strategy this type decodes with
    const SHAPE: ResultShape;

    /// Reconstruct the value from the result storage
    fn from_native(result: &ResultHandle<'_>) -> Self;
}

/// A primitive whose bit pattern maps directly onto the low bits of a word.
///
/// This is the field type accepted by `#[derive(NativeHandle)]`.
pub trait ScalarWord: Copy {
    /// Truncate a word to this type's width
    fn from_word(word: u64) -> Self;

    /// Extend to a full word (sign-extending signed types)
    fn to_word(self) -> u64;
}

macro_rules! impl_scalar_word {
    ($($ty:ty => $wide:ty),* $(,)?) => {
        $(
            impl ScalarWord for $ty {
                #[inline(always)]
                fn from_word(word: u64) -> Self {
                    word as $ty
                }

                #[inline(always)]
                fn to_word(self) -> u64 {
                    self as $wide as u64
                }
            }

            impl FromNative for $ty {
                const SHAPE: ResultShape = ResultShape::Scalar;

                #[inline]
                fn from_native(result: &ResultHandle<'_>) -> Self {
                    <$ty as ScalarWord>::from_word(result.word())
                }
            }
        )*
    };
}

impl_scalar_word!(
    i8 => i64, i16 => i64, i32 => i64, i64 => i64, isize => i64,
    u8 => u64, u16 => u64, u32 => u64, u64 => u64, usize => u64,
);

/// Only the low byte is significant, like a one-byte read of the word.
impl ScalarWord for bool {
    #[inline(always)]
    fn from_word(word: u64) -> Self {
        (word as u8) != 0
    }

    #[inline(always)]
    fn to_word(self) -> u64 {
        self as u64
    }
}

impl FromNative for bool {
    const SHAPE: ResultShape = ResultShape::Scalar;

    #[inline]
    fn from_native(result: &ResultHandle<'_>) -> Self {
        bool::from_word(result.word())
    }
}

impl FromNative for f64 {
    const SHAPE: ResultShape = ResultShape::Float;

    #[inline]
    fn from_native(result: &ResultHandle<'_>) -> Self {
        f64::from_bits(result.word())
    }
}

/// Inverse of the encoder's widening; a numeric narrowing, not a bit cast.
impl FromNative for f32 {
    const SHAPE: ResultShape = ResultShape::Float;

    #[inline]
    fn from_native(result: &ResultHandle<'_>) -> Self {
        f64::from_bits(result.word()) as f32
    }
}

/// A null text address decodes as the empty string.
impl FromNative for String {
    const SHAPE: ResultShape = ResultShape::Text;

    fn from_native(result: &ResultHandle<'_>) -> Self {
        // SAFETY: the `CallPrimitive` contract covers text-shaped results
        unsafe { read_text(result.word()) }.unwrap_or_default()
    }
}

/// A null text address decodes as `None`.
impl FromNative for Option<String> {
    const SHAPE: ResultShape = ResultShape::Text;

    fn from_native(result: &ResultHandle<'_>) -> Self {
        // SAFETY: the `CallPrimitive` contract covers text-shaped results
        unsafe { read_text(result.word()) }
    }
}

/// Copy the NUL-terminated UTF-8 text at `address` into an owned string.
///
/// Invalid UTF-8 sequences are replaced with U+FFFD.
///
/// # Safety
/// `address` must be zero or point to a readable NUL-terminated sequence.
pub unsafe fn read_text(address: u64) -> Option<String> {
    if address == 0 {
        return None;
    }
    let text = CStr::from_ptr(address as usize as *const c_char);
    Some(text.to_string_lossy().into_owned())
}

/// A type whose entire state is one native word.
///
/// Construction is a plain function of the word, so there is no partially
/// initialized state to worry about. The trait is sealed: the only way to
/// implement it is `#[derive(NativeHandle)]` on a single-field struct, which
/// refuses any other shape and also wires up [`FromNative`] and
/// `From<T> for Argument`.
pub trait NativeHandle: Sealed + Sized {
    /// Build the value from its native word
    fn from_native_word(word: u64) -> Self;

    /// The word this value was built from
    fn native_word(&self) -> u64;
}

/// A fieldless enum carried as its discriminant.
///
/// Sealed; implemented by `#[derive(NativeEnum)]`. Decoding the enum itself
/// panics on an unknown discriminant, while `Option<E>` decodes it as `None`.
pub trait NativeEnum: Sealed + Sized {
    /// The variant whose discriminant matches the word's low bits
    fn from_discriminant_word(word: u64) -> Option<Self>;
}

impl<E: NativeEnum> FromNative for Option<E> {
    const SHAPE: ResultShape = ResultShape::Scalar;

    #[inline]
    fn from_native(result: &ResultHandle<'_>) -> Self {
        E::from_discriminant_word(result.word())
    }
}

/// A field of a multi-word result, read from its own word slot.
///
/// Slots hold raw memory, so narrow values sit in the low bits: an `f32`
/// slot is a single-precision bit pattern, unlike an `f32` result word.
pub trait WordSlot: Sized {
    /// Read the value stored in `word`
    fn from_slot(word: u64) -> Self;
}

macro_rules! impl_word_slot {
    ($($ty:ty),*) => {
        $(
            impl WordSlot for $ty {
                #[inline(always)]
                fn from_slot(word: u64) -> Self {
                    <$ty as ScalarWord>::from_word(word)
                }
            }
        )*
    };
}

impl_word_slot!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, bool);

impl WordSlot for f32 {
    #[inline(always)]
    fn from_slot(word: u64) -> Self {
        f32::from_bits(word as u32)
    }
}

impl WordSlot for f64 {
    #[inline(always)]
    fn from_slot(word: u64) -> Self {
        f64::from_bits(word)
    }
}
