// hostcall-derive: derive macros for hostcall result types
//
// Provides:
// - #[derive(NativeHandle)] - single-word handle types
// - #[derive(NativeEnum)]   - fieldless enums carried as their discriminant
// - #[derive(NativeStruct)] - multi-word results, one word slot per field
//
// Example:
// ```
// use hostcall_sdk::{NativeEnum, NativeHandle};
//
// #[derive(NativeHandle)]
// struct Vehicle(i32);
//
// #[derive(NativeEnum, Clone, Copy)]
// #[repr(i32)]
// enum Weather { Clear = 0, Rain = 4 }
// ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod enumeration;
mod handle;
mod structure;

/// Derives `NativeHandle` for a struct with exactly one field.
///
/// The field's type must implement `hostcall_sdk::ScalarWord`. The value is
/// built from the native word alone, so the struct has no other state that
/// could be left uninitialized. Also generates:
/// - `FromNative` with the `Handle` shape
/// - `From<T>` and `From<&T>` for `Argument`, encoding `Argument::Handle`
///
/// # Example
///
/// ```ignore
/// #[derive(NativeHandle)]
/// struct Ped {
///     handle: i32,
/// }
/// ```
///
/// Structs with zero or several fields, enums and unions are rejected at
/// compile time.
#[proc_macro_derive(NativeHandle)]
pub fn derive_native_handle(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    handle::expand_native_handle(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derives result decoding and argument encoding for a fieldless enum.
///
/// The enum needs a primitive integer `#[repr]`. Decoding matches the
/// discriminant. Decoding the enum itself panics on an unknown discriminant;
/// decoding `Option<Enum>` returns `None` for one instead.
///
/// # Example
///
/// ```ignore
/// #[derive(NativeEnum)]
/// #[repr(u32)]
/// enum Gait {
///     Walk = 1,
///     Run = 2,
/// }
/// ```
#[proc_macro_derive(NativeEnum)]
pub fn derive_native_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    enumeration::expand_native_enum(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derives decoding of a multi-word result.
///
/// Field `i` is read from result word `i` through `hostcall_sdk::WordSlot`.
/// Deriving it declares that routines returning the type produce one word
/// per field.
///
/// # Example
///
/// ```ignore
/// #[derive(NativeStruct)]
/// struct Vector3 {
///     x: f32,
///     y: f32,
///     z: f32,
/// }
/// ```
#[proc_macro_derive(NativeStruct)]
pub fn derive_native_struct(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    structure::expand_native_struct(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
