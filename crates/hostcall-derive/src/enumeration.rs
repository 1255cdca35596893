// #[derive(NativeEnum)] implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, Result};

const INTEGER_REPRS: &[&str] = &[
    "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize",
];

/// Find the primitive integer named by `#[repr(...)]`.
fn integer_repr(input: &DeriveInput) -> Result<Ident> {
    let mut found = None;
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("repr")) {
        attr.parse_nested_meta(|meta| {
            if let Some(ident) = meta.path.get_ident() {
                if INTEGER_REPRS.contains(&ident.to_string().as_str()) {
                    found = Some(ident.clone());
                }
            }
            // skip arguments such as align(8)
            if meta.input.peek(syn::token::Paren) {
                let _args;
                syn::parenthesized!(_args in meta.input);
            }
            Ok(())
        })?;
    }
    found.ok_or_else(|| {
        syn::Error::new_spanned(
            &input.ident,
            "NativeEnum requires a primitive integer repr, e.g. #[repr(i32)]",
        )
    })
}

/// Expands the NativeEnum derive.
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[derive(NativeEnum)]
/// #[repr(i32)]
/// enum Weather { Clear = 0, Rain = 4 }
///
/// // Output:
/// impl ::hostcall_sdk::NativeEnum for Weather {
///     fn from_discriminant_word(word: u64) -> Option<Self> {
///         let raw = <i32 as ::hostcall_sdk::ScalarWord>::from_word(word);
///         if raw == Weather::Clear as i32 { return Some(Weather::Clear); }
///         if raw == Weather::Rain as i32 { return Some(Weather::Rain); }
///         None
///     }
/// }
/// impl ::hostcall_sdk::FromNative for Weather { /* panics when None */ }
/// impl From<Weather> for ::hostcall_sdk::Argument { /* the discriminant */ }
/// ```
pub fn expand_native_enum(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "NativeEnum can only be derived for enums",
        ));
    };
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "NativeEnum does not support generic enums",
        ));
    }
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "NativeEnum requires at least one variant",
        ));
    }

    let repr = integer_repr(&input)?;

    let mut variants = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "NativeEnum variants cannot carry fields",
            ));
        }
        variants.push(&variant.ident);
    }

    let checks = variants.iter().map(|variant| {
        quote! {
            if raw == #name::#variant as #repr {
                return ::core::option::Option::Some(#name::#variant);
            }
        }
    });

    Ok(quote! {
        impl ::hostcall_sdk::__private::Sealed for #name {}

        impl ::hostcall_sdk::NativeEnum for #name {
            fn from_discriminant_word(word: u64) -> ::core::option::Option<Self> {
                let raw = <#repr as ::hostcall_sdk::ScalarWord>::from_word(word);
                #(#checks)*
                ::core::option::Option::None
            }
        }

        /// Panics on an unknown discriminant; decode `Option<Self>` to accept one.
        impl ::hostcall_sdk::FromNative for #name {
            const SHAPE: ::hostcall_sdk::ResultShape = ::hostcall_sdk::ResultShape::Scalar;

            fn from_native(result: &::hostcall_sdk::ResultHandle<'_>) -> Self {
                let word = result.word();
                match <Self as ::hostcall_sdk::NativeEnum>::from_discriminant_word(word) {
                    ::core::option::Option::Some(value) => value,
                    ::core::option::Option::None => panic!(
                        "{} is not a valid `{}` discriminant",
                        <#repr as ::hostcall_sdk::ScalarWord>::from_word(word),
                        ::core::stringify!(#name)
                    ),
                }
            }
        }

        impl ::core::convert::From<#name> for ::hostcall_sdk::Argument {
            #[inline]
            fn from(value: #name) -> Self {
                ::hostcall_sdk::Argument::from(value as #repr)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_integer_repr_found() {
        let input: DeriveInput = parse_quote! {
            #[repr(align(8), u16)]
            enum Gait { Walk = 1, Run }
        };
        assert_eq!(integer_repr(&input).unwrap(), "u16");
        assert!(expand_native_enum(input).is_ok());
    }

    #[test]
    fn test_unsupported_enums_rejected() {
        let rejected: [DeriveInput; 5] = [
            parse_quote! { enum NoRepr { A, B } },
            parse_quote! { #[repr(C)] enum CRepr { A, B } },
            parse_quote! { #[repr(i32)] enum Carrying { A(i32), B } },
            parse_quote! { #[repr(i32)] enum Empty {} },
            parse_quote! { #[repr(i32)] enum Generic<T> { A, B(T) } },
        ];
        for input in rejected {
            let name = input.ident.to_string();
            assert!(expand_native_enum(input).is_err(), "{} was accepted", name);
        }
    }

    #[test]
    fn test_struct_rejected() {
        let input: DeriveInput = parse_quote! { #[repr(i32)] struct Weather(i32); };
        let err = expand_native_enum(input).unwrap_err();
        assert!(err.to_string().contains("only be derived for enums"));
    }

    #[test]
    fn test_expansion_seals_and_offers_lookup() {
        let tokens = expand_native_enum(parse_quote! {
            #[repr(i32)]
            enum Weather { Clear = 0, Rain = 4 }
        })
        .unwrap()
        .to_string();
        assert!(tokens.contains("Sealed for Weather"));
        assert!(tokens.contains("from_discriminant_word"));
    }
}
