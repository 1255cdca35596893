// #[derive(NativeHandle)] implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

/// Expands the NativeHandle derive.
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[derive(NativeHandle)]
/// struct Ped(i32);
///
/// // Output:
/// impl ::hostcall_sdk::NativeHandle for Ped {
///     fn from_native_word(word: u64) -> Self {
///         Ped(<i32 as ::hostcall_sdk::ScalarWord>::from_word(word))
///     }
///     fn native_word(&self) -> u64 {
///         ::hostcall_sdk::ScalarWord::to_word(self.0)
///     }
/// }
/// impl ::hostcall_sdk::FromNative for Ped { /* Handle shape */ }
/// impl From<Ped> for ::hostcall_sdk::Argument { /* Argument::Handle */ }
/// impl From<&Ped> for ::hostcall_sdk::Argument { /* Argument::Handle */ }
/// ```
pub fn expand_native_handle(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "NativeHandle can only be derived for structs",
        ));
    };

    let fields: Vec<_> = data.fields.iter().collect();
    if fields.len() != 1 {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "NativeHandle requires exactly one field holding the native word; \
             any other state could not be rebuilt from the word",
        ));
    }
    let field_ty = &fields[0].ty;

    let (construct, access) = match &data.fields {
        Fields::Named(_) => {
            let field_name = fields[0].ident.as_ref();
            (
                quote! { Self { #field_name: <#field_ty as ::hostcall_sdk::ScalarWord>::from_word(word) } },
                quote! { self.#field_name },
            )
        }
        Fields::Unnamed(_) => (
            quote! { Self(<#field_ty as ::hostcall_sdk::ScalarWord>::from_word(word)) },
            quote! { self.0 },
        ),
        Fields::Unit => unreachable!("unit structs have no fields"),
    };

    Ok(quote! {
        impl #impl_generics ::hostcall_sdk::__private::Sealed for #name #ty_generics #where_clause {}

        impl #impl_generics ::hostcall_sdk::NativeHandle for #name #ty_generics #where_clause {
            #[inline]
            fn from_native_word(word: u64) -> Self {
                #construct
            }

            #[inline]
            fn native_word(&self) -> u64 {
                ::hostcall_sdk::ScalarWord::to_word(#access)
            }
        }

        impl #impl_generics ::hostcall_sdk::FromNative for #name #ty_generics #where_clause {
            const SHAPE: ::hostcall_sdk::ResultShape = ::hostcall_sdk::ResultShape::Handle;

            #[inline]
            fn from_native(result: &::hostcall_sdk::ResultHandle<'_>) -> Self {
                <Self as ::hostcall_sdk::NativeHandle>::from_native_word(result.word())
            }
        }

        impl #impl_generics ::core::convert::From<#name #ty_generics> for ::hostcall_sdk::Argument #where_clause {
            #[inline]
            fn from(handle: #name #ty_generics) -> Self {
                ::hostcall_sdk::Argument::Handle(::hostcall_sdk::NativeHandle::native_word(&handle))
            }
        }

        impl #impl_generics ::core::convert::From<&#name #ty_generics> for ::hostcall_sdk::Argument #where_clause {
            #[inline]
            fn from(handle: &#name #ty_generics) -> Self {
                ::hostcall_sdk::Argument::Handle(::hostcall_sdk::NativeHandle::native_word(handle))
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_single_field_structs_accepted() {
        assert!(expand_native_handle(parse_quote! { struct Ped(i32); }).is_ok());
        assert!(expand_native_handle(parse_quote! { struct Blip { handle: u64 } }).is_ok());
    }

    #[test]
    fn test_other_shapes_rejected() {
        let rejected: [DeriveInput; 5] = [
            parse_quote! { struct Empty; },
            parse_quote! { struct NoFields {} },
            parse_quote! { struct Pair(i32, i32); },
            parse_quote! { struct Cached { handle: i32, name: String } },
            parse_quote! { enum Entity { Ped(i32) } },
        ];
        for input in rejected {
            let name = input.ident.to_string();
            assert!(expand_native_handle(input).is_err(), "{} was accepted", name);
        }
    }

    #[test]
    fn test_union_rejected() {
        let input: DeriveInput = parse_quote! { union Raw { a: u32, b: f32 } };
        let err = expand_native_handle(input).unwrap_err();
        assert!(err.to_string().contains("only be derived for structs"));
    }

    #[test]
    fn test_expansion_seals_and_encodes() {
        let tokens = expand_native_handle(parse_quote! { struct Ped(i32); })
            .unwrap()
            .to_string();
        assert!(tokens.contains("Sealed for Ped"));
        assert!(tokens.contains("ResultShape :: Handle"));
        assert!(tokens.contains("Argument :: Handle"));
    }
}
