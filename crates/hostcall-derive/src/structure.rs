// #[derive(NativeStruct)] implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

/// Expands the NativeStruct derive.
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[derive(NativeStruct)]
/// struct Vector3 { x: f32, y: f32, z: f32 }
///
/// // Output:
/// impl ::hostcall_sdk::FromNative for Vector3 {
///     const SHAPE: ::hostcall_sdk::ResultShape = ::hostcall_sdk::ResultShape::Struct;
///     fn from_native(result: &::hostcall_sdk::ResultHandle<'_>) -> Self {
///         unsafe {
///             Self {
///                 x: <f32 as ::hostcall_sdk::WordSlot>::from_slot(result.word_at(0)),
///                 y: <f32 as ::hostcall_sdk::WordSlot>::from_slot(result.word_at(1)),
///                 z: <f32 as ::hostcall_sdk::WordSlot>::from_slot(result.word_at(2)),
///             }
///         }
///     }
/// }
/// ```
pub fn expand_native_struct(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "NativeStruct can only be derived for structs",
        ));
    };
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "NativeStruct does not support generic structs",
        ));
    }
    if data.fields.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "NativeStruct requires at least one field",
        ));
    }

    let slots = data.fields.iter().enumerate().map(|(index, field)| {
        let ty = &field.ty;
        quote! { <#ty as ::hostcall_sdk::WordSlot>::from_slot(result.word_at(#index)) }
    });

    let construct = match &data.fields {
        Fields::Named(named) => {
            let names = named.named.iter().map(|f| &f.ident);
            quote! { Self { #(#names: #slots),* } }
        }
        Fields::Unnamed(_) => quote! { Self(#(#slots),*) },
        Fields::Unit => unreachable!("unit structs have no fields"),
    };

    Ok(quote! {
        impl ::hostcall_sdk::FromNative for #name {
            const SHAPE: ::hostcall_sdk::ResultShape = ::hostcall_sdk::ResultShape::Struct;

            fn from_native(result: &::hostcall_sdk::ResultHandle<'_>) -> Self {
                // SAFETY: a routine declared to return this type produces
                // one result word per field
                unsafe { #construct }
            }
        }
    })
}
