//! `#[derive(BinaryCodec)]` for structs.
//!
//! The wire layout of a derived type is the concatenation of its fields'
//! encodings in declaration order, with no framing of its own. Header layouts
//! are part of the consensus surface, so reordering fields of a derived type
//! changes every hash computed over it.
//!
//! ```ignore
//! #[derive(BinaryCodec)]
//! pub struct LegacyFields {
//!     pub header_hash: Hash,
//! }
//!
//! // expands to
//! impl Encode for LegacyFields {
//!     fn encode<S: EncodeSink>(&self, out: &mut S) {
//!         Encode::encode(&self.header_hash, out);
//!     }
//! }
//!
//! impl Decode for LegacyFields {
//!     fn decode(input: &mut &[u8]) -> Result<Self, DecodeError> {
//!         Ok(Self { header_hash: Decode::decode(input)? })
//!     }
//! }
//! ```
//!
//! Enums and unions are rejected: nothing in the header model needs a tagged
//! encoding, and a silent discriminant scheme would leak into the wire format.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

pub fn derive_binary_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let data = match &input.data {
        Data::Struct(data) => data,
        Data::Enum(_) | Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "BinaryCodec can only be derived for structs",
            ));
        }
    };

    let (encode_body, decode_body) = match &data.fields {
        Fields::Named(fields) => {
            let idents: Vec<_> = fields.named.iter().map(|f| &f.ident).collect();
            let encode = quote! {
                #( crate::types::encoding::Encode::encode(&self.#idents, out); )*
            };
            let decode = quote! {
                Self { #( #idents: crate::types::encoding::Decode::decode(input)?, )* }
            };
            (encode, decode)
        }
        Fields::Unnamed(fields) => {
            let indices: Vec<_> = (0..fields.unnamed.len()).map(syn::Index::from).collect();
            let decoders = indices
                .iter()
                .map(|_| quote! { crate::types::encoding::Decode::decode(input)?, });
            let encode = quote! {
                #( crate::types::encoding::Encode::encode(&self.#indices, out); )*
            };
            let decode = quote! { Self( #(#decoders)* ) };
            (encode, decode)
        }
        Fields::Unit => {
            return Err(syn::Error::new_spanned(
                input,
                "BinaryCodec requires at least one field",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics crate::types::encoding::Encode for #name #ty_generics #where_clause {
            fn encode<S: crate::types::encoding::EncodeSink>(&self, out: &mut S) {
                #encode_body
            }
        }

        impl #impl_generics crate::types::encoding::Decode for #name #ty_generics #where_clause {
            fn decode(
                input: &mut &[u8],
            ) -> ::std::result::Result<Self, crate::types::encoding::DecodeError> {
                Ok(#decode_body)
            }
        }
    })
}
