//! Derive macros for the `equiblock` crate.
//!
//! - `#[derive(BinaryCodec)]` emits `Encode` and `Decode` for structs whose
//!   fields are encoded back to back in declaration order.
//! - `#[derive(Error)]` emits `Display` and `std::error::Error` from
//!   `#[error("...")]` messages.

mod binary_codec;
mod error;

use proc_macro::TokenStream;

/// Implements `Encode` and `Decode` field by field.
#[proc_macro_derive(BinaryCodec)]
pub fn derive_binary_codec(input: TokenStream) -> TokenStream {
    binary_codec::derive_binary_codec(input)
}

/// Implements `Display` and `Error` for error enums.
#[proc_macro_derive(Error, attributes(error))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    error::derive_error(input)
}
