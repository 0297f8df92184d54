//! `#[derive(Error)]` for error enums.
//!
//! Every variant carries an `#[error("...")]` message. Tuple fields are
//! referenced positionally (`{0}`), struct fields by name (`{index}`), and
//! all format specs are passed through to `write!`. Each field must appear in
//! the message, since fields are forwarded as named arguments.
//!
//! ```ignore
//! #[derive(Debug, Error)]
//! pub enum MerkleError {
//!     #[error("leaf index {index} out of range for {leaves} leaves")]
//!     IndexOutOfRange { index: usize, leaves: usize },
//! }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, LitStr, Variant, parse_macro_input};

pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "Error can only be derived for enums",
        ));
    };

    let arms = data
        .variants
        .iter()
        .map(display_arm)
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    #(#arms)*
                }
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    })
}

fn display_arm(variant: &Variant) -> syn::Result<TokenStream2> {
    let ident = &variant.ident;
    let message = message(variant)?;

    Ok(match &variant.fields {
        Fields::Unit => quote! {
            Self::#ident => f.write_str(#message),
        },
        Fields::Unnamed(fields) => {
            let bindings: Vec<_> = (0..fields.unnamed.len())
                .map(|i| format_ident!("_{}", i))
                .collect();
            let format = positional_to_named(&message, bindings.len());
            quote! {
                Self::#ident(#(#bindings),*) => write!(f, #format, #(#bindings = #bindings),*),
            }
        }
        Fields::Named(fields) => {
            let names: Vec<_> = fields.named.iter().map(|f| &f.ident).collect();
            quote! {
                Self::#ident { #(#names),* } => write!(f, #message, #(#names = #names),*),
            }
        }
    })
}

fn message(variant: &Variant) -> syn::Result<String> {
    let attr = variant
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("error"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                variant,
                format!("variant `{}` is missing #[error(\"...\")]", variant.ident),
            )
        })?;

    Ok(attr.parse_args::<LitStr>()?.value())
}

/// Rewrites `{0}`, `{1:x}` into `{_0}`, `{_1:x}` so tuple bindings can be
/// passed as named arguments.
fn positional_to_named(format: &str, count: usize) -> String {
    let mut out = format.to_string();
    for i in (0..count).rev() {
        out = out
            .replace(&format!("{{{i}}}"), &format!("{{_{i}}}"))
            .replace(&format!("{{{i}:"), &format!("{{_{i}:"));
    }
    out
}
