//! Derive macro for error types.
//!
//! Generates `std::fmt::Display` and `std::error::Error` implementations.
//! Replacement for the `thiserror` crate, restricted to enums.
//!
//! # Usage
//!
//! ```ignore
//! use um32_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum MachineError {
//!     #[error("unknown mnemonic: {0}")]
//!     UnknownMnemonic(String),
//!
//!     #[error("index {index} out of bounds for length {len}")]
//!     OutOfBounds { index: u32, len: u32 },
//!
//!     #[error("division by zero")]
//!     DivisionByZero,
//! }
//! ```
//!
//! Named fields are interpolated through the format string's own capture
//! syntax (`{index}` above binds the destructured field directly); tuple
//! fields are handed to `write!` positionally, so `{0}`, `{1}` address them
//! without renaming.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derives `Display` and `Error` for an enum.
///
/// Every variant must carry an `#[error("...")]` attribute with its display
/// message.
pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "Error derive supports only enums",
        ));
    };

    let arms = data
        .variants
        .iter()
        .map(display_arm)
        .collect::<syn::Result<Vec<_>>>()?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

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

/// Builds the `match` arm that renders one variant.
fn display_arm(variant: &syn::Variant) -> syn::Result<proc_macro2::TokenStream> {
    let ident = &variant.ident;
    let message = error_message(variant)?;

    let arm = match &variant.fields {
        Fields::Unit => quote! {
            Self::#ident => write!(f, #message),
        },
        // The destructured bindings are captured by name from inside the
        // format string, so no argument list is needed.
        Fields::Named(fields) => {
            let names: Vec<_> = fields.named.iter().map(|field| &field.ident).collect();
            quote! {
                Self::#ident { #(#names),* } => write!(f, #message),
            }
        }
        Fields::Unnamed(fields) => {
            let bindings: Vec<_> = (0..fields.unnamed.len())
                .map(|position| format_ident!("field{}", position))
                .collect();
            quote! {
                Self::#ident(#(#bindings),*) => write!(f, #message, #(#bindings),*),
            }
        }
    };

    Ok(arm)
}

/// Pulls the message string out of a variant's `#[error("...")]` attribute.
fn error_message(variant: &syn::Variant) -> syn::Result<LitStr> {
    let attr = variant
        .attrs
        .iter()
        .find(|attr| attr.path().is_ident("error"))
        .ok_or_else(|| {
            syn::Error::new_spanned(
                variant,
                format!(
                    "variant `{}` is missing its #[error(\"...\")] message",
                    variant.ident
                ),
            )
        })?;

    attr.meta
        .require_list()
        .and_then(|list| syn::parse2::<LitStr>(list.tokens.clone()))
        .map_err(|_| {
            syn::Error::new_spanned(
                attr,
                "expected a string literal, as in #[error(\"division by zero\")]",
            )
        })
}
