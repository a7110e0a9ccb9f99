//! Derive macro for error types.
//!
//! Generates `std::fmt::Display` and `std::error::Error` implementations.
//!
//! # Usage
//!
//! ```ignore
//! use cashasm_derive::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum AsmError {
//!     #[error("unknown identifier: {0}")]
//!     UnknownIdentifier(String),
//!
//!     #[error("invalid opcode byte 0x{0:02x}")]
//!     InvalidOpcode(u8),
//!
//!     #[error("payload of {size} bytes exceeds {limit}")]
//!     PayloadTooLarge { size: usize, limit: usize },
//!
//!     #[error("unterminated block comment")]
//!     UnterminatedComment,
//! }
//! ```
//!
//! # Supported Features
//!
//! - Unit variants: `#[error("message")]`
//! - Tuple variants with positional args: `#[error("error: {0}")]`, `{0:02x}`
//! - Struct variants with named args: `#[error("expected {expected}")]`
//! - Fields the message does not mention are ignored

use proc_macro::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::{Data, DeriveInput, Fields, Lit, Meta, parse_macro_input};

/// Derives `Display` and `Error` for an enum or struct.
///
/// Each variant must have an `#[error("...")]` attribute specifying
/// the display message.
pub fn derive_error(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_error_derive(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_error_derive(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let display_body = match &input.data {
        Data::Enum(data_enum) => {
            let arms = data_enum
                .variants
                .iter()
                .map(|variant| {
                    let variant_name = &variant.ident;
                    let message = extract_error_message_from_attrs(
                        &variant.attrs,
                        &variant.ident,
                        &format!("variant `{variant_name}`"),
                    )?;
                    Ok(display_arm(quote!(Self::#variant_name), &variant.fields, &message))
                })
                .collect::<syn::Result<Vec<_>>>()?;

            quote! {
                match self {
                    #(#arms)*
                }
            }
        }
        Data::Struct(data_struct) => {
            let message = extract_error_message_from_attrs(
                &input.attrs,
                &input.ident,
                &format!("type `{}`", input.ident),
            )?;
            let arm = display_arm(quote!(Self), &data_struct.fields, &message);
            quote! {
                match self {
                    #arm
                }
            }
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "Error derive does not support unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics ::std::fmt::Display for #name #ty_generics #where_clause {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                #display_body
            }
        }

        impl #impl_generics ::std::error::Error for #name #ty_generics #where_clause {}
    })
}

/// Builds one `match` arm writing `message` for a set of fields.
///
/// Only fields referenced by the message are bound, so messages may omit
/// fields without tripping the `write!` unused-argument check.
fn display_arm(
    path: proc_macro2::TokenStream,
    fields: &Fields,
    message: &str,
) -> proc_macro2::TokenStream {
    match fields {
        Fields::Unit => quote! {
            #path => write!(f, #message),
        },
        Fields::Unnamed(unnamed) => {
            let count = unnamed.unnamed.len();
            let format_str = convert_positional_to_named(message, count);
            let mut patterns = Vec::with_capacity(count);
            let mut used = Vec::new();
            for i in 0..count {
                let ident = format_ident!("f{}", i);
                if references_argument(&format_str, &ident.to_string()) {
                    patterns.push(quote!(#ident));
                    used.push(ident);
                } else {
                    patterns.push(quote!(_));
                }
            }
            quote! {
                #path(#(#patterns),*) => write!(f, #format_str, #(#used = #used),*),
            }
        }
        Fields::Named(named) => {
            let used: Vec<_> = named
                .named
                .iter()
                .filter_map(|field| field.ident.as_ref())
                .filter(|ident| references_argument(message, &ident.to_string()))
                .collect();
            quote! {
                #path { #(#used,)* .. } => write!(f, #message, #(#used = #used),*),
            }
        }
    }
}

/// Returns true if `format_str` contains `{name}` or `{name:...}`.
fn references_argument(format_str: &str, name: &str) -> bool {
    let open = format!("{{{name}");
    format_str
        .match_indices(&open)
        .any(|(idx, _)| matches!(format_str[idx + open.len()..].chars().next(), Some('}' | ':')))
}

/// Extracts the error message from attributes.
fn extract_error_message_from_attrs<T: ToTokens>(
    attrs: &[syn::Attribute],
    target: &T,
    target_desc: &str,
) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("error") {
            if let Meta::List(meta_list) = &attr.meta {
                let tokens = meta_list.tokens.clone();
                let lit = syn::parse2::<Lit>(tokens).map_err(|_| {
                    syn::Error::new_spanned(
                        &attr.meta,
                        "failed to parse #[error] attribute; expected a string literal like #[error(\"unknown identifier: {0}\")]",
                    )
                })?;

                if let Lit::Str(lit_str) = lit {
                    return Ok(lit_str.value());
                }

                return Err(syn::Error::new_spanned(
                    &attr.meta,
                    "invalid #[error] attribute: message must be a string literal",
                ));
            }

            return Err(syn::Error::new_spanned(
                &attr.meta,
                "invalid #[error] attribute; use #[error(\"message\")] to describe the error",
            ));
        }
    }

    Err(syn::Error::new_spanned(
        target,
        format!(
            "missing #[error(\"...\")] attribute on {target_desc}; every error variant must declare a display message"
        ),
    ))
}

/// Converts positional format args `{0}`, `{1:02x}` to named args `{f0}`, `{f1:02x}`.
fn convert_positional_to_named(format_str: &str, field_count: usize) -> String {
    let mut result = format_str.to_string();
    for i in (0..field_count).rev() {
        result = result
            .replace(&format!("{{{i}}}"), &format!("{{f{i}}}"))
            .replace(&format!("{{{i}:"), &format!("{{f{i}:"));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_arguments_keep_format_specs() {
        assert_eq!(
            convert_positional_to_named("byte 0x{0:02x} at {1}", 2),
            "byte 0x{f0:02x} at {f1}"
        );
    }

    #[test]
    fn references_argument_matches_plain_and_formatted() {
        assert!(references_argument("limit {limit}", "limit"));
        assert!(references_argument("0x{f0:02x}", "f0"));
        assert!(!references_argument("{limits}", "limit"));
        assert!(!references_argument("no fields", "size"));
    }
}
