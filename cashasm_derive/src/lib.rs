//! Derive macros for the cashasm crate.
//!
//! Provides:
//! - `#[derive(Error)]` - `Display` and `std::error::Error` for diagnostic enums

mod error;

use proc_macro::TokenStream;

/// Automatically implements `Display` and `Error` traits for error types.
#[proc_macro_derive(Error, attributes(error))]
pub fn derive_error(input: TokenStream) -> TokenStream {
    error::derive_error(input)
}
