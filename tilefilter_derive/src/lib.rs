//! Procedural macros shared by the tilefilter crates.
//!
//! [`macro@context`] wraps the body of a function returning `anyhow::Result` so that every
//! error leaving the function carries an additional, formatted context line. The parsers
//! and the filter plumbing use it to describe *what* was being read when a failure happens.

mod args;

use crate::args::Args;
use proc_macro::TokenStream;
use proc_macro2::{Ident, Span};
use quote::{ToTokens, quote};
use syn::parse_macro_input;

/// Attach a context message to every error returned by the annotated function.
///
/// The arguments follow `format!` syntax and may reference the function parameters:
///
/// ```ignore
/// #[context("while reading line {}", line)]
/// fn read_line(line: usize) -> anyhow::Result<String> { ... }
/// ```
///
/// Prefix the arguments with `move,` when the body must take ownership of captured
/// parameters.
#[proc_macro_attribute]
pub fn context(args: TokenStream, input: TokenStream) -> TokenStream {
	let Args(move_token, format_args) = parse_macro_input!(args);
	let mut input = parse_macro_input!(input as syn::ItemFn);

	let body = &input.block;
	let return_type = &input.sig.output;
	let err = Ident::new("err", Span::mixed_site());

	if input.sig.asyncness.is_some() {
		return syn::Error::new_spanned(input.sig.fn_token, "#[context] is only supported on synchronous functions")
			.to_compile_error()
			.into();
	}

	if matches!(return_type, syn::ReturnType::Default) {
		return syn::Error::new_spanned(input.sig.ident, "#[context] requires a function returning Result")
			.to_compile_error()
			.into();
	}

	let once = Ident::new("once", Span::mixed_site());
	let new_body = quote! {
		// Moving a non-`Copy` value into the closure makes it `FnOnce`,
		// so the body may move out of captured parameters.
		let #once = ::core::iter::empty::<()>();
		(#move_token || #return_type {
			::core::mem::drop(#once);
			#body
		})().map_err(|#err| #err.context(format!(#format_args)).into())
	};
	input.block.stmts = vec![syn::Stmt::Expr(syn::Expr::Verbatim(new_body), None)];

	input.into_token_stream().into()
}
