use proc_macro2::TokenStream as TokenStream2;
use syn::Token;
use syn::parse::{self, Parse, ParseStream};

/// Arguments of `#[context(...)]`: an optional leading `move,` followed by `format!` arguments.
#[derive(Debug)]
pub struct Args(pub Option<Token![move]>, pub TokenStream2);

impl Parse for Args {
	fn parse(input: ParseStream<'_>) -> parse::Result<Self> {
		let move_token = if input.peek(Token![move]) {
			let token = input.parse()?;
			input.parse::<Token![,]>()?;
			Some(token)
		} else {
			None
		};
		Ok(Self(move_token, input.parse()?))
	}
}

#[cfg(test)]
mod tests {
	use super::Args;
	use syn::parse_str;

	#[test]
	fn plain_format_string() {
		let args: Args = parse_str("\"while parsing {}\", name").unwrap();
		assert!(args.0.is_none());
		let tokens = args.1.to_string();
		assert!(tokens.starts_with("\"while parsing {}\""));
		assert!(tokens.ends_with("name"));
	}

	#[test]
	fn leading_move() {
		let args: Args = parse_str("move, \"reading\"").unwrap();
		assert!(args.0.is_some());
		assert_eq!(args.1.to_string(), "\"reading\"");
	}

	#[test]
	fn move_requires_comma() {
		assert!(parse_str::<Args>("move \"reading\"").is_err());
	}
}
