//! Small parsing helpers built on top of [`ByteIterator`](super::iterator::ByteIterator).
//!
//! - `parse_tag` matches fixed ASCII tags such as `true` or `null`
//! - `parse_quoted_json_string` reads JSON string literals including `\uXXXX` surrogate pairs
//! - `parse_number_as_string` validates JSON number syntax and returns the literal text
//! - `parse_object_entries` and `parse_array_entries` walk the contents of objects and arrays
//!
//! Every function leaves the iterator at the next unread token, e.g. just after a closing `}`.

use super::iterator::ByteIterator;
use anyhow::{Result, bail};
use tilefilter_derive::context;

/// Match a fixed ASCII tag at the current iterator position.
///
/// # Errors
/// Returns an error if the upcoming bytes do not exactly match `tag`.
#[context("while parsing tag '{}'", tag)]
pub fn parse_tag(iter: &mut ByteIterator, tag: &str) -> Result<()> {
	for c in tag.bytes() {
		match iter.expect_next_byte()? {
			b if b == c => {}
			_ => return Err(iter.format_error(&format!("unexpected character while parsing tag '{tag}'"))),
		}
	}
	Ok(())
}

fn parse_hex4(iter: &mut ByteIterator) -> Result<u16> {
	let mut value: u16 = 0;
	for _ in 0..4 {
		let byte = iter.expect_next_byte()?;
		let digit = char::from(byte)
			.to_digit(16)
			.ok_or_else(|| iter.format_error("invalid hex digit in unicode escape"))?;
		value = (value << 4) | u16::try_from(digit)?;
	}
	Ok(value)
}

/// Parse a JSON quoted string literal and return it as `String`.
///
/// Supports the standard escapes and `\uXXXX`, combining UTF-16 surrogate pairs. An unpaired
/// surrogate becomes U+FFFD. Leaves the iterator positioned after the closing quote.
///
/// # Errors
/// Returns an error for a missing opening quote, an unterminated literal, a bad escape or
/// bytes that are not valid UTF-8.
#[context("while parsing a quoted JSON string")]
pub fn parse_quoted_json_string(iter: &mut ByteIterator) -> Result<String> {
	iter.skip_whitespace();
	if iter.expect_next_byte()? != b'"' {
		bail!(iter.format_error("expected '\"' while parsing a string"));
	}

	let mut bytes = Vec::with_capacity(32);

	loop {
		match iter.expect_next_byte()? {
			b'"' => break,
			b'\\' => match iter.expect_next_byte()? {
				b'"' => bytes.push(b'"'),
				b'\\' => bytes.push(b'\\'),
				b'/' => bytes.push(b'/'),
				b'b' => bytes.push(b'\x08'),
				b'f' => bytes.push(b'\x0C'),
				b'n' => bytes.push(b'\n'),
				b'r' => bytes.push(b'\r'),
				b't' => bytes.push(b'\t'),
				b'u' => {
					let mut units = vec![parse_hex4(iter)?];
					if (0xD800..0xDC00).contains(&units[0]) && iter.peek() == Some(b'\\') {
						iter.advance();
						if iter.expect_next_byte()? != b'u' {
							return Err(iter.format_error("expected low surrogate escape"));
						}
						units.push(parse_hex4(iter)?);
					}
					let mut buf = [0u8; 4];
					for c in char::decode_utf16(units) {
						let c = c.unwrap_or(char::REPLACEMENT_CHARACTER);
						bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
					}
				}
				c => return Err(iter.format_error(&format!("invalid escape '\\{}'", char::from(c)))),
			},
			c => bytes.push(c),
		}
	}
	String::from_utf8(bytes).map_err(|_| iter.format_error("invalid UTF-8 in string"))
}

/// Parse a JSON number and return its textual representation.
///
/// Accepts an optional minus sign, integer digits, an optional fraction and an optional
/// exponent. Leaves the iterator at the first byte after the number.
///
/// # Errors
/// Returns an error if required digits are missing.
#[context("while parsing a number")]
pub fn parse_number_as_string(iter: &mut ByteIterator) -> Result<String> {
	let mut number = String::with_capacity(16);

	if let Some(b'-') = iter.peek() {
		number.push(char::from(iter.expect_next_byte()?));
	}

	let mut has_digits = false;
	while let Some(b'0'..=b'9') = iter.peek() {
		has_digits = true;
		number.push(char::from(iter.expect_next_byte()?));
	}
	if !has_digits {
		return Err(iter.format_error("expected digits in number"));
	}

	if let Some(b'.') = iter.peek() {
		number.push(char::from(iter.expect_next_byte()?));
		let mut fractional_digits = false;
		while let Some(b'0'..=b'9') = iter.peek() {
			fractional_digits = true;
			number.push(char::from(iter.expect_next_byte()?));
		}
		if !fractional_digits {
			return Err(iter.format_error("expected digits after decimal point"));
		}
	}

	if let Some(b'e' | b'E') = iter.peek() {
		number.push(char::from(iter.expect_next_byte()?));
		if let Some(b'+' | b'-') = iter.peek() {
			number.push(char::from(iter.expect_next_byte()?));
		}
		let mut exponent_digits = false;
		while let Some(b'0'..=b'9') = iter.peek() {
			exponent_digits = true;
			number.push(char::from(iter.expect_next_byte()?));
		}
		if !exponent_digits {
			return Err(iter.format_error("expected digits after exponent"));
		}
	}

	Ok(number)
}

/// Iterate over JSON object entries, invoking `parse_value` for each key.
///
/// The closure receives the key and the iterator positioned at the start of the value, and must
/// parse the value itself.
///
/// # Errors
/// Returns an error on malformed objects or if `parse_value` fails.
#[context("while parsing object entries")]
pub fn parse_object_entries<R>(
	iter: &mut ByteIterator,
	mut parse_value: impl FnMut(String, &mut ByteIterator) -> Result<R>,
) -> Result<()> {
	iter.skip_whitespace();
	if iter.expect_next_byte()? != b'{' {
		bail!(iter.format_error("expected '{' while parsing an object"));
	}

	iter.skip_whitespace();
	if let Some(b'}') = iter.peek() {
		iter.advance();
		return Ok(());
	}

	loop {
		iter.skip_whitespace();
		if iter.expect_peeked_byte()? != b'"' {
			return Err(iter.format_error("parsing object, expected '\"'"));
		}
		let key = parse_quoted_json_string(iter)?;

		iter.skip_whitespace();
		if iter.expect_next_byte()? != b':' {
			return Err(iter.format_error("expected ':'"));
		}

		iter.skip_whitespace();
		parse_value(key, iter)?;

		iter.skip_whitespace();
		match iter.expect_next_byte()? {
			b',' => {}
			b'}' => break,
			_ => return Err(iter.format_error("expected ',' or '}'")),
		}
	}
	Ok(())
}

/// Iterate over JSON array entries, collecting the results from `parse_value`.
///
/// # Errors
/// Returns an error on malformed arrays or if `parse_value` fails.
#[context("while parsing array entries")]
pub fn parse_array_entries<R>(
	iter: &mut ByteIterator,
	mut parse_value: impl FnMut(&mut ByteIterator) -> Result<R>,
) -> Result<Vec<R>> {
	iter.skip_whitespace();
	if iter.expect_next_byte()? != b'[' {
		bail!(iter.format_error("expected '[' while parsing an array"));
	}

	let mut result = Vec::new();

	iter.skip_whitespace();
	if let Some(b']') = iter.peek() {
		iter.advance();
		return Ok(result);
	}

	result.push(parse_value(iter)?);

	loop {
		iter.skip_whitespace();
		match iter.expect_next_byte()? {
			b']' => break,
			b',' => {
				iter.skip_whitespace();
				result.push(parse_value(iter)?);
			}
			_ => return Err(iter.format_error("parsing array, expected ',' or ']'")),
		}
	}

	Ok(result)
}
