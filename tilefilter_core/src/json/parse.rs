//! Recursive-descent JSON parser on top of [`ByteIterator`].

use super::types::{JsonArray, JsonNumber, JsonObject, JsonValue};
use crate::byte_iterator::{
	ByteIterator, parse_array_entries, parse_number_as_string, parse_object_entries, parse_quoted_json_string,
	parse_tag,
};
use anyhow::{Result, bail};
use std::io::Cursor;
use tilefilter_derive::context;

const MAX_DEPTH: usize = 256;

/// Parse a complete JSON document from a string.
///
/// # Errors
/// Returns an error on malformed JSON or trailing non-whitespace content.
#[context("while parsing JSON '{}'", json)]
pub fn parse_json_str(json: &str) -> Result<JsonValue> {
	let mut iter = ByteIterator::from_reader(Cursor::new(json), true);
	let value = parse_json_iter(&mut iter)?;
	iter.skip_whitespace();
	if iter.peek().is_some() {
		bail!(iter.format_error("unexpected content after JSON value"));
	}
	Ok(value)
}

/// Parse the next JSON value from the iterator, leaving it just after the value.
///
/// # Errors
/// Returns an error on malformed JSON or when nesting exceeds a fixed depth.
pub fn parse_json_iter(iter: &mut ByteIterator) -> Result<JsonValue> {
	parse_value(iter, 0)
}

fn parse_value(iter: &mut ByteIterator, depth: usize) -> Result<JsonValue> {
	if depth > MAX_DEPTH {
		bail!(iter.format_error("JSON nested too deeply"));
	}
	iter.skip_whitespace();
	match iter.expect_peeked_byte()? {
		b'[' => parse_array(iter, depth),
		b'{' => parse_object(iter, depth),
		b'"' => parse_quoted_json_string(iter).map(JsonValue::String),
		b'0'..=b'9' | b'-' => {
			let literal = parse_number_as_string(iter)?;
			Ok(JsonValue::Number(JsonNumber::parse_literal(&literal)?))
		}
		b't' => parse_tag(iter, "true").map(|()| JsonValue::Boolean(true)),
		b'f' => parse_tag(iter, "false").map(|()| JsonValue::Boolean(false)),
		b'n' => parse_tag(iter, "null").map(|()| JsonValue::Null),
		c => Err(iter.format_error(&format!("unexpected character '{}'", char::from(c)))),
	}
}

fn parse_array(iter: &mut ByteIterator, depth: usize) -> Result<JsonValue> {
	let items = parse_array_entries(iter, |iter| parse_value(iter, depth + 1))?;
	Ok(JsonValue::Array(JsonArray(items)))
}

fn parse_object(iter: &mut ByteIterator, depth: usize) -> Result<JsonValue> {
	let mut members = Vec::new();
	parse_object_entries(iter, |key, iter| {
		members.push((key, parse_value(iter, depth + 1)?));
		Ok(())
	})?;
	Ok(JsonValue::Object(JsonObject(members)))
}
