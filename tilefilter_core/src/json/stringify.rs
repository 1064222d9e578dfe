use super::JsonValue;
use std::fmt::Write;

/// Serialize a value as compact JSON without whitespace.
#[must_use]
pub fn stringify(json: &JsonValue) -> String {
	let mut out = String::new();
	write_value(&mut out, json);
	out
}

fn write_value(out: &mut String, json: &JsonValue) {
	match json {
		JsonValue::String(s) => write_json_string(out, s),
		JsonValue::Number(n) => {
			let _ = write!(out, "{n}");
		}
		JsonValue::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
		JsonValue::Null => out.push_str("null"),
		JsonValue::Array(arr) => {
			out.push('[');
			for (index, item) in arr.iter().enumerate() {
				if index > 0 {
					out.push(',');
				}
				write_value(out, item);
			}
			out.push(']');
		}
		JsonValue::Object(obj) => {
			out.push('{');
			for (index, (key, value)) in obj.iter().enumerate() {
				if index > 0 {
					out.push(',');
				}
				write_json_string(out, key);
				out.push(':');
				write_value(out, value);
			}
			out.push('}');
		}
	}
}

/// Append `input` as a quoted, escaped JSON string.
pub fn write_json_string(out: &mut String, input: &str) {
	out.push('"');
	out.push_str(&escape_json_string(input));
	out.push('"');
}

#[must_use]
pub fn escape_json_string(input: &str) -> String {
	let mut out = String::with_capacity(input.len());
	for c in input.chars() {
		match c {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\t' => out.push_str("\\t"),
			'\u{08}' => out.push_str("\\b"),
			'\u{0c}' => out.push_str("\\f"),
			c if c.is_control() => {
				let _ = write!(out, "\\u{:04x}", u32::from(c));
			}
			c => out.push(c),
		}
	}
	out
}

#[cfg(test)]
mod tests {
	use super::super::parse::parse_json_str;
	use super::*;
	use anyhow::Result;

	#[test]
	fn primitives() -> Result<()> {
		assert_eq!(stringify(&parse_json_str("\"Hello, World!\"")?), "\"Hello, World!\"");
		assert_eq!(stringify(&parse_json_str("42")?), "42");
		assert_eq!(stringify(&parse_json_str("-4.50")?), "-4.5");
		assert_eq!(stringify(&parse_json_str("true")?), "true");
		assert_eq!(stringify(&parse_json_str("null")?), "null");
		Ok(())
	}

	#[test]
	fn nested_values_are_compact() -> Result<()> {
		let json = parse_json_str(" { \"b\" : [ 1 , 2.0 ] , \"a\" : { } } ")?;
		assert_eq!(stringify(&json), r#"{"b":[1,2.0],"a":{}}"#);
		Ok(())
	}

	#[test]
	fn escapes() {
		assert_eq!(escape_json_string("a\"b\\c\nd\u{1}"), "a\\\"b\\\\c\\nd\\u0001");
		assert_eq!(escape_json_string("grüße"), "grüße");
	}
}
