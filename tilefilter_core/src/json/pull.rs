//! Incremental reading of a stream of concatenated JSON values.

use super::{parse_json_iter, types::JsonValue};
use crate::{byte_iterator::ByteIterator, fatal::FatalKind};
use anyhow::{Context, Error, Result};
use std::io::Read;

/// Reads one top-level JSON value at a time from a byte stream.
///
/// Values may be separated by any whitespace, including none. Errors name the stream's origin
/// and the line on which parsing stopped, and carry a [`FatalKind`].
pub struct JsonPull<'a> {
	iter: ByteIterator<'a>,
	origin: String,
}

impl<'a> JsonPull<'a> {
	/// `origin` prefixes error messages, e.g. `Filter output`.
	pub fn from_reader(reader: impl Read + 'a, origin: &str) -> Self {
		Self {
			iter: ByteIterator::from_reader(reader, true),
			origin: origin.to_string(),
		}
	}

	/// Line of the byte following the last value read.
	#[must_use]
	pub fn line(&self) -> usize {
		self.iter.line()
	}

	#[must_use]
	pub fn origin(&self) -> &str {
		&self.origin
	}

	/// Read the next top-level value, or `None` at the end of the stream.
	///
	/// # Errors
	/// Fails with [`FatalKind::Read`] when the underlying reader fails, and with
	/// [`FatalKind::Json`] on a syntax error or a truncated value.
	pub fn next_value(&mut self) -> Result<Option<JsonValue>> {
		self.iter.skip_whitespace();
		if self.iter.peek().is_none() {
			return match self.iter.take_read_error() {
				Some(err) => Err(self.read_failed(err)),
				None => Ok(None),
			};
		}

		match parse_json_iter(&mut self.iter) {
			Ok(value) => Ok(Some(value)),
			Err(err) => {
				if let Some(io) = self.iter.take_read_error() {
					return Err(self.read_failed(io));
				}
				Err(err)
					.with_context(|| format!("{}:{}: malformed JSON", self.origin, self.iter.line()))
					.context(FatalKind::Json)
			}
		}
	}

	fn read_failed(&self, err: std::io::Error) -> Error {
		Error::from(err)
			.context(format!("{}:{}: read failed", self.origin, self.iter.line()))
			.context(FatalKind::Read)
	}
}

impl Iterator for JsonPull<'_> {
	type Item = Result<JsonValue>;

	fn next(&mut self) -> Option<Self::Item> {
		self.next_value().transpose()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::json::JsonNumber;
	use std::io::{self, Cursor};

	fn pull(text: &str) -> JsonPull<'_> {
		JsonPull::from_reader(Cursor::new(text), "Filter output")
	}

	#[test]
	fn reads_concatenated_values() {
		let mut reader = pull("{\"a\":1}\n{\"a\":2}{\"a\":3}  \n[4] \"five\"\n");
		let mut values = Vec::new();
		while let Some(value) = reader.next_value().unwrap() {
			values.push(value.stringify());
		}
		assert_eq!(values, vec!["{\"a\":1}", "{\"a\":2}", "{\"a\":3}", "[4]", "\"five\""]);
		assert!(reader.next_value().unwrap().is_none());
	}

	#[test]
	fn reports_line_of_value() {
		let mut reader = pull("1\n2\n\n3");
		assert_eq!(reader.next_value().unwrap().unwrap(), JsonValue::Number(JsonNumber::UInt(1)));
		assert_eq!(reader.line(), 1);
		reader.next_value().unwrap();
		assert_eq!(reader.line(), 2);
		reader.next_value().unwrap();
		assert_eq!(reader.line(), 4);
	}

	#[test]
	fn empty_stream() {
		assert!(pull("").next_value().unwrap().is_none());
		assert!(pull(" \n\t\n").next_value().unwrap().is_none());
	}

	#[test]
	fn syntax_error_is_json_kind() {
		let mut reader = pull("{\"a\":1}\n{\"a\":}\n");
		reader.next_value().unwrap();
		let err = reader.next_value().unwrap_err();
		assert_eq!(FatalKind::of(&err), Some(FatalKind::Json));
		let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
		assert_eq!(chain[1], "Filter output:2: malformed JSON");
	}

	#[test]
	fn truncated_value_is_json_kind() {
		let err = pull("{\"a\":[1,2").next_value().unwrap_err();
		assert_eq!(FatalKind::of(&err), Some(FatalKind::Json));
	}

	struct BrokenReader;

	impl Read for BrokenReader {
		fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
			Err(io::Error::other("pipe failure"))
		}
	}

	#[test]
	fn read_error_is_read_kind() {
		let err = JsonPull::from_reader(BrokenReader, "Filter output").next_value().unwrap_err();
		assert_eq!(FatalKind::of(&err), Some(FatalKind::Read));
		assert_eq!(err.root_cause().to_string(), "pipe failure");
	}

	#[test]
	fn iterates() {
		let values: Vec<JsonValue> = pull("true false").collect::<Result<_>>().unwrap();
		assert_eq!(values, vec![JsonValue::Boolean(true), JsonValue::Boolean(false)]);
	}
}
