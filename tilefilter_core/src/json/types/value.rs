use super::{JsonArray, JsonNumber, JsonObject};
use crate::json::stringify;

/// A parsed JSON value.
#[derive(Clone, Debug, PartialEq)]
pub enum JsonValue {
	Array(JsonArray),
	Boolean(bool),
	Null,
	Number(JsonNumber),
	Object(JsonObject),
	String(String),
}

impl JsonValue {
	/// Name of the value's JSON type, for error messages.
	#[must_use]
	pub fn type_as_str(&self) -> &'static str {
		match self {
			JsonValue::Array(_) => "array",
			JsonValue::Boolean(_) => "boolean",
			JsonValue::Null => "null",
			JsonValue::Number(_) => "number",
			JsonValue::Object(_) => "object",
			JsonValue::String(_) => "string",
		}
	}

	#[must_use]
	pub fn is_null(&self) -> bool {
		matches!(self, JsonValue::Null)
	}

	#[must_use]
	pub fn as_object(&self) -> Option<&JsonObject> {
		match self {
			JsonValue::Object(o) => Some(o),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_array(&self) -> Option<&JsonArray> {
		match self {
			JsonValue::Array(a) => Some(a),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_str(&self) -> Option<&str> {
		match self {
			JsonValue::String(s) => Some(s),
			_ => None,
		}
	}

	#[must_use]
	pub fn as_number(&self) -> Option<JsonNumber> {
		match self {
			JsonValue::Number(n) => Some(*n),
			_ => None,
		}
	}

	/// Compact JSON text of this value.
	#[must_use]
	pub fn stringify(&self) -> String {
		stringify(self)
	}
}

impl From<&str> for JsonValue {
	fn from(input: &str) -> Self {
		JsonValue::String(input.to_string())
	}
}

impl From<String> for JsonValue {
	fn from(input: String) -> Self {
		JsonValue::String(input)
	}
}

impl From<bool> for JsonValue {
	fn from(input: bool) -> Self {
		JsonValue::Boolean(input)
	}
}

impl From<JsonObject> for JsonValue {
	fn from(input: JsonObject) -> Self {
		JsonValue::Object(input)
	}
}

impl From<JsonArray> for JsonValue {
	fn from(input: JsonArray) -> Self {
		JsonValue::Array(input)
	}
}

impl<T> From<Vec<T>> for JsonValue
where
	JsonValue: From<T>,
{
	fn from(input: Vec<T>) -> Self {
		JsonValue::Array(JsonArray(input.into_iter().map(JsonValue::from).collect()))
	}
}

impl<T> From<Option<T>> for JsonValue
where
	JsonValue: From<T>,
{
	fn from(input: Option<T>) -> Self {
		input.map_or(JsonValue::Null, JsonValue::from)
	}
}
