//! JSON objects that keep their members in source order.

use super::{JsonArray, JsonValue};

/// A JSON object stored as an ordered list of members.
///
/// Keys are not deduplicated on parse; lookups return the first member with a matching key,
/// and iteration yields members in the order they were read or inserted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JsonObject(pub Vec<(String, JsonValue)>);

impl JsonObject {
	#[must_use]
	pub fn new() -> Self {
		Self(Vec::new())
	}

	/// Get the value of the first member named `key`.
	#[must_use]
	pub fn get(&self, key: &str) -> Option<&JsonValue> {
		self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	#[must_use]
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.get(key).and_then(JsonValue::as_str)
	}

	#[must_use]
	pub fn get_object(&self, key: &str) -> Option<&JsonObject> {
		self.get(key).and_then(JsonValue::as_object)
	}

	#[must_use]
	pub fn get_array(&self, key: &str) -> Option<&JsonArray> {
		self.get(key).and_then(JsonValue::as_array)
	}

	/// Replace the first member named `key`, or append a new member.
	pub fn set<T>(&mut self, key: &str, value: T)
	where
		JsonValue: From<T>,
	{
		let value = JsonValue::from(value);
		if let Some(entry) = self.0.iter_mut().find(|(k, _)| k == key) {
			entry.1 = value;
		} else {
			self.0.push((key.to_owned(), value));
		}
	}

	/// Set `key` only when `value` is `Some`.
	pub fn set_optional<T>(&mut self, key: &str, value: Option<T>)
	where
		JsonValue: From<T>,
	{
		if let Some(v) = value {
			self.set(key, v);
		}
	}

	/// Append a member without looking for an existing one.
	pub fn push<T>(&mut self, key: &str, value: T)
	where
		JsonValue: From<T>,
	{
		self.0.push((key.to_owned(), JsonValue::from(value)));
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn keeps_member_order() {
		let mut object = JsonObject::new();
		object.set("z", 1);
		object.set("a", "b");
		object.set("m", true);
		let keys: Vec<&str> = object.iter().map(|(k, _)| k).collect();
		assert_eq!(keys, vec!["z", "a", "m"]);
	}

	#[test]
	fn set_replaces_first_match() {
		let mut object = JsonObject::new();
		object.push("k", 1);
		object.push("k", 2);
		object.set("k", 3);
		assert_eq!(object.len(), 2);
		assert_eq!(object.get("k"), Some(&JsonValue::from(3)));
	}

	#[test]
	fn typed_getters() {
		let mut inner = JsonObject::new();
		inner.set("layer", "water");
		let mut object = JsonObject::new();
		object.set("tippecanoe", inner);
		object.set_optional("id", None::<u64>);
		object.set("coordinates", vec![1.0, 2.0]);

		assert_eq!(object.get_object("tippecanoe").and_then(|o| o.get_str("layer")), Some("water"));
		assert_eq!(object.get_array("coordinates").map(JsonArray::len), Some(2));
		assert!(object.get("id").is_none());
		assert!(object.get_str("coordinates").is_none());
	}
}
