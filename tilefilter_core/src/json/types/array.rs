use super::JsonValue;

/// A JSON array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JsonArray(pub Vec<JsonValue>);

impl JsonArray {
	#[must_use]
	pub fn new() -> Self {
		Self(Vec::new())
	}

	pub fn push<T>(&mut self, value: T)
	where
		JsonValue: From<T>,
	{
		self.0.push(JsonValue::from(value));
	}

	#[must_use]
	pub fn get(&self, index: usize) -> Option<&JsonValue> {
		self.0.get(index)
	}

	pub fn iter(&self) -> std::slice::Iter<'_, JsonValue> {
		self.0.iter()
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

impl<'a> IntoIterator for &'a JsonArray {
	type Item = &'a JsonValue;
	type IntoIter = std::slice::Iter<'a, JsonValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl FromIterator<JsonValue> for JsonArray {
	fn from_iter<I: IntoIterator<Item = JsonValue>>(iter: I) -> Self {
		Self(iter.into_iter().collect())
	}
}
