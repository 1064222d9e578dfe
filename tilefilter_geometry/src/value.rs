//! Attribute values of tile features.

use std::{
	cmp::Ordering,
	fmt::{self, Display},
	hash::Hash,
};
use tilefilter_core::json::{JsonNumber, JsonValue};

/// A feature attribute value with the variants a vector tile can store.
///
/// Floats compare and hash by bit pattern, which makes the type usable as a key of the
/// per-layer value tables.
#[derive(Clone, Debug)]
pub enum TileValue {
	String(String),
	Float(f32),
	Double(f64),
	Int(i64),
	UInt(u64),
	SInt(i64),
	Bool(bool),
	Null,
}

impl TileValue {
	fn variant_order(&self) -> u8 {
		match self {
			TileValue::String(_) => 0,
			TileValue::Float(_) => 1,
			TileValue::Double(_) => 2,
			TileValue::Int(_) => 3,
			TileValue::UInt(_) => 4,
			TileValue::SInt(_) => 5,
			TileValue::Bool(_) => 6,
			TileValue::Null => 7,
		}
	}

	#[must_use]
	pub fn is_null(&self) -> bool {
		matches!(self, TileValue::Null)
	}

	/// Numeric value, for the numeric variants.
	#[must_use]
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			TileValue::Float(v) => Some(f64::from(*v)),
			TileValue::Double(v) => Some(*v),
			TileValue::Int(v) | TileValue::SInt(v) => Some(*v as f64),
			TileValue::UInt(v) => Some(*v as f64),
			_ => None,
		}
	}

	/// Convert a decoded JSON value.
	///
	/// Numbers written with a fraction or exponent become `Double`, negative integers `Int`,
	/// other integers `UInt`. Arrays and objects are kept as their compact JSON text.
	#[must_use]
	pub fn from_json(value: &JsonValue) -> TileValue {
		match value {
			JsonValue::String(s) => TileValue::String(s.clone()),
			JsonValue::Number(JsonNumber::UInt(v)) => TileValue::UInt(*v),
			JsonValue::Number(JsonNumber::Int(v)) => TileValue::Int(*v),
			JsonValue::Number(JsonNumber::Float(v)) => TileValue::Double(*v),
			JsonValue::Boolean(b) => TileValue::Bool(*b),
			JsonValue::Null => TileValue::Null,
			JsonValue::Array(_) | JsonValue::Object(_) => TileValue::String(value.stringify()),
		}
	}

	/// Convert into a JSON value. Floats always keep a fraction or exponent; non-finite floats
	/// become `null`.
	///
	/// JSON does not keep the variant: decoded again with [`TileValue::from_json`], `Float` comes
	/// back as `Double`, `Int` and `SInt` as `UInt` when non-negative and as `Int` otherwise. The
	/// value itself is preserved.
	#[must_use]
	pub fn to_json(&self) -> JsonValue {
		match self {
			TileValue::String(s) => JsonValue::String(s.clone()),
			TileValue::Float(v) => {
				// the shortest f32 text widened to f64, so 0.1f32 is written as 0.1
				let widened = v.to_string().parse::<f64>().unwrap_or(f64::from(*v));
				JsonValue::Number(JsonNumber::Float(widened))
			}
			TileValue::Double(v) => JsonValue::Number(JsonNumber::Float(*v)),
			TileValue::Int(v) | TileValue::SInt(v) => JsonValue::from(*v),
			TileValue::UInt(v) => JsonValue::Number(JsonNumber::UInt(*v)),
			TileValue::Bool(b) => JsonValue::Boolean(*b),
			TileValue::Null => JsonValue::Null,
		}
	}
}

impl PartialEq for TileValue {
	fn eq(&self, other: &Self) -> bool {
		self.cmp(other) == Ordering::Equal
	}
}

impl Eq for TileValue {}

impl Hash for TileValue {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		core::mem::discriminant(self).hash(state);
		match self {
			TileValue::String(v) => v.hash(state),
			TileValue::Float(v) => v.to_bits().hash(state),
			TileValue::Double(v) => v.to_bits().hash(state),
			TileValue::Int(v) | TileValue::SInt(v) => v.hash(state),
			TileValue::UInt(v) => v.hash(state),
			TileValue::Bool(v) => v.hash(state),
			TileValue::Null => (),
		}
	}
}

impl PartialOrd for TileValue {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for TileValue {
	fn cmp(&self, other: &Self) -> Ordering {
		use TileValue::*;
		match (self, other) {
			(String(a), String(b)) => a.cmp(b),
			(Float(a), Float(b)) => a.total_cmp(b),
			(Double(a), Double(b)) => a.total_cmp(b),
			(Int(a), Int(b)) | (SInt(a), SInt(b)) => a.cmp(b),
			(UInt(a), UInt(b)) => a.cmp(b),
			(Bool(a), Bool(b)) => a.cmp(b),
			_ => self.variant_order().cmp(&other.variant_order()),
		}
	}
}

impl Display for TileValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TileValue::String(v) => f.write_str(v),
			TileValue::Float(v) => write!(f, "{v}"),
			TileValue::Double(v) => write!(f, "{v}"),
			TileValue::Int(v) | TileValue::SInt(v) => write!(f, "{v}"),
			TileValue::UInt(v) => write!(f, "{v}"),
			TileValue::Bool(v) => write!(f, "{v}"),
			TileValue::Null => f.write_str("null"),
		}
	}
}

impl From<&str> for TileValue {
	fn from(value: &str) -> Self {
		TileValue::String(value.to_string())
	}
}

impl From<String> for TileValue {
	fn from(value: String) -> Self {
		TileValue::String(value)
	}
}

impl From<i64> for TileValue {
	fn from(value: i64) -> Self {
		TileValue::Int(value)
	}
}

impl From<u64> for TileValue {
	fn from(value: u64) -> Self {
		TileValue::UInt(value)
	}
}

impl From<f64> for TileValue {
	fn from(value: f64) -> Self {
		TileValue::Double(value)
	}
}

impl From<bool> for TileValue {
	fn from(value: bool) -> Self {
		TileValue::Bool(value)
	}
}
