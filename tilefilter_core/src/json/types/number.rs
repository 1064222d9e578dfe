//! JSON numbers that remember whether they were written as unsigned, signed or fractional.

use super::JsonValue;
use anyhow::{Context, Result};
use std::fmt::{self, Display};

/// A JSON number.
///
/// Literals containing `.`, `e` or `E` become [`JsonNumber::Float`]. Other literals become
/// [`JsonNumber::Int`] when negative and [`JsonNumber::UInt`] otherwise; integers outside the
/// 64-bit ranges fall back to `Float`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum JsonNumber {
	UInt(u64),
	Int(i64),
	Float(f64),
}

impl JsonNumber {
	/// Classify and convert a validated number literal.
	pub fn parse_literal(text: &str) -> Result<Self> {
		if !text.contains(['.', 'e', 'E']) {
			if text.starts_with('-') {
				if let Ok(v) = text.parse::<i64>() {
					return Ok(JsonNumber::Int(v));
				}
			} else if let Ok(v) = text.parse::<u64>() {
				return Ok(JsonNumber::UInt(v));
			}
		}
		let v = text
			.parse::<f64>()
			.with_context(|| format!("invalid number literal '{text}'"))?;
		Ok(JsonNumber::Float(v))
	}

	#[must_use]
	#[allow(clippy::cast_precision_loss)]
	pub fn as_f64(self) -> f64 {
		match self {
			JsonNumber::UInt(v) => v as f64,
			JsonNumber::Int(v) => v as f64,
			JsonNumber::Float(v) => v,
		}
	}

	#[must_use]
	pub fn is_float(self) -> bool {
		matches!(self, JsonNumber::Float(_))
	}

	/// The value as an unsigned integer, if it is one exactly.
	#[must_use]
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::float_cmp)]
	pub fn as_u64(self) -> Option<u64> {
		match self {
			JsonNumber::UInt(v) => Some(v),
			JsonNumber::Int(v) => u64::try_from(v).ok(),
			JsonNumber::Float(v) => {
				if v.is_finite() && v >= 0.0 && v < 18_446_744_073_709_551_616.0 && v.trunc() == v {
					Some(v as u64)
				} else {
					None
				}
			}
		}
	}
}

impl Display for JsonNumber {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			JsonNumber::UInt(v) => write!(f, "{v}"),
			JsonNumber::Int(v) => write!(f, "{v}"),
			JsonNumber::Float(v) if v.is_finite() => write!(f, "{v:?}"),
			JsonNumber::Float(_) => f.write_str("null"),
		}
	}
}

impl From<JsonNumber> for JsonValue {
	fn from(input: JsonNumber) -> Self {
		JsonValue::Number(input)
	}
}

impl From<f64> for JsonValue {
	fn from(input: f64) -> Self {
		JsonValue::Number(JsonNumber::Float(input))
	}
}

impl From<f32> for JsonValue {
	fn from(input: f32) -> Self {
		JsonValue::Number(JsonNumber::Float(f64::from(input)))
	}
}

macro_rules! impl_from_unsigned {
	($($t:ty),+ $(,)?) => {
		$(
			impl From<$t> for JsonValue {
				fn from(input: $t) -> Self {
					JsonValue::Number(JsonNumber::UInt(input as u64))
				}
			}
		)+
	};
}

macro_rules! impl_from_signed {
	($($t:ty),+ $(,)?) => {
		$(
			impl From<$t> for JsonValue {
				fn from(input: $t) -> Self {
					let v = input as i64;
					if v < 0 {
						JsonValue::Number(JsonNumber::Int(v))
					} else {
						JsonValue::Number(JsonNumber::UInt(v.unsigned_abs()))
					}
				}
			}
		)+
	};
}

impl_from_unsigned!(u8, u16, u32, u64, usize);
impl_from_signed!(i8, i16, i32, i64);
