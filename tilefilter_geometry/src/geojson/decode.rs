//! Decoding of GeoJSON Feature objects written by a filter.
//!
//! Validation happens in a fixed order and every violation is fatal. The error names the
//! stream and line, then the reason and a snippet of the offending value, and carries
//! [`FatalKind::Json`].

use crate::{
	DrawOp, DrawVec, DropState, GeoJsonType, GeomType, RawDraw, TileValue, bbox,
	polygon::{fix_polygon, to_tile_rings},
	projection::lonlat_to_world,
	transform::{world_to_serial, world_to_tile},
};
use anyhow::{Error, Result, anyhow};
use log::{trace, warn};
use std::sync::Once;
use tilefilter_core::{
	FatalKind, TileCoord,
	json::{JsonNumber, JsonObject, JsonValue},
};

/// Name of a filter's output stream in error messages.
pub const FILTER_OUTPUT: &str = "Filter output";

const CONTEXT_LIMIT: usize = 500;

/// Coordinate space that decoded geometry is converted into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometryTarget {
	/// World units relative to the tile origin, quantized to `2^geometry_scale`; rings in serial form.
	Serial { geometry_scale: u8 },
	/// Layer extent units; rings in tile form.
	Tile { extent: u32 },
}

/// A feature decoded from filter output, before any layer is resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedFeature {
	pub geom_type: GeomType,
	pub geometry: DrawVec,
	pub bbox: [i64; 4],
	/// Target layer, `unknown` when the filter did not name one.
	pub layer: String,
	pub id: Option<u64>,
	pub index: u64,
	pub sequence: u64,
	pub extent: Option<i64>,
	pub dropped: DropState,
	/// Attributes in source order, nulls removed.
	pub properties: Vec<(String, TileValue)>,
}

struct Context<'a> {
	origin: &'a str,
	line: usize,
	feature: &'a JsonValue,
}

impl Context<'_> {
	fn fail(&self, reason: &str) -> Error {
		malformed(self.origin, self.line, reason, self.feature)
	}
}

/// Compact JSON text of `value`, cut to a readable length.
#[must_use]
pub fn context_snippet(value: &JsonValue) -> String {
	let text = value.stringify();
	if text.len() <= CONTEXT_LIMIT {
		return text;
	}
	let mut end = CONTEXT_LIMIT;
	while !text.is_char_boundary(end) {
		end -= 1;
	}
	format!("{}...", &text[..end])
}

/// The fatal error for an unacceptable value on `line` of the stream `origin`.
#[must_use]
pub fn malformed(origin: &str, line: usize, reason: &str, value: &JsonValue) -> Error {
	anyhow!("{origin}:{line}: {reason}: {}", context_snippet(value)).context(FatalKind::Json)
}

fn parse_position(value: &JsonValue, op: DrawOp, out: &mut Vec<RawDraw>, ctx: &Context) -> Result<()> {
	static EXTRA_DIMENSIONS: Once = Once::new();

	let numbers = value
		.as_array()
		.filter(|a| a.len() >= 2)
		.and_then(|a| Some((a.get(0)?.as_number()?, a.get(1)?.as_number()?, a.len())));
	let Some((lon, lat, len)) = numbers else {
		return Err(ctx.fail("malformed point"));
	};
	if len > 2 {
		EXTRA_DIMENSIONS.call_once(|| {
			warn!("{}:{}: ignoring dimensions beyond two", ctx.origin, ctx.line);
		});
	}
	let (x, y) = lonlat_to_world(lon.as_f64(), lat.as_f64());
	out.push(RawDraw::new(op, x, y));
	Ok(())
}

fn parse_coordinates(
	geojson_type: GeoJsonType,
	value: &JsonValue,
	op: DrawOp,
	out: &mut Vec<RawDraw>,
	ctx: &Context,
) -> Result<()> {
	let Some(within) = geojson_type.within() else {
		return parse_position(value, op, out, ctx);
	};
	let items = value.as_array().ok_or_else(|| ctx.fail("malformed coordinates"))?;
	for (i, item) in items.iter().enumerate() {
		let op = if within == GeoJsonType::Point {
			if i == 0 || geojson_type == GeoJsonType::MultiPoint {
				DrawOp::MoveTo
			} else {
				DrawOp::LineTo
			}
		} else {
			op
		};
		parse_coordinates(within, item, op, out, ctx)?;
	}
	if geojson_type == GeoJsonType::Polygon {
		// ends one polygon, so that ring repair starts the next one with an outer ring
		out.push(RawDraw::new(DrawOp::ClosePath, 0.0, 0.0));
	}
	Ok(())
}

fn number_as_u64(number: JsonNumber) -> u64 {
	match number {
		JsonNumber::UInt(v) => v,
		JsonNumber::Int(v) => u64::try_from(v).unwrap_or(0),
		JsonNumber::Float(v) => v as u64,
	}
}

fn number_as_i64(number: JsonNumber) -> i64 {
	match number {
		JsonNumber::UInt(v) => i64::try_from(v).unwrap_or(i64::MAX),
		JsonNumber::Int(v) => v,
		JsonNumber::Float(v) => v as i64,
	}
}

fn feature_id(value: Option<&JsonValue>) -> Option<u64> {
	match value?.as_number()? {
		JsonNumber::UInt(v) => Some(v),
		JsonNumber::Int(_) => None,
		JsonNumber::Float(v) if v.is_finite() && v >= 0.0 => Some(v as u64),
		JsonNumber::Float(_) => None,
	}
}

struct Provenance {
	layer: String,
	index: u64,
	sequence: u64,
	extent: Option<i64>,
	dropped: DropState,
}

fn read_tippecanoe(block: Option<&JsonValue>) -> Provenance {
	let mut provenance = Provenance {
		layer: "unknown".to_string(),
		index: 0,
		sequence: 0,
		extent: None,
		dropped: DropState::Unset,
	};
	let Some(block) = block else {
		return provenance;
	};
	provenance.dropped = DropState::Kept;
	let Some(block) = block.as_object() else {
		return provenance;
	};

	let number = |key: &str| block.get(key).and_then(JsonValue::as_number);
	if let Some(layer) = block.get_str("layer") {
		provenance.layer = layer.to_string();
	}
	if let Some(index) = number("index") {
		provenance.index = number_as_u64(index);
	}
	if let Some(sequence) = number("sequence") {
		provenance.sequence = number_as_u64(sequence);
	}
	provenance.extent = number("extent").map(number_as_i64).filter(|e| *e != 0);
	if block.get("dropped") == Some(&JsonValue::Boolean(true)) {
		provenance.dropped = DropState::Dropped;
	}
	provenance
}

/// Decode one JSON value read from `line` of the stream `origin`.
///
/// Values that are not GeoJSON Features are skipped with `Ok(None)`, and so are features whose
/// geometry is empty after conversion into `target`.
///
/// # Errors
/// Fails with [`FatalKind::Json`] when a Feature lacks geometry, properties or coordinates,
/// names an unknown geometry type, or has malformed coordinates.
pub fn decode_feature(
	value: &JsonValue,
	origin: &str,
	line: usize,
	coord: &TileCoord,
	target: GeometryTarget,
) -> Result<Option<DecodedFeature>> {
	let Some(object) = value.as_object() else {
		trace!("{origin}:{line}: skipping {} value", value.type_as_str());
		return Ok(None);
	};
	if object.get_str("type") != Some("Feature") {
		trace!("{origin}:{line}: skipping object that is not a Feature");
		return Ok(None);
	}
	let ctx = Context {
		origin,
		line,
		feature: value,
	};

	let geometry = object
		.get("geometry")
		.ok_or_else(|| ctx.fail("filtered feature with no geometry"))?;

	let properties = match object.get("properties") {
		Some(JsonValue::Object(properties)) => Some(properties),
		Some(JsonValue::Null) => None,
		_ => return Err(ctx.fail("feature without properties hash")),
	};

	let geometry = geometry.as_object();
	let type_name = match geometry.and_then(|g| g.get("type")) {
		None => return Err(ctx.fail("null geometry (additional not reported)")),
		Some(JsonValue::String(name)) => name,
		Some(_) => return Err(ctx.fail("geometry type is not a string")),
	};

	let coordinates = match geometry.and_then(|g| g.get("coordinates")) {
		Some(coordinates @ JsonValue::Array(_)) => coordinates,
		_ => return Err(ctx.fail("feature without coordinates array")),
	};

	let geojson_type = GeoJsonType::from_name(type_name)
		.ok_or_else(|| ctx.fail(&format!("Can't handle geometry type {type_name}")))?;
	let geom_type = geojson_type.geom_type();

	let mut raw = Vec::new();
	parse_coordinates(geojson_type, coordinates, DrawOp::MoveTo, &mut raw, &ctx)?;

	let mut geometry = match target {
		GeometryTarget::Serial { geometry_scale } => world_to_serial(&raw, coord, geometry_scale),
		GeometryTarget::Tile { extent } => world_to_tile(&raw, coord, extent),
	};
	if geom_type == GeomType::Polygon {
		geometry = fix_polygon(&geometry);
		if matches!(target, GeometryTarget::Tile { .. }) {
			geometry = to_tile_rings(&geometry);
		}
	}

	let Some(bbox) = bbox(&geometry) else {
		trace!("{origin}:{line}: dropping feature with empty geometry");
		return Ok(None);
	};

	let provenance = read_tippecanoe(object.get("tippecanoe"));

	Ok(Some(DecodedFeature {
		geom_type,
		geometry,
		bbox,
		layer: provenance.layer,
		id: feature_id(object.get("id")),
		index: provenance.index,
		sequence: provenance.sequence,
		extent: provenance.extent,
		dropped: provenance.dropped,
		properties: properties.map(decode_properties).unwrap_or_default(),
	}))
}

fn decode_properties(properties: &JsonObject) -> Vec<(String, TileValue)> {
	properties
		.iter()
		.map(|(key, value)| (key, TileValue::from_json(value)))
		.filter(|(_, value)| !value.is_null())
		.map(|(key, value)| (key.to_string(), value))
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Draw;
	use pretty_assertions::assert_eq;
	use rstest::rstest;
	use tilefilter_core::json::parse_json_str;

	const SERIAL: GeometryTarget = GeometryTarget::Serial { geometry_scale: 0 };

	fn z0() -> TileCoord {
		TileCoord::new(0, 0, 0).unwrap()
	}

	fn decode(json: &str) -> Result<Option<DecodedFeature>> {
		decode_feature(&parse_json_str(json).unwrap(), FILTER_OUTPUT, 7, &z0(), SERIAL)
	}

	fn decode_ok(json: &str) -> DecodedFeature {
		decode(json).unwrap().unwrap()
	}

	#[rstest]
	#[case("[1,2]")]
	#[case("\"Feature\"")]
	#[case(r#"{"type":"FeatureCollection","features":[]}"#)]
	#[case(r#"{"geometry":{"type":"Point","coordinates":[0,0]},"properties":{}}"#)]
	fn skips_non_features(#[case] json: &str) {
		assert_eq!(decode(json).unwrap(), None);
	}

	#[rstest]
	#[case(r#"{"type":"Feature","properties":{}}"#, "filtered feature with no geometry")]
	#[case(r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]}}"#, "feature without properties hash")]
	#[case(r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1,2]},"properties":[]}"#, "feature without properties hash")]
	#[case(r#"{"type":"Feature","geometry":null,"properties":{}}"#, "null geometry (additional not reported)")]
	#[case(r#"{"type":"Feature","geometry":{"coordinates":[1,2]},"properties":{}}"#, "null geometry (additional not reported)")]
	#[case(r#"{"type":"Feature","geometry":{"type":1,"coordinates":[1,2]},"properties":{}}"#, "geometry type is not a string")]
	#[case(r#"{"type":"Feature","geometry":{"type":"Point"},"properties":{}}"#, "feature without coordinates array")]
	#[case(r#"{"type":"Feature","geometry":{"type":"Point","coordinates":"1,2"},"properties":{}}"#, "feature without coordinates array")]
	#[case(r#"{"type":"Feature","geometry":{"type":"Circle","coordinates":[1,2]},"properties":{}}"#, "Can't handle geometry type Circle")]
	#[case(r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[1]},"properties":{}}"#, "malformed point")]
	#[case(r#"{"type":"Feature","geometry":{"type":"LineString","coordinates":[[1,2],["a",3]]},"properties":{}}"#, "malformed point")]
	#[case(r#"{"type":"Feature","geometry":{"type":"Polygon","coordinates":[5]},"properties":{}}"#, "malformed coordinates")]
	fn fatal_violations(#[case] json: &str, #[case] reason: &str) {
		let err = decode(json).unwrap_err();
		assert_eq!(FatalKind::of(&err), Some(FatalKind::Json));
		let message = err.chain().nth(1).unwrap().to_string();
		assert!(
			message.starts_with(&format!("Filter output:7: {reason}: {{")),
			"{message}"
		);
	}

	#[test]
	fn properties_are_checked_before_geometry_type() {
		let err = decode(r#"{"type":"Feature","geometry":{"type":"Circle","coordinates":[]}}"#).unwrap_err();
		assert!(err.chain().nth(1).unwrap().to_string().contains("feature without properties hash"));
	}

	#[test]
	fn point_with_provenance() {
		let feature = decode_ok(
			r#"{"type":"Feature","id":12,"geometry":{"type":"Point","coordinates":[0,0]},
			"properties":{"name":"a","gone":null,"n":-3,"tags":[1,2]},
			"tippecanoe":{"layer":"poi","index":4,"sequence":5,"extent":8192}}"#,
		);
		assert_eq!(feature.geom_type, GeomType::Point);
		assert_eq!(feature.geometry, vec![Draw::move_to(1 << 31, 1 << 31)]);
		assert_eq!(feature.bbox, [1 << 31, 1 << 31, 1 << 31, 1 << 31]);
		assert_eq!(feature.layer, "poi");
		assert_eq!(feature.id, Some(12));
		assert_eq!((feature.index, feature.sequence), (4, 5));
		assert_eq!(feature.extent, Some(8192));
		assert_eq!(feature.dropped, DropState::Kept);
		assert_eq!(
			feature.properties,
			vec![
				("name".to_string(), TileValue::from("a")),
				("n".to_string(), TileValue::Int(-3)),
				("tags".to_string(), TileValue::from("[1,2]")),
			]
		);
	}

	#[test]
	fn defaults_without_tippecanoe_block() {
		let feature = decode_ok(r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":null}"#);
		assert_eq!(feature.layer, "unknown");
		assert_eq!(feature.dropped, DropState::Unset);
		assert_eq!((feature.index, feature.sequence, feature.extent), (0, 0, None));
		assert!(feature.properties.is_empty());
	}

	#[rstest]
	#[case(r#""dropped":true"#, DropState::Dropped)]
	#[case(r#""dropped":false"#, DropState::Kept)]
	#[case(r#""dropped":1"#, DropState::Kept)]
	fn drop_flag(#[case] member: &str, #[case] expected: DropState) {
		let json = format!(
			r#"{{"type":"Feature","geometry":{{"type":"Point","coordinates":[0,0]}},"properties":{{}},"tippecanoe":{{{member}}}}}"#
		);
		assert_eq!(decode_ok(&json).dropped, expected);
	}

	#[rstest]
	#[case("18446744073709551615", Some(u64::MAX))]
	#[case("7.0", Some(7))]
	#[case("-4", None)]
	#[case("\"abc\"", None)]
	fn ids(#[case] id: &str, #[case] expected: Option<u64>) {
		let json =
			format!(r#"{{"type":"Feature","id":{id},"geometry":{{"type":"Point","coordinates":[0,0]}},"properties":{{}}}}"#);
		assert_eq!(decode_ok(&json).id, expected);
	}

	#[test]
	fn multi_point_and_lines() {
		let feature =
			decode_ok(r#"{"type":"Feature","geometry":{"type":"MultiPoint","coordinates":[[0,0],[90,0]]},"properties":{}}"#);
		assert_eq!(
			feature.geometry,
			vec![Draw::move_to(1 << 31, 1 << 31), Draw::move_to(3 << 30, 1 << 31)]
		);

		let feature = decode_ok(
			r#"{"type":"Feature","geometry":{"type":"MultiLineString","coordinates":[[[0,0],[90,0]],[[-90,0],[0,0]]]},"properties":{}}"#,
		);
		assert_eq!(feature.geom_type, GeomType::LineString);
		let ops: Vec<DrawOp> = feature.geometry.iter().map(|d| d.op).collect();
		assert_eq!(ops, vec![DrawOp::MoveTo, DrawOp::LineTo, DrawOp::MoveTo, DrawOp::LineTo]);
	}

	#[test]
	fn polygon_is_closed_and_oriented() {
		// counterclockwise in lon/lat, which is clockwise on screen once y points down
		let feature = decode_ok(
			r#"{"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[0,0],[90,0],[90,45],[0,45]]]},"properties":{}}"#,
		);
		assert_eq!(feature.geom_type, GeomType::Polygon);
		assert_eq!(feature.geometry.len(), 5);
		let (first, last) = (feature.geometry[0], feature.geometry[4]);
		assert_eq!((first.op, last.op), (DrawOp::MoveTo, DrawOp::LineTo));
		assert_eq!((first.x, first.y), (last.x, last.y));
		assert!(feature.geometry.iter().all(|d| d.op != DrawOp::ClosePath));
	}

	#[test]
	fn tile_target_uses_extent_units() {
		let target = GeometryTarget::Tile { extent: 4096 };
		let value = parse_json_str(
			r#"{"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[0,0],[90,0],[90,45],[0,45],[0,0]]]},"properties":{}}"#,
		)
		.unwrap();
		let feature = decode_feature(&value, "Input", 1, &z0(), target).unwrap().unwrap();
		assert_eq!(feature.geometry.len(), 5);
		assert_eq!(feature.geometry[0], Draw::move_to(2048, 2048));
		assert_eq!(feature.geometry[4], Draw::close_path());
	}

	#[test]
	fn empty_geometry_is_dropped() {
		assert_eq!(
			decode(r#"{"type":"Feature","geometry":{"type":"MultiPoint","coordinates":[]},"properties":{}}"#).unwrap(),
			None
		);
		assert_eq!(
			decode(r#"{"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[0,0]]]},"properties":{}}"#).unwrap(),
			None
		);
	}

	#[test]
	fn snippet_is_truncated() {
		let long = JsonValue::from("x".repeat(2000));
		let snippet = context_snippet(&long);
		assert_eq!(snippet.len(), CONTEXT_LIMIT + 3);
		assert!(snippet.ends_with("..."));
	}
}
