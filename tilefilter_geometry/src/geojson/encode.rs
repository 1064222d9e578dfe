use crate::{
	DrawOp, GeoJsonType, GeomType, RawDraw, SerialFeature, TileFeature, TileLayer,
	polygon::area_ring,
	projection::world_to_lonlat,
	transform::{serial_to_world, tile_to_world},
};
use anyhow::Result;
use tilefilter_core::{
	TileCoord,
	json::{JsonArray, JsonNumber, JsonObject, JsonValue},
};

fn position(draw: &RawDraw) -> JsonValue {
	let (lon, lat) = world_to_lonlat(draw.x, draw.y);
	JsonValue::Array(JsonArray(vec![
		JsonValue::Number(JsonNumber::Float(lon)),
		JsonValue::Number(JsonNumber::Float(lat)),
	]))
}

/// Split draws into runs that each start at a `MoveTo`. A `ClosePath` ends the current run.
fn split_parts(draws: &[RawDraw]) -> Vec<Vec<RawDraw>> {
	let mut parts: Vec<Vec<RawDraw>> = Vec::new();
	let mut open = false;
	for draw in draws {
		match draw.op {
			DrawOp::MoveTo => {
				parts.push(vec![*draw]);
				open = true;
			}
			DrawOp::LineTo => match parts.last_mut() {
				Some(part) if open => part.push(*draw),
				_ => {
					parts.push(vec![*draw]);
					open = true;
				}
			},
			DrawOp::ClosePath => open = false,
		}
	}
	parts
}

fn close_ring(ring: &mut Vec<RawDraw>) {
	if let (Some(first), Some(last)) = (ring.first().copied(), ring.last())
		&& (first.x, first.y) != (last.x, last.y)
	{
		ring.push(first);
	}
}

fn line_json(part: &[RawDraw]) -> JsonValue {
	JsonValue::Array(part.iter().map(position).collect())
}

/// Build a GeoJSON geometry object from world-space draws.
///
/// Polygon rings are grouped into polygons by orientation: a ring with positive area starts a
/// new polygon, the others become its holes. Returns `None` when there are no vertices.
#[must_use]
pub fn geometry_to_json(geom_type: GeomType, draws: &[RawDraw]) -> Option<JsonObject> {
	let (geojson_type, coordinates) = match geom_type {
		GeomType::Point => {
			let points: Vec<&RawDraw> = draws.iter().filter(|d| d.op != DrawOp::ClosePath).collect();
			match points.as_slice() {
				[] => return None,
				[single] => (GeoJsonType::Point, position(single)),
				_ => (
					GeoJsonType::MultiPoint,
					JsonValue::Array(points.iter().map(|d| position(d)).collect()),
				),
			}
		}
		GeomType::LineString => {
			let lines = split_parts(draws);
			match lines.as_slice() {
				[] => return None,
				[single] => (GeoJsonType::LineString, line_json(single)),
				_ => (
					GeoJsonType::MultiLineString,
					JsonValue::Array(lines.iter().map(|l| line_json(l)).collect()),
				),
			}
		}
		GeomType::Polygon => {
			let mut polygons: Vec<Vec<JsonValue>> = Vec::new();
			for mut ring in split_parts(draws) {
				close_ring(&mut ring);
				let points: Vec<[f64; 2]> = ring.iter().map(|d| [d.x, d.y]).collect();
				let ring_json = line_json(&ring);
				match polygons.last_mut() {
					Some(polygon) if area_ring(&points) <= 0.0 => polygon.push(ring_json),
					_ => polygons.push(vec![ring_json]),
				}
			}
			let to_json = |rings: &Vec<JsonValue>| JsonValue::Array(JsonArray(rings.clone()));
			match polygons.as_slice() {
				[] => return None,
				[single] => (GeoJsonType::Polygon, to_json(single)),
				_ => (
					GeoJsonType::MultiPolygon,
					JsonValue::Array(polygons.iter().map(to_json).collect()),
				),
			}
		}
	};

	let mut geometry = JsonObject::new();
	geometry.push("type", geojson_type.name());
	geometry.push("coordinates", coordinates);
	Some(geometry)
}

fn feature_json(id: Option<u64>, geometry: JsonObject, properties: JsonObject, tippecanoe: JsonObject) -> String {
	let mut feature = JsonObject::new();
	feature.push("type", "Feature");
	if let Some(id) = id {
		feature.push("id", id);
	}
	feature.push("geometry", geometry);
	feature.push("properties", properties);
	feature.push("tippecanoe", tippecanoe);
	JsonValue::Object(feature).stringify()
}

/// Encode a serial feature as one line of GeoJSON, or `None` if it has no vertices.
///
/// The `tippecanoe` block carries `layer`, `index` and `sequence`, and `extent` when the
/// feature overrides it.
#[must_use]
pub fn encode_serial_feature(feature: &SerialFeature, layer_name: &str, coord: &TileCoord) -> Option<String> {
	let world = serial_to_world(&feature.geometry, coord);
	let geometry = geometry_to_json(feature.geom_type, &world)?;

	let mut properties = JsonObject::new();
	for (key, value) in &feature.attributes {
		properties.push(key, value.to_json());
	}

	let mut tippecanoe = JsonObject::new();
	tippecanoe.push("layer", layer_name);
	tippecanoe.push("index", feature.index);
	tippecanoe.push("sequence", feature.sequence);
	if let Some(extent) = feature.extent {
		tippecanoe.push("extent", extent);
	}

	Some(feature_json(feature.id, geometry, properties, tippecanoe))
}

/// Encode a feature of a tile layer as one line of GeoJSON, or `None` if it has no vertices.
///
/// Coordinates are scaled from the layer's extent to world units before projection. The
/// `tippecanoe` block carries only the layer name.
pub fn encode_tile_feature(layer: &TileLayer, feature: &TileFeature, coord: &TileCoord) -> Result<Option<String>> {
	let world = tile_to_world(&feature.geometry, coord, layer.extent);
	let Some(geometry) = geometry_to_json(feature.geom_type, &world) else {
		return Ok(None);
	};

	let mut properties = JsonObject::new();
	for (key, value) in layer.properties(feature)? {
		properties.push(key, value.to_json());
	}

	let mut tippecanoe = JsonObject::new();
	tippecanoe.push("layer", layer.name.as_str());

	Ok(Some(feature_json(feature.id, geometry, properties, tippecanoe)))
}
