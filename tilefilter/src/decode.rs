//! Reading features back from a filter's output stream.
//!
//! The geometry and attribute decoding itself lives in [`tilefilter_geometry::geojson`]; this
//! module adds layer resolution and the per-segment statistics.

use crate::registry::SegmentLayers;
use anyhow::Result;
use std::{
	collections::HashMap,
	fmt::{self, Display},
	io::Read,
};
use tilefilter_core::{TileCoord, json::JsonPull};
use tilefilter_derive::context;
use tilefilter_geometry::{
	KeyPool, SerialFeature, TileFeature, TileLayer,
	geojson::{GeometryTarget, decode_feature},
};

/// Where in tile generation a filter runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterPosition {
	/// On the serialized features of a tile, before it is assembled.
	Prefilter,
	/// On the assembled layers of a tile, before it is encoded.
	Postfilter,
}

impl Display for FilterPosition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			FilterPosition::Prefilter => "prefilter",
			FilterPosition::Postfilter => "postfilter",
		})
	}
}

/// Whether decoding a feature counts it in the layer registry.
///
/// Layers are resolved either way. A feature is counted by exactly one stage of the pipeline:
/// the prefilter's output is deferred when a postfilter will count the tile's layers later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Counting {
	/// Count the geometry type and the non-null attributes.
	Record,
	/// Resolve layers only.
	Defer,
}

/// Name of the input stream in error messages.
pub const INPUT: &str = "Input";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
	/// Serial coordinates are multiples of `2^geometry_scale` world units.
	pub geometry_scale: u8,
}

/// Pull values from `pull` until one decodes into a feature, or the stream ends.
///
/// The feature's layer is resolved in `segment`, registering it on first sight and widening its
/// zoom range. With [`Counting::Record`] the feature's geometry type and non-null attributes
/// are counted as well.
pub fn parse_feature(
	pull: &mut JsonPull,
	coord: &TileCoord,
	segment: &mut SegmentLayers,
	key_pool: &KeyPool,
	counting: Counting,
	options: DecodeOptions,
) -> Result<Option<SerialFeature>> {
	let target = GeometryTarget::Serial {
		geometry_scale: options.geometry_scale,
	};
	let counted = counting == Counting::Record;

	while let Some(value) = pull.next_value()? {
		let Some(decoded) = decode_feature(&value, pull.origin(), pull.line(), coord, target)? else {
			continue;
		};

		let layer = segment.resolve_or_create(&decoded.layer, coord.level);
		if counted {
			segment.record_feature(layer, decoded.geom_type)?;
		}

		let mut feature = SerialFeature::new(decoded.geom_type, decoded.geometry, layer);
		feature.bbox = decoded.bbox;
		feature.id = decoded.id;
		feature.index = decoded.index;
		feature.sequence = decoded.sequence;
		feature.extent = decoded.extent;
		feature.dropped = decoded.dropped;
		feature.segment = segment.index();

		for (key, value) in decoded.properties {
			if counted {
				segment.record_attribute(layer, &key, &value)?;
			}
			feature.attributes.push((key_pool.pool(&key), value));
		}
		return Ok(Some(feature));
	}
	Ok(None)
}

/// Read newline-delimited GeoJSON features into serial features.
///
/// Layers are resolved in `segment` but nothing is counted; features are counted once they
/// come out of a filter.
pub fn read_serial_features(
	reader: impl Read,
	coord: &TileCoord,
	segment: &mut SegmentLayers,
	key_pool: &KeyPool,
	options: DecodeOptions,
) -> Result<Vec<SerialFeature>> {
	let mut pull = JsonPull::from_reader(reader, INPUT);
	let mut features = Vec::new();
	while let Some(feature) = parse_feature(&mut pull, coord, segment, key_pool, Counting::Defer, options)? {
		features.push(feature);
	}
	Ok(features)
}

/// Decode every feature of `pull` into layers of `extent` units, grouped by layer name in order
/// of first appearance.
fn group_layers(pull: &mut JsonPull, coord: &TileCoord, extent: u32) -> Result<Vec<TileLayer>> {
	let target = GeometryTarget::Tile { extent };
	let mut layers: Vec<TileLayer> = Vec::new();
	let mut by_name: HashMap<String, usize> = HashMap::new();

	while let Some(value) = pull.next_value()? {
		let Some(decoded) = decode_feature(&value, pull.origin(), pull.line(), coord, target)? else {
			continue;
		};

		let index = *by_name.entry(decoded.layer.clone()).or_insert_with(|| {
			layers.push(TileLayer::new(&decoded.layer, extent));
			layers.len() - 1
		});
		let layer = &mut layers[index];

		let mut feature = TileFeature::new(decoded.geom_type, decoded.geometry);
		feature.id = decoded.id;
		for (key, value) in decoded.properties {
			layer.tag(&mut feature, &key, value);
		}
		layer.features.push(feature);
	}
	Ok(layers)
}

/// Register `layers` in `segment` and count all their features and non-null attributes.
#[context("while recording the layers of tile {}", coord)]
pub fn record_layers(layers: &[TileLayer], coord: &TileCoord, segment: &mut SegmentLayers) -> Result<()> {
	for layer in layers {
		let id = segment.resolve_or_create(&layer.name, coord.level);
		for feature in &layer.features {
			segment.record_feature(id, feature.geom_type)?;
			for (key, value) in layer.properties(feature)? {
				segment.record_attribute(id, key, value)?;
			}
		}
	}
	Ok(())
}

/// Read a postfilter's output into layers and account for them in `segment`.
pub fn parse_layers(
	pull: &mut JsonPull,
	coord: &TileCoord,
	extent: u32,
	segment: &mut SegmentLayers,
) -> Result<Vec<TileLayer>> {
	let layers = group_layers(pull, coord, extent)?;
	record_layers(&layers, coord, segment)?;
	Ok(layers)
}

/// Read newline-delimited GeoJSON features into layers without touching any registry.
pub fn read_tile_layers(reader: impl Read, coord: &TileCoord, extent: u32) -> Result<Vec<TileLayer>> {
	let mut pull = JsonPull::from_reader(reader, INPUT);
	group_layers(&mut pull, coord, extent)
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use std::io::Cursor;
	use tilefilter_core::FatalKind;
	use tilefilter_geometry::{Draw, DropState, GeomType, TileValue};

	fn pull(text: &str) -> JsonPull<'_> {
		JsonPull::from_reader(Cursor::new(text), "Filter output")
	}

	fn coord() -> TileCoord {
		TileCoord::new(1, 1, 0).unwrap()
	}

	const FEATURES: &str = concat!(
		r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[90,0]},"properties":{"name":"a","gone":null},"tippecanoe":{"layer":"poi","index":3,"sequence":9}}"#,
		"\n",
		r#"{"type":"FeatureCollection","features":[]}"#,
		"\n",
		r#"{"type":"Feature","geometry":{"type":"MultiPoint","coordinates":[]},"properties":{}}"#,
		"\n",
		r#"{"type":"Feature","geometry":{"type":"LineString","coordinates":[[0,0],[90,45]]},"properties":{"lanes":2}}"#,
		"\n",
	);

	fn all_features(counting: Counting, segment: &mut SegmentLayers) -> Vec<SerialFeature> {
		let key_pool = KeyPool::new();
		let mut pull = pull(FEATURES);
		let mut features = Vec::new();
		while let Some(feature) =
			parse_feature(&mut pull, &coord(), segment, &key_pool, counting, DecodeOptions::default()).unwrap()
		{
			features.push(feature);
		}
		features
	}

	#[test]
	fn prefilter_counts_features() {
		let mut segment = SegmentLayers::new(2);
		let features = all_features(Counting::Record, &mut segment);

		assert_eq!(features.len(), 2);
		let point = &features[0];
		assert_eq!(point.geometry, vec![Draw::move_to(1 << 30, 1 << 31)]);
		assert_eq!((point.index, point.sequence, point.segment), (3, 9, 2));
		assert_eq!(point.dropped, DropState::Kept);
		assert_eq!(point.attribute("name"), Some(&TileValue::from("a")));
		assert_eq!(point.attribute("gone"), None);
		assert_eq!(segment.layer_name(point.layer).unwrap(), "poi");

		let line = &features[1];
		assert_eq!(line.geom_type, GeomType::LineString);
		assert_eq!(segment.layer_name(line.layer).unwrap(), "unknown");

		let poi = segment.get("poi").unwrap();
		assert_eq!((poi.points, poi.min_zoom, poi.max_zoom), (1, 1, 1));
		assert_eq!(poi.tilestats.keys().collect::<Vec<_>>(), vec!["name"]);
		let unknown = segment.get("unknown").unwrap();
		assert_eq!((unknown.points, unknown.lines), (0, 1));
	}

	#[test]
	fn empty_geometry_touches_no_counters() {
		let text = concat!(
			r#"{"type":"Feature","geometry":{"type":"MultiPoint","coordinates":[]},"properties":{"a":1},"tippecanoe":{"layer":"void"}}"#,
			"\n",
			r#"{"type":"Feature","geometry":{"type":"LineString","coordinates":[]},"properties":{}}"#,
			"\n",
		);
		let mut segment = SegmentLayers::new(0);
		let mut pull = pull(text);
		let feature = parse_feature(
			&mut pull,
			&coord(),
			&mut segment,
			&KeyPool::new(),
			Counting::Record,
			DecodeOptions::default(),
		)
		.unwrap();
		assert!(feature.is_none());
		assert!(segment.is_empty());
		assert!(segment.get("void").is_none());
	}

	#[test]
	fn deferred_counting_only_resolves_layers() {
		let mut segment = SegmentLayers::new(0);
		let features = all_features(Counting::Defer, &mut segment);
		assert_eq!(features.len(), 2);
		assert_eq!(segment.len(), 2);
		let poi = segment.get("poi").unwrap();
		assert_eq!(poi.feature_count(), 0);
		assert!(poi.tilestats.is_empty());
	}

	#[test]
	fn fatal_feature_stops_decoding() {
		let mut segment = SegmentLayers::new(0);
		let mut pull = pull("{\"type\":\"Feature\",\"geometry\":{\"type\":\"Point\",\"coordinates\":[0,0]}}\n");
		let err = parse_feature(
			&mut pull,
			&coord(),
			&mut segment,
			&KeyPool::new(),
			Counting::Record,
			DecodeOptions::default(),
		)
		.unwrap_err();
		assert_eq!(FatalKind::of(&err), Some(FatalKind::Json));
		assert!(format!("{err:#}").contains("Filter output:1: feature without properties hash"));
		assert!(segment.is_empty());
	}

	#[test]
	fn layers_grouped_in_order_of_appearance() {
		let text = concat!(
			r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{"k":"v"},"tippecanoe":{"layer":"b"}}"#,
			r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{},"tippecanoe":{"layer":"a"}}"#,
			r#"{"type":"Feature","id":5,"geometry":{"type":"Point","coordinates":[0,0]},"properties":{"k":"v","n":null},"tippecanoe":{"layer":"b"}}"#,
		);
		let mut segment = SegmentLayers::new(0);
		let zero = TileCoord::new(0, 0, 0).unwrap();
		let layers = parse_layers(&mut pull(text), &zero, 4096, &mut segment).unwrap();

		let names: Vec<&str> = layers.iter().map(|l| l.name.as_str()).collect();
		assert_eq!(names, vec!["b", "a"]);
		assert_eq!(layers[0].features.len(), 2);
		assert_eq!(layers[0].features[1].id, Some(5));
		assert_eq!(layers[0].features[1].tags, vec![0, 0]);
		assert_eq!(layers[0].features[0].geometry, vec![Draw::move_to(2048, 2048)]);

		let b = segment.get("b").unwrap();
		assert_eq!((b.id, b.points), (0, 2));
		assert_eq!(segment.get("a").unwrap().id, 1);
	}

	#[test]
	fn reads_serial_features_without_counting() {
		let mut segment = SegmentLayers::new(1);
		let features =
			read_serial_features(Cursor::new(FEATURES), &coord(), &mut segment, &KeyPool::new(), DecodeOptions::default())
				.unwrap();
		assert_eq!(features.len(), 2);
		assert_eq!(features[1].segment, 1);
		assert_eq!(segment.get("unknown").unwrap().feature_count(), 0);

		let err = read_serial_features(Cursor::new("{\"type\":\"Feature\"}"), &coord(), &mut segment, &KeyPool::new(), DecodeOptions::default())
			.unwrap_err();
		assert!(format!("{err:#}").contains("Input:1: filtered feature with no geometry"));
	}

	#[test]
	fn reads_layers_without_registry() {
		let text = r#"{"type":"Feature","geometry":{"type":"Point","coordinates":[0,0]},"properties":{}}"#;
		let zero = TileCoord::new(0, 0, 0).unwrap();
		let layers = read_tile_layers(Cursor::new(text), &zero, 512).unwrap();
		assert_eq!(layers.len(), 1);
		assert_eq!(layers[0].name, "unknown");
		assert_eq!(layers[0].extent, 512);
		assert_eq!(layers[0].features[0].geometry, vec![Draw::move_to(256, 256)]);
	}
}
