//! Layer registry and attribute statistics.
//!
//! Every tiling segment keeps its own [`SegmentLayers`], mapping layer names to
//! [`LayerMapEntry`]s and handing out small numeric layer ids in order of first sight.
//! A segment is only ever touched by the worker that owns it, which the `&mut` receivers
//! enforce. After tiling, [`LayerMaps::merge`] combines all segments into one map from which
//! the layer metadata is written.

use anyhow::{Context, Result, anyhow};
use std::collections::{BTreeMap, BTreeSet};
use tilefilter_core::{
	FatalKind,
	json::{JsonArray, JsonObject, JsonValue},
};
use tilefilter_geometry::{GeomType, TileValue};

/// Distinct sample values kept per attribute.
pub const MAX_SAMPLE_VALUES: usize = 1000;

const KIND_STRING: u8 = 1;
const KIND_NUMBER: u8 = 2;
const KIND_BOOLEAN: u8 = 4;

/// What has been seen of one attribute of one layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeStats {
	kinds: u8,
	min: Option<f64>,
	max: Option<f64>,
	samples: BTreeSet<TileValue>,
}

impl AttributeStats {
	/// Account for one value. Nulls are ignored.
	pub fn add(&mut self, value: &TileValue) {
		let sample = match value {
			TileValue::Null => return,
			TileValue::String(s) => {
				self.kinds |= KIND_STRING;
				TileValue::String(s.clone())
			}
			TileValue::Bool(b) => {
				self.kinds |= KIND_BOOLEAN;
				TileValue::Bool(*b)
			}
			number => {
				let Some(v) = number.as_f64() else {
					return;
				};
				self.kinds |= KIND_NUMBER;
				self.extend_range(v, v);
				// numbers are sampled by value, whatever variant carried them
				TileValue::Double(v)
			}
		};
		self.add_sample(sample);
	}

	fn extend_range(&mut self, min: f64, max: f64) {
		self.min = Some(self.min.map_or(min, |m| m.min(min)));
		self.max = Some(self.max.map_or(max, |m| m.max(max)));
	}

	fn add_sample(&mut self, sample: TileValue) {
		if self.samples.len() < MAX_SAMPLE_VALUES {
			self.samples.insert(sample);
		}
	}

	pub fn merge(&mut self, other: &AttributeStats) {
		self.kinds |= other.kinds;
		if let (Some(min), Some(max)) = (other.min, other.max) {
			self.extend_range(min, max);
		}
		for sample in &other.samples {
			self.add_sample(sample.clone());
		}
	}

	/// `string`, `number`, `boolean`, or `mixed` when more than one kind was seen.
	#[must_use]
	pub fn kind_name(&self) -> &'static str {
		match self.kinds {
			KIND_STRING => "string",
			KIND_NUMBER => "number",
			KIND_BOOLEAN => "boolean",
			_ => "mixed",
		}
	}

	#[must_use]
	pub fn min(&self) -> Option<f64> {
		self.min
	}

	#[must_use]
	pub fn max(&self) -> Option<f64> {
		self.max
	}

	/// Distinct sample values in ascending order.
	pub fn samples(&self) -> impl Iterator<Item = &TileValue> {
		self.samples.iter()
	}

	fn to_json(&self, key: &str) -> JsonObject {
		let mut json = JsonObject::new();
		json.push("attribute", key);
		json.push("count", self.samples.len());
		json.push("type", self.kind_name());
		json.push("values", self.samples.iter().map(TileValue::to_json).collect::<JsonArray>());
		json.set_optional("min", self.min);
		json.set_optional("max", self.max);
		json
	}
}

/// Schema and statistics of one layer.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerMapEntry {
	/// Position of the layer in order of first sight.
	pub id: u32,
	pub min_zoom: u8,
	pub max_zoom: u8,
	pub points: u64,
	pub lines: u64,
	pub polygons: u64,
	pub tilestats: BTreeMap<String, AttributeStats>,
}

impl LayerMapEntry {
	fn new(id: u32, zoom: u8) -> Self {
		Self {
			id,
			min_zoom: zoom,
			max_zoom: zoom,
			points: 0,
			lines: 0,
			polygons: 0,
			tilestats: BTreeMap::new(),
		}
	}

	fn widen(&mut self, min_zoom: u8, max_zoom: u8) {
		self.min_zoom = self.min_zoom.min(min_zoom);
		self.max_zoom = self.max_zoom.max(max_zoom);
	}

	#[must_use]
	pub fn feature_count(&self) -> u64 {
		self.points + self.lines + self.polygons
	}

	fn merge(&mut self, other: &LayerMapEntry) {
		self.widen(other.min_zoom, other.max_zoom);
		self.points += other.points;
		self.lines += other.lines;
		self.polygons += other.polygons;
		for (key, stats) in &other.tilestats {
			self.tilestats.entry(key.clone()).or_default().merge(stats);
		}
	}

	/// The most frequent geometry class, `None` before any feature was counted.
	fn dominant_geometry(&self) -> Option<&'static str> {
		if self.feature_count() == 0 {
			return None;
		}
		let counts = [(self.points, "Point"), (self.lines, "LineString"), (self.polygons, "Polygon")];
		counts
			.iter()
			.rev()
			.max_by_key(|(count, _)| *count)
			.map(|(_, name)| *name)
	}

	fn vector_layer_json(&self, name: &str) -> JsonObject {
		let mut fields = JsonObject::new();
		for (key, stats) in &self.tilestats {
			let kind = match stats.kind_name() {
				"string" => "String",
				"number" => "Number",
				"boolean" => "Boolean",
				_ => "Mixed",
			};
			fields.push(key, kind);
		}
		let mut json = JsonObject::new();
		json.push("id", name);
		json.push("description", "");
		json.push("minzoom", self.min_zoom);
		json.push("maxzoom", self.max_zoom);
		json.push("fields", fields);
		json
	}

	fn tilestats_json(&self, name: &str) -> JsonObject {
		let mut json = JsonObject::new();
		json.push("layer", name);
		json.push("count", self.feature_count());
		json.set_optional("geometry", self.dominant_geometry());
		json.push("attributeCount", self.tilestats.len());
		json.push(
			"attributes",
			self
				.tilestats
				.iter()
				.map(|(key, stats)| JsonValue::from(stats.to_json(key)))
				.collect::<JsonArray>(),
		);
		json
	}
}

/// The layers of one tiling segment.
///
/// `unmap[id]` names the entry with that id, for every registered layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SegmentLayers {
	index: usize,
	map: BTreeMap<String, LayerMapEntry>,
	unmap: Vec<String>,
}

impl SegmentLayers {
	#[must_use]
	pub fn new(index: usize) -> Self {
		Self {
			index,
			..Self::default()
		}
	}

	/// Position of this segment in its [`LayerMaps`].
	#[must_use]
	pub fn index(&self) -> usize {
		self.index
	}

	/// Id of the layer called `name`, registering it on first sight. Always widens the layer's
	/// zoom range to include `zoom`.
	pub fn resolve_or_create(&mut self, name: &str, zoom: u8) -> u32 {
		if let Some(entry) = self.map.get_mut(name) {
			entry.widen(zoom, zoom);
			return entry.id;
		}
		let id = self.unmap.len() as u32;
		self.map.insert(name.to_string(), LayerMapEntry::new(id, zoom));
		self.unmap.push(name.to_string());
		id
	}

	fn entry_mut(&mut self, id: u32) -> Result<&mut LayerMapEntry> {
		let name = self
			.unmap
			.get(id as usize)
			.ok_or_else(|| anyhow!("layer {id} not found"))
			.context(FatalKind::Impossible)?;
		self
			.map
			.get_mut(name)
			.ok_or_else(|| anyhow!("layer {name} not found"))
			.context(FatalKind::Impossible)
	}

	/// Count one feature of `geom_type` in layer `id`.
	pub fn record_feature(&mut self, id: u32, geom_type: GeomType) -> Result<()> {
		let entry = self.entry_mut(id)?;
		match geom_type {
			GeomType::Point => entry.points += 1,
			GeomType::LineString => entry.lines += 1,
			GeomType::Polygon => entry.polygons += 1,
		}
		Ok(())
	}

	/// Add one attribute value to the statistics of layer `id`. Nulls are ignored.
	pub fn record_attribute(&mut self, id: u32, key: &str, value: &TileValue) -> Result<()> {
		if value.is_null() {
			return Ok(());
		}
		let entry = self.entry_mut(id)?;
		entry.tilestats.entry(key.to_string()).or_default().add(value);
		Ok(())
	}

	/// Name of layer `id`.
	pub fn layer_name(&self, id: u32) -> Result<&str> {
		self
			.unmap
			.get(id as usize)
			.map(String::as_str)
			.ok_or_else(|| anyhow!("layer {id} not found"))
			.context(FatalKind::Impossible)
	}

	/// Layer names indexed by id.
	#[must_use]
	pub fn layer_names(&self) -> &[String] {
		&self.unmap
	}

	#[must_use]
	pub fn get(&self, name: &str) -> Option<&LayerMapEntry> {
		self.map.get(name)
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.unmap.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.unmap.is_empty()
	}

	/// Layers in id order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &LayerMapEntry)> {
		self
			.unmap
			.iter()
			.filter_map(|name| self.map.get(name).map(|entry| (name.as_str(), entry)))
	}

	fn absorb(&mut self, other: &SegmentLayers) {
		for (name, entry) in other.iter() {
			self.resolve_or_create(name, entry.min_zoom);
			if let Some(own) = self.map.get_mut(name) {
				own.merge(entry);
			}
		}
	}

	/// TileJSON style metadata: `vector_layers` and `tilestats`.
	#[must_use]
	pub fn to_json(&self) -> JsonValue {
		let vector_layers: JsonArray = self
			.iter()
			.map(|(name, entry)| JsonValue::from(entry.vector_layer_json(name)))
			.collect();
		let layers: JsonArray = self
			.iter()
			.map(|(name, entry)| JsonValue::from(entry.tilestats_json(name)))
			.collect();

		let mut tilestats = JsonObject::new();
		tilestats.push("layerCount", self.len());
		tilestats.push("layers", layers);

		let mut json = JsonObject::new();
		json.push("vector_layers", vector_layers);
		json.push("tilestats", tilestats);
		JsonValue::from(json)
	}
}

/// The layer registries of all tiling segments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerMaps {
	segments: Vec<SegmentLayers>,
}

impl LayerMaps {
	#[must_use]
	pub fn new(segment_count: usize) -> Self {
		Self {
			segments: (0..segment_count).map(SegmentLayers::new).collect(),
		}
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.segments.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}

	#[must_use]
	pub fn segment(&self, index: usize) -> Option<&SegmentLayers> {
		self.segments.get(index)
	}

	pub fn segment_mut(&mut self, index: usize) -> Option<&mut SegmentLayers> {
		self.segments.get_mut(index)
	}

	/// Disjoint mutable access to every segment, one per worker.
	pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, SegmentLayers> {
		self.segments.iter_mut()
	}

	/// Combine all segments. Ids are reassigned by first appearance in segment order, zoom
	/// ranges widened, counters summed and attribute statistics merged.
	#[must_use]
	pub fn merge(&self) -> SegmentLayers {
		let mut merged = SegmentLayers::new(0);
		for segment in &self.segments {
			merged.absorb(segment);
		}
		merged
	}

	#[must_use]
	pub fn to_json(&self) -> JsonValue {
		self.merge().to_json()
	}
}
