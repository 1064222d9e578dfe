//! Assembled tile layers.
//!
//! A [`TileLayer`] keeps key and value tables like an encoded vector tile layer; each
//! [`TileFeature`] references its attributes through pairs of indices into those tables.
//! Geometry is in layer extent units with polygon rings in tile form.

use crate::{DrawVec, GeomType, InternTable, TileValue};
use anyhow::{Context, Result, ensure};
use itertools::Itertools;

#[derive(Clone, Debug, PartialEq)]
pub struct TileFeature {
	pub id: Option<u64>,
	pub geom_type: GeomType,
	pub geometry: DrawVec,
	/// Alternating key index and value index.
	pub tags: Vec<u32>,
}

impl TileFeature {
	#[must_use]
	pub fn new(geom_type: GeomType, geometry: DrawVec) -> Self {
		Self {
			id: None,
			geom_type,
			geometry,
			tags: Vec::new(),
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct TileLayer {
	pub name: String,
	/// Coordinate units per tile edge.
	pub extent: u32,
	pub version: u32,
	pub keys: InternTable<String>,
	pub values: InternTable<TileValue>,
	pub features: Vec<TileFeature>,
}

impl TileLayer {
	#[must_use]
	pub fn new(name: &str, extent: u32) -> TileLayer {
		TileLayer {
			name: name.to_string(),
			extent,
			version: 2,
			keys: InternTable::new(),
			values: InternTable::new(),
			features: Vec::new(),
		}
	}

	/// Intern `key` and `value` and append the pair to `feature`'s tags.
	pub fn tag(&mut self, feature: &mut TileFeature, key: &str, value: TileValue) {
		feature.tags.push(self.keys.add(key.to_string()));
		feature.tags.push(self.values.add(value));
	}

	/// Resolve `feature`'s tags into key/value pairs.
	pub fn properties<'a>(&'a self, feature: &TileFeature) -> Result<Vec<(&'a str, &'a TileValue)>> {
		ensure!(feature.tags.len().is_multiple_of(2), "feature has an odd number of tags");
		feature
			.tags
			.iter()
			.tuples()
			.map(|(k, v)| {
				let key = self.keys.get(*k).context("failed to resolve attribute key")?;
				let value = self.values.get(*v).context("failed to resolve attribute value")?;
				Ok((key.as_str(), value))
			})
			.collect()
	}
}
