use crate::{DrawVec, GeomType, TileValue, bbox};
use std::sync::Arc;

/// Drop status reported by a filter.
///
/// `Unset` means the filter gave no `tippecanoe` block at all, which is not the same as an
/// explicit keep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DropState {
	#[default]
	Unset,
	Kept,
	Dropped,
}

/// A serialized feature record of one tile.
///
/// Coordinates are world units relative to the tile's origin, polygon rings are in serial form.
#[derive(Clone, Debug, PartialEq)]
pub struct SerialFeature {
	pub geom_type: GeomType,
	pub geometry: DrawVec,
	/// `[min_x, min_y, max_x, max_y]` of the geometry's vertices.
	pub bbox: [i64; 4],
	pub attributes: Vec<(Arc<str>, TileValue)>,
	/// Layer handle in the owning segment's registry.
	pub layer: u32,
	pub id: Option<u64>,
	pub sequence: u64,
	pub index: u64,
	/// Coordinate extent override for this feature.
	pub extent: Option<i64>,
	pub dropped: DropState,
	/// Tiling segment that produced this record.
	pub segment: usize,
}

impl SerialFeature {
	/// A feature with the given geometry and default provenance; the bounding box is derived.
	#[must_use]
	pub fn new(geom_type: GeomType, geometry: DrawVec, layer: u32) -> Self {
		let bbox = bbox(&geometry).unwrap_or([0; 4]);
		Self {
			geom_type,
			geometry,
			bbox,
			attributes: Vec::new(),
			layer,
			id: None,
			sequence: 0,
			index: 0,
			extent: None,
			dropped: DropState::Unset,
			segment: 0,
		}
	}

	/// Value of the first attribute named `key`.
	#[must_use]
	pub fn attribute(&self, key: &str) -> Option<&TileValue> {
		self.attributes.iter().find(|(k, _)| &**k == key).map(|(_, v)| v)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Draw;

	#[test]
	fn new_derives_bbox() {
		let mut feature = SerialFeature::new(
			GeomType::LineString,
			vec![Draw::move_to(10, 20), Draw::line_to(-5, 40)],
			2,
		);
		assert_eq!(feature.bbox, [-5, 20, 10, 40]);
		assert_eq!(feature.dropped, DropState::Unset);

		feature.attributes.push((Arc::from("name"), TileValue::from("Main St")));
		assert_eq!(feature.attribute("name"), Some(&TileValue::from("Main St")));
		assert_eq!(feature.attribute("ref"), None);
	}
}
