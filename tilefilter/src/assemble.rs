//! Building tile layers from serial feature records.

use crate::registry::SegmentLayers;
use anyhow::Result;
use log::trace;
use std::collections::HashMap;
use tilefilter_core::TileCoord;
use tilefilter_geometry::{
	DropState, GeomType, SerialFeature, TileFeature, TileLayer, bbox,
	polygon::to_tile_rings,
	transform::{serial_to_world, world_to_tile},
};
use tilefilter_derive::context;

/// Group `features` into layers of `extent` units, in order of first appearance of each layer.
///
/// Features a filter marked as dropped are left out, and so are features whose geometry
/// vanishes at this extent.
#[context("while assembling the layers of tile {}", coord)]
pub fn assemble_layers(
	features: &[SerialFeature],
	segment: &SegmentLayers,
	coord: &TileCoord,
	extent: u32,
) -> Result<Vec<TileLayer>> {
	let mut layers: Vec<TileLayer> = Vec::new();
	let mut by_id: HashMap<u32, usize> = HashMap::new();

	for feature in features {
		if feature.dropped == DropState::Dropped {
			trace!("leaving out dropped feature {:?}", feature.id);
			continue;
		}

		let mut geometry = world_to_tile(&serial_to_world(&feature.geometry, coord), coord, extent);
		if feature.geom_type == GeomType::Polygon {
			geometry = to_tile_rings(&geometry);
		}
		if bbox(&geometry).is_none() {
			continue;
		}

		let index = match by_id.get(&feature.layer) {
			Some(index) => *index,
			None => {
				layers.push(TileLayer::new(segment.layer_name(feature.layer)?, extent));
				by_id.insert(feature.layer, layers.len() - 1);
				layers.len() - 1
			}
		};
		let layer = &mut layers[index];

		let mut tile_feature = TileFeature::new(feature.geom_type, geometry);
		tile_feature.id = feature.id;
		for (key, value) in &feature.attributes {
			layer.tag(&mut tile_feature, key, value.clone());
		}
		layer.features.push(tile_feature);
	}
	Ok(layers)
}
