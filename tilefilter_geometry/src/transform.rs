//! Conversions between world coordinates and the coordinate spaces of a tile.
//!
//! - serial space: world units relative to the tile origin, optionally quantized to a grid of
//!   `2^geometry_scale` units
//! - tile space: layer extent units, `extent` per tile edge
//!
//! Every vertex is converted independently. `ClosePath` operations pass through unchanged.

use crate::{Draw, DrawOp, RawDraw};
use tilefilter_core::TileCoord;

/// Round `v` to the nearest multiple of `2^geometry_scale`, ties away from zero.
#[must_use]
pub fn quantize(v: f64, geometry_scale: u8) -> i64 {
	let scale = (1u64 << geometry_scale) as f64;
	((v / scale).round() * scale) as i64
}

/// World coordinates of the top-left corner of `coord`.
#[must_use]
pub fn tile_origin(coord: &TileCoord) -> (i64, i64) {
	if coord.level == 0 {
		(0, 0)
	} else {
		coord.origin()
	}
}

/// Quantize world coordinates and make them relative to the tile origin.
#[must_use]
pub fn world_to_serial(draws: &[RawDraw], coord: &TileCoord, geometry_scale: u8) -> Vec<Draw> {
	let (ox, oy) = tile_origin(coord);
	draws
		.iter()
		.map(|d| match d.op {
			DrawOp::ClosePath => Draw::close_path(),
			op => Draw::new(
				op,
				quantize(d.x, geometry_scale) - ox,
				quantize(d.y, geometry_scale) - oy,
			),
		})
		.collect()
}

/// Add the tile origin back to serial coordinates.
#[must_use]
pub fn serial_to_world(draws: &[Draw], coord: &TileCoord) -> Vec<RawDraw> {
	let (ox, oy) = tile_origin(coord);
	draws
		.iter()
		.map(|d| match d.op {
			DrawOp::ClosePath => RawDraw::new(DrawOp::ClosePath, 0.0, 0.0),
			op => RawDraw::new(op, (d.x + ox) as f64, (d.y + oy) as f64),
		})
		.collect()
}

/// Scale layer extent units up to world coordinates.
#[must_use]
pub fn tile_to_world(draws: &[Draw], coord: &TileCoord, extent: u32) -> Vec<RawDraw> {
	let (ox, oy) = tile_origin(coord);
	let scale = coord.world_span() as f64 / f64::from(extent);
	draws
		.iter()
		.map(|d| match d.op {
			DrawOp::ClosePath => RawDraw::new(DrawOp::ClosePath, 0.0, 0.0),
			op => RawDraw::new(op, ox as f64 + d.x as f64 * scale, oy as f64 + d.y as f64 * scale),
		})
		.collect()
}

/// Scale world coordinates down to layer extent units, rounding ties away from zero.
#[must_use]
pub fn world_to_tile(draws: &[RawDraw], coord: &TileCoord, extent: u32) -> Vec<Draw> {
	let (ox, oy) = tile_origin(coord);
	let scale = f64::from(extent) / coord.world_span() as f64;
	draws
		.iter()
		.map(|d| match d.op {
			DrawOp::ClosePath => Draw::close_path(),
			op => Draw::new(
				op,
				((d.x - ox as f64) * scale).round() as i64,
				((d.y - oy as f64) * scale).round() as i64,
			),
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn coord(level: u8, x: u32, y: u32) -> TileCoord {
		TileCoord::new(level, x, y).unwrap()
	}

	#[rstest]
	#[case(5.0, 0, 5)]
	#[case(5.5, 0, 6)]
	#[case(-5.5, 0, -6)]
	#[case(12.0, 3, 16)]
	#[case(11.9, 3, 8)]
	#[case(4.0, 3, 8)]
	#[case(-4.0, 3, -8)]
	#[case(3.99, 3, 0)]
	fn quantize_rounds_half_away_from_zero(#[case] v: f64, #[case] scale: u8, #[case] expected: i64) {
		assert_eq!(quantize(v, scale), expected);
	}

	#[test]
	fn quantize_is_idempotent() {
		for scale in 0..12u8 {
			for v in [-1_000_003.7, -17.5, 0.0, 0.49, 1.5, 2047.0, 123_456_789.25] {
				let once = quantize(v, scale);
				assert_eq!(quantize(once as f64, scale), once, "v={v} scale={scale}");
			}
		}
	}

	#[test]
	fn origin_is_zero_at_level_zero() {
		assert_eq!(tile_origin(&coord(0, 0, 0)), (0, 0));
		assert_eq!(tile_origin(&coord(2, 1, 3)), (1 << 30, 3 << 30));
	}

	#[test]
	fn serial_offsets_by_origin() {
		let c = coord(1, 1, 0);
		let raw = vec![
			RawDraw::new(DrawOp::MoveTo, 2_147_483_648.0 + 10.4, 99.6),
			RawDraw::new(DrawOp::ClosePath, 0.0, 0.0),
		];
		let serial = world_to_serial(&raw, &c, 0);
		assert_eq!(serial, vec![Draw::move_to(10, 100), Draw::close_path()]);

		let back = serial_to_world(&serial, &c);
		assert_eq!(back[0], RawDraw::new(DrawOp::MoveTo, 2_147_483_658.0, 100.0));
		assert_eq!(back[1].op, DrawOp::ClosePath);
	}

	#[test]
	fn tile_units_round_trip() {
		let c = coord(22, 2_000_000, 1_500_000);
		let draws = vec![Draw::move_to(0, 0), Draw::line_to(4095, 17), Draw::line_to(-64, 4160)];
		let world = tile_to_world(&draws, &c, 4096);
		assert_eq!(world[1].x, (2_000_000i64 << 10) as f64 + 4095.0 * 0.25);
		assert_eq!(world_to_tile(&world, &c, 4096), draws);
	}
}
