//! Tile coordinates in a Web Mercator pyramid whose world spans 2^32 units per axis.

use anyhow::{Context, Result, ensure};
use std::{
	fmt::{self, Debug, Display},
	str::FromStr,
};

/// The deepest zoom level whose tiles still cover at least one world unit.
pub const MAX_LEVEL: u8 = 32;

/// A tile coordinate: zoom level plus column and row.
#[derive(Eq, PartialEq, Clone, Hash, Copy)]
pub struct TileCoord {
	pub level: u8,
	pub x: u32,
	pub y: u32,
}

impl TileCoord {
	/// Create a new `TileCoord`.
	///
	/// # Errors
	/// Returns an error if `level` > 32 or `x`/`y` lie outside the level's grid.
	pub fn new(level: u8, x: u32, y: u32) -> Result<TileCoord> {
		ensure!(level <= MAX_LEVEL, "level ({level}) must be <= {MAX_LEVEL}");
		let max = 1u64 << level;
		ensure!(u64::from(x) < max, "x ({x}) out of bounds for level {level}");
		ensure!(u64::from(y) < max, "y ({y}) out of bounds for level {level}");
		Ok(TileCoord { level, x, y })
	}

	/// Number of world units along one edge of this tile.
	#[must_use]
	pub fn world_span(&self) -> i64 {
		1i64 << (32 - u32::from(self.level))
	}

	/// World coordinates of the tile's top-left corner.
	#[must_use]
	pub fn origin(&self) -> (i64, i64) {
		let shift = 32 - u32::from(self.level);
		(i64::from(self.x) << shift, i64::from(self.y) << shift)
	}
}

impl FromStr for TileCoord {
	type Err = anyhow::Error;

	/// Parse `z/x/y`.
	fn from_str(s: &str) -> Result<Self> {
		let parts: Vec<&str> = s.trim().split('/').collect();
		ensure!(parts.len() == 3, "tile coordinate '{s}' must look like z/x/y");
		let level = parts[0].parse::<u8>().with_context(|| format!("invalid zoom level in '{s}'"))?;
		let x = parts[1].parse::<u32>().with_context(|| format!("invalid column in '{s}'"))?;
		let y = parts[2].parse::<u32>().with_context(|| format!("invalid row in '{s}'"))?;
		TileCoord::new(level, x, y)
	}
}

impl Display for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}/{}", self.level, self.x, self.y)
	}
}

impl Debug for TileCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "TileCoord({}, [{}, {}])", self.level, self.x, self.y)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[test]
	fn new_validates() {
		assert!(TileCoord::new(0, 0, 0).is_ok());
		assert!(TileCoord::new(0, 1, 0).is_err());
		assert!(TileCoord::new(3, 7, 7).is_ok());
		assert!(TileCoord::new(3, 8, 0).is_err());
		assert!(TileCoord::new(32, u32::MAX, 0).is_ok());
		assert_eq!(
			TileCoord::new(33, 0, 0).unwrap_err().to_string(),
			"level (33) must be <= 32"
		);
	}

	#[rstest]
	#[case(0, 0, 0, (0, 0), 1 << 32)]
	#[case(1, 1, 0, (1 << 31, 0), 1 << 31)]
	#[case(14, 8800, 5373, (8800 << 18, 5373 << 18), 1 << 18)]
	#[case(32, 5, 6, (5, 6), 1)]
	fn origin_and_span(
		#[case] level: u8,
		#[case] x: u32,
		#[case] y: u32,
		#[case] origin: (i64, i64),
		#[case] span: i64,
	) {
		let coord = TileCoord::new(level, x, y).unwrap();
		assert_eq!(coord.origin(), origin);
		assert_eq!(coord.world_span(), span);
	}

	#[test]
	fn parse_and_display() {
		let coord: TileCoord = "14/8800/5373".parse().unwrap();
		assert_eq!(coord, TileCoord::new(14, 8800, 5373).unwrap());
		assert_eq!(coord.to_string(), "14/8800/5373");
		assert_eq!(format!("{coord:?}"), "TileCoord(14, [8800, 5373])");

		assert!("14/8800".parse::<TileCoord>().is_err());
		assert!("a/1/2".parse::<TileCoord>().is_err());
		assert!("2/4/0".parse::<TileCoord>().is_err());
	}
}
