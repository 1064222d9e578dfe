//! Spherical Mercator projection onto a square world of 2^32 units per axis.
//!
//! World x grows eastwards from the antimeridian, world y grows southwards from the
//! northern edge of the Mercator square.

use std::f64::consts::PI;

/// Edge length of the world plane.
pub const WORLD_SIZE: f64 = 4_294_967_296.0;

const MAX_LAT: f64 = 89.9;
const MAX_LON: f64 = 360.0;

/// Project longitude/latitude in degrees onto the world plane, without rounding.
///
/// Latitude is clamped to ±89.9° and longitude to ±360°, which places such points beyond the
/// edge of the plane. Non-finite coordinates are moved to that outer edge as well.
#[must_use]
pub fn lonlat_to_world(lon: f64, lat: f64) -> (f64, f64) {
	let lat = if lat.is_finite() { lat.clamp(-MAX_LAT, MAX_LAT) } else { MAX_LAT };
	let lon = if lon.is_finite() { lon.clamp(-MAX_LON, MAX_LON) } else { MAX_LON };

	let lat_rad = lat.to_radians();
	let x = WORLD_SIZE * ((lon + 180.0) / 360.0);
	let y = WORLD_SIZE * (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
	(x, y)
}

/// Inverse of [`lonlat_to_world`].
#[must_use]
pub fn world_to_lonlat(x: f64, y: f64) -> (f64, f64) {
	let lon = x / WORLD_SIZE * 360.0 - 180.0;
	let lat = (PI * (1.0 - 2.0 * y / WORLD_SIZE)).sinh().atan().to_degrees();
	(lon, lat)
}
