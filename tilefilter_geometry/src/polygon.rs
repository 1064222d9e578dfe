//! Polygon ring closure and orientation.
//!
//! Orientation is measured in world or tile space, where y grows downwards: an outer ring has
//! a positive [`area_ring`], a hole a negative one.

use crate::{Draw, DrawOp, DrawVec};

/// Twice the signed area of a ring of `[x, y]` points. The ring may be open or closed.
#[must_use]
pub fn area_ring(ring: &[[f64; 2]]) -> f64 {
	let Some(mut p2) = ring.last() else {
		return 0.0;
	};
	let mut sum = 0f64;
	for p1 in ring {
		sum += (p2[0] - p1[0]) * (p1[1] + p2[1]);
		p2 = p1;
	}
	sum
}

fn ring_area(ring: &[Draw]) -> f64 {
	let points: Vec<[f64; 2]> = ring.iter().map(|d| [d.x as f64, d.y as f64]).collect();
	area_ring(&points)
}

/// Close and orient the rings of a polygon geometry.
///
/// The input is a sequence of rings, each starting with a `MoveTo`; a `ClosePath` marks the
/// end of one polygon so that the next ring is treated as an outer ring again. The output has
/// every ring in serial form, the first ring of each polygon with positive area and the
/// following rings with negative area. Rings with fewer than three points are dropped.
#[must_use]
pub fn fix_polygon(draws: &[Draw]) -> DrawVec {
	let mut out = DrawVec::with_capacity(draws.len() + 4);
	let mut outer = true;
	let mut i = 0;

	while i < draws.len() {
		match draws[i].op {
			DrawOp::ClosePath => {
				outer = true;
				i += 1;
			}
			DrawOp::LineTo => i += 1,
			DrawOp::MoveTo => {
				let mut j = i + 1;
				while j < draws.len() && draws[j].op == DrawOp::LineTo {
					j += 1;
				}

				let mut ring: DrawVec = draws[i..j].to_vec();
				let first = ring[0];
				let last = ring[ring.len() - 1];
				if (first.x, first.y) != (last.x, last.y) {
					ring.push(Draw::line_to(first.x, first.y));
				}

				if ring.len() >= 3 {
					let area = ring_area(&ring);
					if (outer && area < 0.0) || (!outer && area > 0.0) {
						ring.reverse();
					}
					for (k, d) in ring.iter().enumerate() {
						let op = if k == 0 { DrawOp::MoveTo } else { DrawOp::LineTo };
						out.push(Draw::new(op, d.x, d.y));
					}
					outer = false;
				}
				i = j;
			}
		}
	}
	out
}

/// Convert serial-form rings into tile form: the closing vertex becomes a `ClosePath`.
#[must_use]
pub fn to_tile_rings(draws: &[Draw]) -> DrawVec {
	let mut out = DrawVec::with_capacity(draws.len());
	let mut i = 0;
	while i < draws.len() {
		if draws[i].op != DrawOp::MoveTo {
			i += 1;
			continue;
		}
		let mut j = i + 1;
		while j < draws.len() && draws[j].op == DrawOp::LineTo {
			j += 1;
		}
		let ring = &draws[i..j];
		let first = ring[0];
		let last = ring[ring.len() - 1];
		let end = if ring.len() > 1 && (first.x, first.y) == (last.x, last.y) {
			ring.len() - 1
		} else {
			ring.len()
		};
		out.extend_from_slice(&ring[..end]);
		out.push(Draw::close_path());
		i = j;
	}
	out
}
