//! Path drawing operations.
//!
//! A geometry is a sequence of [`Draw`]s. Polygon rings come in two conventions:
//! - serial form: `MoveTo, LineTo.., LineTo(first point)`, explicitly closed, no `ClosePath`
//! - tile form: `MoveTo, LineTo.., ClosePath`, the closing vertex is implicit

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawOp {
	MoveTo,
	LineTo,
	ClosePath,
}

/// One drawing operation with integer coordinates.
///
/// The coordinates of a `ClosePath` are meaningless and kept at zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Draw {
	pub op: DrawOp,
	pub x: i64,
	pub y: i64,
}

pub type DrawVec = Vec<Draw>;

impl Draw {
	#[must_use]
	pub fn new(op: DrawOp, x: i64, y: i64) -> Self {
		Self { op, x, y }
	}

	#[must_use]
	pub fn move_to(x: i64, y: i64) -> Self {
		Self::new(DrawOp::MoveTo, x, y)
	}

	#[must_use]
	pub fn line_to(x: i64, y: i64) -> Self {
		Self::new(DrawOp::LineTo, x, y)
	}

	#[must_use]
	pub fn close_path() -> Self {
		Self::new(DrawOp::ClosePath, 0, 0)
	}

	/// Whether this operation carries a vertex.
	#[must_use]
	pub fn is_vertex(&self) -> bool {
		self.op != DrawOp::ClosePath
	}
}

/// A drawing operation in fractional world coordinates, before rounding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawDraw {
	pub op: DrawOp,
	pub x: f64,
	pub y: f64,
}

impl RawDraw {
	#[must_use]
	pub fn new(op: DrawOp, x: f64, y: f64) -> Self {
		Self { op, x, y }
	}
}

/// `[min_x, min_y, max_x, max_y]` over the vertices of `draws`, or `None` without vertices.
#[must_use]
pub fn bbox(draws: &[Draw]) -> Option<[i64; 4]> {
	draws.iter().filter(|d| d.is_vertex()).fold(None, |acc, d| {
		Some(match acc {
			None => [d.x, d.y, d.x, d.y],
			Some([x0, y0, x1, y1]) => [x0.min(d.x), y0.min(d.y), x1.max(d.x), y1.max(d.y)],
		})
	})
}
