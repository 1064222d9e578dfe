//! Geometry and feature model of tilefilter.
//!
//! Features live in two shapes: [`SerialFeature`] records, whose coordinates are world units
//! relative to the tile origin, and [`TileLayer`]s of [`TileFeature`]s, whose coordinates are
//! layer extent units. The [`geojson`] module converts both to and from GeoJSON Feature objects
//! with the `tippecanoe` extension block.

mod draw;
mod feature;
mod geom_type;
pub mod geojson;
mod intern_table;
mod key_pool;
mod layer;
pub mod polygon;
pub mod projection;
pub mod transform;
mod value;

pub use draw::*;
pub use feature::*;
pub use geom_type::*;
pub use intern_table::InternTable;
pub use key_pool::KeyPool;
pub use layer::*;
pub use value::TileValue;
