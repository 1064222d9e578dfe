//! Runs external filter programs over the features of vector tiles.
//!
//! A filter is any shell command that reads newline-delimited GeoJSON Features on stdin and
//! writes GeoJSON Features to stdout. It can run at two positions:
//!
//! - as a **prefilter** on the serialized features of a tile, see
//!   [`pipeline::prefilter_features`]
//! - as a **postfilter** on the assembled layers of a tile, see [`pipeline::filter_layers`]
//!
//! Features coming back from a filter are registered per layer in a [`registry::SegmentLayers`],
//! which collects zoom ranges, feature counts and attribute statistics for the tileset's
//! metadata.

pub mod assemble;
pub mod config;
pub mod decode;
pub mod pipeline;
pub mod process;
pub mod registry;

pub use config::FilterConfig;
pub use decode::{Counting, DecodeOptions, FilterPosition};
pub use registry::{LayerMaps, SegmentLayers};
