//! GeoJSON Feature codec.
//!
//! Features travel as one compact JSON object per line. Besides the standard members, each
//! object carries a `tippecanoe` block with the target layer and provenance fields:
//!
//! ```text
//! {"type":"Feature","id":7,"geometry":{..},"properties":{..},"tippecanoe":{"layer":"roads","index":3,"sequence":12}}
//! ```

mod decode;
mod encode;

pub use decode::*;
pub use encode::*;
