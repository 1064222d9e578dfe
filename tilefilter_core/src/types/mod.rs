mod tile_coord;

pub use tile_coord::{MAX_LEVEL, TileCoord};
