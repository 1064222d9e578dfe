//! Byte-level iteration over any `std::io::Read` source, and the JSON token parsers built on it.

mod basics;
mod iterator;

pub use basics::*;
pub use iterator::*;
