//! Shared building blocks of the tilefilter workspace.
//!
//! - [`byte_iterator`]: a buffered byte reader with peeking, line tracking and a debug ring
//!   buffer, plus small JSON token parsers built on top of it.
//! - [`json`]: an order-preserving JSON value model, a pull parser that yields one top-level
//!   value at a time from a stream, and a compact stringifier.
//! - [`types`]: tile coordinates.
//! - [`fatal`]: categories of unrecoverable failures and their process exit codes.

pub mod byte_iterator;
pub mod fatal;
pub mod json;
pub mod types;

pub use fatal::{FatalKind, exit_code_of, exit_on_error};
pub use types::TileCoord;
