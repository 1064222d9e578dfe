//! JSON values with preserved member order, a recursive parser, a streaming pull reader and a
//! compact stringifier.

mod parse;
mod pull;
mod stringify;
mod types;

pub use parse::{parse_json_iter, parse_json_str};
pub use pull::JsonPull;
pub use stringify::*;
pub use types::{JsonArray, JsonNumber, JsonObject, JsonValue};
