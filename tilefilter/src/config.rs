//! Filter configuration, read from YAML.
//!
//! # Example YAML
//! ```yaml
//! prefilter: "grep -v '\"highway\":\"service\"'"
//! postfilter: "cat"
//! geometry_scale: 2
//! extent: 4096
//! segments: 4
//! ```

use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
};
use tilefilter_core::types::MAX_LEVEL;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
	/// Shell command run on the serialized features of each tile
	#[serde(default)]
	pub prefilter: Option<String>,

	/// Shell command run on the assembled layers of each tile
	#[serde(default)]
	pub postfilter: Option<String>,

	/// Serial coordinates are rounded to multiples of `2^geometry_scale` world units
	/// Defaults to 0
	#[serde(default)]
	pub geometry_scale: u8,

	/// Coordinate units per tile edge of the assembled layers
	/// Defaults to 4096
	#[serde(default = "default_extent")]
	pub extent: u32,

	/// Number of tiling segments, i.e. worker threads
	/// Defaults to the number of CPUs, at most one per tile
	#[serde(default)]
	pub segments: Option<usize>,
}

fn default_extent() -> u32 {
	4096
}

impl Default for FilterConfig {
	fn default() -> Self {
		Self {
			prefilter: None,
			postfilter: None,
			geometry_scale: 0,
			extent: default_extent(),
			segments: None,
		}
	}
}

impl FilterConfig {
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		let config: FilterConfig = serde_yaml_ng::from_reader(reader)?;
		config.validate()?;
		Ok(config)
	}

	pub fn from_string(text: &str) -> Result<Self> {
		let config: FilterConfig = serde_yaml_ng::from_str(text)?;
		config.validate()?;
		Ok(config)
	}

	pub fn from_path(path: &Path) -> Result<Self> {
		let file = File::open(path).with_context(|| format!("failed to open config file {path:?}"))?;
		FilterConfig::from_reader(BufReader::new(file)).with_context(|| format!("failed to parse config file {path:?}"))
	}

	/// Check value ranges.
	pub fn validate(&self) -> Result<()> {
		ensure!(
			self.geometry_scale < MAX_LEVEL,
			"geometry_scale ({}) must be < {MAX_LEVEL}",
			self.geometry_scale
		);
		ensure!(self.extent > 0, "extent must be positive");
		ensure!(self.segments != Some(0), "segments must be positive");
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;
	use std::io::Write;

	#[test]
	fn defaults() {
		let config = FilterConfig::from_string("{}").unwrap();
		assert_eq!(config, FilterConfig::default());
		assert_eq!(config.extent, 4096);
		assert_eq!(config.geometry_scale, 0);
	}

	#[test]
	fn full_config() {
		let config = FilterConfig::from_string(
			r#"
prefilter: "grep -v water"
postfilter: cat
geometry_scale: 3
extent: 512
segments: 2
"#,
		)
		.unwrap();
		assert_eq!(config.prefilter.as_deref(), Some("grep -v water"));
		assert_eq!(config.postfilter.as_deref(), Some("cat"));
		assert_eq!((config.geometry_scale, config.extent, config.segments), (3, 512, Some(2)));
	}

	#[test]
	fn rejects_unknown_fields() {
		let err = FilterConfig::from_string("prefilter: cat\nfilter: cat\n").unwrap_err();
		assert!(err.to_string().contains("unknown field `filter`"), "{err}");
	}

	#[test]
	fn rejects_bad_values() {
		assert!(FilterConfig::from_string("extent: 0").is_err());
		assert!(FilterConfig::from_string("geometry_scale: 40").is_err());
		assert!(FilterConfig::from_string("segments: 0").is_err());
	}

	#[test]
	fn from_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "postfilter: cat").unwrap();
		let config = FilterConfig::from_path(file.path()).unwrap();
		assert_eq!(config.postfilter.as_deref(), Some("cat"));

		let err = FilterConfig::from_path(Path::new("/does/not/exist.yaml")).unwrap_err();
		assert!(err.to_string().starts_with("failed to open config file"));
	}
}
