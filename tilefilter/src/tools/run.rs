use anyhow::{Context, Result, anyhow};
use clap::Args;
use log::{debug, info};
use std::{
	fs,
	io::{Cursor, Write},
	path::PathBuf,
	thread,
};
use tilefilter::{
	DecodeOptions, FilterConfig, LayerMaps, SegmentLayers,
	assemble::assemble_layers,
	decode::{Counting, read_serial_features, read_tile_layers, record_layers},
	pipeline::{filter_layers, prefilter_features, write_tile_layers},
};
use tilefilter_core::{FatalKind, TileCoord, exit_on_error};
use tilefilter_geometry::KeyPool;

#[derive(Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// newline-delimited GeoJSON features in longitude/latitude
	#[arg(required = true)]
	input: PathBuf,

	/// tiles to generate, as z/x/y
	#[arg(required = true, num_args = 1..)]
	tiles: Vec<TileCoord>,

	/// YAML configuration file, flags override its values
	#[arg(long, short)]
	config: Option<PathBuf>,

	/// shell command run on the serialized features of every tile
	#[arg(long)]
	prefilter: Option<String>,

	/// shell command run on the assembled layers of every tile
	#[arg(long)]
	postfilter: Option<String>,

	/// round serial coordinates to multiples of 2^N world units
	#[arg(long, value_name = "N")]
	geometry_scale: Option<u8>,

	/// coordinate units per tile edge
	#[arg(long, value_name = "N")]
	extent: Option<u32>,

	/// number of worker threads, each with its own layer registry
	#[arg(long, value_name = "N")]
	segments: Option<usize>,

	/// write the merged layer metadata as JSON to this file
	#[arg(long, short)]
	metadata: Option<PathBuf>,
}

impl Subcommand {
	fn config(&self) -> Result<FilterConfig> {
		let mut config = match &self.config {
			Some(path) => FilterConfig::from_path(path)?,
			None => FilterConfig::default(),
		};
		if let Some(prefilter) = &self.prefilter {
			config.prefilter = Some(prefilter.clone());
		}
		if let Some(postfilter) = &self.postfilter {
			config.postfilter = Some(postfilter.clone());
		}
		if let Some(geometry_scale) = self.geometry_scale {
			config.geometry_scale = geometry_scale;
		}
		if let Some(extent) = self.extent {
			config.extent = extent;
		}
		if self.segments.is_some() {
			config.segments = self.segments;
		}
		config.validate()?;
		Ok(config)
	}
}

/// Generate one tile and return its features as GeoJSON lines.
///
/// Every feature is counted by exactly one stage: the postfilter if there is one, otherwise the
/// prefilter, otherwise the assembled layers are counted directly.
fn process_tile(
	coord: &TileCoord,
	input: &[u8],
	segment: &mut SegmentLayers,
	key_pool: &KeyPool,
	config: &FilterConfig,
) -> Result<String> {
	debug!("processing tile {coord} in segment {}", segment.index());
	let options = DecodeOptions {
		geometry_scale: config.geometry_scale,
	};

	let mut layers = match &config.prefilter {
		Some(command) => {
			let features = read_serial_features(Cursor::new(input), coord, segment, key_pool, options)?;
			let counting = if config.postfilter.is_some() {
				Counting::Defer
			} else {
				Counting::Record
			};
			let features = prefilter_features(command, coord, &features, segment, key_pool, counting, options)?;
			assemble_layers(&features, segment, coord, config.extent)?
		}
		None => read_tile_layers(Cursor::new(input), coord, config.extent)?,
	};

	match &config.postfilter {
		Some(command) => layers = filter_layers(command, &layers, coord, segment, config.extent)?,
		None if config.prefilter.is_none() => record_layers(&layers, coord, segment)?,
		None => {}
	}

	let mut out = Vec::new();
	write_tile_layers(&mut out, &layers, coord)?;
	Ok(String::from_utf8(out)?)
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let config = arguments.config()?;
	let tiles = &arguments.tiles;
	let input = fs::read(&arguments.input)
		.with_context(|| format!("failed to read {:?}", arguments.input))
		.context(FatalKind::Open)?;

	let segment_count = config.segments.unwrap_or_else(num_cpus::get).clamp(1, tiles.len().max(1));
	info!("processing {} tiles with {segment_count} workers", tiles.len());

	let mut maps = LayerMaps::new(segment_count);
	let key_pool = KeyPool::new();

	let mut outputs = thread::scope(|scope| -> Result<Vec<(usize, String)>> {
		let input = &input;
		let key_pool = &key_pool;
		let config = &config;

		let handles: Vec<_> = maps
			.iter_mut()
			.map(|segment| {
				scope.spawn(move || {
					let mut lines = Vec::new();
					for (n, coord) in tiles.iter().enumerate().skip(segment.index()).step_by(segment_count) {
						// a fatal error ends the whole run, the other workers are not waited for
						let text = exit_on_error(
							process_tile(coord, input, segment, key_pool, config)
								.with_context(|| format!("while processing tile {coord}")),
						);
						lines.push((n, text));
					}
					lines
				})
			})
			.collect();

		let mut outputs = Vec::new();
		for handle in handles {
			let lines = handle
				.join()
				.map_err(|_| anyhow!("a tile worker panicked"))
				.context(FatalKind::Thread)?;
			outputs.extend(lines);
		}
		Ok(outputs)
	})?;
	outputs.sort_by_key(|(n, _)| *n);

	let mut stdout = std::io::stdout().lock();
	for (_, text) in &outputs {
		stdout.write_all(text.as_bytes())?;
	}
	stdout.flush()?;

	let metadata = maps.to_json().stringify();
	match &arguments.metadata {
		Some(path) => fs::write(path, metadata).with_context(|| format!("failed to write metadata to {path:?}"))?,
		None => info!("layer metadata: {metadata}"),
	}
	Ok(())
}
