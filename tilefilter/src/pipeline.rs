//! Streaming features through a filter.
//!
//! The filter's input is written on a scoped writer thread while the calling thread reads the
//! filter's output, so neither side can fill a pipe that nobody drains. Every thread and the
//! child process are finished before [`run_filter`] returns.

use crate::{
	decode::{Counting, DecodeOptions, FilterPosition, parse_feature, parse_layers},
	process::{FilterProcess, feed_input},
	registry::SegmentLayers,
};
use anyhow::{Context, Result, anyhow};
use log::trace;
use std::{
	io::Write,
	process::ChildStdout,
	thread,
};
use tilefilter_core::{FatalKind, TileCoord, json::JsonPull};
use tilefilter_geometry::{
	KeyPool, SerialFeature, TileLayer,
	geojson::{FILTER_OUTPUT, encode_serial_feature, encode_tile_feature},
};

/// Run `command` for the tile `coord`, feeding it through `write` and consuming its output with
/// `read`.
///
/// The reader's error takes precedence over a failure to reap the child or a writer error,
/// since a reader that gives up early usually makes the writer fail as well. When the reader
/// fails, the filter is killed instead of waiting for it to finish on its own.
pub fn run_filter<T, W, R>(command: &str, coord: &TileCoord, position: FilterPosition, write: W, read: R) -> Result<T>
where
	W: FnOnce(&mut dyn Write) -> Result<()> + Send,
	R: FnOnce(ChildStdout) -> Result<T>,
{
	let mut process = FilterProcess::spawn(command, coord)?;
	let input = process.take_input()?;
	let output = process.take_output()?;

	thread::scope(|scope| {
		let writer = thread::Builder::new()
			.name(format!("{position} writer"))
			.spawn_scoped(scope, move || feed_input(input, position, write))
			.context("failed to start the filter writer")
			.context(FatalKind::Thread)?;

		let result = read(output);
		if result.is_err() {
			process.kill();
		}
		let status = process.wait();
		let written = writer
			.join()
			.map_err(|_| anyhow!("the {position} writer panicked"))
			.context(FatalKind::Thread)?;

		let value = result?;
		status?;
		written?;
		Ok(value)
	})
}

fn write_line(out: &mut dyn Write, line: &str) -> Result<()> {
	out.write_all(line.as_bytes())?;
	out.write_all(b"\n")?;
	Ok(())
}

/// Encode serial features, one GeoJSON line each. `layer_names` is indexed by layer id.
pub fn write_serial_features(
	out: &mut dyn Write,
	features: &[SerialFeature],
	layer_names: &[String],
	coord: &TileCoord,
) -> Result<()> {
	for feature in features {
		let name = layer_names
			.get(feature.layer as usize)
			.ok_or_else(|| anyhow!("layer {} not found", feature.layer))
			.context(FatalKind::Impossible)?;
		match encode_serial_feature(feature, name, coord) {
			Some(line) => write_line(out, &line)?,
			None => trace!("not writing feature without geometry"),
		}
	}
	Ok(())
}

/// Encode the features of tile layers, one GeoJSON line each.
pub fn write_tile_layers(out: &mut dyn Write, layers: &[TileLayer], coord: &TileCoord) -> Result<()> {
	for layer in layers {
		for feature in &layer.features {
			if let Some(line) = encode_tile_feature(layer, feature, coord)? {
				write_line(out, &line)?;
			}
		}
	}
	Ok(())
}

/// Run the serial features of one tile through a prefilter.
///
/// Decoded features are registered in `segment` and counted there as `counting` says; use
/// [`Counting::Defer`] when a postfilter will count the tile's layers. Keys are interned in
/// `key_pool`. The result is in the order the filter wrote it.
pub fn prefilter_features(
	command: &str,
	coord: &TileCoord,
	features: &[SerialFeature],
	segment: &mut SegmentLayers,
	key_pool: &KeyPool,
	counting: Counting,
	options: DecodeOptions,
) -> Result<Vec<SerialFeature>> {
	// the reader registers new layers while the writer still needs the old names
	let layer_names = segment.layer_names().to_vec();

	run_filter(
		command,
		coord,
		FilterPosition::Prefilter,
		|out| write_serial_features(out, features, &layer_names, coord),
		|output| {
			let mut pull = JsonPull::from_reader(output, FILTER_OUTPUT);
			let mut result = Vec::new();
			while let Some(feature) =
				parse_feature(&mut pull, coord, segment, key_pool, counting, options)?
			{
				result.push(feature);
			}
			Ok(result)
		},
	)
	.with_context(|| format!("while running the prefilter for tile {coord}"))
}

/// Run the assembled layers of one tile through a postfilter and regroup its output into
/// layers of `extent` units, accounted for in `segment`.
pub fn filter_layers(
	command: &str,
	layers: &[TileLayer],
	coord: &TileCoord,
	segment: &mut SegmentLayers,
	extent: u32,
) -> Result<Vec<TileLayer>> {
	run_filter(
		command,
		coord,
		FilterPosition::Postfilter,
		|out| write_tile_layers(out, layers, coord),
		|output| parse_layers(&mut JsonPull::from_reader(output, FILTER_OUTPUT), coord, extent, segment),
	)
	.with_context(|| format!("while running the postfilter for tile {coord}"))
}
