//! The external filter process and the pipes connecting it to us.
//!
//! A filter is run as `sh -c <command> sh <z> <x> <y>`, so the command sees the tile
//! coordinate as `$1`, `$2` and `$3`. Its stdin and stdout are pipes owned by this process,
//! stderr is inherited.

use crate::decode::FilterPosition;
use anyhow::{Context, Error, Result};
use log::{debug, warn};
use std::{
	io::{self, BufWriter, ErrorKind, Write},
	process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio},
	sync::{Mutex, Once, PoisonError},
};
use tilefilter_core::{FatalKind, TileCoord};

/// Serializes pipe creation and process start across all worker threads.
static SPAWN_LOCK: Mutex<()> = Mutex::new(());

/// A running filter process.
///
/// The two pipe ends are handed out once each, to the writer and to the reader. The process
/// must be reaped with [`FilterProcess::wait`] after the reader has seen the end of its output.
pub struct FilterProcess {
	child: Child,
	input: Option<ChildStdin>,
	output: Option<ChildStdout>,
	label: String,
}

impl FilterProcess {
	/// Start `command` for the tile `coord`.
	pub fn spawn(command: &str, coord: &TileCoord) -> Result<FilterProcess> {
		let mut child = {
			let _guard = SPAWN_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
			Command::new("sh")
				.arg("-c")
				.arg(command)
				.arg("sh")
				.arg(coord.level.to_string())
				.arg(coord.x.to_string())
				.arg(coord.y.to_string())
				.stdin(Stdio::piped())
				.stdout(Stdio::piped())
				.stderr(Stdio::inherit())
				.spawn()
				.with_context(|| format!("failed to start filter '{command}' for tile {coord}"))
				.context(FatalKind::Spawn)?
		};

		let label = format!("filter process {} for tile {coord}", child.id());
		debug!("started {label}");

		Ok(FilterProcess {
			input: child.stdin.take(),
			output: child.stdout.take(),
			child,
			label,
		})
	}

	/// The write end of the filter's stdin.
	pub fn take_input(&mut self) -> Result<ChildStdin> {
		self
			.input
			.take()
			.context("filter input was already taken")
			.context(FatalKind::Impossible)
	}

	/// The read end of the filter's stdout.
	pub fn take_output(&mut self) -> Result<ChildStdout> {
		self
			.output
			.take()
			.context("filter output was already taken")
			.context(FatalKind::Impossible)
	}

	/// Kill the filter, e.g. once its output turned out to be unusable. A filter that has
	/// already exited is left alone.
	pub fn kill(&mut self) {
		match self.child.try_wait() {
			Ok(Some(_)) => {}
			_ => {
				if let Err(err) = self.child.kill() {
					debug!("failed to kill {}: {err}", self.label);
				} else {
					debug!("killed {}", self.label);
				}
			}
		}
	}

	/// Block until the filter has exited or was killed by a signal.
	///
	/// A non-zero exit status is not an error; it is only logged.
	pub fn wait(&mut self) -> Result<ExitStatus> {
		let status = self
			.child
			.wait()
			.with_context(|| format!("failed to wait for {}", self.label))
			.context(FatalKind::Spawn)?;
		debug!("{} finished: {status}", self.label);
		Ok(status)
	}
}

fn is_broken_pipe(err: &Error) -> bool {
	err
		.chain()
		.any(|cause| cause.downcast_ref::<io::Error>().is_some_and(|io| io.kind() == ErrorKind::BrokenPipe))
}

static PREFILTER_BROKEN_PIPE: Once = Once::new();
static POSTFILTER_BROKEN_PIPE: Once = Once::new();

fn warn_broken_pipe(position: FilterPosition) {
	let once = match position {
		FilterPosition::Prefilter => &PREFILTER_BROKEN_PIPE,
		FilterPosition::Postfilter => &POSTFILTER_BROKEN_PIPE,
	};
	once.call_once(|| warn!("broken pipe in {position}"));
}

/// Write the filter's input through `write`, then close the pipe.
///
/// A filter may exit without reading all of its input; the resulting broken pipe is not an
/// error and is reported once per position for the lifetime of the process.
pub fn feed_input<W>(input: ChildStdin, position: FilterPosition, write: W) -> Result<()>
where
	W: FnOnce(&mut dyn Write) -> Result<()>,
{
	let mut writer = BufWriter::new(input);
	let result = write(&mut writer).and_then(|()| writer.flush().map_err(Error::from));
	drop(writer);

	match result {
		Ok(()) => Ok(()),
		Err(err) if is_broken_pipe(&err) => {
			warn_broken_pipe(position);
			Ok(())
		}
		Err(err) => Err(err
			.context(format!("failed to write {position} input"))
			.context(FatalKind::Write)),
	}
}
