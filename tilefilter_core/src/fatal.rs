//! Categories of unrecoverable failures.
//!
//! Library code returns `anyhow::Result` and tags fatal errors by adding a [`FatalKind`] as
//! context. Only the binary turns a tagged error into a process exit, through
//! [`exit_on_error`], using the category's exit code.

use anyhow::Error;
use std::{
	fmt::{self, Display},
	io::Write,
};

/// What went wrong, as far as the process exit status is concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FatalKind {
	/// A pipe or file could not be opened.
	Open,
	/// A pipe could not be closed.
	Close,
	/// Reading from the filter failed.
	Read,
	/// Writing to the filter failed for a reason other than a closed pipe.
	Write,
	/// The filter process could not be started or waited for.
	Spawn,
	/// The writer thread could not be started or joined.
	Thread,
	/// The filter produced JSON that does not describe acceptable features.
	Json,
	/// An internal invariant was violated.
	Impossible,
}

impl FatalKind {
	#[must_use]
	pub fn exit_code(self) -> i32 {
		match self {
			FatalKind::Open => 102,
			FatalKind::Close => 103,
			FatalKind::Read => 104,
			FatalKind::Write => 105,
			FatalKind::Spawn | FatalKind::Thread => 111,
			FatalKind::Json => 113,
			FatalKind::Impossible => 114,
		}
	}

	/// The category attached to `err`, if any.
	#[must_use]
	pub fn of(err: &Error) -> Option<FatalKind> {
		err.downcast_ref::<FatalKind>().copied()
	}
}

impl Display for FatalKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			FatalKind::Open => "cannot open pipe",
			FatalKind::Close => "cannot close pipe",
			FatalKind::Read => "cannot read filter output",
			FatalKind::Write => "cannot write filter input",
			FatalKind::Spawn => "cannot run filter process",
			FatalKind::Thread => "cannot run filter writer thread",
			FatalKind::Json => "malformed filter output",
			FatalKind::Impossible => "internal error",
		})
	}
}

/// Exit code for an error: the tagged category's code, or 1 for untagged errors.
#[must_use]
pub fn exit_code_of(err: &Error) -> i32 {
	FatalKind::of(err).map_or(1, FatalKind::exit_code)
}

/// Unwraps a `Result`, or prints the error chain and terminates the process.
///
/// Every layer of context is written on its own line. The exit status comes from the
/// [`FatalKind`] attached to the error.
pub fn exit_on_error<T>(result: anyhow::Result<T>) -> T {
	match result {
		Ok(value) => value,
		Err(err) => {
			eprintln!("ERROR:");
			for (idx, cause) in err.chain().enumerate() {
				eprintln!("  {idx}: {cause}");
			}
			let _ = std::io::stderr().flush();
			std::process::exit(exit_code_of(&err));
		}
	}
}
