//! A byte-level iterator over a reader source with line tracking and optional debug support.
//!
//! `ByteIterator` reads from any `std::io::Read` through a fixed buffer. It supports peeking at the
//! next byte, advancing, and consuming bytes one by one, and it keeps track of the line number of
//! the peeked byte so that parse errors on a line-oriented stream can be reported by line.
//!
//! Read failures of the underlying source end the stream like EOF does; the error itself is kept
//! and can be retrieved with [`ByteIterator::take_read_error`], so callers can tell a clean end of
//! input from a broken one.
//!
//! When debug mode is enabled, a ring buffer of recently read bytes is kept for error messages.

use anyhow::{Error, Result, anyhow};
use std::io::{ErrorKind, Read};

const DEBUG_RING_BUFFER_SIZE: usize = 64;
const BUFFER_SIZE: usize = 4096;

/// An iterator over bytes from a reader source with support for peeking, consuming, and error reporting.
pub struct ByteIterator<'a> {
	buffer: [u8; BUFFER_SIZE],
	buffer_len: usize,
	buffer_pos: usize,
	source: Box<dyn Read + 'a>,
	peeked_byte: Option<u8>,
	position: usize,
	line: usize,
	read_error: Option<std::io::Error>,
	is_debug_enabled: bool,
	debug_buffer: [u8; DEBUG_RING_BUFFER_SIZE],
}

impl<'a> ByteIterator<'a> {
	/// Creates a new `ByteIterator` from a reader source.
	///
	/// `debug` enables a ring buffer of recently read bytes that is appended to error messages.
	pub fn from_reader(reader: impl Read + 'a, debug: bool) -> Self {
		let mut instance = ByteIterator {
			buffer: [0; BUFFER_SIZE],
			buffer_len: 0,
			buffer_pos: 0,
			source: Box::new(reader),
			peeked_byte: None,
			position: 0,
			line: 1,
			read_error: None,
			is_debug_enabled: debug,
			debug_buffer: [0; DEBUG_RING_BUFFER_SIZE],
		};
		instance.fill_buffer();
		instance.advance();
		instance
	}

	#[inline]
	fn fill_buffer(&mut self) {
		self.buffer_pos = 0;
		self.buffer_len = 0;
		if self.read_error.is_some() {
			return;
		}
		loop {
			match self.source.read(&mut self.buffer) {
				Ok(len) => {
					self.buffer_len = len;
					return;
				}
				Err(err) if err.kind() == ErrorKind::Interrupted => {}
				Err(err) => {
					self.read_error = Some(err);
					return;
				}
			}
		}
	}

	#[inline]
	fn next_byte(&mut self) -> Option<u8> {
		if self.buffer_pos >= self.buffer_len {
			self.fill_buffer();
			if self.buffer_len == 0 {
				return None;
			}
		}
		let byte = self.buffer[self.buffer_pos];
		self.buffer_pos += 1;
		Some(byte)
	}

	/// Returns the most recent bytes from the debug ring buffer, lossily decoded.
	#[must_use]
	pub fn debug_snapshot(&self) -> String {
		if !self.is_debug_enabled {
			return String::new();
		}
		let consumed = self.position.saturating_sub(1);
		let (start_index, length) = if consumed < DEBUG_RING_BUFFER_SIZE {
			(0, consumed)
		} else {
			(consumed % DEBUG_RING_BUFFER_SIZE, DEBUG_RING_BUFFER_SIZE)
		};

		let bytes: Vec<u8> = self
			.debug_buffer
			.iter()
			.cycle()
			.skip(start_index)
			.take(length)
			.copied()
			.collect();

		let mut snapshot = String::from_utf8_lossy(&bytes).into_owned();
		if self.peeked_byte.is_none() {
			snapshot.push_str("<EOF>");
		}
		snapshot
	}

	/// Formats an error message including the current line, byte position and, in debug mode,
	/// a snapshot of the most recently read bytes.
	#[must_use]
	pub fn format_error(&self, msg: &str) -> Error {
		let position = self.position.saturating_sub(1);
		if self.is_debug_enabled {
			anyhow!(
				"{msg} at line {}, position {position}: {}",
				self.line,
				self.debug_snapshot()
			)
		} else {
			anyhow!("{msg} at line {}, position {position}", self.line)
		}
	}

	/// Returns the current absolute position in the byte stream.
	#[inline]
	#[must_use]
	pub fn position(&self) -> usize {
		self.position
	}

	/// Returns the 1-based line number of the peeked byte.
	#[inline]
	#[must_use]
	pub fn line(&self) -> usize {
		self.line
	}

	/// Takes the error that ended the stream early, if reading the source failed.
	pub fn take_read_error(&mut self) -> Option<std::io::Error> {
		self.read_error.take()
	}

	/// Peeks at the next byte without consuming it.
	#[inline]
	#[must_use]
	pub fn peek(&self) -> Option<u8> {
		self.peeked_byte
	}

	/// Advances the iterator to the next byte, updating the line counter and debug buffer.
	#[inline]
	pub fn advance(&mut self) {
		if self.peeked_byte == Some(b'\n') {
			self.line += 1;
		}
		self.peeked_byte = self.next_byte();
		if self.is_debug_enabled
			&& let Some(byte) = self.peeked_byte
		{
			let index = self.position % DEBUG_RING_BUFFER_SIZE;
			self.debug_buffer[index] = byte;
		}
		self.position += 1;
	}

	/// Consumes and returns the current peeked byte, advancing the iterator.
	#[inline]
	pub fn consume(&mut self) -> Option<u8> {
		let current_byte = self.peeked_byte;
		self.advance();
		current_byte
	}

	/// Expects and returns the next byte, advancing the iterator.
	///
	/// # Errors
	///
	/// Returns an error if the end of the stream is reached unexpectedly.
	#[inline]
	pub fn expect_next_byte(&mut self) -> Result<u8> {
		if let Some(current_byte) = self.peeked_byte {
			self.advance();
			Ok(current_byte)
		} else {
			Err(self.format_error("unexpected end"))
		}
	}

	/// Returns the current peeked byte without advancing.
	///
	/// # Errors
	///
	/// Returns an error if the end of the stream is reached unexpectedly.
	#[inline]
	pub fn expect_peeked_byte(&self) -> Result<u8> {
		self.peeked_byte.ok_or_else(|| self.format_error("unexpected end"))
	}

	/// Skips over any ASCII whitespace bytes.
	pub fn skip_whitespace(&mut self) {
		while let Some(byte) = self.peek() {
			if !byte.is_ascii_whitespace() {
				break;
			}
			self.advance();
		}
	}
}
