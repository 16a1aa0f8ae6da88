// Copyright 2023 Strixpyrr
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! [`BufferedSource`] and [`BufferedSink`] decorate a raw [`Source`]/[`Sink`]
//! with an internal [`Buffer`], so callers can `require` lookahead, decode
//! structured values, and `select` against [`Options`] without managing
//! buffering themselves.

use crate::buffer::Buffer;
use crate::byte_string::ByteString;
use crate::error::{Error, Result};
use crate::options::{Options, SelectResult};
use crate::segment::SEGMENT_SIZE;
use super::{Sink, Source};

/// Wraps a [`Source`] with read-ahead buffering.
pub struct BufferedSource<S: Source> {
	source: Option<S>,
	buffer: Buffer,
	closed: bool,
}

impl<S: Source> BufferedSource<S> {
	pub fn new(source: S) -> Self {
		Self { source: Some(source), buffer: Buffer::new(), closed: false }
	}

	/// Direct access to the internal buffer, e.g. to inspect bytes already
	/// read ahead without triggering another fill.
	pub fn buffer(&self) -> &Buffer { &self.buffer }

	fn fill_once(&mut self) -> Result<bool> {
		if self.closed {
			return Err(Error::ClosedStream);
		}
		let source = self.source.as_mut().ok_or(Error::ClosedStream)?;
		Ok(source.read(&mut self.buffer, SEGMENT_SIZE as u64)?.is_some())
	}

	/// Ensures at least `byte_count` bytes are buffered, failing with
	/// `EndOfInput` if the source runs out first.
	pub fn require(&mut self, byte_count: u64) -> Result<()> {
		while self.buffer.len() < byte_count {
			if !self.fill_once()? {
				return Err(Error::EndOfInput);
			}
		}
		Ok(())
	}

	/// Like [`BufferedSource::require`], but reports insufficiency instead
	/// of failing.
	pub fn request(&mut self, byte_count: u64) -> Result<bool> {
		while self.buffer.len() < byte_count {
			if !self.fill_once()? {
				return Ok(false);
			}
		}
		Ok(true)
	}

	pub fn exhausted(&mut self) -> Result<bool> {
		Ok(!self.request(1)?)
	}

	pub fn read_byte(&mut self) -> Result<u8> { self.require(1)?; self.buffer.read_byte() }
	pub fn read_short_be(&mut self) -> Result<u16> { self.require(2)?; self.buffer.read_short_be() }
	pub fn read_short_le(&mut self) -> Result<u16> { self.require(2)?; self.buffer.read_short_le() }
	pub fn read_int_be(&mut self) -> Result<u32> { self.require(4)?; self.buffer.read_int_be() }
	pub fn read_int_le(&mut self) -> Result<u32> { self.require(4)?; self.buffer.read_int_le() }
	pub fn read_long_be(&mut self) -> Result<u64> { self.require(8)?; self.buffer.read_long_be() }
	pub fn read_long_le(&mut self) -> Result<u64> { self.require(8)?; self.buffer.read_long_le() }

	pub fn read_to_vec(&mut self, byte_count: usize) -> Result<Vec<u8>> {
		self.require(byte_count as u64)?;
		self.buffer.read_to_vec(byte_count)
	}

	/// Reads `byte_count` bytes as an immutable, independently-owned
	/// [`ByteString`].
	pub fn read_byte_string(&mut self, byte_count: usize) -> Result<ByteString> {
		Ok(ByteString::of(self.read_to_vec(byte_count)?))
	}

	/// Fills `dst` entirely, pulling from the underlying source as needed.
	/// On `EndOfInput`, whatever bytes were available are still copied into
	/// the front of `dst` before the error propagates.
	pub fn read_fully(&mut self, dst: &mut [u8]) -> Result<()> {
		let _ = self.request(dst.len() as u64)?;
		self.buffer.read_all(dst)
	}

	/// Reads exactly `byte_count` bytes into `sink`, a move rather than a
	/// copy of whatever's already staged.
	pub fn read_fully_into(&mut self, sink: &mut Buffer, byte_count: u64) -> Result<()> {
		self.require(byte_count)?;
		sink.write_from(&mut self.buffer, byte_count)
	}

	/// Drains the underlying source entirely into `sink`, returning the
	/// total byte count moved.
	pub fn read_all(&mut self, sink: &mut Buffer) -> Result<u64> {
		let mut total = self.buffer.len();
		sink.write_from(&mut self.buffer, total)?;
		while self.fill_once()? {
			let n = self.buffer.len();
			sink.write_from(&mut self.buffer, n)?;
			total += n;
		}
		Ok(total)
	}

	/// Discards `byte_count` bytes from the front, pulling from the
	/// underlying source as needed.
	pub fn skip(&mut self, byte_count: u64) -> Result<()> {
		self.require(byte_count)?;
		self.buffer.skip(byte_count)
	}

	pub fn read_utf8(&mut self, byte_count: usize) -> Result<String> {
		self.require(byte_count as u64)?;
		self.buffer.read_utf8(byte_count)
	}

	/// Reads until the source is exhausted and decodes everything as UTF-8.
	pub fn read_utf8_all(&mut self) -> Result<String> {
		while self.fill_once()? {}
		self.buffer.read_utf8_all()
	}

	pub fn read_utf8_code_point(&mut self) -> Result<char> {
		self.require(1)?;
		// A code point may need up to 4 bytes; best-effort top-up, but don't
		// fail if the stream ends mid-sequence (the decoder substitutes).
		let _ = self.request(4)?;
		self.buffer.read_utf8_code_point()
	}

	pub fn read_utf8_line(&mut self) -> Result<Option<String>> {
		loop {
			if self.buffer.index_of(b'\n', 0).is_some() {
				return self.buffer.read_utf8_line();
			}
			if !self.fill_once()? {
				return self.buffer.read_utf8_line();
			}
		}
	}

	pub fn read_utf8_line_strict(&mut self, limit: Option<u64>) -> Result<String> {
		loop {
			if let Some(idx) = self.buffer.index_of(b'\n', 0) {
				if limit.map_or(true, |l| idx <= l) {
					return self.buffer.read_utf8_line_strict(limit);
				}
				return Err(Error::invalid_argument("line exceeds limit"));
			}
			if !self.fill_once()? {
				return Err(Error::EndOfInput);
			}
		}
	}

	/// Pulls only until the whole digit run is buffered (a non-digit byte is
	/// seen, or the source is exhausted), then parses — never drains a
	/// long-lived or never-ending `Source` to EOF just to find a number that
	/// was already complete and unambiguous in the buffer.
	pub fn read_decimal_long(&mut self) -> Result<i64> {
		self.require(1)?;
		let mut i: u64 = if self.buffer.get(0)? == b'-' { 1 } else { 0 };
		loop {
			if i < self.buffer.len() {
				if self.buffer.get(i)?.is_ascii_digit() {
					i += 1;
					continue;
				}
				break;
			}
			if !self.fill_once()? {
				break;
			}
		}
		self.buffer.read_decimal_long()
	}

	/// See [`Self::read_decimal_long`]: pulls only until a non-hex-digit
	/// byte is seen or the source is exhausted.
	pub fn read_hexadecimal_unsigned_long(&mut self) -> Result<u64> {
		self.require(1)?;
		let mut i: u64 = 0;
		loop {
			if i < self.buffer.len() {
				if self.buffer.get(i)?.is_ascii_hexdigit() {
					i += 1;
					continue;
				}
				break;
			}
			if !self.fill_once()? {
				break;
			}
		}
		self.buffer.read_hexadecimal_unsigned_long()
	}

	pub fn index_of(&mut self, byte: u8, from: u64) -> Result<Option<u64>> {
		loop {
			if let Some(idx) = self.buffer.index_of(byte, from) {
				return Ok(Some(idx));
			}
			if !self.fill_once()? {
				return Ok(None);
			}
		}
	}

	/// The first index at or after `from` where `needle` occurs, pulling
	/// more bytes from the underlying source as needed.
	pub fn index_of_bytes(&mut self, needle: &ByteString, from: u64) -> Result<Option<u64>> {
		loop {
			if self.buffer.len() >= from + needle.len() as u64 {
				if let Some(idx) = self.buffer.index_of_bytes(needle, from) {
					return Ok(Some(idx));
				}
			}
			if !self.fill_once()? {
				return Ok(self.buffer.index_of_bytes(needle, from));
			}
		}
	}

	/// The first index at or after `from` holding any byte in `targets`,
	/// pulling more bytes from the underlying source as needed.
	pub fn index_of_element(&mut self, targets: &ByteString, from: u64) -> Result<Option<u64>> {
		loop {
			if let Some(idx) = self.buffer.index_of_element(targets, from) {
				return Ok(Some(idx));
			}
			if !self.fill_once()? {
				return Ok(None);
			}
		}
	}

	/// Compares `count` bytes of the buffered stream starting at `offset`
	/// against `other`, requiring enough bytes to be staged first.
	pub fn range_equals(&mut self, offset: u64, other: &ByteString, other_offset: usize, count: usize) -> Result<bool> {
		self.require(offset + count as u64)?;
		let mut slice = Buffer::new();
		self.buffer.copy_to(&mut slice, offset, count as u64)?;
		let actual = slice.snapshot();
		Ok(actual.range_equals(0, other, other_offset, count))
	}

	/// Matches `options` against the stream, requesting more bytes as the
	/// trie needs them. Returns `None` if the stream is exhausted without a
	/// match.
	pub fn select(&mut self, options: &Options) -> Result<Option<usize>> {
		loop {
			match options.select(&self.buffer) {
				SelectResult::Matched { index, byte_len } => {
					self.buffer.skip(byte_len)?;
					return Ok(Some(index));
				}
				SelectResult::NoMatch => return Ok(None),
				SelectResult::NeedMoreBytes => {
					if !self.fill_once()? {
						return Ok(None);
					}
				}
			}
		}
	}

	/// A read-only view over everything already buffered, sharing segments
	/// rather than copying them, that can be read independently of (and
	/// without consuming) this source. Callers typically `request` enough
	/// bytes first; the view doesn't pull further bytes from the
	/// underlying source itself.
	pub fn peek(&mut self) -> BufferedSource<PeekSource> {
		let mut data = Buffer::new();
		let len = self.buffer.len();
		self.buffer.copy_to(&mut data, 0, len).expect("offset within bounds");
		BufferedSource::new(PeekSource { data })
	}

	pub fn close(&mut self) -> Result<()> {
		if self.closed {
			return Ok(());
		}
		self.closed = true;
		if let Some(mut source) = self.source.take() {
			source.close()?;
		}
		Ok(())
	}
}

impl<S: Source> Drop for BufferedSource<S> {
	fn drop(&mut self) { let _ = self.close(); }
}

/// Bridges onto [`std::io::Read`] for code that wants an ordinary reader
/// (e.g. handing this off to a library built against `std::io`).
impl<S: Source> std::io::Read for BufferedSource<S> {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		if self.buffer.is_empty() {
			self.fill_once().map_err(std::io::Error::from)?;
		}
		let n = (buf.len() as u64).min(self.buffer.len()) as usize;
		self.buffer.read_all(&mut buf[..n]).map_err(std::io::Error::from)?;
		Ok(n)
	}
}

/// The source behind [`BufferedSource::peek`]: a fixed snapshot of bytes
/// already buffered by the parent, shared rather than copied. Reading it
/// never reaches back into the parent source, so a `peek()` view can only
/// ever be exhausted, never extended — callers who want to look further
/// ahead must `request` more from the parent first and peek again.
pub struct PeekSource {
	data: Buffer,
}

impl Source for PeekSource {
	fn read(&mut self, sink: &mut Buffer, byte_count: u64) -> Result<Option<u64>> {
		if self.data.is_empty() {
			return Ok(None);
		}
		let n = byte_count.min(self.data.len());
		sink.write_from(&mut self.data, n)?;
		Ok(Some(n))
	}

	fn close(&mut self) -> Result<()> { Ok(()) }
}

/// Wraps a [`Sink`] with write buffering.
pub struct BufferedSink<K: Sink> {
	sink: Option<K>,
	buffer: Buffer,
	closed: bool,
}

impl<K: Sink> BufferedSink<K> {
	pub fn new(sink: K) -> Self {
		Self { sink: Some(sink), buffer: Buffer::new(), closed: false }
	}

	pub fn buffer_mut(&mut self) -> &mut Buffer { &mut self.buffer }

	pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> { self.buffer.write_all(bytes) }
	pub fn write_byte(&mut self, value: u8) -> Result<()> { self.buffer.write_byte(value) }
	pub fn write_short_be(&mut self, value: u16) -> Result<()> { self.buffer.write_short_be(value) }
	pub fn write_short_le(&mut self, value: u16) -> Result<()> { self.buffer.write_short_le(value) }
	pub fn write_int_be(&mut self, value: u32) -> Result<()> { self.buffer.write_int_be(value) }
	pub fn write_int_le(&mut self, value: u32) -> Result<()> { self.buffer.write_int_le(value) }
	pub fn write_long_be(&mut self, value: u64) -> Result<()> { self.buffer.write_long_be(value) }
	pub fn write_long_le(&mut self, value: u64) -> Result<()> { self.buffer.write_long_le(value) }
	pub fn write_utf8(&mut self, text: &str) -> Result<()> { self.buffer.write_utf8(text) }

	/// Flushes every segment that's already full downstream, retaining only
	/// a trailing partial segment's worth.
	pub fn emit_complete_segments(&mut self) -> Result<()> {
		if self.closed {
			return Err(Error::ClosedStream);
		}
		let total = self.buffer.len();
		let keep = total % SEGMENT_SIZE as u64;
		let emit_len = total - keep;
		if emit_len > 0 {
			let sink = self.sink.as_mut().ok_or(Error::ClosedStream)?;
			sink.write(&mut self.buffer, emit_len)?;
		}
		Ok(())
	}

	/// Flushes every buffered byte downstream.
	pub fn emit(&mut self) -> Result<()> {
		if self.closed {
			return Err(Error::ClosedStream);
		}
		let total = self.buffer.len();
		if total > 0 {
			let sink = self.sink.as_mut().ok_or(Error::ClosedStream)?;
			sink.write(&mut self.buffer, total)?;
		}
		Ok(())
	}

	pub fn flush(&mut self) -> Result<()> {
		self.emit()?;
		self.sink.as_mut().ok_or(Error::ClosedStream)?.flush()
	}

	/// Closes the sink. Idempotent; the first error from emitting buffered
	/// bytes or from the underlying sink's own close wins, but both are
	/// always attempted.
	pub fn close(&mut self) -> Result<()> {
		if self.closed {
			return Ok(());
		}
		self.closed = true;
		let emit_result = {
			let total = self.buffer.len();
			if total > 0 {
				self.sink.as_mut().map(|s| s.write(&mut self.buffer, total)).unwrap_or(Ok(()))
			} else {
				Ok(())
			}
		};
		let close_result = match self.sink.take() {
			Some(mut sink) => sink.close(),
			None => Ok(()),
		};
		emit_result?;
		close_result
	}
}

impl<K: Sink> Drop for BufferedSink<K> {
	fn drop(&mut self) { let _ = self.close(); }
}

/// Bridges onto [`std::io::Write`]; every write is staged, then
/// [`BufferedSink::emit_complete_segments`] is called so full segments are
/// flushed promptly without forcing a full `flush()` per call.
impl<K: Sink> std::io::Write for BufferedSink<K> {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		self.write_all(buf).map_err(std::io::Error::from)?;
		self.emit_complete_segments().map_err(std::io::Error::from)?;
		Ok(buf.len())
	}

	fn flush(&mut self) -> std::io::Result<()> {
		BufferedSink::flush(self).map_err(std::io::Error::from)
	}
}
