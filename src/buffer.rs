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

//! The centerpiece type: a mutable, growable byte queue backed by a chain of
//! pooled [`Segment`]s. `Buffer` is both a [`Source`] and a [`Sink`] for
//! itself, so moving bytes between two buffers never copies more than a
//! segment boundary forces.

use std::fmt;
use std::sync::Arc;
use crate::byte_string::{ByteString, SegmentedByteString};
use crate::error::{Error, Result};
use crate::options::{ByteCursor, Options, SelectResult};
use crate::pool::SegmentPool;
use crate::ring::SegmentRing;
use crate::segment::Segment;
use crate::streams::{Sink, Source};
use crate::utf8;

/// A growable, segmented byte queue.
pub struct Buffer {
	pool: Arc<SegmentPool>,
	ring: SegmentRing,
}

impl Buffer {
	/// Creates an empty buffer drawing segments from the process-wide shared
	/// pool.
	pub fn new() -> Self {
		Self::with_pool(SegmentPool::shared())
	}

	/// Creates an empty buffer drawing segments from `pool`.
	pub fn with_pool(pool: Arc<SegmentPool>) -> Self {
		Self { pool, ring: SegmentRing::new() }
	}

	/// The number of bytes currently buffered.
	pub fn len(&self) -> u64 { self.ring.size() }
	pub fn is_empty(&self) -> bool { self.ring.is_empty() }

	/// Discards all buffered bytes, recycling their segments.
	pub fn clear(&mut self) {
		self.ring.clear(&self.pool);
	}

	/// Discards `byte_count` bytes from the front.
	pub fn skip(&mut self, mut byte_count: u64) -> Result<()> {
		if byte_count > self.len() {
			return Err(Error::EndOfInput);
		}
		while byte_count > 0 {
			let head_len = self.ring.head().map(|s| s.len() as u64).unwrap_or(0);
			let n = head_len.min(byte_count);
			self.ring.head_mut().expect("size tracked bytes available").consume(n as usize);
			self.ring.shrink(n);
			self.ring.trim_empty_head(&self.pool);
			byte_count -= n;
		}
		Ok(())
	}

	/// Returns the byte at absolute offset `pos` without consuming it.
	/// Out-of-range positions raise a range error rather than panicking.
	pub fn get(&self, pos: u64) -> Result<u8> {
		if pos >= self.len() {
			return Err(Error::OutOfRange { pos: pos as i64, len: self.len() });
		}
		Ok(self.byte_at(pos))
	}

	/// Returns the byte at absolute offset `index` without consuming it.
	/// Panics if `index` is out of range; callers check `len()` first.
	pub(crate) fn byte_at(&self, index: u64) -> u8 {
		let mut skip = index;
		for seg in self.ring.iter() {
			let len = seg.len() as u64;
			if skip < len {
				return seg.byte_at(skip as usize);
			}
			skip -= len;
		}
		panic!("byte index {index} out of range");
	}

	fn peek_into(&self, dst: &mut [u8]) -> Result<()> {
		if dst.len() as u64 > self.len() {
			return Err(Error::EndOfInput);
		}
		let mut filled = 0;
		for seg in self.ring.iter() {
			if filled == dst.len() { break; }
			let data = seg.data();
			let n = data.len().min(dst.len() - filled);
			dst[filled..filled + n].copy_from_slice(&data[..n]);
			filled += n;
		}
		Ok(())
	}

	/// Reads exactly `dst.len()` bytes. On `EndOfInput`, the bytes actually
	/// available are still copied into the front of `dst` before the error
	/// is raised, per the partial-`readFully` propagation policy.
	fn read_exact_into(&mut self, dst: &mut [u8]) -> Result<()> {
		let available = (dst.len() as u64).min(self.len()) as usize;
		let mut filled = 0;
		while filled < available {
			let n = {
				let head = self.ring.head_mut().expect("size tracked bytes available");
				head.pop_into_slice(&mut dst[filled..available])
			};
			filled += n;
			self.ring.shrink(n as u64);
			self.ring.trim_empty_head(&self.pool);
		}
		if available < dst.len() {
			return Err(Error::EndOfInput);
		}
		Ok(())
	}

	/// Appends `bytes`, splitting across as many fresh tail segments as
	/// needed.
	pub fn write_all(&mut self, mut bytes: &[u8]) -> Result<()> {
		while !bytes.is_empty() {
			let tail = self.ring.writable_tail(&self.pool, 1);
			let n = tail.push_slice(bytes);
			bytes = &bytes[n..];
		}
		Ok(())
	}

	pub fn write_byte(&mut self, value: u8) -> Result<()> {
		self.write_all(&[value])
	}
	pub fn write_short_be(&mut self, value: u16) -> Result<()> { self.write_all(&value.to_be_bytes()) }
	pub fn write_short_le(&mut self, value: u16) -> Result<()> { self.write_all(&value.to_le_bytes()) }
	pub fn write_int_be(&mut self, value: u32) -> Result<()> { self.write_all(&value.to_be_bytes()) }
	pub fn write_int_le(&mut self, value: u32) -> Result<()> { self.write_all(&value.to_le_bytes()) }
	pub fn write_long_be(&mut self, value: u64) -> Result<()> { self.write_all(&value.to_be_bytes()) }
	pub fn write_long_le(&mut self, value: u64) -> Result<()> { self.write_all(&value.to_le_bytes()) }

	pub fn write_utf8(&mut self, text: &str) -> Result<()> {
		self.write_all(text.as_bytes())
	}

	pub fn write_utf8_code_point(&mut self, code_point: u32) -> Result<()> {
		if code_point > 0x10FFFF {
			return Err(Error::invalid_argument("code point above U+10FFFF"));
		}
		let mut buf = [0u8; 4];
		let n = utf8::encode_code_point(code_point, &mut buf);
		self.write_all(&buf[..n])
	}

	/// Writes `value`'s ASCII decimal representation (with a leading `-` for
	/// negative values), symmetric with `read_decimal_long`.
	pub fn write_decimal_long(&mut self, value: i64) -> Result<()> {
		self.write_utf8(&value.to_string())
	}

	pub fn read_byte(&mut self) -> Result<u8> {
		let mut b = [0u8; 1];
		self.read_exact_into(&mut b)?;
		Ok(b[0])
	}
	pub fn read_short_be(&mut self) -> Result<u16> {
		let mut b = [0u8; 2];
		self.read_exact_into(&mut b)?;
		Ok(u16::from_be_bytes(b))
	}
	pub fn read_short_le(&mut self) -> Result<u16> {
		let mut b = [0u8; 2];
		self.read_exact_into(&mut b)?;
		Ok(u16::from_le_bytes(b))
	}
	pub fn read_int_be(&mut self) -> Result<u32> {
		let mut b = [0u8; 4];
		self.read_exact_into(&mut b)?;
		Ok(u32::from_be_bytes(b))
	}
	pub fn read_int_le(&mut self) -> Result<u32> {
		let mut b = [0u8; 4];
		self.read_exact_into(&mut b)?;
		Ok(u32::from_le_bytes(b))
	}
	pub fn read_long_be(&mut self) -> Result<u64> {
		let mut b = [0u8; 8];
		self.read_exact_into(&mut b)?;
		Ok(u64::from_be_bytes(b))
	}
	pub fn read_long_le(&mut self) -> Result<u64> {
		let mut b = [0u8; 8];
		self.read_exact_into(&mut b)?;
		Ok(u64::from_le_bytes(b))
	}

	/// Reads exactly `dst.len()` bytes, failing with `EndOfInput` if fewer
	/// are available.
	pub fn read_all(&mut self, dst: &mut [u8]) -> Result<()> {
		self.read_exact_into(dst)
	}

	pub fn read_to_vec(&mut self, byte_count: usize) -> Result<Vec<u8>> {
		let mut v = vec![0u8; byte_count];
		self.read_exact_into(&mut v)?;
		Ok(v)
	}

	/// Decodes `byte_count` bytes as UTF-8, substituting `U+FFFD` for
	/// malformed sequences rather than failing (matching the permissive
	/// default most text codecs use for a convenience read; see
	/// [`ByteString::utf8`] for a strict decode).
	pub fn read_utf8(&mut self, byte_count: usize) -> Result<String> {
		let bytes = self.read_to_vec(byte_count)?;
		Ok(utf8::decode_lossy(&bytes))
	}

	pub fn read_utf8_all(&mut self) -> Result<String> {
		self.read_utf8(self.len() as usize)
	}

	pub fn read_utf8_code_point(&mut self) -> Result<char> {
		if self.is_empty() {
			return Err(Error::EndOfInput);
		}
		let n = self.len().min(4) as usize;
		let mut buf = [0u8; 4];
		self.peek_into(&mut buf[..n])?;
		let (c, consumed) = utf8::decode_code_point(&buf[..n]);
		self.skip(consumed as u64)?;
		Ok(c)
	}

	/// The number of bytes `write_utf8_code_point` would need to re-encode
	/// the code points occupying `[begin, end)` of this buffer's bytes,
	/// without consuming anything. A malformed or surrogate sequence counts
	/// as the single replacement byte it decodes to, matching
	/// `write_utf8_code_point`'s own substitution policy.
	pub fn utf8_size(&self, begin: u64, end: u64) -> Result<u64> {
		if begin > end || end > self.len() {
			return Err(Error::OutOfRange { pos: end as i64, len: self.len() });
		}
		let mut pos = begin;
		let mut size = 0u64;
		while pos < end {
			let mut chunk = [0u8; 4];
			let mut chunk_len = 0usize;
			while chunk_len < 4 && pos + chunk_len as u64 < end {
				chunk[chunk_len] = self.byte_at(pos + chunk_len as u64);
				chunk_len += 1;
			}
			let (c, consumed) = utf8::decode_code_point(&chunk[..chunk_len]);
			size += utf8::utf8_size(c as u32) as u64;
			pos += consumed as u64;
		}
		Ok(size)
	}

	/// Reads a line terminated by `\n` or `\r\n`, consuming the terminator.
	/// Returns the remaining bytes as a final "line" if the buffer ends
	/// without one, or `None` if the buffer is already empty.
	pub fn read_utf8_line(&mut self) -> Result<Option<String>> {
		if self.is_empty() {
			return Ok(None);
		}
		match self.index_of(b'\n', 0) {
			Some(idx) => {
				let has_cr = idx > 0 && self.byte_at(idx - 1) == b'\r';
				let line_len = if has_cr { idx - 1 } else { idx };
				let bytes = self.read_to_vec(line_len as usize)?;
				self.skip(if has_cr { 2 } else { 1 })?;
				Ok(Some(utf8::decode_lossy(&bytes)))
			}
			None => {
				let bytes = self.read_to_vec(self.len() as usize)?;
				Ok(Some(utf8::decode_lossy(&bytes)))
			}
		}
	}

	/// Like [`Buffer::read_utf8_line`], but requires a `\n` within `limit`
	/// bytes of the start (default: the whole buffer), failing with
	/// `EndOfInput` otherwise instead of returning a partial final line.
	pub fn read_utf8_line_strict(&mut self, limit: Option<u64>) -> Result<String> {
		let scan_limit = limit.unwrap_or(self.len());
		match self.index_of(b'\n', 0) {
			Some(idx) if idx <= scan_limit => {
				let has_cr = idx > 0 && self.byte_at(idx - 1) == b'\r';
				let line_len = if has_cr { idx - 1 } else { idx };
				let bytes = self.read_to_vec(line_len as usize)?;
				self.skip(if has_cr { 2 } else { 1 })?;
				Ok(utf8::decode_lossy(&bytes))
			}
			_ => Err(Error::EndOfInput),
		}
	}

	/// Reads a run of ASCII decimal digits (with an optional leading `-`)
	/// from the front, consuming only the digits read.
	pub fn read_decimal_long(&mut self) -> Result<i64> {
		if self.is_empty() {
			return Err(Error::EndOfInput);
		}
		let negative = self.byte_at(0) == b'-';
		let mut i: u64 = if negative { 1 } else { 0 };
		let mut value: i64 = 0;
		let mut any = false;
		while i < self.len() {
			let b = self.byte_at(i);
			if !b.is_ascii_digit() { break; }
			any = true;
			let digit = (b - b'0') as i64;
			value = value.checked_mul(10)
				.and_then(|v| if negative { v.checked_sub(digit) } else { v.checked_add(digit) })
				.ok_or(Error::invalid_number("decimal number too large"))?;
			i += 1;
		}
		if !any {
			return Err(Error::invalid_number("expected a decimal number"));
		}
		self.skip(i)?;
		Ok(value)
	}

	/// Reads a run of ASCII hex digits from the front. Overflow wraps rather
	/// than failing, matching the unsigned, fixed-width nature of the
	/// result.
	pub fn read_hexadecimal_unsigned_long(&mut self) -> Result<u64> {
		if self.is_empty() {
			return Err(Error::EndOfInput);
		}
		let mut value: u64 = 0;
		let mut i: u64 = 0;
		let mut any = false;
		while i < self.len() {
			let digit = match self.byte_at(i) {
				b @ b'0'..=b'9' => b - b'0',
				b @ b'a'..=b'f' => b - b'a' + 10,
				b @ b'A'..=b'F' => b - b'A' + 10,
				_ => break,
			};
			any = true;
			value = value.wrapping_shl(4) | digit as u64;
			i += 1;
		}
		if !any {
			return Err(Error::invalid_number("expected a hexadecimal number"));
		}
		self.skip(i)?;
		Ok(value)
	}

	/// The first index at or after `from` holding `byte`, or `None`.
	pub fn index_of(&self, byte: u8, from: u64) -> Option<u64> {
		self.index_of_in_range(byte, from, None)
	}

	/// Like [`Buffer::index_of`], but the scan never looks past `to`
	/// (exclusive), or the end of the buffer if `to` is `None`.
	pub fn index_of_in_range(&self, byte: u8, from: u64, to: Option<u64>) -> Option<u64> {
		let limit = to.unwrap_or(self.len()).min(self.len());
		if from >= limit {
			return None;
		}
		let mut absolute = 0u64;
		let mut skip = from;
		for seg in self.ring.iter() {
			if absolute >= limit {
				break;
			}
			let len = seg.len() as u64;
			if skip >= len {
				skip -= len;
				absolute += len;
				continue;
			}
			let data = seg.data();
			let start = skip as usize;
			let scan_end = (len.min(limit - absolute)) as usize;
			if start < scan_end {
				if let Some(rel) = data[start..scan_end].iter().position(|&b| b == byte) {
					return Some(absolute + start as u64 + rel as u64);
				}
			}
			absolute += len;
			skip = 0;
		}
		None
	}

	/// The first index at or after `from` where `needle` occurs in full.
	pub fn index_of_bytes(&self, needle: &ByteString, from: u64) -> Option<u64> {
		let n = needle.len() as u64;
		if n == 0 {
			return Some(from.min(self.len()));
		}
		if from + n > self.len() {
			return None;
		}
		let mut i = from;
		while i + n <= self.len() {
			if (0..n).all(|k| self.byte_at(i + k) == needle.get(k as usize).unwrap()) {
				return Some(i);
			}
			i += 1;
		}
		None
	}

	/// The first index at or after `from` holding any byte in `targets`.
	pub fn index_of_element(&self, targets: &ByteString, from: u64) -> Option<u64> {
		let mut i = from;
		while i < self.len() {
			let b = self.byte_at(i);
			if (0..targets.len()).any(|k| targets.get(k) == Some(b)) {
				return Some(i);
			}
			i += 1;
		}
		None
	}

	/// Matches `options` against the front of the buffer, consuming the
	/// matched bytes and returning its index. Returns `None` both when no
	/// option matches and when the buffer doesn't yet hold enough bytes to
	/// decide; a layered [`crate::streams::BufferedSource`] distinguishes
	/// the two by requesting more bytes before giving up.
	pub fn select(&mut self, options: &Options) -> Result<Option<usize>> {
		match options.select(self) {
			SelectResult::Matched { index, byte_len } => {
				self.skip(byte_len)?;
				Ok(Some(index))
			}
			SelectResult::NoMatch | SelectResult::NeedMoreBytes => Ok(None),
		}
	}

	/// Moves exactly `byte_count` bytes from the front of `source` to the
	/// back of `self`, sharing rather than copying segments above the
	/// sharing threshold. Fails with `EndOfInput` if `source` holds fewer.
	pub fn write_from(&mut self, source: &mut Buffer, mut byte_count: u64) -> Result<()> {
		if byte_count > source.len() {
			return Err(Error::EndOfInput);
		}
		while byte_count > 0 {
			let head_len = source.ring.head().map(|s| s.len() as u64).unwrap_or(0);
			let seg = if byte_count < head_len {
				let front = source.ring.head_mut().unwrap().split(byte_count as usize);
				source.ring.shrink(byte_count);
				front
			} else {
				source.ring.pop_head().unwrap()
			};
			let taken = seg.len() as u64;
			byte_count -= taken;
			self.ring.push_tail(seg);
			self.ring.compact_tail(&self.pool);
		}
		source.ring.trim_empty_head(&source.pool);
		Ok(())
	}

	/// Copies `byte_count` bytes starting at `offset` into `sink`, without
	/// consuming them from `self`. The copy shares segments with the
	/// original wherever possible.
	pub fn copy_to(&mut self, sink: &mut Buffer, offset: u64, byte_count: u64) -> Result<()> {
		if offset + byte_count > self.len() {
			return Err(Error::OutOfRange { pos: (offset + byte_count) as i64, len: self.len() });
		}
		for (array, start, len) in self.ring.share_range(offset, byte_count) {
			sink.ring.push_tail(Segment::from_shared(array, start, start + len));
		}
		Ok(())
	}

	/// Takes an immutable, zero-copy snapshot of the whole buffer's current
	/// contents. The buffered bytes remain readable afterward; only future
	/// writes are affected, since the shared segments can no longer be
	/// written into in place.
	pub fn snapshot(&mut self) -> ByteString {
		let len = self.len();
		self.snapshot_prefix(len).expect("byte_count within bounds")
	}

	/// Like [`Buffer::snapshot`], but of just the first `byte_count` bytes.
	pub fn snapshot_prefix(&mut self, byte_count: u64) -> Result<ByteString> {
		if byte_count > self.len() {
			return Err(Error::EndOfInput);
		}
		if byte_count == 0 {
			return Ok(ByteString::empty());
		}
		let parts = self.ring.share_range(0, byte_count);
		Ok(ByteString::from_segmented(SegmentedByteString::from_parts(parts)))
	}
}

impl Default for Buffer {
	fn default() -> Self { Self::new() }
}

impl ByteCursor for Buffer {
	fn available(&self) -> u64 { self.len() }
	fn byte_at(&self, index: u64) -> u8 { Buffer::byte_at(self, index) }
}

impl Source for Buffer {
	fn read(&mut self, sink: &mut Buffer, byte_count: u64) -> Result<Option<u64>> {
		if self.is_empty() {
			return Ok(None);
		}
		let n = byte_count.min(self.len());
		sink.write_from(self, n)?;
		Ok(Some(n))
	}
	fn close(&mut self) -> Result<()> { Ok(()) }
}

impl Sink for Buffer {
	fn write(&mut self, source: &mut Buffer, byte_count: u64) -> Result<()> {
		self.write_from(source, byte_count)
	}
	fn flush(&mut self) -> Result<()> { Ok(()) }
	fn close(&mut self) -> Result<()> { Ok(()) }
}

/// A thin adapter onto [`std::io::Read`], for code that wants to treat a
/// `Buffer` as an ordinary reader (e.g. handing it to a library built
/// against `std::io`) rather than going through [`Source`].
impl std::io::Read for Buffer {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		let n = (buf.len() as u64).min(self.len()) as usize;
		self.read_all(&mut buf[..n])?;
		Ok(n)
	}
}

/// A thin adapter onto [`std::io::Write`]; every write is buffered in full,
/// matching `Buffer`'s own unbounded-growth contract.
impl std::io::Write for Buffer {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		self.write_all(buf)?;
		Ok(buf.len())
	}

	fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
}

impl fmt::Debug for Buffer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Buffer").field("size", &self.len()).finish()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn write_then_read_round_trips_integers() {
		let mut buf = Buffer::new();
		buf.write_int_be(0x01020304).unwrap();
		buf.write_long_le(0xdead_beef_cafe_babe).unwrap();
		assert_eq!(buf.read_int_be().unwrap(), 0x01020304);
		assert_eq!(buf.read_long_le().unwrap(), 0xdead_beef_cafe_babe);
	}

	#[test]
	fn write_spans_multiple_segments() {
		let mut buf = Buffer::new();
		let data = vec![7u8; crate::segment::SEGMENT_SIZE * 3 + 17];
		buf.write_all(&data).unwrap();
		assert_eq!(buf.len(), data.len() as u64);
		assert_eq!(buf.read_to_vec(data.len()).unwrap(), data);
	}

	#[test]
	fn read_past_end_is_end_of_input() {
		let mut buf = Buffer::new();
		buf.write_byte(1).unwrap();
		assert!(buf.read_short_be().is_err());
	}

	#[test]
	fn decimal_long_round_trips_through_the_library_writer() {
		let mut buf = Buffer::new();
		buf.write_decimal_long(i64::MIN).unwrap();
		assert_eq!(buf.read_utf8_all().unwrap(), "-9223372036854775808");

		let mut buf = Buffer::new();
		buf.write_decimal_long(-42).unwrap();
		assert_eq!(buf.read_decimal_long().unwrap(), -42);
	}

	#[test]
	fn write_utf8_code_point_rejects_values_above_max_scalar() {
		let mut buf = Buffer::new();
		assert!(buf.write_utf8_code_point(0x110000).is_err());
	}

	#[test]
	fn write_utf8_code_point_replaces_surrogates_with_a_single_question_mark() {
		let mut buf = Buffer::new();
		buf.write_utf8_code_point(0xD800).unwrap();
		assert_eq!(buf.len(), 1);
		assert_eq!(buf.read_byte().unwrap(), b'?');
	}

	#[test]
	fn utf8_size_matches_the_bytes_write_utf8_code_point_would_emit() {
		let mut buf = Buffer::new();
		buf.write_utf8("hi \u{1F600}").unwrap();
		let len = buf.len();
		assert_eq!(buf.utf8_size(0, len).unwrap(), len);
	}

	#[test]
	fn get_raises_a_range_error_past_the_end() {
		let mut buf = Buffer::new();
		buf.write_all(b"hi").unwrap();
		assert_eq!(buf.get(0).unwrap(), b'h');
		assert_eq!(buf.get(1).unwrap(), b'i');
		assert!(matches!(buf.get(2), Err(Error::OutOfRange { .. })));
	}

	#[test]
	fn move_between_buffers_shares_large_segments() {
		let mut a = Buffer::new();
		a.write_all(&vec![3u8; crate::segment::SHARE_MINIMUM + 50]).unwrap();
		let mut b = Buffer::new();
		b.write_from(&mut a, crate::segment::SHARE_MINIMUM as u64).unwrap();
		assert_eq!(b.len(), crate::segment::SHARE_MINIMUM as u64);
		assert_eq!(a.len(), 50);
	}

	#[test]
	fn copy_to_does_not_consume_source() {
		let mut a = Buffer::new();
		a.write_utf8("hello world").unwrap();
		let mut b = Buffer::new();
		a.copy_to(&mut b, 0, 5).unwrap();
		assert_eq!(a.len(), 11);
		assert_eq!(b.read_utf8_all().unwrap(), "hello");
	}

	#[test]
	fn std_io_read_and_write_bridge_to_normal_contents() {
		use std::io::{Read, Write};
		let mut buf = Buffer::new();
		Write::write_all(&mut buf, b"bridged").unwrap();
		let mut out = String::new();
		Read::read_to_string(&mut buf, &mut out).unwrap();
		assert_eq!(out, "bridged");
	}

	#[test]
	fn index_of_finds_byte() {
		let mut buf = Buffer::new();
		buf.write_utf8("line one\nline two\n").unwrap();
		assert_eq!(buf.index_of(b'\n', 0), Some(8));
		assert_eq!(buf.index_of(b'\n', 9), Some(17));
	}

	#[test]
	fn read_utf8_line_strips_crlf_and_lf() {
		let mut buf = Buffer::new();
		buf.write_utf8("a\r\nb\n").unwrap();
		assert_eq!(buf.read_utf8_line().unwrap(), Some("a".to_string()));
		assert_eq!(buf.read_utf8_line().unwrap(), Some("b".to_string()));
		assert_eq!(buf.read_utf8_line().unwrap(), None);
	}

	#[test]
	fn read_utf8_line_strict_requires_terminator() {
		let mut buf = Buffer::new();
		buf.write_utf8("no newline here").unwrap();
		assert!(buf.read_utf8_line_strict(None).is_err());
	}

	#[test]
	fn read_decimal_and_hex() {
		let mut buf = Buffer::new();
		buf.write_utf8("-42 and cafe").unwrap();
		assert_eq!(buf.read_decimal_long().unwrap(), -42);
		buf.skip(5).unwrap();
		assert_eq!(buf.read_hexadecimal_unsigned_long().unwrap(), 0xcafe);
	}

	#[test]
	fn snapshot_is_readable_and_independent() {
		let mut buf = Buffer::new();
		buf.write_utf8("hello").unwrap();
		let snap = buf.snapshot();
		assert_eq!(snap.utf8().unwrap().as_ref(), "hello");
		assert_eq!(buf.read_utf8_all().unwrap(), "hello");
	}

	#[test]
	fn select_returns_longest_option() {
		let mut buf = Buffer::new();
		buf.write_utf8("catalog of things").unwrap();
		let options = Options::new(vec![ByteString::of(b"cat"), ByteString::of(b"catalog")]).unwrap();
		let index = buf.select(&options).unwrap();
		assert_eq!(options.get(index.unwrap()).unwrap().to_vec(), b"catalog");
		assert_eq!(buf.read_utf8_all().unwrap(), " of things");
	}
}
