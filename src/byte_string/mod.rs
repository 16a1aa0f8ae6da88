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

//! Immutable byte strings. A [`ByteString`] is either a flat `Arc<[u8]>` or
//! a [`segmented::SegmentedByteString`] snapshot taken directly out of a
//! [`crate::Buffer`] without copying; both share the same public surface so
//! callers never need to care which representation they hold.

mod segmented;
mod codec;
#[cfg(feature = "hash")]
mod hash;

pub(crate) use segmented::SegmentedByteString;
#[cfg(feature = "hash")]
pub use hash::HashAlgorithm;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use once_cell::sync::OnceCell;
use crate::error::Result;

/// An immutable sequence of bytes, cheap to clone (it's reference counted)
/// and cheap to slice out of a buffer without copying.
#[derive(Clone)]
pub struct ByteString(Repr);

#[derive(Clone)]
enum Repr {
	Flat(Flat),
	Segmented(SegmentedByteString),
}

#[derive(Clone)]
struct Flat {
	data: Arc<[u8]>,
	hash: OnceCell<u64>,
	utf8: OnceCell<Arc<str>>,
}

impl ByteString {
	/// The empty byte string.
	pub fn empty() -> Self {
		Self::of(&[][..])
	}

	/// Copies `bytes` into a new, independently-owned byte string.
	pub fn of(bytes: impl AsRef<[u8]>) -> Self {
		Self(Repr::Flat(Flat {
			data: Arc::from(bytes.as_ref()),
			hash: OnceCell::new(),
			utf8: OnceCell::new(),
		}))
	}

	pub(crate) fn from_segmented(snapshot: SegmentedByteString) -> Self {
		Self(Repr::Segmented(snapshot))
	}

	/// Decodes a hex string (either case) into a byte string.
	pub fn decode_hex(text: &str) -> Result<Self> {
		Ok(Self::of(codec::decode_hex(text)?))
	}

	/// Decodes base64 (standard or URL-safe alphabet), returning `None` for
	/// malformed input.
	pub fn decode_base64(text: &str) -> Option<Self> {
		codec::decode_base64(text).map(Self::of)
	}

	pub fn len(&self) -> usize {
		match &self.0 {
			Repr::Flat(f) => f.data.len(),
			Repr::Segmented(s) => s.len(),
		}
	}

	pub fn is_empty(&self) -> bool { self.len() == 0 }

	/// Returns the byte at `index`, or `None` if out of range.
	pub fn get(&self, index: usize) -> Option<u8> {
		(index < self.len()).then(|| self.byte_at(index))
	}

	fn byte_at(&self, index: usize) -> u8 {
		match &self.0 {
			Repr::Flat(f) => f.data[index],
			Repr::Segmented(s) => s.byte_at(index),
		}
	}

	/// Flattens into an owned, contiguous `Vec<u8>`.
	pub fn to_vec(&self) -> Vec<u8> {
		self.as_arc_slice().to_vec()
	}

	/// Copies out `byte_count` bytes starting at `offset` into a new,
	/// independently-owned byte string.
	pub fn substring(&self, offset: usize, byte_count: usize) -> Result<Self> {
		let end = offset + byte_count;
		if end > self.len() {
			return Err(crate::error::Error::OutOfRange { pos: end as i64, len: self.len() as u64 });
		}
		Ok(Self::of(&self.as_arc_slice()[offset..end]))
	}

	/// Flattens into a contiguous `Arc<[u8]>`, memoizing the copy for a
	/// segmented snapshot so repeated calls (hex, base64, hashing) pay for
	/// it once.
	pub(crate) fn as_arc_slice(&self) -> Arc<[u8]> {
		match &self.0 {
			Repr::Flat(f) => Arc::clone(&f.data),
			Repr::Segmented(s) => s.flatten(),
		}
	}

	fn hash_cell(&self) -> &OnceCell<u64> {
		match &self.0 {
			Repr::Flat(f) => &f.hash,
			Repr::Segmented(s) => &s.hash,
		}
	}

	fn utf8_cell(&self) -> &OnceCell<Arc<str>> {
		match &self.0 {
			Repr::Flat(f) => &f.utf8,
			Repr::Segmented(s) => &s.utf8,
		}
	}

	/// Decodes this byte string as UTF-8, memoizing the result. Fails with
	/// [`crate::error::Error::InvalidUtf8`] on malformed input.
	pub fn utf8(&self) -> Result<Arc<str>> {
		if let Some(s) = self.utf8_cell().get() {
			return Ok(Arc::clone(s));
		}
		let bytes = self.as_arc_slice();
		let s: Arc<str> = Arc::from(crate::utf8::decode_strict(&bytes)?);
		Ok(Arc::clone(self.utf8_cell().get_or_init(|| s)))
	}

	/// A 64-bit hash over the byte contents, memoized after first use. Uses
	/// a Java-style polynomial accumulator (`h = 31*h + b`) so repeated
	/// snapshots of identical content always hash equal without needing a
	/// full flatten first.
	pub fn hash64(&self) -> u64 {
		if let Some(h) = self.hash_cell().get() {
			return *h;
		}
		let mut h: u64 = 0;
		match &self.0 {
			Repr::Flat(f) => {
				for &b in f.data.iter() {
					h = h.wrapping_mul(31).wrapping_add(b as u64);
				}
			}
			Repr::Segmented(s) => {
				for chunk in s.chunks() {
					for &b in chunk {
						h = h.wrapping_mul(31).wrapping_add(b as u64);
					}
				}
			}
		}
		*self.hash_cell().get_or_init(|| h)
	}

	pub fn starts_with(&self, prefix: &ByteString) -> bool {
		prefix.len() <= self.len() && self.range_equals(0, prefix, 0, prefix.len())
	}

	pub fn ends_with(&self, suffix: &ByteString) -> bool {
		suffix.len() <= self.len()
			&& self.range_equals(self.len() - suffix.len(), suffix, 0, suffix.len())
	}

	/// Compares `count` bytes of `self` starting at `offset` against `count`
	/// bytes of `other` starting at `other_offset`, without ever flattening
	/// a segmented snapshot.
	pub fn range_equals(&self, offset: usize, other: &ByteString, other_offset: usize, count: usize) -> bool {
		if offset + count > self.len() || other_offset + count > other.len() {
			return false;
		}
		(0..count).all(|i| self.byte_at(offset + i) == other.byte_at(other_offset + i))
	}

	/// The first index at or after `from` where `needle` occurs, or `None`.
	pub fn index_of(&self, needle: &ByteString, from: usize) -> Option<usize> {
		if needle.is_empty() { return Some(from.min(self.len())); }
		let n = needle.len();
		if n > self.len() { return None; }
		(from..=self.len() - n).find(|&i| self.range_equals(i, needle, 0, n))
	}

	/// The last index at or before `from` (default: end) where `needle`
	/// occurs, or `None`.
	pub fn last_index_of(&self, needle: &ByteString, from: Option<usize>) -> Option<usize> {
		if needle.is_empty() {
			return Some(from.unwrap_or(self.len()).min(self.len()));
		}
		let n = needle.len();
		if n > self.len() { return None; }
		let hi = from.unwrap_or(self.len() - n).min(self.len() - n);
		(0..=hi).rev().find(|&i| self.range_equals(i, needle, 0, n))
	}

	pub fn hex(&self) -> String { codec::encode_hex(&self.as_arc_slice()) }
	pub fn hex_upper(&self) -> String { codec::encode_hex_upper(&self.as_arc_slice()) }
	pub fn base64(&self) -> String { codec::encode_base64(&self.as_arc_slice()) }
	pub fn base64_url(&self) -> String { codec::encode_base64_url(&self.as_arc_slice()) }

	#[cfg(feature = "hash")]
	pub fn hash(&self, algorithm: HashAlgorithm) -> ByteString {
		ByteString::of(algorithm.digest(&self.as_arc_slice()))
	}

	#[cfg(feature = "hash")]
	pub fn hmac(&self, algorithm: HashAlgorithm, key: &ByteString) -> ByteString {
		ByteString::of(algorithm.hmac(&key.as_arc_slice(), &self.as_arc_slice()))
	}
}

impl PartialEq for ByteString {
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len() && self.range_equals(0, other, 0, self.len())
	}
}
impl Eq for ByteString {}

impl PartialOrd for ByteString {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}
impl Ord for ByteString {
	fn cmp(&self, other: &Self) -> Ordering {
		let n = self.len().min(other.len());
		for i in 0..n {
			match self.byte_at(i).cmp(&other.byte_at(i)) {
				Ordering::Equal => continue,
				ord => return ord,
			}
		}
		self.len().cmp(&other.len())
	}
}

impl Hash for ByteString {
	fn hash<H: Hasher>(&self, state: &mut H) {
		match &self.0 {
			Repr::Flat(f) => state.write(&f.data),
			Repr::Segmented(s) => for chunk in s.chunks() { state.write(chunk); },
		}
	}
}

impl From<Vec<u8>> for ByteString {
	fn from(value: Vec<u8>) -> Self {
		Self(Repr::Flat(Flat { data: value.into(), hash: OnceCell::new(), utf8: OnceCell::new() }))
	}
}

impl From<&[u8]> for ByteString {
	fn from(value: &[u8]) -> Self { Self::of(value) }
}

impl From<&str> for ByteString {
	fn from(value: &str) -> Self { Self::of(value.as_bytes()) }
}

/// A human-readable preview: the UTF-8 text (control characters other than
/// `\n`/`\r` escaped, truncated past 64 code points) if valid, else a
/// truncated hex dump.
impl fmt::Display for ByteString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		const PREVIEW_LIMIT: usize = 64;
		if let Ok(text) = self.utf8() {
			write!(f, "[text=")?;
			for (i, c) in text.chars().enumerate() {
				if i >= PREVIEW_LIMIT {
					write!(f, "\u{2026}")?;
					break;
				}
				match c {
					'\n' => write!(f, "\\n")?,
					'\r' => write!(f, "\\r")?,
					c if c.is_control() => write!(f, "\\x{:02x}", c as u32)?,
					c => write!(f, "{c}")?,
				}
			}
			write!(f, "]")
		} else {
			let hex = self.hex();
			if hex.len() > PREVIEW_LIMIT * 2 {
				write!(f, "[hex={}\u{2026}]", &hex[..PREVIEW_LIMIT * 2])
			} else {
				write!(f, "[hex={hex}]")
			}
		}
	}
}

impl fmt::Debug for ByteString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ByteString{{size={}, data={}}}", self.len(), self)
	}
}
