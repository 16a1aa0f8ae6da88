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

//! Fixed-capacity byte windows with copy-on-write sharing. A [`Segment`]'s
//! backing array is reference counted (`Arc`, not `Rc`, so that a [`Buffer`]
//! can be handed wholesale across threads by [`crate::streams::Pipe`]);
//! segments flagged `shared` are never mutated in place, only read, per the
//! `owner`/`shared` discipline described in the crate's data model.
//!
//! Adjacency (`prev`/`next`) is not stored on the segment itself. Instead the
//! owning [`crate::ring::SegmentRing`] keeps segments in a `VecDeque`, whose
//! front-to-back order realizes the same single-head cyclic chain the data
//! model describes, without intrusive pointers.

use std::fmt;
use std::sync::Arc;

/// The fixed capacity of every [`Segment`]'s backing array.
pub const SEGMENT_SIZE: usize = 8192;

/// Splits below this size are copied rather than shared, trading a small
/// memcpy for avoiding long chains of tiny aliased segments.
pub(crate) const SHARE_MINIMUM: usize = 1024;

type ByteArray = Arc<[u8; SEGMENT_SIZE]>;

fn fresh_array() -> ByteArray {
	Arc::new([0; SEGMENT_SIZE])
}

/// A fixed-capacity window into a shareable byte array.
pub(crate) struct Segment {
	data: ByteArray,
	pos: usize,
	limit: usize,
	owner: bool,
	shared: bool,
}

impl Segment {
	/// Returns a brand-new, uniquely-owned, empty segment. Bypasses the pool;
	/// used when a pool has none to give and by [`Segment::split`]'s copying
	/// path.
	pub(crate) fn fresh() -> Self {
		Self {
			data: fresh_array(),
			pos: 0,
			limit: 0,
			owner: true,
			shared: false,
		}
	}

	/// Resets this segment to an empty, uniquely-owned state for reuse from
	/// the pool's free list. Has no effect on the shared flag; a segment that
	/// was shared is never recycled (see [`crate::pool::SegmentPool`]).
	pub(crate) fn reset(&mut self) {
		self.pos = 0;
		self.limit = 0;
		self.owner = true;
		self.shared = false;
	}

	pub(crate) fn pos(&self) -> usize { self.pos }
	pub(crate) fn limit(&self) -> usize { self.limit }
	pub(crate) fn owner(&self) -> bool { self.owner }
	pub(crate) fn shared(&self) -> bool { self.shared }

	/// Readable byte count: `limit - pos`.
	pub(crate) fn len(&self) -> usize { self.limit - self.pos }
	/// Writable byte count: `capacity - limit`. Zero for shared segments,
	/// since writes must never land in a tail that could be observed via an
	/// aliased snapshot.
	pub(crate) fn free(&self) -> usize {
		if self.shared || !self.owner {
			0
		} else {
			SEGMENT_SIZE - self.limit
		}
	}

	pub(crate) fn is_empty(&self) -> bool { self.len() == 0 }
	pub(crate) fn is_full(&self) -> bool { self.free() == 0 }

	/// The readable slice `[pos, limit)`.
	pub(crate) fn data(&self) -> &[u8] { &self.data[self.pos..self.limit] }

	pub(crate) fn byte_at(&self, offset: usize) -> u8 {
		self.data[self.pos + offset]
	}

	/// Clones the `Arc` to this segment's backing array, for building
	/// zero-copy snapshots. Does not itself mark the segment shared; callers
	/// that hand this out to an independent structure should go through
	/// [`Segment::share_all`] first.
	pub(crate) fn backing_array(&self) -> ByteArray {
		Arc::clone(&self.data)
	}

	/// Returns a mutable view of the writable region `[limit, capacity)`.
	/// Panics if this segment isn't uniquely owned and unshared; callers must
	/// check [`Segment::free`] first (this mirrors the "the buffer never
	/// writes into a shared tail" invariant rather than silently forking).
	fn writable_tail(&mut self) -> &mut [u8] {
		assert!(self.owner && !self.shared, "attempted write into a non-owner or shared segment");
		let array = Arc::get_mut(&mut self.data)
			.expect("owned, unshared segment should have a unique Arc");
		&mut array[self.limit..]
	}

	/// Consumes `n` bytes from the front after reading.
	pub(crate) fn consume(&mut self, n: usize) {
		debug_assert!(n <= self.len());
		self.pos += n;
	}

	/// Records `n` newly written bytes at the tail.
	pub(crate) fn add(&mut self, n: usize) {
		debug_assert!(n <= self.free());
		self.limit += n;
	}

	/// Pushes a slice into the writable tail, returning the number of bytes
	/// actually written (bounded by remaining capacity).
	pub(crate) fn push_slice(&mut self, bytes: &[u8]) -> usize {
		let n = bytes.len().min(self.free());
		if n > 0 {
			self.writable_tail()[..n].copy_from_slice(&bytes[..n]);
			self.add(n);
		}
		n
	}

	/// Pops up to `dst.len()` readable bytes into `dst`, returning the count
	/// read.
	pub(crate) fn pop_into_slice(&mut self, dst: &mut [u8]) -> usize {
		let n = dst.len().min(self.len());
		if n > 0 {
			dst[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
			self.consume(n);
		}
		n
	}

	/// Shifts remaining readable bytes to the front (`pos` becomes 0),
	/// compacting this segment's own free space. No-op if already shifted or
	/// shared (shared segments are read-only and never need it).
	pub(crate) fn shift(&mut self) {
		if self.pos == 0 || self.shared {
			return;
		}
		let len = self.len();
		let array = Arc::get_mut(&mut self.data)
			.expect("shift on non-shared segment should have a unique Arc");
		array.copy_within(self.pos..self.limit, 0);
		self.pos = 0;
		self.limit = len;
	}

	/// Splits off the first `byte_count` readable bytes into a new segment,
	/// advancing `self.pos` past them. Below [`SHARE_MINIMUM`] the bytes are
	/// copied into a freshly allocated segment instead of aliased, to avoid
	/// fragmenting long chains of tiny shared segments.
	pub(crate) fn split(&mut self, byte_count: usize) -> Segment {
		debug_assert!(byte_count <= self.len());
		if byte_count >= SHARE_MINIMUM {
			let front = Segment {
				data: Arc::clone(&self.data),
				pos: self.pos,
				limit: self.pos + byte_count,
				owner: false,
				shared: true,
			};
			self.shared = true;
			self.pos += byte_count;
			front
		} else {
			let mut copy = Segment::fresh();
			let written = copy.push_slice(&self.data[self.pos..self.pos + byte_count]);
			debug_assert_eq!(written, byte_count);
			self.pos += byte_count;
			copy
		}
	}

	/// Builds a segment directly from a shared backing array, as when
	/// re-hydrating a run previously produced by [`Segment::share_all`] into
	/// another ring (see [`crate::ring::SegmentRing::share_range`] callers).
	pub(crate) fn from_shared(data: ByteArray, pos: usize, limit: usize) -> Self {
		Self { data, pos, limit, owner: false, shared: true }
	}

	/// Returns a new segment sharing this segment's entire readable range.
	pub(crate) fn share_all(&mut self) -> Segment {
		self.shared = true;
		Segment {
			data: Arc::clone(&self.data),
			pos: self.pos,
			limit: self.limit,
			owner: false,
			shared: true,
		}
	}

	/// Copies up to `byte_count` bytes from this segment's front into
	/// `tail`'s writable region, consuming them from `self`. Returns the
	/// number of bytes moved.
	pub(crate) fn write_to(&mut self, tail: &mut Segment, byte_count: usize) -> usize {
		let n = byte_count.min(self.len());
		let written = tail.push_slice(&self.data[self.pos..self.pos + n]);
		self.consume(written);
		written
	}
}

impl fmt::Debug for Segment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Segment")
			.field("pos", &self.pos)
			.field("limit", &self.limit)
			.field("owner", &self.owner)
			.field("shared", &self.shared)
			.field("len", &self.len())
			.finish()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn push_then_pop_round_trips() {
		let mut seg = Segment::fresh();
		assert_eq!(seg.push_slice(b"hello"), 5);
		let mut out = [0u8; 5];
		assert_eq!(seg.pop_into_slice(&mut out), 5);
		assert_eq!(&out, b"hello");
		assert!(seg.is_empty());
	}

	#[test]
	fn split_above_minimum_shares() {
		let mut seg = Segment::fresh();
		seg.push_slice(&vec![1u8; SHARE_MINIMUM + 10]);
		let front = seg.split(SHARE_MINIMUM);
		assert!(front.shared());
		assert!(seg.shared());
		assert_eq!(front.len(), SHARE_MINIMUM);
		assert_eq!(seg.len(), 10);
	}

	#[test]
	fn split_below_minimum_copies() {
		let mut seg = Segment::fresh();
		seg.push_slice(&vec![7u8; 100]);
		let front = seg.split(10);
		assert!(!front.shared());
		assert!(!seg.shared());
		assert_eq!(front.len(), 10);
	}
}
