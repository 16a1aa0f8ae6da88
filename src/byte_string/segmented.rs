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

//! A zero-copy snapshot of a run of shared [`crate::segment::Segment`]
//! backing arrays, taken by [`crate::Buffer::snapshot`]. Holds `Arc` clones
//! rather than copying bytes; `getByte` binary-searches a small directory of
//! cumulative lengths instead of walking the chain linearly.

use std::sync::Arc;
use once_cell::sync::OnceCell;
use crate::segment::SEGMENT_SIZE;

/// Segments plus a directory of cumulative lengths, as described by the
/// data model's `SegmentedByteString`. Hex/base64/hash accessors flatten the
/// segments into a single buffer once and cache it; `getByte`, `rangeEquals`,
/// and `hashCode` never need to.
#[derive(Clone)]
pub(crate) struct SegmentedByteString {
	segments: Vec<Arc<[u8; SEGMENT_SIZE]>>,
	starts: Vec<usize>,
	cumulative: Vec<usize>,
	total: usize,
	pub(crate) hash: OnceCell<u64>,
	pub(crate) utf8: OnceCell<Arc<str>>,
	flat: OnceCell<Arc<[u8]>>,
}

impl SegmentedByteString {
	/// Builds a snapshot from `(backing array, start offset, length)` tuples,
	/// as produced by [`crate::ring::SegmentRing::share_range`].
	pub(crate) fn from_parts(parts: Vec<(Arc<[u8; SEGMENT_SIZE]>, usize, usize)>) -> Self {
		let mut segments = Vec::with_capacity(parts.len());
		let mut starts = Vec::with_capacity(parts.len());
		let mut cumulative = Vec::with_capacity(parts.len());
		let mut total = 0usize;
		for (array, start, len) in parts {
			if len == 0 {
				continue;
			}
			segments.push(array);
			starts.push(start);
			total += len;
			cumulative.push(total);
		}
		Self {
			segments,
			starts,
			cumulative,
			total,
			hash: OnceCell::new(),
			utf8: OnceCell::new(),
			flat: OnceCell::new(),
		}
	}

	pub(crate) fn len(&self) -> usize { self.total }

	pub(crate) fn byte_at(&self, index: usize) -> u8 {
		debug_assert!(index < self.total);
		let seg_idx = self.cumulative.partition_point(|&c| c <= index);
		let seg_start = if seg_idx == 0 { 0 } else { self.cumulative[seg_idx - 1] };
		let offset = self.starts[seg_idx] + (index - seg_start);
		self.segments[seg_idx][offset]
	}

	/// Iterates the readable slices in order without copying.
	pub(crate) fn chunks(&self) -> impl Iterator<Item = &[u8]> {
		let mut seg_start = 0usize;
		(0..self.segments.len()).map(move |i| {
			let end = self.cumulative[i];
			let len = end - seg_start;
			let slice = &self.segments[i][self.starts[i]..self.starts[i] + len];
			seg_start = end;
			slice
		})
	}

	/// Copies every segment into one contiguous buffer, memoizing the
	/// result for subsequent calls (hex, base64, and hashing all need a
	/// flat view).
	pub(crate) fn flatten(&self) -> Arc<[u8]> {
		self.flat.get_or_init(|| {
			let mut v = Vec::with_capacity(self.total);
			for chunk in self.chunks() {
				v.extend_from_slice(chunk);
			}
			v.into()
		}).clone()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn array_of(byte: u8) -> Arc<[u8; SEGMENT_SIZE]> {
		Arc::new([byte; SEGMENT_SIZE])
	}

	#[test]
	fn byte_at_crosses_segments() {
		let snap = SegmentedByteString::from_parts(vec![
			(array_of(1), 0, 4),
			(array_of(2), 0, 4),
		]);
		assert_eq!(snap.len(), 8);
		for i in 0..4 { assert_eq!(snap.byte_at(i), 1); }
		for i in 4..8 { assert_eq!(snap.byte_at(i), 2); }
	}

	#[test]
	fn flatten_concatenates_in_order() {
		let snap = SegmentedByteString::from_parts(vec![
			(array_of(9), 2, 3),
			(array_of(8), 0, 2),
		]);
		assert_eq!(&*snap.flatten(), &[9, 9, 9, 8, 8][..]);
	}
}
