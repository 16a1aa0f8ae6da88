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

//! A capped, thread-safe free list of recyclable [`Segment`]s.
//!
//! The teacher crate split this into a thread-local `LocalPool` and, behind a
//! Cargo feature, an `Arc<Mutex<..>>`-backed `SharedPool`. The spec requires
//! `take`/`recycle` to be callable from any thread unconditionally, so here
//! there is exactly one always-thread-safe pool type.

use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;
use crate::segment::{Segment, SEGMENT_SIZE};

/// Default total capacity of a pool's free list, in bytes.
pub const SEGMENT_POOL_MAX_SIZE: usize = 65_536;

static SHARED_POOL: Lazy<Arc<SegmentPool>> =
	Lazy::new(|| Arc::new(SegmentPool::with_capacity(SEGMENT_POOL_MAX_SIZE)));

/// A capped free list of detached, unshared segments.
///
/// `take` and `recycle` never block on I/O; contention is limited to a short
/// internal mutex critical section guarding the free list itself.
pub struct SegmentPool {
	free: Mutex<Vec<Segment>>,
	capacity_bytes: usize,
}

impl SegmentPool {
	/// Creates a pool capped at `capacity_bytes` total retained bytes.
	pub fn with_capacity(capacity_bytes: usize) -> Self {
		Self {
			free: Mutex::new(Vec::new()),
			capacity_bytes,
		}
	}

	/// The process-wide default pool, sized to [`SEGMENT_POOL_MAX_SIZE`].
	pub fn shared() -> Arc<SegmentPool> {
		Arc::clone(&SHARED_POOL)
	}

	/// Returns a segment from the free list, or a freshly allocated one if
	/// the list is empty.
	pub(crate) fn take(&self) -> Segment {
		let mut free = self.free.lock().unwrap_or_else(|e| e.into_inner());
		free.pop().unwrap_or_else(|| {
			tracing::trace!("segment pool exhausted, allocating a fresh segment");
			Segment::fresh()
		})
	}

	/// Returns a segment to the free list, unless it is shared (its bytes
	/// may still be observed through an aliasing snapshot) or the pool is
	/// already at capacity, in which case it is simply dropped.
	pub(crate) fn recycle(&self, mut segment: Segment) {
		if segment.shared() {
			return;
		}

		let mut free = self.free.lock().unwrap_or_else(|e| e.into_inner());
		if free.len() * SEGMENT_SIZE >= self.capacity_bytes {
			return;
		}

		segment.reset();
		free.push(segment);
	}

	/// Bytes currently retained in the free list.
	pub fn retained_bytes(&self) -> usize {
		let free = self.free.lock().unwrap_or_else(|e| e.into_inner());
		free.len() * SEGMENT_SIZE
	}
}

impl Default for SegmentPool {
	fn default() -> Self { Self::with_capacity(SEGMENT_POOL_MAX_SIZE) }
}
