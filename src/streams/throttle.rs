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

//! A token-bucket rate limiter that wraps a [`Source`] or [`Sink`], useful
//! for exercising backpressure and timeout paths in tests without needing a
//! genuinely slow peer.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use crate::buffer::Buffer;
use crate::error::Result;
use super::{Sink, Source};

struct State {
	bytes_per_second: u64,
	max_byte_count: u64,
	wait_byte_count: u64,
	available: u64,
	last_refill: Instant,
}

/// A shared rate limit, cloned into any number of [`ThrottledSource`]s and
/// [`ThrottledSink`]s that should draw from the same budget.
#[derive(Clone)]
pub struct Throttler {
	state: Arc<Mutex<State>>,
}

impl Throttler {
	pub fn new(bytes_per_second: u64) -> Self {
		Self {
			state: Arc::new(Mutex::new(State {
				bytes_per_second,
				max_byte_count: u64::MAX,
				wait_byte_count: 0,
				available: bytes_per_second,
				last_refill: Instant::now(),
			})),
		}
	}

	/// Caps every single read/write at `max_byte_count`, regardless of how
	/// much budget is available.
	pub fn with_max_byte_count(self, max_byte_count: u64) -> Self {
		self.state.lock().unwrap().max_byte_count = max_byte_count;
		self
	}

	/// Lets the first `wait_byte_count` bytes through unthrottled before
	/// metering begins.
	pub fn with_wait_byte_count(self, wait_byte_count: u64) -> Self {
		self.state.lock().unwrap().wait_byte_count = wait_byte_count;
		self
	}

	pub fn source<S: Source>(&self, inner: S) -> ThrottledSource<S> {
		ThrottledSource { inner, throttler: self.clone() }
	}

	pub fn sink<K: Sink>(&self, inner: K) -> ThrottledSink<K> {
		ThrottledSink { inner, throttler: self.clone() }
	}

	/// Reconfigures the rate, waking any thread currently sleeping in
	/// [`Throttler::acquire`] so it can recompute against the new rate
	/// immediately rather than finishing out its old sleep.
	pub fn set_bytes_per_second(&self, bytes_per_second: u64) {
		let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
		state.bytes_per_second = bytes_per_second;
		state.available = state.available.min(bytes_per_second.max(state.available));
	}

	/// Blocks until at least one byte is available, then returns how many
	/// of `want` bytes may be used right now. `bytes_per_second == 0`
	/// disables limiting entirely: every request is granted in full.
	fn acquire(&self, want: u64) -> u64 {
		let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
		if state.bytes_per_second == 0 {
			return want.min(state.max_byte_count).max(1);
		}
		let want = want.min(state.max_byte_count).max(1);
		loop {
			if state.bytes_per_second == 0 {
				return want;
			}
			if state.wait_byte_count > 0 {
				let free = want.min(state.wait_byte_count);
				state.wait_byte_count -= free;
				return free;
			}

			let now = Instant::now();
			let elapsed = now.duration_since(state.last_refill);
			let refill = (elapsed.as_secs_f64() * state.bytes_per_second as f64) as u64;
			if refill > 0 {
				state.available = (state.available + refill).min(state.bytes_per_second.max(1));
				state.last_refill = now;
			}
			if state.available > 0 {
				let take = want.min(state.available);
				state.available -= take;
				return take;
			}

			let wait = Duration::from_secs_f64(1.0 / state.bytes_per_second.max(1) as f64);
			drop(state);
			thread::sleep(wait);
			state = self.state.lock().unwrap_or_else(|e| e.into_inner());
		}
	}
}

pub struct ThrottledSource<S: Source> {
	inner: S,
	throttler: Throttler,
}

impl<S: Source> Source for ThrottledSource<S> {
	fn read(&mut self, sink: &mut Buffer, byte_count: u64) -> Result<Option<u64>> {
		let allowed = self.throttler.acquire(byte_count);
		self.inner.read(sink, allowed)
	}
	fn close(&mut self) -> Result<()> { self.inner.close() }
}

pub struct ThrottledSink<K: Sink> {
	inner: K,
	throttler: Throttler,
}

impl<K: Sink> Sink for ThrottledSink<K> {
	fn write(&mut self, source: &mut Buffer, mut byte_count: u64) -> Result<()> {
		while byte_count > 0 {
			let allowed = self.throttler.acquire(byte_count);
			self.inner.write(source, allowed)?;
			byte_count -= allowed;
		}
		Ok(())
	}
	fn flush(&mut self) -> Result<()> { self.inner.flush() }
	fn close(&mut self) -> Result<()> { self.inner.close() }
}
