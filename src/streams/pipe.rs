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

//! An in-process, capacity-bounded pipe connecting a [`PipeSink`] on one
//! thread to a [`PipeSource`] on another. Backed by one shared [`Buffer`]
//! guarded by a `Mutex`, with a pair of `Condvar`s for "not empty" and "not
//! full" — the FIFO analogue of the data model's monitor-based blocking.
//! This is the one place a `Buffer` is actually handed across a thread
//! boundary, which is why segments are `Arc`-backed rather than `Rc`.

use std::sync::{Arc, Condvar, Mutex};
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::timeout::Timeout;
use super::{Sink, Source};

struct PipeState {
	buffer: Buffer,
	sink_closed: bool,
	source_closed: bool,
}

struct Shared {
	state: Mutex<PipeState>,
	not_empty: Condvar,
	not_full: Condvar,
	capacity: u64,
}

/// A bounded byte pipe. Clone [`Pipe::sink`] and [`Pipe::source`] out to
/// hand to separate threads.
pub struct Pipe {
	shared: Arc<Shared>,
}

impl Pipe {
	pub fn new(capacity: u64) -> Self {
		Self {
			shared: Arc::new(Shared {
				state: Mutex::new(PipeState {
					buffer: Buffer::new(),
					sink_closed: false,
					source_closed: false,
				}),
				not_empty: Condvar::new(),
				not_full: Condvar::new(),
				capacity: capacity.max(1),
			}),
		}
	}

	pub fn sink(&self) -> PipeSink {
		PipeSink { shared: Arc::clone(&self.shared), timeout: Timeout::NONE }
	}

	pub fn source(&self) -> PipeSource {
		PipeSource { shared: Arc::clone(&self.shared), timeout: Timeout::NONE }
	}
}

/// The writable half of a [`Pipe`].
pub struct PipeSink {
	shared: Arc<Shared>,
	timeout: Timeout,
}

impl PipeSink {
	pub fn with_timeout(mut self, timeout: Timeout) -> Self {
		self.timeout = timeout;
		self
	}
}

impl Sink for PipeSink {
	fn timeout(&self) -> Timeout { self.timeout }

	fn write(&mut self, source: &mut Buffer, mut byte_count: u64) -> Result<()> {
		while byte_count > 0 {
			let mut state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
			if state.sink_closed {
				return Err(Error::ClosedStream);
			}
			while state.buffer.len() >= self.shared.capacity && !state.source_closed {
				state = self.timeout.wait_until_notified(state, &self.shared.not_full)?;
			}
			if state.source_closed {
				return Err(Error::ClosedStream);
			}
			let room = self.shared.capacity - state.buffer.len();
			let n = byte_count.min(room.max(1));
			state.buffer.write_from(source, n)?;
			self.shared.not_empty.notify_all();
			byte_count -= n;
		}
		Ok(())
	}

	fn flush(&mut self) -> Result<()> { Ok(()) }

	fn close(&mut self) -> Result<()> {
		let mut state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
		state.sink_closed = true;
		self.shared.not_empty.notify_all();
		Ok(())
	}
}

/// The readable half of a [`Pipe`].
pub struct PipeSource {
	shared: Arc<Shared>,
	timeout: Timeout,
}

impl PipeSource {
	pub fn with_timeout(mut self, timeout: Timeout) -> Self {
		self.timeout = timeout;
		self
	}
}

impl Source for PipeSource {
	fn timeout(&self) -> Timeout { self.timeout }

	fn read(&mut self, sink: &mut Buffer, byte_count: u64) -> Result<Option<u64>> {
		let mut state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
		if state.source_closed {
			return Err(Error::ClosedStream);
		}
		while state.buffer.is_empty() && !state.sink_closed {
			state = self.timeout.wait_until_notified(state, &self.shared.not_empty)?;
		}
		if state.buffer.is_empty() {
			return Ok(None);
		}
		let n = byte_count.min(state.buffer.len());
		sink.write_from(&mut state.buffer, n)?;
		self.shared.not_full.notify_all();
		Ok(Some(n))
	}

	fn close(&mut self) -> Result<()> {
		let mut state = self.shared.state.lock().unwrap_or_else(|e| e.into_inner());
		state.source_closed = true;
		self.shared.not_full.notify_all();
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use std::thread;

	#[test]
	fn writes_are_readable_on_another_thread() {
		let pipe = Pipe::new(64);
		let mut sink = pipe.sink();
		let mut source = pipe.source();
		let writer = thread::spawn(move || {
			let mut data = Buffer::new();
			data.write_utf8("hello pipe").unwrap();
			sink.write(&mut data, 10).unwrap();
			sink.close().unwrap();
		});
		let mut out = Buffer::new();
		loop {
			match source.read(&mut out, 1024).unwrap() {
				Some(_) => continue,
				None => break,
			}
		}
		writer.join().unwrap();
		assert_eq!(out.read_utf8_all().unwrap(), "hello pipe");
	}

	#[test]
	fn write_blocks_until_source_drains_past_capacity() {
		let pipe = Pipe::new(4);
		let mut sink = pipe.sink();
		let mut source = pipe.source();
		let writer = thread::spawn(move || {
			let mut data = Buffer::new();
			data.write_all(&vec![9u8; 10]).unwrap();
			sink.write(&mut data, 10).unwrap();
			sink.close().unwrap();
		});
		let mut total = Buffer::new();
		while source.read(&mut total, 3).unwrap().is_some() {}
		writer.join().unwrap();
		assert_eq!(total.len(), 10);
	}

	#[test]
	fn read_returns_none_after_sink_closes_and_drains() {
		let pipe = Pipe::new(16);
		let mut sink = pipe.sink();
		sink.close().unwrap();
		let mut source = pipe.source();
		let mut out = Buffer::new();
		assert_eq!(source.read(&mut out, 16).unwrap(), None);
	}
}
