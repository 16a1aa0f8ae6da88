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

//! Layered I/O: the [`Source`]/[`Sink`] contracts, their buffered
//! decorators, and the transform streams built on top (compression,
//! hashing, throttling, and a thread-crossing [`pipe::Pipe`]).

pub mod buffered;
pub mod pipe;
pub mod throttle;
pub mod void;
#[cfg(feature = "hash")]
pub mod hashing;
#[cfg(feature = "deflate")]
pub mod deflate;

pub use buffered::{BufferedSink, BufferedSource};
pub use pipe::Pipe;
pub use throttle::Throttler;
pub use void::Blackhole;
#[cfg(feature = "hash")]
pub use hashing::{HashingSink, HashingSource};
#[cfg(feature = "deflate")]
pub use deflate::{DeflateSink, GzipSink, GzipSource, InflateSource};

use std::io;
use crate::buffer::Buffer;
use crate::error::Result;
use crate::segment::SEGMENT_SIZE;
use crate::timeout::Timeout;

/// A producer of bytes. `read` moves up to `byte_count` bytes onto the back
/// of `sink`, returning `None` at end of stream (mirroring `Option` instead
/// of a `-1` sentinel) or `Some(n)` with `n > 0` otherwise.
pub trait Source {
	fn read(&mut self, sink: &mut Buffer, byte_count: u64) -> Result<Option<u64>>;
	/// The deadline/per-operation timeout this source honors. Most adapters
	/// have none; streams built over a [`pipe::Pipe`] publish theirs.
	fn timeout(&self) -> Timeout { Timeout::NONE }
	fn close(&mut self) -> Result<()>;
}

/// A consumer of bytes. `write` requires `source` to already hold at least
/// `byte_count` bytes (the usual caller is a [`BufferedSink`] moving out of
/// its own buffer), consuming exactly that many.
pub trait Sink {
	fn write(&mut self, source: &mut Buffer, byte_count: u64) -> Result<()>;
	fn flush(&mut self) -> Result<()>;
	fn timeout(&self) -> Timeout { Timeout::NONE }
	fn close(&mut self) -> Result<()>;
}

impl<T: Source + ?Sized> Source for &mut T {
	fn read(&mut self, sink: &mut Buffer, byte_count: u64) -> Result<Option<u64>> {
		(**self).read(sink, byte_count)
	}

	fn timeout(&self) -> Timeout { (**self).timeout() }
	fn close(&mut self) -> Result<()> { (**self).close() }
}

impl<T: Sink + ?Sized> Sink for &mut T {
	fn write(&mut self, source: &mut Buffer, byte_count: u64) -> Result<()> {
		(**self).write(source, byte_count)
	}

	fn flush(&mut self) -> Result<()> { (**self).flush() }
	fn timeout(&self) -> Timeout { (**self).timeout() }
	fn close(&mut self) -> Result<()> { (**self).close() }
}

/// Adapts any [`std::io::Read`] (a file, a socket, stdin) into a [`Source`].
pub struct IoSource<R> {
	inner: R,
}

impl<R: io::Read> IoSource<R> {
	pub fn new(inner: R) -> Self { Self { inner } }
}

impl<R: io::Read> Source for IoSource<R> {
	fn read(&mut self, sink: &mut Buffer, byte_count: u64) -> Result<Option<u64>> {
		let cap = byte_count.min(SEGMENT_SIZE as u64) as usize;
		let mut buf = vec![0u8; cap.max(1)];
		let n = self.inner.read(&mut buf)?;
		if n == 0 {
			return Ok(None);
		}
		sink.write_all(&buf[..n])?;
		Ok(Some(n as u64))
	}

	fn close(&mut self) -> Result<()> { Ok(()) }
}

/// Adapts any [`std::io::Write`] into a [`Sink`].
pub struct IoSink<W> {
	inner: W,
}

impl<W: io::Write> IoSink<W> {
	pub fn new(inner: W) -> Self { Self { inner } }
}

impl<W: io::Write> Sink for IoSink<W> {
	fn write(&mut self, source: &mut Buffer, byte_count: u64) -> Result<()> {
		let bytes = source.read_to_vec(byte_count as usize)?;
		self.inner.write_all(&bytes)?;
		Ok(())
	}

	fn flush(&mut self) -> Result<()> {
		self.inner.flush()?;
		Ok(())
	}

	fn close(&mut self) -> Result<()> {
		self.inner.flush()?;
		Ok(())
	}
}
