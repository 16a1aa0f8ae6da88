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

//! Deflate (RFC 1951), gzip (RFC 1952) transform streams, layered on
//! `flate2` the way [`super::hashing`] layers a running digest: a forwarding
//! [`Source`]/[`Sink`] that does its codec work in passing. `flate2`'s own
//! stream encoders/decoders work over `std::io::Read`/`Write`, so
//! [`SourceReader`]/[`SinkWriter`] bridge this crate's narrower contracts to
//! those, the same adaptation [`super::IoSource`]/[`super::IoSink`] do in
//! the other direction.

use std::io::{self, Read, Write};
use flate2::Compression;
use flate2::read::{DeflateDecoder, GzDecoder};
use flate2::write::{DeflateEncoder, GzEncoder};
use crate::buffer::Buffer;
use crate::error::{Error, Result};
use crate::segment::SEGMENT_SIZE;
use super::{Sink, Source};

/// Adapts a [`Source`] into [`std::io::Read`], staging pulled bytes in a
/// small internal [`Buffer`] between calls.
struct SourceReader<S: Source> {
	source: S,
	staging: Buffer,
}

impl<S: Source> Read for SourceReader<S> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		if self.staging.is_empty() {
			match self.source.read(&mut self.staging, SEGMENT_SIZE as u64).map_err(io::Error::from)? {
				None => return Ok(0),
				Some(_) => {}
			}
		}
		let n = (buf.len() as u64).min(self.staging.len()) as usize;
		self.staging.read_all(&mut buf[..n]).map_err(io::Error::from)?;
		Ok(n)
	}
}

/// Adapts a [`Sink`] into [`std::io::Write`].
struct SinkWriter<K: Sink> {
	sink: K,
}

impl<K: Sink> Write for SinkWriter<K> {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		let mut staging = Buffer::new();
		staging.write_all(buf).map_err(io::Error::from)?;
		self.sink.write(&mut staging, buf.len() as u64).map_err(io::Error::from)?;
		Ok(buf.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		self.sink.flush().map_err(io::Error::from)
	}
}

/// A [`Sink`] that deflates (RFC 1951) everything written to it before
/// forwarding to the downstream sink.
pub struct DeflateSink<K: Sink> {
	encoder: Option<DeflateEncoder<SinkWriter<K>>>,
}

impl<K: Sink> DeflateSink<K> {
	pub fn new(sink: K) -> Self {
		Self::with_level(sink, Compression::default())
	}

	pub fn with_level(sink: K, level: Compression) -> Self {
		Self { encoder: Some(DeflateEncoder::new(SinkWriter { sink }, level)) }
	}
}

impl<K: Sink> Sink for DeflateSink<K> {
	fn write(&mut self, source: &mut Buffer, byte_count: u64) -> Result<()> {
		let bytes = source.read_to_vec(byte_count as usize)?;
		let encoder = self.encoder.as_mut().ok_or(Error::ClosedStream)?;
		encoder.write_all(&bytes).map_err(Error::Io)
	}

	/// Sync-flushes the deflate stream (a full flush block, recoverable by
	/// the peer mid-stream) in addition to the caller's own flush.
	fn flush(&mut self) -> Result<()> {
		self.encoder.as_mut().ok_or(Error::ClosedStream)?.flush().map_err(Error::Io)
	}

	/// Finishes the deflate stream, then closes the downstream sink
	/// regardless of whether finishing succeeded; the first error wins.
	fn close(&mut self) -> Result<()> {
		let encoder = self.encoder.as_mut().ok_or(Error::ClosedStream)?;
		let finish_result = encoder.try_finish().map_err(Error::Io);
		let close_result = encoder.get_mut().sink.close();
		self.encoder = None;
		finish_result?;
		close_result
	}
}

/// A [`Source`] that inflates (RFC 1951) bytes pulled from an upstream
/// deflate-compressed [`Source`].
pub struct InflateSource<S: Source> {
	decoder: DeflateDecoder<SourceReader<S>>,
}

impl<S: Source> InflateSource<S> {
	pub fn new(source: S) -> Self {
		Self { decoder: DeflateDecoder::new(SourceReader { source, staging: Buffer::new() }) }
	}
}

impl<S: Source> Source for InflateSource<S> {
	fn read(&mut self, sink: &mut Buffer, byte_count: u64) -> Result<Option<u64>> {
		let want = (byte_count.min(SEGMENT_SIZE as u64)).max(1) as usize;
		let mut scratch = vec![0u8; want];
		let n = self.decoder.read(&mut scratch).map_err(Error::Io)?;
		if n == 0 {
			return Ok(None);
		}
		sink.write_all(&scratch[..n])?;
		Ok(Some(n as u64))
	}

	fn close(&mut self) -> Result<()> {
		self.decoder.get_mut().source.close()
	}
}

/// A [`Sink`] that gzips (RFC 1952) everything written to it.
pub struct GzipSink<K: Sink> {
	encoder: Option<GzEncoder<SinkWriter<K>>>,
}

impl<K: Sink> GzipSink<K> {
	pub fn new(sink: K) -> Self {
		Self::with_level(sink, Compression::default())
	}

	pub fn with_level(sink: K, level: Compression) -> Self {
		Self { encoder: Some(GzEncoder::new(SinkWriter { sink }, level)) }
	}
}

impl<K: Sink> Sink for GzipSink<K> {
	fn write(&mut self, source: &mut Buffer, byte_count: u64) -> Result<()> {
		let bytes = source.read_to_vec(byte_count as usize)?;
		let encoder = self.encoder.as_mut().ok_or(Error::ClosedStream)?;
		encoder.write_all(&bytes).map_err(Error::Io)
	}

	fn flush(&mut self) -> Result<()> {
		self.encoder.as_mut().ok_or(Error::ClosedStream)?.flush().map_err(Error::Io)
	}

	fn close(&mut self) -> Result<()> {
		let encoder = self.encoder.as_mut().ok_or(Error::ClosedStream)?;
		let finish_result = encoder.try_finish().map_err(Error::Io);
		let close_result = encoder.get_mut().sink.close();
		self.encoder = None;
		finish_result?;
		close_result
	}
}

/// A [`Source`] that gunzips (RFC 1952) bytes pulled from an upstream
/// gzip-compressed [`Source`], validating the header/trailer (CRC-32 and
/// length) as it goes.
pub struct GzipSource<S: Source> {
	decoder: GzDecoder<SourceReader<S>>,
}

impl<S: Source> GzipSource<S> {
	pub fn new(source: S) -> Self {
		Self { decoder: GzDecoder::new(SourceReader { source, staging: Buffer::new() }) }
	}
}

impl<S: Source> Source for GzipSource<S> {
	fn read(&mut self, sink: &mut Buffer, byte_count: u64) -> Result<Option<u64>> {
		let want = (byte_count.min(SEGMENT_SIZE as u64)).max(1) as usize;
		let mut scratch = vec![0u8; want];
		let n = self.decoder.read(&mut scratch).map_err(Error::Io)?;
		if n == 0 {
			return Ok(None);
		}
		sink.write_all(&scratch[..n])?;
		Ok(Some(n as u64))
	}

	fn close(&mut self) -> Result<()> {
		self.decoder.get_mut().source.close()
	}
}
