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

//! Transform streams that hash bytes in passing, without holding the whole
//! stream in memory. Bytes still flow through unchanged; `hash`/`hash_reset`
//! read out the running digest.

use digest::DynDigest;
use crate::buffer::Buffer;
use crate::byte_string::{ByteString, HashAlgorithm};
use crate::error::Result;
use super::{Sink, Source};

/// Wraps a [`Source`], updating a running digest with every byte as it's
/// read through.
pub struct HashingSource<S: Source> {
	inner: S,
	digest: Box<dyn DynDigest + Send>,
}

impl<S: Source> HashingSource<S> {
	pub fn new(inner: S, algorithm: HashAlgorithm) -> Self {
		Self { inner, digest: algorithm.new_digest() }
	}

	/// The digest of everything read so far. Resets the running state, so
	/// bytes read after this call start a fresh digest.
	pub fn hash_reset(&mut self) -> ByteString {
		ByteString::of(self.digest.finalize_reset())
	}
}

impl<S: Source> Source for HashingSource<S> {
	fn read(&mut self, sink: &mut Buffer, byte_count: u64) -> Result<Option<u64>> {
		let before = sink.len();
		match self.inner.read(sink, byte_count)? {
			None => Ok(None),
			Some(n) => {
				let mut peek = Buffer::new();
				sink.copy_to(&mut peek, before, n)?;
				let bytes = peek.read_to_vec(n as usize)?;
				self.digest.update(&bytes);
				Ok(Some(n))
			}
		}
	}

	fn close(&mut self) -> Result<()> { self.inner.close() }
}

/// Wraps a [`Sink`], updating a running digest with every byte as it's
/// written through.
pub struct HashingSink<K: Sink> {
	inner: K,
	digest: Box<dyn DynDigest + Send>,
}

impl<K: Sink> HashingSink<K> {
	pub fn new(inner: K, algorithm: HashAlgorithm) -> Self {
		Self { inner, digest: algorithm.new_digest() }
	}

	pub fn hash_reset(&mut self) -> ByteString {
		ByteString::of(self.digest.finalize_reset())
	}
}

impl<K: Sink> Sink for HashingSink<K> {
	fn write(&mut self, source: &mut Buffer, byte_count: u64) -> Result<()> {
		let mut peek = Buffer::new();
		source.copy_to(&mut peek, 0, byte_count)?;
		let bytes = peek.read_to_vec(byte_count as usize)?;
		self.digest.update(&bytes);
		self.inner.write(source, byte_count)
	}

	fn flush(&mut self) -> Result<()> { self.inner.flush() }
	fn close(&mut self) -> Result<()> { self.inner.close() }
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::streams::void::Blackhole;

	#[test]
	fn sink_hash_matches_one_shot_digest() {
		let mut sink = HashingSink::new(Blackhole, HashAlgorithm::Sha256);
		let mut source = Buffer::new();
		source.write_utf8("hello world").unwrap();
		sink.write(&mut source, 11).unwrap();
		let expected = ByteString::of(b"hello world").hash(HashAlgorithm::Sha256);
		assert_eq!(sink.hash_reset(), expected);
	}

	#[test]
	fn source_hash_matches_one_shot_digest() {
		let mut upstream = Buffer::new();
		upstream.write_utf8("streamed bytes").unwrap();
		let mut hashing = HashingSource::new(upstream, HashAlgorithm::Sha256);
		let mut out = Buffer::new();
		while hashing.read(&mut out, 4).unwrap().is_some() {}
		let expected = ByteString::of(b"streamed bytes").hash(HashAlgorithm::Sha256);
		assert_eq!(hashing.hash_reset(), expected);
	}
}
