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

//! Property tests for the testable invariants: round-trips, snapshot
//! immutability, and pool capacity bounds.

use quickcheck_macros::quickcheck;
use segbuf::streams::Source;
use segbuf::{Buffer, ByteString, SegmentPool, SEGMENT_POOL_MAX_SIZE};
use std::sync::Arc;

#[quickcheck]
fn copy_to_then_skip_matches_read(bytes: Vec<u8>) -> bool {
	if bytes.is_empty() {
		return true;
	}
	let mut source = Buffer::new();
	source.write_all(&bytes).unwrap();
	let mut via_copy = Buffer::new();
	source.copy_to(&mut via_copy, 0, bytes.len() as u64).unwrap();
	source.skip(bytes.len() as u64).unwrap();

	let mut source = Buffer::new();
	source.write_all(&bytes).unwrap();
	let mut via_read = Buffer::new();
	Source::read(&mut source, &mut via_read, bytes.len() as u64).unwrap();

	via_copy.read_to_vec(bytes.len()).unwrap() == via_read.read_to_vec(bytes.len()).unwrap()
}

#[quickcheck]
fn hex_round_trips(bytes: Vec<u8>) -> bool {
	let s = ByteString::of(&bytes);
	ByteString::decode_hex(&s.hex()).unwrap() == s
}

#[quickcheck]
fn base64_round_trips(bytes: Vec<u8>) -> bool {
	let s = ByteString::of(&bytes);
	ByteString::decode_base64(&s.base64()).unwrap() == s
}

#[quickcheck]
fn utf8_round_trips_valid_strings(s: String) -> bool {
	let bs = ByteString::of(s.as_bytes());
	bs.utf8().map(|decoded| decoded.as_ref() == s.as_str()).unwrap_or(false)
}

#[quickcheck]
fn utf8_size_matches_what_write_utf8_code_point_would_emit(s: String) -> bool {
	let mut buf = Buffer::new();
	buf.write_utf8(&s).unwrap();
	let len = buf.len();
	buf.utf8_size(0, len).unwrap() == len
}

#[quickcheck]
fn integer_round_trips(v: u32) -> bool {
	let mut buf = Buffer::new();
	buf.write_int_be(v).unwrap();
	buf.read_int_be().unwrap() == v
}

#[quickcheck]
fn long_round_trips(v: u64) -> bool {
	let mut buf = Buffer::new();
	buf.write_long_be(v).unwrap();
	buf.read_long_be().unwrap() == v
}

#[quickcheck]
fn byte_string_round_trips(bytes: Vec<u8>) -> bool {
	let mut buf = Buffer::new();
	buf.write_all(&bytes).unwrap();
	buf.read_to_vec(bytes.len()).unwrap() == bytes
}

#[quickcheck]
fn snapshots_are_immutable_under_later_mutation(prefix: Vec<u8>, suffix: u8) -> bool {
	let mut buf = Buffer::new();
	buf.write_all(&prefix).unwrap();
	let snapshot = buf.snapshot();
	buf.write_byte(suffix).unwrap();
	snapshot.to_vec() == prefix
}

#[quickcheck]
fn pool_retains_at_most_its_capacity(buffer_count: u8) -> bool {
	let pool = Arc::new(SegmentPool::with_capacity(SEGMENT_POOL_MAX_SIZE));
	for _ in 0..buffer_count {
		let mut buf = Buffer::with_pool(Arc::clone(&pool));
		buf.write_all(&vec![0u8; 8192 * 3]).unwrap();
		buf.clear();
	}
	pool.retained_bytes() <= SEGMENT_POOL_MAX_SIZE
}
