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

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use segbuf::{Buffer, SEGMENT_SIZE};

fn sample_text(len: usize) -> String {
	"the quick brown fox jumps over the lazy dog "
		.chars()
		.cycle()
		.take(len)
		.collect()
}

fn write_slice(c: &mut Criterion) {
	let data = vec![7u8; SEGMENT_SIZE * 4];
	c.bench_function("write_slice", |b| b.iter(|| {
		let mut buf = Buffer::new();
		buf.write_all(black_box(&data)).unwrap();
		buf
	}));
}

fn write_numbers(c: &mut Criterion) {
	let mut group = c.benchmark_group("write_numbers");
	let mut buffer = Buffer::new();

	group.bench_function("write_short_be", |b| b.iter(|| {
		for _ in 0..SEGMENT_SIZE / 2 {
			buffer.write_short_be(black_box(u16::MAX)).unwrap();
		}
		buffer.clear();
	}));
	group.bench_function("write_int_be", |b| b.iter(|| {
		for _ in 0..SEGMENT_SIZE / 4 {
			buffer.write_int_be(black_box(u32::MAX)).unwrap();
		}
		buffer.clear();
	}));
	group.bench_function("write_long_be", |b| b.iter(|| {
		for _ in 0..SEGMENT_SIZE / 8 {
			buffer.write_long_be(black_box(u64::MAX)).unwrap();
		}
		buffer.clear();
	}));
	group.finish();
}

fn read_numbers(c: &mut Criterion) {
	let mut group = c.benchmark_group("read_numbers");

	group.bench_function("read_long_be", |b| b.iter_batched_ref(
		|| {
			let mut buf = Buffer::new();
			for _ in 0..SEGMENT_SIZE / 8 {
				buf.write_long_be(u64::MAX).unwrap();
			}
			buf
		},
		|buf| {
			while !buf.is_empty() {
				let _ = black_box(buf.read_long_be().unwrap());
			}
		},
		BatchSize::SmallInput,
	));
	group.finish();
}

fn skip(c: &mut Criterion) {
	let data = vec![1u8; SEGMENT_SIZE * 4];
	let mut group = c.benchmark_group("skip");

	group.bench_function("skip all", |b| b.iter_batched_ref(
		|| {
			let mut buf = Buffer::new();
			buf.write_all(&data).unwrap();
			buf
		},
		|buf| buf.skip(data.len() as u64).unwrap(),
		BatchSize::SmallInput,
	));
	group.bench_function("skip partial", |b| b.iter_batched_ref(
		|| {
			let mut buf = Buffer::new();
			buf.write_all(&data).unwrap();
			buf
		},
		|buf| buf.skip(4096).unwrap(),
		BatchSize::SmallInput,
	));
	group.finish();
}

fn index_of(c: &mut Criterion) {
	let text = sample_text(SEGMENT_SIZE * 4);
	let needle = segbuf::ByteString::of(b"lazy");
	let mut group = c.benchmark_group("index_of");

	group.bench_function("index_of byte", |b| b.iter_batched_ref(
		|| {
			let mut buf = Buffer::new();
			buf.write_utf8(&text).unwrap();
			buf
		},
		|buf| black_box(buf.index_of(b'z', 0)),
		BatchSize::SmallInput,
	));
	group.bench_function("index_of bytes", |b| b.iter_batched_ref(
		|| {
			let mut buf = Buffer::new();
			buf.write_utf8(&text).unwrap();
			buf
		},
		|buf| black_box(buf.index_of_bytes(&needle, 0)),
		BatchSize::SmallInput,
	));
	group.finish();
}

#[cfg(feature = "secure-hash")]
fn hash(c: &mut Criterion) {
	let data = vec![7u8; SEGMENT_SIZE * 4];
	c.bench_function("hash sha256", |b| b.iter_batched_ref(
		|| {
			let mut buf = Buffer::new();
			buf.write_all(&data).unwrap();
			buf.snapshot()
		},
		|snapshot| black_box(snapshot.hash(segbuf::HashAlgorithm::Sha256)),
		BatchSize::SmallInput,
	));
}

#[cfg(feature = "secure-hash")]
criterion_group!(write, write_slice, write_numbers);
#[cfg(feature = "secure-hash")]
criterion_group!(read, read_numbers, skip, index_of, hash);
#[cfg(feature = "secure-hash")]
criterion_main!(write, read);

#[cfg(not(feature = "secure-hash"))]
criterion_group!(write, write_slice, write_numbers);
#[cfg(not(feature = "secure-hash"))]
criterion_group!(read, read_numbers, skip, index_of);
#[cfg(not(feature = "secure-hash"))]
criterion_main!(write, read);
