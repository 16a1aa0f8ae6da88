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

//! Segments themselves are private, so these exercise the segment-level
//! operations (split/share, move, copy) through the public `Buffer` API that
//! drives them: `write_from` moves segment ownership, `copy_to` shares a
//! segment read-only, and a large single write forces splits across segment
//! boundaries.

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use segbuf::{Buffer, SEGMENT_SIZE};

fn filled(byte_count: usize) -> Buffer {
	let mut buf = Buffer::new();
	buf.write_all(&vec![9u8; byte_count]).unwrap();
	buf
}

fn move_between_buffers(c: &mut Criterion) {
	let mut group = c.benchmark_group("segment_move");

	group.bench_function("write_from whole segments", |b| b.iter_batched_ref(
		|| (filled(SEGMENT_SIZE * 4), Buffer::new()),
		|(src, dst)| dst.write_from(src, (SEGMENT_SIZE * 4) as u64).unwrap(),
		BatchSize::SmallInput,
	));

	group.bench_function("write_from a segment fraction", |b| b.iter_batched_ref(
		|| (filled(SEGMENT_SIZE * 4), Buffer::new()),
		|(src, dst)| dst.write_from(src, (SEGMENT_SIZE / 2) as u64).unwrap(),
		BatchSize::SmallInput,
	));

	group.finish();
}

fn share_between_buffers(c: &mut Criterion) {
	let mut group = c.benchmark_group("segment_share");

	group.bench_function("copy_to whole segments", |b| b.iter_batched_ref(
		|| (filled(SEGMENT_SIZE * 4), Buffer::new()),
		|(src, dst)| src.copy_to(dst, 0, (SEGMENT_SIZE * 4) as u64).unwrap(),
		BatchSize::SmallInput,
	));

	group.finish();
}

fn split_on_write(c: &mut Criterion) {
	let data = vec![3u8; SEGMENT_SIZE + SEGMENT_SIZE / 3];
	c.bench_function("write crossing a segment boundary", |b| b.iter(|| {
		let mut buf = Buffer::new();
		buf.write_all(black_box(&data)).unwrap();
		buf
	}));
}

criterion_group!(segment, move_between_buffers, share_between_buffers, split_on_write);
criterion_main!(segment);
