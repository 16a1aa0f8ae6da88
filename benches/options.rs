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
use segbuf::{Buffer, ByteString, Options};

fn small_set() -> Options {
	Options::new(vec![
		ByteString::of(b"GET"),
		ByteString::of(b"POST"),
		ByteString::of(b"PUT"),
		ByteString::of(b"DELETE"),
		ByteString::of(b"HEAD"),
	]).unwrap()
}

fn wide_set() -> Options {
	let values = (0..200)
		.map(|i| ByteString::of(format!("candidate-option-{i:04}").into_bytes()))
		.collect();
	Options::new(values).unwrap()
}

fn select_small_set(c: &mut Criterion) {
	let options = small_set();
	c.bench_function("select from 5 candidates", |b| b.iter_batched_ref(
		|| {
			let mut buf = Buffer::new();
			buf.write_utf8("DELETE /widgets/42").unwrap();
			buf
		},
		|buf| black_box(buf.select(&options).unwrap()),
		BatchSize::SmallInput,
	));
}

fn select_wide_set(c: &mut Criterion) {
	let options = wide_set();
	c.bench_function("select from 200 candidates", |b| b.iter_batched_ref(
		|| {
			let mut buf = Buffer::new();
			buf.write_utf8("candidate-option-0199 trailing bytes").unwrap();
			buf
		},
		|buf| black_box(buf.select(&options).unwrap()),
		BatchSize::SmallInput,
	));
}

fn select_no_match(c: &mut Criterion) {
	let options = wide_set();
	c.bench_function("select with no candidates matching", |b| b.iter_batched_ref(
		|| {
			let mut buf = Buffer::new();
			buf.write_utf8("nothing here matches any candidate").unwrap();
			buf
		},
		|buf| black_box(buf.select(&options).unwrap()),
		BatchSize::SmallInput,
	));
}

criterion_group!(options, select_small_set, select_wide_set, select_no_match);
criterion_main!(options);
