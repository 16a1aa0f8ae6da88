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

//! The literal end-to-end scenarios, run verbatim against the public API.

use pretty_assertions::assert_eq;
use segbuf::{Buffer, ByteString, Options, Path};

#[test]
fn writes_and_reads_utf8_across_calls() {
	let mut buf = Buffer::new();
    buf.write_utf8("Uh uh uh!").unwrap();
    buf.write_byte(0x20).unwrap();
    buf.write_utf8("hi").unwrap();
    assert_eq!(buf.read_utf8(12).unwrap(), "Uh uh uh! hi");
}

#[test]
fn short_writes_produce_exact_bytes() {
	let mut buf = Buffer::new();
	buf.write_short_be(32767).unwrap();
	buf.write_short_be(15).unwrap();
	assert_eq!(buf.read_to_vec(4).unwrap(), vec![0x7F, 0xFF, 0x00, 0x0F]);

	let mut buf = Buffer::new();
	buf.write_short_be(32767).unwrap();
	buf.write_short_be(15).unwrap();
	assert_eq!(buf.read_short_be().unwrap(), 32767);
	assert_eq!(buf.read_short_be().unwrap(), 15);
}

#[test]
fn min_i64_decimal_round_trips() {
	let mut buf = Buffer::new();
	let min = i64::MIN;
	buf.write_decimal_long(min).unwrap();
	assert_eq!(buf.read_utf8_all().unwrap(), "-9223372036854775808");

	let mut buf = Buffer::new();
	buf.write_decimal_long(min).unwrap();
	assert_eq!(buf.read_decimal_long().unwrap(), min);
}

#[cfg(feature = "deflate")]
#[test]
fn gzip_decodes_the_literal_hex_blob() {
	use segbuf::streams::{GzipSource, Source};

	let hex = "1f8b0800000000000000f3c8540400dac59e7903000000";
	let raw = ByteString::decode_hex(hex).unwrap();
	let mut source = Buffer::new();
	source.write_all(&raw.to_vec()).unwrap();

	let mut gzip = GzipSource::new(source);
	let mut out = Buffer::new();
	while gzip.read(&mut out, 4096).unwrap().is_some() {}
	assert_eq!(out.read_utf8_all().unwrap(), "Hi!");
}

#[test]
fn options_prefer_earlier_listing_over_length_both_ways() {
	let mut buf = Buffer::new();
	buf.write_utf8("abcdefg").unwrap();
	let options = Options::new(vec![ByteString::of(b"abc"), ByteString::of(b"abcdef")]).unwrap();
	assert_eq!(buf.select(&options).unwrap(), Some(0));

	let mut buf = Buffer::new();
	buf.write_utf8("abcdefg").unwrap();
	let options = Options::new(vec![ByteString::of(b"abcdef"), ByteString::of(b"abc")]).unwrap();
	assert_eq!(buf.select(&options).unwrap(), Some(0));
}

#[test]
fn path_join_resolves_dot_dot_and_absolute_children() {
	let p = Path::new("/home").join("..").join("jake");
	assert_eq!(p.to_string(), "/home/jake");

	let p = Path::new("/base").join("/home");
	assert_eq!(p.to_string(), "/home");
}
