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

//! UTF-8 encoding and lenient decoding. Whole-string validation goes through
//! `simdutf8` (the teacher already depended on it for fast UTF-8 checks);
//! the code-point-at-a-time routines used by [`crate::Buffer::read_utf8_code_point`]
//! are hand-rolled since they need to consume a variable, not-yet-fully-buffered
//! number of bytes from a live stream.

use crate::error::{Error, Result};

/// Decodes a whole byte slice as UTF-8, failing on the first invalid byte.
pub(crate) fn decode_strict(bytes: &[u8]) -> Result<String> {
	simdutf8::basic::from_utf8(bytes)
		.map(str::to_owned)
		.map_err(|_| {
			// simdutf8's basic API doesn't report a position; fall back to
			// the std validator, which does, for a precise error.
			let valid_up_to = match std::str::from_utf8(bytes) {
				Ok(_) => bytes.len(),
				Err(e) => e.valid_up_to(),
			};
			Error::InvalidUtf8 { valid_up_to }
		})
}

fn is_continuation(b: u8) -> bool { b & 0xC0 == 0x80 }

/// Decodes one code point from the front of `bytes`. Returns the decoded
/// scalar value (or `U+FFFD` for a malformed sequence) and the number of
/// bytes consumed. `bytes` must be non-empty. Consumes only the invalid
/// lead byte on a malformed sequence, so the next call resynchronizes on
/// the following byte.
pub(crate) fn decode_code_point(bytes: &[u8]) -> (char, usize) {
	debug_assert!(!bytes.is_empty());
	let b0 = bytes[0];
	if b0 & 0x80 == 0 {
		return (b0 as char, 1);
	}
	if b0 & 0xE0 == 0xC0 {
		if b0 < 0xC2 { return (char::REPLACEMENT_CHARACTER, 1); }
		if bytes.len() < 2 || !is_continuation(bytes[1]) {
			return (char::REPLACEMENT_CHARACTER, 1);
		}
		let cp = ((b0 as u32 & 0x1F) << 6) | (bytes[1] as u32 & 0x3F);
		return (char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER), 2);
	}
	if b0 & 0xF0 == 0xE0 {
		if bytes.len() < 2 || !is_continuation(bytes[1]) {
			return (char::REPLACEMENT_CHARACTER, 1);
		}
		if bytes.len() < 3 || !is_continuation(bytes[2]) {
			return (char::REPLACEMENT_CHARACTER, 2);
		}
		let cp = ((b0 as u32 & 0x0F) << 12)
			| ((bytes[1] as u32 & 0x3F) << 6)
			| (bytes[2] as u32 & 0x3F);
		return match char::from_u32(cp) {
			Some(c) if cp >= 0x800 => (c, 3),
			_ => (char::REPLACEMENT_CHARACTER, 3),
		};
	}
	if b0 & 0xF8 == 0xF0 {
		if bytes.len() < 2 || !is_continuation(bytes[1]) {
			return (char::REPLACEMENT_CHARACTER, 1);
		}
		if bytes.len() < 3 || !is_continuation(bytes[2]) {
			return (char::REPLACEMENT_CHARACTER, 2);
		}
		if bytes.len() < 4 || !is_continuation(bytes[3]) {
			return (char::REPLACEMENT_CHARACTER, 3);
		}
		let cp = ((b0 as u32 & 0x07) << 18)
			| ((bytes[1] as u32 & 0x3F) << 12)
			| ((bytes[2] as u32 & 0x3F) << 6)
			| (bytes[3] as u32 & 0x3F);
		return match char::from_u32(cp) {
			Some(c) if cp >= 0x10000 => (c, 4),
			_ => (char::REPLACEMENT_CHARACTER, 4),
		};
	}
	(char::REPLACEMENT_CHARACTER, 1)
}

/// Encodes `code_point` as UTF-8 into `out`, returning the byte count.
/// `out` must have room for at least 4 bytes. A surrogate code point
/// (`0xD800..=0xDFFF`) is replaced with a single `?` byte rather than the
/// 3-byte `U+FFFD` encoding. Callers are expected to reject code points
/// above `U+10FFFF` themselves (see `Buffer::write_utf8_code_point`); if one
/// slips through anyway it falls back to `U+FFFD` rather than panicking.
pub(crate) fn encode_code_point(code_point: u32, out: &mut [u8]) -> usize {
	if (0xD800..=0xDFFF).contains(&code_point) {
		out[0] = b'?';
		return 1;
	}
	char::from_u32(code_point)
		.unwrap_or(char::REPLACEMENT_CHARACTER)
		.encode_utf8(out)
		.len()
}

/// Decodes a whole byte slice as UTF-8, substituting `U+FFFD` for malformed
/// sequences instead of failing. Used by [`crate::Buffer`]'s convenience
/// text reads, which (like most UTF-8 decoders outside of strict validation)
/// tolerate and repair bad input rather than reject it.
pub(crate) fn decode_lossy(mut bytes: &[u8]) -> String {
	let mut out = String::with_capacity(bytes.len());
	while !bytes.is_empty() {
		let (c, consumed) = decode_code_point(bytes);
		out.push(c);
		bytes = &bytes[consumed..];
	}
	out
}

/// The number of bytes `code_point` will occupy when encoded, matching
/// `encode_code_point`'s substitution policy (a surrogate counts as the
/// single `?` byte it's replaced with, not `U+FFFD`'s 3 bytes).
pub(crate) fn utf8_size(code_point: u32) -> usize {
	if (0xD800..=0xDFFF).contains(&code_point) {
		return 1;
	}
	char::from_u32(code_point)
		.unwrap_or(char::REPLACEMENT_CHARACTER)
		.len_utf8()
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn ascii_round_trips() {
		let mut buf = [0u8; 4];
		let n = encode_code_point('A' as u32, &mut buf);
		assert_eq!((decode_code_point(&buf[..n])), ('A', 1));
	}

	#[test]
	fn overlong_two_byte_is_replaced() {
		// 0xC0 0x80 is an overlong encoding of NUL.
		let (c, n) = decode_code_point(&[0xC0, 0x80]);
		assert_eq!(c, char::REPLACEMENT_CHARACTER);
		assert_eq!(n, 1);
	}

	#[test]
	fn truncated_three_byte_sequence_consumes_valid_prefix() {
		let (c, n) = decode_code_point(&[0xE2, 0x82]); // incomplete '€'
		assert_eq!(c, char::REPLACEMENT_CHARACTER);
		assert_eq!(n, 2);
	}

	#[test]
	fn surrogate_half_is_replaced() {
		let (c, n) = decode_code_point(&[0xED, 0xA0, 0x80]); // U+D800
		assert_eq!(c, char::REPLACEMENT_CHARACTER);
		assert_eq!(n, 3);
	}

	#[test]
	fn surrogate_code_point_encodes_as_a_single_question_mark() {
		let mut buf = [0u8; 4];
		let n = encode_code_point(0xD800, &mut buf);
		assert_eq!(n, 1);
		assert_eq!(buf[0], b'?');
		assert_eq!(utf8_size(0xD800), 1);
	}

	#[test]
	fn four_byte_sequence_round_trips() {
		let mut buf = [0u8; 4];
		let n = encode_code_point(0x1F600, &mut buf);
		assert_eq!(n, 4);
		let (c, consumed) = decode_code_point(&buf[..n]);
		assert_eq!(c as u32, 0x1F600);
		assert_eq!(consumed, 4);
	}

	#[test]
	fn decode_strict_reports_valid_prefix_length() {
		let bytes = [b'h', b'i', 0xFF];
		let err = decode_strict(&bytes).unwrap_err();
		match err {
			Error::InvalidUtf8 { valid_up_to } => assert_eq!(valid_up_to, 2),
			_ => panic!("expected InvalidUtf8"),
		}
	}
}
