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

//! Hex and base64 encoding helpers shared by [`super::ByteString`] and the
//! UTF-8/decimal parsers in [`crate::utf8`].

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};
use crate::error::{Error, Result};

pub(crate) fn encode_hex(bytes: &[u8]) -> String {
	base16ct::lower::encode_string(bytes)
}

pub(crate) fn encode_hex_upper(bytes: &[u8]) -> String {
	base16ct::upper::encode_string(bytes)
}

/// Decodes a hex string case-insensitively. Odd-length or non-hex input is
/// rejected.
pub(crate) fn decode_hex(text: &str) -> Result<Vec<u8>> {
	base16ct::mixed::decode_vec(text)
		.map_err(|_| Error::invalid_argument("invalid hex string"))
}

pub(crate) fn encode_base64(bytes: &[u8]) -> String {
	STANDARD.encode(bytes)
}

/// RFC 4648 URL-safe alphabet, unpadded per the library's wire-format
/// convention (standard [`encode_base64`] still pads, per RFC 2045).
pub(crate) fn encode_base64_url(bytes: &[u8]) -> String {
	URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes base64 leniently, accepting either the standard or URL-safe
/// alphabet. Returns `None` on malformed input rather than an error, per the
/// library's "decode returns nothing" contract for this one operation.
pub(crate) fn decode_base64(text: &str) -> Option<Vec<u8>> {
	STANDARD.decode(text)
		.or_else(|_| URL_SAFE.decode(text))
		.or_else(|_| URL_SAFE_NO_PAD.decode(text))
		.ok()
}
