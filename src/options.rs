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

//! A set of candidate byte strings compiled into a packed-integer trie, so
//! [`crate::Buffer::select`] can pick the longest matching candidate in a
//! single scan rather than trying each one in turn.
//!
//! Two node shapes share one flat `Vec<i32>`:
//!
//! - a *scan* node (`trie[n] < 0`) matches a fixed run of `-trie[n]` literal
//!   bytes in sequence: `[-k, terminal, byte0..byte(k-1), next]`
//! - a *select* node (`trie[n] > 0`) branches on the next byte among
//!   `trie[n]` sorted candidates: `[c, terminal, byte0..byte(c-1), step0..step(c-1)]`
//! - a *leaf* node (`trie[n] == 0`) carries nothing but a terminal: `[0, terminal]`
//!
//! `terminal` is the index of the option that matches exactly up to this
//! node, or `-1` if none does; every `next`/`step` is a non-negative offset
//! into the same array. There's no example in the retrieved corpus of this
//! kind of trie, so the layout here is built directly from the option set's
//! shape rather than adapted from existing code.

use crate::byte_string::ByteString;
use crate::error::{Error, Result};

/// Something `Options::select` can read candidate bytes from without
/// committing to consuming them until a match is chosen.
pub(crate) trait ByteCursor {
	fn available(&self) -> u64;
	fn byte_at(&self, index: u64) -> u8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SelectResult {
	Matched { index: usize, byte_len: u64 },
	NoMatch,
	/// The trie couldn't be fully resolved against the bytes presently
	/// available; a caller with a live source behind the cursor should
	/// request more bytes and retry before concluding no option matches.
	NeedMoreBytes,
}

/// A compiled set of candidate byte strings.
pub struct Options {
	values: Vec<ByteString>,
	trie: Vec<i32>,
	root: usize,
}

impl Options {
	/// Compiles `values` into a trie. Fails if any value is empty or a
	/// duplicate of another.
	pub fn new(values: Vec<ByteString>) -> Result<Self> {
		if values.iter().any(ByteString::is_empty) {
			return Err(Error::invalid_argument("Options entries must not be empty"));
		}

		let raw: Vec<Vec<u8>> = values.iter().map(ByteString::to_vec).collect();
		let mut order: Vec<usize> = (0..raw.len()).collect();
		order.sort_by(|&a, &b| raw[a].cmp(&raw[b]));
		for pair in order.windows(2) {
			if raw[pair[0]] == raw[pair[1]] {
				return Err(Error::invalid_argument("Options entries must not contain duplicates"));
			}
		}

		let items: Vec<(usize, &[u8])> = order.iter().map(|&i| (i, raw[i].as_slice())).collect();
		let mut trie = Vec::new();
		let root = build(&mut trie, &items) as usize;
		Ok(Self { values, trie, root })
	}

	pub fn len(&self) -> usize { self.values.len() }
	pub fn is_empty(&self) -> bool { self.values.is_empty() }
	pub fn get(&self, index: usize) -> Option<&ByteString> { self.values.get(index) }

	/// Walks the trie along the single path the cursor's bytes force,
	/// recording every option confirmed as a complete prefix match along the
	/// way. The earliest-listed (lowest original index) confirmed option
	/// wins, even over a longer match found later on the same path — e.g.
	/// `Options::new(["abc", "abcdef"])` against `"abcdefg"` selects `"abc"`,
	/// not the longer `"abcdef"`, because it was listed first. Once index 0
	/// (the lowest possible) is confirmed, nothing can beat it, so the walk
	/// stops immediately rather than reading further.
	pub(crate) fn select(&self, cursor: &impl ByteCursor) -> SelectResult {
		let mut node = self.root;
		let mut pos: u64 = 0;
		let mut best: Option<(usize, u64)> = None;

		macro_rules! record {
			($terminal:expr) => {
				let terminal = $terminal;
				if terminal >= 0 {
					let candidate = terminal as usize;
					if best.map_or(true, |(index, _)| candidate < index) {
						best = Some((candidate, pos));
						if candidate == 0 {
							return SelectResult::Matched { index: 0, byte_len: pos };
						}
					}
				}
			};
		}

		loop {
			let header = self.trie[node];
			if header == 0 {
				record!(self.trie[node + 1]);
				break;
			} else if header < 0 {
				let k = (-header) as u64;
				if pos + k > cursor.available() {
					return SelectResult::NeedMoreBytes;
				}
				let mismatch = (0..k).any(|i| {
					cursor.byte_at(pos + i) != self.trie[node + 2 + i as usize] as u8
				});
				if mismatch {
					break;
				}
				pos += k;
				record!(self.trie[node + 1]);
				let next = self.trie[node + 2 + k as usize];
				if next < 0 {
					break;
				}
				node = next as usize;
			} else {
				let c = header as usize;
				record!(self.trie[node + 1]);
				if pos >= cursor.available() {
					return SelectResult::NeedMoreBytes;
				}
				let b = cursor.byte_at(pos);
				let bytes_start = node + 2;
				let steps_start = bytes_start + c;
				match (0..c).find(|&i| self.trie[bytes_start + i] as u8 == b) {
					Some(i) => {
						pos += 1;
						node = self.trie[steps_start + i] as usize;
					}
					None => break,
				}
			}
		}
		match best {
			Some((index, byte_len)) => SelectResult::Matched { index, byte_len },
			None => SelectResult::NoMatch,
		}
	}
}

/// Builds one trie node (and, recursively, its children) from `items`, a
/// slice of `(option index, remaining suffix bytes)` sorted lexicographically
/// by suffix. Children are appended before their parent, since a parent's
/// `next`/`step` fields must name an already-known offset. Returns the
/// offset the node (or leaf) was written at.
fn build(trie: &mut Vec<i32>, items: &[(usize, &[u8])]) -> i32 {
	let min_len = items.iter().map(|(_, b)| b.len()).min().unwrap();
	let mut common = 0;
	'outer: while common < min_len {
		let byte = items[0].1[common];
		for (_, b) in items {
			if b[common] != byte { break 'outer; }
		}
		common += 1;
	}

	let terminal = items.iter()
		.find(|(_, b)| b.len() == common)
		.map(|(idx, _)| *idx as i32)
		.unwrap_or(-1);
	let remaining: Vec<(usize, &[u8])> = items.iter()
		.filter(|(_, b)| b.len() > common)
		.map(|(idx, b)| (*idx, &b[common..]))
		.collect();

	if remaining.is_empty() {
		let start = trie.len() as i32;
		if common > 0 {
			trie.push(-(common as i32));
			trie.push(terminal);
			trie.extend(items[0].1[..common].iter().map(|&b| b as i32));
			trie.push(-1);
		} else {
			trie.push(0);
			trie.push(terminal);
		}
		return start;
	}

	if common > 0 {
		let next_step = build(trie, &remaining);
		let start = trie.len() as i32;
		trie.push(-(common as i32));
		trie.push(terminal);
		trie.extend(items[0].1[..common].iter().map(|&b| b as i32));
		trie.push(next_step);
		start
	} else {
		let mut groups: Vec<(u8, Vec<(usize, &[u8])>)> = Vec::new();
		for (idx, b) in &remaining {
			let byte = b[0];
			match groups.iter_mut().find(|(gb, _)| *gb == byte) {
				Some(g) => g.1.push((*idx, &b[1..])),
				None => groups.push((byte, vec![(*idx, &b[1..])])),
			}
		}
		groups.sort_by_key(|(b, _)| *b);

		let steps: Vec<i32> = groups.iter().map(|(_, group)| build(trie, group)).collect();

		let start = trie.len() as i32;
		trie.push(groups.len() as i32);
		trie.push(terminal);
		trie.extend(groups.iter().map(|(b, _)| *b as i32));
		trie.extend(steps);
		start
	}
}

#[cfg(test)]
mod test {
	use super::*;

	struct Slice<'a>(&'a [u8]);
	impl ByteCursor for Slice<'_> {
		fn available(&self) -> u64 { self.0.len() as u64 }
		fn byte_at(&self, index: u64) -> u8 { self.0[index as usize] }
	}

	fn opts(values: &[&str]) -> Options {
		Options::new(values.iter().map(|s| ByteString::of(s.as_bytes())).collect()).unwrap()
	}

	#[test]
	fn selects_exact_match() {
		let options = opts(&["cat", "dog", "catalog"]);
		match options.select(&Slice(b"dog and pony")) {
			SelectResult::Matched { index, byte_len } => {
				assert_eq!(options.get(index).unwrap().to_vec(), b"dog");
				assert_eq!(byte_len, 3);
			}
			other => panic!("expected match, got {other:?}"),
		}
	}

	#[test]
	fn prefers_the_earlier_listed_option_over_a_longer_match() {
		// Per the literal "abc"/"abcdef" vs "abcdefg" scenario: the shorter
		// but earlier-listed option wins, even though a longer option also
		// matches as a prefix.
		let options = opts(&["cat", "catalog"]);
		match options.select(&Slice(b"catalogue")) {
			SelectResult::Matched { index, byte_len } => {
				assert_eq!(options.get(index).unwrap().to_vec(), b"cat");
				assert_eq!(byte_len, 3);
			}
			other => panic!("expected match, got {other:?}"),
		}
	}

	#[test]
	fn prefers_the_longer_match_when_it_is_also_listed_first() {
		// Reversing the listing order: now the longer option is first, so it
		// wins both on order and on length.
		let options = opts(&["catalog", "cat"]);
		match options.select(&Slice(b"catalogue")) {
			SelectResult::Matched { index, byte_len } => {
				assert_eq!(options.get(index).unwrap().to_vec(), b"catalog");
				assert_eq!(byte_len, 7);
			}
			other => panic!("expected match, got {other:?}"),
		}
	}

	#[test]
	fn reports_no_match() {
		let options = opts(&["cat", "dog"]);
		assert_eq!(options.select(&Slice(b"mouse")), SelectResult::NoMatch);
	}

	#[test]
	fn reports_need_more_bytes() {
		let options = opts(&["catalog"]);
		assert_eq!(options.select(&Slice(b"cat")), SelectResult::NeedMoreBytes);
	}

	#[test]
	fn rejects_duplicate_entries() {
		assert!(Options::new(vec![ByteString::of(b"a"), ByteString::of(b"a")]).is_err());
	}

	#[test]
	fn rejects_empty_entry() {
		assert!(Options::new(vec![ByteString::of(b"a"), ByteString::empty()]).is_err());
	}
}
