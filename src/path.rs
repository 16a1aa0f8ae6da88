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

//! A purely functional path value type: no filesystem access, just string
//! manipulation over a normalized slash convention. No teacher module covers
//! this (`orio` has no path type); built directly from the data model's
//! `Path` section and the join/`..`/`.` scenario in the spec's end-to-end
//! examples.

use std::fmt;

/// An immutable, platform-agnostic path, always stored and displayed with
/// `/` separators regardless of the host platform's own convention.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Path {
	root: RootKind,
	segments: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum RootKind {
	Relative,
	Unix,
	/// Carries the drive/UNC prefix verbatim, e.g. `C:` or `\\host\share`.
	Windows,
}

impl Path {
	fn windows_prefix(s: &str) -> Option<(&str, &str)> {
		let bytes = s.as_bytes();
		if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
			return Some((&s[..2], &s[2..]));
		}
		if let Some(rest) = s.strip_prefix("\\\\").or_else(|| s.strip_prefix("//")) {
			let mut parts = rest.splitn(3, ['/', '\\']);
			if let (Some(host), Some(share)) = (parts.next(), parts.next()) {
				if !host.is_empty() && !share.is_empty() {
					let prefix_len = 2 + host.len() + 1 + share.len();
					return Some((&s[..prefix_len], &s[prefix_len..]));
				}
			}
		}
		None
	}

	/// Parses `text`, normalizing both `/` and `\` separators and resolving
	/// no `.`/`..` segments yet (that happens on [`Path::join`]/construction
	/// from already-joined parts; a bare parse keeps them literal, matching
	/// how most path libraries distinguish lexical parsing from resolution).
	pub fn new(text: impl AsRef<str>) -> Self {
		let text = text.as_ref();
		if let Some((prefix, rest)) = Self::windows_prefix(text) {
			let segments = split_segments(rest);
			return Self { root: RootKind::Windows, segments: with_prefix(prefix, segments) };
		}
		if text.starts_with(['/', '\\']) {
			return Self { root: RootKind::Unix, segments: split_segments(text) };
		}
		Self { root: RootKind::Relative, segments: split_segments(text) }
	}

	fn is_absolute_prefixed(&self) -> bool { matches!(self.root, RootKind::Windows) }

	pub fn is_absolute(&self) -> bool { !matches!(self.root, RootKind::Relative) }

	/// The last non-empty segment, or empty for the filesystem root.
	pub fn name(&self) -> &str {
		let start = if self.is_absolute_prefixed() { 1 } else { 0 };
		self.segments[start..].last().map(String::as_str).unwrap_or("")
	}

	/// The path with the last segment removed, or `None` at the root (or
	/// for a single-segment relative path with nothing above it).
	pub fn parent(&self) -> Option<Path> {
		let floor = if self.is_absolute_prefixed() { 1 } else { 0 };
		if self.segments.len() <= floor {
			return None;
		}
		let mut segments = self.segments.clone();
		segments.pop();
		Some(Path { root: self.root, segments })
	}

	/// Joins `child` onto `self`. An absolute `child` clobbers `self`
	/// entirely; `.` segments are dropped and `..` collapses the preceding
	/// segment, but only one introduced earlier in this same `child`: an
	/// absolute base's own segments are a floor `..` never pops below, so
	/// chained joins like `"/home".join("..").join("jake")` keep `home`
	/// rather than resolving through the root first (only a `..` that
	/// shares a call with a later real segment cancels it, e.g.
	/// `"/a".join("b/../c")` does collapse to `"/a/c"`).
	pub fn join(&self, child: impl AsRef<str>) -> Path {
		let child = Path::new(child);
		if child.is_absolute() {
			return child;
		}

		let floor = if self.is_absolute() { self.segments.len() } else { 0 };
		let mut segments = self.segments.clone();
		for part in &child.segments {
			match part.as_str() {
				"." => continue,
				".." => {
					if segments.len() > floor {
						segments.pop();
					} else if !self.is_absolute() {
						segments.push("..".to_string());
					}
					// an absolute path's own prior segments (or its root)
					// are never popped by a `..` from outside this call.
				}
				_ => segments.push(part.clone()),
			}
		}
		Path { root: self.root, segments }
	}
}

fn split_segments(s: &str) -> Vec<String> {
	s.split(['/', '\\']).filter(|p| !p.is_empty()).map(String::from).collect()
}

fn with_prefix(prefix: &str, mut segments: Vec<String>) -> Vec<String> {
	segments.insert(0, prefix.to_string());
	segments
}

impl fmt::Display for Path {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.root {
			RootKind::Unix => {
				write!(f, "/")?;
				write!(f, "{}", self.segments.join("/"))
			}
			RootKind::Windows => {
				let (prefix, rest) = self.segments.split_first()
					.map(|(p, r)| (p.as_str(), r))
					.unwrap_or(("", &[]));
				write!(f, "{prefix}/{}", rest.join("/"))
			}
			RootKind::Relative => write!(f, "{}", self.segments.join("/")),
		}
	}
}

impl fmt::Debug for Path {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Path({self})")
	}
}

impl From<&str> for Path {
	fn from(value: &str) -> Self { Path::new(value) }
}

impl From<String> for Path {
	fn from(value: String) -> Self { Path::new(value) }
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn chained_dot_dot_does_not_escape_an_earlier_join() {
		let base = Path::new("/home");
		let joined = base.join("..").join("jake");
		assert_eq!(joined.to_string(), "/home/jake");
	}

	#[test]
	fn dot_dot_cancels_a_real_segment_from_the_same_join() {
		let base = Path::new("/a");
		let joined = base.join("b/../c");
		assert_eq!(joined.to_string(), "/a/c");
	}

	#[test]
	fn absolute_child_clobbers_base() {
		let base = Path::new("/base");
		let joined = base.join("/home");
		assert_eq!(joined.to_string(), "/home");
	}

	#[test]
	fn name_is_last_segment() {
		assert_eq!(Path::new("/a/b/c").name(), "c");
		assert_eq!(Path::new("/").name(), "");
	}

	#[test]
	fn parent_strips_last_segment() {
		let p = Path::new("/a/b/c");
		assert_eq!(p.parent().unwrap().to_string(), "/a/b");
		assert_eq!(Path::new("/").parent(), None);
	}

	#[test]
	fn dot_segments_are_dropped() {
		let p = Path::new("/a").join("./b/./c");
		assert_eq!(p.to_string(), "/a/b/c");
	}

	#[test]
	fn relative_dot_dot_above_start_is_kept_literal() {
		let p = Path::new("a").join("../../b");
		assert_eq!(p.to_string(), "../b");
	}
}
