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

//! The filesystem service-provider interface: an external collaborator the
//! core only needs the contract of, so streams can be opened against a
//! real filesystem without the core depending on platform path-handling
//! beyond [`crate::Path`] itself.
//!
//! Grounded on `orio::streams::file::{FileSource, FileSink}` (`Source`/`Sink`
//! wrapping `std::fs::File`), extended with the directory/metadata/move
//! operations the spec's `Filesystem` contract names; those have no teacher
//! equivalent and are built directly against `std::fs`.

use std::fs;
use std::io;
use std::time::SystemTime;
use crate::error::Result;
use crate::path::Path;
use crate::streams::{IoSink, IoSource};

/// Metadata the spec's `Filesystem.metadata` contract promises: timestamps
/// are advisory (the host clock and the filesystem's own timestamp
/// resolution may disagree at sub-second precision).
#[derive(Clone, Copy, Debug)]
pub struct Metadata {
	pub is_regular_file: bool,
	pub is_directory: bool,
	pub size: u64,
	pub created_at: Option<SystemTime>,
	pub last_modified_at: Option<SystemTime>,
	pub last_accessed_at: Option<SystemTime>,
}

/// The filesystem service-provider contract. One implementation,
/// [`LocalFilesystem`], wraps `std::fs` directly; others (an in-memory
/// fake for tests, a zip-archive view) implement the same trait.
pub trait Filesystem {
	type Source: crate::streams::Source;
	type Sink: crate::streams::Sink;

	fn source(&self, path: &Path) -> Result<Self::Source>;
	fn sink(&self, path: &Path) -> Result<Self::Sink>;
	fn append(&self, path: &Path) -> Result<Self::Sink>;
	/// Entries directly inside `path`, in the order the underlying
	/// directory listing returns them (no sort is imposed beyond that).
	fn list(&self, path: &Path) -> Result<Vec<Path>>;
	fn create_directory(&self, path: &Path) -> Result<()>;
	/// Renames `from` to `to` atomically where the platform allows it.
	fn atomic_move(&self, from: &Path, to: &Path) -> Result<()>;
	fn copy(&self, from: &Path, to: &Path) -> Result<()>;
	fn delete(&self, path: &Path) -> Result<()>;
	fn metadata(&self, path: &Path) -> Result<Metadata>;
	fn canonicalize(&self, path: &Path) -> Result<Path>;
	fn cwd(&self) -> Result<Path>;
	fn tmp_directory(&self) -> Path;
}

/// The host filesystem, via `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
	type Source = IoSource<fs::File>;
	type Sink = IoSink<fs::File>;

	fn source(&self, path: &Path) -> Result<Self::Source> {
		Ok(IoSource::new(fs::File::open(path.to_string())?))
	}

	fn sink(&self, path: &Path) -> Result<Self::Sink> {
		Ok(IoSink::new(fs::File::create(path.to_string())?))
	}

	fn append(&self, path: &Path) -> Result<Self::Sink> {
		let file = fs::OpenOptions::new().create(true).append(true).open(path.to_string())?;
		Ok(IoSink::new(file))
	}

	fn list(&self, path: &Path) -> Result<Vec<Path>> {
		let mut out = Vec::new();
		for entry in fs::read_dir(path.to_string())? {
			let entry = entry?;
			out.push(path.join(entry.file_name().to_string_lossy()));
		}
		Ok(out)
	}

	fn create_directory(&self, path: &Path) -> Result<()> {
		fs::create_dir(path.to_string())?;
		Ok(())
	}

	fn atomic_move(&self, from: &Path, to: &Path) -> Result<()> {
		fs::rename(from.to_string(), to.to_string())?;
		Ok(())
	}

	fn copy(&self, from: &Path, to: &Path) -> Result<()> {
		fs::copy(from.to_string(), to.to_string())?;
		Ok(())
	}

	fn delete(&self, path: &Path) -> Result<()> {
		let meta = fs::metadata(path.to_string())?;
		if meta.is_dir() {
			fs::remove_dir(path.to_string())?;
		} else {
			fs::remove_file(path.to_string())?;
		}
		Ok(())
	}

	fn metadata(&self, path: &Path) -> Result<Metadata> {
		let meta = fs::metadata(path.to_string())?;
		Ok(Metadata {
			is_regular_file: meta.is_file(),
			is_directory: meta.is_dir(),
			size: meta.len(),
			created_at: meta.created().ok(),
			last_modified_at: meta.modified().ok(),
			last_accessed_at: meta.accessed().ok(),
		})
	}

	fn canonicalize(&self, path: &Path) -> Result<Path> {
		let canonical = fs::canonicalize(path.to_string())?;
		Ok(Path::new(canonical.to_string_lossy().into_owned()))
	}

	fn cwd(&self) -> Result<Path> {
		let dir = std::env::current_dir().map_err(io::Error::from)?;
		Ok(Path::new(dir.to_string_lossy().into_owned()))
	}

	fn tmp_directory(&self) -> Path {
		Path::new(std::env::temp_dir().to_string_lossy().into_owned())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn write_then_read_round_trips_through_real_file() {
		use crate::streams::{Sink, Source};
		let dir = tempfile::tempdir().unwrap();
		let path = Path::new(dir.path().join("greeting.txt").to_string_lossy().into_owned());
		let fs = LocalFilesystem;

		let mut sink = fs.sink(&path).unwrap();
		let mut written = crate::Buffer::new();
		written.write_utf8("hello, file").unwrap();
		sink.write(&mut written, 11).unwrap();
		sink.close().unwrap();

		let mut source = fs.source(&path).unwrap();
		let mut read_back = crate::Buffer::new();
		while source.read(&mut read_back, 1024).unwrap().is_some() {}
		assert_eq!(read_back.read_utf8_all().unwrap(), "hello, file");
	}

	#[test]
	fn metadata_reports_regular_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = Path::new(dir.path().join("a.txt").to_string_lossy().into_owned());
		fs::write(path.to_string(), b"x").unwrap();
		let meta = LocalFilesystem.metadata(&path).unwrap();
		assert!(meta.is_regular_file);
		assert_eq!(meta.size, 1);
	}

	#[test]
	fn list_enumerates_directory_entries() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("one.txt"), b"1").unwrap();
		fs::write(dir.path().join("two.txt"), b"2").unwrap();
		let path = Path::new(dir.path().to_string_lossy().into_owned());
		let entries = LocalFilesystem.list(&path).unwrap();
		assert_eq!(entries.len(), 2);
	}

	#[test]
	fn delete_removes_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = Path::new(dir.path().join("gone.txt").to_string_lossy().into_owned());
		fs::write(path.to_string(), b"x").unwrap();
		LocalFilesystem.delete(&path).unwrap();
		assert!(LocalFilesystem.metadata(&path).is_err());
	}
}
