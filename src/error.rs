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

//! Error kinds raised by this crate. Exactly one kind is raised per failure,
//! per the library's error handling design: end-of-input, closed-stream,
//! timeout/interrupted, invalid-number, invalid-argument, and IO.

use std::io;
use thiserror::Error;

pub type Result<T = ()> = std::result::Result<T, Error>;

/// The single error type raised by this crate's operations.
#[derive(Debug, Error)]
pub enum Error {
	/// A read requested more bytes than the stream could produce.
	#[error("end of input")]
	EndOfInput,
	/// An operation was attempted on a closed source or sink.
	#[error("stream is closed")]
	ClosedStream,
	/// A deadline or per-operation timeout elapsed before the operation
	/// completed.
	#[error("timed out waiting for {0}")]
	Timeout(&'static str),
	/// The waiting thread was interrupted.
	#[error("interrupted")]
	Interrupted,
	/// `read_decimal_long`/`read_hexadecimal_unsigned_long` found no digits,
	/// or the value overflowed.
	#[error("{0}")]
	InvalidNumber(&'static str),
	/// An out-of-range offset/count, an empty or duplicate `Options` entry,
	/// or another caller-supplied argument violated a precondition.
	#[error("{0}")]
	InvalidArgument(&'static str),
	/// A byte sequence claimed to be UTF-8 was not valid and strict decoding
	/// was requested.
	#[error("invalid UTF-8 at byte {valid_up_to}")]
	InvalidUtf8 { valid_up_to: usize },
	/// The position or offset given was out of the valid range for the
	/// buffer or byte string being accessed.
	#[error("position {pos} out of range [0, {len})")]
	OutOfRange { pos: i64, len: u64 },
	/// An underlying source or sink failed; carries the platform error text.
	#[error("io error: {0}")]
	Io(#[from] io::Error),
}

impl Error {
	pub(crate) fn invalid_argument(message: &'static str) -> Self {
		Self::InvalidArgument(message)
	}

	pub(crate) fn invalid_number(message: &'static str) -> Self {
		Self::InvalidNumber(message)
	}

	/// Returns `true` if this is an end-of-input error.
	pub fn is_eof(&self) -> bool {
		matches!(self, Self::EndOfInput)
	}
}

impl From<Error> for io::Error {
	fn from(value: Error) -> Self {
		match value {
			Error::EndOfInput => io::Error::new(io::ErrorKind::UnexpectedEof, value.to_string()),
			Error::Io(err) => err,
			other => io::Error::new(io::ErrorKind::Other, other.to_string()),
		}
	}
}
