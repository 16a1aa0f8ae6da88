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

//! ## How it works
//!
//! Bytes are written to and read from reusable, fixed-size chunks of memory
//! called *segments*, arranged in a ring per [`Buffer`]. When a segment is
//! fully consumed it's returned to a [`SegmentPool`], recycled by the next
//! write instead of reallocated. Moving bytes between two buffers
//! ([`Buffer::write_from`]) reassigns segment ownership rather than copying;
//! a segment split below [`segment::SHARE_MINIMUM`] bytes is copied instead,
//! trading a small memcpy for avoiding long chains of tiny shared segments.
//!
//! ### Segments and sharing
//!
//! A segment's backing array can be shared between a buffer and any
//! [`ByteString`] snapshot taken from it ([`Buffer::snapshot`]); shared
//! segments are read-only; a buffer never writes into one; it claims a fresh
//! tail instead. This is the copy-on-write discipline behind zero-copy
//! snapshotting and `split`.
//!
//! ### Layered streams
//!
//! [`streams::Source`] and [`streams::Sink`] are the narrowest read/write
//! contracts; [`streams::BufferedSource`] and [`streams::BufferedSink`]
//! decorate them with an internal [`Buffer`] for lookahead and staged
//! writes. Transform streams ([`streams::hashing`], [`streams::deflate`],
//! [`streams::throttle`], [`streams::pipe`]) wrap either side.

mod buffer;
mod byte_string;
mod error;
mod fs;
mod options;
mod path;
mod pool;
mod ring;
mod segment;
pub mod streams;
mod timeout;
mod utf8;

pub use buffer::Buffer;
pub use byte_string::ByteString;
#[cfg(feature = "hash")]
pub use byte_string::HashAlgorithm;
pub use error::{Error, Result};
pub use fs::{Filesystem, LocalFilesystem, Metadata};
pub use options::Options;
pub use path::Path;
pub use pool::{SegmentPool, SEGMENT_POOL_MAX_SIZE};
pub use segment::SEGMENT_SIZE;
pub use timeout::Timeout;
