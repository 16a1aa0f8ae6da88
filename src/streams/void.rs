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

//! A sink that discards everything written to it.

use crate::buffer::Buffer;
use crate::error::Result;
use super::Sink;

/// Discards every byte written to it, still consuming them from the source
/// buffer (so callers see normal move semantics, just no retained output).
#[derive(Debug, Default, Clone, Copy)]
pub struct Blackhole;

impl Sink for Blackhole {
	fn write(&mut self, source: &mut Buffer, byte_count: u64) -> Result<()> {
		source.skip(byte_count)
	}
	fn flush(&mut self) -> Result<()> { Ok(()) }
	fn close(&mut self) -> Result<()> { Ok(()) }
}
