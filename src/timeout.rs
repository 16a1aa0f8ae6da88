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

//! Cooperative timeouts: an absolute deadline, a per-operation duration, or
//! both. [`Timeout::wait_until_notified`] is the one primitive that actually
//! blocks, used by [`crate::streams::pipe::Pipe`] to bound how long a reader
//! or writer sits on a condition variable.

use std::sync::{Condvar, MutexGuard};
use std::time::{Duration, Instant};
use crate::error::{Error, Result};

/// A deadline and/or a per-call duration bound. `Timeout::NONE` never
/// expires.
#[derive(Clone, Copy, Debug)]
pub struct Timeout {
	deadline: Option<Instant>,
	timeout: Option<Duration>,
}

impl Timeout {
	pub const NONE: Timeout = Timeout { deadline: None, timeout: None };

	pub fn new() -> Self { Self::NONE }

	/// Sets (replacing any previous) absolute deadline.
	pub fn with_deadline(mut self, deadline: Instant) -> Self {
		self.deadline = Some(deadline);
		self
	}

	/// Sets (replacing any previous) per-operation duration, measured from
	/// when it's consulted, not when the `Timeout` was created.
	pub fn with_timeout(mut self, duration: Duration) -> Self {
		self.timeout = Some(duration);
		self
	}

	pub fn has_deadline(&self) -> bool { self.deadline.is_some() }

	fn remaining(&self) -> Option<Duration> {
		match (self.deadline, self.timeout) {
			(None, None) => None,
			(Some(d), None) => Some(d.saturating_duration_since(Instant::now())),
			(None, Some(t)) => Some(t),
			(Some(d), Some(t)) => Some(d.saturating_duration_since(Instant::now()).min(t)),
		}
	}

	/// Fails with [`Error::Timeout`] if the deadline has already passed.
	pub fn throw_if_reached(&self) -> Result<()> {
		if let Some(d) = self.deadline {
			if Instant::now() >= d {
				return Err(Error::Timeout("deadline"));
			}
		}
		Ok(())
	}

	/// Waits on `condvar`, releasing `guard`, until either notified or this
	/// timeout elapses. Returns the reacquired guard on success.
	pub fn wait_until_notified<'a, T>(
		&self,
		guard: MutexGuard<'a, T>,
		condvar: &Condvar,
	) -> Result<MutexGuard<'a, T>> {
		match self.remaining() {
			None => Ok(condvar.wait(guard).unwrap_or_else(|e| e.into_inner())),
			Some(remaining) => {
				let (guard, result) = condvar.wait_timeout(guard, remaining)
					.unwrap_or_else(|e| e.into_inner());
				if result.timed_out() {
					Err(Error::Timeout("condition"))
				} else {
					Ok(guard)
				}
			}
		}
	}
}

impl Default for Timeout {
	fn default() -> Self { Self::NONE }
}

#[cfg(test)]
mod test {
	use super::*;
	use std::sync::{Arc, Mutex};
	use std::thread;

	#[test]
	fn wait_times_out_without_notification() {
		let pair = Arc::new((Mutex::new(()), Condvar::new()));
		let timeout = Timeout::new().with_timeout(Duration::from_millis(20));
		let guard = pair.0.lock().unwrap();
		let result = timeout.wait_until_notified(guard, &pair.1);
		assert!(matches!(result, Err(Error::Timeout(_))));
	}

	#[test]
	fn wait_succeeds_when_notified() {
		let pair = Arc::new((Mutex::new(false), Condvar::new()));
		let pair2 = Arc::clone(&pair);
		thread::spawn(move || {
			thread::sleep(Duration::from_millis(5));
			let mut done = pair2.0.lock().unwrap();
			*done = true;
			pair2.1.notify_all();
		});
		let timeout = Timeout::new().with_timeout(Duration::from_secs(2));
		let mut guard = pair.0.lock().unwrap();
		while !*guard {
			guard = timeout.wait_until_notified(guard, &pair.1).unwrap();
		}
		assert!(*guard);
	}

	#[test]
	fn deadline_already_past_throws_immediately() {
		let timeout = Timeout::new().with_deadline(Instant::now() - Duration::from_secs(1));
		assert!(timeout.throw_if_reached().is_err());
	}
}
