//! Wall-clock sources used to stamp expirations.

// crates.io
use time::PrimitiveDateTime;
// self
use crate::_prelude::*;

/// Source of the current wall-clock instant, without offset.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the current instant.
	fn now(&self) -> PrimitiveDateTime;
}

/// Reads the host's local time, falling back to UTC when the local offset cannot be
/// determined (for example in multi-threaded processes on some platforms).
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> PrimitiveDateTime {
		let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());

		PrimitiveDateTime::new(now.date(), now.time())
	}
}

/// Manually driven clock for deterministic tests and replays.
#[derive(Clone, Debug)]
pub struct FixedClock(Arc<Mutex<PrimitiveDateTime>>);
impl FixedClock {
	/// Creates a clock frozen at `instant`.
	pub fn new(instant: PrimitiveDateTime) -> Self {
		Self(Arc::new(Mutex::new(instant)))
	}

	/// Moves the clock to `instant`.
	pub fn set(&self, instant: PrimitiveDateTime) {
		*self.0.lock() = instant;
	}

	/// Moves the clock forward by `delta`.
	pub fn advance(&self, delta: Duration) {
		let mut guard = self.0.lock();

		*guard = guard.saturating_add(delta);
	}
}
impl Clock for FixedClock {
	fn now(&self) -> PrimitiveDateTime {
		*self.0.lock()
	}
}
