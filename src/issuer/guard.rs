//! Per-user issuance guards.

// self
use crate::{_prelude::*, auth::UserId};

/// Mutex per user with at least one request in flight; entries are dropped once the last
/// request for that user finishes.
#[derive(Debug, Default)]
pub(crate) struct UserGuards(Mutex<HashMap<UserId, Arc<Mutex<()>>>>);
impl UserGuards {
	/// Runs `f` while holding the guard for `user_id`.
	pub(crate) fn run<T>(&self, user_id: &UserId, f: impl FnOnce() -> T) -> T {
		let slot = self.slot(user_id);
		let output = {
			let _held = slot.lock();

			f()
		};

		drop(slot);
		self.release(user_id);

		output
	}

	fn slot(&self, user_id: &UserId) -> Arc<Mutex<()>> {
		let mut guards = self.0.lock();

		guards.entry(user_id.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
	}

	// Slots are only cloned under the map lock, so a count of one here means no request holds
	// or waits on it.
	fn release(&self, user_id: &UserId) {
		let mut guards = self.0.lock();

		if guards.get(user_id).is_some_and(|slot| Arc::strong_count(slot) == 1) {
			guards.remove(user_id);
		}
	}

	#[cfg(test)]
	pub(crate) fn len(&self) -> usize {
		self.0.lock().len()
	}
}
