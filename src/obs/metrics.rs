// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs::GrantOutcome;

/// Records a grant outcome via the global metrics recorder (when enabled).
pub fn record_grant_outcome(grant: &'static str, outcome: GrantOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"cloud_integration_auth_grant_total",
			"grant" => grant,
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (grant, outcome);
	}
}

/// Thread-safe counters kept by every issuer regardless of feature flags.
#[derive(Debug, Default)]
pub struct IssuerMetrics {
	attempts: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	minted: AtomicU64,
	expired: AtomicU64,
}
impl IssuerMetrics {
	/// Total number of handled requests.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Requests that produced a token response.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Requests that failed.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Tokens persisted as new rows.
	pub fn minted(&self) -> u64 {
		self.minted.load(Ordering::Relaxed)
	}

	/// Tokens soft-expired.
	pub fn expired(&self) -> u64 {
		self.expired.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_minted(&self) {
		self.minted.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_expired(&self) {
		self.expired.fetch_add(1, Ordering::Relaxed);
	}
}
