//! Optional observability helpers for token issuance.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to run each issuance inside a span named
//!   `cloud_integration_auth.grant` with the `grant` and `stage` fields, and to log failures at
//!   `warn`.
//! - Enable `metrics` to increment the `cloud_integration_auth_grant_total` counter for every
//!   attempt/success/failure, labeled by `grant` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, request::GrantType};

/// Stable label for a grant, including requests whose grant could not be parsed.
pub fn grant_label(grant: Option<GrantType>) -> &'static str {
	grant.map(GrantType::as_str).unwrap_or("unsupported")
}

/// Stages of the issuance state machine, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IssuanceStage {
	/// Validating `grant_type` and its parameters.
	AwaitingGrant,
	/// Resolving the acting user and loading the tokens it currently holds.
	ResolvingUser,
	/// Minting the new access (and refresh) token.
	MintingNewTokens,
	/// Soft-expiring the previously loaded tokens.
	ExpiringOldTokens,
	/// Serializing the response.
	Responding,
}
impl IssuanceStage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			IssuanceStage::AwaitingGrant => "awaiting_grant",
			IssuanceStage::ResolvingUser => "resolving_user",
			IssuanceStage::MintingNewTokens => "minting_new_tokens",
			IssuanceStage::ExpiringOldTokens => "expiring_old_tokens",
			IssuanceStage::Responding => "responding",
		}
	}
}
impl Display for IssuanceStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GrantOutcome {
	/// Entry to the issuer.
	Attempt,
	/// Tokens were issued.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl GrantOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantOutcome::Attempt => "attempt",
			GrantOutcome::Success => "success",
			GrantOutcome::Failure => "failure",
		}
	}
}
impl Display for GrantOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
