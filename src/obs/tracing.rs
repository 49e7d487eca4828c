// self
use crate::{_prelude::*, obs::IssuanceStage};

/// A span wrapper used by the issuer.
#[derive(Clone, Debug)]
pub struct GrantSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl GrantSpan {
	/// Creates a new span tagged with the grant label; the stage is recorded as it advances.
	pub fn new(grant: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"cloud_integration_auth.grant",
				grant,
				stage = IssuanceStage::AwaitingGrant.as_str()
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = grant;

			Self {}
		}
	}

	/// Records the stage the state machine just entered.
	pub fn stage(&self, stage: IssuanceStage) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("stage", stage.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;
		}
	}

	/// Logs a failed issuance together with its error chain.
	pub fn failure(&self, stage: IssuanceStage, error: &Error) {
		#[cfg(feature = "tracing")]
		{
			let _entered = self.span.enter();
			let cause = StdError::source(error).and_then(StdError::source).map(ToString::to_string);

			tracing::warn!(
				stage = stage.as_str(),
				status = error.status(),
				cause = ?cause,
				"{error}"
			);
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (stage, error);
		}
	}

	/// Enters the span for the remainder of the synchronous issuance.
	pub fn entered(&self) -> GrantSpanGuard<'_> {
		#[cfg(feature = "tracing")]
		{
			GrantSpanGuard { _guard: self.span.enter() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			GrantSpanGuard { _span: std::marker::PhantomData }
		}
	}
}

/// RAII guard returned by [`GrantSpan::entered`].
pub struct GrantSpanGuard<'a> {
	#[cfg(feature = "tracing")]
	_guard: tracing::span::Entered<'a>,
	#[cfg(not(feature = "tracing"))]
	_span: std::marker::PhantomData<&'a GrantSpan>,
}
impl Debug for GrantSpanGuard<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("GrantSpanGuard(..)")
	}
}
