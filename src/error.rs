//! Issuer-level error types and their token-endpoint rendering.

// self
use crate::{_prelude::*, response::Response, store::StoreError};

/// Issuer-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical issuer error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Malformed request: missing or unsupported grant, missing grant parameters.
	#[error("Bad request: {reason}")]
	BadRequest {
		/// Human-readable reason.
		reason: String,
	},
	/// Credentials were well-formed but rejected.
	#[error("Unauthorized: {reason}")]
	Unauthorized {
		/// Human-readable reason.
		reason: String,
	},
	/// A collaborator store failed; never retried by the issuer.
	#[error("{0}")]
	Runtime(
		#[from]
		#[source]
		RuntimeError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Response body could not be encoded.
	#[error("Failed to encode the response body.")]
	Encode(#[from] serde_json::Error),
}
impl Error {
	/// Builds a [`Error::BadRequest`].
	pub fn bad_request(reason: impl Into<String>) -> Self {
		Self::BadRequest { reason: reason.into() }
	}

	/// Builds a [`Error::Unauthorized`].
	pub fn unauthorized(reason: impl Into<String>) -> Self {
		Self::Unauthorized { reason: reason.into() }
	}

	/// Wraps a store failure with the operation that was being attempted.
	pub fn runtime(context: impl Into<String>, source: StoreError) -> Self {
		Self::Runtime(RuntimeError { context: context.into(), source })
	}

	/// HTTP status the token endpoint answers with for this error.
	pub fn status(&self) -> u16 {
		match self {
			Self::BadRequest { .. } => 400,
			Self::Unauthorized { .. } => 401,
			Self::Runtime(_) | Self::Config(_) | Self::Encode(_) => 500,
		}
	}

	/// RFC 6749 §5.2 error code.
	pub fn oauth_code(&self) -> &'static str {
		match self {
			Self::BadRequest { .. } => "invalid_request",
			Self::Unauthorized { .. } => "invalid_grant",
			Self::Runtime(_) | Self::Config(_) | Self::Encode(_) => "server_error",
		}
	}

	/// Renders the error as a token-endpoint JSON response.
	///
	/// Server-side failures only expose a generic description; the store error stays in the
	/// [`source`](StdError::source) chain for logging.
	pub fn to_response(&self) -> Response {
		let description = match self {
			Self::BadRequest { reason } | Self::Unauthorized { reason } => reason.as_str(),
			Self::Runtime(_) | Self::Config(_) | Self::Encode(_) =>
				"The token could not be issued.",
		};
		let body = serde_json::json!({
			"error": self.oauth_code(),
			"error_description": description,
		});

		Response::json_value(self.status(), &body)
	}
}

/// Store failure annotated with the issuer step that triggered it.
#[derive(Debug, ThisError)]
#[error("{context}.")]
pub struct RuntimeError {
	/// Issuer step that failed, e.g. `Failed to load refresh token from repository`.
	pub context: String,
	/// Underlying store failure.
	#[source]
	pub source: StoreError,
}

/// Configuration and validation failures raised while building the issuer.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// The expiration window must be positive.
	#[error("The expires_in window must be positive.")]
	NonPositiveExpiresIn,
	/// The expiration window does not fit the wire format.
	#[error("The expires_in window exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Configuration JSON could not be parsed.
	#[error("Issuer configuration is invalid at `{path}`: {message}")]
	Parse {
		/// JSON path of the offending value.
		path: String,
		/// Parser message.
		message: String,
	},
}
