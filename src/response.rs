//! Token endpoint responses.

// self
use crate::{
	_prelude::*,
	auth::{Token, TokenKind},
};

/// Literal `token_type` advertised for every issued access token.
pub const BEARER: &str = "Bearer";

/// HTTP-style response handed back to the hosting framework.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
	/// HTTP status code.
	pub status: u16,
	/// Header name/value pairs in emission order.
	pub headers: Vec<(String, String)>,
	/// Serialized JSON body.
	pub body: String,
}
impl Response {
	/// HTTP 200.
	pub const OK: u16 = 200;

	/// Serializes `body` and wraps it with the token endpoint's header set.
	pub fn json(status: u16, body: &impl Serialize) -> Result<Self> {
		Ok(Self::with_body(status, serde_json::to_string(body)?))
	}

	/// Wraps an already-built JSON value with the token endpoint's header set.
	pub fn json_value(status: u16, body: &serde_json::Value) -> Self {
		Self::with_body(status, body.to_string())
	}

	/// Case-insensitive header lookup.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	fn with_body(status: u16, body: String) -> Self {
		let headers = [
			("Content-Type", "application/json; charset=utf-8".to_owned()),
			("Cache-Control", "no-store".to_owned()),
			("Pragma", "no-cache".to_owned()),
			("Content-Language", "en".to_owned()),
			("Content-Length", body.len().to_string()),
		]
		.into_iter()
		.map(|(key, value)| (key.to_owned(), value))
		.collect();

		Self { status, headers, body }
	}
}

/// Successful token response body.
///
/// The field set is a wire contract: `user_id` and `scope` are always present (empty when
/// absent) and `refresh_token` only appears for user-bound grants.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Always [`BEARER`].
	pub token_type: String,
	/// Identifier of the new access token.
	pub access_token: String,
	/// Configured expiration window in seconds.
	pub expires_in: u32,
	/// Scope of the access token, empty when unscoped.
	pub scope: String,
	/// User the access token is bound to, empty for client credentials grants.
	pub user_id: String,
	/// Identifier of the new refresh token, if one was minted.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<String>,
}
impl TokenResponse {
	/// Assembles the response from the freshly minted tokens.
	pub fn new(access: &Token, expires_in: u32, refresh: Option<&Token>) -> Self {
		debug_assert_eq!(access.kind, TokenKind::AccessToken);

		Self {
			token_type: BEARER.into(),
			access_token: access.token_id.to_string(),
			expires_in,
			scope: access.scope.as_ref().map(ToString::to_string).unwrap_or_default(),
			user_id: access.user_id.as_ref().map(ToString::to_string).unwrap_or_default(),
			refresh_token: refresh.map(|token| token.token_id.to_string()),
		}
	}
}
