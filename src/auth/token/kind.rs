//! Closed set of token kinds minted by the issuer.

// self
use crate::_prelude::*;

/// Kind of an issued token; doubles as the store index key and the response field name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
	/// Short-lived credential presented on API calls.
	AccessToken,
	/// Longer-lived credential exchanged for a new access token.
	RefreshToken,
}
impl TokenKind {
	/// Returns the wire name used as the response field key.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenKind::AccessToken => "access_token",
			TokenKind::RefreshToken => "refresh_token",
		}
	}
}
impl Display for TokenKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
