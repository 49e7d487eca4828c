//! Issued token records and lifecycle helpers.

// crates.io
use time::PrimitiveDateTime;
// self
use crate::{
	_prelude::*,
	auth::{ClientId, Expiration, ScopeSet, TokenId, TokenKind, UserId},
};

/// Lifecycle status for a token record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Token is currently valid.
	Active,
	/// Token reached its expiration stamp, either naturally or through soft invalidation.
	Expired,
}

/// One issued credential as persisted by a [`TokenStore`](crate::store::TokenStore).
///
/// Records are never deleted by the issuer. Invalidation rewrites the expiration to the
/// current instant via [`Token::expired_at`] and saves the record again.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Access or refresh.
	pub kind: TokenKind,
	/// Opaque identifier; this is the bearer secret and must not be logged.
	pub token_id: TokenId,
	/// Client the token was issued to.
	pub client_id: ClientId,
	/// User the token is bound to; absent for client credentials grants.
	pub user_id: Option<UserId>,
	/// Instant after which the token reads as expired.
	pub expiration: Expiration,
	/// Granted scopes; never populated by the issuer yet.
	pub scope: Option<ScopeSet>,
}
impl Token {
	/// Creates an unscoped token record.
	pub fn new(
		kind: TokenKind,
		token_id: TokenId,
		client_id: ClientId,
		user_id: Option<UserId>,
		expiration: Expiration,
	) -> Self {
		Self { kind, token_id, client_id, user_id, expiration, scope: None }
	}

	/// Returns a copy with identical identity fields whose expiration is `now`.
	pub fn expired_at(&self, now: PrimitiveDateTime) -> Self {
		Self { expiration: Expiration::at(now), ..self.clone() }
	}

	/// Computes the lifecycle status at `now`.
	pub fn status_at(&self, now: PrimitiveDateTime) -> TokenStatus {
		if self.expiration.is_expired_at(now) { TokenStatus::Expired } else { TokenStatus::Active }
	}

	/// Returns `true` if the token reads as expired at `now`.
	pub fn is_expired_at(&self, now: PrimitiveDateTime) -> bool {
		matches!(self.status_at(now), TokenStatus::Expired)
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("kind", &self.kind)
			.field("token_id", &"<redacted>")
			.field("client_id", &self.client_id)
			.field("user_id", &self.user_id)
			.field("expiration", &self.expiration)
			.field("scope", &self.scope)
			.finish()
	}
}
