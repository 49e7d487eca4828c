//! Pure issuance decisions: which tokens to mint and which to soft-expire.

// self
use crate::{
	auth::{Token, UserId},
	config::RefreshTokenRotation,
};

/// Everything the write phase needs, decided before any token is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuancePlan {
	/// User the new tokens are bound to; `None` for app-only tokens.
	pub user_id: Option<UserId>,
	/// Previously issued tokens to soft-expire, access token first.
	pub expire: Vec<Token>,
}
impl IssuancePlan {
	/// Plan for `client_credentials`: no user, nothing to expire.
	pub fn app_only() -> Self {
		Self { user_id: None, expire: Vec::new() }
	}

	/// Plan for `password`: expire whatever the user currently holds.
	pub fn password(
		user_id: UserId,
		old_access: Option<Token>,
		old_refresh: Option<Token>,
	) -> Self {
		Self { user_id: Some(user_id), expire: old_access.into_iter().chain(old_refresh).collect() }
	}

	/// Plan for `refresh_token`: expire the user's access token and, depending on `rotation`,
	/// the presented refresh token.
	pub fn refresh(
		presented: Token,
		old_access: Option<Token>,
		rotation: RefreshTokenRotation,
	) -> Self {
		let user_id = presented.user_id.clone();
		let presented = match rotation {
			RefreshTokenRotation::ExpirePresented => Some(presented),
			RefreshTokenRotation::KeepPresented => None,
		};

		Self { user_id, expire: old_access.into_iter().chain(presented).collect() }
	}

	/// Refresh tokens are only minted for user-bound grants.
	pub fn mints_refresh_token(&self) -> bool {
		self.user_id.is_some()
	}
}
