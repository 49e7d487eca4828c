//! Thread-safe in-memory [`TokenStore`] for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{Token, TokenId, TokenKind, UserId},
	store::{self, StoreError, TokenStore, TokenTable},
};

/// Storage backend that keeps token rows in-process.
///
/// Each call takes the lock once, so individual reads and writes are atomic, but a
/// load-then-overwrite sequence spanning two calls is not.
#[derive(Clone, Debug, Default)]
pub struct MemoryTokenStore(Arc<RwLock<TokenTable>>);
impl MemoryTokenStore {
	/// Returns every stored row, including soft-expired ones.
	pub fn snapshot(&self) -> Vec<Token> {
		self.0.read().tokens().to_vec()
	}

	/// Number of stored rows.
	pub fn len(&self) -> usize {
		self.0.read().tokens().len()
	}

	/// Returns `true` when nothing has been stored yet.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
impl TokenStore for MemoryTokenStore {
	fn load_token(&self, token_id: &TokenId, kind: TokenKind) -> Result<Token, StoreError> {
		self.0.read().get(token_id, kind).cloned().ok_or(StoreError::NotFound { kind })
	}

	fn load_token_by_user_id(
		&self,
		user_id: &UserId,
		kind: TokenKind,
	) -> Result<Option<Token>, StoreError> {
		Ok(self.0.read().current(user_id, kind).cloned())
	}

	fn generate_token_id(&self, _: TokenKind) -> Result<TokenId, StoreError> {
		store::fresh_token_id(&self.0.read())
	}

	fn save_token(&self, token: Token) -> Result<(), StoreError> {
		self.0.write().upsert(token);

		Ok(())
	}
}
