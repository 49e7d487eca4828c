//! Storage contracts consumed by the issuer and built-in store implementations.
//!
//! The issuer never touches persistence directly: user lookups go through
//! [`CredentialStore`], the issuing client through [`ClientCredentialsStore`], and every token
//! read or write through [`TokenStore`]. All calls are synchronous; implementations own their
//! retry policy and atomicity guarantees.

pub mod credentials;
pub mod file;
pub mod memory;

pub use credentials::{MemoryCredentialStore, StaticClientCredentials};
pub use file::FileTokenStore;
pub use memory::MemoryTokenStore;

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{ClientId, ClientSecret, Password, Token, TokenId, TokenKind, UserId, Username},
};

const TOKEN_ID_LEN: usize = 32;

/// Persistence contract for issued tokens.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Loads a token by identifier; unknown identifiers are an error.
	fn load_token(&self, token_id: &TokenId, kind: TokenKind) -> Result<Token, StoreError>;

	/// Loads the current token of `kind` bound to `user_id`, if any.
	fn load_token_by_user_id(
		&self,
		user_id: &UserId,
		kind: TokenKind,
	) -> Result<Option<Token>, StoreError>;

	/// Generates a fresh, unused token identifier.
	fn generate_token_id(&self, kind: TokenKind) -> Result<TokenId, StoreError>;

	/// Persists a new token or overwrites an existing one with the same kind + identifier.
	fn save_token(&self, token: Token) -> Result<(), StoreError>;
}

/// Resolves resource owners from the credentials presented on the password grant.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the user identifier when the credentials match, `None` otherwise.
	fn user_id_by_credentials(
		&self,
		username: &Username,
		password: &Password,
	) -> Result<Option<UserId>, StoreError>;
}

/// Supplies the credentials of the client application the issuer mints tokens for.
pub trait ClientCredentialsStore
where
	Self: Send + Sync,
{
	/// Returns the client identifier stamped onto every issued token.
	fn client_id(&self) -> Result<ClientId, StoreError>;

	/// Returns the client secret, if the client is confidential.
	fn client_secret(&self) -> Result<Option<ClientSecret>, StoreError>;
}

/// Error type produced by store implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// No token with the requested kind + identifier exists.
	#[error("No {kind} exists for the given identifier.")]
	NotFound {
		/// Kind that was requested.
		kind: TokenKind,
	},
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Token rows plus the (user, kind) index shared by the built-in token stores.
///
/// The index points at the most recently *created* token per (user, kind). Overwriting an
/// existing row (soft expiry) leaves the index untouched so a stale token never becomes
/// current again.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub(crate) struct TokenTable {
	tokens: Vec<Token>,
	current: Vec<CurrentEntry>,
	#[serde(skip)]
	rows: HashMap<(TokenKind, TokenId), usize>,
	#[serde(skip)]
	index: HashMap<(UserId, TokenKind), TokenId>,
}
impl TokenTable {
	pub(crate) fn reindex(mut self) -> Self {
		self.rows = self
			.tokens
			.iter()
			.enumerate()
			.map(|(i, token)| ((token.kind, token.token_id.clone()), i))
			.collect();
		self.index = self
			.current
			.iter()
			.map(|entry| ((entry.user_id.clone(), entry.kind), entry.token_id.clone()))
			.collect();

		self
	}

	pub(crate) fn get(&self, token_id: &TokenId, kind: TokenKind) -> Option<&Token> {
		self.rows.get(&(kind, token_id.clone())).map(|&i| &self.tokens[i])
	}

	pub(crate) fn current(&self, user_id: &UserId, kind: TokenKind) -> Option<&Token> {
		self.index.get(&(user_id.clone(), kind)).and_then(|token_id| self.get(token_id, kind))
	}

	pub(crate) fn contains_id(&self, token_id: &TokenId) -> bool {
		[TokenKind::AccessToken, TokenKind::RefreshToken]
			.into_iter()
			.any(|kind| self.rows.contains_key(&(kind, token_id.clone())))
	}

	pub(crate) fn upsert(&mut self, token: Token) {
		let key = (token.kind, token.token_id.clone());

		if let Some(&i) = self.rows.get(&key) {
			self.tokens[i] = token;

			return;
		}
		if let Some(user_id) = token.user_id.clone() {
			let entry = CurrentEntry {
				user_id: user_id.clone(),
				kind: token.kind,
				token_id: token.token_id.clone(),
			};

			match self.current.iter_mut().find(|e| e.user_id == user_id && e.kind == token.kind) {
				Some(existing) => *existing = entry,
				None => self.current.push(entry),
			}

			self.index.insert((user_id, token.kind), token.token_id.clone());
		}

		self.rows.insert(key, self.tokens.len());
		self.tokens.push(token);
	}

	pub(crate) fn tokens(&self) -> &[Token] {
		&self.tokens
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct CurrentEntry {
	user_id: UserId,
	kind: TokenKind,
	token_id: TokenId,
}

/// Draws identifiers until one is not already taken in `table`.
pub(crate) fn fresh_token_id(table: &TokenTable) -> Result<TokenId, StoreError> {
	loop {
		let candidate: String =
			rand::rng().sample_iter(Alphanumeric).take(TOKEN_ID_LEN).map(char::from).collect();
		let token_id =
			TokenId::new(candidate).map_err(|e| StoreError::Backend { message: e.to_string() })?;

		if !table.contains_id(&token_id) {
			return Ok(token_id);
		}
	}
}
