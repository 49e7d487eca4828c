//! In-memory credential sources for the password grant and client authentication.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{
	_prelude::*,
	auth::{ClientId, ClientSecret, Password, UserId, Username},
	store::{ClientCredentialsStore, CredentialStore, StoreError},
};

/// Username → (password digest, user id) table.
///
/// Passwords are kept only as base64 (no padding) SHA-256 digests.
#[derive(Clone, Debug, Default)]
pub struct MemoryCredentialStore(Arc<RwLock<HashMap<String, (String, UserId)>>>);
impl MemoryCredentialStore {
	/// Registers (or replaces) a user.
	pub fn insert(&self, username: impl Into<String>, password: &Password, user_id: UserId) {
		self.0.write().insert(username.into(), (digest(password), user_id));
	}

	/// Builder-style variant of [`insert`](Self::insert).
	pub fn with_user(self, username: impl Into<String>, password: &str, user_id: UserId) -> Self {
		self.insert(username, &Password::new(password), user_id);

		self
	}
}
impl CredentialStore for MemoryCredentialStore {
	fn user_id_by_credentials(
		&self,
		username: &Username,
		password: &Password,
	) -> Result<Option<UserId>, StoreError> {
		let users = self.0.read();

		Ok(users
			.get(username.as_ref())
			.filter(|(stored, _)| *stored == digest(password))
			.map(|(_, user_id)| user_id.clone()))
	}
}

/// Fixed client identity configured at startup.
#[derive(Clone, Debug)]
pub struct StaticClientCredentials {
	client_id: ClientId,
	client_secret: Option<ClientSecret>,
}
impl StaticClientCredentials {
	/// Creates a public client without a secret.
	pub fn new(client_id: ClientId) -> Self {
		Self { client_id, client_secret: None }
	}

	/// Attaches a client secret, making the client confidential.
	pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(ClientSecret::new(secret));

		self
	}
}
impl ClientCredentialsStore for StaticClientCredentials {
	fn client_id(&self) -> Result<ClientId, StoreError> {
		Ok(self.client_id.clone())
	}

	fn client_secret(&self) -> Result<Option<ClientSecret>, StoreError> {
		Ok(self.client_secret.clone())
	}
}

fn digest(password: &Password) -> String {
	let mut hasher = Sha256::new();

	hasher.update(password.expose().as_bytes());

	STANDARD_NO_PAD.encode(hasher.finalize())
}
