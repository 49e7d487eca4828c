//! File-backed [`TokenStore`] for single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{Token, TokenId, TokenKind, UserId},
	store::{self, StoreError, TokenStore, TokenTable},
};

/// Persists token rows to a JSON file after each write.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
	path: PathBuf,
	inner: Arc<RwLock<TokenTable>>,
}
impl FileTokenStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let table = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(table)) })
	}

	/// Location of the JSON snapshot.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<TokenTable, StoreError> {
		if !path.exists() {
			return Ok(TokenTable::default());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.is_empty() {
			return Ok(TokenTable::default());
		}

		let mut de = serde_json::Deserializer::from_slice(&bytes);
		let table: TokenTable =
			serde_path_to_error::deserialize(&mut de).map_err(|e| StoreError::Serialization {
				message: format!(
					"Failed to parse {} at `{}`: {}",
					path.display(),
					e.path(),
					e.inner()
				),
			})?;

		Ok(table.reindex())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &TokenTable) -> Result<(), StoreError> {
		let serialized =
			serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl TokenStore for FileTokenStore {
	fn load_token(&self, token_id: &TokenId, kind: TokenKind) -> Result<Token, StoreError> {
		self.inner.read().get(token_id, kind).cloned().ok_or(StoreError::NotFound { kind })
	}

	fn load_token_by_user_id(
		&self,
		user_id: &UserId,
		kind: TokenKind,
	) -> Result<Option<Token>, StoreError> {
		Ok(self.inner.read().current(user_id, kind).cloned())
	}

	fn generate_token_id(&self, _: TokenKind) -> Result<TokenId, StoreError> {
		store::fresh_token_id(&self.inner.read())
	}

	fn save_token(&self, token: Token) -> Result<(), StoreError> {
		let mut guard = self.inner.write();
		let mut staged = guard.clone();

		staged.upsert(token);
		self.persist_locked(&staged)?;

		*guard = staged;

		Ok(())
	}
}
