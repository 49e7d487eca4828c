//! Issuer configuration and its validating builder.

// self
use crate::{_prelude::*, error::ConfigError};

/// What happens to the refresh token presented on a `refresh_token` grant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshTokenRotation {
	/// Soft-expire the presented refresh token once the new pair is minted.
	#[default]
	ExpirePresented,
	/// Leave the presented refresh token untouched; it stays usable until it expires.
	KeepPresented,
}

/// Validated issuer configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IssuerConfig {
	/// Lifetime of minted tokens, echoed as `expires_in`.
	pub expires_in: Duration,
	/// Reuse policy for presented refresh tokens.
	pub refresh_rotation: RefreshTokenRotation,
	/// Reject refresh tokens whose expiration has passed.
	pub reject_expired_refresh: bool,
	/// Serialize concurrent issuance for the same user inside this process.
	pub serialize_per_user: bool,
}
impl IssuerConfig {
	/// Default token lifetime.
	pub const DEFAULT_EXPIRES_IN: Duration = Duration::seconds(3600);

	/// Returns a builder seeded with the defaults.
	pub fn builder() -> IssuerConfigBuilder {
		IssuerConfigBuilder::default()
	}

	/// Parses a JSON document; omitted fields keep their defaults.
	///
	/// ```json
	/// { "expires_in": 7200, "refresh_rotation": "keep_presented" }
	/// ```
	pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);
		let file: ConfigFile = serde_path_to_error::deserialize(&mut de).map_err(|e| {
			ConfigError::Parse { path: e.path().to_string(), message: e.inner().to_string() }
		})?;
		let mut builder = Self::builder();

		if let Some(secs) = file.expires_in {
			builder = builder.expires_in(Duration::seconds(secs));
		}
		if let Some(rotation) = file.refresh_rotation {
			builder = builder.refresh_rotation(rotation);
		}
		if let Some(reject) = file.reject_expired_refresh {
			builder = builder.reject_expired_refresh(reject);
		}
		if let Some(serialize) = file.serialize_per_user {
			builder = builder.serialize_per_user(serialize);
		}

		builder.build()
	}

	/// The expiration window in whole seconds, as advertised on the wire.
	pub fn expires_in_secs(&self) -> u32 {
		u32::try_from(self.expires_in.whole_seconds()).unwrap_or(u32::MAX)
	}
}
impl Default for IssuerConfig {
	fn default() -> Self {
		Self {
			expires_in: Self::DEFAULT_EXPIRES_IN,
			refresh_rotation: RefreshTokenRotation::default(),
			reject_expired_refresh: true,
			serialize_per_user: false,
		}
	}
}

/// Builder for [`IssuerConfig`].
#[derive(Clone, Debug, Default)]
pub struct IssuerConfigBuilder {
	config: IssuerConfig,
}
impl IssuerConfigBuilder {
	/// Sets the token lifetime.
	pub fn expires_in(mut self, window: Duration) -> Self {
		self.config.expires_in = window;

		self
	}

	/// Sets the refresh token reuse policy.
	pub fn refresh_rotation(mut self, rotation: RefreshTokenRotation) -> Self {
		self.config.refresh_rotation = rotation;

		self
	}

	/// Toggles rejection of expired refresh tokens.
	pub fn reject_expired_refresh(mut self, reject: bool) -> Self {
		self.config.reject_expired_refresh = reject;

		self
	}

	/// Toggles the per-user issuance guard.
	pub fn serialize_per_user(mut self, serialize: bool) -> Self {
		self.config.serialize_per_user = serialize;

		self
	}

	/// Validates and returns the configuration.
	pub fn build(self) -> Result<IssuerConfig, ConfigError> {
		let secs = self.config.expires_in.whole_seconds();

		if secs <= 0 {
			return Err(ConfigError::NonPositiveExpiresIn);
		}
		if secs > i64::from(u32::MAX) {
			return Err(ConfigError::ExpiresInOutOfRange);
		}

		Ok(self.config)
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
	expires_in: Option<i64>,
	refresh_rotation: Option<RefreshTokenRotation>,
	reject_expired_refresh: Option<bool>,
	serialize_per_user: Option<bool>,
}
