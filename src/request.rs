//! Inbound token requests and grant parsing.
//!
//! [`TokenRequest`] is the transport-neutral view of a `POST /auth/token` call: named
//! parameters from the form body or query string plus request headers. [`GrantRequest`] is
//! the validated, closed set of grants the issuer understands.

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{Password, Username},
};

const REDACTED_PARAMS: [&str; 3] = ["password", "client_secret", "refresh_token"];

/// OAuth 2.0 grant types accepted by the issuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
	/// App-only tokens, no user.
	ClientCredentials,
	/// Resource Owner Password Credentials.
	Password,
	/// Exchange a refresh token for a new token pair.
	RefreshToken,
}
impl GrantType {
	/// Returns the RFC 6749 identifier for the grant type.
	pub const fn as_str(self) -> &'static str {
		match self {
			GrantType::ClientCredentials => "client_credentials",
			GrantType::Password => "password",
			GrantType::RefreshToken => "refresh_token",
		}
	}
}
impl Display for GrantType {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for GrantType {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"client_credentials" => Ok(GrantType::ClientCredentials),
			"password" => Ok(GrantType::Password),
			"refresh_token" => Ok(GrantType::RefreshToken),
			_ => Err(Error::bad_request("Unsupported or no grant_type provided.")),
		}
	}
}

/// Validated grant extracted from a [`TokenRequest`].
#[derive(Clone, PartialEq, Eq)]
pub enum GrantRequest {
	/// `grant_type=client_credentials`.
	ClientCredentials,
	/// `grant_type=password`; both fields are non-empty.
	Password {
		/// Presented username.
		username: Username,
		/// Presented password.
		password: Password,
	},
	/// `grant_type=refresh_token`.
	RefreshToken {
		/// Presented refresh token, as sent. It is only checked against the token store, so an
		/// identifier no store could hold reads as unknown.
		refresh_token: String,
	},
}
impl GrantRequest {
	/// Grant type of this request.
	pub fn grant_type(&self) -> GrantType {
		match self {
			Self::ClientCredentials => GrantType::ClientCredentials,
			Self::Password { .. } => GrantType::Password,
			Self::RefreshToken { .. } => GrantType::RefreshToken,
		}
	}
}
impl Debug for GrantRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::ClientCredentials => f.write_str("ClientCredentials"),
			Self::Password { username, password } => f
				.debug_struct("Password")
				.field("username", username)
				.field("password", password)
				.finish(),
			Self::RefreshToken { .. } =>
				f.debug_struct("RefreshToken").field("refresh_token", &"<redacted>").finish(),
		}
	}
}

/// Named parameters and headers of an inbound token request.
#[derive(Clone, Default)]
pub struct TokenRequest {
	params: BTreeMap<String, String>,
	headers: Vec<(String, String)>,
}
impl TokenRequest {
	/// Creates an empty request.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses an `application/x-www-form-urlencoded` body. The first occurrence of a repeated
	/// parameter wins.
	pub fn from_form(body: &str) -> Self {
		Self::from_pairs(form_urlencoded::parse(body.as_bytes()))
	}

	/// Reads parameters from the query string of `url`.
	pub fn from_query(url: &Url) -> Self {
		Self::from_pairs(url.query_pairs())
	}

	fn from_pairs<'a>(pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> Self {
		let mut params = BTreeMap::new();

		for (key, value) in pairs {
			params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
		}

		Self { params, headers: Vec::new() }
	}

	/// Sets (or replaces) a parameter.
	pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.insert(name.into(), value.into());

		self
	}

	/// Appends a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));

		self
	}

	/// Returns a parameter value.
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params.get(name).map(String::as_str)
	}

	/// Case-insensitive header lookup; the first match wins.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Validates the grant parameters without touching any store.
	pub fn grant(&self) -> Result<GrantRequest> {
		let grant_type = self
			.param("grant_type")
			.ok_or_else(|| Error::bad_request("Unsupported or no grant_type provided."))?
			.parse::<GrantType>()?;

		match grant_type {
			GrantType::ClientCredentials => Ok(GrantRequest::ClientCredentials),
			GrantType::Password => {
				let username = Username::new(self.param("username").unwrap_or_default());
				let password = Password::new(self.param("password").unwrap_or_default());

				if username.is_empty() || password.is_empty() {
					return Err(Error::bad_request("No username or password specified."));
				}

				Ok(GrantRequest::Password { username, password })
			},
			GrantType::RefreshToken => {
				let refresh_token = self
					.param("refresh_token")
					.filter(|value| !value.is_empty())
					.ok_or_else(|| Error::bad_request("No refresh_token specified."))?;

				Ok(GrantRequest::RefreshToken { refresh_token: refresh_token.to_owned() })
			},
		}
	}
}
impl Debug for TokenRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let params = self
			.params
			.iter()
			.map(|(key, value)| {
				let shown = if REDACTED_PARAMS.contains(&key.as_str()) {
					"<redacted>"
				} else {
					value.as_str()
				};

				(key.as_str(), shown)
			})
			.collect::<BTreeMap<_, _>>();
		let headers = self.headers.iter().map(|(key, _)| key.as_str()).collect::<Vec<_>>();

		f.debug_struct("TokenRequest").field("params", &params).field("headers", &headers).finish()
	}
}
