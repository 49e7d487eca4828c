//! Client authentication for the token endpoint (RFC 6749 §2.3.1).
//!
//! Two presentations are accepted, checked in this order:
//!
//! - `Authorization: Basic base64(client_id:client_secret)`;
//! - `client_id` (+ `client_secret`) form parameters.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::{
	_prelude::*,
	auth::{ClientId, ClientSecret},
	request::TokenRequest,
	store::ClientCredentialsStore,
};

const BASIC_SCHEME: &str = "basic";

/// Verifies the presented client against a [`ClientCredentialsStore`].
#[derive(Clone)]
pub struct ClientAuthenticator {
	client: Arc<dyn ClientCredentialsStore>,
}
impl ClientAuthenticator {
	/// Creates an authenticator backed by `client`.
	pub fn new(client: Arc<dyn ClientCredentialsStore>) -> Self {
		Self { client }
	}

	/// Returns the configured client id when the request carries matching credentials.
	///
	/// Public clients (no stored secret) must not present a secret; confidential clients must
	/// present the stored one.
	pub fn authenticate(&self, request: &TokenRequest) -> Result<ClientId> {
		let (presented_id, presented_secret) = presented_credentials(request)?;
		let expected_id = self.client.client_id().map_err(|e| {
			Error::runtime("Failed to load the client credentials from repository", e)
		})?;
		let expected_secret = self.client.client_secret().map_err(|e| {
			Error::runtime("Failed to load the client credentials from repository", e)
		})?;

		if presented_id != expected_id.as_ref() {
			return Err(Error::unauthorized("Client authentication failed."));
		}

		let secret_matches = match (&expected_secret, presented_secret.as_deref()) {
			(None, None) => true,
			(Some(expected), Some(presented)) => secrets_match(expected, presented),
			_ => false,
		};

		if !secret_matches {
			return Err(Error::unauthorized("Client authentication failed."));
		}

		Ok(expected_id)
	}
}
impl Debug for ClientAuthenticator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientAuthenticator").finish_non_exhaustive()
	}
}

fn presented_credentials(request: &TokenRequest) -> Result<(String, Option<String>)> {
	if let Some(header) = request.header("Authorization") {
		let (scheme, encoded) = header
			.trim()
			.split_once(' ')
			.ok_or_else(|| Error::bad_request("Malformed Authorization header."))?;

		if scheme.eq_ignore_ascii_case(BASIC_SCHEME) {
			let decoded = STANDARD
				.decode(encoded.trim())
				.ok()
				.and_then(|bytes| String::from_utf8(bytes).ok())
				.ok_or_else(|| Error::bad_request("Malformed Authorization header."))?;
			let (id, secret) = decoded
				.split_once(':')
				.ok_or_else(|| Error::bad_request("Malformed Authorization header."))?;

			return Ok((id.to_owned(), Some(secret.to_owned()).filter(|s| !s.is_empty())));
		}
	}

	let id = request
		.param("client_id")
		.filter(|id| !id.is_empty())
		.ok_or_else(|| Error::unauthorized("Client authentication is required."))?;
	let secret = request.param("client_secret").filter(|s| !s.is_empty()).map(str::to_owned);

	Ok((id.to_owned(), secret))
}

// Constant-time for equal lengths.
fn secrets_match(expected: &ClientSecret, presented: &str) -> bool {
	let expected = expected.expose().as_bytes();
	let presented = presented.as_bytes();

	expected.len() == presented.len()
		&& expected.iter().zip(presented).fold(0_u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::store::StaticClientCredentials;

	fn authenticator(secret: Option<&str>) -> ClientAuthenticator {
		let client = StaticClientCredentials::new(
			ClientId::new("shop-app").expect("Client id fixture should be valid."),
		);
		let client = match secret {
			Some(secret) => client.with_secret(secret),
			None => client,
		};

		ClientAuthenticator::new(Arc::new(client))
	}

	#[test]
	fn basic_header_authenticates_confidential_clients() {
		let header = format!("Basic {}", STANDARD.encode("shop-app:s3cret"));
		let request = TokenRequest::new().with_header("authorization", header);

		assert_eq!(
			authenticator(Some("s3cret"))
				.authenticate(&request)
				.expect("Basic credentials should authenticate.")
				.as_ref(),
			"shop-app"
		);

		let wrong = TokenRequest::new()
			.with_header("Authorization", format!("Basic {}", STANDARD.encode("shop-app:nope")));

		assert!(matches!(
			authenticator(Some("s3cret")).authenticate(&wrong),
			Err(Error::Unauthorized { .. })
		));
	}

	#[test]
	fn form_parameters_authenticate_public_and_confidential_clients() {
		let public = TokenRequest::new().with_param("client_id", "shop-app");
		let confidential = public.clone().with_param("client_secret", "s3cret");

		assert!(authenticator(None).authenticate(&public).is_ok());
		assert!(authenticator(Some("s3cret")).authenticate(&confidential).is_ok());
		assert!(matches!(
			authenticator(Some("s3cret")).authenticate(&public),
			Err(Error::Unauthorized { .. })
		));
		assert!(matches!(
			authenticator(None).authenticate(&confidential),
			Err(Error::Unauthorized { .. })
		));
	}

	#[test]
	fn missing_or_malformed_credentials_are_rejected() {
		let foreign = TokenRequest::new().with_param("client_id", "other-app");
		let garbage = TokenRequest::new().with_header("Authorization", "Basic %%%");

		assert!(matches!(
			authenticator(None).authenticate(&TokenRequest::new()),
			Err(Error::Unauthorized { .. })
		));
		assert!(matches!(
			authenticator(None).authenticate(&foreign),
			Err(Error::Unauthorized { .. })
		));
		assert!(matches!(
			authenticator(None).authenticate(&garbage),
			Err(Error::BadRequest { .. })
		));
	}
}
