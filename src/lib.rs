//! OAuth 2.0 token issuance for cloud integrations: resolve the grant, mint fresh access and
//! refresh tokens, and soft-expire the ones they replace, all over pluggable stores.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod issuer;
pub mod obs;
pub mod request;
pub mod response;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test`
	//! crate feature.

	pub use crate::_prelude::*;

	// crates.io
	use time::macros;
	// self
	use crate::{
		auth::{ClientId, UserId},
		clock::FixedClock,
		config::IssuerConfig,
		issuer::TokenIssuer,
		request::TokenRequest,
		store::{MemoryCredentialStore, MemoryTokenStore, StaticClientCredentials},
	};

	/// Client id stamped on tokens issued by [`build_test_issuer`].
	pub const TEST_CLIENT_ID: &str = "client-it";
	/// Username registered in the test credential store.
	pub const TEST_USERNAME: &str = "alice";
	/// Password registered for [`TEST_USERNAME`].
	pub const TEST_PASSWORD: &str = "correct horse";
	/// User id resolved for [`TEST_USERNAME`].
	pub const TEST_USER_ID: &str = "user-1";

	/// Constructs a [`TokenIssuer`] backed by in-memory stores and a clock frozen at
	/// 2025-01-01 00:00, returning the token store and clock for inspection.
	pub fn build_test_issuer(config: IssuerConfig) -> (TokenIssuer, MemoryTokenStore, FixedClock) {
		let client = StaticClientCredentials::new(
			ClientId::new(TEST_CLIENT_ID).expect("Test client id should be valid."),
		);
		let credentials = MemoryCredentialStore::default().with_user(
			TEST_USERNAME,
			TEST_PASSWORD,
			UserId::new(TEST_USER_ID).expect("Test user id should be valid."),
		);
		let tokens = MemoryTokenStore::default();
		let clock = FixedClock::new(macros::datetime!(2025-01-01 00:00));
		let issuer =
			TokenIssuer::new(Arc::new(client), Arc::new(tokens.clone()), Arc::new(credentials))
				.with_config(config)
				.with_clock(Arc::new(clock.clone()));

		(issuer, tokens, clock)
	}

	/// Builds a `grant_type=password` request.
	pub fn password_request(username: &str, password: &str) -> TokenRequest {
		TokenRequest::new()
			.with_param("grant_type", "password")
			.with_param("username", username)
			.with_param("password", password)
	}
}

mod _prelude {
	pub use std::{
		borrow::Cow,
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
#[cfg(test)] use {color_eyre as _, tokio as _};
