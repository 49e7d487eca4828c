// std
use std::sync::{
	Arc, Mutex,
	atomic::{AtomicUsize, Ordering},
};
// crates.io
use time::{Duration, macros};
// self
use cloud_integration_auth::{
	auth::{ClientId, Expiration, Password, Token, TokenId, TokenKind, UserId, Username},
	clock::{Clock, FixedClock},
	config::{IssuerConfig, RefreshTokenRotation},
	error::Error,
	issuer::TokenIssuer,
	request::TokenRequest,
	response::TokenResponse,
	store::{
		CredentialStore, MemoryCredentialStore, MemoryTokenStore, StaticClientCredentials,
		StoreError, TokenStore,
	},
};

const USERNAME: &str = "jane";
const PASSWORD: &str = "pa55word";
const USER_ID: &str = "user-42";

/// Token store that counts every call and fails saves of a chosen kind once armed.
#[derive(Default)]
struct RecordingTokenStore {
	inner: MemoryTokenStore,
	calls: AtomicUsize,
	saves: AtomicUsize,
	fail_expiring: Mutex<Option<TokenKind>>,
	clock_now: Mutex<Option<time::PrimitiveDateTime>>,
}
impl RecordingTokenStore {
	fn fail_expiring(&self, kind: TokenKind, now: time::PrimitiveDateTime) {
		*self.fail_expiring.lock().expect("Lock should not be poisoned.") = Some(kind);
		*self.clock_now.lock().expect("Lock should not be poisoned.") = Some(now);
	}
}
impl TokenStore for RecordingTokenStore {
	fn load_token(&self, token_id: &TokenId, kind: TokenKind) -> Result<Token, StoreError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inner.load_token(token_id, kind)
	}

	fn load_token_by_user_id(
		&self,
		user_id: &UserId,
		kind: TokenKind,
	) -> Result<Option<Token>, StoreError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inner.load_token_by_user_id(user_id, kind)
	}

	fn generate_token_id(&self, kind: TokenKind) -> Result<TokenId, StoreError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inner.generate_token_id(kind)
	}

	fn save_token(&self, token: Token) -> Result<(), StoreError> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let failing = *self.fail_expiring.lock().expect("Lock should not be poisoned.");
		let now = *self.clock_now.lock().expect("Lock should not be poisoned.");

		if failing == Some(token.kind) && Some(token.expiration) == now.map(Expiration::at) {
			return Err(StoreError::Backend { message: "disk full".into() });
		}

		self.saves.fetch_add(1, Ordering::SeqCst);
		self.inner.save_token(token)
	}
}

/// Credential store that counts lookups and can be switched into a failing state.
struct RecordingCredentialStore {
	inner: MemoryCredentialStore,
	calls: AtomicUsize,
	broken: bool,
}
impl CredentialStore for RecordingCredentialStore {
	fn user_id_by_credentials(
		&self,
		username: &Username,
		password: &Password,
	) -> Result<Option<UserId>, StoreError> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		if self.broken {
			return Err(StoreError::Backend { message: "ldap unreachable".into() });
		}

		self.inner.user_id_by_credentials(username, password)
	}
}

struct Harness {
	issuer: TokenIssuer,
	tokens: Arc<RecordingTokenStore>,
	credentials: Arc<RecordingCredentialStore>,
	clock: FixedClock,
}
impl Harness {
	fn new(config: IssuerConfig) -> Self {
		Self::with_credentials(config, false)
	}

	fn with_credentials(config: IssuerConfig, broken: bool) -> Self {
		let client = StaticClientCredentials::new(
			ClientId::new("shop-app").expect("Client id fixture should be valid."),
		);
		let tokens = Arc::new(RecordingTokenStore::default());
		let credentials = Arc::new(RecordingCredentialStore {
			inner: MemoryCredentialStore::default().with_user(
				USERNAME,
				PASSWORD,
				UserId::new(USER_ID).expect("User id fixture should be valid."),
			),
			calls: AtomicUsize::new(0),
			broken,
		});
		let clock = FixedClock::new(macros::datetime!(2025-03-01 12:00));
		let issuer = TokenIssuer::new(Arc::new(client), tokens.clone(), credentials.clone())
			.with_config(config)
			.with_clock(Arc::new(clock.clone()));

		Self { issuer, tokens, credentials, clock }
	}

	fn login(&self) -> TokenResponse {
		let response = self
			.issuer
			.handle(&password(USERNAME, PASSWORD))
			.expect("Password grant should succeed.");

		serde_json::from_str(&response.body).expect("Token response should be JSON.")
	}

	fn load(&self, raw: &str, kind: TokenKind) -> Token {
		self.tokens
			.inner
			.load_token(&TokenId::new(raw).expect("Token id should be valid."), kind)
			.expect("Token should be persisted.")
	}

	fn store_calls(&self) -> usize {
		self.tokens.calls.load(Ordering::SeqCst) + self.credentials.calls.load(Ordering::SeqCst)
	}
}

fn password(username: &str, password: &str) -> TokenRequest {
	TokenRequest::new()
		.with_param("grant_type", "password")
		.with_param("username", username)
		.with_param("password", password)
}

fn refresh(refresh_token: &str) -> TokenRequest {
	TokenRequest::new()
		.with_param("grant_type", "refresh_token")
		.with_param("refresh_token", refresh_token)
}

#[test]
fn client_credentials_issue_unbound_access_token() -> color_eyre::Result<()> {
	let harness = Harness::new(IssuerConfig::default());
	let response = harness
		.issuer
		.handle(&TokenRequest::from_form("grant_type=client_credentials"))?;
	let body: serde_json::Value = serde_json::from_str(&response.body)?;

	assert_eq!(response.status, 200);
	assert_eq!(body["token_type"], "Bearer");
	assert_eq!(body["user_id"], "");
	assert_eq!(body["scope"], "");
	assert_eq!(body["expires_in"], 3600);
	assert!(body.get("refresh_token").is_none());
	assert_eq!(harness.tokens.inner.len(), 1);

	let access = harness.load(
		body["access_token"].as_str().expect("access_token should be a string."),
		TokenKind::AccessToken,
	);

	assert_eq!(access.user_id, None);
	assert_eq!(access.client_id.as_ref(), "shop-app");

	Ok(())
}

#[test]
fn password_grant_soft_expires_previous_tokens() {
	let harness = Harness::new(IssuerConfig::default());
	let first = harness.login();

	harness.clock.advance(Duration::minutes(10));

	let second = harness.login();
	let issued_at = harness.clock.now();
	let old_access = harness.load(&first.access_token, TokenKind::AccessToken);
	let old_refresh = harness.load(
		first.refresh_token.as_deref().expect("Password grant mints a refresh token."),
		TokenKind::RefreshToken,
	);
	let new_access = harness.load(&second.access_token, TokenKind::AccessToken);

	assert_eq!(second.user_id, USER_ID);
	assert!(old_access.expiration.instant() <= issued_at);
	assert!(old_refresh.expiration.instant() <= issued_at);
	assert_eq!(old_access.client_id, new_access.client_id);
	assert_eq!(old_access.user_id, new_access.user_id);
	assert!(!new_access.is_expired_at(issued_at));
	assert_eq!(harness.tokens.inner.len(), 4);
}

#[test]
fn empty_credentials_fail_before_any_store_call() {
	let harness = Harness::new(IssuerConfig::default());

	for request in [
		password("", PASSWORD),
		password(USERNAME, ""),
		TokenRequest::new().with_param("grant_type", "password"),
	] {
		let err = harness.issuer.handle(&request).expect_err("Empty credentials must fail.");

		assert!(matches!(err, Error::BadRequest { .. }));
		assert_eq!(err.to_string(), "Bad request: No username or password specified.");
	}

	assert_eq!(harness.store_calls(), 0);
}

#[test]
fn wrong_credentials_mint_and_expire_nothing() {
	let harness = Harness::new(IssuerConfig::default());
	let first = harness.login();
	let saves = harness.tokens.saves.load(Ordering::SeqCst);
	let err =
		harness.issuer.handle(&password(USERNAME, "guess")).expect_err("Wrong password must fail.");
	let response = err.to_response();

	assert!(matches!(err, Error::Unauthorized { .. }));
	assert_eq!(response.status, 401);
	assert!(response.body.contains("The given user credentials are invalid."));
	assert_eq!(harness.tokens.saves.load(Ordering::SeqCst), saves);
	assert!(
		!harness
			.load(&first.access_token, TokenKind::AccessToken)
			.is_expired_at(harness.clock.now())
	);
}

#[test]
fn credential_store_failures_are_runtime_errors() {
	let harness = Harness::with_credentials(IssuerConfig::default(), true);
	let err = harness.issuer.handle(&password(USERNAME, PASSWORD)).expect_err("Lookup must fail.");

	assert!(matches!(err, Error::Runtime(_)));
	assert_eq!(err.to_string(), "Failed to load the UserId from repository.");
	assert_eq!(err.status(), 500);
	assert!(harness.tokens.inner.is_empty());
}

#[test]
fn unknown_refresh_token_mints_nothing() {
	let harness = Harness::new(IssuerConfig::default());
	let err = harness.issuer.handle(&refresh("never-issued")).expect_err("Unknown token.");

	assert!(matches!(err, Error::Runtime(_)));
	assert_eq!(harness.tokens.saves.load(Ordering::SeqCst), 0);
	assert!(harness.tokens.inner.is_empty());
}

#[test]
fn malformed_refresh_token_reads_as_unknown() {
	let harness = Harness::new(IssuerConfig::default());

	for presented in ["r".repeat(300), "line\nbreak".to_owned()] {
		let err = harness.issuer.handle(&refresh(&presented)).expect_err("No such token exists.");

		assert!(matches!(err, Error::Runtime(_)));
		assert_eq!(err.to_string(), "Failed to load refresh token from repository.");
	}

	assert_eq!(harness.tokens.saves.load(Ordering::SeqCst), 0);
}

#[test]
fn refresh_grant_rotates_for_the_token_owner() {
	let harness = Harness::new(IssuerConfig::default());
	let login = harness.login();
	let presented = login.refresh_token.expect("Password grant mints a refresh token.");

	harness.clock.advance(Duration::minutes(30));

	let response = harness.issuer.handle(&refresh(&presented)).expect("Refresh should succeed.");
	let refreshed: TokenResponse =
		serde_json::from_str(&response.body).expect("Token response should be JSON.");
	let now = harness.clock.now();

	assert_eq!(refreshed.user_id, USER_ID);
	assert_ne!(refreshed.access_token, login.access_token);
	assert!(refreshed.refresh_token.is_some_and(|r| r != presented));
	assert!(harness.load(&login.access_token, TokenKind::AccessToken).is_expired_at(now));
	assert!(harness.load(&presented, TokenKind::RefreshToken).is_expired_at(now));
	assert!(harness.issuer.handle(&refresh(&presented)).is_err());
}

#[test]
fn keep_presented_rotation_leaves_refresh_token_usable() {
	let config = IssuerConfig::builder()
		.refresh_rotation(RefreshTokenRotation::KeepPresented)
		.build()
		.expect("Config should build.");
	let harness = Harness::new(config);
	let presented = harness.login().refresh_token.expect("Password grant mints a refresh token.");

	harness.issuer.handle(&refresh(&presented)).expect("First refresh should succeed.");
	harness.issuer.handle(&refresh(&presented)).expect("Presented token stays usable.");

	assert!(
		!harness.load(&presented, TokenKind::RefreshToken).is_expired_at(harness.clock.now())
	);
}

#[test]
fn expires_in_echoes_the_configured_window() {
	let config = IssuerConfig::builder()
		.expires_in(Duration::minutes(10))
		.build()
		.expect("Config should build.");
	let harness = Harness::new(config);
	let login = harness.login();
	let access = harness.load(&login.access_token, TokenKind::AccessToken);

	assert_eq!(login.expires_in, 600);
	assert_eq!(access.expiration, Expiration::at(macros::datetime!(2025-03-01 12:10)));
}

#[test]
fn responses_carry_the_fixed_header_set() {
	let harness = Harness::new(IssuerConfig::default());
	let response = harness.issuer.handle(&password(USERNAME, PASSWORD)).expect("Login.");
	let names = response.headers.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();

	assert_eq!(
		names,
		["Content-Type", "Cache-Control", "Pragma", "Content-Language", "Content-Length"]
	);
	assert_eq!(response.header("content-type"), Some("application/json; charset=utf-8"));
	assert_eq!(response.header("cache-control"), Some("no-store"));
	assert_eq!(response.header("pragma"), Some("no-cache"));
	assert_eq!(response.header("content-language"), Some("en"));
	assert_eq!(response.header("content-length"), Some(response.body.len().to_string().as_str()));
	assert!(serde_json::from_str::<serde_json::Value>(&response.body).is_ok());
}

#[test]
fn failed_expiry_keeps_the_new_tokens() {
	let harness = Harness::new(IssuerConfig::default());
	let first = harness.login();

	harness.clock.advance(Duration::minutes(1));
	harness.tokens.fail_expiring(TokenKind::AccessToken, harness.clock.now());

	let err = harness.issuer.handle(&password(USERNAME, PASSWORD)).expect_err("Expiry fails.");

	assert_eq!(err.to_string(), "Failed to save token of type: access_token.");
	assert_eq!(harness.tokens.inner.len(), 4);
	assert!(
		!harness
			.load(&first.access_token, TokenKind::AccessToken)
			.is_expired_at(harness.clock.now())
	);
	assert_eq!(harness.issuer.metrics().failures(), 1);
}
