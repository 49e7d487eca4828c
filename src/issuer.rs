//! Token issuance state machine behind `POST /auth/token`.
//!
//! [`TokenIssuer::handle`] walks a linear sequence of [`IssuanceStage`]s:
//!
//! 1. validate the grant parameters;
//! 2. resolve the acting user and load the tokens it currently holds;
//! 3. mint the new access token, plus a refresh token for user-bound grants;
//! 4. soft-expire the previously loaded tokens;
//! 5. serialize the response.
//!
//! Any stage may exit early. Writes that already happened are not rolled back, so a failure
//! while expiring old tokens leaves both the old and the new tokens usable.

pub mod client_auth;
pub mod plan;

mod guard;

pub use client_auth::ClientAuthenticator;
pub use plan::IssuancePlan;

// crates.io
use time::PrimitiveDateTime;
// self
use crate::{
	_prelude::*,
	auth::{Expiration, Token, TokenId, TokenKind, UserId},
	clock::{Clock, SystemClock},
	config::IssuerConfig,
	issuer::guard::UserGuards,
	obs::{self, GrantOutcome, GrantSpan, IssuanceStage, IssuerMetrics},
	request::{GrantRequest, TokenRequest},
	response::{Response, TokenResponse},
	store::{ClientCredentialsStore, CredentialStore, StoreError, TokenStore},
};

/// Issues access and refresh tokens for the `client_credentials`, `password`, and
/// `refresh_token` grants.
#[derive(Clone)]
pub struct TokenIssuer {
	client: Arc<dyn ClientCredentialsStore>,
	tokens: Arc<dyn TokenStore>,
	credentials: Arc<dyn CredentialStore>,
	config: IssuerConfig,
	clock: Arc<dyn Clock>,
	metrics: Arc<IssuerMetrics>,
	guards: Arc<UserGuards>,
}
impl TokenIssuer {
	/// Creates an issuer with the default configuration and the system clock.
	pub fn new(
		client: Arc<dyn ClientCredentialsStore>,
		tokens: Arc<dyn TokenStore>,
		credentials: Arc<dyn CredentialStore>,
	) -> Self {
		Self {
			client,
			tokens,
			credentials,
			config: IssuerConfig::default(),
			clock: Arc::new(SystemClock),
			metrics: Default::default(),
			guards: Default::default(),
		}
	}

	/// Replaces the configuration.
	pub fn with_config(mut self, config: IssuerConfig) -> Self {
		self.config = config;

		self
	}

	/// Replaces the clock used to stamp expirations.
	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;

		self
	}

	/// Active configuration.
	pub fn config(&self) -> &IssuerConfig {
		&self.config
	}

	/// Counters shared by every clone of this issuer.
	pub fn metrics(&self) -> &IssuerMetrics {
		&self.metrics
	}

	/// Client authenticator backed by the same client credentials store.
	pub fn authenticator(&self) -> ClientAuthenticator {
		ClientAuthenticator::new(self.client.clone())
	}

	/// Handles one token request.
	///
	/// Returns the `200` token response, or the error that aborted issuance. Use
	/// [`handle_or_error`](Self::handle_or_error) to render errors as responses as well.
	pub fn handle(&self, request: &TokenRequest) -> Result<Response> {
		let grant = obs::grant_label(request.param("grant_type").and_then(|g| g.parse().ok()));
		let span = GrantSpan::new(grant);
		let mut stage = IssuanceStage::AwaitingGrant;

		obs::record_grant_outcome(grant, GrantOutcome::Attempt);
		self.metrics.record_attempt();

		let result = {
			let _entered = span.entered();

			self.issue(request, &span, &mut stage)
		};

		match &result {
			Ok(_) => {
				obs::record_grant_outcome(grant, GrantOutcome::Success);
				self.metrics.record_success();
			},
			Err(e) => {
				span.failure(stage, e);
				obs::record_grant_outcome(grant, GrantOutcome::Failure);
				self.metrics.record_failure();
			},
		}

		result
	}

	/// Like [`handle`](Self::handle), rendering failures via [`Error::to_response`].
	pub fn handle_or_error(&self, request: &TokenRequest) -> Response {
		self.handle(request).unwrap_or_else(|e| e.to_response())
	}

	fn issue(
		&self,
		request: &TokenRequest,
		span: &GrantSpan,
		stage: &mut IssuanceStage,
	) -> Result<Response> {
		let grant = request.grant()?;

		advance(span, stage, IssuanceStage::ResolvingUser);

		let subject = self.resolve_subject(&grant)?;
		let serialize_as = subject.user_id().filter(|_| self.config.serialize_per_user).cloned();

		match serialize_as {
			Some(user_id) => self.guards.run(&user_id, || self.write(subject, span, stage)),
			None => self.write(subject, span, stage),
		}
	}

	// Runs under the per-user guard when one is configured.
	fn write(
		&self,
		subject: Subject,
		span: &GrantSpan,
		stage: &mut IssuanceStage,
	) -> Result<Response> {
		let now = self.clock.now();
		let plan = self.plan(subject, now)?;

		advance(span, stage, IssuanceStage::MintingNewTokens);

		let access = self.mint(TokenKind::AccessToken, plan.user_id.as_ref(), now)?;
		let refresh = if plan.mints_refresh_token() {
			Some(self.mint(TokenKind::RefreshToken, plan.user_id.as_ref(), now)?)
		} else {
			None
		};

		advance(span, stage, IssuanceStage::ExpiringOldTokens);

		for old in &plan.expire {
			self.expire(old, now)?;
		}

		advance(span, stage, IssuanceStage::Responding);

		Response::json(
			Response::OK,
			&TokenResponse::new(&access, self.config.expires_in_secs(), refresh.as_ref()),
		)
	}

	fn resolve_subject(&self, grant: &GrantRequest) -> Result<Subject> {
		match grant {
			GrantRequest::ClientCredentials => Ok(Subject::App),
			GrantRequest::Password { username, password } => {
				let user_id = self
					.credentials
					.user_id_by_credentials(username, password)
					.map_err(|e| Error::runtime("Failed to load the UserId from repository", e))?
					.ok_or_else(|| Error::unauthorized("The given user credentials are invalid."))?;

				Ok(Subject::User(user_id))
			},
			GrantRequest::RefreshToken { refresh_token } => {
				let presented = self.load_presented(refresh_token)?;

				Ok(Subject::Refresh(presented))
			},
		}
	}

	fn plan(&self, subject: Subject, now: PrimitiveDateTime) -> Result<IssuancePlan> {
		match subject {
			Subject::App => Ok(IssuancePlan::app_only()),
			Subject::User(user_id) => {
				let load = |kind| {
					self.tokens.load_token_by_user_id(&user_id, kind).map_err(|e| {
						Error::runtime(
							"Failed to load access and/or refresh token from repository",
							e,
						)
					})
				};
				let old_access = load(TokenKind::AccessToken)?;
				let old_refresh = load(TokenKind::RefreshToken)?;

				Ok(IssuancePlan::password(user_id, old_access, old_refresh))
			},
			Subject::Refresh(presented) => {
				// Another request for the same user may have rotated it while we waited.
				let presented = if self.config.serialize_per_user {
					self.load_presented(presented.token_id.as_ref())?
				} else {
					presented
				};

				if self.config.reject_expired_refresh && presented.is_expired_at(now) {
					return Err(Error::unauthorized("The given refresh token has expired."));
				}

				let old_access = match &presented.user_id {
					Some(user_id) => self
						.tokens
						.load_token_by_user_id(user_id, TokenKind::AccessToken)
						.map_err(|e| {
							Error::runtime("Failed to load access token from repository", e)
						})?,
					None => None,
				};

				Ok(IssuancePlan::refresh(presented, old_access, self.config.refresh_rotation))
			},
		}
	}

	// An identifier that fails validation cannot be stored, so it is reported as not found.
	fn load_presented(&self, refresh_token: &str) -> Result<Token> {
		TokenId::new(refresh_token)
			.map_err(|_| StoreError::NotFound { kind: TokenKind::RefreshToken })
			.and_then(|token_id| self.tokens.load_token(&token_id, TokenKind::RefreshToken))
			.map_err(|e| Error::runtime("Failed to load refresh token from repository", e))
	}

	fn mint(
		&self,
		kind: TokenKind,
		user_id: Option<&UserId>,
		now: PrimitiveDateTime,
	) -> Result<Token> {
		let failed = |e: StoreError| {
			Error::runtime(format!("Token of type '{kind}' failed to create or save"), e)
		};
		let token_id = self.tokens.generate_token_id(kind).map_err(failed)?;
		let client_id = self.client.client_id().map_err(failed)?;
		let token = Token::new(
			kind,
			token_id,
			client_id,
			user_id.cloned(),
			Expiration::after(now, self.config.expires_in),
		);

		self.tokens.save_token(token.clone()).map_err(failed)?;
		self.metrics.record_minted();

		Ok(token)
	}

	fn expire(&self, token: &Token, now: PrimitiveDateTime) -> Result<()> {
		self.tokens
			.save_token(token.expired_at(now))
			.map_err(|e| {
				Error::runtime(format!("Failed to save token of type: {}", token.kind), e)
			})?;
		self.metrics.record_expired();

		Ok(())
	}
}
impl Debug for TokenIssuer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenIssuer")
			.field("config", &self.config)
			.field("metrics", &self.metrics)
			.finish_non_exhaustive()
	}
}

/// Who the new tokens are issued for, before the old tokens are loaded.
#[derive(Debug)]
enum Subject {
	App,
	User(UserId),
	Refresh(Token),
}
impl Subject {
	fn user_id(&self) -> Option<&UserId> {
		match self {
			Self::App => None,
			Self::User(user_id) => Some(user_id),
			Self::Refresh(token) => token.user_id.as_ref(),
		}
	}
}

fn advance(span: &GrantSpan, stage: &mut IssuanceStage, next: IssuanceStage) {
	*stage = next;

	span.stage(next);
}
