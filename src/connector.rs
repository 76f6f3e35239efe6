//! Connector adapter: binds an [`OAuth2Client`] to one connector's declarative OAuth
//! configuration and exposes the connection lifecycle hooks.
//!
//! ```text
//! (none) -> pre_connect -> pending authorization -> post_connect -> healthy
//! healthy -> check_connection -> healthy | error | disconnected
//! disconnected | error -> pre_connect (same connection id) -> pending authorization
//! any -> revoke_connection -> revoked
//! ```

/// Persisted credential bundle.
pub mod credentials;
/// `state` parameter codec.
pub mod state;
/// Connection health types.
pub mod status;

pub use credentials::*;
pub use state::*;
pub use status::*;

// self
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};
use crate::{
	_prelude::*,
	auth::{ConnectionId, ConnectorName, ScopeList},
	client::{
		AuthorizeRequest, CodeExchangeRequest, OAuth2Client, Operation, PkceCodeChallengeMethod,
		PkceCodeVerifier, RefreshRequest, TokenIntrospection, TokenRequest, TokenTypeHint,
	},
	config::OAuth2ClientConfig,
	error::ConfigError,
	http::{TokenHttpClient, TransportErrorMapper},
	obs::{self, FlowKind},
	params::RequestParams,
};

/// When check-connection attempts a refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RefreshPolicy {
	/// Refresh whenever a refresh token is present, regardless of expiry.
	#[default]
	Always,
	/// Refresh only when the access token expires within the window, or its expiry is unknown.
	ExpiringWithin(Duration),
}
impl RefreshPolicy {
	/// Returns `true` when a refresh should be attempted for a token expiring at `expires_at`.
	pub fn should_refresh(self, expires_at: Option<OffsetDateTime>, now: OffsetDateTime) -> bool {
		match self {
			RefreshPolicy::Always => true,
			RefreshPolicy::ExpiringWithin(window) => expires_at.is_none_or(|at| at - now <= window),
		}
	}
}

/// Declarative OAuth configuration for one connector.
#[derive(Clone, Debug)]
pub struct ConnectorConfig {
	/// Connector name, used for generated connection ids.
	pub connector_name: ConnectorName,
	/// Provider endpoints and client credentials.
	pub client: OAuth2ClientConfig,
	/// Scopes requested when the caller does not override them.
	pub scopes: ScopeList,
	/// PKCE method; `None` disables PKCE.
	pub pkce: Option<PkceCodeChallengeMethod>,
	/// Extra parameters appended to every authorize URL.
	pub authorize_params: RequestParams,
	/// Extra parameters appended to every token endpoint request.
	pub token_params: RequestParams,
	/// Refresh gating used by check-connection.
	pub refresh_policy: RefreshPolicy,
}
impl ConnectorConfig {
	/// Creates a configuration without default scopes, PKCE, or extra parameters.
	pub fn new(connector_name: ConnectorName, client: OAuth2ClientConfig) -> Self {
		Self {
			connector_name,
			client,
			scopes: ScopeList::default(),
			pkce: None,
			authorize_params: RequestParams::default(),
			token_params: RequestParams::default(),
			refresh_policy: RefreshPolicy::default(),
		}
	}

	/// Sets the default scopes.
	pub fn scopes(mut self, scopes: ScopeList) -> Self {
		self.scopes = scopes;

		self
	}

	/// Enables PKCE with `method`.
	pub fn pkce(mut self, method: PkceCodeChallengeMethod) -> Self {
		self.pkce = Some(method);

		self
	}

	/// Adds an authorize URL parameter.
	pub fn authorize_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.authorize_params.insert(key, value);

		self
	}

	/// Adds a token request parameter.
	pub fn token_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.token_params.insert(key, value);

		self
	}

	/// Overrides the refresh policy.
	pub fn refresh_policy(mut self, policy: RefreshPolicy) -> Self {
		self.refresh_policy = policy;

		self
	}
}

/// Caller context for pre-connect.
#[derive(Clone, Debug)]
pub struct ConnectContext {
	/// Existing connection when reconnecting.
	pub connection_id: Option<ConnectionId>,
	/// Canonical callback URL.
	pub redirect_uri: Url,
}
impl ConnectContext {
	/// Context for a brand new connection.
	pub fn new(redirect_uri: Url) -> Self {
		Self { connection_id: None, redirect_uri }
	}

	/// Context for reconnecting an existing connection.
	pub fn reconnect(connection_id: ConnectionId, redirect_uri: Url) -> Self {
		Self { connection_id: Some(connection_id), redirect_uri }
	}
}

/// Per-attempt overrides for pre-connect.
#[derive(Clone, Debug, Default)]
pub struct PreConnectInput {
	/// Scopes replacing the configured defaults.
	pub scopes: Option<ScopeList>,
	/// Authorize parameters merged after the configured ones.
	pub params: RequestParams,
}

/// Result of pre-connect.
#[derive(Clone, Debug)]
pub struct PreConnectOutput {
	/// URL the user agent must visit.
	pub authorization_url: Url,
	/// PKCE verifier the caller keeps until post-connect.
	pub code_verifier: Option<PkceCodeVerifier>,
	/// Connection the authorization belongs to.
	pub connection_id: ConnectionId,
	/// Encoded `state` embedded in the URL.
	pub state: String,
}

/// Callback data handed to post-connect.
#[derive(Clone, Debug)]
pub struct ConnectOutput {
	/// Authorization code from the callback.
	pub code: String,
	/// `state` echoed by the provider.
	pub state: String,
	/// Verifier returned by pre-connect, when PKCE is on.
	pub code_verifier: Option<PkceCodeVerifier>,
}

/// Result of post-connect.
#[derive(Clone, Debug)]
pub struct PostConnectOutput {
	/// Connection recovered from the state.
	pub connection_external_id: ConnectionId,
	/// Credentials to persist.
	pub settings: CredentialBundle,
	/// Always healthy on a successful exchange.
	pub status: ConnectionStatus,
	/// Best-effort introspection of the new token, for diagnostics.
	pub introspection: Option<TokenIntrospection>,
}

/// Result of check-connection.
#[derive(Clone, Debug)]
pub struct CheckConnectionOutput {
	/// Settings to persist (refreshed, backfilled, or unchanged).
	pub settings: CredentialBundle,
	/// Health classification.
	pub health: ConnectionHealth,
}

/// Reqwest-backed adapter alias.
#[cfg(feature = "reqwest")]
pub type ReqwestConnectorAdapter = ConnectorAdapter<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Lifecycle hooks for one connector.
pub struct ConnectorAdapter<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	config: Arc<ConnectorConfig>,
	client: OAuth2Client<C, M>,
}
#[cfg(feature = "reqwest")]
impl ConnectorAdapter<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Builds an adapter over the default reqwest transport.
	pub fn new(config: ConnectorConfig) -> Result<Self> {
		let client = OAuth2Client::new(config.client.clone())?;

		Ok(Self { config: Arc::new(config), client })
	}
}
impl<C, M> ConnectorAdapter<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds an adapter over a caller-supplied transport.
	pub fn with_http_client(
		config: ConnectorConfig,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let client = OAuth2Client::with_http_client(config.client.clone(), http_client, error_mapper)?;

		Ok(Self { config: Arc::new(config), client })
	}

	/// Returns the connector configuration.
	pub fn config(&self) -> &ConnectorConfig {
		&self.config
	}

	/// Returns the underlying client.
	pub fn client(&self) -> &OAuth2Client<C, M> {
		&self.client
	}

	/// Produces the authorize URL for a new or reconnecting connection.
	///
	/// Pure: generates ids and verifiers locally and performs no I/O.
	pub fn pre_connect(
		&self,
		context: &ConnectContext,
		input: &PreConnectInput,
	) -> Result<PreConnectOutput> {
		obs::observe_sync(FlowKind::PreConnect, "connector.pre_connect", || {
			self.build_pre_connect(context, input)
		})
	}

	fn build_pre_connect(
		&self,
		context: &ConnectContext,
		input: &PreConnectInput,
	) -> Result<PreConnectOutput> {
		let connection_id = context
			.connection_id
			.clone()
			.unwrap_or_else(|| ConnectionId::generate(&self.config.connector_name));
		let state = OAuthState {
			connection_id: connection_id.clone(),
			redirect_uri: context.redirect_uri.clone(),
		}
		.encode()?;
		let code_verifier = self.config.pkce.map(PkceCodeVerifier::generate);
		let mut request = AuthorizeRequest::new(context.redirect_uri.clone())
			.scopes(input.scopes.clone().unwrap_or_else(|| self.config.scopes.clone()))
			.state(state.clone());

		if let Some(verifier) = &code_verifier {
			request = request.code_verifier(verifier.clone());
		}

		request.additional_params.merge(self.config.authorize_params.iter());
		request.additional_params.merge(input.params.iter());

		let authorization_url = self.client.build_authorize_url(&request);

		Ok(PreConnectOutput { authorization_url, code_verifier, connection_id, state })
	}

	/// Exchanges the callback code and builds the credentials to persist.
	pub async fn post_connect(&self, output: &ConnectOutput) -> Result<PostConnectOutput> {
		obs::observe(FlowKind::PostConnect, "connector.post_connect", async {
			let state = OAuthState::decode(&output.state)?;
			let mut request = CodeExchangeRequest::new(output.code.as_str(), state.redirect_uri);

			if let Some(verifier) = &output.code_verifier {
				request = request.code_verifier(verifier.clone());
			}

			request.additional_params.merge(self.config.token_params.iter());

			let response = self.client.exchange_code_for_token(&request).await?;
			let settings = CredentialBundle::from_token_response(
				self.config.client.client_id.as_str(),
				response,
				None,
			);
			let introspection = self.introspect_best_effort(&settings).await;

			Ok(PostConnectOutput {
				connection_external_id: state.connection_id,
				settings,
				status: ConnectionStatus::Healthy,
				introspection,
			})
		})
		.await
	}

	async fn introspect_best_effort(&self, settings: &CredentialBundle) -> Option<TokenIntrospection> {
		self.config.client.introspect_url.as_ref()?;

		let token = settings.access_token()?;
		let request = TokenRequest::new(token.expose()).hint(TokenTypeHint::AccessToken);

		match self.client.introspect_token(&request).await {
			Ok(introspection) => Some(introspection),
			Err(_e) => {
				#[cfg(feature = "tracing")]
				tracing::warn!(
					connector = %self.config.connector_name,
					error = %_e,
					"Introspection after connect failed; continuing."
				);

				None
			},
		}
	}

	/// Evaluates connection health against the current UTC time.
	pub async fn check_connection(&self, settings: CredentialBundle) -> Result<CheckConnectionOutput> {
		self.check_connection_at(settings, OffsetDateTime::now_utc()).await
	}

	/// Evaluates connection health as of `now`.
	///
	/// `now` is also the receipt time for a refreshed token's `expires_at`.
	///
	/// Steps, in order: require an access token; backfill `expires_at`; refresh when a refresh
	/// token is present (and the [`RefreshPolicy`] allows it); otherwise introspect when an
	/// endpoint is configured; otherwise compare the local expiry.
	pub async fn check_connection_at(
		&self,
		mut settings: CredentialBundle,
		now: OffsetDateTime,
	) -> Result<CheckConnectionOutput> {
		obs::observe(FlowKind::CheckConnection, "connector.check_connection", async move {
			let access_token = settings.access_token().cloned().ok_or(ConfigError::MissingAccessToken)?;

			settings.backfill_expires_at(now);

			let health = match settings.refresh_token().cloned() {
				Some(refresh_token)
					if self.config.refresh_policy.should_refresh(settings.expires_at, now) =>
				{
					let mut request = RefreshRequest::new(refresh_token.expose());

					request.additional_params.merge(self.config.token_params.iter());

					match self.client.refresh_token_at(&request, now).await {
						Ok(response) => {
							settings = CredentialBundle::from_token_response(
								settings.client_id.clone(),
								response,
								Some(refresh_token),
							);

							ConnectionHealth::healthy()
						},
						Err(e) => ConnectionHealth::error(format!("Failed to refresh token: {e}")),
					}
				},
				_ => self.check_without_refresh(&settings, access_token.expose(), now).await,
			};

			self.report(&health);

			Ok(CheckConnectionOutput { settings, health })
		})
		.await
	}

	async fn check_without_refresh(
		&self,
		settings: &CredentialBundle,
		access_token: &str,
		now: OffsetDateTime,
	) -> ConnectionHealth {
		if self.config.client.introspect_url.is_some() {
			let request = TokenRequest::new(access_token).hint(TokenTypeHint::AccessToken);

			return match self.client.introspect_token(&request).await {
				Ok(introspection) if introspection.active => ConnectionHealth::healthy(),
				Ok(_) => ConnectionHealth::disconnected("Access token is no longer active."),
				Err(e) => ConnectionHealth::error(format!("Failed to introspect token: {e}")),
			};
		}

		if settings.is_expired_at(now) {
			let at = settings.expires_at_rfc3339().unwrap_or_else(|| "an unknown time".into());

			return ConnectionHealth::disconnected(format!("Access token expired at {at}."));
		}

		ConnectionHealth::healthy()
	}

	fn report(&self, health: &ConnectionHealth) {
		obs::record_connection_status(health.status);

		#[cfg(feature = "tracing")]
		tracing::info!(
			connector = %self.config.connector_name,
			status = health.status.as_str(),
			status_message = health.status_message.as_deref().unwrap_or_default(),
			"Connection checked."
		);
	}

	/// Revokes the connection's access token at the provider.
	///
	/// Requires an access token and a revocation endpoint; provider errors propagate unchanged.
	pub async fn revoke_connection(&self, settings: &CredentialBundle) -> Result<()> {
		obs::observe(FlowKind::RevokeConnection, "connector.revoke_connection", async {
			let token = settings.access_token().ok_or(ConfigError::MissingAccessToken)?;

			if self.config.client.revoke_url.is_none() {
				return Err(ConfigError::EndpointNotConfigured {
					operation: Operation::Revocation,
					endpoint: "revoke_url",
				}
				.into());
			}

			let request = TokenRequest::new(token.expose()).hint(TokenTypeHint::AccessToken);

			self.client.revoke_token(&request).await
		})
		.await
	}
}
impl<C, M> Debug for ConnectorAdapter<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConnectorAdapter")
			.field("connector", &self.config.connector_name)
			.finish_non_exhaustive()
	}
}
