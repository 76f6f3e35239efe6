//! Provider-agnostic OAuth 2.0 client.
//!
//! [`OAuth2Client`] is stateless: it turns an [`OAuth2ClientConfig`] plus per-call inputs into
//! wire requests, dispatches them through an injected [`TokenHttpClient`], and normalizes the
//! replies. Every parameter name passes through the configured
//! [`ParamKeyMapping`](crate::params::ParamKeyMapping) right before serialization.

/// Operation labels shared by errors and telemetry.
pub mod operation;
pub mod pkce;
pub mod request;
pub mod response;

pub use operation::*;
pub use pkce::*;
pub use request::*;
pub use response::*;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use oauth2::{
	AsyncHttpClient, HttpResponse,
	http::{
		HeaderMap, HeaderValue, Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER},
	},
};
use time::format_description::well_known::Rfc2822;
use url::form_urlencoded;
// self
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestHttpClient, ReqwestTransportErrorMapper};
use crate::{
	_prelude::*,
	config::{ClientAuthLocation, OAuth2ClientConfig},
	error::{ConfigError, ProviderErrorContext, ResponseBody, ResponseError},
	http::{TokenHttpClient, TransportErrorMapper},
	obs::{self, FlowKind},
	params::RequestParams,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_ACCEPT: &str = "application/json";

/// Reqwest-backed client alias.
#[cfg(feature = "reqwest")]
pub type ReqwestOAuth2Client = OAuth2Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Executes OAuth 2.0 operations for one provider configuration.
pub struct OAuth2Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	config: Arc<OAuth2ClientConfig>,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
#[cfg(feature = "reqwest")]
impl OAuth2Client<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Validates `config` and pairs it with a reqwest transport that ignores redirects.
	pub fn new(config: OAuth2ClientConfig) -> Result<Self> {
		Self::with_http_client(config, ReqwestHttpClient::new()?, ReqwestTransportErrorMapper)
	}
}
impl<C, M> OAuth2Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Validates `config` and pairs it with a caller-supplied transport and error mapper.
	pub fn with_http_client(
		config: OAuth2ClientConfig,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		config.validate().map_err(ConfigError::from)?;

		Ok(Self {
			config: Arc::new(config),
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
		})
	}

	/// Returns the provider configuration.
	pub fn config(&self) -> &OAuth2ClientConfig {
		&self.config
	}

	/// Builds the URL the user agent is sent to. Pure; performs no I/O.
	pub fn build_authorize_url(&self, request: &AuthorizeRequest) -> Url {
		let mut params = RequestParams::default();

		params.insert("response_type", "code");
		params.insert("client_id", self.config.client_id.as_str());
		params.insert("redirect_uri", request.redirect_uri.as_str());
		params.insert_opt("scope", request.scopes.join(&self.config.scope_delimiter));
		params.insert_opt("state", request.state.as_deref());

		if let Some(verifier) = &request.code_verifier {
			params.insert("code_challenge", verifier.challenge());
			params.insert("code_challenge_method", verifier.method().as_str());
		}

		params.merge(request.additional_params.iter());

		let params = self.config.param_key_mapping.apply(params);
		let mut url = self.config.authorize_url.clone();

		url.query_pairs_mut().extend_pairs(params.iter());

		url
	}

	/// Redeems an authorization code at the token endpoint.
	pub async fn exchange_code_for_token(
		&self,
		request: &CodeExchangeRequest,
	) -> Result<TokenResponse> {
		let operation = Operation::AuthorizationCode;

		obs::observe(FlowKind::from(operation), "client.exchange_code_for_token", async {
			let mut params = grant_params(operation);

			params.insert("code", request.code.expose());
			params.insert("redirect_uri", request.redirect_uri.as_str());
			params.insert_opt(
				"code_verifier",
				request.code_verifier.as_ref().map(PkceCodeVerifier::secret),
			);

			self.token_request(operation, params, &request.additional_params, OffsetDateTime::now_utc())
				.await
		})
		.await
	}

	/// Redeems a refresh token at the token endpoint.
	pub async fn refresh_token(&self, request: &RefreshRequest) -> Result<TokenResponse> {
		self.refresh_token_at(request, OffsetDateTime::now_utc()).await
	}

	/// Same as [`Self::refresh_token`], deriving `expires_at` from `received_at`.
	pub(crate) async fn refresh_token_at(
		&self,
		request: &RefreshRequest,
		received_at: OffsetDateTime,
	) -> Result<TokenResponse> {
		let operation = Operation::RefreshToken;

		obs::observe(FlowKind::from(operation), "client.refresh_token", async {
			let mut params = grant_params(operation);

			params.insert("refresh_token", request.refresh_token.expose());

			self.token_request(operation, params, &request.additional_params, received_at).await
		})
		.await
	}

	/// Requests an application token with the client credentials grant.
	pub async fn get_token_with_client_credentials(
		&self,
		request: &ClientCredentialsRequest,
	) -> Result<TokenResponse> {
		let operation = Operation::ClientCredentials;

		obs::observe(FlowKind::from(operation), "client.get_token_with_client_credentials", async {
			let mut params = grant_params(operation);

			params.insert_opt("scope", request.scopes.join(&self.config.scope_delimiter));

			self.token_request(operation, params, &request.additional_params, OffsetDateTime::now_utc())
				.await
		})
		.await
	}

	/// Introspects a token (RFC 7662).
	///
	/// Fails with [`ConfigError::EndpointNotConfigured`] before any request is dispatched when
	/// the configuration has no introspection endpoint.
	pub async fn introspect_token(&self, request: &IntrospectionRequest) -> Result<TokenIntrospection> {
		let operation = Operation::Introspection;

		obs::observe(FlowKind::from(operation), "client.introspect_token", async {
			let url = self.config.introspect_url.as_ref().ok_or(
				ConfigError::EndpointNotConfigured { operation, endpoint: "introspect_url" },
			)?;
			let (status, body) = self.send(operation, url, token_params(request), request).await?;

			TokenIntrospection::from_slice(operation, status, &body)
		})
		.await
	}

	/// Revokes a token (RFC 7009). The response body is ignored on success.
	///
	/// Fails with [`ConfigError::EndpointNotConfigured`] before any request is dispatched when
	/// the configuration has no revocation endpoint.
	pub async fn revoke_token(&self, request: &RevocationRequest) -> Result<()> {
		let operation = Operation::Revocation;

		obs::observe(FlowKind::from(operation), "client.revoke_token", async {
			let url = self
				.config
				.revoke_url
				.as_ref()
				.ok_or(ConfigError::EndpointNotConfigured { operation, endpoint: "revoke_url" })?;

			self.send(operation, url, token_params(request), request).await.map(|_| ())
		})
		.await
	}

	async fn token_request(
		&self,
		operation: Operation,
		params: RequestParams,
		additional: &RequestParams,
		received_at: OffsetDateTime,
	) -> Result<TokenResponse> {
		let (status, body) = self
			.send_form(operation, &self.config.token_url, params, additional)
			.await?;

		TokenResponse::from_slice(operation, status, &body, received_at)
	}

	async fn send(
		&self,
		operation: Operation,
		url: &Url,
		params: RequestParams,
		request: &TokenRequest,
	) -> Result<(u16, Vec<u8>)> {
		self.send_form(operation, url, params, &request.additional_params).await
	}

	async fn send_form(
		&self,
		operation: Operation,
		url: &Url,
		mut params: RequestParams,
		additional: &RequestParams,
	) -> Result<(u16, Vec<u8>)> {
		let mut builder = Request::builder()
			.method(Method::POST)
			.uri(url.as_str())
			.header(CONTENT_TYPE, FORM_CONTENT_TYPE)
			.header(ACCEPT, JSON_ACCEPT);

		match self.config.client_auth_location {
			ClientAuthLocation::Body => {
				params.insert("client_id", self.config.client_id.as_str());
				params.insert_opt("client_secret", self.config.client_secret());
			},
			ClientAuthLocation::Header => {
				builder = builder.header(AUTHORIZATION, self.basic_authorization()?);
			},
		}

		params.merge(additional.iter());

		let body = self.config.param_key_mapping.apply(params).to_form_urlencoded();
		let request = builder.body(body.into_bytes()).map_err(ConfigError::from)?;
		let handle = self.http_client.handle();
		let response = handle
			.call(request)
			.await
			.map_err(|e| self.error_mapper.map_transport_error(operation, e))?;

		into_success(operation, response)
	}

	fn basic_authorization(&self) -> Result<HeaderValue> {
		// RFC 6749 §2.3.1: both components are form-urlencoded before joining.
		let id = form_urlencoded::byte_serialize(self.config.client_id.as_bytes()).collect::<String>();
		let secret = form_urlencoded::byte_serialize(self.config.client_secret().unwrap_or_default().as_bytes())
			.collect::<String>();
		let encoded = STANDARD.encode(format!("{id}:{secret}"));

		HeaderValue::from_str(&format!("Basic {encoded}"))
			.map_err(|e| ConfigError::from(oauth2::http::Error::from(e)).into())
	}
}
impl<C, M> Clone for OAuth2Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			config: Arc::clone(&self.config),
			http_client: Arc::clone(&self.http_client),
			error_mapper: Arc::clone(&self.error_mapper),
		}
	}
}
impl<C, M> Debug for OAuth2Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Client").field("config", &self.config).finish_non_exhaustive()
	}
}

fn grant_params(operation: Operation) -> RequestParams {
	let mut params = RequestParams::default();

	params.insert_opt("grant_type", operation.grant_type());

	params
}

fn token_params(request: &TokenRequest) -> RequestParams {
	let mut params = RequestParams::default();

	params.insert("token", request.token.expose());
	params.insert_opt("token_type_hint", request.token_type_hint.map(TokenTypeHint::as_str));

	params
}

fn into_success(operation: Operation, response: HttpResponse) -> Result<(u16, Vec<u8>)> {
	let status = response.status().as_u16();

	if response.status().is_success() {
		return Ok((status, response.into_body()));
	}

	let retry_after = parse_retry_after(response.headers(), OffsetDateTime::now_utc());
	let headers = response
		.headers()
		.iter()
		.map(|(name, value)| {
			(name.as_str().to_owned(), String::from_utf8_lossy(value.as_bytes()).into_owned())
		})
		.collect();
	let body = ResponseBody::from_bytes(response.body());
	let kind = ProviderErrorContext::from_response(operation, status, &body).classify();

	Err(ResponseError { operation, status, headers, body, kind, retry_after }.into())
}

/// Parses `Retry-After` as delta-seconds or an HTTP date relative to `now`.
pub(crate) fn parse_retry_after(headers: &HeaderMap, now: OffsetDateTime) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u32>() {
		return Some(Duration::seconds(secs.into()));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - now;

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// crates.io
	use oauth2::{HttpClientError, HttpRequest};
	// self
	use super::*;
	use crate::{auth::ScopeList, error::TransportError, params::ParamKeyMapping};

	#[derive(Default)]
	struct CountingHttpClient(Arc<AtomicUsize>);
	impl TokenHttpClient for CountingHttpClient {
		type Handle = CountingHandle;
		type TransportError = std::io::Error;

		fn handle(&self) -> Self::Handle {
			CountingHandle(Arc::clone(&self.0))
		}
	}

	struct CountingHandle(Arc<AtomicUsize>);
	impl<'c> AsyncHttpClient<'c> for CountingHandle {
		type Error = HttpClientError<std::io::Error>;
		type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

		fn call(&'c self, _request: HttpRequest) -> Self::Future {
			self.0.fetch_add(1, Ordering::SeqCst);

			Box::pin(async { Err(HttpClientError::Other("offline".into())) })
		}
	}

	struct IoMapper;
	impl TransportErrorMapper<std::io::Error> for IoMapper {
		fn map_transport_error(
			&self,
			operation: Operation,
			error: HttpClientError<std::io::Error>,
		) -> Error {
			TransportError::network(operation, std::io::Error::other(error.to_string())).into()
		}
	}

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Failed to parse URL fixture.")
	}

	fn client(
		config: OAuth2ClientConfig,
	) -> (OAuth2Client<CountingHttpClient, IoMapper>, Arc<AtomicUsize>) {
		let counter = Arc::new(AtomicUsize::new(0));
		let client = OAuth2Client::with_http_client(
			config,
			CountingHttpClient(Arc::clone(&counter)),
			IoMapper,
		)
		.expect("Client should build.");

		(client, counter)
	}

	fn config() -> OAuth2ClientConfig {
		OAuth2ClientConfig::builder("client-1")
			.client_secret("secret-1")
			.authorize_url(url("https://provider.example.com/authorize?audience=api"))
			.token_url(url("https://provider.example.com/token"))
			.build()
			.expect("Config fixture should build.")
	}

	#[test]
	fn authorize_url_is_deterministic_and_remapped() {
		let mut config = config();

		config.param_key_mapping = ParamKeyMapping::new([("client_id", "consumer_key")]);
		config.scope_delimiter = ",".into();

		let (client, _) = client(config);
		let verifier = PkceCodeVerifier::new(
			"dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk",
			PkceCodeChallengeMethod::S256,
		);
		let request = AuthorizeRequest::new(url("https://app.example.com/callback"))
			.scopes(ScopeList::new(["read", "write"]).expect("Scopes should be valid."))
			.state("opaque")
			.code_verifier(verifier)
			.param("prompt", "consent")
			.param("response_type", "token");
		let first = client.build_authorize_url(&request);

		assert_eq!(first, client.build_authorize_url(&request));

		let pairs: Vec<(String, String)> =
			first.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
		let expected = [
			("audience", "api"),
			("response_type", "token"),
			("consumer_key", "client-1"),
			("redirect_uri", "https://app.example.com/callback"),
			("scope", "read,write"),
			("state", "opaque"),
			("code_challenge", "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"),
			("code_challenge_method", "S256"),
			("prompt", "consent"),
		];

		assert_eq!(
			pairs,
			expected.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<Vec<_>>()
		);
	}

	#[test]
	fn authorize_url_omits_empty_scope_and_state() {
		let (client, _) = client(config());
		let authorize_url =
			client.build_authorize_url(&AuthorizeRequest::new(url("https://app.example.com/cb")));

		assert!(authorize_url.query_pairs().all(|(k, _)| k != "scope" && k != "state"));
	}

	#[tokio::test]
	async fn optional_endpoints_fail_fast_without_dispatch() {
		let (client, counter) = client(config());
		let err = client
			.introspect_token(&TokenRequest::new("at"))
			.await
			.expect_err("Introspection without an endpoint must fail.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::EndpointNotConfigured { endpoint: "introspect_url", .. })
		));

		let err = client
			.revoke_token(&TokenRequest::new("at"))
			.await
			.expect_err("Revocation without an endpoint must fail.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::EndpointNotConfigured { endpoint: "revoke_url", .. })
		));
		assert_eq!(counter.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn transport_failures_go_through_the_mapper() {
		let (client, counter) = client(config());
		let err = client
			.refresh_token(&RefreshRequest::new("rt"))
			.await
			.expect_err("The counting transport always fails.");

		assert!(matches!(
			err,
			Error::Transport(TransportError::Network { operation: Operation::RefreshToken, .. })
		));
		assert_eq!(counter.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn basic_authorization_form_encodes_components() {
		let config = OAuth2ClientConfig::builder("id:with space")
			.client_secret("s&cret")
			.client_auth_location(ClientAuthLocation::Header)
			.authorize_url(url("https://provider.example.com/authorize"))
			.token_url(url("https://provider.example.com/token"))
			.build()
			.expect("Config fixture should build.");
		let (client, _) = client(config);
		let header = client.basic_authorization().expect("Header should encode.");

		assert_eq!(
			header.to_str().expect("Header should be ASCII."),
			format!("Basic {}", STANDARD.encode("id%3Awith+space:s%26cret"))
		);
	}

	#[test]
	fn retry_after_accepts_seconds_and_dates() {
		let now = time::macros::datetime!(2025-01-01 00:00 UTC);
		let mut headers = HeaderMap::new();

		headers.insert(RETRY_AFTER, HeaderValue::from_static("120"));

		assert_eq!(parse_retry_after(&headers, now), Some(Duration::seconds(120)));

		headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 01 Jan 2025 00:01:30 +0000"));

		assert_eq!(parse_retry_after(&headers, now), Some(Duration::seconds(90)));

		headers.insert(RETRY_AFTER, HeaderValue::from_static("soon"));

		assert_eq!(parse_retry_after(&headers, now), None);
	}
}
