//! Grant logic of the mock authorization server, independent of the HTTP framework.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::{Rng, distr::Alphanumeric};
use serde_json::{Value, json};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::ScopeList,
	client::{PkceCodeChallengeMethod, TokenIntrospection, TokenTypeHint},
	mock_server::{AuthorizationCodeGrant, IssuedToken, MockClient, MockUser, Repositories},
};

const TOKEN_RANDOM_LEN: usize = 32;

/// Form or query parameters of one request.
pub type Params = HashMap<String, String>;

/// Tunables for [`MockAuthorizationServer`].
#[derive(Clone, Debug)]
pub struct MockServerSettings {
	/// Lifetime of issued access tokens.
	pub access_token_ttl: Duration,
	/// Lifetime of authorization codes.
	pub code_ttl: Duration,
	/// User every authorization is approved as.
	pub user: MockUser,
}
impl Default for MockServerSettings {
	fn default() -> Self {
		Self {
			access_token_ttl: Duration::hours(1),
			code_ttl: Duration::minutes(10),
			user: MockUser { id: "user-1".into(), username: "mock-user".into() },
		}
	}
}

/// RFC 6749 §5.2 error returned by an endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OAuthErrorResponse {
	/// HTTP status code.
	pub status: u16,
	/// RFC 6749 error code.
	pub error: &'static str,
	/// Human-readable description.
	pub description: String,
}
impl OAuthErrorResponse {
	fn new(status: u16, error: &'static str, description: impl Into<String>) -> Self {
		Self { status, error, description: description.into() }
	}

	fn invalid_request(description: impl Into<String>) -> Self {
		Self::new(400, "invalid_request", description)
	}

	fn invalid_client(description: impl Into<String>) -> Self {
		Self::new(401, "invalid_client", description)
	}

	fn invalid_grant(description: impl Into<String>) -> Self {
		Self::new(400, "invalid_grant", description)
	}

	/// Returns `true` for client authentication failures, which carry `WWW-Authenticate`.
	pub fn is_client_auth_failure(&self) -> bool {
		self.status == 401
	}

	/// JSON body.
	pub fn body(&self) -> Value {
		json!({ "error": self.error, "error_description": self.description })
	}
}

/// Outcome of `GET /authorize`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizeOutcome {
	/// Redirect the user agent (with either a code or an error).
	Redirect(Url),
	/// The redirect URI cannot be trusted; answer directly.
	Reject(OAuthErrorResponse),
}

/// In-memory authorization server implementing the authorize, token, introspection, and
/// revocation endpoints.
#[derive(Clone, Debug)]
pub struct MockAuthorizationServer {
	repositories: Repositories,
	settings: Arc<MockServerSettings>,
}
impl MockAuthorizationServer {
	/// Creates a server with the given settings and no registered clients.
	pub fn new(settings: MockServerSettings) -> Self {
		let repositories = Repositories::default();

		repositories.users.insert(settings.user.id.clone(), settings.user.clone());

		Self { repositories, settings: Arc::new(settings) }
	}

	/// Registers a client.
	pub fn register_client(&self, client: MockClient) -> &Self {
		self.repositories.clients.insert(client.client_id.clone(), client);

		self
	}

	/// Registers known scopes; once any is registered, unknown scopes are rejected.
	pub fn register_scopes<I, S>(&self, scopes: I) -> &Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.repositories.scopes.register(scopes);

		self
	}

	/// Shared repositories, for inspection in tests.
	pub fn repositories(&self) -> &Repositories {
		&self.repositories
	}

	/// Handles `GET /authorize`, auto-approving as the configured user.
	pub fn authorize(&self, params: &Params) -> AuthorizeOutcome {
		self.authorize_at(params, OffsetDateTime::now_utc())
	}

	fn authorize_at(&self, params: &Params, now: OffsetDateTime) -> AuthorizeOutcome {
		let Some(client) = param(params, "client_id").and_then(|id| self.repositories.clients.get(id))
		else {
			return AuthorizeOutcome::Reject(OAuthErrorResponse::invalid_request("Unknown client_id."));
		};
		let requested_redirect = match param(params, "redirect_uri").map(Url::parse) {
			Some(Ok(url)) => Some(url),
			Some(Err(_)) =>
				return AuthorizeOutcome::Reject(OAuthErrorResponse::invalid_request(
					"redirect_uri is not a valid URL.",
				)),
			None => None,
		};
		let redirect = match &requested_redirect {
			Some(url) if client.redirect_uris.contains(url) => url.clone(),
			Some(_) =>
				return AuthorizeOutcome::Reject(OAuthErrorResponse::invalid_request(
					"redirect_uri is not registered for this client.",
				)),
			None if client.redirect_uris.len() == 1 => client.redirect_uris[0].clone(),
			None =>
				return AuthorizeOutcome::Reject(OAuthErrorResponse::invalid_request(
					"redirect_uri is required.",
				)),
		};
		let state = param(params, "state");

		match self.issue_code(&client, params, requested_redirect, now) {
			Ok(code) => AuthorizeOutcome::Redirect(with_query(redirect, &[("code", code.as_str())], state)),
			Err(e) => AuthorizeOutcome::Redirect(with_query(
				redirect,
				&[("error", e.error), ("error_description", e.description.as_str())],
				state,
			)),
		}
	}

	fn issue_code(
		&self,
		client: &MockClient,
		params: &Params,
		redirect_uri: Option<Url>,
		now: OffsetDateTime,
	) -> Result<String, OAuthErrorResponse> {
		if param(params, "response_type") != Some("code") {
			return Err(OAuthErrorResponse::new(
				400,
				"unsupported_response_type",
				"Only response_type=code is supported.",
			));
		}

		let scopes = ScopeList::split(param(params, "scope").unwrap_or_default(), " ");

		if let Some(unknown) = self.repositories.scopes.first_unknown(&scopes) {
			return Err(OAuthErrorResponse::new(400, "invalid_scope", format!("Unknown scope `{unknown}`.")));
		}

		let code_challenge = match param(params, "code_challenge") {
			Some(challenge) => {
				let method = match param(params, "code_challenge_method") {
					None => PkceCodeChallengeMethod::Plain,
					Some(raw) => PkceCodeChallengeMethod::parse(raw).ok_or_else(|| {
						OAuthErrorResponse::invalid_request(format!(
							"Unsupported code_challenge_method `{raw}`."
						))
					})?,
				};

				Some((challenge.to_owned(), method))
			},
			None => None,
		};
		let code = random_token("code");

		self.repositories.codes.insert(
			code.clone(),
			AuthorizationCodeGrant {
				client_id: client.client_id.clone(),
				user_id: self.settings.user.id.clone(),
				redirect_uri,
				scopes,
				code_challenge,
				expires_at: now + self.settings.code_ttl,
			},
		);

		Ok(code)
	}

	/// Handles `POST /token`.
	pub fn token(&self, authorization: Option<&str>, form: &Params) -> Result<Value, OAuthErrorResponse> {
		let now = OffsetDateTime::now_utc();
		let client = self.authenticate(authorization, form)?;

		match param(form, "grant_type") {
			Some("authorization_code") => self.exchange_code(&client, form, now),
			Some("refresh_token") => self.rotate_refresh_token(&client, form, now),
			Some("client_credentials") => self.client_credentials(&client, form, now),
			Some(other) => Err(OAuthErrorResponse::new(
				400,
				"unsupported_grant_type",
				format!("Grant type `{other}` is not supported."),
			)),
			None => Err(OAuthErrorResponse::invalid_request("grant_type is required.")),
		}
	}

	fn exchange_code(
		&self,
		client: &MockClient,
		form: &Params,
		now: OffsetDateTime,
	) -> Result<Value, OAuthErrorResponse> {
		let code = param(form, "code").ok_or_else(|| OAuthErrorResponse::invalid_request("code is required."))?;
		// Single use: the code is gone even when validation below fails.
		let grant = self
			.repositories
			.codes
			.remove(code)
			.ok_or_else(|| OAuthErrorResponse::invalid_grant("Unknown or already used code."))?;

		if grant.expires_at <= now {
			return Err(OAuthErrorResponse::invalid_grant("Authorization code expired."));
		}
		if grant.client_id != client.client_id {
			return Err(OAuthErrorResponse::invalid_grant("Code was issued to another client."));
		}
		if let Some(expected) = &grant.redirect_uri {
			if param(form, "redirect_uri") != Some(expected.as_str()) {
				return Err(OAuthErrorResponse::invalid_grant("redirect_uri does not match."));
			}
		}
		if let Some((challenge, method)) = &grant.code_challenge {
			let verifier = param(form, "code_verifier")
				.ok_or_else(|| OAuthErrorResponse::invalid_grant("code_verifier is required."))?;

			if method.challenge(verifier) != *challenge {
				return Err(OAuthErrorResponse::invalid_grant("PKCE verification failed."));
			}
		}

		let token = self.issue_token(client, Some(grant.user_id), grant.scopes, true, now);

		Ok(token_body(&token, now))
	}

	fn rotate_refresh_token(
		&self,
		client: &MockClient,
		form: &Params,
		now: OffsetDateTime,
	) -> Result<Value, OAuthErrorResponse> {
		let refresh = param(form, "refresh_token")
			.ok_or_else(|| OAuthErrorResponse::invalid_request("refresh_token is required."))?;
		let current = self
			.repositories
			.refresh_index
			.get(refresh)
			.and_then(|access| self.repositories.tokens.get(&access))
			.filter(|token| !token.revoked)
			.ok_or_else(|| OAuthErrorResponse::invalid_grant("Unknown or revoked refresh token."))?;

		// Another client's attempt must leave the owner's pair usable.
		if current.client_id != client.client_id {
			return Err(OAuthErrorResponse::invalid_grant("Refresh token was issued to another client."));
		}

		// Single use: only the caller that removes the index entry may rotate.
		if self.repositories.refresh_index.remove(refresh).is_none() {
			return Err(OAuthErrorResponse::invalid_grant("Unknown or revoked refresh token."));
		}

		let scopes = match param(form, "scope") {
			Some(raw) => {
				let requested = ScopeList::split(raw, " ");

				if let Some(extra) = requested.iter().find(|scope| !current.scopes.contains(scope)) {
					return Err(OAuthErrorResponse::new(
						400,
						"invalid_scope",
						format!("Scope `{extra}` exceeds the original grant."),
					));
				}

				requested
			},
			None => current.scopes.clone(),
		};

		self.repositories.revoke_pair(&current);

		let token = self.issue_token(client, current.user_id.clone(), scopes, true, now);

		Ok(token_body(&token, now))
	}

	fn client_credentials(
		&self,
		client: &MockClient,
		form: &Params,
		now: OffsetDateTime,
	) -> Result<Value, OAuthErrorResponse> {
		if client.client_secret.is_none() {
			return Err(OAuthErrorResponse::new(
				400,
				"unauthorized_client",
				"Public clients cannot use client_credentials.",
			));
		}

		let scopes = ScopeList::split(param(form, "scope").unwrap_or_default(), " ");

		if let Some(unknown) = self.repositories.scopes.first_unknown(&scopes) {
			return Err(OAuthErrorResponse::new(400, "invalid_scope", format!("Unknown scope `{unknown}`.")));
		}

		let token = self.issue_token(client, None, scopes, false, now);

		Ok(token_body(&token, now))
	}

	/// Handles `POST /token/introspect`.
	pub fn introspect(
		&self,
		authorization: Option<&str>,
		form: &Params,
	) -> Result<TokenIntrospection, OAuthErrorResponse> {
		let now = OffsetDateTime::now_utc();

		self.authenticate(authorization, form)?;

		let token = param(form, "token").ok_or_else(|| OAuthErrorResponse::invalid_request("token is required."))?;
		let Some(record) = self.repositories.find_token(token, hint(form)) else {
			return Ok(TokenIntrospection::inactive());
		};
		let is_refresh = record.refresh_token.as_deref() == Some(token);

		if record.revoked || (!is_refresh && record.expires_at <= now) {
			return Ok(TokenIntrospection::inactive());
		}

		let user = record.user_id.as_ref().and_then(|id| self.repositories.users.get(id));
		let mut introspection = TokenIntrospection::inactive();

		introspection.active = true;
		introspection.client_id = Some(record.client_id);
		introspection.scope = record.scopes.join(" ");
		introspection.iat = Some(record.issued_at.unix_timestamp());
		introspection.sub = user.as_ref().map(|user| user.id.clone());
		introspection.username = user.map(|user| user.username);

		// RFC 6749 §7.1 types describe access tokens only.
		if !is_refresh {
			introspection.token_type = Some("Bearer".into());
			introspection.exp = Some(record.expires_at.unix_timestamp());
		}

		Ok(introspection)
	}

	/// Handles `POST /token/revoke`. Unknown tokens succeed silently.
	pub fn revoke(&self, authorization: Option<&str>, form: &Params) -> Result<(), OAuthErrorResponse> {
		let client = self.authenticate(authorization, form)?;
		let token = param(form, "token").ok_or_else(|| OAuthErrorResponse::invalid_request("token is required."))?;

		match self.repositories.find_token(token, hint(form)) {
			Some(record) if record.client_id != client.client_id => Err(OAuthErrorResponse::new(
				400,
				"unauthorized_client",
				"Token was issued to another client.",
			)),
			Some(record) => {
				self.repositories.revoke_pair(&record);

				Ok(())
			},
			None => Ok(()),
		}
	}

	fn authenticate(&self, authorization: Option<&str>, form: &Params) -> Result<MockClient, OAuthErrorResponse> {
		let (client_id, secret) = match authorization {
			Some(header) => {
				if form.contains_key("client_secret") {
					return Err(OAuthErrorResponse::invalid_request(
						"Client credentials were sent in both the header and the body.",
					));
				}

				let (id, secret) = parse_basic(header)
					.ok_or_else(|| OAuthErrorResponse::invalid_client("Malformed Basic credentials."))?;

				(id, Some(secret))
			},
			None => {
				let id = param(form, "client_id")
					.ok_or_else(|| OAuthErrorResponse::invalid_client("Client authentication is required."))?;

				(id.to_owned(), param(form, "client_secret").map(str::to_owned))
			},
		};
		let client = self
			.repositories
			.clients
			.get(&client_id)
			.ok_or_else(|| OAuthErrorResponse::invalid_client("Unknown client."))?;
		let authenticated = match (&client.client_secret, secret.as_deref()) {
			(Some(expected), Some(given)) => expected == given,
			(None, None) => true,
			(None, Some(given)) => given.is_empty(),
			(Some(_), None) => false,
		};

		if !authenticated {
			return Err(OAuthErrorResponse::invalid_client("Client authentication failed."));
		}

		Ok(client)
	}

	fn issue_token(
		&self,
		client: &MockClient,
		user_id: Option<String>,
		scopes: ScopeList,
		with_refresh: bool,
		now: OffsetDateTime,
	) -> IssuedToken {
		let token = IssuedToken {
			access_token: random_token("at"),
			refresh_token: with_refresh.then(|| random_token("rt")),
			client_id: client.client_id.clone(),
			user_id,
			scopes,
			issued_at: now,
			expires_at: now + self.settings.access_token_ttl,
			revoked: false,
		};

		if let Some(refresh) = &token.refresh_token {
			self.repositories.refresh_index.insert(refresh.clone(), token.access_token.clone());
		}

		self.repositories.tokens.insert(token.access_token.clone(), token.clone());

		#[cfg(feature = "tracing")]
		tracing::debug!(client_id = %token.client_id, refresh = with_refresh, "Mock server issued a token.");

		token
	}
}

impl Default for MockAuthorizationServer {
	fn default() -> Self {
		Self::new(MockServerSettings::default())
	}
}

fn param<'a>(params: &'a Params, key: &str) -> Option<&'a str> {
	params.get(key).map(String::as_str).filter(|value| !value.is_empty())
}

fn hint(form: &Params) -> Option<TokenTypeHint> {
	param(form, "token_type_hint").and_then(TokenTypeHint::parse)
}

fn with_query(mut url: Url, pairs: &[(&str, &str)], state: Option<&str>) -> Url {
	{
		let mut query = url.query_pairs_mut();

		query.extend_pairs(pairs);

		if let Some(state) = state {
			query.append_pair("state", state);
		}
	}

	url
}

fn token_body(token: &IssuedToken, now: OffsetDateTime) -> Value {
	let mut body = json!({
		"access_token": token.access_token,
		"token_type": "Bearer",
		"expires_in": (token.expires_at - now).whole_seconds(),
	});

	if let Some(refresh) = &token.refresh_token {
		body["refresh_token"] = refresh.clone().into();
	}
	if let Some(scope) = token.scopes.join(" ") {
		body["scope"] = scope.into();
	}

	body
}

fn parse_basic(header: &str) -> Option<(String, String)> {
	let (scheme, encoded) = header.trim().split_once(' ')?;

	if !scheme.eq_ignore_ascii_case("basic") {
		return None;
	}

	let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
	let (id, secret) = decoded.split_once(':')?;

	Some((form_decode(id), form_decode(secret)))
}

fn form_decode(component: &str) -> String {
	form_urlencoded::parse(component.as_bytes()).map(|(key, _)| key.into_owned()).next().unwrap_or_default()
}

fn random_token(prefix: &str) -> String {
	let suffix: String =
		rand::rng().sample_iter(Alphanumeric).take(TOKEN_RANDOM_LEN).map(char::from).collect();

	format!("{prefix}_{suffix}")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const REDIRECT: &str = "https://app.example.com/callback";

	fn server() -> MockAuthorizationServer {
		let server = MockAuthorizationServer::new(MockServerSettings::default());
		let redirect = Url::parse(REDIRECT).expect("Redirect fixture should parse.");

		server.register_client(MockClient::confidential("web", "web-secret", redirect.clone()));
		server.register_client(MockClient::public("spa", redirect));

		server
	}

	fn params(pairs: &[(&str, &str)]) -> Params {
		pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
	}

	fn code_from(outcome: AuthorizeOutcome) -> String {
		let AuthorizeOutcome::Redirect(url) = outcome else {
			panic!("Authorization should redirect.");
		};

		url.query_pairs()
			.find(|(k, _)| k == "code")
			.map(|(_, v)| v.into_owned())
			.expect("Redirect should carry a code.")
	}

	#[test]
	fn authorize_redirects_with_code_and_state() {
		let server = server();
		let outcome = server.authorize(&params(&[
			("response_type", "code"),
			("client_id", "web"),
			("redirect_uri", REDIRECT),
			("state", "xyz"),
		]));
		let AuthorizeOutcome::Redirect(url) = outcome else {
			panic!("Authorization should redirect.");
		};

		assert!(url.as_str().starts_with(REDIRECT));
		assert!(url.query_pairs().any(|(k, v)| k == "state" && v == "xyz"));
		assert!(url.query_pairs().any(|(k, _)| k == "code"));
	}

	#[test]
	fn authorize_rejects_unregistered_redirects() {
		let outcome = server().authorize(&params(&[
			("response_type", "code"),
			("client_id", "web"),
			("redirect_uri", "https://evil.example.com/cb"),
		]));

		assert!(matches!(outcome, AuthorizeOutcome::Reject(e) if e.error == "invalid_request"));
	}

	#[test]
	fn codes_are_single_use_and_expire() {
		let server = server();
		let code = code_from(server.authorize(&params(&[
			("response_type", "code"),
			("client_id", "web"),
		])));
		let form = params(&[
			("grant_type", "authorization_code"),
			("code", code.as_str()),
			("client_id", "web"),
			("client_secret", "web-secret"),
		]);

		server.token(None, &form).expect("First exchange should succeed.");

		let replay = server.token(None, &form).expect_err("Replay must fail.");

		assert_eq!(replay.error, "invalid_grant");

		let expired = MockAuthorizationServer::new(MockServerSettings {
			code_ttl: Duration::ZERO,
			..MockServerSettings::default()
		});

		expired.register_client(MockClient::confidential(
			"web",
			"web-secret",
			Url::parse(REDIRECT).expect("Redirect fixture should parse."),
		));

		let code = code_from(expired.authorize(&params(&[("response_type", "code"), ("client_id", "web")])));
		let err = expired
			.token(
				None,
				&params(&[
					("grant_type", "authorization_code"),
					("code", code.as_str()),
					("client_id", "web"),
					("client_secret", "web-secret"),
				]),
			)
			.expect_err("Expired codes must fail.");

		assert_eq!(err.description, "Authorization code expired.");
	}

	fn issue_pair(server: &MockAuthorizationServer) -> (String, String) {
		let code = code_from(server.authorize(&params(&[("response_type", "code"), ("client_id", "web")])));
		let token = server
			.token(
				None,
				&params(&[
					("grant_type", "authorization_code"),
					("code", code.as_str()),
					("client_id", "web"),
					("client_secret", "web-secret"),
				]),
			)
			.expect("Exchange should succeed.");
		let field = |key: &str| token[key].as_str().map(str::to_owned).expect("Token body field.");

		(field("access_token"), field("refresh_token"))
	}

	fn introspect_as_web(server: &MockAuthorizationServer, token: &str, hint: &str) -> TokenIntrospection {
		server
			.introspect(
				None,
				&params(&[
					("token", token),
					("token_type_hint", hint),
					("client_id", "web"),
					("client_secret", "web-secret"),
				]),
			)
			.expect("Introspection should succeed.")
	}

	#[test]
	fn refresh_introspection_carries_no_access_token_type() {
		let server = server();
		let (access, refresh) = issue_pair(&server);
		let access_view = introspect_as_web(&server, &access, "access_token");
		// A mismatched hint still finds the token.
		let refresh_view = introspect_as_web(&server, &refresh, "access_token");

		assert_eq!(access_view.token_type.as_deref(), Some("Bearer"));
		assert!(access_view.exp.is_some());
		assert!(refresh_view.active);
		assert_eq!(refresh_view.token_type, None);
		assert_eq!(refresh_view.exp, None);
		assert_eq!(refresh_view.client_id.as_deref(), Some("web"));
		assert_eq!(introspect_as_web(&server, "at_unknown", "bogus"), TokenIntrospection::inactive());
	}

	#[test]
	fn foreign_refresh_attempt_leaves_the_owner_pair_usable() {
		let server = server();
		let (_, refresh) = issue_pair(&server);

		server.register_client(MockClient::confidential(
			"other",
			"other-secret",
			Url::parse(REDIRECT).expect("Redirect fixture should parse."),
		));

		let foreign = server
			.token(
				None,
				&params(&[
					("grant_type", "refresh_token"),
					("refresh_token", refresh.as_str()),
					("client_id", "other"),
					("client_secret", "other-secret"),
				]),
			)
			.expect_err("Another client's refresh must fail.");

		assert_eq!(foreign.error, "invalid_grant");

		let owner = server
			.token(
				None,
				&params(&[
					("grant_type", "refresh_token"),
					("refresh_token", refresh.as_str()),
					("client_id", "web"),
					("client_secret", "web-secret"),
				]),
			)
			.expect("The owner can still refresh.");

		assert!(owner["refresh_token"].as_str().is_some_and(|t| t != refresh));
	}

	#[test]
	fn revoking_the_refresh_token_deactivates_the_pair() {
		let server = server();
		let (access, refresh) = issue_pair(&server);

		server
			.revoke(
				None,
				&params(&[
					("token", refresh.as_str()),
					("token_type_hint", "refresh_token"),
					("client_id", "web"),
					("client_secret", "web-secret"),
				]),
			)
			.expect("Revocation should succeed.");

		assert!(!introspect_as_web(&server, &access, "access_token").active);
		assert!(!introspect_as_web(&server, &refresh, "refresh_token").active);
	}

	#[test]
	fn plain_pkce_is_the_default_method() {
		let server = server();
		let verifier = "a".repeat(43);
		let code = code_from(server.authorize(&params(&[
			("response_type", "code"),
			("client_id", "spa"),
			("code_challenge", verifier.as_str()),
		])));
		let token = server
			.token(
				None,
				&params(&[
					("grant_type", "authorization_code"),
					("code", code.as_str()),
					("client_id", "spa"),
					("code_verifier", verifier.as_str()),
				]),
			)
			.expect("Plain verifier should match.");

		assert!(token["access_token"].as_str().is_some_and(|t| t.starts_with("at_")));
	}

	#[test]
	fn client_authentication_rules() {
		let server = server();
		let basic = format!("Basic {}", STANDARD.encode("web:web-secret"));
		let form = params(&[("grant_type", "client_credentials")]);

		server.token(Some(&basic), &form).expect("Basic credentials should authenticate.");

		let both = server
			.token(Some(&basic), &params(&[("grant_type", "client_credentials"), ("client_secret", "web-secret")]))
			.expect_err("Header plus body credentials must be rejected.");

		assert_eq!(both.error, "invalid_request");

		let wrong = server
			.token(
				None,
				&params(&[("grant_type", "client_credentials"), ("client_id", "web"), ("client_secret", "nope")]),
			)
			.expect_err("Wrong secret must be rejected.");

		assert!(wrong.is_client_auth_failure());

		let public = server
			.token(None, &params(&[("grant_type", "client_credentials"), ("client_id", "spa")]))
			.expect_err("Public clients cannot use client credentials.");

		assert_eq!(public.error, "unauthorized_client");
	}

	#[test]
	fn basic_credentials_are_form_decoded() {
		assert_eq!(
			parse_basic(&format!("Basic {}", STANDARD.encode("id%3Awith+space:s%26cret"))),
			Some(("id:with space".into(), "s&cret".into()))
		);
		assert_eq!(parse_basic("Bearer abc"), None);
	}
}
