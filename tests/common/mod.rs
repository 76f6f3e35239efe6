//! Helpers shared by the integration tests.

#![allow(dead_code)]

// std
use std::{future::Future, pin::Pin, sync::Arc};
// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		StatusCode,
		header::{AUTHORIZATION, CONTENT_TYPE, HeaderName},
	},
};
use parking_lot::Mutex;
// self
use openint_oauth::{
	client::{OAuth2Client, Operation, ReqwestOAuth2Client},
	config::{ClientAuthLocation, OAuth2ClientConfig},
	error::{Error, TransportError},
	http::{TokenHttpClient, TransportErrorMapper},
	mock_server::{
		self, AUTHORIZE_PATH, INTROSPECT_PATH, MockAuthorizationServer, MockClient,
		MockServerHandle, REVOKE_PATH, TOKEN_PATH,
	},
	reqwest::{Client as ReqwestClient, redirect::Policy},
	url::Url,
};

/// Client id registered by [`spawn_mock_server`].
pub const MOCK_CLIENT_ID: &str = "openint-test";
/// Client secret registered by [`spawn_mock_server`].
pub const MOCK_CLIENT_SECRET: &str = "openint-test-secret";
/// Redirect URI registered by [`spawn_mock_server`].
pub const MOCK_REDIRECT_URI: &str = "http://127.0.0.1:3000/connect/callback";
/// User the mock server approves as.
pub const MOCK_USER_ID: &str = "user-1";

/// Parses a fixture URL.
pub fn url(value: &str) -> Url {
	Url::parse(value).expect("Failed to parse test URL.")
}

/// Reqwest client that does not follow redirects, so tests can read `Location`.
pub fn no_redirect_reqwest_client() -> ReqwestClient {
	ReqwestClient::builder()
		.redirect(Policy::none())
		.build()
		.expect("Failed to build Reqwest client for tests.")
}

/// Spawns a mock server with one confidential client registered.
pub async fn spawn_mock_server() -> (MockServerHandle, MockAuthorizationServer) {
	let server = MockAuthorizationServer::default();

	server.register_client(MockClient::confidential(
		MOCK_CLIENT_ID,
		MOCK_CLIENT_SECRET,
		url(MOCK_REDIRECT_URI),
	));

	let handle = mock_server::spawn(server.clone()).await.expect("Failed to spawn mock server.");

	(handle, server)
}

/// Client configuration pointing at every endpoint of `handle`.
pub fn mock_client_config(
	handle: &MockServerHandle,
	location: ClientAuthLocation,
) -> OAuth2ClientConfig {
	OAuth2ClientConfig::builder(MOCK_CLIENT_ID)
		.client_secret(MOCK_CLIENT_SECRET)
		.client_auth_location(location)
		.authorize_url(handle.url(AUTHORIZE_PATH))
		.token_url(handle.url(TOKEN_PATH))
		.introspect_url(handle.url(INTROSPECT_PATH))
		.revoke_url(handle.url(REVOKE_PATH))
		.build()
		.expect("Mock client configuration should be valid.")
}

/// Reqwest-backed client for `handle`.
pub fn mock_client(handle: &MockServerHandle, location: ClientAuthLocation) -> ReqwestOAuth2Client {
	ReqwestOAuth2Client::new(mock_client_config(handle, location))
		.expect("Failed to build client for tests.")
}

/// Request captured by [`RecordingHttpClient`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
	/// Target URI.
	pub uri: String,
	/// `Authorization` header, if any.
	pub authorization: Option<String>,
	/// `Content-Type` header, if any.
	pub content_type: Option<String>,
	/// Decoded form body in wire order.
	pub form: Vec<(String, String)>,
}
impl RecordedRequest {
	/// First value for `key`.
	pub fn param(&self, key: &str) -> Option<&str> {
		self.form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}
}

/// Transport that records every request and answers with a canned response.
#[derive(Clone)]
pub struct RecordingHttpClient {
	status: u16,
	body: &'static str,
	requests: Arc<Mutex<Vec<RecordedRequest>>>,
}
impl RecordingHttpClient {
	/// Answers every request with `status` and `body`.
	pub fn new(status: u16, body: &'static str) -> Self {
		Self { status, body, requests: Arc::default() }
	}

	/// Requests seen so far.
	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.lock().clone()
	}
}
impl TokenHttpClient for RecordingHttpClient {
	type Handle = RecordingHttpClient;
	type TransportError = std::io::Error;

	fn handle(&self) -> Self::Handle {
		self.clone()
	}
}
impl<'c> AsyncHttpClient<'c> for RecordingHttpClient {
	type Error = HttpClientError<std::io::Error>;
	type Future = Pin<
		Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>,
	>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let header = |name: HeaderName| {
			request.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_owned)
		};
		let recorded = RecordedRequest {
			uri: request.uri().to_string(),
			authorization: header(AUTHORIZATION),
			content_type: header(CONTENT_TYPE),
			form: url::form_urlencoded::parse(request.body())
				.map(|(k, v)| (k.into_owned(), v.into_owned()))
				.collect(),
		};

		self.requests.lock().push(recorded);

		let status = self.status;
		let body = self.body;

		Box::pin(async move {
			let mut response = HttpResponse::new(body.as_bytes().to_vec());

			*response.status_mut() = StatusCode::from_u16(status)
				.expect("Recorded status should be valid.");

			Ok(response)
		})
	}
}

/// Builds a client over a [`RecordingHttpClient`].
pub fn recording_client(
	config: OAuth2ClientConfig,
	transport: &RecordingHttpClient,
) -> OAuth2Client<RecordingHttpClient, IoErrorMapper> {
	OAuth2Client::<RecordingHttpClient, IoErrorMapper>::with_http_client(
		config,
		transport.clone(),
		IoErrorMapper,
	)
	.expect("Recording client configuration should be valid.")
}

/// Mapper for [`RecordingHttpClient`].
pub struct IoErrorMapper;
impl TransportErrorMapper<std::io::Error> for IoErrorMapper {
	fn map_transport_error(
		&self,
		operation: Operation,
		error: HttpClientError<std::io::Error>,
	) -> Error {
		TransportError::network(operation, std::io::Error::other(error.to_string())).into()
	}
}
