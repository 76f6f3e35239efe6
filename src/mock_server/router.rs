//! axum surface of the mock authorization server.

// std
use std::net::SocketAddr;
// crates.io
use axum::{
	Form, Json, Router,
	extract::{Query, State},
	http::{
		HeaderMap, HeaderValue, StatusCode,
		header::{AUTHORIZATION, CACHE_CONTROL, LOCATION, WWW_AUTHENTICATE},
	},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
// self
use crate::{
	_prelude::*,
	error::TransportError,
	mock_server::{AuthorizeOutcome, MockAuthorizationServer, OAuthErrorResponse, Params},
};

/// Path of the authorization endpoint.
pub const AUTHORIZE_PATH: &str = "/authorize";
/// Path of the token endpoint.
pub const TOKEN_PATH: &str = "/token";
/// Path of the introspection endpoint.
pub const INTROSPECT_PATH: &str = "/token/introspect";
/// Path of the revocation endpoint.
pub const REVOKE_PATH: &str = "/token/revoke";

/// Creates the router serving every endpoint of `server`.
pub fn router(server: MockAuthorizationServer) -> Router {
	Router::new()
		.route(AUTHORIZE_PATH, get(authorize))
		.route(TOKEN_PATH, post(token))
		.route(INTROSPECT_PATH, post(introspect))
		.route(REVOKE_PATH, post(revoke))
		.with_state(server)
}

/// Running server bound to an ephemeral loopback port.
///
/// Dropping the handle triggers a graceful shutdown.
#[derive(Debug)]
pub struct MockServerHandle {
	addr: SocketAddr,
	base_url: Url,
	shutdown: Option<oneshot::Sender<()>>,
	task: Option<JoinHandle<()>>,
}
impl MockServerHandle {
	/// Socket address the server listens on.
	pub fn addr(&self) -> SocketAddr {
		self.addr
	}

	/// Base URL (`http://127.0.0.1:<port>/`).
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Absolute URL for `path`.
	pub fn url(&self, path: &str) -> Url {
		let mut url = self.base_url.clone();

		url.set_path(path);

		url
	}

	/// Stops accepting connections and waits for in-flight requests to finish.
	pub async fn shutdown(mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
		if let Some(task) = self.task.take() {
			let _ = task.await;
		}
	}
}
impl Drop for MockServerHandle {
	fn drop(&mut self) {
		if let Some(tx) = self.shutdown.take() {
			let _ = tx.send(());
		}
	}
}

/// Binds `127.0.0.1:0` and serves `server` on a background task.
pub async fn spawn(server: MockAuthorizationServer) -> Result<MockServerHandle> {
	let listener = TcpListener::bind(("127.0.0.1", 0)).await.map_err(TransportError::Io)?;
	let addr = listener.local_addr().map_err(TransportError::Io)?;
	let base_url = Url::parse(&format!("http://{addr}/"))
		.map_err(|e| TransportError::Io(std::io::Error::other(e)))?;
	let (tx, rx) = oneshot::channel::<()>();
	let task = tokio::spawn(async move {
		let serve = axum::serve(listener, router(server)).with_graceful_shutdown(async {
			let _ = rx.await;
		});

		if let Err(_e) = serve.await {
			#[cfg(feature = "tracing")]
			tracing::error!(error = %_e, "Mock authorization server stopped with an error.");
		}
	});

	#[cfg(feature = "tracing")]
	tracing::debug!(%addr, "Mock authorization server listening.");

	Ok(MockServerHandle { addr, base_url, shutdown: Some(tx), task: Some(task) })
}

async fn authorize(
	State(server): State<MockAuthorizationServer>,
	Query(params): Query<Params>,
) -> Response {
	match server.authorize(&params) {
		AuthorizeOutcome::Redirect(url) => match HeaderValue::from_str(url.as_str()) {
			Ok(location) => (StatusCode::FOUND, [(LOCATION, location)]).into_response(),
			Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
		},
		AuthorizeOutcome::Reject(error) => error.into_response(),
	}
}

async fn token(
	State(server): State<MockAuthorizationServer>,
	headers: HeaderMap,
	Form(form): Form<Params>,
) -> Response {
	json_result(server.token(authorization(&headers), &form))
}

async fn introspect(
	State(server): State<MockAuthorizationServer>,
	headers: HeaderMap,
	Form(form): Form<Params>,
) -> Response {
	json_result(server.introspect(authorization(&headers), &form))
}

async fn revoke(
	State(server): State<MockAuthorizationServer>,
	headers: HeaderMap,
	Form(form): Form<Params>,
) -> Response {
	match server.revoke(authorization(&headers), &form) {
		Ok(()) => StatusCode::OK.into_response(),
		Err(error) => error.into_response(),
	}
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
	headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
}

fn json_result<T>(result: Result<T, OAuthErrorResponse>) -> Response
where
	T: Serialize,
{
	match result {
		Ok(body) => ([(CACHE_CONTROL, HeaderValue::from_static("no-store"))], Json(body)).into_response(),
		Err(error) => error.into_response(),
	}
}

impl IntoResponse for OAuthErrorResponse {
	fn into_response(self) -> Response {
		let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_REQUEST);
		let mut response = (status, Json(self.body())).into_response();

		if self.is_client_auth_failure() {
			response
				.headers_mut()
				.insert(WWW_AUTHENTICATE, HeaderValue::from_static("Basic realm=\"mock\""));
		}

		response
	}
}
