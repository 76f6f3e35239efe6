//! Crate-level error types shared by the client, connector adapter, and mock server.
//!
//! The taxonomy mirrors how callers are expected to react:
//!
//! - [`ConfigError`]: local misconfiguration, raised before any request is dispatched.
//! - [`TransportError`]: the request never produced an HTTP response.
//! - [`ResponseError`]: the provider answered with a non-2xx status. The parsed (or raw) body,
//!   headers, and a [`ProviderErrorKind`] classification travel with it.
//! - [`MalformedResponse`]: a 2xx response that failed schema validation.
//! - [`StateError`]: the round-tripped `state` parameter could not be decoded.

mod classify;

pub use classify::*;

// self
use crate::{_prelude::*, client::Operation, config::OAuth2ClientConfigError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider responded with a non-success HTTP status.
	#[error(transparent)]
	Response(#[from] ResponseError),
	/// Provider responded successfully with a payload that failed validation.
	#[error(transparent)]
	Malformed(#[from] MalformedResponse),
	/// OAuth `state` parameter could not be encoded or decoded.
	#[error(transparent)]
	State(#[from] StateError),
}
impl Error {
	/// Returns the provider response error, when this is one.
	pub fn as_response(&self) -> Option<&ResponseError> {
		match self {
			Self::Response(inner) => Some(inner),
			_ => None,
		}
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Client configuration failed validation.
	#[error(transparent)]
	InvalidConfig(#[from] OAuth2ClientConfigError),
	/// The operation needs an endpoint the configuration does not define.
	#[error("The {operation} operation requires `{endpoint}`, which is not configured.")]
	EndpointNotConfigured {
		/// Operation that was attempted.
		operation: Operation,
		/// Configuration field that is missing.
		endpoint: &'static str,
	},
	/// Connection settings carry no access token.
	#[error("Connection settings do not contain an access token.")]
	MissingAccessToken,
	/// Requested scopes cannot be validated.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {operation} endpoint.")]
	Network {
		/// Operation that was attempted.
		operation: Operation,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Request did not complete within the transport's timeout.
	#[error("Request timed out while calling the {operation} endpoint.")]
	Timeout {
		/// Operation that was attempted.
		operation: Operation,
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(operation: Operation, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { operation, source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(operation: Operation, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { operation, source: Box::new(src) }
	}
}

/// Body of a non-success provider response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ResponseBody {
	/// Body parsed as JSON.
	Json(serde_json::Value),
	/// Body that was not valid JSON, kept verbatim (lossy UTF-8).
	Text(String),
}
impl ResponseBody {
	/// Parses the body as JSON, degrading to text when that fails.
	pub fn from_bytes(bytes: &[u8]) -> Self {
		match serde_json::from_slice(bytes) {
			Ok(value) => Self::Json(value),
			Err(_) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
		}
	}

	/// RFC 6749 §5.2 `error` field, when present.
	pub fn oauth_error(&self) -> Option<&str> {
		self.json_str("error")
	}

	/// RFC 6749 §5.2 `error_description` field, when present.
	pub fn error_description(&self) -> Option<&str> {
		self.json_str("error_description")
	}

	fn json_str(&self, key: &str) -> Option<&str> {
		match self {
			Self::Json(value) => value.get(key).and_then(serde_json::Value::as_str),
			Self::Text(_) => None,
		}
	}
}

/// Structured error for non-2xx responses from the token, introspection, or revocation endpoints.
#[derive(Clone, Debug, ThisError)]
pub struct ResponseError {
	/// Operation that was attempted.
	pub operation: Operation,
	/// HTTP status code returned by the provider.
	pub status: u16,
	/// Response headers (lower-cased names, lossy UTF-8 values).
	pub headers: Vec<(String, String)>,
	/// Parsed JSON body, or the raw text when parsing failed.
	pub body: ResponseBody,
	/// Classification derived from the OAuth error fields, body text, and status.
	pub kind: ProviderErrorKind,
	/// Retry-After hint from upstream, if supplied.
	pub retry_after: Option<Duration>,
}
impl ResponseError {
	/// Returns the first header value matching `name` (case-insensitive).
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(key, _)| key.eq_ignore_ascii_case(name))
			.map(|(_, value)| value.as_str())
	}

	/// Human-readable summary of the provider's complaint.
	pub fn summary(&self) -> String {
		match (&self.body, self.body.oauth_error(), self.body.error_description()) {
			(_, Some(error), Some(description)) => format!("{error} ({description})"),
			(_, Some(error), None) => error.to_owned(),
			(_, None, Some(description)) => description.to_owned(),
			(ResponseBody::Text(text), ..) if !text.trim().is_empty() =>
				classify::truncate_preview(text.trim().to_owned()),
			_ => "no error details".into(),
		}
	}
}

impl Display for ResponseError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "The {} request failed with HTTP {}: {}.", self.operation, self.status, self.summary())
	}
}

/// A 2xx response whose payload failed validation.
#[derive(Debug, ThisError)]
#[error("The {operation} endpoint returned a malformed response: {reason}.")]
pub struct MalformedResponse {
	/// Operation that was attempted.
	pub operation: Operation,
	/// HTTP status code of the response.
	pub status: u16,
	/// Description of the validation failure.
	pub reason: String,
	/// Structured JSON failure including the offending path, when the body was JSON-decoded.
	#[source]
	pub source: Option<serde_path_to_error::Error<serde_json::Error>>,
}
impl MalformedResponse {
	/// Builds an error from a JSON decoding failure.
	pub fn from_json(
		operation: Operation,
		status: u16,
		source: serde_path_to_error::Error<serde_json::Error>,
	) -> Self {
		let path = source.path().to_string();
		let reason = if path == "." {
			source.inner().to_string()
		} else {
			format!("{} at `{path}`", source.inner())
		};

		Self { operation, status, reason, source: Some(source) }
	}

	/// Builds an error from a semantic validation failure.
	pub fn invalid(operation: Operation, status: u16, reason: impl Into<String>) -> Self {
		Self { operation, status, reason: reason.into(), source: None }
	}
}

/// OAuth `state` encoding failures.
#[derive(Debug, ThisError)]
pub enum StateError {
	/// State could not be serialized.
	#[error("OAuth state could not be encoded.")]
	Encode {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// State returned by the provider is not valid.
	#[error("OAuth state returned by the provider is malformed.")]
	Malformed {
		/// Underlying parsing failure.
		#[source]
		source: serde_json::Error,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as _;
	// self
	use super::*;

	fn response_error(body: &[u8]) -> ResponseError {
		ResponseError {
			operation: Operation::RefreshToken,
			status: 400,
			headers: vec![("content-type".into(), "application/json".into())],
			body: ResponseBody::from_bytes(body),
			kind: ProviderErrorKind::InvalidGrant,
			retry_after: None,
		}
	}

	#[test]
	fn response_body_degrades_to_text() {
		assert!(matches!(ResponseBody::from_bytes(b"{\"error\":\"x\"}"), ResponseBody::Json(_)));
		assert_eq!(
			ResponseBody::from_bytes(b"<html>Bad Gateway</html>"),
			ResponseBody::Text("<html>Bad Gateway</html>".into())
		);
	}

	#[test]
	fn response_error_display_embeds_oauth_fields() {
		let err = response_error(b"{\"error\":\"invalid_grant\",\"error_description\":\"expired\"}");

		assert_eq!(
			err.to_string(),
			"The refresh_token request failed with HTTP 400: invalid_grant (expired)."
		);
		assert_eq!(err.header("Content-Type"), Some("application/json"));

		let text = response_error(b"upstream exploded");

		assert!(text.to_string().ends_with("upstream exploded."));
	}

	#[test]
	fn malformed_response_reports_json_path() {
		let mut de = serde_json::Deserializer::from_str("{\"active\":\"yes\"}");
		let source = serde_path_to_error::deserialize::<_, crate::client::TokenIntrospection>(&mut de)
			.expect_err("A string `active` must be rejected.");
		let err = MalformedResponse::from_json(Operation::Introspection, 200, source);

		assert!(err.reason.contains("`active`"), "Reason should name the path: {}", err.reason);
		assert!(err.source().is_some());
	}
}
