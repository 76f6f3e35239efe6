//! Heuristics that classify provider error responses.
//!
//! Classification is data-driven rather than per-provider: the structured OAuth fields
//! (`error`, `error_description`) win, then hints in the body text, and finally the HTTP
//! status code.

// self
use crate::{_prelude::*, client::Operation, error::ResponseBody};

const BODY_PREVIEW_LIMIT: usize = 256;

/// Canonical provider error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
	/// Provider rejected the authorization grant (bad code, stale refresh token).
	InvalidGrant,
	/// Client authentication failed.
	InvalidClient,
	/// Requested scopes exceed what the token covers.
	InsufficientScope,
	/// Failure is temporary and may succeed if retried by the caller.
	Transient,
}
impl ProviderErrorKind {
	/// Returns `true` when reconnecting (a new authorization) is the only way forward.
	pub fn requires_reauthorization(self) -> bool {
		matches!(self, Self::InvalidGrant | Self::InvalidClient)
	}
}

/// Primitive data used to classify a failed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// Operation associated with the failing request.
	pub operation: Operation,
	/// HTTP status code returned by the provider.
	pub http_status: Option<u16>,
	/// Provider-supplied OAuth `error` field.
	pub oauth_error: Option<String>,
	/// Provider-supplied OAuth `error_description` field.
	pub error_description: Option<String>,
	/// Preview of the response body for non-JSON payloads.
	pub body_preview: Option<String>,
}
impl ProviderErrorContext {
	/// Creates a new context scoped to the provided operation.
	pub fn new(operation: Operation) -> Self {
		Self {
			operation,
			http_status: None,
			oauth_error: None,
			error_description: None,
			body_preview: None,
		}
	}

	/// Builds a context from a response status and body.
	pub fn from_response(operation: Operation, status: u16, body: &ResponseBody) -> Self {
		let mut ctx = Self::new(operation).with_http_status(status);

		if let Some(error) = body.oauth_error() {
			ctx = ctx.with_oauth_error(error);
		}
		if let Some(description) = body.error_description() {
			ctx = ctx.with_error_description(description);
		}
		if let ResponseBody::Text(text) = body {
			ctx = ctx.with_body_preview(text.clone());
		}

		ctx
	}

	/// Adds an HTTP status code (e.g., 400, 401, 500).
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth error code string returned by the provider.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Adds a body preview for providers that return non-JSON payloads.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}

	/// Classifies the failure.
	pub fn classify(&self) -> ProviderErrorKind {
		classify_oauth_error(self.oauth_error.as_deref(), self.error_description.as_deref())
			.or_else(|| classify_body(self.body_preview.as_deref()))
			.unwrap_or_else(|| classify_status(self.http_status))
	}
}

pub(crate) fn truncate_preview(body: String) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf: String = body.chars().take(BODY_PREVIEW_LIMIT).collect();

	buf.push('…');

	buf
}

fn classify_oauth_error(
	oauth_error: Option<&str>,
	error_description: Option<&str>,
) -> Option<ProviderErrorKind> {
	oauth_error
		.and_then(match_exact_value)
		.or_else(|| error_description.and_then(match_exact_value))
		.or_else(|| classify_body(error_description))
}

fn match_exact_value(value: &str) -> Option<ProviderErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant")
		|| value.eq_ignore_ascii_case("access_denied")
		|| value.eq_ignore_ascii_case("invalid_token")
	{
		Some(ProviderErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(ProviderErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("invalid_scope")
		|| value.eq_ignore_ascii_case("insufficient_scope")
	{
		Some(ProviderErrorKind::InsufficientScope)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
		|| value.eq_ignore_ascii_case("slow_down")
	{
		Some(ProviderErrorKind::Transient)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<ProviderErrorKind> {
	let lowered = body?.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") => Some(ProviderErrorKind::InvalidGrant),
		text if text.contains("invalid_client") => Some(ProviderErrorKind::InvalidClient),
		text if text.contains("insufficient_scope") || text.contains("invalid_scope") =>
			Some(ProviderErrorKind::InsufficientScope),
		text if text.contains("temporarily_unavailable") || text.contains("retry") =>
			Some(ProviderErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(status: Option<u16>) -> ProviderErrorKind {
	match status {
		Some(400 | 404 | 410) => ProviderErrorKind::InvalidGrant,
		Some(401) => ProviderErrorKind::InvalidClient,
		Some(403) => ProviderErrorKind::InsufficientScope,
		_ => ProviderErrorKind::Transient,
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn oauth_fields_take_precedence() {
		let ctx = ProviderErrorContext::new(Operation::AuthorizationCode)
			.with_http_status(500)
			.with_oauth_error("invalid_client");

		assert_eq!(ctx.classify(), ProviderErrorKind::InvalidClient);

		let ctx = ProviderErrorContext::new(Operation::RefreshToken)
			.with_http_status(500)
			.with_error_description("invalid_grant: refresh token already used");

		assert_eq!(ctx.classify(), ProviderErrorKind::InvalidGrant);
	}

	#[test]
	fn falls_back_to_body_then_status() {
		let body = ResponseBody::Text("error=insufficient_scope".into());
		let ctx = ProviderErrorContext::from_response(Operation::Introspection, 400, &body);

		assert_eq!(ctx.classify(), ProviderErrorKind::InsufficientScope);

		let ctx = ProviderErrorContext::new(Operation::ClientCredentials).with_http_status(401);

		assert_eq!(ctx.classify(), ProviderErrorKind::InvalidClient);

		let ctx = ProviderErrorContext::new(Operation::Revocation).with_http_status(503);

		assert_eq!(ctx.classify(), ProviderErrorKind::Transient);
		assert!(!ctx.classify().requires_reauthorization());
	}

	#[test]
	fn previews_are_truncated() {
		let preview = truncate_preview("x".repeat(BODY_PREVIEW_LIMIT + 10));

		assert_eq!(preview.chars().count(), BODY_PREVIEW_LIMIT + 1);
		assert!(preview.ends_with('…'));
	}
}
