// crates.io
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
// self
use crate::{_prelude::*, auth::TokenSecret, client::TokenResponse};

/// Credentials persisted by the caller for one connection.
///
/// Created by post-connect and replaced by check-connection when a refresh succeeds. The
/// client never reads it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CredentialBundle {
	/// Client the tokens were issued to.
	pub client_id: String,
	/// Current access token; legacy records may lack one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub access_token: Option<TokenSecret>,
	/// Refresh token, when the provider issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// Lifetime in seconds reported with the access token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_in: Option<i64>,
	/// Absolute expiry, serialized as RFC 3339.
	#[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<OffsetDateTime>,
	/// Token type (usually `Bearer`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_type: Option<String>,
	/// Scope string granted by the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
	/// Verbatim token endpoint payload.
	#[serde(default)]
	pub raw: Value,
}
impl CredentialBundle {
	/// Builds a bundle from a fresh token response.
	///
	/// `previous_refresh` is kept when the provider did not rotate the refresh token.
	pub fn from_token_response(
		client_id: impl Into<String>,
		response: TokenResponse,
		previous_refresh: Option<TokenSecret>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			access_token: Some(response.access_token),
			refresh_token: response.refresh_token.or(previous_refresh),
			expires_in: response.expires_in,
			expires_at: response.expires_at,
			token_type: response.token_type,
			scope: response.scope,
			raw: response.raw,
		}
	}

	/// Access token, ignoring empty values.
	pub fn access_token(&self) -> Option<&TokenSecret> {
		self.access_token.as_ref().filter(|token| !token.is_empty())
	}

	/// Refresh token, ignoring empty values.
	pub fn refresh_token(&self) -> Option<&TokenSecret> {
		self.refresh_token.as_ref().filter(|token| !token.is_empty())
	}

	/// Derives `expires_at` from `expires_in` when only the latter is known.
	///
	/// Returns `true` when the bundle changed. An existing `expires_at` is never touched, and an
	/// `expires_in` that overflows the calendar leaves it unset.
	pub fn backfill_expires_at(&mut self, now: OffsetDateTime) -> bool {
		match (self.expires_at, self.expires_in) {
			(None, Some(secs)) => {
				self.expires_at = now.checked_add(Duration::seconds(secs));

				self.expires_at.is_some()
			},
			_ => false,
		}
	}

	/// Returns `true` when `expires_at` lies strictly before `now`.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|at| at < now)
	}

	/// RFC 3339 rendering of `expires_at`.
	pub fn expires_at_rfc3339(&self) -> Option<String> {
		self.expires_at.and_then(|at| at.format(&Rfc3339).ok())
	}
}
