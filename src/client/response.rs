//! Normalized token and introspection payloads.

// crates.io
use serde::{Deserializer, de::Error as _};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::{ScopeList, TokenSecret},
	client::Operation,
	error::MalformedResponse,
};

/// RFC 7009/7662 `token_type_hint` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenTypeHint {
	/// The token is an access token.
	AccessToken,
	/// The token is a refresh token.
	RefreshToken,
}
impl TokenTypeHint {
	/// Returns the wire value.
	pub const fn as_str(self) -> &'static str {
		match self {
			TokenTypeHint::AccessToken => "access_token",
			TokenTypeHint::RefreshToken => "refresh_token",
		}
	}

	/// Parses a wire value.
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"access_token" => Some(Self::AccessToken),
			"refresh_token" => Some(Self::RefreshToken),
			_ => None,
		}
	}
}

/// Successful token endpoint response.
///
/// `expires_at` is derived from `expires_in` when the response is received and never
/// recomputed afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
	/// Access token issued by the provider.
	pub access_token: TokenSecret,
	/// Token type (usually `Bearer`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_type: Option<String>,
	/// Lifetime in seconds, as reported by the provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_in: Option<i64>,
	/// Refresh token, when the provider issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// Granted scope string, verbatim.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
	/// Absolute expiry derived at receipt.
	#[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
	pub expires_at: Option<OffsetDateTime>,
	/// Verbatim provider payload.
	pub raw: Value,
}
impl TokenResponse {
	/// Parses a token endpoint body received at `received_at`.
	pub fn from_slice(
		operation: Operation,
		status: u16,
		body: &[u8],
		received_at: OffsetDateTime,
	) -> Result<Self> {
		let mut de = serde_json::Deserializer::from_slice(body);
		let raw: Value = serde_path_to_error::deserialize(&mut de)
			.map_err(|e| MalformedResponse::from_json(operation, status, e))?;
		let wire: WireTokenResponse = serde_path_to_error::deserialize(&raw)
			.map_err(|e| MalformedResponse::from_json(operation, status, e))?;

		if wire.access_token.trim().is_empty() {
			return Err(
				MalformedResponse::invalid(operation, status, "access_token is empty").into()
			);
		}

		let expires_at = match wire.expires_in {
			Some(secs) => Some(received_at.checked_add(Duration::seconds(secs)).ok_or_else(|| {
				MalformedResponse::invalid(operation, status, "expires_in out of range")
			})?),
			None => None,
		};

		Ok(Self {
			access_token: TokenSecret::new(wire.access_token),
			token_type: wire.token_type,
			expires_in: wire.expires_in,
			refresh_token: wire.refresh_token.filter(|t| !t.is_empty()).map(TokenSecret::new),
			scope: wire.scope,
			expires_at,
			raw,
		})
	}

	/// Splits the granted scope string with `delimiter`.
	pub fn scopes(&self, delimiter: &str) -> ScopeList {
		self.scope.as_deref().map(|raw| ScopeList::split(raw, delimiter)).unwrap_or_default()
	}
}

#[derive(Deserialize)]
struct WireTokenResponse {
	access_token: String,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default, deserialize_with = "deserialize_expires_in")]
	expires_in: Option<i64>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	scope: Option<String>,
}

fn deserialize_expires_in<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Lenient {
		Int(i64),
		Float(f64),
		Text(String),
	}

	match Option::<Lenient>::deserialize(deserializer)? {
		None => Ok(None),
		Some(Lenient::Int(secs)) => Ok(Some(secs)),
		Some(Lenient::Float(secs)) if secs.is_finite() => Ok(Some(secs as i64)),
		Some(Lenient::Float(secs)) => Err(D::Error::custom(format!("invalid expires_in `{secs}`"))),
		Some(Lenient::Text(raw)) => raw
			.trim()
			.parse::<i64>()
			.map(Some)
			.map_err(|_| D::Error::custom(format!("invalid expires_in `{raw}`"))),
	}
}

/// RFC 7662 introspection response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenIntrospection {
	/// Whether the token is currently active.
	pub active: bool,
	/// Space-separated scopes associated with the token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
	/// Client the token was issued to.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_id: Option<String>,
	/// Human-readable resource owner identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
	/// Token type.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_type: Option<String>,
	/// Expiry as seconds since the Unix epoch.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub exp: Option<i64>,
	/// Issue time as seconds since the Unix epoch.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iat: Option<i64>,
	/// Not-before time as seconds since the Unix epoch.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nbf: Option<i64>,
	/// Subject of the token.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sub: Option<String>,
	/// Audience (string or array).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub aud: Option<Value>,
	/// Issuer.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub iss: Option<String>,
	/// Token identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub jti: Option<String>,
	/// Provider-specific members.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}
impl TokenIntrospection {
	/// Response for an inactive token, with no other members.
	pub fn inactive() -> Self {
		Self {
			active: false,
			scope: None,
			client_id: None,
			username: None,
			token_type: None,
			exp: None,
			iat: None,
			nbf: None,
			sub: None,
			aud: None,
			iss: None,
			jti: None,
			extra: BTreeMap::new(),
		}
	}

	/// Parses an introspection endpoint body.
	pub fn from_slice(operation: Operation, status: u16, body: &[u8]) -> Result<Self> {
		let mut de = serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|e| MalformedResponse::from_json(operation, status, e).into())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn received_at() -> OffsetDateTime {
		time::macros::datetime!(2025-01-01 00:00 UTC)
	}

	#[test]
	fn derives_expires_at_at_receipt() {
		let response = TokenResponse::from_slice(
			Operation::AuthorizationCode,
			200,
			br#"{"access_token":"at","token_type":"Bearer","expires_in":3600,"refresh_token":"rt","scope":"a b"}"#,
			received_at(),
		)
		.expect("Token response should parse.");

		assert_eq!(response.access_token.expose(), "at");
		assert_eq!(response.expires_at, Some(received_at() + Duration::hours(1)));
		assert_eq!(response.refresh_token.as_ref().map(TokenSecret::expose), Some("rt"));
		assert_eq!(response.scopes(" ").as_slice(), ["a", "b"]);
		assert_eq!(response.raw["token_type"], "Bearer");
	}

	#[test]
	fn accepts_numeric_string_expires_in() {
		let response = TokenResponse::from_slice(
			Operation::RefreshToken,
			200,
			br#"{"access_token":"at","expires_in":"7200"}"#,
			received_at(),
		)
		.expect("Numeric string expires_in should parse.");

		assert_eq!(response.expires_in, Some(7200));
		assert!(response.refresh_token.is_none());
	}

	#[test]
	fn rejects_missing_or_empty_access_token() {
		let missing = TokenResponse::from_slice(
			Operation::ClientCredentials,
			200,
			br#"{"token_type":"Bearer"}"#,
			received_at(),
		)
		.expect_err("Missing access_token must fail.");

		assert!(matches!(missing, Error::Malformed(_)));

		let empty = TokenResponse::from_slice(
			Operation::ClientCredentials,
			200,
			br#"{"access_token":""}"#,
			received_at(),
		)
		.expect_err("Empty access_token must fail.");

		assert!(empty.to_string().contains("access_token is empty"));

		let bad_expiry = TokenResponse::from_slice(
			Operation::ClientCredentials,
			200,
			br#"{"access_token":"at","expires_in":"soon"}"#,
			received_at(),
		)
		.expect_err("Non-numeric expires_in must fail.");

		assert!(bad_expiry.to_string().contains("expires_in"));
	}

	#[test]
	fn rejects_expires_in_beyond_the_calendar() {
		for body in [
			br#"{"access_token":"at","expires_in":9223372036854775807}"#.as_slice(),
			br#"{"access_token":"at","expires_in":1e300}"#,
			br#"{"access_token":"at","expires_in":"-9223372036854775808"}"#,
		] {
			let err = TokenResponse::from_slice(Operation::AuthorizationCode, 200, body, received_at())
				.expect_err("Out-of-range expires_in must fail.");

			assert!(matches!(err, Error::Malformed(_)));
			assert!(err.to_string().contains("expires_in out of range"));
		}
	}

	#[test]
	fn introspection_preserves_unknown_members() {
		let introspection = TokenIntrospection::from_slice(
			Operation::Introspection,
			200,
			br#"{"active":true,"scope":"read","exp":1735689600,"aud":["a","b"],"tenant":"acme"}"#,
		)
		.expect("Introspection should parse.");

		assert!(introspection.active);
		assert_eq!(introspection.exp, Some(1_735_689_600));
		assert_eq!(introspection.extra.get("tenant"), Some(&Value::from("acme")));
		assert!(
			TokenIntrospection::from_slice(Operation::Introspection, 200, b"{}").is_err(),
			"`active` is required."
		);
	}
}
