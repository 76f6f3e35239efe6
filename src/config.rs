//! Declarative per-provider client configuration.
//!
//! Providers are described by data ([`OAuth2ClientConfig`]) rather than code: endpoints,
//! client credentials, where credentials travel, parameter renames, and the scope delimiter.
//! One generic [`OAuth2Client`](crate::client::OAuth2Client) consumes any of them.

/// Builder API and validation for client configurations.
pub mod builder;
/// Connector default credentials sourced from `ccfg_*` variables.
pub mod env;

pub use builder::*;
pub use env::*;

// self
use crate::{_prelude::*, auth::TokenSecret, params::ParamKeyMapping};

const DEFAULT_SCOPE_DELIMITER: &str = " ";

/// Where client credentials are placed on token, introspection, and revocation requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthLocation {
	/// `client_id`/`client_secret` form parameters.
	#[default]
	Body,
	/// HTTP Basic `Authorization` header.
	Header,
}

/// Immutable configuration for one provider's OAuth endpoints.
///
/// Serialized with the camelCase keys used by connector records (`clientId`, `authorizeURL`,
/// `paramKeyMapping`, ...). Use [`OAuth2ClientConfig::from_json`] or the builder so the
/// configuration is validated before use.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2ClientConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Client secret; absent for public (PKCE-only) clients.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_secret: Option<TokenSecret>,
	/// Authorization endpoint.
	#[serde(rename = "authorizeURL")]
	pub authorize_url: Url,
	/// Token endpoint used for exchanges and refreshes.
	#[serde(rename = "tokenURL")]
	pub token_url: Url,
	/// Optional RFC 7009 revocation endpoint.
	#[serde(rename = "revokeURL", default, skip_serializing_if = "Option::is_none")]
	pub revoke_url: Option<Url>,
	/// Optional RFC 7662 introspection endpoint.
	#[serde(rename = "introspectURL", default, skip_serializing_if = "Option::is_none")]
	pub introspect_url: Option<Url>,
	/// Client credential placement.
	#[serde(default)]
	pub client_auth_location: ClientAuthLocation,
	/// Canonical-to-provider parameter renames.
	#[serde(default, skip_serializing_if = "ParamKeyMapping::is_empty")]
	pub param_key_mapping: ParamKeyMapping,
	/// Delimiter used to join scopes.
	#[serde(default = "default_scope_delimiter")]
	pub scope_delimiter: String,
}
impl OAuth2ClientConfig {
	/// Creates a new builder for the provided client identifier.
	pub fn builder(client_id: impl Into<String>) -> OAuth2ClientConfigBuilder {
		OAuth2ClientConfigBuilder::new(client_id)
	}

	/// Parses and validates a JSON connector record.
	pub fn from_json(json: &str) -> Result<Self, OAuth2ClientConfigError> {
		let config: Self = serde_json::from_str(json)
			.map_err(|e| OAuth2ClientConfigError::Json { message: e.to_string() })?;

		config.validate()?;

		Ok(config)
	}

	/// Exposes the client secret, if configured.
	pub fn client_secret(&self) -> Option<&str> {
		self.client_secret.as_ref().map(TokenSecret::expose)
	}
}
impl Debug for OAuth2ClientConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2ClientConfig")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("authorize_url", &self.authorize_url.as_str())
			.field("token_url", &self.token_url.as_str())
			.field("revoke_url", &self.revoke_url.as_ref().map(Url::as_str))
			.field("introspect_url", &self.introspect_url.as_ref().map(Url::as_str))
			.field("client_auth_location", &self.client_auth_location)
			.field("param_key_mapping", &self.param_key_mapping)
			.field("scope_delimiter", &self.scope_delimiter)
			.finish()
	}
}

fn default_scope_delimiter() -> String {
	DEFAULT_SCOPE_DELIMITER.into()
}
