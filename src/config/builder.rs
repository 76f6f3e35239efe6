// std
use std::net::IpAddr;
// crates.io
use url::Host;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::{ClientAuthLocation, DEFAULT_SCOPE_DELIMITER, OAuth2ClientConfig},
	params::ParamKeyMapping,
};

/// Errors raised while constructing or validating client configurations.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum OAuth2ClientConfigError {
	/// Client identifier is required.
	#[error("Missing client identifier.")]
	MissingClientId,
	/// Authorization endpoint is required.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizeUrl,
	/// Token endpoint is required.
	#[error("Missing token endpoint.")]
	MissingTokenUrl,
	/// HTTP Basic client authentication needs a secret.
	#[error("Header client authentication requires a client secret.")]
	MissingClientSecret,
	/// Endpoints must use HTTPS unless they point at a loopback host.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Scope delimiter cannot be empty.
	#[error("Scope delimiter cannot be empty.")]
	EmptyScopeDelimiter,
	/// A parameter is renamed to an empty key.
	#[error("Parameter `{key}` is mapped to an empty name.")]
	EmptyMappedKey {
		/// Canonical parameter name.
		key: String,
	},
	/// JSON record could not be parsed.
	#[error("Client configuration is not valid JSON: {message}.")]
	Json {
		/// Parser message.
		message: String,
	},
}

/// Builder for [`OAuth2ClientConfig`] values.
#[derive(Debug)]
pub struct OAuth2ClientConfigBuilder {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Optional client secret.
	pub client_secret: Option<TokenSecret>,
	/// Authorization endpoint.
	pub authorize_url: Option<Url>,
	/// Token endpoint.
	pub token_url: Option<Url>,
	/// Optional revocation endpoint.
	pub revoke_url: Option<Url>,
	/// Optional introspection endpoint.
	pub introspect_url: Option<Url>,
	/// Client credential placement.
	pub client_auth_location: ClientAuthLocation,
	/// Canonical-to-provider parameter renames.
	pub param_key_mapping: ParamKeyMapping,
	/// Delimiter used to join scopes.
	pub scope_delimiter: String,
}
impl OAuth2ClientConfigBuilder {
	/// Creates a new builder seeded with the provided client identifier.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: None,
			authorize_url: None,
			token_url: None,
			revoke_url: None,
			introspect_url: None,
			client_auth_location: ClientAuthLocation::default(),
			param_key_mapping: ParamKeyMapping::default(),
			scope_delimiter: DEFAULT_SCOPE_DELIMITER.into(),
		}
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(TokenSecret::new(secret));

		self
	}

	/// Applies connector defaults extracted by [`connector_defaults`](crate::config::connector_defaults).
	///
	/// Only `client_id` and `client_secret` are consumed; explicit values set on the builder
	/// afterwards still win.
	pub fn connector_defaults(mut self, defaults: &BTreeMap<String, String>) -> Self {
		if let Some(client_id) = defaults.get("client_id") {
			self.client_id = client_id.clone();
		}
		if let Some(secret) = defaults.get("client_secret") {
			self.client_secret = Some(TokenSecret::new(secret.clone()));
		}

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorize_url(mut self, url: Url) -> Self {
		self.authorize_url = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_url(mut self, url: Url) -> Self {
		self.token_url = Some(url);

		self
	}

	/// Sets the optional revocation endpoint.
	pub fn revoke_url(mut self, url: Url) -> Self {
		self.revoke_url = Some(url);

		self
	}

	/// Sets the optional introspection endpoint.
	pub fn introspect_url(mut self, url: Url) -> Self {
		self.introspect_url = Some(url);

		self
	}

	/// Overrides where client credentials are sent.
	pub fn client_auth_location(mut self, location: ClientAuthLocation) -> Self {
		self.client_auth_location = location;

		self
	}

	/// Renames a canonical parameter for this provider.
	pub fn map_param(mut self, canonical: impl Into<String>, provider: impl Into<String>) -> Self {
		let mut pairs: Vec<(String, String)> =
			self.param_key_mapping.iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect();

		pairs.push((canonical.into(), provider.into()));
		self.param_key_mapping = ParamKeyMapping::new(pairs);

		self
	}

	/// Replaces the whole parameter mapping.
	pub fn param_key_mapping(mut self, mapping: ParamKeyMapping) -> Self {
		self.param_key_mapping = mapping;

		self
	}

	/// Overrides the scope delimiter (defaults to a single space).
	pub fn scope_delimiter(mut self, delimiter: impl Into<String>) -> Self {
		self.scope_delimiter = delimiter.into();

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<OAuth2ClientConfig, OAuth2ClientConfigError> {
		let authorize_url = self.authorize_url.ok_or(OAuth2ClientConfigError::MissingAuthorizeUrl)?;
		let token_url = self.token_url.ok_or(OAuth2ClientConfigError::MissingTokenUrl)?;
		let config = OAuth2ClientConfig {
			client_id: self.client_id,
			client_secret: self.client_secret,
			authorize_url,
			token_url,
			revoke_url: self.revoke_url,
			introspect_url: self.introspect_url,
			client_auth_location: self.client_auth_location,
			param_key_mapping: self.param_key_mapping,
			scope_delimiter: self.scope_delimiter,
		};

		config.validate()?;

		Ok(config)
	}
}

impl OAuth2ClientConfig {
	/// Validates invariants for the configuration.
	pub fn validate(&self) -> Result<(), OAuth2ClientConfigError> {
		if self.client_id.trim().is_empty() {
			return Err(OAuth2ClientConfigError::MissingClientId);
		}
		if matches!(self.client_auth_location, ClientAuthLocation::Header)
			&& self.client_secret.as_ref().is_none_or(TokenSecret::is_empty)
		{
			return Err(OAuth2ClientConfigError::MissingClientSecret);
		}
		if self.scope_delimiter.is_empty() {
			return Err(OAuth2ClientConfigError::EmptyScopeDelimiter);
		}
		if let Some((key, _)) = self.param_key_mapping.iter().find(|(_, v)| v.trim().is_empty()) {
			return Err(OAuth2ClientConfigError::EmptyMappedKey { key: key.to_owned() });
		}

		validate_endpoint("authorization", &self.authorize_url)?;
		validate_endpoint("token", &self.token_url)?;

		if let Some(url) = self.revoke_url.as_ref() {
			validate_endpoint("revocation", url)?;
		}
		if let Some(url) = self.introspect_url.as_ref() {
			validate_endpoint("introspection", url)?;
		}

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), OAuth2ClientConfigError> {
	match url.scheme() {
		"https" => Ok(()),
		"http" if is_loopback(url) => Ok(()),
		_ => Err(OAuth2ClientConfigError::InsecureEndpoint { endpoint: name, url: url.to_string() }),
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
		Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
		None => false,
	}
}
