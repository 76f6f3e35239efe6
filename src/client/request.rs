//! Inputs for the client operations.
//!
//! Each request carries `additional_params`, merged after the computed parameters so callers
//! can override any default the client sets.

// self
use crate::{
	_prelude::*,
	auth::{ScopeList, TokenSecret},
	client::{PkceCodeVerifier, TokenTypeHint},
	params::RequestParams,
};

/// Input for [`OAuth2Client::build_authorize_url`](crate::client::OAuth2Client::build_authorize_url).
#[derive(Clone, Debug)]
pub struct AuthorizeRequest {
	/// Callback URI the provider redirects to.
	pub redirect_uri: Url,
	/// Requested scopes; omitted from the URL when empty.
	pub scopes: ScopeList,
	/// Opaque `state` value.
	pub state: Option<String>,
	/// PKCE verifier; only its challenge leaves the process.
	pub code_verifier: Option<PkceCodeVerifier>,
	/// Extra query parameters, merged last.
	pub additional_params: RequestParams,
}
impl AuthorizeRequest {
	/// Creates a request for `redirect_uri` with no scopes, state, or PKCE.
	pub fn new(redirect_uri: Url) -> Self {
		Self {
			redirect_uri,
			scopes: ScopeList::default(),
			state: None,
			code_verifier: None,
			additional_params: RequestParams::default(),
		}
	}

	/// Sets the requested scopes.
	pub fn scopes(mut self, scopes: ScopeList) -> Self {
		self.scopes = scopes;

		self
	}

	/// Sets the `state` parameter.
	pub fn state(mut self, state: impl Into<String>) -> Self {
		self.state = Some(state.into());

		self
	}

	/// Enables PKCE with the given verifier.
	pub fn code_verifier(mut self, verifier: PkceCodeVerifier) -> Self {
		self.code_verifier = Some(verifier);

		self
	}

	/// Adds an extra query parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.additional_params.insert(key, value);

		self
	}
}

/// Input for [`OAuth2Client::exchange_code_for_token`](crate::client::OAuth2Client::exchange_code_for_token).
#[derive(Clone, Debug)]
pub struct CodeExchangeRequest {
	/// Authorization code returned on the callback.
	pub code: TokenSecret,
	/// Redirect URI used at authorization time.
	pub redirect_uri: Url,
	/// PKCE verifier, when a challenge was sent.
	pub code_verifier: Option<PkceCodeVerifier>,
	/// Extra form parameters, merged last.
	pub additional_params: RequestParams,
}
impl CodeExchangeRequest {
	/// Creates an exchange request.
	pub fn new(code: impl Into<String>, redirect_uri: Url) -> Self {
		Self {
			code: TokenSecret::new(code),
			redirect_uri,
			code_verifier: None,
			additional_params: RequestParams::default(),
		}
	}

	/// Sets the PKCE verifier.
	pub fn code_verifier(mut self, verifier: PkceCodeVerifier) -> Self {
		self.code_verifier = Some(verifier);

		self
	}

	/// Adds an extra form parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.additional_params.insert(key, value);

		self
	}
}

/// Input for [`OAuth2Client::refresh_token`](crate::client::OAuth2Client::refresh_token).
#[derive(Clone, Debug)]
pub struct RefreshRequest {
	/// Refresh token to redeem.
	pub refresh_token: TokenSecret,
	/// Extra form parameters, merged last.
	pub additional_params: RequestParams,
}
impl RefreshRequest {
	/// Creates a refresh request.
	pub fn new(refresh_token: impl Into<String>) -> Self {
		Self {
			refresh_token: TokenSecret::new(refresh_token),
			additional_params: RequestParams::default(),
		}
	}

	/// Adds an extra form parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.additional_params.insert(key, value);

		self
	}
}

/// Input shared by introspection and revocation.
#[derive(Clone, Debug)]
pub struct TokenRequest {
	/// Token to introspect or revoke.
	pub token: TokenSecret,
	/// Optional hint about the token's type.
	pub token_type_hint: Option<TokenTypeHint>,
	/// Extra form parameters, merged last.
	pub additional_params: RequestParams,
}
impl TokenRequest {
	/// Creates a request for `token`.
	pub fn new(token: impl Into<String>) -> Self {
		Self {
			token: TokenSecret::new(token),
			token_type_hint: None,
			additional_params: RequestParams::default(),
		}
	}

	/// Sets the `token_type_hint` parameter.
	pub fn hint(mut self, hint: TokenTypeHint) -> Self {
		self.token_type_hint = Some(hint);

		self
	}

	/// Adds an extra form parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.additional_params.insert(key, value);

		self
	}
}

/// Input for [`OAuth2Client::introspect_token`](crate::client::OAuth2Client::introspect_token).
pub type IntrospectionRequest = TokenRequest;
/// Input for [`OAuth2Client::revoke_token`](crate::client::OAuth2Client::revoke_token).
pub type RevocationRequest = TokenRequest;

/// Input for [`OAuth2Client::get_token_with_client_credentials`](crate::client::OAuth2Client::get_token_with_client_credentials).
#[derive(Clone, Debug, Default)]
pub struct ClientCredentialsRequest {
	/// Requested scopes; omitted when empty.
	pub scopes: ScopeList,
	/// Extra form parameters, merged last.
	pub additional_params: RequestParams,
}
impl ClientCredentialsRequest {
	/// Creates a request for `scopes`.
	pub fn new(scopes: ScopeList) -> Self {
		Self { scopes, additional_params: RequestParams::default() }
	}

	/// Adds an extra form parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.additional_params.insert(key, value);

		self
	}
}
