// self
use crate::_prelude::*;

/// Remote OAuth operations the client performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
	/// `grant_type=authorization_code` against the token endpoint.
	AuthorizationCode,
	/// `grant_type=refresh_token` against the token endpoint.
	RefreshToken,
	/// `grant_type=client_credentials` against the token endpoint.
	ClientCredentials,
	/// RFC 7662 token introspection.
	Introspection,
	/// RFC 7009 token revocation.
	Revocation,
}
impl Operation {
	/// Returns the stable label used in errors and telemetry.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::AuthorizationCode => "authorization_code",
			Operation::RefreshToken => "refresh_token",
			Operation::ClientCredentials => "client_credentials",
			Operation::Introspection => "introspection",
			Operation::Revocation => "revocation",
		}
	}

	/// Returns the `grant_type` form value for token endpoint operations.
	pub const fn grant_type(self) -> Option<&'static str> {
		match self {
			Operation::AuthorizationCode => Some("authorization_code"),
			Operation::RefreshToken => Some("refresh_token"),
			Operation::ClientCredentials => Some("client_credentials"),
			Operation::Introspection | Operation::Revocation => None,
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
