// self
use crate::{_prelude::*, auth::ConnectionId, error::StateError};

/// Opaque value round-tripped through the provider as the `state` parameter.
///
/// Created by pre-connect and consumed once by post-connect; never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthState {
	/// Connection the authorization belongs to.
	pub connection_id: ConnectionId,
	/// Callback URI used when building the authorize URL.
	pub redirect_uri: Url,
}
impl OAuthState {
	/// Encodes the state as compact JSON.
	pub fn encode(&self) -> Result<String, StateError> {
		serde_json::to_string(self).map_err(|source| StateError::Encode { source })
	}

	/// Decodes a state echoed back by the provider.
	pub fn decode(raw: &str) -> Result<Self, StateError> {
		serde_json::from_str(raw).map_err(|source| StateError::Malformed { source })
	}
}
