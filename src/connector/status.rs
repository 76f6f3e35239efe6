// self
use crate::_prelude::*;

/// Tri-state health of a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
	/// Credentials work.
	Healthy,
	/// Credentials are no longer valid; the user must reconnect.
	Disconnected,
	/// The check itself failed; credentials were left untouched.
	Error,
}
impl ConnectionStatus {
	/// Returns the wire label.
	pub const fn as_str(self) -> &'static str {
		match self {
			ConnectionStatus::Healthy => "healthy",
			ConnectionStatus::Disconnected => "disconnected",
			ConnectionStatus::Error => "error",
		}
	}
}
impl Display for ConnectionStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Status plus an optional human-readable reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionHealth {
	/// Health classification.
	pub status: ConnectionStatus,
	/// Explanation, mostly set for non-healthy results.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status_message: Option<String>,
}
impl ConnectionHealth {
	/// Healthy with no message.
	pub fn healthy() -> Self {
		Self { status: ConnectionStatus::Healthy, status_message: None }
	}

	/// Disconnected with a reason.
	pub fn disconnected(message: impl Into<String>) -> Self {
		Self { status: ConnectionStatus::Disconnected, status_message: Some(message.into()) }
	}

	/// Errored with a reason.
	pub fn error(message: impl Into<String>) -> Self {
		Self { status: ConnectionStatus::Error, status_message: Some(message.into()) }
	}
}
