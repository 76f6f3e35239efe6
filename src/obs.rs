//! Optional observability helpers for client operations and connector hooks.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `openint_oauth.flow` with the `flow`
//!   (operation or hook), `stage` (call site), and `outcome` fields.
//! - Enable `metrics` to increment the `openint_oauth_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, and the
//!   `openint_oauth_connection_status_total` counter for every health check result.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, client::Operation};

/// Units of work observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization code exchange.
	AuthorizationCode,
	/// Refresh token grant.
	RefreshToken,
	/// Client credentials grant.
	ClientCredentials,
	/// Token introspection.
	Introspection,
	/// Token revocation.
	Revocation,
	/// Connector pre-connect hook.
	PreConnect,
	/// Connector post-connect hook.
	PostConnect,
	/// Connector health check.
	CheckConnection,
	/// Connector revocation hook.
	RevokeConnection,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::AuthorizationCode => "authorization_code",
			FlowKind::RefreshToken => "refresh_token",
			FlowKind::ClientCredentials => "client_credentials",
			FlowKind::Introspection => "introspection",
			FlowKind::Revocation => "revocation",
			FlowKind::PreConnect => "pre_connect",
			FlowKind::PostConnect => "post_connect",
			FlowKind::CheckConnection => "check_connection",
			FlowKind::RevokeConnection => "revoke_connection",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl From<Operation> for FlowKind {
	fn from(operation: Operation) -> Self {
		match operation {
			Operation::AuthorizationCode => FlowKind::AuthorizationCode,
			Operation::RefreshToken => FlowKind::RefreshToken,
			Operation::ClientCredentials => FlowKind::ClientCredentials,
			Operation::Introspection => FlowKind::Introspection,
			Operation::Revocation => FlowKind::Revocation,
		}
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to an operation or hook.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside a [`FlowSpan`], recording attempt and outcome metrics around it.
pub(crate) async fn observe<T, Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	finish(&span, &result);

	result
}

/// Synchronous counterpart of [`observe`].
pub(crate) fn observe_sync<T>(
	kind: FlowKind,
	stage: &'static str,
	f: impl FnOnce() -> Result<T>,
) -> Result<T> {
	let span = FlowSpan::new(kind, stage);

	record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.in_scope(f);

	finish(&span, &result);

	result
}

fn finish<T>(span: &FlowSpan, result: &Result<T>) {
	let outcome = if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure };

	record_flow_outcome(span.kind(), outcome);
	span.record_outcome(outcome);

	#[cfg(feature = "tracing")]
	{
		if let Err(e) = result {
			span.in_scope(|| ::tracing::debug!(error = %e, "Flow failed."));
		}
	}
}
