//! RFC 7636 verifier generation and challenge derivation.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Length of generated verifiers (RFC 7636 allows 43..=128).
pub const PKCE_VERIFIER_LEN: usize = 64;
/// Minimum verifier length accepted by RFC 7636.
pub const PKCE_VERIFIER_MIN_LEN: usize = 43;
/// Maximum verifier length accepted by RFC 7636.
pub const PKCE_VERIFIER_MAX_LEN: usize = 128;

const UNRESERVED: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Supported PKCE challenge methods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE.
	#[default]
	S256,
	/// Verifier sent verbatim as the challenge.
	#[serde(rename = "plain")]
	Plain,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
			PkceCodeChallengeMethod::Plain => "plain",
		}
	}

	/// Parses an RFC 7636 identifier.
	pub fn parse(value: &str) -> Option<Self> {
		match value {
			"S256" => Some(Self::S256),
			"plain" => Some(Self::Plain),
			_ => None,
		}
	}

	/// Derives the challenge for `verifier` under this method.
	pub fn challenge(self, verifier: &str) -> String {
		match self {
			PkceCodeChallengeMethod::S256 => URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes())),
			PkceCodeChallengeMethod::Plain => verifier.to_owned(),
		}
	}
}
impl Display for PkceCodeChallengeMethod {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// PKCE code verifier paired with the method used to derive its challenge.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkceCodeVerifier {
	verifier: String,
	method: PkceCodeChallengeMethod,
}
impl PkceCodeVerifier {
	/// Wraps a caller-provided verifier.
	pub fn new(verifier: impl Into<String>, method: PkceCodeChallengeMethod) -> Self {
		Self { verifier: verifier.into(), method }
	}

	/// Generates a fresh verifier from the RFC 7636 unreserved character set.
	pub fn generate(method: PkceCodeChallengeMethod) -> Self {
		Self::new(random_verifier(PKCE_VERIFIER_LEN), method)
	}

	/// Returns the secret verifier sent at exchange time.
	pub fn secret(&self) -> &str {
		&self.verifier
	}

	/// Returns the challenge method.
	pub fn method(&self) -> PkceCodeChallengeMethod {
		self.method
	}

	/// Derives the challenge sent at authorization time.
	pub fn challenge(&self) -> String {
		self.method.challenge(&self.verifier)
	}
}
impl Debug for PkceCodeVerifier {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("PkceCodeVerifier")
			.field("verifier", &"<redacted>")
			.field("method", &self.method)
			.finish()
	}
}

/// Returns `true` when `verifier` satisfies the RFC 7636 length and character rules.
pub fn is_valid_verifier(verifier: &str) -> bool {
	(PKCE_VERIFIER_MIN_LEN..=PKCE_VERIFIER_MAX_LEN).contains(&verifier.len())
		&& verifier.bytes().all(|b| UNRESERVED.contains(&b))
}

fn random_verifier(len: usize) -> String {
	let mut rng = rand::rng();

	(0..len).map(|_| UNRESERVED[rng.random_range(0..UNRESERVED.len())] as char).collect()
}
