//! In-memory keyed stores backing the mock authorization server.

// std
use std::collections::HashSet;
// self
use crate::{
	_prelude::*,
	auth::ScopeList,
	client::{PkceCodeChallengeMethod, TokenTypeHint},
};

/// Thread-safe keyed store shared by every repository.
#[derive(Debug)]
pub struct MemoryRepository<K, V>(Arc<RwLock<HashMap<K, V>>>);
impl<K, V> MemoryRepository<K, V>
where
	K: Eq + Hash,
	V: Clone,
{
	/// Inserts or replaces a record.
	pub fn insert(&self, key: K, value: V) {
		self.0.write().insert(key, value);
	}

	/// Returns a copy of the record stored under `key`.
	pub fn get<Q>(&self, key: &Q) -> Option<V>
	where
		K: std::borrow::Borrow<Q>,
		Q: ?Sized + Eq + Hash,
	{
		self.0.read().get(key).cloned()
	}

	/// Removes and returns the record stored under `key`.
	pub fn remove<Q>(&self, key: &Q) -> Option<V>
	where
		K: std::borrow::Borrow<Q>,
		Q: ?Sized + Eq + Hash,
	{
		self.0.write().remove(key)
	}

	/// Mutates the record stored under `key` in place, returning the updated copy.
	pub fn update<Q, F>(&self, key: &Q, f: F) -> Option<V>
	where
		K: std::borrow::Borrow<Q>,
		Q: ?Sized + Eq + Hash,
		F: FnOnce(&mut V),
	{
		let mut guard = self.0.write();
		let record = guard.get_mut(key)?;

		f(record);

		Some(record.clone())
	}

	/// Number of stored records.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl<K, V> Clone for MemoryRepository<K, V> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}
impl<K, V> Default for MemoryRepository<K, V> {
	fn default() -> Self {
		Self(Arc::new(RwLock::new(HashMap::new())))
	}
}

/// Registered OAuth client.
#[derive(Clone, Debug)]
pub struct MockClient {
	/// Client identifier.
	pub client_id: String,
	/// Secret for confidential clients; `None` marks a public client.
	pub client_secret: Option<String>,
	/// Registered redirect URIs.
	pub redirect_uris: Vec<Url>,
}
impl MockClient {
	/// Confidential client with a single redirect URI.
	pub fn confidential(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		redirect_uri: Url,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: Some(client_secret.into()),
			redirect_uris: vec![redirect_uri],
		}
	}

	/// Public client with a single redirect URI.
	pub fn public(client_id: impl Into<String>, redirect_uri: Url) -> Self {
		Self { client_id: client_id.into(), client_secret: None, redirect_uris: vec![redirect_uri] }
	}
}

/// Resource owner the server auto-approves as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockUser {
	/// Stable subject identifier.
	pub id: String,
	/// Display name reported by introspection.
	pub username: String,
}

/// Access/refresh token pair.
#[derive(Clone, Debug)]
pub struct IssuedToken {
	/// Access token value.
	pub access_token: String,
	/// Refresh token value, absent for client credentials.
	pub refresh_token: Option<String>,
	/// Owning client.
	pub client_id: String,
	/// Owning user, absent for client credentials.
	pub user_id: Option<String>,
	/// Granted scopes.
	pub scopes: ScopeList,
	/// Issue instant.
	pub issued_at: OffsetDateTime,
	/// Access token expiry.
	pub expires_at: OffsetDateTime,
	/// Set when the pair was revoked or rotated out.
	pub revoked: bool,
}

/// Pending authorization code.
#[derive(Clone, Debug)]
pub struct AuthorizationCodeGrant {
	/// Client the code was issued to.
	pub client_id: String,
	/// Approving user.
	pub user_id: String,
	/// Redirect URI sent at authorize time, if any.
	pub redirect_uri: Option<Url>,
	/// Approved scopes.
	pub scopes: ScopeList,
	/// PKCE challenge and method recorded at authorize time.
	pub code_challenge: Option<(String, PkceCodeChallengeMethod)>,
	/// Instant after which the code is rejected.
	pub expires_at: OffsetDateTime,
}

/// Scopes the server knows; an empty registry accepts any scope.
#[derive(Clone, Debug, Default)]
pub struct ScopeRepository(Arc<RwLock<HashSet<String>>>);
impl ScopeRepository {
	/// Registers scopes.
	pub fn register<I, S>(&self, scopes: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.0.write().extend(scopes.into_iter().map(Into::into));
	}

	/// Returns the first scope that is not registered.
	pub fn first_unknown<'a>(&self, scopes: &'a ScopeList) -> Option<&'a str> {
		let known = self.0.read();

		if known.is_empty() {
			return None;
		}

		scopes.iter().find(|scope| !known.contains(*scope))
	}
}

/// Every repository the server uses.
#[derive(Clone, Debug, Default)]
pub struct Repositories {
	/// Clients keyed by id.
	pub clients: MemoryRepository<String, MockClient>,
	/// Users keyed by id.
	pub users: MemoryRepository<String, MockUser>,
	/// Token pairs keyed by access token.
	pub tokens: MemoryRepository<String, IssuedToken>,
	/// Refresh token to access token index.
	pub refresh_index: MemoryRepository<String, String>,
	/// Pending codes keyed by code value.
	pub codes: MemoryRepository<String, AuthorizationCodeGrant>,
	/// Known scopes.
	pub scopes: ScopeRepository,
}
impl Repositories {
	/// Finds a token pair by either of its tokens.
	///
	/// `hint` only decides which index is searched first; a miss falls back to the other one.
	pub fn find_token(&self, token: &str, hint: Option<TokenTypeHint>) -> Option<IssuedToken> {
		let by_access = || self.tokens.get(token);
		let by_refresh = || self.refresh_index.get(token).and_then(|access| self.tokens.get(&access));

		match hint {
			Some(TokenTypeHint::RefreshToken) => by_refresh().or_else(by_access),
			_ => by_access().or_else(by_refresh),
		}
	}

	/// Marks the pair containing `token` as revoked.
	pub fn revoke_pair(&self, token: &IssuedToken) {
		self.tokens.update(&token.access_token, |record| record.revoked = true);
	}
}
