//! Outgoing parameter maps and provider-specific key remapping.
//!
//! Every parameter map the client sends (authorize query strings, token/introspection/revocation
//! form bodies) is assembled with canonical RFC names and passed through
//! [`ParamKeyMapping::apply`] immediately before serialization. This is what lets one client
//! implementation talk to providers that rename `client_id` to e.g. `consumer_key` without any
//! per-provider code.

// self
use crate::_prelude::*;

/// Mapping from canonical parameter names (e.g. `client_id`) to provider-specific names.
///
/// Keys absent from the mapping pass through unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamKeyMapping(BTreeMap<String, String>);
impl ParamKeyMapping {
	/// Builds a mapping from `(canonical, provider)` pairs.
	pub fn new<I, K, V>(pairs: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}

	/// Returns the provider-specific name for `key`.
	pub fn map_key<'a>(&'a self, key: &'a str) -> &'a str {
		self.0.get(key).map(String::as_str).unwrap_or(key)
	}

	/// Applies the mapping to every key of `params`.
	///
	/// When two canonical keys collapse onto the same provider key, the later one wins.
	pub fn apply(&self, params: RequestParams) -> RequestParams {
		let mut mapped = RequestParams::default();

		for (key, value) in params.0 {
			mapped.insert(self.map_key(&key).to_owned(), value);
		}

		mapped
	}

	/// Returns `true` when no key is remapped.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterator over `(canonical, provider)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

/// Ordered parameter list where inserting an existing key replaces its value in place.
///
/// Insertion order is kept so authorize URLs stay stable and readable; overriding a computed
/// default (e.g. via additional params) does not move it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestParams(Vec<(String, String)>);
impl RequestParams {
	/// Inserts or replaces a parameter.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
		let key = key.into();
		let value = value.into();

		match self.0.iter_mut().find(|(existing, _)| *existing == key) {
			Some((_, slot)) => *slot = value,
			None => self.0.push((key, value)),
		}
	}

	/// Inserts the parameter only when `value` is present.
	pub fn insert_opt(&mut self, key: impl Into<String>, value: Option<impl Into<String>>) {
		if let Some(value) = value {
			self.insert(key, value);
		}
	}

	/// Merges `pairs` on top of the current parameters.
	pub fn merge<I, K, V>(&mut self, pairs: I)
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		for (key, value) in pairs {
			self.insert(key, value);
		}
	}

	/// Returns the value stored for `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.iter().find(|(existing, _)| existing == key).map(|(_, value)| value.as_str())
	}

	/// Returns `true` if `key` is present.
	pub fn contains(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	/// Iterator over `(key, value)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Serializes the parameters as an `application/x-www-form-urlencoded` string.
	pub fn to_form_urlencoded(&self) -> String {
		let mut serializer = url::form_urlencoded::Serializer::new(String::new());

		for (key, value) in self.iter() {
			serializer.append_pair(key, value);
		}

		serializer.finish()
	}
}
impl<K, V> FromIterator<(K, V)> for RequestParams
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut params = Self::default();

		params.merge(iter);

		params
	}
}
