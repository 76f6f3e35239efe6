// self
use crate::{_prelude::*, auth::ConnectorName};

/// Prefix shared by connector default credential variables.
pub const CONNECTOR_VAR_PREFIX: &str = "ccfg_";

/// Extracts connector default fields from `ccfg_<connector>_<FIELD>` variables.
///
/// The connector name match is exact; the remaining field name is lower-cased so
/// `ccfg_github_CLIENT_ID` yields `client_id`. Later duplicates overwrite earlier ones.
/// The function is pure: pass `std::env::vars()` to read the process environment.
pub fn connector_defaults<I, K, V>(connector: &ConnectorName, vars: I) -> BTreeMap<String, String>
where
	I: IntoIterator<Item = (K, V)>,
	K: AsRef<str>,
	V: Into<String>,
{
	let prefix = format!("{CONNECTOR_VAR_PREFIX}{connector}_");

	vars.into_iter()
		.filter_map(|(key, value)| {
			let field = key.as_ref().strip_prefix(&prefix)?;

			if field.is_empty() {
				return None;
			}

			Some((field.to_ascii_lowercase(), value.into()))
		})
		.collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn extracts_prefixed_fields_for_one_connector() {
		let connector = ConnectorName::new("github").expect("Connector fixture should be valid.");
		let defaults = connector_defaults(
			&connector,
			[
				("ccfg_github_CLIENT_ID", "gh-client"),
				("ccfg_github_client_secret", "gh-secret"),
				("ccfg_github_", "ignored"),
				("ccfg_gitlab_CLIENT_ID", "other"),
				("PATH", "/usr/bin"),
			],
		);

		assert_eq!(defaults.len(), 2);
		assert_eq!(defaults.get("client_id").map(String::as_str), Some("gh-client"));
		assert_eq!(defaults.get("client_secret").map(String::as_str), Some("gh-secret"));
	}

	#[test]
	fn connector_names_do_not_match_by_prefix() {
		let connector = ConnectorName::new("git").expect("Connector fixture should be valid.");
		let defaults = connector_defaults(&connector, [("ccfg_github_CLIENT_ID", "gh-client")]);

		assert!(defaults.is_empty());
	}
}
