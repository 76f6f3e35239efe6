#![cfg(all(feature = "reqwest", feature = "mock-server"))]

mod common;

// self
use common::{RecordingHttpClient, recording_client, url};
use openint_oauth::{
	client::{
		AuthorizeRequest, CodeExchangeRequest, PkceCodeChallengeMethod, PkceCodeVerifier,
		RefreshRequest, TokenRequest, TokenTypeHint,
	},
	config::{ClientAuthLocation, OAuth2ClientConfig},
};

const TOKEN_BODY: &str = "{\"access_token\":\"at-1\",\"token_type\":\"Bearer\"}";

fn salesforce_config(location: ClientAuthLocation) -> OAuth2ClientConfig {
	OAuth2ClientConfig::from_json(&format!(
		r#"{{
			"clientId": "sf-client",
			"clientSecret": "sf-secret",
			"authorizeURL": "https://login.salesforce.example/services/oauth2/authorize",
			"tokenURL": "https://login.salesforce.example/services/oauth2/token",
			"introspectURL": "https://login.salesforce.example/services/oauth2/introspect",
			"clientAuthLocation": "{}",
			"paramKeyMapping": {{ "client_id": "consumer_key", "client_secret": "consumer_secret" }},
			"scopeDelimiter": ","
		}}"#,
		match location {
			ClientAuthLocation::Body => "body",
			ClientAuthLocation::Header => "header",
		}
	))
	.expect("Salesforce-style config should parse.")
}

#[tokio::test]
async fn remapped_keys_replace_canonical_ones_in_the_body() {
	let transport = RecordingHttpClient::new(200, TOKEN_BODY);
	let client = recording_client(salesforce_config(ClientAuthLocation::Body), &transport);
	let verifier = PkceCodeVerifier::new("a".repeat(43), PkceCodeChallengeMethod::S256);
	let request = CodeExchangeRequest::new("code-1", url("https://app.example/cb"))
		.code_verifier(verifier);

	client.exchange_code_for_token(&request).await.expect("Exchange should succeed.");

	let requests = transport.requests();

	assert_eq!(requests.len(), 1);

	let sent = &requests[0];

	assert_eq!(sent.uri, "https://login.salesforce.example/services/oauth2/token");
	assert_eq!(sent.content_type.as_deref(), Some("application/x-www-form-urlencoded"));
	assert_eq!(sent.authorization, None);
	assert_eq!(sent.param("grant_type"), Some("authorization_code"));
	assert_eq!(sent.param("code"), Some("code-1"));
	assert_eq!(sent.param("redirect_uri"), Some("https://app.example/cb"));
	assert_eq!(sent.param("code_verifier"), Some("a".repeat(43).as_str()));
	assert_eq!(sent.param("consumer_key"), Some("sf-client"));
	assert_eq!(sent.param("consumer_secret"), Some("sf-secret"));
	assert_eq!(sent.param("client_id"), None);
	assert_eq!(sent.param("client_secret"), None);
}

#[tokio::test]
async fn header_authentication_keeps_credentials_out_of_the_body() {
	let transport = RecordingHttpClient::new(200, TOKEN_BODY);
	let client = recording_client(salesforce_config(ClientAuthLocation::Header), &transport);

	client.refresh_token(&RefreshRequest::new("rt-1")).await.expect("Refresh should succeed.");

	let sent = &transport.requests()[0];

	assert!(sent.authorization.as_deref().is_some_and(|value| value.starts_with("Basic ")));
	assert_eq!(sent.param("grant_type"), Some("refresh_token"));
	assert_eq!(sent.param("refresh_token"), Some("rt-1"));
	assert_eq!(sent.param("consumer_key"), None);
	assert_eq!(sent.param("client_id"), None);
	assert_eq!(sent.param("consumer_secret"), None);
	assert_eq!(sent.param("client_secret"), None);
}

#[tokio::test]
async fn additional_params_override_computed_ones_in_place() {
	let transport = RecordingHttpClient::new(200, "{\"active\":false}");
	let client = recording_client(salesforce_config(ClientAuthLocation::Body), &transport);
	let request = TokenRequest::new("at-1")
		.hint(TokenTypeHint::AccessToken)
		.param("token_type_hint", "refresh_token")
		.param("audience", "api");
	let introspection = client.introspect_token(&request).await.expect("Introspection should succeed.");

	assert!(!introspection.active);

	let keys = transport.requests()[0].form.iter().map(|(k, _)| k.clone()).collect::<Vec<_>>();

	assert_eq!(keys, ["token", "token_type_hint", "consumer_key", "consumer_secret", "audience"]);
	assert_eq!(transport.requests()[0].param("token_type_hint"), Some("refresh_token"));
}

#[test]
fn authorize_url_joins_scopes_and_remaps_keys() {
	let transport = RecordingHttpClient::new(200, TOKEN_BODY);
	let client = recording_client(salesforce_config(ClientAuthLocation::Body), &transport);
	let scopes = openint_oauth::auth::ScopeList::new(["api", "refresh_token"])
		.expect("Scope fixture should be valid.");
	let authorize_url = client.build_authorize_url(
		&AuthorizeRequest::new(url("https://app.example/cb"))
			.scopes(scopes)
			.state("xyz")
			.param("prompt", "consent"),
	);
	let pairs = authorize_url.query_pairs().into_owned().collect::<Vec<_>>();
	let get = |key: &str| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

	assert_eq!(get("consumer_key"), Some("sf-client"));
	assert_eq!(get("client_id"), None);
	assert_eq!(get("scope"), Some("api,refresh_token"));
	assert_eq!(get("state"), Some("xyz"));
	assert_eq!(get("prompt"), Some("consent"));
	assert_eq!(get("response_type"), Some("code"));
	assert!(transport.requests().is_empty());
}
