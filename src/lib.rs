//! OAuth 2.0 authorization-code (+ PKCE) token lifecycle for OpenInt connectors.
//!
//! - [`client`]: provider-agnostic operations (authorize URL, code exchange, refresh,
//!   introspection, revocation, client credentials) driven by declarative
//!   [`config::OAuth2ClientConfig`] records, with per-provider parameter renames.
//! - [`connector`]: the pre-connect, post-connect, check-connection, and revoke-connection hooks
//!   a connection manager calls, producing [`connector::CredentialBundle`] values and tri-state
//!   health.
//! - `mock_server` (feature `mock-server`): an in-process authorization server for tests.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod connector;
pub mod error;
pub mod http;
#[cfg(feature = "mock-server")] pub mod mock_server;
pub mod obs;
pub mod params;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		hash::Hash,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
