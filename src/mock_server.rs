//! In-process OAuth 2.0 authorization server for end-to-end tests.
//!
//! Implements `GET /authorize` (auto-approving as a configured user), `POST /token`
//! (`authorization_code`, `refresh_token`, `client_credentials`), `POST /token/introspect`, and
//! `POST /token/revoke` over in-memory repositories. Refresh tokens rotate on use, and
//! introspecting a revoked or rotated-out token reports `active: false`.
//!
//! ```no_run
//! # async fn demo() -> openint_oauth::error::Result<()> {
//! use openint_oauth::mock_server::{self, MockAuthorizationServer, MockClient};
//!
//! let server = MockAuthorizationServer::default();
//! let callback = openint_oauth::url::Url::parse("http://127.0.0.1:3000/callback").expect("valid URL");
//!
//! server.register_client(MockClient::confidential("app", "secret", callback));
//!
//! let handle = mock_server::spawn(server).await?;
//!
//! println!("token endpoint: {}", handle.url(mock_server::TOKEN_PATH));
//! # Ok(())
//! # }
//! ```

mod repository;
mod router;
mod server;

pub use repository::*;
pub use router::*;
pub use server::*;
