//! # changetip-rs
//!
//! An async Rust client for the ChangeTip tipping API.
//!
//! The crate turns configuration and per-call arguments into authenticated HTTP
//! requests against a fixed remote API, and maps their outcome to a single future per
//! call. It covers sending and looking up tips, listing monikers, currencies, users
//! and transactions, tip URLs, wallet operations, and the OAuth2 token exchange.
//!
//! ## Features
//!
//! - **Two-tier errors**: argument and configuration problems are returned
//!   synchronously, before any request exists; network failures only surface when the
//!   returned future resolves
//! - **API key or access token** authentication, passed as a query parameter
//! - **OAuth2 token exchange** against the authorization host, decoupled from the API host
//! - **Dev mode**: a dry run that resolves with a description of the request instead
//!   of sending it
//! - **Pluggable transport**: `reqwest` by default, any [`transport::Transport`] otherwise
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use changetip_rs::{client, ClientConfig, TipRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = client(ClientConfig::new("YOUR_ACCESS_TOKEN"));
//!
//! let tip = TipRequest::new(
//!     "tweet-1234",
//!     "https://twitter.com/bob/status/1234",
//!     "bob",
//!     "twitter",
//!     "a coffee",
//! )
//! .with_sender("alice");
//!
//! let reply = api.send_tip(&tip)?.await?;
//! println!("{}", reply.body().unwrap_or_default());
//! # Ok(())
//! # }
//! ```
//!
//! ## Dev Mode
//!
//! ```rust
//! use changetip_rs::{client, ClientConfig};
//!
//! # tokio_test::block_on(async {
//! let api = client(ClientConfig::new("tok").with_api_version("1").with_dev_mode(true));
//! let reply = api.monikers(None).unwrap().await.unwrap();
//! let described = reply.dev_mode().unwrap();
//!
//! assert_eq!(described.status, "dev_mode");
//! assert_eq!(described.path, "/v1/monikers/?access_token=tok&page=1");
//! # });
//! ```
//!
//! ## Refreshing a Token
//!
//! ```rust,no_run
//! use changetip_rs::{client, ClientConfig, TokenCredentials};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = client(ClientConfig::default());
//! let creds = TokenCredentials::refresh("client-id", "client-secret", "refresh-token");
//!
//! let token = api.token_exchange().refresh(&creds)?.await?;
//! let api = api.with_access_token(token);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod errors;
pub mod oauth;
pub mod request;
pub mod transport;
pub mod types;

// Re-export commonly used items
pub use client::{client, ApiFuture, ChangeTip};
pub use config::{AuthenticationMode, ClientConfig, ClientOptions, DEFAULT_API_VERSION};
pub use errors::{ChangeTipError, ErrorCode, Result};
pub use oauth::{TokenCredentials, TokenExchange, TokenResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{DevModeReply, Reply, TipIds, TipRequest, TransportResponse};
