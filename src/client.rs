//! The ChangeTip API client.
//!
//! Each operation validates its arguments and the configuration synchronously,
//! returning `Err` before anything is sent. On success it hands back an
//! [`ApiFuture`] that performs the single HTTP request and resolves exactly once.
//!
//! ```no_run
//! use changetip_rs::{client, ClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = client(ClientConfig::new("my-access-token").with_api_version("1"));
//! let reply = api.get_wallet_balance()?.await?;
//! println!("{}", reply.body().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use crate::config::ClientConfig;
use crate::errors::{ChangeTipError, ErrorCode, Result};
use crate::oauth::TokenExchange;
use crate::request::{OperationRequest, RequestBuilder};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    DevModeReply, HttpMethod, Payload, Reply, TipIds, TipRequest, DEV_MODE_STATUS,
};
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use serde_json::{json, Value};
use std::sync::Arc;

/// Future returned by every API operation.
pub type ApiFuture = BoxFuture<'static, Result<Reply>>;

/// Client for the ChangeTip API.
///
/// Cheap to clone; clones share the configuration snapshot and the transport.
#[derive(Clone)]
pub struct ChangeTip {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

/// Creates a client using the default `reqwest` transport.
///
/// # Examples
///
/// ```
/// use changetip_rs::{client, ClientConfig};
///
/// let api = client(ClientConfig::new("token").with_dev_mode(true));
/// assert!(api.config().dev_mode);
/// ```
pub fn client(config: ClientConfig) -> ChangeTip {
    ChangeTip::new(config)
}

impl ChangeTip {
    /// Creates a client using the default `reqwest` transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()))
    }

    /// Creates a client with a custom transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    /// The configuration snapshot used by this client.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns a client sharing this transport, with the credential replaced.
    ///
    /// Use it to install a token obtained through [`TokenExchange`]. Futures
    /// already handed out keep the configuration they were built with.
    pub fn with_access_token(&self, token: impl Into<String>) -> Self {
        Self {
            config: Arc::new(self.config.as_ref().clone().with_credential(token)),
            transport: Arc::clone(&self.transport),
        }
    }

    /// Token exchange against this client's authorization host.
    pub fn token_exchange(&self) -> TokenExchange {
        TokenExchange::new(&self.config, Arc::clone(&self.transport))
    }

    /// Sends a tip.
    ///
    /// # Errors
    ///
    /// * [`ChangeTipError::MissingCredential`] when no credential is configured
    /// * [`ChangeTipError::MissingChannel`] when `tip.channel` is empty
    /// * [`ChangeTipError::MissingRequiredField`] when the receiver, context uid,
    ///   context URL or message is empty
    pub fn send_tip(&self, tip: &TipRequest) -> Result<ApiFuture> {
        self.require_credential()?;
        if tip.channel.is_empty() {
            return Err(ChangeTipError::MissingChannel);
        }
        for (field, value) in [
            ("receiver", &tip.receiver),
            ("context_uid", &tip.context_uid),
            ("context_url", &tip.context_url),
            ("message", &tip.message),
        ] {
            if value.is_empty() {
                return Err(ChangeTipError::MissingRequiredField {
                    field,
                    code: ErrorCode::Generic,
                });
            }
        }

        let data = payload([
            ("message", json!(tip.message)),
            ("receiver", json!(tip.receiver)),
            ("context_uid", json!(tip.context_uid)),
            ("context_url", json!(tip.context_url)),
            ("sender", json!(tip.sender)),
            ("channel", json!(tip.channel)),
        ]);
        Ok(self.dispatch(HttpMethod::Post, "tip", data, None))
    }

    /// Lists monikers. `page` defaults to 1.
    pub fn monikers(&self, page: Option<u32>) -> Result<ApiFuture> {
        self.paged("monikers", page)
    }

    /// Lists currencies. `page` defaults to 1.
    pub fn currencies(&self, page: Option<u32>) -> Result<ApiFuture> {
        self.paged("currencies", page)
    }

    /// Looks up one user.
    ///
    /// # Errors
    ///
    /// [`ChangeTipError::MissingUserId`] when `user_id` is empty, after the
    /// credential and version checks.
    pub fn user(&self, user_id: &str, full: bool) -> Result<ApiFuture> {
        self.require_credential()?;
        self.require_supported_version()?;
        if user_id.is_empty() {
            return Err(ChangeTipError::MissingUserId);
        }

        let params = payload([("full", json!(full))]);
        Ok(self.dispatch(
            HttpMethod::Get,
            &format!("users/{}", urlencoding::encode(user_id)),
            Payload::new(),
            Some(params),
        ))
    }

    /// Lists users. `page` defaults to 1.
    pub fn users(&self, page: Option<u32>) -> Result<ApiFuture> {
        self.paged("users", page)
    }

    /// Lists transactions. `page` defaults to 1.
    pub fn transactions(&self, page: Option<u32>) -> Result<ApiFuture> {
        self.paged("transactions", page)
    }

    /// Creates a tip URL for `"{amount} {moniker}"`.
    ///
    /// # Errors
    ///
    /// * [`ChangeTipError::MissingRequiredField`] when `amount` or `message` is empty
    /// * [`ChangeTipError::MissingMoniker`] when `moniker` is empty
    /// * [`ChangeTipError::UnsupportedApiVersion`] on the default API version
    pub fn tip_url(&self, amount: &str, moniker: &str, message: &str) -> Result<ApiFuture> {
        self.require_credential()?;
        if amount.is_empty() {
            return Err(ChangeTipError::MissingRequiredField {
                field: "amount",
                code: ErrorCode::MissingAmountOrMessage,
            });
        }
        if moniker.is_empty() {
            return Err(ChangeTipError::MissingMoniker);
        }
        if message.is_empty() {
            return Err(ChangeTipError::MissingRequiredField {
                field: "message",
                code: ErrorCode::MissingAmountOrMessage,
            });
        }
        self.require_supported_version()?;

        let data = payload([
            ("amount", json!(format!("{} {}", amount, moniker))),
            ("message", json!(message)),
        ]);
        Ok(self.dispatch(HttpMethod::Post, "tip-url", data, None))
    }

    /// Lists wallet withdrawals.
    pub fn get_wallet_withdrawals(&self) -> Result<ApiFuture> {
        self.require_credential()?;
        self.require_supported_version()?;
        Ok(self.dispatch(HttpMethod::Get, "wallet/withdrawals", Payload::new(), None))
    }

    /// Requests a withdrawal of `amount` to `address`.
    pub fn post_wallet_withdrawals(&self, amount: &str, address: &str) -> Result<ApiFuture> {
        self.require_credential()?;
        self.require_supported_version()?;
        for (field, value) in [("amount", amount), ("address", address)] {
            if value.is_empty() {
                return Err(ChangeTipError::MissingRequiredField {
                    field,
                    code: ErrorCode::MissingAmountOrAddress,
                });
            }
        }

        let data = payload([("amount", json!(amount)), ("address", json!(address))]);
        Ok(self.dispatch(HttpMethod::Post, "wallet/withdrawals", data, None))
    }

    /// Retrieves the wallet balance.
    pub fn get_wallet_balance(&self) -> Result<ApiFuture> {
        self.require_credential()?;
        self.require_supported_version()?;
        Ok(self.dispatch(HttpMethod::Get, "wallet/balance", Payload::new(), None))
    }

    /// Retrieves the wallet address of `username`.
    pub fn get_wallet_address(&self, username: &str) -> Result<ApiFuture> {
        self.require_credential()?;
        self.require_supported_version()?;

        let params = payload([("username", json!(username))]);
        Ok(self.dispatch(HttpMethod::Get, "wallet/address", Payload::new(), Some(params)))
    }

    /// Retrieves one or more tips, optionally filtered by channel.
    ///
    /// Only the credential is checked; this operation is available on every
    /// API version.
    ///
    /// # Examples
    ///
    /// ```
    /// use changetip_rs::{client, ClientConfig};
    ///
    /// # tokio_test::block_on(async {
    /// let api = client(ClientConfig::new("tok").with_dev_mode(true));
    /// let reply = api.get_tip(["a", "b"], Some("twitter")).unwrap().await.unwrap();
    /// assert_eq!(
    ///     reply.dev_mode().unwrap().path,
    ///     "/v2/tips/?access_token=tok&tips=a,b&channel=twitter"
    /// );
    /// # });
    /// ```
    pub fn get_tip(&self, tips: impl Into<TipIds>, channel: Option<&str>) -> Result<ApiFuture> {
        self.require_credential()?;

        let params = payload([
            ("tips", json!(tips.into().joined())),
            ("channel", json!(channel.unwrap_or_default())),
        ]);
        Ok(self.dispatch(HttpMethod::Get, "tips", Payload::new(), Some(params)))
    }

    fn paged(&self, endpoint: &'static str, page: Option<u32>) -> Result<ApiFuture> {
        self.require_credential()?;
        self.require_supported_version()?;

        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let params = payload([("page", json!(page))]);
        Ok(self.dispatch(HttpMethod::Get, endpoint, Payload::new(), Some(params)))
    }

    fn require_credential(&self) -> Result<()> {
        match self.config.credential() {
            Some(_) => Ok(()),
            None => Err(ChangeTipError::MissingCredential),
        }
    }

    fn require_supported_version(&self) -> Result<()> {
        if self.config.is_default_version() {
            return Err(ChangeTipError::UnsupportedApiVersion(
                self.config.effective_version().to_string(),
            ));
        }
        Ok(())
    }

    fn dispatch(
        &self,
        method: HttpMethod,
        endpoint: &str,
        data: Payload,
        params: Option<Payload>,
    ) -> ApiFuture {
        let request = RequestBuilder::new(&self.config).build(method, endpoint, data, params);

        if self.config.dev_mode {
            tracing::debug!(%method, endpoint, "dev mode, request not sent");
            return future::ready(Ok(dev_mode_reply(request))).boxed();
        }

        let transport = Arc::clone(&self.transport);
        async move { send(transport.as_ref(), &request).await }.boxed()
    }
}

async fn send(transport: &dyn Transport, request: &OperationRequest) -> Result<Reply> {
    tracing::debug!(
        method = %request.method(),
        endpoint = request.endpoint(),
        content_length = request.content_length(),
        "sending ChangeTip request"
    );

    let response = match request.method() {
        HttpMethod::Post => {
            transport
                .post_multipart(request.url(), &request.form_fields())
                .await
        }
        HttpMethod::Get => transport.get(request.url(), &request.query_pairs()).await,
    };

    match response {
        Ok(response) => {
            tracing::debug!(
                endpoint = request.endpoint(),
                status = response.status,
                "ChangeTip response received"
            );
            Ok(Reply::Body {
                status: response.status,
                body: response.body,
            })
        }
        Err(err) => {
            tracing::debug!(endpoint = request.endpoint(), error = %err, "ChangeTip request failed");
            Err(err)
        }
    }
}

fn dev_mode_reply(request: OperationRequest) -> Reply {
    Reply::DevMode(DevModeReply {
        status: DEV_MODE_STATUS.to_string(),
        data: request.data().clone(),
        params: request.query().cloned(),
        path: request.path().to_string(),
    })
}

fn payload<const N: usize>(pairs: [(&str, Value); N]) -> Payload {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
