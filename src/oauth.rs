//! OAuth2 token exchange against the ChangeTip authorization server.
//!
//! The exchange is independent of the API host: it posts a form-encoded body to
//! `{scheme}://{auth_host}/o/authorize` or `/o/token` and resolves with the issued
//! access token. It never touches client configuration; callers feed the token back
//! with [`crate::client::ChangeTip::with_access_token`].

use crate::config::ClientConfig;
use crate::errors::{ChangeTipError, Result};
use crate::transport::Transport;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Path of the authorization-code endpoint.
pub const AUTHORIZE_PATH: &str = "o/authorize";

/// Path of the token endpoint.
pub const TOKEN_PATH: &str = "o/token";

/// `Content-Type` of token exchange bodies.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Future resolving to an access token.
pub type TokenFuture = BoxFuture<'static, Result<String>>;

/// Future resolving to the full token response.
pub type TokenResponseFuture = BoxFuture<'static, Result<TokenResponse>>;

/// Credentials for one token exchange.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TokenCredentials {
    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Grant type (`refresh_token`, `authorization_code`)
    pub grant_type: String,

    /// Refresh token, required by [`TokenExchange::refresh`]
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Authorization code, required by [`TokenExchange::authorize`]
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI registered for the client
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

impl TokenCredentials {
    /// Credentials for a refresh-token grant.
    ///
    /// # Examples
    ///
    /// ```
    /// use changetip_rs::oauth::TokenCredentials;
    ///
    /// let creds = TokenCredentials::refresh("id", "secret", "rt");
    /// assert_eq!(creds.grant_type, "refresh_token");
    /// ```
    pub fn refresh(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            grant_type: "refresh_token".to_string(),
            refresh_token: Some(refresh_token.into()),
            ..Self::default()
        }
    }

    /// Credentials for an authorization-code grant.
    pub fn authorization_code(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            grant_type: "authorization_code".to_string(),
            code: Some(code.into()),
            ..Self::default()
        }
    }

    /// Sets the redirect URI.
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    fn refresh_form(&self) -> Result<Vec<(&'static str, &str)>> {
        let refresh_token = required(self.refresh_token.as_deref())?;
        let mut form = self.client_form()?;
        form.push(("refresh_token", refresh_token));
        Ok(form)
    }

    fn authorize_form(&self) -> Result<Vec<(&'static str, &str)>> {
        let code = required(self.code.as_deref())?;
        let mut form = self.client_form()?;
        form.push(("code", code));
        if let Some(redirect_uri) = self.redirect_uri.as_deref().filter(|v| !v.is_empty()) {
            form.push(("redirect_uri", redirect_uri));
        }
        Ok(form)
    }

    fn client_form(&self) -> Result<Vec<(&'static str, &str)>> {
        Ok(vec![
            ("grant_type", required(Some(self.grant_type.as_str()))?),
            ("client_id", required(Some(self.client_id.as_str()))?),
            ("client_secret", required(Some(self.client_secret.as_str()))?),
        ])
    }
}

fn required(value: Option<&str>) -> Result<&str> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ChangeTipError::MissingCredential)
}

/// Successful response of the token endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TokenResponse {
    /// Issued access token
    pub access_token: String,

    /// Replacement refresh token, if the server rotated it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token type (usually `Bearer`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Lifetime in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    /// Granted scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Obtains and refreshes access tokens.
#[derive(Clone)]
pub struct TokenExchange {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl TokenExchange {
    /// Creates an exchange targeting the configuration's authorization host.
    pub fn new(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: format!("{}://{}", config.scheme(), config.auth_host()),
            transport,
        }
    }

    /// Base URL of the authorization server.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// Fails immediately with [`ChangeTipError::MissingCredential`] when the code,
    /// client id, client secret or grant type is missing.
    pub fn authorize(&self, credentials: &TokenCredentials) -> Result<TokenFuture> {
        let form = credentials.authorize_form()?;
        Ok(self.exchange(AUTHORIZE_PATH, &form).map(|res| access_token(&res?)).boxed())
    }

    /// Exchanges a refresh token for a new access token.
    ///
    /// Fails immediately with [`ChangeTipError::MissingCredential`] when the refresh
    /// token, client id, client secret or grant type is missing.
    pub fn refresh(&self, credentials: &TokenCredentials) -> Result<TokenFuture> {
        let form = credentials.refresh_form()?;
        Ok(self.exchange(TOKEN_PATH, &form).map(|res| access_token(&res?)).boxed())
    }

    /// Like [`TokenExchange::authorize`], resolving with the whole token response.
    pub fn authorize_response(&self, credentials: &TokenCredentials) -> Result<TokenResponseFuture> {
        let form = credentials.authorize_form()?;
        Ok(self.exchange(AUTHORIZE_PATH, &form).map(token_response).boxed())
    }

    /// Like [`TokenExchange::refresh`], resolving with the whole token response.
    pub fn refresh_response(&self, credentials: &TokenCredentials) -> Result<TokenResponseFuture> {
        let form = credentials.refresh_form()?;
        Ok(self.exchange(TOKEN_PATH, &form).map(token_response).boxed())
    }

    /// Posts the form and resolves with the parsed body of a 200 response.
    fn exchange(
        &self,
        path: &'static str,
        form: &[(&'static str, &str)],
    ) -> BoxFuture<'static, Result<Value>> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form.iter().copied())
            .finish();
        let headers = vec![
            ("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()),
            ("Content-Length".to_string(), body.len().to_string()),
        ];
        let url = format!("{}/{}", self.base_url, path);
        let transport = Arc::clone(&self.transport);

        async move {
            tracing::debug!(path, "exchanging OAuth token");
            let response = transport.post_form(&url, body, &headers).await?;

            if response.status != 200 {
                tracing::warn!(path, status = response.status, "token exchange rejected");
                return Err(ChangeTipError::AuthExchangeFailed {
                    status: response.status,
                    body: response.body,
                });
            }

            Ok(serde_json::from_str(&response.body)?)
        }
        .boxed()
    }
}

/// Only `access_token` is read; other fields may carry any type.
fn access_token(token: &Value) -> Result<String> {
    token
        .get("access_token")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ChangeTipError::MissingField("access_token".to_string()))
}

fn token_response(res: Result<Value>) -> Result<TokenResponse> {
    let token = res?;
    access_token(&token)?;
    Ok(serde_json::from_value(token)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransportResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FormRecorder {
        response: Option<TransportResponse>,
        calls: Mutex<Vec<(String, String, Vec<(String, String)>)>>,
    }

    #[async_trait]
    impl Transport for FormRecorder {
        async fn post_multipart(&self, _: &str, _: &[(String, String)]) -> Result<TransportResponse> {
            unreachable!("token exchange never posts multipart")
        }

        async fn get(&self, _: &str, _: &[(String, String)]) -> Result<TransportResponse> {
            unreachable!("token exchange never issues GET")
        }

        async fn post_form(
            &self,
            url: &str,
            body: String,
            headers: &[(String, String)],
        ) -> Result<TransportResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), body, headers.to_vec()));
            Ok(self.response.clone().unwrap())
        }
    }

    fn exchange_with(status: u16, body: &str) -> (TokenExchange, Arc<FormRecorder>) {
        let recorder = Arc::new(FormRecorder {
            response: Some(TransportResponse::new(status, body)),
            ..FormRecorder::default()
        });
        let exchange = TokenExchange::new(&ClientConfig::default(), recorder.clone());
        (exchange, recorder)
    }

    #[tokio::test]
    async fn test_refresh_resolves_with_access_token() {
        let (exchange, recorder) = exchange_with(200, r#"{"access_token": "X", "expires_in": 3600}"#);
        let creds = TokenCredentials::refresh("cid", "secret", "rt-1");

        let token = exchange.refresh(&creds).unwrap().await.unwrap();
        assert_eq!(token, "X");

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (url, body, headers) = &calls[0];
        assert_eq!(url, "https://www.changetip.com/o/token");
        assert_eq!(
            body,
            "grant_type=refresh_token&client_id=cid&client_secret=secret&refresh_token=rt-1"
        );
        assert!(headers.contains(&("Content-Length".to_string(), body.len().to_string())));
        assert!(headers.contains(&("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string())));
    }

    #[tokio::test]
    async fn test_authorize_targets_authorize_endpoint() {
        let (exchange, recorder) = exchange_with(200, r#"{"access_token": "A"}"#);
        let creds = TokenCredentials::authorization_code("cid", "secret", "code-9")
            .with_redirect_uri("https://app.test/cb");

        let token = exchange.authorize_response(&creds).unwrap().await.unwrap();
        assert_eq!(token.access_token, "A");
        assert_eq!(token.expires_in, None);

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls[0].0, "https://www.changetip.com/o/authorize");
        assert!(calls[0].1.contains("code=code-9"));
        assert!(calls[0].1.contains("redirect_uri=https%3A%2F%2Fapp.test%2Fcb"));
    }

    #[tokio::test]
    async fn test_rejected_exchange_carries_status() {
        let (exchange, _) = exchange_with(403, "forbidden");
        let creds = TokenCredentials::refresh("cid", "secret", "rt");

        let err = exchange.refresh(&creds).unwrap().await.unwrap_err();
        match err {
            ChangeTipError::AuthExchangeFailed { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "forbidden");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_success_without_token_is_an_error() {
        let (exchange, _) = exchange_with(200, r#"{"error": "none"}"#);
        let creds = TokenCredentials::refresh("cid", "secret", "rt");
        let err = exchange.refresh(&creds).unwrap().await.unwrap_err();
        assert!(matches!(err, ChangeTipError::MissingField(_)));

        let (exchange, _) = exchange_with(200, "not json");
        let err = exchange.refresh(&creds).unwrap().await.unwrap_err();
        assert!(matches!(err, ChangeTipError::JsonError(_)));
    }

    #[tokio::test]
    async fn test_token_tolerates_loosely_typed_extras() {
        let creds = TokenCredentials::refresh("cid", "secret", "rt");
        for body in [
            r#"{"access_token": "X", "expires_in": "3600"}"#,
            r#"{"access_token": "X", "scope": ["read", "write"]}"#,
        ] {
            let (exchange, _) = exchange_with(200, body);
            assert_eq!(exchange.refresh(&creds).unwrap().await.unwrap(), "X");

            let err = exchange.refresh_response(&creds).unwrap().await.unwrap_err();
            assert!(matches!(err, ChangeTipError::JsonError(_)));
        }

        let creds = TokenCredentials::authorization_code("cid", "secret", "code-9");
        let (exchange, _) = exchange_with(200, r#"{"access_token": "A", "expires_in": "soon"}"#);
        assert_eq!(exchange.authorize(&creds).unwrap().await.unwrap(), "A");
    }

    #[test]
    fn test_incomplete_credentials_fail_before_sending() {
        let (exchange, recorder) = exchange_with(200, "{}");

        let mut creds = TokenCredentials::refresh("cid", "secret", "rt");
        creds.refresh_token = None;
        assert!(matches!(
            exchange.refresh(&creds),
            Err(ChangeTipError::MissingCredential)
        ));

        let creds = TokenCredentials::refresh("", "secret", "rt");
        assert!(matches!(
            exchange.refresh(&creds),
            Err(ChangeTipError::MissingCredential)
        ));

        let creds = TokenCredentials::refresh("cid", "secret", "rt");
        assert!(matches!(
            exchange.authorize(&creds),
            Err(ChangeTipError::MissingCredential)
        ));

        assert!(recorder.calls.lock().unwrap().is_empty());
    }
}
