//! Client configuration.
//!
//! [`ClientConfig`] is a plain value. Fields that were never set resolve to their
//! defaults through accessor functions such as [`ClientConfig::effective_version`],
//! so nothing is validated when the configuration is assembled. Operations check
//! what they need at call time.

use crate::errors::{ChangeTipError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2";

/// Host for all remote API requests.
pub const DEFAULT_API_HOST: &str = "api.changetip.com";

/// Host of the OAuth authorization server.
pub const DEFAULT_AUTH_HOST: &str = "www.changetip.com";

/// URL scheme used for both hosts.
pub const DEFAULT_SCHEME: &str = "https";

/// How the credential is presented to the API.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationMode {
    /// Credential is an API key (`?api_key=...`)
    ApiKey,
    /// Credential is an OAuth access token (`?access_token=...`)
    #[default]
    AccessToken,
}

impl AuthenticationMode {
    /// Name of the query parameter carrying the credential.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthenticationMode::ApiKey => "api_key",
            AuthenticationMode::AccessToken => "access_token",
        }
    }
}

impl fmt::Display for AuthenticationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthenticationMode {
    type Err = ChangeTipError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "api_key" => Ok(AuthenticationMode::ApiKey),
            "access_token" => Ok(AuthenticationMode::AccessToken),
            other => Err(ChangeTipError::ConfigError(format!(
                "unknown authentication type '{}'",
                other
            ))),
        }
    }
}

/// Options bag accepted by [`ClientConfig::init`].
///
/// Every field is optional; anything left out keeps its default.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ClientOptions {
    /// API key or OAuth access token
    #[serde(default, alias = "api_key_or_access_token")]
    pub credential: Option<String>,

    /// Authentication mode (`api_key` or `access_token`)
    #[serde(default, alias = "authentication_type")]
    pub authentication_mode: Option<AuthenticationMode>,

    /// API host
    #[serde(default, alias = "host")]
    pub api_host: Option<String>,

    /// OAuth authorization server host
    #[serde(default)]
    pub auth_host: Option<String>,

    /// API version (without the `v` prefix)
    #[serde(default)]
    pub api_version: Option<String>,

    /// URL scheme for both hosts
    #[serde(default)]
    pub scheme: Option<String>,

    /// Dry-run mode
    #[serde(default)]
    pub dev_mode: Option<bool>,
}

/// Configuration for a ChangeTip client.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ClientConfig {
    /// API key or OAuth access token
    pub credential: Option<String>,

    /// Authentication mode; defaults to [`AuthenticationMode::AccessToken`]
    pub authentication_mode: Option<AuthenticationMode>,

    /// API host; defaults to [`DEFAULT_API_HOST`]
    pub api_host: Option<String>,

    /// Authorization server host; defaults to [`DEFAULT_AUTH_HOST`]
    pub auth_host: Option<String>,

    /// API version; defaults to [`DEFAULT_API_VERSION`]
    pub api_version: Option<String>,

    /// URL scheme; defaults to [`DEFAULT_SCHEME`]
    pub scheme: Option<String>,

    /// When set, operations resolve with a description of the request instead of sending it
    pub dev_mode: bool,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl ClientConfig {
    /// Creates a configuration holding only a credential.
    ///
    /// # Examples
    ///
    /// ```
    /// use changetip_rs::config::ClientConfig;
    ///
    /// let config = ClientConfig::new("my-token");
    /// assert_eq!(config.credential(), Some("my-token"));
    /// assert_eq!(config.effective_version(), "2");
    /// assert_eq!(config.api_host(), "api.changetip.com");
    /// ```
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            credential: Some(credential.into()),
            ..Self::default()
        }
    }

    /// Builds a configuration from an options bag.
    ///
    /// # Examples
    ///
    /// ```
    /// use changetip_rs::config::{AuthenticationMode, ClientConfig, ClientOptions};
    ///
    /// let config = ClientConfig::init(ClientOptions {
    ///     credential: Some("key".to_string()),
    ///     authentication_mode: Some(AuthenticationMode::ApiKey),
    ///     ..ClientOptions::default()
    /// });
    /// assert_eq!(config.authentication_mode(), AuthenticationMode::ApiKey);
    /// assert!(!config.dev_mode);
    /// ```
    pub fn init(options: ClientOptions) -> Self {
        Self {
            credential: options.credential,
            authentication_mode: options.authentication_mode,
            api_host: options.api_host,
            auth_host: options.auth_host,
            api_version: options.api_version,
            scheme: options.scheme,
            dev_mode: options.dev_mode.unwrap_or(false),
        }
    }

    /// Loads the configuration from `CHANGETIP_*` environment variables.
    ///
    /// Recognized variables: `CHANGETIP_API_KEY_OR_ACCESS_TOKEN`,
    /// `CHANGETIP_AUTHENTICATION_TYPE`, `CHANGETIP_HOST`, `CHANGETIP_AUTH_HOST`,
    /// `CHANGETIP_API_VERSION`, `CHANGETIP_SCHEME`, `CHANGETIP_DEV_MODE`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let authentication_mode = lookup("CHANGETIP_AUTHENTICATION_TYPE")
            .filter(|v| !v.is_empty())
            .map(|v| v.parse::<AuthenticationMode>())
            .transpose()?;

        let dev_mode = match lookup("CHANGETIP_DEV_MODE").as_deref() {
            None | Some("") => None,
            Some("1") | Some("true") | Some("TRUE") | Some("yes") => Some(true),
            Some("0") | Some("false") | Some("FALSE") | Some("no") => Some(false),
            Some(other) => {
                return Err(ChangeTipError::ConfigError(format!(
                    "CHANGETIP_DEV_MODE must be a boolean, got '{}'",
                    other
                )))
            }
        };

        Ok(Self::init(ClientOptions {
            credential: lookup("CHANGETIP_API_KEY_OR_ACCESS_TOKEN"),
            authentication_mode,
            api_host: lookup("CHANGETIP_HOST"),
            auth_host: lookup("CHANGETIP_AUTH_HOST"),
            api_version: lookup("CHANGETIP_API_VERSION"),
            scheme: lookup("CHANGETIP_SCHEME"),
            dev_mode,
        }))
    }

    /// Sets the credential.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }

    /// Sets the authentication mode.
    pub fn with_authentication_mode(mut self, mode: AuthenticationMode) -> Self {
        self.authentication_mode = Some(mode);
        self
    }

    /// Sets the API host.
    pub fn with_api_host(mut self, host: impl Into<String>) -> Self {
        self.api_host = Some(host.into());
        self
    }

    /// Sets the authorization server host.
    pub fn with_auth_host(mut self, host: impl Into<String>) -> Self {
        self.auth_host = Some(host.into());
        self
    }

    /// Sets the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the URL scheme (`https` or `http`).
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Enables or disables dev mode.
    pub fn with_dev_mode(mut self, dev_mode: bool) -> Self {
        self.dev_mode = dev_mode;
        self
    }

    /// The credential, if one is set and non-empty.
    pub fn credential(&self) -> Option<&str> {
        non_empty(&self.credential)
    }

    /// The configured API version, or [`DEFAULT_API_VERSION`].
    pub fn effective_version(&self) -> &str {
        non_empty(&self.api_version).unwrap_or(DEFAULT_API_VERSION)
    }

    /// The configured authentication mode, or `access_token`.
    pub fn authentication_mode(&self) -> AuthenticationMode {
        self.authentication_mode.unwrap_or_default()
    }

    /// The configured API host, or [`DEFAULT_API_HOST`].
    pub fn api_host(&self) -> &str {
        non_empty(&self.api_host).unwrap_or(DEFAULT_API_HOST)
    }

    /// The configured authorization host, or [`DEFAULT_AUTH_HOST`].
    pub fn auth_host(&self) -> &str {
        non_empty(&self.auth_host).unwrap_or(DEFAULT_AUTH_HOST)
    }

    /// The configured URL scheme, or [`DEFAULT_SCHEME`].
    pub fn scheme(&self) -> &str {
        non_empty(&self.scheme).unwrap_or(DEFAULT_SCHEME)
    }

    /// Whether the configured version is the default one.
    pub(crate) fn is_default_version(&self) -> bool {
        self.effective_version() == DEFAULT_API_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.credential(), None);
        assert_eq!(config.effective_version(), "2");
        assert_eq!(config.api_host(), DEFAULT_API_HOST);
        assert_eq!(config.auth_host(), DEFAULT_AUTH_HOST);
        assert_eq!(config.scheme(), "https");
        assert_eq!(config.authentication_mode(), AuthenticationMode::AccessToken);
        assert!(!config.dev_mode);
    }

    #[test]
    fn test_empty_values_fall_back() {
        let config = ClientConfig::new("")
            .with_api_version("")
            .with_api_host("");
        assert_eq!(config.credential(), None);
        assert_eq!(config.effective_version(), "2");
        assert_eq!(config.api_host(), DEFAULT_API_HOST);
    }

    #[test]
    fn test_config_builders() {
        let config = ClientConfig::new("token")
            .with_api_version("1")
            .with_api_host("api.example.test")
            .with_auth_host("auth.example.test")
            .with_scheme("http")
            .with_authentication_mode(AuthenticationMode::ApiKey)
            .with_dev_mode(true);

        assert_eq!(config.effective_version(), "1");
        assert!(!config.is_default_version());
        assert_eq!(config.api_host(), "api.example.test");
        assert_eq!(config.auth_host(), "auth.example.test");
        assert_eq!(config.scheme(), "http");
        assert_eq!(config.authentication_mode().as_str(), "api_key");
        assert!(config.dev_mode);
    }

    #[test]
    fn test_init_from_json_options() {
        let options: ClientOptions = serde_json::from_str(
            r#"{"api_key_or_access_token": "abc", "authentication_type": "api_key", "host": "h", "dev_mode": true}"#,
        )
        .unwrap();
        let config = ClientConfig::init(options);

        assert_eq!(config.credential(), Some("abc"));
        assert_eq!(config.authentication_mode(), AuthenticationMode::ApiKey);
        assert_eq!(config.api_host(), "h");
        assert_eq!(config.effective_version(), "2");
        assert!(config.dev_mode);
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("CHANGETIP_API_KEY_OR_ACCESS_TOKEN", "secret"),
            ("CHANGETIP_AUTHENTICATION_TYPE", "api_key"),
            ("CHANGETIP_API_VERSION", "1"),
            ("CHANGETIP_DEV_MODE", "true"),
        ]
        .into_iter()
        .collect();

        let config =
            ClientConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.credential(), Some("secret"));
        assert_eq!(config.authentication_mode(), AuthenticationMode::ApiKey);
        assert_eq!(config.effective_version(), "1");
        assert!(config.dev_mode);
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let bad_mode = ClientConfig::from_lookup(|key| {
            (key == "CHANGETIP_AUTHENTICATION_TYPE").then(|| "bearer".to_string())
        });
        assert!(matches!(bad_mode, Err(ChangeTipError::ConfigError(_))));

        let bad_flag = ClientConfig::from_lookup(|key| {
            (key == "CHANGETIP_DEV_MODE").then(|| "maybe".to_string())
        });
        assert!(matches!(bad_flag, Err(ChangeTipError::ConfigError(_))));
    }
}
