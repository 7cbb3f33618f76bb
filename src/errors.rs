//! Error types for the changetip-rs library.
//!
//! Errors come in two tiers. Precondition failures (missing credential, missing
//! arguments, unsupported API version) are returned synchronously, before a request
//! is built. Remote failures (transport errors, rejected token exchanges) only ever
//! surface when the returned future resolves.

use std::fmt;
use thiserror::Error;

/// Boxed error carried by [`ChangeTipError::Transport`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Catalog of the service client's numeric error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Credential was not set.
    MissingCredential,
    /// Channel was not defined for a tip.
    MissingChannel,
    /// API version not supported by the operation.
    UnsupportedApiVersion,
    /// User ID was not provided.
    MissingUserId,
    /// Amount or message was not provided.
    MissingAmountOrMessage,
    /// Amount or address was not provided.
    MissingAmountOrAddress,
    /// Moniker was not provided.
    MissingMoniker,
    /// Generic failure.
    Generic,
}

impl ErrorCode {
    /// Numeric code.
    pub fn code(self) -> u16 {
        match self {
            ErrorCode::MissingCredential => 300,
            ErrorCode::MissingChannel => 301,
            ErrorCode::UnsupportedApiVersion => 400,
            ErrorCode::MissingUserId => 401,
            ErrorCode::MissingAmountOrMessage => 402,
            ErrorCode::MissingAmountOrAddress => 403,
            ErrorCode::MissingMoniker => 404,
            ErrorCode::Generic => 500,
        }
    }

    /// Human-readable message for this code.
    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::MissingCredential => {
                "No API_KEY set. Call init prior to any remote API calls"
            }
            ErrorCode::MissingChannel => {
                "Channel is undefined, must be set prior to any remote API calls"
            }
            ErrorCode::UnsupportedApiVersion => "API version not supported",
            ErrorCode::MissingUserId => "User ID require",
            ErrorCode::MissingAmountOrMessage => "Text Amount or Message were not provided",
            ErrorCode::MissingAmountOrAddress => "Text Amount or Address were not provided",
            ErrorCode::MissingMoniker => "Moniker require",
            ErrorCode::Generic => "Something is amiss!",
        }
    }

    /// Looks up a catalog entry by its numeric code.
    ///
    /// # Examples
    ///
    /// ```
    /// use changetip_rs::errors::ErrorCode;
    ///
    /// assert_eq!(ErrorCode::from_code(404), Some(ErrorCode::MissingMoniker));
    /// assert_eq!(ErrorCode::from_code(999), None);
    /// ```
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            300 => Some(ErrorCode::MissingCredential),
            301 => Some(ErrorCode::MissingChannel),
            400 => Some(ErrorCode::UnsupportedApiVersion),
            401 => Some(ErrorCode::MissingUserId),
            402 => Some(ErrorCode::MissingAmountOrMessage),
            403 => Some(ErrorCode::MissingAmountOrAddress),
            404 => Some(ErrorCode::MissingMoniker),
            500 => Some(ErrorCode::Generic),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

/// Main error type for ChangeTip operations.
#[derive(Error, Debug)]
pub enum ChangeTipError {
    /// No credential configured, or an incomplete OAuth credential bundle
    #[error("{}", ErrorCode::MissingCredential.message())]
    MissingCredential,

    /// Tip sent without a channel
    #[error("{}", ErrorCode::MissingChannel.message())]
    MissingChannel,

    /// A required argument was empty
    #[error("{msg} (missing `{field}`)", msg = .code.message())]
    MissingRequiredField {
        /// Name of the missing argument
        field: &'static str,
        /// Catalog entry reported for this operation
        code: ErrorCode,
    },

    /// Tip URL requested without a moniker
    #[error("{}", ErrorCode::MissingMoniker.message())]
    MissingMoniker,

    /// User lookup without an id
    #[error("{}", ErrorCode::MissingUserId.message())]
    MissingUserId,

    /// Operation is not available for the configured API version
    #[error("{msg}: v{0}", msg = ErrorCode::UnsupportedApiVersion.message())]
    UnsupportedApiVersion(String),

    /// The transport failed before a response was received
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// The authorization server rejected a token exchange
    #[error("Token exchange failed with status {status}: {body}")]
    AuthExchangeFailed {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Missing field in a remote response
    #[error("Missing field in response: {0}")]
    MissingField(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ChangeTipError {
    /// Catalog code for precondition failures, `None` for remote failures.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            ChangeTipError::MissingCredential => Some(ErrorCode::MissingCredential),
            ChangeTipError::MissingChannel => Some(ErrorCode::MissingChannel),
            ChangeTipError::MissingRequiredField { code, .. } => Some(*code),
            ChangeTipError::MissingMoniker => Some(ErrorCode::MissingMoniker),
            ChangeTipError::MissingUserId => Some(ErrorCode::MissingUserId),
            ChangeTipError::UnsupportedApiVersion(_) => Some(ErrorCode::UnsupportedApiVersion),
            _ => None,
        }
    }

    /// Whether this error was raised before any network I/O.
    pub fn is_precondition(&self) -> bool {
        self.code().is_some()
    }
}

impl From<reqwest::Error> for ChangeTipError {
    fn from(err: reqwest::Error) -> Self {
        ChangeTipError::Transport(Box::new(err))
    }
}

/// Result type alias for ChangeTip operations.
pub type Result<T> = std::result::Result<T, ChangeTipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChangeTipError::MissingCredential;
        assert_eq!(
            err.to_string(),
            "No API_KEY set. Call init prior to any remote API calls"
        );

        let err = ChangeTipError::MissingRequiredField {
            field: "address",
            code: ErrorCode::MissingAmountOrAddress,
        };
        assert_eq!(
            err.to_string(),
            "Text Amount or Address were not provided (missing `address`)"
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ChangeTipError::MissingChannel.code(), Some(ErrorCode::MissingChannel));
        assert_eq!(
            ChangeTipError::UnsupportedApiVersion("2".to_string())
                .code()
                .map(ErrorCode::code),
            Some(400)
        );
        let remote = ChangeTipError::AuthExchangeFailed {
            status: 403,
            body: "denied".to_string(),
        };
        assert!(!remote.is_precondition());
        assert!(ChangeTipError::MissingUserId.is_precondition());
    }

    #[test]
    fn test_catalog_round_trip() {
        for code in [300, 301, 400, 401, 402, 403, 404, 500] {
            assert_eq!(ErrorCode::from_code(code).map(ErrorCode::code), Some(code));
        }
        assert_eq!(ErrorCode::Generic.to_string(), "Something is amiss! (500)");
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: ChangeTipError = json_err.into();
        assert!(matches!(err, ChangeTipError::JsonError(_)));
        assert!(err.code().is_none());
    }
}
