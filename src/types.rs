//! Core type definitions shared by the client, request builder and transport.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Ordered key/value payload used for request bodies and query parameters.
pub type Payload = Map<String, Value>;

/// Status reported by dev-mode replies.
pub const DEV_MODE_STATUS: &str = "dev_mode";

/// HTTP method of an API operation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
}

impl HttpMethod {
    /// Method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tip to be sent through [`crate::client::ChangeTip::send_tip`].
///
/// Every field except `sender` must be non-empty.
///
/// # Examples
///
/// ```
/// use changetip_rs::types::TipRequest;
///
/// let tip = TipRequest::new("uid-1", "https://example.com/post/1", "bob", "twitter", "a coffee")
///     .with_sender("alice");
/// assert_eq!(tip.sender.as_deref(), Some("alice"));
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TipRequest {
    /// Unique id of the context (e.g. the tweet id) this tip belongs to
    pub context_uid: String,

    /// URL of the context
    pub context_url: String,

    /// Username or identifier of the sender
    #[serde(default)]
    pub sender: Option<String>,

    /// Username or identifier of the receiver
    pub receiver: String,

    /// Origin channel (twitter, github, slack, ...)
    pub channel: String,

    /// Tip message, including the amount or moniker
    pub message: String,
}

impl TipRequest {
    /// Creates a tip without a sender.
    pub fn new(
        context_uid: impl Into<String>,
        context_url: impl Into<String>,
        receiver: impl Into<String>,
        channel: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            context_uid: context_uid.into(),
            context_url: context_url.into(),
            sender: None,
            receiver: receiver.into(),
            channel: channel.into(),
            message: message.into(),
        }
    }

    /// Sets the sender.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}

/// Tips to look up with [`crate::client::ChangeTip::get_tip`]: one id or several.
#[derive(Debug, Clone, PartialEq)]
pub enum TipIds {
    /// A single tip identifier
    One(String),
    /// Several identifiers, sent comma-joined
    Many(Vec<String>),
}

impl TipIds {
    /// The value sent in the `tips` query parameter.
    pub fn joined(&self) -> String {
        match self {
            TipIds::One(id) => id.clone(),
            TipIds::Many(ids) => ids.join(","),
        }
    }
}

impl From<&str> for TipIds {
    fn from(id: &str) -> Self {
        TipIds::One(id.to_string())
    }
}

impl From<String> for TipIds {
    fn from(id: String) -> Self {
        TipIds::One(id)
    }
}

impl From<Vec<String>> for TipIds {
    fn from(ids: Vec<String>) -> Self {
        TipIds::Many(ids)
    }
}

impl From<Vec<&str>> for TipIds {
    fn from(ids: Vec<&str>) -> Self {
        TipIds::Many(ids.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TipIds {
    fn from(ids: [&str; N]) -> Self {
        TipIds::Many(ids.iter().map(|id| id.to_string()).collect())
    }
}

/// Status and body returned by a [`crate::transport::Transport`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,

    /// Raw response body
    pub body: String,
}

impl TransportResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Description of the request an operation would have sent, returned in dev mode.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DevModeReply {
    /// Always `"dev_mode"`
    pub status: String,

    /// Body payload
    pub data: Payload,

    /// Query parameters, `None` for operations without any
    pub params: Option<Payload>,

    /// Versioned path including the authentication and query parameters
    pub path: String,
}

/// Successful outcome of an API operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Response from the service, body passed through verbatim
    Body {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Dry-run description produced in dev mode
    DevMode(DevModeReply),
}

impl Reply {
    /// The raw body of a remote response.
    pub fn body(&self) -> Option<&str> {
        match self {
            Reply::Body { body, .. } => Some(body),
            Reply::DevMode(_) => None,
        }
    }

    /// The dev-mode description, if this reply came from dev mode.
    pub fn dev_mode(&self) -> Option<&DevModeReply> {
        match self {
            Reply::DevMode(reply) => Some(reply),
            Reply::Body { .. } => None,
        }
    }

    /// Parses the reply as JSON.
    ///
    /// Remote bodies are parsed; dev-mode replies are serialized as-is.
    pub fn into_json(self) -> crate::Result<Value> {
        match self {
            Reply::Body { body, .. } => Ok(serde_json::from_str(&body)?),
            Reply::DevMode(reply) => Ok(serde_json::to_value(reply)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tip_ids_joined() {
        assert_eq!(TipIds::from("abc").joined(), "abc");
        assert_eq!(TipIds::from(vec!["a", "b"]).joined(), "a,b");
        assert_eq!(TipIds::from(["x", "y", "z"]).joined(), "x,y,z");
        assert_eq!(TipIds::Many(vec![]).joined(), "");
    }

    #[test]
    fn test_dev_mode_reply_serialization() {
        let mut data = Payload::new();
        data.insert("message".to_string(), json!("hi"));
        let reply = DevModeReply {
            status: DEV_MODE_STATUS.to_string(),
            data,
            params: None,
            path: "/v1/tip/?access_token=t".to_string(),
        };

        let value = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "dev_mode",
                "data": {"message": "hi"},
                "params": null,
                "path": "/v1/tip/?access_token=t"
            })
        );
    }

    #[test]
    fn test_reply_into_json() {
        let reply = Reply::Body {
            status: 200,
            body: r#"{"count": 3}"#.to_string(),
        };
        assert_eq!(reply.body(), Some(r#"{"count": 3}"#));
        assert_eq!(reply.into_json().unwrap(), json!({"count": 3}));

        let bad = Reply::Body {
            status: 500,
            body: "<html>".to_string(),
        };
        assert!(bad.into_json().is_err());
    }

    #[test]
    fn test_http_method_display() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(serde_json::to_string(&HttpMethod::Post).unwrap(), "\"POST\"");
    }
}
