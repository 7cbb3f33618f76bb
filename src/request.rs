//! Request construction for the ChangeTip API.
//!
//! A [`RequestBuilder`] combines a configuration snapshot with an operation's path,
//! body and query parameters into an [`OperationRequest`]. Every request carries the
//! credential as a query parameter named after the authentication mode.

use crate::config::ClientConfig;
use crate::types::{HttpMethod, Payload};
use serde_json::Value;

/// `Content-Type` announced for API requests.
pub const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// A fully qualified request for one API operation.
///
/// Built fresh per call and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    method: HttpMethod,
    endpoint: String,
    url: String,
    path: String,
    data: Payload,
    query: Option<Payload>,
    headers: Vec<(String, String)>,
    content_length: usize,
}

impl OperationRequest {
    /// HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Operation path relative to the version prefix (e.g. `wallet/balance`).
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Target URL, including the authentication parameter.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Versioned path with the authentication and query parameters.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Body payload.
    pub fn data(&self) -> &Payload {
        &self.data
    }

    /// Caller-supplied query parameters.
    pub fn query(&self) -> Option<&Payload> {
        self.query.as_ref()
    }

    /// Query parameters rendered as strings, in insertion order.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .iter()
            .flat_map(|query| query.iter())
            .map(|(key, value)| (key.clone(), render_value(value)))
            .collect()
    }

    /// Body fields rendered as strings; null fields are dropped.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.data
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), render_value(value)))
            .collect()
    }

    /// Content headers.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Length of the JSON-serialized body.
    ///
    /// Informational only; the transport computes its own framing.
    pub fn content_length(&self) -> usize {
        self.content_length
    }
}

/// Builds [`OperationRequest`]s from a configuration snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RequestBuilder<'a> {
    config: &'a ClientConfig,
}

impl<'a> RequestBuilder<'a> {
    /// Creates a builder over a configuration.
    pub fn new(config: &'a ClientConfig) -> Self {
        Self { config }
    }

    /// Builds a request.
    ///
    /// # Examples
    ///
    /// ```
    /// use changetip_rs::config::ClientConfig;
    /// use changetip_rs::request::RequestBuilder;
    /// use changetip_rs::types::{HttpMethod, Payload};
    /// use serde_json::json;
    ///
    /// let config = ClientConfig::new("tok").with_api_version("1");
    /// let mut query = Payload::new();
    /// query.insert("page".to_string(), json!(2));
    ///
    /// let request = RequestBuilder::new(&config).build(
    ///     HttpMethod::Get,
    ///     "users",
    ///     Payload::new(),
    ///     Some(query),
    /// );
    /// assert_eq!(request.path(), "/v1/users/?access_token=tok&page=2");
    /// assert_eq!(request.url(), "https://api.changetip.com/v1/users/?access_token=tok");
    /// ```
    pub fn build(
        &self,
        method: HttpMethod,
        endpoint: &str,
        data: Payload,
        query: Option<Payload>,
    ) -> OperationRequest {
        let auth = self.auth_param();
        let prefix = format!("/v{}/{}/", self.config.effective_version(), endpoint);

        let query_string = query.as_ref().map(encode_query).unwrap_or_default();
        let path = if query_string.is_empty() {
            format!("{}?{}", prefix, auth)
        } else {
            format!("{}?{}&{}", prefix, auth, query_string)
        };

        let url = format!(
            "{}://{}{}?{}",
            self.config.scheme(),
            self.config.api_host(),
            prefix,
            auth
        );

        let content_length = serde_json::to_string(&data).map(|s| s.len()).unwrap_or(0);
        let headers = vec![
            ("Content-Type".to_string(), MULTIPART_CONTENT_TYPE.to_string()),
            ("Content-Length".to_string(), content_length.to_string()),
        ];

        OperationRequest {
            method,
            endpoint: endpoint.to_string(),
            url,
            path,
            data,
            query,
            headers,
            content_length,
        }
    }

    fn auth_param(&self) -> String {
        format!(
            "{}={}",
            self.config.authentication_mode().as_str(),
            encode_component(self.config.credential().unwrap_or_default())
        )
    }
}

/// Renders a payload value the way it appears in a query string or form field.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Percent-encodes a query component, leaving commas literal.
fn encode_component(raw: &str) -> String {
    urlencoding::encode(raw).replace("%2C", ",")
}

/// Encodes query parameters as `key=value&...` in insertion order.
///
/// # Examples
///
/// ```
/// use changetip_rs::request::encode_query;
/// use changetip_rs::types::Payload;
/// use serde_json::json;
///
/// let mut query = Payload::new();
/// query.insert("tips".to_string(), json!("a,b"));
/// query.insert("channel".to_string(), json!("twitter"));
/// assert_eq!(encode_query(&query), "tips=a,b&channel=twitter");
/// ```
pub fn encode_query(query: &Payload) -> String {
    query
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                encode_component(key),
                encode_component(&render_value(value))
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
