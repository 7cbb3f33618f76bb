//! HTTP transport abstraction.
//!
//! The client never talks to the network directly; every request goes through a
//! [`Transport`]. [`ReqwestTransport`] is the production implementation. Tests and
//! embedding applications can supply their own.

use crate::errors::Result;
use crate::types::TransportResponse;
use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Client;

/// Executes HTTP requests on behalf of the client.
///
/// Implementations return the status and body of any response they receive,
/// whatever the status code. Only failures to obtain a response are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a POST with a `multipart/form-data` body.
    ///
    /// # Arguments
    ///
    /// * `url` - Target URL, already carrying the authentication parameter
    /// * `fields` - Form fields in order
    async fn post_multipart(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<TransportResponse>;

    /// Sends a GET with additional query parameters appended to `url`.
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<TransportResponse>;

    /// Sends a POST with a pre-encoded body and explicit headers.
    ///
    /// Used for the `application/x-www-form-urlencoded` OAuth exchanges.
    async fn post_form(
        &self,
        url: &str,
        body: String,
        headers: &[(String, String)],
    ) -> Result<TransportResponse>;
}

/// [`Transport`] backed by a `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default `reqwest` client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transport around an existing client (custom timeouts, proxies, ...).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn into_response(response: reqwest::Response) -> Result<TransportResponse> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_multipart(
        &self,
        url: &str,
        fields: &[(String, String)],
    ) -> Result<TransportResponse> {
        let form = fields
            .iter()
            .fold(Form::new(), |form, (name, value)| {
                form.text(name.clone(), value.clone())
            });

        let response = self.client.post(url).multipart(form).send().await?;
        Self::into_response(response).await
    }

    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<TransportResponse> {
        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await?;
        Self::into_response(response).await
    }

    async fn post_form(
        &self,
        url: &str,
        body: String,
        headers: &[(String, String)],
    ) -> Result<TransportResponse> {
        let mut request = self.client.post(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.body(body).send().await?;
        Self::into_response(response).await
    }
}
