//! HTTP transport shared by the AppMetrica API clients.
//!
//! Handles OAuth authentication, default headers, URL construction, timeout
//! management, and status/decode error normalization. Every call is a single
//! round-trip: failures surface immediately and nothing is retried or queued.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use am_core::error::{AmError, AmResult};

/// HTTP client bound to one AppMetrica API base URL.
///
/// Wraps reqwest::Client with the OAuth and content-type headers the
/// AppMetrica APIs expect. Values are cheap to clone and safe to share
/// across tasks.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: Client,
    /// Base URL without a trailing slash.
    base_url: String,
    /// Application id, stamped into parameters by the endpoint modules.
    app_id: i64,
    /// Headers attached to every request.
    default_headers: HeaderMap,
}

impl ApiClient {
    /// Create a client for the given base URL and credentials.
    pub fn new(
        base_url: &str,
        app_id: i64,
        access_token: &str,
        timeout: Duration,
    ) -> AmResult<Self> {
        let inner = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AmError::Config(format!("failed to build HTTP client: {e}")))?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut auth = HeaderValue::from_str(&format!("OAuth {access_token}"))
            .map_err(|e| AmError::Config(format!("invalid access token: {e}")))?;
        auth.set_sensitive(true);
        default_headers.insert(AUTHORIZATION, auth);

        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id,
            default_headers,
        })
    }

    /// Merge custom headers over the defaults.
    ///
    /// A header with the same name as a built-in one replaces it, so callers
    /// can override `Content-Type` or `Authorization` when needed.
    pub fn with_custom_headers(mut self, headers: &HashMap<String, String>) -> AmResult<Self> {
        for (key, value) in headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| AmError::Config(format!("invalid header name {key:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| AmError::Config(format!("invalid value for header {key}: {e}")))?;
            self.default_headers.insert(name, value);
        }
        Ok(self)
    }

    /// Application id this client was built with.
    pub fn app_id(&self) -> i64 {
        self.app_id
    }

    /// Base URL this client is bound to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the full URL for an endpoint path.
    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Internal: a request builder with the default headers applied.
    fn build_request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        self.inner
            .request(method, self.url(endpoint))
            .headers(self.default_headers.clone())
    }

    /// Dispatch a request. One round-trip, no retries.
    async fn dispatch(
        &self,
        method: Method,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> AmResult<Response> {
        debug!("{} {}", method, self.url(endpoint));

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = Self::classify_error(e);
                error!("{} {} failed: {}", method, endpoint, err);
                return Err(err);
            }
        };

        Self::check_status(response).await
    }

    // --- Public HTTP methods ---

    /// Execute a GET request.
    pub async fn get(&self, endpoint: &str) -> AmResult<Response> {
        let builder = self.build_request(Method::GET, endpoint);
        self.dispatch(Method::GET, endpoint, builder).await
    }

    /// Execute a GET request with query parameters.
    pub async fn get_with_query<Q>(&self, endpoint: &str, query: &Q) -> AmResult<Response>
    where
        Q: Serialize + ?Sized,
    {
        let builder = self.build_request(Method::GET, endpoint).query(query);
        self.dispatch(Method::GET, endpoint, builder).await
    }

    /// Execute a POST request with a JSON body.
    pub async fn post(&self, endpoint: &str, body: &serde_json::Value) -> AmResult<Response> {
        let builder = self.build_request(Method::POST, endpoint).json(body);
        self.dispatch(Method::POST, endpoint, builder).await
    }

    // --- Response helpers ---

    /// Deserialize a response body into T.
    pub async fn parse_json<T: DeserializeOwned>(response: Response) -> AmResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| AmError::Request(format!("failed to parse response: {e}")))
    }

    /// Convenience: GET + parse.
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> AmResult<T> {
        let response = self.get(endpoint).await?;
        Self::parse_json(response).await
    }

    /// Convenience: GET with query parameters + parse.
    pub async fn get_json_with_query<T, Q>(&self, endpoint: &str, query: &Q) -> AmResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.get_with_query(endpoint, query).await?;
        Self::parse_json(response).await
    }

    /// Convenience: POST + parse.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> AmResult<T> {
        let response = self.post(endpoint, body).await?;
        Self::parse_json(response).await
    }

    /// Check the HTTP status and convert error responses to AmError.
    ///
    /// All 2xx statuses pass through untouched, including 202 Accepted:
    /// whether "accepted" counts as success is a per-API concern.
    async fn check_status(response: Response) -> AmResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!("unexpected status {}: {}", status, body);
        Err(AmError::Request(format!("unexpected status {status}: {body}")))
    }

    /// Classify a reqwest error into a request error message.
    fn classify_error(e: reqwest::Error) -> AmError {
        if e.is_timeout() {
            AmError::Request(format!("request timed out: {e}"))
        } else if e.is_connect() {
            AmError::Request(format!("connection failed: {e}"))
        } else {
            AmError::Request(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> ApiClient {
        ApiClient::new(base_url, 123, "test-token", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_join() {
        let client = test_client("http://localhost:1234/push/v1/");
        assert_eq!(client.base_url(), "http://localhost:1234/push/v1");
        assert_eq!(
            client.url("management/groups"),
            "http://localhost:1234/push/v1/management/groups"
        );
        assert_eq!(
            client.url("/management/groups"),
            "http://localhost:1234/push/v1/management/groups"
        );
    }

    #[test]
    fn test_custom_headers_override_defaults() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        headers.insert("X-Extra".to_string(), "1".to_string());

        let client = test_client("http://localhost:1234")
            .with_custom_headers(&headers)
            .unwrap();
        assert_eq!(client.default_headers[CONTENT_TYPE.as_str()], "text/plain");
        assert_eq!(client.default_headers["x-extra"], "1");
    }

    #[test]
    fn test_invalid_custom_header_is_config_error() {
        let mut headers = HashMap::new();
        headers.insert("bad name".to_string(), "1".to_string());

        let err = test_client("http://localhost:1234")
            .with_custom_headers(&headers)
            .unwrap_err();
        assert!(matches!(err, AmError::Config(_)));
    }

    #[tokio::test]
    async fn test_get_sends_default_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .match_header("authorization", "OAuth test-token")
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let body: serde_json::Value = client.get_json("ping").await.unwrap();
        assert_eq!(body["ok"], true);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_2xx_is_request_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ping")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.get("ping").await.unwrap_err();
        match err {
            AmError::Request(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_202_passes_through() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pending")
            .with_status(202)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let response = client.get("pending").await.unwrap();
        assert_eq!(response.status().as_u16(), 202);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_request_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ping")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.get_json::<serde_json::Value>("ping").await.unwrap_err();
        match err {
            AmError::Request(msg) => assert!(msg.contains("parse")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_request_error() {
        // Nothing listens on port 1.
        let client = test_client("http://127.0.0.1:1");
        let err = client.get("ping").await.unwrap_err();
        assert!(matches!(err, AmError::Request(_)));
    }
}
