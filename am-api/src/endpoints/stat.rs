//! Stat API endpoints for report queries.

use std::time::Duration;

use serde::Serialize;

use am_core::config::ApiConfig;
use am_core::constants::{STAT_API_URL, STAT_TIMEOUT_SECS};
use am_core::error::AmResult;

use crate::client::ApiClient;
use crate::response::DataResponse;

/// Client for the Stat (reporting) API.
#[derive(Debug, Clone)]
pub struct StatApi {
    client: ApiClient,
}

impl StatApi {
    /// Create a stat client with the default base URL and timeout.
    pub fn new(app_id: i64, access_token: &str) -> AmResult<Self> {
        Self::with_base_url(
            STAT_API_URL,
            app_id,
            access_token,
            Duration::from_secs(STAT_TIMEOUT_SECS),
        )
    }

    /// Create a stat client from a configuration.
    pub fn from_config(config: &ApiConfig) -> AmResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(STAT_TIMEOUT_SECS));
        let client = ApiClient::new(STAT_API_URL, config.app_id, &config.access_token, timeout)?
            .with_custom_headers(&config.custom_headers)?;
        Ok(Self { client })
    }

    /// Create a stat client against a custom base URL.
    pub fn with_base_url(
        base_url: &str,
        app_id: i64,
        access_token: &str,
        timeout: Duration,
    ) -> AmResult<Self> {
        let client = ApiClient::new(base_url, app_id, access_token, timeout)?;
        Ok(Self { client })
    }

    /// Query a report.
    ///
    /// `params` goes to the API verbatim; see the AppMetrica reporting
    /// documentation for accepted ids, metrics, dimensions, and filters.
    /// Unlike the other clients, failures are not re-wrapped: callers get
    /// the plain request error.
    pub async fn export_stat<Q>(&self, params: &Q) -> AmResult<Vec<serde_json::Value>>
    where
        Q: Serialize + ?Sized,
    {
        let resp: DataResponse = self.client.get_json_with_query("data", params).await?;
        Ok(resp.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use am_core::error::AmError;
    use mockito::Matcher;

    fn test_api(base_url: &str) -> StatApi {
        StatApi::with_base_url(base_url, 123, "123", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_export_stat_passes_params_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/data")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("ids".into(), "123".into()),
                Matcher::UrlEncoded("metrics".into(), "ym:ge:users".into()),
                Matcher::UrlEncoded("date1".into(), "2020-01-01".into()),
            ]))
            .match_header("authorization", "OAuth 123")
            .with_status(200)
            .with_body(r#"{"data":[{"dimensions":[],"metrics":[42.0]}],"totals":[42.0]}"#)
            .create_async()
            .await;

        let api = test_api(&server.url());
        let rows = api
            .export_stat(&[
                ("ids", "123"),
                ("metrics", "ym:ge:users"),
                ("date1", "2020-01-01"),
            ])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["metrics"][0], 42.0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_errors_are_not_wrapped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let api = test_api(&server.url());
        let err = api.export_stat(&[("ids", "123")]).await.unwrap_err();
        match err {
            AmError::Request(msg) => assert!(msg.contains("503")),
            other => panic!("expected a plain request error, got: {other}"),
        }
    }
}
