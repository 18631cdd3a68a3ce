//! Logs API endpoints for bulk data export.
//!
//! Exports are prepared asynchronously on the server. The first request for
//! a snapshot usually answers `202 Accepted` while the data is being built,
//! and the same request succeeds once preparation finishes. The 202 is
//! surfaced as [`AmError::DataNotReady`] so callers can poll.

use std::time::Duration;

use chrono::NaiveDateTime;
use reqwest::{Response, StatusCode};
use serde::Serialize;

use am_core::config::ApiConfig;
use am_core::constants::{DEFAULT_TIMEOUT_SECS, EXPORT_API_URL, EXPORT_DATE_FORMAT};
use am_core::error::{AmError, AmResult};

use crate::client::ApiClient;
use crate::response::DataResponse;

/// Client for the Logs (export) API.
#[derive(Debug, Clone)]
pub struct ExportApi {
    client: ApiClient,
}

impl ExportApi {
    /// Create an export client with the default base URL and timeout.
    pub fn new(app_id: i64, access_token: &str) -> AmResult<Self> {
        Self::with_base_url(
            EXPORT_API_URL,
            app_id,
            access_token,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create an export client from a configuration.
    pub fn from_config(config: &ApiConfig) -> AmResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = ApiClient::new(EXPORT_API_URL, config.app_id, &config.access_token, timeout)?
            .with_custom_headers(&config.custom_headers)?;
        Ok(Self { client })
    }

    /// Create an export client against a custom base URL.
    pub fn with_base_url(
        base_url: &str,
        app_id: i64,
        access_token: &str,
        timeout: Duration,
    ) -> AmResult<Self> {
        let client = ApiClient::new(base_url, app_id, access_token, timeout)?;
        Ok(Self { client })
    }

    /// Export registered push tokens.
    ///
    /// `fields` selects the export columns, e.g.
    /// `["token", "type", "appmetrica_device_id"]`.
    pub async fn export_push_tokens(&self, fields: &[&str]) -> AmResult<Vec<serde_json::Value>> {
        let params = [
            ("application_id", self.client.app_id().to_string()),
            ("fields", fields.join(",")),
        ];
        self.fetch("push_tokens.json", &params)
            .await
            .map_err(|e| wrap_export_error(e, AmError::ExportPushTokens))
    }

    /// Export application installations.
    ///
    /// Optional bounds restrict the export window. They are interpreted by
    /// receive date and formatted as `YYYY-MM-DD HH:MM:SS`.
    pub async fn export_installations(
        &self,
        fields: &[&str],
        date_from: Option<NaiveDateTime>,
        date_till: Option<NaiveDateTime>,
    ) -> AmResult<Vec<serde_json::Value>> {
        let mut params = vec![
            ("application_id".to_string(), self.client.app_id().to_string()),
            ("fields".to_string(), fields.join(",")),
            ("date_dimension".to_string(), "receive".to_string()),
        ];
        if let Some(from) = date_from {
            params.push((
                "date_since".to_string(),
                from.format(EXPORT_DATE_FORMAT).to_string(),
            ));
        }
        if let Some(till) = date_till {
            params.push((
                "date_until".to_string(),
                till.format(EXPORT_DATE_FORMAT).to_string(),
            ));
        }

        self.fetch("installations.json", &params)
            .await
            .map_err(|e| wrap_export_error(e, AmError::ExportInstallations))
    }

    /// Fetch an export, surfacing the not-ready answer before decoding.
    async fn fetch<Q>(&self, endpoint: &str, query: &Q) -> AmResult<Vec<serde_json::Value>>
    where
        Q: Serialize + ?Sized,
    {
        let response = self.client.get_with_query(endpoint, query).await?;
        let response = ensure_ready(response)?;
        let parsed: DataResponse = ApiClient::parse_json(response).await?;
        Ok(parsed.data)
    }
}

/// Detect the "still preparing" answer.
///
/// The body of a 202 is irrelevant and often empty, so the check runs on the
/// raw response before any decoding.
fn ensure_ready(response: Response) -> AmResult<Response> {
    if response.status() == StatusCode::ACCEPTED {
        return Err(AmError::DataNotReady);
    }
    Ok(response)
}

/// Re-wrap export failures, letting the not-ready signal through untouched.
fn wrap_export_error(e: AmError, kind: fn(String) -> AmError) -> AmError {
    match e {
        AmError::DataNotReady => AmError::DataNotReady,
        other => kind(other.into_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mockito::Matcher;

    fn test_api(base_url: &str) -> ExportApi {
        ExportApi::with_base_url(base_url, 123, "123", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_export_push_tokens() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/push_tokens.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("application_id".into(), "123".into()),
                Matcher::UrlEncoded("fields".into(), "token,type".into()),
            ]))
            .match_header("authorization", "OAuth 123")
            .with_status(200)
            .with_body(r#"{"data":[{"token":"t1"},{"token":"t2"}]}"#)
            .create_async()
            .await;

        let api = test_api(&server.url());
        let rows = api.export_push_tokens(&["token", "type"]).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["token"], "t1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_202_means_not_ready() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/push_tokens.json")
            .match_query(Matcher::Any)
            .with_status(202)
            .create_async()
            .await;

        let api = test_api(&server.url());
        let err = api.export_push_tokens(&["token"]).await.unwrap_err();
        assert!(err.is_not_ready());
    }

    #[tokio::test]
    async fn test_202_wins_over_garbage_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/installations.json")
            .match_query(Matcher::Any)
            .with_status(202)
            .with_body("<html>queued</html>")
            .create_async()
            .await;

        let api = test_api(&server.url());
        let err = api
            .export_installations(&["ios_ifv"], None, None)
            .await
            .unwrap_err();
        assert!(err.is_not_ready());
    }

    #[tokio::test]
    async fn test_server_error_is_wrapped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/push_tokens.json")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let api = test_api(&server.url());
        let err = api.export_push_tokens(&["token"]).await.unwrap_err();
        match err {
            AmError::ExportPushTokens(msg) => assert!(msg.contains("500")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_data_key_is_wrapped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/push_tokens.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let api = test_api(&server.url());
        let err = api.export_push_tokens(&["token"]).await.unwrap_err();
        assert!(matches!(err, AmError::ExportPushTokens(_)));
    }

    #[tokio::test]
    async fn test_installations_date_params() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/installations.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("application_id".into(), "123".into()),
                Matcher::UrlEncoded("fields".into(), "ios_ifv".into()),
                Matcher::UrlEncoded("date_dimension".into(), "receive".into()),
                Matcher::UrlEncoded("date_since".into(), "2020-01-01 00:00:00".into()),
                Matcher::UrlEncoded("date_until".into(), "2020-01-02 23:59:59".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let date_from = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let date_till = NaiveDate::from_ymd_opt(2020, 1, 2)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();

        let api = test_api(&server.url());
        let rows = api
            .export_installations(&["ios_ifv"], Some(date_from), Some(date_till))
            .await
            .unwrap();
        assert!(rows.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_installations_omits_absent_dates() {
        let mut server = mockito::Server::new_async().await;
        // Parameters serialize in insertion order, so the full query is stable.
        let mock = server
            .mock("GET", "/installations.json")
            .match_query(Matcher::Exact(
                "application_id=123&fields=ios_ifv&date_dimension=receive".to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"data":[]}"#)
            .create_async()
            .await;

        let api = test_api(&server.url());
        api.export_installations(&["ios_ifv"], None, None)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_server_is_wrapped() {
        let api = test_api("http://127.0.0.1:1");
        let err = api
            .export_installations(&["ios_ifv"], None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AmError::ExportInstallations(_)));
    }
}
