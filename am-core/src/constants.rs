//! Protocol constants shared by the AppMetrica clients.

/// Base URL for the Logs (export) API.
pub const EXPORT_API_URL: &str = "https://api.appmetrica.yandex.ru/logs/v1/export";

/// Base URL for the Push API.
pub const PUSH_API_URL: &str = "https://push.api.appmetrica.yandex.net/push/v1";

/// Base URL for the Stat (reporting) API.
pub const STAT_API_URL: &str = "https://api.appmetrica.yandex.ru/stat/v1";

/// Default request timeout in seconds for export and push calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Request timeout in seconds for stat report queries.
pub const STAT_TIMEOUT_SECS: u64 = 5;

/// Maximum number of device identifiers across one push batch.
pub const MAX_DEVICES_PER_BATCH: usize = 250_000;

/// Maximum number of device selector groups in one sub-batch.
pub const MAX_DEVICE_GROUPS: usize = 5;

/// Timestamp format for export date bounds.
pub const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_urls_have_no_trailing_slash() {
        for url in [EXPORT_API_URL, PUSH_API_URL, STAT_API_URL] {
            assert!(url.starts_with("https://"));
            assert!(!url.ends_with('/'));
        }
    }

    #[test]
    fn test_batch_limits() {
        assert!(MAX_DEVICE_GROUPS < MAX_DEVICES_PER_BATCH);
    }
}
