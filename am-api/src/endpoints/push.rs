//! Push API endpoints: device groups and batched message delivery.
//!
//! Sending is a two-step protocol: POST a batch to `send-batch`, then poll
//! `status/{transfer_id}` until the transfer reaches a terminal state. Only
//! the batch wire shape (`push_batch_request`) is implemented here; the older
//! single-message `push_request` shape is deprecated upstream and
//! intentionally absent.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use am_core::config::ApiConfig;
use am_core::constants::{
    DEFAULT_TIMEOUT_SECS, MAX_DEVICES_PER_BATCH, MAX_DEVICE_GROUPS, PUSH_API_URL,
};
use am_core::error::{AmError, AmResult};

use crate::client::ApiClient;
use crate::response::{
    Group, GroupResponse, GroupsResponse, SendBatchResponse, StatusResponse, TransferStatus,
};

/// Device identifier schemes accepted by the Push API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    /// AppMetrica's own device identifier.
    AppmetricaDeviceId,
    /// iOS advertising identifier (IDFA).
    IosIfa,
    /// Google advertising identifier (GAID).
    GoogleAid,
    /// Raw FCM registration token.
    AndroidPushToken,
    /// Raw APNs device token.
    IosPushToken,
}

impl IdType {
    /// Wire name of the identifier scheme.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdType::AppmetricaDeviceId => "appmetrica_device_id",
            IdType::IosIfa => "ios_ifa",
            IdType::GoogleAid => "google_aid",
            IdType::AndroidPushToken => "android_push_token",
            IdType::IosPushToken => "ios_push_token",
        }
    }
}

/// A group of devices addressed by one identifier scheme.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceSelector {
    /// Identifier scheme for every value in `id_values`.
    pub id_type: IdType,
    /// Device identifiers of that scheme.
    pub id_values: Vec<String>,
}

impl DeviceSelector {
    /// Create a selector from an identifier scheme and values.
    pub fn new(id_type: IdType, id_values: Vec<String>) -> Self {
        Self { id_type, id_values }
    }
}

/// Content of a platform message.
#[derive(Debug, Clone, Serialize)]
pub struct MessageContent {
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub text: String,
    /// Notification sound, or "disable" for none.
    pub sound: String,
    /// Caller payload, pre-serialized to a JSON string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// One platform's rendering of a push message.
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    /// Whether the message is delivered silently, without an alert.
    pub silent: bool,
    pub content: MessageContent,
}

/// Per-platform messages of a sub-batch. At least one platform must be set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlatformMessages {
    /// Message for iOS devices. The wire key is spelled "iOS".
    #[serde(rename = "iOS", skip_serializing_if = "Option::is_none")]
    pub ios: Option<PushMessage>,
    /// Message for Android devices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android: Option<PushMessage>,
}

/// One element of a batch: messages plus the devices that receive them.
#[derive(Debug, Clone, Serialize)]
pub struct PushSubBatch {
    pub messages: PlatformMessages,
    pub devices: Vec<DeviceSelector>,
}

/// A full batched send request, wrapped as `push_batch_request` on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct PushBatchRequest {
    /// Target group created via [`PushApi::create_group`].
    pub group_id: i64,
    /// Label grouping this send in reports.
    pub tag: String,
    pub batch: Vec<PushSubBatch>,
}

/// Parameters for [`PushApi::build_message`].
#[derive(Debug, Clone)]
pub struct MessageParams {
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub text: String,
    /// Arbitrary payload handed to the application, embedded in the message
    /// as a JSON string.
    pub data: Option<serde_json::Value>,
    /// Deliver silently, without showing an alert.
    pub silent: bool,
    /// Notification sound. Defaults to "disable".
    pub sound: Option<String>,
}

impl MessageParams {
    /// Message with a title and text; everything else at defaults.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            data: None,
            silent: false,
            sound: None,
        }
    }
}

/// Parameters for [`PushApi::send_push`].
#[derive(Debug, Clone)]
pub struct SendPushParams {
    /// Target group id.
    pub group_id: i64,
    /// Devices to address. Must not be empty.
    pub devices: Vec<DeviceSelector>,
    /// Message for iOS devices.
    pub ios_message: Option<PushMessage>,
    /// Message for Android devices.
    pub android_message: Option<PushMessage>,
    /// Report label. Defaults to the current timestamp.
    pub tag: Option<String>,
}

impl SendPushParams {
    /// Parameters addressing `devices` through `group_id`; messages unset.
    pub fn new(group_id: i64, devices: Vec<DeviceSelector>) -> Self {
        Self {
            group_id,
            devices,
            ios_message: None,
            android_message: None,
            tag: None,
        }
    }
}

/// Client for the Push API.
#[derive(Debug, Clone)]
pub struct PushApi {
    client: ApiClient,
}

impl PushApi {
    /// Create a push client with the default base URL and timeout.
    pub fn new(app_id: i64, access_token: &str) -> AmResult<Self> {
        Self::with_base_url(
            PUSH_API_URL,
            app_id,
            access_token,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a push client from a configuration.
    pub fn from_config(config: &ApiConfig) -> AmResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = ApiClient::new(PUSH_API_URL, config.app_id, &config.access_token, timeout)?
            .with_custom_headers(&config.custom_headers)?;
        Ok(Self { client })
    }

    /// Create a push client against a custom base URL.
    pub fn with_base_url(
        base_url: &str,
        app_id: i64,
        access_token: &str,
        timeout: Duration,
    ) -> AmResult<Self> {
        let client = ApiClient::new(base_url, app_id, access_token, timeout)?;
        Ok(Self { client })
    }

    /// Create a device group to send through. Returns the group id.
    ///
    /// Group names must be unique per application.
    pub async fn create_group(&self, name: &str) -> AmResult<i64> {
        if name.is_empty() {
            warn!("create_group rejected: group name is empty");
            return Err(AmError::CreateGroup("group name is empty".into()));
        }

        let body = serde_json::json!({
            "group": {
                "app_id": self.client.app_id(),
                "name": name,
            }
        });
        let resp: GroupResponse = self
            .client
            .post_json("management/groups", &body)
            .await
            .map_err(|e| AmError::CreateGroup(e.into_message()))?;
        Ok(resp.group.id)
    }

    /// List the application's device groups.
    pub async fn get_groups(&self) -> AmResult<Vec<Group>> {
        let params = [("app_id", self.client.app_id().to_string())];
        let resp: GroupsResponse = self
            .client
            .get_json_with_query("management/groups", &params)
            .await
            .map_err(|e| AmError::GetGroups(e.into_message()))?;
        Ok(resp.groups)
    }

    /// Build a platform message from parameters.
    ///
    /// The same shape serves both platforms; where the message lands is
    /// decided by its slot in [`PlatformMessages`]. The `data` payload is
    /// embedded as a JSON string, which is how the API expects it.
    pub fn build_message(params: MessageParams) -> PushMessage {
        PushMessage {
            silent: params.silent,
            content: MessageContent {
                title: params.title,
                text: params.text,
                sound: params.sound.unwrap_or_else(|| "disable".to_string()),
                data: params.data.map(|v| v.to_string()),
            },
        }
    }

    /// Build and send a single-sub-batch push. Returns the transfer id.
    ///
    /// Requires at least one device selector and at least one platform
    /// message; both are checked before anything goes on the wire. The tag
    /// defaults to the current timestamp.
    pub async fn send_push(&self, params: SendPushParams) -> AmResult<i64> {
        if params.devices.is_empty() {
            warn!("send_push rejected: devices are not provided");
            return Err(AmError::SendPush("devices are not provided".into()));
        }
        if params.ios_message.is_none() && params.android_message.is_none() {
            warn!("send_push rejected: messages are not provided");
            return Err(AmError::SendPush("messages are not provided".into()));
        }

        let tag = params.tag.unwrap_or_else(|| Utc::now().to_rfc3339());
        let request = PushBatchRequest {
            group_id: params.group_id,
            tag,
            batch: vec![PushSubBatch {
                messages: PlatformMessages {
                    ios: params.ios_message,
                    android: params.android_message,
                },
                devices: params.devices,
            }],
        };

        self.send(&request).await
    }

    /// Send a prepared batch request. Returns the transfer id to poll with
    /// [`check_status`].
    ///
    /// [`check_status`]: PushApi::check_status
    pub async fn send(&self, request: &PushBatchRequest) -> AmResult<i64> {
        validate_batch(request)?;

        let request = serde_json::to_value(request)
            .map_err(|e| AmError::SendPush(e.to_string()))?;
        let body = serde_json::json!({ "push_batch_request": request });

        let resp: SendBatchResponse = self
            .client
            .post_json("send-batch", &body)
            .await
            .map_err(|e| AmError::SendPush(e.into_message()))?;
        Ok(resp.push_response.transfer_id)
    }

    /// Poll the status of a transfer.
    ///
    /// A transfer that reports `failed` is raised as an error carrying the
    /// first server-reported reason, even when the server omits details.
    pub async fn check_status(&self, transfer_id: i64) -> AmResult<TransferStatus> {
        let resp: StatusResponse = self
            .client
            .get_json(&format!("status/{transfer_id}"))
            .await
            .map_err(|e| AmError::CheckStatus(e.into_message()))?;

        let transfer = resp.transfer;
        debug!("transfer {} is {}", transfer_id, transfer.status);

        if transfer.status == TransferStatus::Failed {
            let reason = transfer
                .errors
                .first()
                .cloned()
                .unwrap_or_else(|| "transfer failed without error details".to_string());
            return Err(AmError::CheckStatus(reason));
        }

        Ok(transfer.status)
    }
}

/// Validate batch shape and size limits before transmission.
fn validate_batch(request: &PushBatchRequest) -> AmResult<()> {
    if request.batch.is_empty() {
        warn!("push batch rejected: batch is empty");
        return Err(AmError::SendPush("batch is empty".into()));
    }

    let mut total_devices = 0usize;
    for sub_batch in &request.batch {
        if sub_batch.devices.len() > MAX_DEVICE_GROUPS {
            warn!(
                "push batch rejected: {} device groups in one sub-batch",
                sub_batch.devices.len()
            );
            return Err(AmError::SendPush(format!(
                "number of device groups in a sub-batch is more than {MAX_DEVICE_GROUPS}"
            )));
        }
        total_devices += sub_batch
            .devices
            .iter()
            .map(|selector| selector.id_values.len())
            .sum::<usize>();
    }

    if total_devices > MAX_DEVICES_PER_BATCH {
        warn!("push batch rejected: {} devices", total_devices);
        return Err(AmError::SendPush(format!(
            "number of devices in the batch is more than {MAX_DEVICES_PER_BATCH}"
        )));
    }

    Ok(())
}
