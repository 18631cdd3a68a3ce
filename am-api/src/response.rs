//! Wire response types for the AppMetrica APIs.
//!
//! Each API family wraps its payload in a small JSON envelope. The types
//! here mirror those envelopes; the endpoint modules unwrap them and hand
//! only the payload to the caller.

use serde::{Deserialize, Serialize};

/// Row-oriented envelope shared by the Logs and Stat APIs:
/// `{ "data": [ ... ] }`, one JSON object per row. Extra envelope fields
/// (query echo, totals) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse {
    /// Exported or queried rows.
    pub data: Vec<serde_json::Value>,
}

/// Envelope for a single push group: `{ "group": { ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupResponse {
    pub group: Group,
}

/// Envelope for the group listing: `{ "groups": [ ... ] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupsResponse {
    pub groups: Vec<Group>,
}

/// A named device group owned by an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Server-assigned group id.
    pub id: i64,
    /// Owning application id.
    pub app_id: i64,
    /// Group name, unique per application.
    pub name: String,
}

/// Envelope for send-batch: `{ "push_response": { "transfer_id": ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendBatchResponse {
    pub push_response: PushResponse,
}

/// Payload of a successful send-batch call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushResponse {
    /// Id of the queued transfer, to be polled via the status endpoint.
    pub transfer_id: i64,
}

/// Envelope for transfer status: `{ "transfer": { ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub transfer: Transfer,
}

/// A queued, running, or finished push transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    /// Transfer id returned by send-batch.
    pub id: i64,
    /// Current lifecycle state.
    pub status: TransferStatus,
    /// Failure reasons. Non-empty only when the transfer failed.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Tag the batch was sent with.
    #[serde(default)]
    pub tag: Option<String>,
    /// Group the batch was sent through.
    #[serde(default)]
    pub group_id: Option<i64>,
    /// When the transfer was created, as reported by the server.
    #[serde(default)]
    pub creation_date: Option<String>,
}

/// Server-side lifecycle state of a push transfer.
///
/// Transfers move `pending` to `in_progress` to either `sent` or `failed`;
/// there is no cancellation. Statuses this client does not know about
/// deserialize as [`TransferStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    /// Accepted and waiting to be processed.
    Pending,
    /// Currently being delivered.
    InProgress,
    /// Delivered. Terminal.
    Sent,
    /// Delivery failed. Terminal.
    Failed,
    /// A status introduced after this client was written.
    #[serde(other)]
    Unknown,
}

impl TransferStatus {
    /// Wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::InProgress => "in_progress",
            TransferStatus::Sent => "sent",
            TransferStatus::Failed => "failed",
            TransferStatus::Unknown => "unknown",
        }
    }

    /// Whether the transfer has finished processing.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Sent | TransferStatus::Failed)
    }
}

impl std::fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
