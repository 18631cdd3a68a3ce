//! AppMetrica API - HTTP clients for the AppMetrica REST APIs.
//!
//! This crate provides typed clients for three AppMetrica API families:
//!
//! - Logs API: bulk export of push tokens and installations
//! - Push API: device groups and grouped push-message delivery
//! - Stat API: aggregated report queries
//!
//! All clients share one transport that handles OAuth authentication and
//! timeouts. Requests are single-shot: nothing is retried or queued
//! internally.
//!
//! # Quick start
//!
//! ```no_run
//! use am_api::endpoints::push::{
//!     DeviceSelector, IdType, MessageParams, PushApi, SendPushParams,
//! };
//!
//! # async fn run() -> am_core::error::AmResult<()> {
//! let api = PushApi::new(123, "oauth-token")?;
//!
//! let group_id = api.create_group("spring-campaign").await?;
//!
//! let mut params = SendPushParams::new(
//!     group_id,
//!     vec![DeviceSelector::new(
//!         IdType::AppmetricaDeviceId,
//!         vec!["123456789".to_string()],
//!     )],
//! );
//! params.ios_message = Some(PushApi::build_message(MessageParams::new("Hi", "Hello!")));
//!
//! let transfer_id = api.send_push(params).await?;
//! let status = api.check_status(transfer_id).await?;
//! println!("transfer {transfer_id} is {status}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod endpoints;
pub mod response;

// Re-export key types
pub use client::ApiClient;
pub use endpoints::export::ExportApi;
pub use endpoints::push::PushApi;
pub use endpoints::stat::StatApi;
pub use response::{Group, Transfer, TransferStatus};
