//! Blocking client for the OneSignal push notification REST API.
//!
//! # Overview
//! Covers the three OneSignal resources: apps, players (devices) and
//! notifications. Each call is one synchronous request/response round trip:
//! the client builds an `HttpRequest`, a `Transport` executes it, and the
//! `HttpResponse` is decoded into a typed result or an `Error`.
//!
//! ```no_run
//! use onesignal::{Client, NotificationRequest};
//!
//! # fn main() -> onesignal::Result<()> {
//! let mut client = Client::new();
//! client.set_app_key("YourOneSignalAppKey");
//!
//! let request = NotificationRequest {
//!     app_id: "YourAppID".to_string(),
//!     contents: Some([("en".to_string(), "English message".to_string())].into()),
//!     include_player_ids: vec!["aPlayerID".to_string()],
//!     ..NotificationRequest::default()
//! };
//! let created = client.notifications().create(&request)?;
//! println!("sent to {} recipients", created.recipients);
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - `Client` owns the base URL, the app key, the user key and the transport.
//!   Resource services (`apps()`, `players()`, `notifications()`) are
//!   borrowed views with no state of their own.
//! - `/apps` calls authenticate with the user key; player and notification
//!   calls with the app key. `AuthKeyType` selects between them.
//! - The status code alone decides whether a body is a result or an error.
//! - No retries, no caching. The transport's timeout is the only timeout.

pub mod apps;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod notifications;
pub mod players;
pub mod types;

pub use apps::{App, AppRequest, Apps};
pub use client::{check_response, parse_response, AuthKeyType, Client};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{Error, ErrorResponse, Result};
#[cfg(feature = "ureq")]
pub use http::UreqTransport;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError};
pub use notifications::{
    Notification, NotificationCreateResponse, NotificationDeleteOptions, NotificationGetOptions,
    NotificationListOptions, NotificationListResponse, NotificationRequest,
    NotificationUpdateOptions, Notifications,
};
pub use players::{
    Player, PlayerCreateResponse, PlayerCsvExportOptions, PlayerCsvExportResponse,
    PlayerListOptions, PlayerListResponse, PlayerOnFocusOptions, PlayerOnPurchaseOptions,
    PlayerOnSessionOptions, PlayerRequest, Players, Purchase,
};
pub use types::{AppIdOptions, ListOptions, ListOrMap, SuccessResponse};
