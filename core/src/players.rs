//! `/players` endpoints. All of them authenticate with the app key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::client::{query, segment, AuthKeyType, Client, NO_BODY};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::types::{null_as_default, AppIdOptions, ListOptions, SuccessResponse};

pub type PlayerListOptions = ListOptions;
pub type PlayerCsvExportOptions = AppIdOptions;

/// A registered device.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timezone: i64,
    #[serde(default)]
    pub game_version: Option<String>,
    #[serde(default)]
    pub device_os: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub device_type: i32,
    #[serde(default)]
    pub device_model: Option<String>,
    #[serde(default)]
    pub ad_id: Option<String>,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
    /// Unix seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_active: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub playtime: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub amount_spent: f64,
    /// Unix seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub invalid_identifier: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub badge_count: i64,
    #[serde(default)]
    pub sdk: Option<String>,
}

/// Payload for creating or updating a player. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_spent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playtime: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_types: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_type: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub offset: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub limit: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCreateResponse {
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
}

/// Payload for `POST /players/{id}/on_session`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerOnSessionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdk: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub sku: String,
    pub amount: f64,
    pub iso: String,
}

/// Payload for `POST /players/{id}/on_purchase`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerOnPurchaseOptions {
    pub purchases: Vec<Purchase>,
    /// Set when the purchases predate the player's first session.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub existing: bool,
}

/// Payload for `POST /players/{id}/on_focus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerOnFocusOptions {
    /// Always `"ping"` for OneSignal.
    pub state: String,
    /// Seconds the app was in focus.
    pub active_time: u64,
}

impl PlayerOnFocusOptions {
    pub fn ping(active_time: u64) -> Self {
        Self {
            state: "ping".to_string(),
            active_time,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCsvExportResponse {
    pub csv_file_url: String,
}

/// Player endpoints, borrowed from a `Client` via `Client::players`.
#[derive(Debug, Clone, Copy)]
pub struct Players<'a> {
    client: &'a Client,
}

impl<'a> Players<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// `GET /players?app_id=..&limit=..&offset=..`
    pub fn list(&self, opts: &PlayerListOptions) -> Result<PlayerListResponse> {
        let path = format!("players?{}", query(opts)?);
        self.client.call(HttpMethod::Get, &path, NO_BODY, AuthKeyType::App)
    }

    /// `GET /players/{id}`
    ///
    /// The returned `id` is always `player_id`, whatever the body says.
    pub fn get(&self, player_id: &str) -> Result<Player> {
        let mut player: Player = self.client.call(
            HttpMethod::Get,
            &format!("players/{}", segment(player_id)?),
            NO_BODY,
            AuthKeyType::App,
        )?;
        player.id = player_id.to_string();
        Ok(player)
    }

    /// `POST /players`
    pub fn create(&self, request: &PlayerRequest) -> Result<PlayerCreateResponse> {
        self.client
            .call(HttpMethod::Post, "players", Some(request), AuthKeyType::App)
    }

    /// `PUT /players/{id}`
    pub fn update(&self, player_id: &str, request: &PlayerRequest) -> Result<SuccessResponse> {
        self.client.call(
            HttpMethod::Put,
            &format!("players/{}", segment(player_id)?),
            Some(request),
            AuthKeyType::App,
        )
    }

    /// `POST /players/{id}/on_session`
    pub fn on_session(&self, player_id: &str, opts: &PlayerOnSessionOptions) -> Result<SuccessResponse> {
        self.client.call(
            HttpMethod::Post,
            &format!("players/{}/on_session", segment(player_id)?),
            Some(opts),
            AuthKeyType::App,
        )
    }

    /// `POST /players/{id}/on_purchase`
    pub fn on_purchase(&self, player_id: &str, opts: &PlayerOnPurchaseOptions) -> Result<SuccessResponse> {
        self.client.call(
            HttpMethod::Post,
            &format!("players/{}/on_purchase", segment(player_id)?),
            Some(opts),
            AuthKeyType::App,
        )
    }

    /// `POST /players/{id}/on_focus`
    pub fn on_focus(&self, player_id: &str, opts: &PlayerOnFocusOptions) -> Result<SuccessResponse> {
        self.client.call(
            HttpMethod::Post,
            &format!("players/{}/on_focus", segment(player_id)?),
            Some(opts),
            AuthKeyType::App,
        )
    }

    /// `POST /players/csv_export?app_id=..`
    pub fn csv_export(&self, opts: &PlayerCsvExportOptions) -> Result<PlayerCsvExportResponse> {
        let path = format!("players/csv_export?{}", query(opts)?);
        self.client
            .call(HttpMethod::Post, &path, Some(opts), AuthKeyType::App)
    }
}
