//! `/notifications` endpoints. All of them authenticate with the app key.
//!
//! Creation can succeed at the HTTP level while still reporting problems:
//! OneSignal answers 200 with an `errors` field (a list such as
//! `["All included players are not subscribed"]`, or an object such as
//! `{"invalid_player_ids": [...]}`). That body is a normal
//! `NotificationCreateResponse`, not an `Error`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::client::{query, segment, AuthKeyType, Client, NO_BODY};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::types::{null_as_default, AppIdOptions, ListOptions, ListOrMap, SuccessResponse};

pub type NotificationListOptions = ListOptions;
pub type NotificationGetOptions = AppIdOptions;
pub type NotificationDeleteOptions = AppIdOptions;

/// A sent or scheduled notification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub successful: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub failed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub converted: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub remaining: u64,
    /// Unix seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub queued_at: i64,
    /// Unix seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub send_after: i64,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub data: Option<ListOrMap>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub canceled: bool,
    #[serde(default)]
    pub headings: Option<HashMap<String, String>>,
    #[serde(default)]
    pub contents: Option<HashMap<String, String>>,
}

/// Payload for `POST /notifications`. Unset fields are not sent.
///
/// `tags`, `filters` and `buttons` are lists of free-form JSON objects as
/// documented by OneSignal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub app_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headings: Option<HashMap<String, String>>,

    #[serde(rename = "isIos", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_ios: bool,
    #[serde(rename = "isAndroid", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_android: bool,
    #[serde(rename = "isWP", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_wp: bool,
    #[serde(rename = "isAdm", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_adm: bool,
    #[serde(rename = "isChrome", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_chrome: bool,
    #[serde(rename = "isChromeWeb", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_chrome_web: bool,
    #[serde(rename = "isSafari", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_safari: bool,
    #[serde(rename = "isAnyWeb", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_any_web: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_segments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded_segments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_player_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_external_user_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_ios_tokens: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_android_reg_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_wp_uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_wp_wns_uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_amazon_reg_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_chrome_reg_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include_chrome_web_reg_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub app_ids: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buttons: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ListOrMap>,

    #[serde(rename = "ios_badgeType", skip_serializing_if = "Option::is_none")]
    pub ios_badge_type: Option<String>,
    #[serde(rename = "ios_badgeCount", skip_serializing_if = "Option::is_none")]
    pub ios_badge_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ios_sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adm_sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wp_sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wp_wns_sound: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub small_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub big_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adm_small_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adm_large_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adm_big_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_big_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_web_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firefox_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delayed_option: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_time_of_day: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_led_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_accent_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_visibility: Option<i32>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub content_available: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub android_background_data: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub amazon_background_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_group_message: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adm_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adm_group_message: Option<HashMap<String, String>>,
}

/// Body of a 200 answer to `POST /notifications`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationCreateResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recipients: u64,
    #[serde(default)]
    pub errors: Option<ListOrMap>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub offset: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub limit: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub notifications: Vec<Notification>,
}

/// Payload for `PUT /notifications/{id}` (track an open).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationUpdateOptions {
    pub app_id: String,
    pub opened: bool,
}

/// Notification endpoints, borrowed from a `Client` via `Client::notifications`.
#[derive(Debug, Clone, Copy)]
pub struct Notifications<'a> {
    client: &'a Client,
}

impl<'a> Notifications<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// `GET /notifications?app_id=..&limit=..&offset=..`
    pub fn list(&self, opts: &NotificationListOptions) -> Result<NotificationListResponse> {
        let path = format!("notifications?{}", query(opts)?);
        self.client.call(HttpMethod::Get, &path, NO_BODY, AuthKeyType::App)
    }

    /// `GET /notifications/{id}?app_id=..`
    pub fn get(&self, notification_id: &str, opts: &NotificationGetOptions) -> Result<Notification> {
        let path = format!("notifications/{}?{}", segment(notification_id)?, query(opts)?);
        self.client.call(HttpMethod::Get, &path, NO_BODY, AuthKeyType::App)
    }

    /// `POST /notifications`
    pub fn create(&self, request: &NotificationRequest) -> Result<NotificationCreateResponse> {
        self.client
            .call(HttpMethod::Post, "notifications", Some(request), AuthKeyType::App)
    }

    /// `PUT /notifications/{id}`
    pub fn update(&self, notification_id: &str, opts: &NotificationUpdateOptions) -> Result<SuccessResponse> {
        self.client.call(
            HttpMethod::Put,
            &format!("notifications/{}", segment(notification_id)?),
            Some(opts),
            AuthKeyType::App,
        )
    }

    /// `DELETE /notifications/{id}?app_id=..` (cancel a scheduled notification)
    pub fn delete(&self, notification_id: &str, opts: &NotificationDeleteOptions) -> Result<SuccessResponse> {
        let path = format!("notifications/{}?{}", segment(notification_id)?, query(opts)?);
        self.client.call(HttpMethod::Delete, &path, NO_BODY, AuthKeyType::App)
    }
}
