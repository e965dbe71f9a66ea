//! `/apps` endpoints. All of them authenticate with the user key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{segment, AuthKeyType, Client, NO_BODY};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::types::null_as_default;

/// A OneSignal app as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub messagable_players: u64,
    pub updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub gcm_key: Option<String>,
    #[serde(default)]
    pub chrome_key: Option<String>,
    #[serde(default)]
    pub chrome_web_origin: Option<String>,
    #[serde(default)]
    pub chrome_web_gcm_sender_id: Option<String>,
    #[serde(default)]
    pub chrome_web_default_notification_icon: Option<String>,
    #[serde(default)]
    pub chrome_web_sub_domain: Option<String>,
    #[serde(default)]
    pub apns_env: Option<String>,
    #[serde(default)]
    pub apns_certificates: Option<String>,
    // OneSignal spells this field without the second "r".
    #[serde(default, rename = "safari_apns_cetificate")]
    pub safari_apns_certificate: Option<String>,
    #[serde(default)]
    pub safari_site_origin: Option<String>,
    #[serde(default)]
    pub safari_push_id: Option<String>,
    #[serde(default)]
    pub safari_icon_16_16: Option<String>,
    #[serde(default)]
    pub safari_icon_32_32: Option<String>,
    #[serde(default)]
    pub safari_icon_64_64: Option<String>,
    #[serde(default)]
    pub safari_icon_128_128: Option<String>,
    #[serde(default)]
    pub safari_icon_256_256: Option<String>,
    #[serde(default)]
    pub site_name: Option<String>,
    #[serde(default)]
    pub basic_auth_key: Option<String>,
}

/// Payload for creating or updating an app. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gcm_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_web_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_web_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_web_gcm_sender_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_web_default_notification_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_web_sub_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apns_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apns_p12: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apns_p12_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safari_apns_p12: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safari_apns_p12_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safari_site_origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safari_icon_16_16: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safari_icon_32_32: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safari_icon_64_64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safari_icon_128_128: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safari_icon_256_256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
}

/// App endpoints, borrowed from a `Client` via `Client::apps`.
#[derive(Debug, Clone, Copy)]
pub struct Apps<'a> {
    client: &'a Client,
}

impl<'a> Apps<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// `GET /apps`
    pub fn list(&self) -> Result<Vec<App>> {
        self.client.call(HttpMethod::Get, "apps", NO_BODY, AuthKeyType::User)
    }

    /// `GET /apps/{id}`
    pub fn get(&self, app_id: &str) -> Result<App> {
        self.client.call(
            HttpMethod::Get,
            &format!("apps/{}", segment(app_id)?),
            NO_BODY,
            AuthKeyType::User,
        )
    }

    /// `POST /apps`
    pub fn create(&self, request: &AppRequest) -> Result<App> {
        self.client
            .call(HttpMethod::Post, "apps", Some(request), AuthKeyType::User)
    }

    /// `PUT /apps/{id}`
    pub fn update(&self, app_id: &str, request: &AppRequest) -> Result<App> {
        self.client.call(
            HttpMethod::Put,
            &format!("apps/{}", segment(app_id)?),
            Some(request),
            AuthKeyType::User,
        )
    }
}
