//! In-memory stand-in for the OneSignal REST API.
//!
//! Serves the `/api/v1` routes the client talks to, with the same
//! authentication split (user key for `/apps`, app key for everything else)
//! and the same error envelope, `{"errors": [...]}`. Records are kept as raw
//! JSON objects so request fields the mock does not interpret still round
//! trip.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub type Record = Map<String, Value>;

pub const INVALID_AUTH: &str = "Invalid or missing authentication token";
pub const MISSING_CONTENTS: &str = "Notification content must not be null for any languages.";
pub const NOT_SUBSCRIBED: &str = "All included players are not subscribed";
pub const NO_TARGET: &str =
    "You must include which players, segments, or tags you wish to send this notification to.";

/// Credentials the mock accepts.
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub app_key: String,
    pub user_key: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            app_key: "mock-app-key".to_string(),
            user_key: "mock-user-key".to_string(),
        }
    }
}

impl MockConfig {
    /// Reads `ONESIGNAL_APP_KEY` and `ONESIGNAL_USER_KEY`, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            app_key: std::env::var("ONESIGNAL_APP_KEY").unwrap_or(defaults.app_key),
            user_key: std::env::var("ONESIGNAL_USER_KEY").unwrap_or(defaults.user_key),
        }
    }
}

#[derive(Debug, Default)]
pub struct Store {
    pub apps: Vec<Record>,
    pub players: Vec<Record>,
    pub notifications: Vec<Record>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    config: Arc<MockConfig>,
    db: Db,
}

#[derive(Debug, Clone, Copy)]
enum Key {
    App,
    User,
}

impl AppState {
    fn authorize(&self, headers: &HeaderMap, key: Key) -> Result<(), ApiError> {
        let expected = match key {
            Key::App => &self.config.app_key,
            Key::User => &self.config.user_key,
        };
        let provided = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        if provided == Some(format!("Basic {expected}").as_str()) {
            Ok(())
        } else {
            debug!(?key, "rejected credentials");
            Err(ApiError::bad_request(INVALID_AUTH))
        }
    }
}

/// Error answer in OneSignal's envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    messages: Vec<String>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            messages: vec![message.into()],
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "errors": self.messages }))).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub app_id: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Deserialize)]
pub struct AppIdQuery {
    pub app_id: String,
}

#[derive(Debug, Deserialize)]
struct PurchaseItem {
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct PurchaseInput {
    purchases: Vec<PurchaseItem>,
}

#[derive(Debug, Deserialize)]
struct FocusInput {
    state: String,
    active_time: i64,
}

#[derive(Debug, Deserialize)]
struct OpenedInput {
    app_id: String,
    opened: bool,
}

pub fn app(config: MockConfig) -> Router {
    let state = AppState {
        config: Arc::new(config),
        db: Arc::new(RwLock::new(Store::default())),
    };
    let api = Router::new()
        .route("/apps", get(list_apps).post(create_app))
        .route("/apps/{id}", get(get_app).put(update_app))
        .route("/players", get(list_players).post(create_player))
        .route("/players/csv_export", post(csv_export))
        .route("/players/{id}", get(get_player).put(update_player))
        .route("/players/{id}/on_session", post(on_session))
        .route("/players/{id}/on_purchase", post(on_purchase))
        .route("/players/{id}/on_focus", post(on_focus))
        .route("/notifications", get(list_notifications).post(create_notification))
        .route(
            "/notifications/{id}",
            get(get_notification)
                .put(update_notification)
                .delete(delete_notification),
        )
        .with_state(state);
    Router::new().nest("/api/v1", api)
}

pub async fn run(listener: TcpListener, config: MockConfig) -> Result<(), std::io::Error> {
    axum::serve(listener, app(config)).await
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn now_unix() -> i64 {
    Utc::now().timestamp()
}

fn str_field<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

fn find<'a>(records: &'a [Record], id: &str) -> Option<&'a Record> {
    records.iter().find(|r| str_field(r, "id") == Some(id))
}

fn find_mut<'a>(records: &'a mut [Record], id: &str) -> Option<&'a mut Record> {
    records.iter_mut().find(|r| str_field(r, "id") == Some(id))
}

/// Copies `patch` over `record`. The `id` is never overwritten.
fn merge(record: &mut Record, patch: Record) {
    for (key, value) in patch {
        if key != "id" {
            record.insert(key, value);
        }
    }
}

fn bump(record: &mut Record, key: &str, delta: i64) {
    let current = record.get(key).and_then(Value::as_i64).unwrap_or(0);
    record.insert(key.to_string(), json!(current + delta));
}

fn page<'a>(records: impl Iterator<Item = &'a Record>, query: &ListQuery, field: &str) -> Value {
    let matching: Vec<&Record> = records
        .filter(|r| str_field(r, "app_id") == Some(query.app_id.as_str()))
        .collect();
    let items: Vec<Value> = matching
        .iter()
        .skip(query.offset)
        .take(query.limit)
        .map(|r| Value::Object((*r).clone()))
        .collect();

    let mut body = Map::new();
    body.insert("total_count".to_string(), json!(matching.len()));
    body.insert("offset".to_string(), json!(query.offset));
    body.insert("limit".to_string(), json!(query.limit));
    body.insert(field.to_string(), Value::Array(items));
    Value::Object(body)
}

fn success() -> Json<Value> {
    Json(json!({ "success": true }))
}

// --- apps ---

async fn list_apps(State(state): State<AppState>, headers: HeaderMap) -> ApiResult {
    state.authorize(&headers, Key::User)?;
    let db = state.db.read().await;
    Ok(Json(Value::Array(
        db.apps.iter().cloned().map(Value::Object).collect(),
    )))
}

async fn create_app(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<Record>,
) -> ApiResult {
    state.authorize(&headers, Key::User)?;
    if str_field(&input, "name").is_none() {
        return Err(ApiError::bad_request("Name can't be blank"));
    }
    let now = now_rfc3339();
    let mut app = Record::new();
    app.insert("id".to_string(), json!(new_id()));
    app.insert("players".to_string(), json!(0));
    app.insert("messagable_players".to_string(), json!(0));
    app.insert("created_at".to_string(), json!(now));
    app.insert("updated_at".to_string(), json!(now));
    merge(&mut app, input);

    info!(id = ?app.get("id"), "created app");
    state.db.write().await.apps.push(app.clone());
    Ok(Json(Value::Object(app)))
}

async fn get_app(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    state.authorize(&headers, Key::User)?;
    let db = state.db.read().await;
    find(&db.apps, &id)
        .cloned()
        .map(|app| Json(Value::Object(app)))
        .ok_or_else(|| ApiError::not_found(format!("Couldn't find app with id = {id}")))
}

async fn update_app(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<Record>,
) -> ApiResult {
    state.authorize(&headers, Key::User)?;
    let mut db = state.db.write().await;
    let app = find_mut(&mut db.apps, &id)
        .ok_or_else(|| ApiError::not_found(format!("Couldn't find app with id = {id}")))?;
    merge(app, input);
    app.insert("updated_at".to_string(), json!(now_rfc3339()));
    Ok(Json(Value::Object(app.clone())))
}

// --- players ---

async fn list_players(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult {
    state.authorize(&headers, Key::App)?;
    let db = state.db.read().await;
    Ok(Json(page(db.players.iter(), &query, "players")))
}

async fn create_player(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<Record>,
) -> ApiResult {
    state.authorize(&headers, Key::App)?;
    if str_field(&input, "app_id").is_none() {
        return Err(ApiError::bad_request("app_id not found"));
    }
    if !input.get("device_type").is_some_and(Value::is_i64) {
        return Err(ApiError::bad_request("Device type can't be blank"));
    }
    let id = new_id();
    let now = now_unix();
    let mut player = Record::new();
    player.insert("id".to_string(), json!(id));
    player.insert("session_count".to_string(), json!(1));
    player.insert("playtime".to_string(), json!(0));
    player.insert("amount_spent".to_string(), json!(0.0));
    player.insert("badge_count".to_string(), json!(0));
    player.insert("invalid_identifier".to_string(), json!(false));
    player.insert("created_at".to_string(), json!(now));
    player.insert("last_active".to_string(), json!(now));
    merge(&mut player, input);

    info!(%id, "created player");
    state.db.write().await.players.push(player);
    Ok(Json(json!({ "success": true, "id": id })))
}

async fn get_player(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult {
    state.authorize(&headers, Key::App)?;
    let db = state.db.read().await;
    find(&db.players, &id)
        .cloned()
        .map(|player| Json(Value::Object(player)))
        .ok_or_else(|| ApiError::not_found("No user with this id found"))
}

async fn update_player(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<Record>,
) -> ApiResult {
    state.authorize(&headers, Key::App)?;
    let mut db = state.db.write().await;
    let player = find_mut(&mut db.players, &id)
        .ok_or_else(|| ApiError::not_found("No user with this id found"))?;
    merge(player, input);
    Ok(success())
}

async fn on_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<Record>,
) -> ApiResult {
    state.authorize(&headers, Key::App)?;
    let mut db = state.db.write().await;
    let player = find_mut(&mut db.players, &id)
        .ok_or_else(|| ApiError::not_found("No user with this id found"))?;
    merge(player, input);
    bump(player, "session_count", 1);
    player.insert("last_active".to_string(), json!(now_unix()));
    debug!(%id, "new session");
    Ok(success())
}

async fn on_purchase(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<PurchaseInput>,
) -> ApiResult {
    state.authorize(&headers, Key::App)?;
    let mut db = state.db.write().await;
    let player = find_mut(&mut db.players, &id)
        .ok_or_else(|| ApiError::not_found("No user with this id found"))?;
    let spent = player.get("amount_spent").and_then(Value::as_f64).unwrap_or(0.0);
    let total: f64 = input.purchases.iter().map(|p| p.amount).sum();
    player.insert("amount_spent".to_string(), json!(spent + total));
    Ok(success())
}

async fn on_focus(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<FocusInput>,
) -> ApiResult {
    state.authorize(&headers, Key::App)?;
    if input.state != "ping" {
        return Err(ApiError::bad_request("State must be ping"));
    }
    let mut db = state.db.write().await;
    let player = find_mut(&mut db.players, &id)
        .ok_or_else(|| ApiError::not_found("No user with this id found"))?;
    bump(player, "playtime", input.active_time);
    Ok(success())
}

async fn csv_export(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AppIdQuery>,
) -> ApiResult {
    state.authorize(&headers, Key::App)?;
    let url = format!(
        "https://onesignal.com/csv_exports/{}/users_{}.csv.gz",
        query.app_id,
        Uuid::new_v4().simple()
    );
    Ok(Json(json!({ "csv_file_url": url })))
}

// --- notifications ---

async fn list_notifications(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult {
    state.authorize(&headers, Key::App)?;
    let db = state.db.read().await;
    Ok(Json(page(db.notifications.iter(), &query, "notifications")))
}

async fn create_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<Record>,
) -> ApiResult {
    state.authorize(&headers, Key::App)?;
    let Some(app_id) = str_field(&input, "app_id").map(str::to_string) else {
        return Err(ApiError::bad_request("app_id not found"));
    };
    let has_contents = input
        .get("contents")
        .and_then(Value::as_object)
        .is_some_and(|c| !c.is_empty());
    if !has_contents && str_field(&input, "template_id").is_none() {
        return Err(ApiError::bad_request(MISSING_CONTENTS));
    }

    let mut db = state.db.write().await;
    let mut invalid: Vec<String> = Vec::new();
    let recipients = if let Some(ids) = input.get("include_player_ids").and_then(Value::as_array) {
        let mut known = 0usize;
        for id in ids.iter().filter_map(Value::as_str) {
            if find(&db.players, id).is_some() {
                known += 1;
            } else {
                invalid.push(id.to_string());
            }
        }
        known
    } else if input.get("included_segments").is_some() {
        db.players
            .iter()
            .filter(|p| str_field(p, "app_id") == Some(app_id.as_str()))
            .count()
    } else {
        return Err(ApiError::bad_request(NO_TARGET));
    };

    if recipients == 0 {
        let errors = if invalid.is_empty() {
            json!([NOT_SUBSCRIBED])
        } else {
            json!({ "invalid_player_ids": invalid })
        };
        debug!(%app_id, "notification has no recipients");
        return Ok(Json(json!({ "id": "", "recipients": 0, "errors": errors })));
    }

    let id = new_id();
    let now = now_unix();
    let mut notification = Record::new();
    notification.insert("id".to_string(), json!(id));
    notification.insert("app_id".to_string(), json!(app_id));
    notification.insert("successful".to_string(), json!(recipients));
    notification.insert("failed".to_string(), json!(0));
    notification.insert("converted".to_string(), json!(0));
    notification.insert("remaining".to_string(), json!(0));
    notification.insert("queued_at".to_string(), json!(now));
    notification.insert("send_after".to_string(), json!(now));
    notification.insert("canceled".to_string(), json!(false));
    for key in ["contents", "headings", "data", "url"] {
        if let Some(value) = input.get(key) {
            notification.insert(key.to_string(), value.clone());
        }
    }
    db.notifications.push(notification);
    info!(%id, recipients, "created notification");

    let mut body = json!({ "id": id, "recipients": recipients });
    if !invalid.is_empty() {
        body["errors"] = json!({ "invalid_player_ids": invalid });
    }
    Ok(Json(body))
}

fn find_notification_mut<'a>(
    notifications: &'a mut [Record],
    id: &str,
    app_id: &str,
) -> Result<&'a mut Record, ApiError> {
    find_mut(notifications, id)
        .filter(|n| str_field(n, "app_id") == Some(app_id))
        .ok_or_else(|| ApiError::not_found("Couldn't find a notification with that id"))
}

async fn get_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<AppIdQuery>,
) -> ApiResult {
    state.authorize(&headers, Key::App)?;
    let mut db = state.db.write().await;
    let notification = find_notification_mut(&mut db.notifications, &id, &query.app_id)?;
    Ok(Json(Value::Object(notification.clone())))
}

async fn update_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<OpenedInput>,
) -> ApiResult {
    state.authorize(&headers, Key::App)?;
    let mut db = state.db.write().await;
    let notification = find_notification_mut(&mut db.notifications, &id, &input.app_id)?;
    if input.opened {
        bump(notification, "converted", 1);
    }
    Ok(success())
}

async fn delete_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<AppIdQuery>,
) -> ApiResult {
    state.authorize(&headers, Key::App)?;
    let mut db = state.db.write().await;
    let notification = find_notification_mut(&mut db.notifications, &id, &query.app_id)?;
    notification.insert("canceled".to_string(), json!(true));
    info!(%id, "canceled notification");
    Ok(success())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn merge_never_replaces_id() {
        let mut target = record(json!({"id": "keep", "name": "old"}));
        merge(&mut target, record(json!({"id": "other", "name": "new", "extra": 1})));
        assert_eq!(target["id"], "keep");
        assert_eq!(target["name"], "new");
        assert_eq!(target["extra"], 1);
    }

    #[test]
    fn bump_starts_missing_counters_at_zero() {
        let mut target = Record::new();
        bump(&mut target, "playtime", 60);
        bump(&mut target, "playtime", 5);
        assert_eq!(target["playtime"], 65);
    }

    #[test]
    fn page_filters_by_app_and_slices() {
        let records: Vec<Record> = (0..5)
            .map(|i| {
                let app_id = if i % 2 == 0 { "a" } else { "b" };
                record(json!({"id": i.to_string(), "app_id": app_id}))
            })
            .collect();
        let query = ListQuery {
            app_id: "a".to_string(),
            limit: 1,
            offset: 1,
        };
        let body = page(records.iter(), &query, "players");
        assert_eq!(body["total_count"], 3);
        assert_eq!(body["offset"], 1);
        assert_eq!(body["limit"], 1);
        assert_eq!(body["players"], json!([{"id": "2", "app_id": "a"}]));
    }

    #[test]
    fn list_query_defaults_limit_and_offset() {
        let query: ListQuery = serde_json::from_str(r#"{"app_id":"a"}"#).unwrap();
        assert_eq!(query.limit, 50);
        assert_eq!(query.offset, 0);
    }

    #[test]
    fn authorize_requires_basic_prefix_and_matching_key() {
        let state = AppState {
            config: Arc::new(MockConfig::default()),
            db: Db::default(),
        };
        let mut headers = HeaderMap::new();
        assert!(state.authorize(&headers, Key::App).is_err());

        headers.insert(AUTHORIZATION, "mock-app-key".parse().unwrap());
        assert!(state.authorize(&headers, Key::App).is_err());

        headers.insert(AUTHORIZATION, "Basic mock-app-key".parse().unwrap());
        assert!(state.authorize(&headers, Key::App).is_ok());
        assert!(state.authorize(&headers, Key::User).is_err());
    }

    #[test]
    fn timestamps_are_rfc3339_with_millis() {
        let stamp = now_rfc3339();
        assert!(stamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }
}
