//! Request builder and response normalizer shared by every OneSignal call.
//!
//! # Design
//! `Client` holds the base URL, both credentials and a `Transport`. Every
//! resource method funnels through the same two steps:
//!
//! - `build_request` resolves the path, encodes the body and attaches the
//!   `Content-Type`, `Accept` and `Authorization` headers. No I/O.
//! - `send` executes the request once and hands the response to
//!   `parse_response`, which routes on the status code alone: 200 decodes
//!   into the caller's type, 500 becomes a fixed message, anything else is
//!   read as an `{"errors": ...}` envelope.
//!
//! Calls take `&self` and never mutate the client, so one `Client` can be
//! shared across threads. Credential setters take `&mut self`.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::apps::Apps;
use crate::config::{redact, ClientConfig, DEFAULT_BASE_URL};
use crate::error::{Error, ErrorResponse, Result, INTERNAL_SERVER_ERROR, UNDECODABLE_BODY};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::notifications::Notifications;
use crate::players::Players;

/// Bytes escaped when a resource id becomes one path segment. Covers `/`,
/// `?`, `#` and `%` so an id can never change the endpoint or the query.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Placeholder body for calls that send none.
pub(crate) const NO_BODY: Option<&()> = None;

/// Which credential goes into the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKeyType {
    /// The app's REST API key.
    App,
    /// The account-wide user auth key.
    User,
}

/// Blocking client for the OneSignal REST API.
pub struct Client {
    base_url: Url,
    app_key: String,
    user_key: String,
    transport: Box<dyn Transport>,
}

impl Client {
    /// Client for the public OneSignal API using the default ureq transport.
    /// Both keys start empty.
    #[cfg(feature = "ureq")]
    pub fn new() -> Self {
        Self::with_transport(crate::http::UreqTransport::new())
    }

    /// Client for the public OneSignal API using a custom transport.
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        let base_url = Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is an absolute URL");
        Self {
            base_url,
            app_key: String::new(),
            user_key: String::new(),
            transport: Box::new(transport),
        }
    }

    /// Build a client from `config` with a ureq transport honoring its timeout.
    #[cfg(feature = "ureq")]
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = crate::http::UreqTransport::with_timeout(config.timeout);
        Self::from_config_with_transport(config, transport)
    }

    pub fn from_config_with_transport(
        config: &ClientConfig,
        transport: impl Transport + 'static,
    ) -> Result<Self> {
        let mut client = Self::with_transport(transport);
        client.set_base_url(&config.base_url)?;
        client.set_app_key(config.app_key.clone());
        client.set_user_key(config.user_key.clone());
        Ok(client)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Point the client at another API root, e.g. a local mock server.
    ///
    /// The URL must be absolute. A trailing `/` is added when missing so that
    /// relative paths resolve underneath it.
    pub fn set_base_url(&mut self, base_url: &str) -> Result<()> {
        let mut url =
            Url::parse(base_url).map_err(|e| Error::Config(format!("invalid base URL {base_url:?}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!("base URL {base_url:?} cannot hold paths")));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        Ok(())
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    pub fn set_app_key(&mut self, key: impl Into<String>) {
        self.app_key = key.into();
    }

    pub fn user_key(&self) -> &str {
        &self.user_key
    }

    pub fn set_user_key(&mut self, key: impl Into<String>) {
        self.user_key = key.into();
    }

    pub fn apps(&self) -> Apps<'_> {
        Apps::new(self)
    }

    pub fn players(&self) -> Players<'_> {
        Players::new(self)
    }

    pub fn notifications(&self) -> Notifications<'_> {
        Notifications::new(self)
    }

    /// Build a request for `path`, relative to the base URL.
    ///
    /// `path` may carry an already encoded query string. A leading `/` is
    /// ignored. Paths that would leave the base URL are rejected.
    pub fn build_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        auth: AuthKeyType,
    ) -> Result<HttpRequest> {
        let url = self.resolve(path)?;

        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| Error::Build(format!("cannot encode request body: {e}")))?;

        let key = match auth {
            AuthKeyType::App => &self.app_key,
            AuthKeyType::User => &self.user_key,
        };

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), format!("Basic {key}")),
            ],
            body,
        })
    }

    /// Execute `request` once and return the raw response.
    pub fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending OneSignal request");
        let response = self.transport.execute(request).map_err(|e| {
            debug!(method = %request.method, url = %request.url, error = %e, "OneSignal request failed");
            Error::Transport(e)
        })?;
        debug!(method = %request.method, url = %request.url, status = response.status, "OneSignal responded");
        Ok(response)
    }

    /// Execute `request` once and decode the response into `T`.
    pub fn send<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let response = self.execute(&request)?;
        parse_response(response)
    }

    pub(crate) fn call<B, T>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        auth: AuthKeyType,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_request(method, path, body, auth)?;
        self.send(request)
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::Build(format!("invalid path {path:?}: {e}")))?;
        if url.origin() != self.base_url.origin() || !url.path().starts_with(self.base_url.path()) {
            return Err(Error::Build(format!("path {path:?} escapes the base URL")));
        }
        Ok(url)
    }
}

#[cfg(feature = "ureq")]
impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("app_key", &redact(&self.app_key))
            .field("user_key", &redact(&self.user_key))
            .finish_non_exhaustive()
    }
}

/// Encode a resource id as a single path segment.
///
/// Empty, `.` and `..` ids are rejected: URL resolution would collapse them
/// into another endpoint.
pub(crate) fn segment(id: &str) -> Result<String> {
    if id.is_empty() || id == "." || id == ".." {
        return Err(Error::Build(format!("invalid resource id {id:?}")));
    }
    Ok(utf8_percent_encode(id, SEGMENT).to_string())
}

/// Encode `opts` as a query string for a resource path.
pub(crate) fn query<Q: Serialize>(opts: &Q) -> Result<String> {
    serde_urlencoded::to_string(opts).map_err(|e| Error::Build(format!("cannot encode query string: {e}")))
}

/// Decode a 200 response into `T`, or turn any other status into `Error::Api`.
pub fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    check_response(&response)?;
    serde_json::from_str(&response.body).map_err(Error::Decode)
}

/// Map a non-200 status to an `Error::Api`.
///
/// 500 bodies are never read. For every other status the body is decoded as
/// an `{"errors": ...}` envelope, with a fixed message when that fails.
pub fn check_response(response: &HttpResponse) -> Result<()> {
    match response.status {
        200 => Ok(()),
        500 => Err(Error::Api {
            status: 500,
            response: ErrorResponse::new(vec![INTERNAL_SERVER_ERROR.to_string()]),
        }),
        status => {
            let error = ErrorResponse::from_body(&response.body).unwrap_or_else(|e| {
                warn!(status, error = %e, "could not decode OneSignal error body");
                ErrorResponse::new(vec![UNDECODABLE_BODY.to_string()])
            });
            Err(Error::Api {
                status,
                response: error,
            })
        }
    }
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Deserialize;

    use super::testing::{FailingTransport, StubTransport};
    use super::*;

    fn client_with(transport: impl Transport + 'static) -> Client {
        let mut client = Client::with_transport(transport);
        client.set_app_key("fake app key");
        client.set_user_key("fake user key");
        client
    }

    fn client() -> Client {
        client_with(StubTransport::new(200, "{}"))
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Foo {
        #[serde(rename = "A")]
        a: String,
    }

    #[test]
    fn new_client_uses_default_base_url() {
        let client = Client::with_transport(FailingTransport);
        assert_eq!(client.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(client.app_key(), "");
        assert_eq!(client.user_key(), "");
    }

    #[test]
    fn build_request_resolves_path_and_encodes_body() {
        #[derive(Serialize)]
        struct Body {
            #[serde(rename = "Foo")]
            foo: &'static str,
        }
        let req = client()
            .build_request(HttpMethod::Get, "foo", Some(&Body { foo: "Bar" }), AuthKeyType::App)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://onesignal.com/api/v1/foo");
        assert_eq!(req.body.as_deref(), Some(r#"{"Foo":"Bar"}"#));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("Accept"), Some("application/json"));
        assert_eq!(req.header("Authorization"), Some("Basic fake app key"));
    }

    #[test]
    fn build_request_attaches_exactly_three_headers() {
        let req = client()
            .build_request(HttpMethod::Get, "apps", NO_BODY, AuthKeyType::User)
            .unwrap();
        let names: Vec<&str> = req.headers.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["Content-Type", "Accept", "Authorization"]);
    }

    #[test]
    fn build_request_without_body_has_no_body() {
        let req = client()
            .build_request(HttpMethod::Get, "/", NO_BODY, AuthKeyType::App)
            .unwrap();
        assert!(req.body.is_none());
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("Accept"), Some("application/json"));
    }

    #[test]
    fn auth_key_type_selects_credential() {
        let c = client();
        let app = c.build_request(HttpMethod::Get, "foo", NO_BODY, AuthKeyType::App).unwrap();
        let user = c.build_request(HttpMethod::Get, "foo", NO_BODY, AuthKeyType::User).unwrap();
        assert_eq!(app.header("Authorization"), Some("Basic fake app key"));
        assert_eq!(user.header("Authorization"), Some("Basic fake user key"));
        assert_ne!(app.header("Authorization"), user.header("Authorization"));
    }

    #[test]
    fn build_request_is_deterministic() {
        let c = client();
        let body = Foo { a: "a".to_string() };
        let first = c.build_request(HttpMethod::Post, "apps", Some(&body), AuthKeyType::User).unwrap();
        let second = c.build_request(HttpMethod::Post, "apps", Some(&body), AuthKeyType::User).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn leading_slash_and_query_string_are_kept_under_base_path() {
        let req = client()
            .build_request(HttpMethod::Get, "/players?app_id=x&limit=10&offset=0", NO_BODY, AuthKeyType::App)
            .unwrap();
        assert_eq!(req.url, "https://onesignal.com/api/v1/players?app_id=x&limit=10&offset=0");
    }

    #[test]
    fn base_url_without_trailing_slash_still_nests_paths() {
        let mut c = client();
        c.set_base_url("http://127.0.0.1:3000/api/v1").unwrap();
        let req = c.build_request(HttpMethod::Get, "apps", NO_BODY, AuthKeyType::User).unwrap();
        assert_eq!(req.url, "http://127.0.0.1:3000/api/v1/apps");
    }

    #[test]
    fn set_base_url_rejects_relative_urls() {
        let mut c = client();
        let err = c.set_base_url("/api/v1").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(c.base_url().as_str(), DEFAULT_BASE_URL);
    }

    #[test]
    fn build_request_rejects_paths_leaving_base_url() {
        let c = client();
        let err = c
            .build_request(HttpMethod::Get, "../../other", NO_BODY, AuthKeyType::App)
            .unwrap_err();
        assert!(matches!(err, Error::Build(_)));
        let err = c
            .build_request(HttpMethod::Get, "https://example.com/apps", NO_BODY, AuthKeyType::App)
            .unwrap_err();
        assert!(matches!(err, Error::Build(_)));
    }

    #[test]
    fn segment_escapes_separators_and_rejects_dot_ids() {
        assert_eq!(segment("id123").unwrap(), "id123");
        assert_eq!(segment("a/b").unwrap(), "a%2Fb");
        assert_eq!(segment("x?y").unwrap(), "x%3Fy");
        assert_eq!(segment("a#b").unwrap(), "a%23b");
        assert_eq!(segment("50%").unwrap(), "50%25");
        assert_eq!(segment("../apps").unwrap(), "..%2Fapps");
        for id in ["", ".", ".."] {
            assert!(matches!(segment(id), Err(Error::Build(_))), "{id:?}");
        }
    }

    #[test]
    fn build_request_rejects_unencodable_body() {
        let mut body: HashMap<(i32, i32), String> = HashMap::new();
        body.insert((1, 2), "x".to_string());
        let err = client()
            .build_request(HttpMethod::Post, "/", Some(&body), AuthKeyType::App)
            .unwrap_err();
        assert!(matches!(err, Error::Build(_)));
    }

    #[test]
    fn send_decodes_success_body() {
        let transport = StubTransport::new(200, r#"{"A":"a"}"#);
        let c = client_with(transport.clone());
        let req = c.build_request(HttpMethod::Get, "/", NO_BODY, AuthKeyType::App).unwrap();
        let foo: Foo = c.send(req).unwrap();
        assert_eq!(foo, Foo { a: "a".to_string() });
        assert_eq!(transport.request_count(), 1);
        assert_eq!(transport.last_request().method, HttpMethod::Get);
    }

    #[test]
    fn send_reports_transport_failure() {
        let c = client_with(FailingTransport);
        let req = c.build_request(HttpMethod::Get, "/", NO_BODY, AuthKeyType::App).unwrap();
        let err = c.send::<Foo>(req).unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn send_plain_text_error_is_api_error() {
        let c = client_with(StubTransport::new(400, "Bad Request\n"));
        let req = c.build_request(HttpMethod::Get, "/", NO_BODY, AuthKeyType::App).unwrap();
        let err = c.send::<Foo>(req).unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.messages(), &[UNDECODABLE_BODY.to_string()]);
    }

    #[test]
    fn check_response_ok() {
        assert!(check_response(&response(200, "")).is_ok());
    }

    #[test]
    fn check_response_bad_request() {
        let err = check_response(&response(
            400,
            r#"{"errors":["Invalid or missing authentication token"]}"#,
        ))
        .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.messages(), &["Invalid or missing authentication token".to_string()]);
        assert!(err.to_string().contains("Invalid or missing authentication token"));
    }

    #[test]
    fn check_response_no_body() {
        let err = check_response(&response(400, "")).unwrap_err();
        assert_eq!(err.messages(), &["Couldn't decode response body JSON".to_string()]);
    }

    #[test]
    fn check_response_non_object_body_gets_fixed_message() {
        for body in ["[]", "null"] {
            let err = check_response(&response(400, body)).unwrap_err();
            assert_eq!(err.status(), Some(400));
            assert_eq!(err.messages(), &[UNDECODABLE_BODY.to_string()], "{body}");
        }
    }

    #[test]
    fn check_response_empty_error_list_is_still_an_error() {
        let err = check_response(&response(404, r#"{"errors":[]}"#)).unwrap_err();
        assert!(err.is_api());
        assert!(err.messages().is_empty());
    }

    #[test]
    fn check_response_internal_server_error_ignores_body() {
        for body in ["", "<html>oops</html>", r#"{"errors":["something specific"]}"#] {
            let err = check_response(&response(500, body)).unwrap_err();
            assert_eq!(err.status(), Some(500));
            assert_eq!(err.messages(), &["Internal Server Error".to_string()]);
        }
    }

    #[test]
    fn check_response_treats_other_success_codes_as_errors() {
        let err = check_response(&response(201, r#"{"id":"x"}"#)).unwrap_err();
        assert_eq!(err.status(), Some(201));
    }

    #[test]
    fn parse_response_malformed_success_is_decode_error() {
        let err = parse_response::<Foo>(response(200, "not json")).unwrap_err();
        assert!(err.is_decode());
        assert!(!err.is_api());
    }

    #[test]
    fn parse_response_error_wins_over_body_shape() {
        let err = parse_response::<Foo>(response(404, r#"{"A":"a"}"#)).unwrap_err();
        assert!(err.is_api());
        assert!(err.messages().is_empty());
    }

    #[test]
    fn debug_output_hides_keys() {
        let rendered = format!("{:?}", client());
        assert!(!rendered.contains("fake app key"));
        assert!(!rendered.contains("fake user key"));
    }

    #[test]
    fn client_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Client>();
    }

    #[test]
    fn concurrent_calls_on_one_client() {
        let transport = StubTransport::new(200, r#"{"A":"a"}"#);
        let client = std::sync::Arc::new(client_with(transport.clone()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let client = std::sync::Arc::clone(&client);
                std::thread::spawn(move || {
                    let auth = if i % 2 == 0 { AuthKeyType::App } else { AuthKeyType::User };
                    let path = format!("foo/{i}");
                    let req = client.build_request(HttpMethod::Get, &path, NO_BODY, auth).unwrap();
                    client.send::<Foo>(req).unwrap()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Foo { a: "a".to_string() });
        }

        let sent = transport.requests.lock().unwrap().clone();
        assert_eq!(sent.len(), 8);
        for i in 0..8 {
            let url = format!("https://onesignal.com/api/v1/foo/{i}");
            let req = sent.iter().find(|r| r.url == url).unwrap();
            let expected = if i % 2 == 0 { "Basic fake app key" } else { "Basic fake user key" };
            assert_eq!(req.header("Authorization"), Some(expected));
        }
    }
}
