//! Error types for the OneSignal client.
//!
//! # Design
//! Four failure classes are kept apart so callers can tell "OneSignal
//! rejected the request" (`Api`) from "the request never reached OneSignal"
//! (`Transport`) and from "OneSignal accepted it but answered with a body we
//! could not read" (`Decode`). `Build` covers requests that could not be
//! constructed at all, `Config` a client that could not be set up. None of
//! them are retried.

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::http::TransportError;
use crate::types::ListOrMap;

/// Result type for OneSignal client operations.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";
pub(crate) const UNDECODABLE_BODY: &str = "Couldn't decode response body JSON";

/// Errors returned by `Client` and the resource services.
#[derive(Debug, Error)]
pub enum Error {
    /// The path could not be resolved or the body could not be encoded.
    #[error("failed to build request: {0}")]
    Build(String),

    /// No response was received.
    #[error("transport error: {0}")]
    Transport(#[source] TransportError),

    /// OneSignal answered with a non-200 status.
    #[error("{response}")]
    Api { status: u16, response: ErrorResponse },

    /// A 200 body did not match the expected result type.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Upstream messages of an `Api` error, empty for every other variant.
    pub fn messages(&self) -> &[String] {
        match self {
            Error::Api { response, .. } => &response.messages,
            _ => &[],
        }
    }

    pub fn is_api(&self) -> bool {
        matches!(self, Error::Api { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }
}

/// One or more human-readable messages reported by OneSignal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorResponse {
    pub messages: Vec<String>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    errors: Option<ListOrMap>,
}

impl ErrorResponse {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// Decode an `{"errors": ...}` envelope.
    ///
    /// `errors` may be a list of strings or an object such as
    /// `{"invalid_player_ids": [...]}`; object entries become one
    /// `key: value` message each. The body must be a JSON object; arrays,
    /// `null` and scalars are rejected.
    pub fn from_body(body: &str) -> std::result::Result<Self, serde_json::Error> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(body)?;
        let envelope: Envelope = serde_json::from_value(serde_json::Value::Object(object))?;
        let messages = match envelope.errors {
            None => Vec::new(),
            Some(ListOrMap::List(messages)) => messages,
            Some(ListOrMap::Map(entries)) => entries
                .into_iter()
                .map(|(key, value)| match value {
                    serde_json::Value::String(text) => format!("{key}: {text}"),
                    serde_json::Value::Array(items) => {
                        let items: Vec<String> = items
                            .into_iter()
                            .map(|item| match item {
                                serde_json::Value::String(text) => text,
                                other => other.to_string(),
                            })
                            .collect();
                        format!("{key}: {}", items.join(", "))
                    }
                    other => format!("{key}: {other}"),
                })
                .collect(),
        };
        Ok(Self { messages })
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OneSignal returned those error messages:\n - {}",
            self.messages.join("\n - ")
        )
    }
}

impl std::error::Error for ErrorResponse {}
