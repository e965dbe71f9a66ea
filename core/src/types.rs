//! Wire types shared by several resources.
//!
//! # Design
//! Some OneSignal fields change JSON shape depending on the response: the
//! `errors` field of a notification creation is sometimes a list of strings
//! and sometimes an object keyed by error kind, and notification `data` is an
//! arbitrary object. `ListOrMap` keeps those fields typed and is matched by
//! shape; `Option<ListOrMap>` covers the absent and `null` cases.

use serde::{Deserialize, Deserializer, Serialize};

/// A JSON value that is either a list of strings or an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListOrMap {
    List(Vec<String>),
    Map(serde_json::Map<String, serde_json::Value>),
}

impl ListOrMap {
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ListOrMap::List(items) => Some(items),
            ListOrMap::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        match self {
            ListOrMap::Map(entries) => Some(entries),
            ListOrMap::List(_) => None,
        }
    }
}

impl From<Vec<String>> for ListOrMap {
    fn from(items: Vec<String>) -> Self {
        ListOrMap::List(items)
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for ListOrMap {
    fn from(entries: serde_json::Map<String, serde_json::Value>) -> Self {
        ListOrMap::Map(entries)
    }
}

/// Body returned by endpoints that only acknowledge the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// `app_id`, `limit` and `offset` query parameters shared by list endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    pub app_id: String,
    pub limit: u32,
    pub offset: u32,
}

/// `app_id` as the only query or body parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppIdOptions {
    pub app_id: String,
}

/// Decode `null` like an absent field: as `T::default()`.
///
/// Use together with `#[serde(default)]` on scalar result fields.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Counters {
        #[serde(default, deserialize_with = "null_as_default")]
        count: u64,
        #[serde(default, deserialize_with = "null_as_default")]
        label: String,
    }

    #[test]
    fn null_and_absent_scalars_decode_as_zero_values() {
        let nulls: Counters = serde_json::from_str(r#"{"count":null,"label":null}"#).unwrap();
        assert_eq!(nulls, Counters::default());
        let absent: Counters = serde_json::from_str("{}").unwrap();
        assert_eq!(absent, Counters::default());
        let set: Counters = serde_json::from_str(r#"{"count":3,"label":"x"}"#).unwrap();
        assert_eq!(set.count, 3);
        assert_eq!(set.label, "x");
    }

    #[test]
    fn list_or_map_picks_list_for_arrays() {
        let value: ListOrMap = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert_eq!(value.as_list(), Some(&["a".to_string(), "b".to_string()][..]));
        assert!(value.as_map().is_none());
    }

    #[test]
    fn list_or_map_picks_map_for_objects() {
        let value: ListOrMap =
            serde_json::from_value(json!({"invalid_player_ids": ["x"]})).unwrap();
        let entries = value.as_map().unwrap();
        assert_eq!(entries["invalid_player_ids"], json!(["x"]));
    }

    #[test]
    fn list_or_map_rejects_scalars() {
        assert!(serde_json::from_value::<ListOrMap>(json!(42)).is_err());
    }

    #[test]
    fn absent_and_null_both_decode_to_none() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default)]
            data: Option<ListOrMap>,
        }
        let absent: Holder = serde_json::from_str("{}").unwrap();
        let null: Holder = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(absent.data.is_none());
        assert!(null.data.is_none());
    }

    #[test]
    fn list_options_encode_as_query_string() {
        let opts = ListOptions {
            app_id: "fake-app-id".to_string(),
            limit: 10,
            offset: 0,
        };
        assert_eq!(
            serde_urlencoded::to_string(&opts).unwrap(),
            "app_id=fake-app-id&limit=10&offset=0"
        );
    }
}
