//! Event envelope - immutable view of one inbound webhook delivery.
//!
//! The HTTP layer builds an envelope from the request it received and hands it
//! to the pipeline. Nothing downstream reads request state from anywhere else.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// Case-insensitive header map.
///
/// Names are stored lowercased; repeated headers keep the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RequestHeaders(BTreeMap<String, String>);

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a header, replacing any previous value for the same name.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0.insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Looks up a header by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Returns true if the header is present with a non-blank value.
    pub fn has_value(&self, name: &str) -> bool {
        self.get(name).map(|v| !v.trim().is_empty()).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serializes the headers as a JSON object for the audit log.
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

impl<K, V> FromIterator<(K, V)> for RequestHeaders
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = RequestHeaders::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// One inbound webhook delivery.
///
/// `parsed_body` is derived from `raw_body` once, at construction. An empty,
/// malformed, or non-object body yields an empty map; rejecting such input is
/// the verifier's job.
#[derive(Debug, Clone)]
pub struct EventEnvelope {
    method: String,
    headers: RequestHeaders,
    raw_body: Vec<u8>,
    user_agent: String,
    parsed_body: Map<String, Value>,
}

impl EventEnvelope {
    pub fn new(
        method: impl Into<String>,
        headers: RequestHeaders,
        raw_body: impl Into<Vec<u8>>,
        user_agent: impl Into<String>,
    ) -> Self {
        let raw_body = raw_body.into();
        let parsed_body = parse_body(&raw_body);

        Self {
            method: method.into(),
            headers,
            raw_body,
            user_agent: user_agent.into(),
            parsed_body,
        }
    }

    /// Builds an envelope taking the user agent from the `User-Agent` header.
    pub fn from_request(
        method: impl Into<String>,
        headers: RequestHeaders,
        raw_body: impl Into<Vec<u8>>,
    ) -> Self {
        let user_agent = headers.get("user-agent").unwrap_or_default().to_string();
        Self::new(method, headers, raw_body, user_agent)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn headers(&self) -> &RequestHeaders {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The body exactly as received.
    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn parsed_body(&self) -> &Map<String, Value> {
        &self.parsed_body
    }

    /// The `event_type` field, if present and non-empty.
    pub fn event_type(&self) -> Option<&str> {
        self.string_field("event_type")
    }

    /// The provider's event id (`id` field).
    pub fn event_id(&self) -> Option<&str> {
        self.string_field("id")
    }

    /// Human-readable description the provider attaches to each event.
    pub fn summary(&self) -> Option<&str> {
        self.string_field("summary")
    }

    /// The `resource` object the event describes.
    pub fn resource(&self) -> Option<&Value> {
        self.parsed_body.get("resource")
    }

    fn string_field(&self, key: &str) -> Option<&str> {
        self.parsed_body
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

fn parse_body(raw: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
