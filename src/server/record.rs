//! Request records: the read-only view of a request handed to the handler.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::parser::HttpRequest;
use crate::value::Value;

pub const SERVER_NAME: &str = "server_name";
pub const SERVER_PORT: &str = "server_port";
pub const REQUEST_METHOD: &str = "request_method";
pub const PATH_INFO: &str = "path_info";
pub const HTTP_VERSION: &str = "http_version";
pub const HEADERS: &str = "headers";
pub const BODY: &str = "body";

/// An immutable key/value record describing one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RequestRecord {
    entries: BTreeMap<String, Value>,
}

impl RequestRecord {
    /// Start a record with the two entries every record carries.
    pub fn builder(method: impl Into<String>, server_name: impl Into<String>) -> RequestRecordBuilder {
        RequestRecordBuilder::new(method, server_name)
    }

    /// Build the record for a request received by a listener on `host:port`.
    ///
    /// The server name comes from the `Host` header when there is one, minus any
    /// port suffix; otherwise the listener's own host is used. Neither the method
    /// nor the host is validated.
    pub fn from_request(request: HttpRequest, listen_host: &str, listen_port: u16) -> Self {
        let (server_name, port) = match request.get_header("Host") {
            Some(host) => split_host(host),
            None => (listen_host, None),
        };
        let server_name = server_name.to_string();

        RequestRecordBuilder::new(request.method, server_name)
            .server_port(port.unwrap_or(listen_port))
            .path_info(request.path)
            .http_version(request.version.as_str())
            .headers(request.headers)
            .body(request.body)
            .build()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// A string entry such as `server_name` or `request_method`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn server_name(&self) -> &str {
        self.get_str(SERVER_NAME).unwrap_or_default()
    }

    pub fn request_method(&self) -> &str {
        self.get_str(REQUEST_METHOD).unwrap_or_default()
    }

    /// Look up a request header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        match self.get(HEADERS) {
            Some(Value::Named(headers)) => headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn body(&self) -> &[u8] {
        self.get(BODY).and_then(Value::as_bytes).unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Render the record as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Incremental construction of a [`RequestRecord`].
#[derive(Debug, Clone)]
pub struct RequestRecordBuilder {
    entries: BTreeMap<String, Value>,
}

impl RequestRecordBuilder {
    pub fn new(method: impl Into<String>, server_name: impl Into<String>) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(REQUEST_METHOD.to_string(), Value::text(method));
        entries.insert(SERVER_NAME.to_string(), Value::text(server_name));
        Self { entries }
    }

    pub fn server_port(self, port: u16) -> Self {
        self.insert(SERVER_PORT, Value::Integer(i64::from(port)))
    }

    pub fn path_info(self, path: impl Into<String>) -> Self {
        self.insert(PATH_INFO, Value::text(path))
    }

    pub fn http_version(self, version: impl Into<String>) -> Self {
        self.insert(HTTP_VERSION, Value::text(version))
    }

    pub fn headers(self, headers: Vec<(String, String)>) -> Self {
        self.insert(HEADERS, Value::Named(headers))
    }

    pub fn body(self, body: Vec<u8>) -> Self {
        self.insert(BODY, Value::Raw(body))
    }

    /// Add an arbitrary entry, replacing any previous value under `key`.
    pub fn insert(mut self, key: impl Into<String>, value: Value) -> Self {
        self.entries.insert(key.into(), value);
        self
    }

    pub fn build(self) -> RequestRecord {
        RequestRecord { entries: self.entries }
    }
}

/// Split `host[:port]`. Bracketed IPv6 literals keep their colons.
fn split_host(host: &str) -> (&str, Option<u16>) {
    match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => {
            (name, port.parse().ok())
        }
        _ => (host, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{HttpVersion, parse_request};

    #[test]
    fn test_builder_sets_required_entries() {
        let record = RequestRecord::builder("GET", "example.com").build();
        assert_eq!(record.request_method(), "GET");
        assert_eq!(record.server_name(), "example.com");
        assert_eq!(record.keys().count(), 2);
    }

    #[test]
    fn test_values_pass_through_verbatim() {
        let record = RequestRecord::builder("weird method", "not a host!").build();
        assert_eq!(record.request_method(), "weird method");
        assert_eq!(record.server_name(), "not a host!");
    }

    #[test]
    fn test_from_request_uses_host_header() {
        let request = parse_request(
            b"POST /submit?x=1 HTTP/1.1\r\nHost: api.example.com:9000\r\nContent-Length: 2\r\n\r\nhi",
        )
        .unwrap();
        let record = RequestRecord::from_request(request, "127.0.0.1", 8080);

        assert_eq!(record.server_name(), "api.example.com");
        assert_eq!(record.get(SERVER_PORT), Some(&Value::Integer(9000)));
        assert_eq!(record.request_method(), "POST");
        assert_eq!(record.get_str(PATH_INFO), Some("/submit?x=1"));
        assert_eq!(record.get_str(HTTP_VERSION), Some("HTTP/1.1"));
        assert_eq!(record.header("content-length"), Some("2"));
        assert_eq!(record.body(), b"hi");
    }

    #[test]
    fn test_from_request_without_host_falls_back_to_listener() {
        let request = HttpRequest::new("GET", "/", HttpVersion::Http10, Vec::new());
        let record = RequestRecord::from_request(request, "0.0.0.0", 8080);
        assert_eq!(record.server_name(), "0.0.0.0");
        assert_eq!(record.get(SERVER_PORT), Some(&Value::Integer(8080)));
    }

    #[test]
    fn test_split_host() {
        assert_eq!(split_host("example.com"), ("example.com", None));
        assert_eq!(split_host("example.com:80"), ("example.com", Some(80)));
        assert_eq!(split_host("[::1]:8080"), ("[::1]", Some(8080)));
        assert_eq!(split_host("[::1]"), ("[::1]", None));
    }

    #[test]
    fn test_to_json() {
        let record = RequestRecord::builder("GET", "localhost").build();
        let json: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(json["request_method"]["type"], "text");
        assert_eq!(json["request_method"]["value"][0], "GET");
    }
}
