//! HTTP response types and utilities.

use std::io;

use log::warn;

use crate::value::Value;

/// Reason phrase for a status code, empty for codes without one.
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        409 => "Conflict",
        413 => "Payload Too Large",
        415 => "Unsupported Media Type",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

/// A response body in one of the two shapes a handler may return.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Body {
    #[default]
    Empty,
    Bytes(Vec<u8>),
    TextChunks(Vec<String>),
}

/// A validated handler response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl ResponseRecord {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Body::Bytes(body.into());
        self
    }

    pub fn with_text<I, T>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.body = Body::TextChunks(chunks.into_iter().map(Into::into).collect());
        self
    }
}

/// The loosely typed form a handler returns, so a typed record can be handed
/// back from a handler as well.
impl From<ResponseRecord> for Value {
    fn from(record: ResponseRecord) -> Self {
        let mut items = vec![("status".to_string(), Value::Integer(i64::from(record.status)))];
        if !record.headers.is_empty() {
            items.push(("headers".to_string(), Value::Named(record.headers)));
        }
        match record.body {
            Body::Empty => {}
            Body::Bytes(bytes) => items.push(("body".to_string(), Value::Raw(bytes))),
            Body::TextChunks(chunks) => items.push(("body".to_string(), Value::Text(chunks))),
        }
        Value::List(items)
    }
}

/// The outgoing side of an HTTP exchange, as the translator sees it.
pub trait ResponseWriter {
    fn set_status(&mut self, status: u16);

    /// Set a header, replacing any earlier value with the same name.
    fn set_header(&mut self, name: &str, value: &str);

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;

    fn write_text(&mut self, text: &str) -> io::Result<()>;

    /// Record that the response is complete.
    fn mark_handled(&mut self);
}

/// A response buffered in memory until it is serialized onto the wire.
#[derive(Debug, Clone, Default)]
pub struct WireResponse {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    handled: bool,
}

impl WireResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// A plain-text response, used for the adapter's own error replies.
    pub fn plain(status: u16, message: impl AsRef<str>) -> Self {
        let mut response = Self::new();
        response.set_status(status);
        response.set_header("Content-Type", "text/plain; charset=utf-8");
        response.body.extend_from_slice(message.as_ref().as_bytes());
        response.handled = true;
        response
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn is_handled(&self) -> bool {
        self.handled
    }

    /// True while nothing at all has been written.
    pub fn is_untouched(&self) -> bool {
        self.status.is_none() && self.headers.is_empty() && self.body.is_empty() && !self.handled
    }

    /// Convert the response to bytes.
    ///
    /// The body is fully buffered, so framing is always ours: any
    /// `Content-Length` or `Transfer-Encoding` the handler set is replaced by
    /// the real length. 1xx, 204 and 304 responses carry neither a length nor
    /// a body. `Connection: close` is added since each connection carries one
    /// exchange.
    pub fn to_bytes(&self) -> Vec<u8> {
        let status = self.status.unwrap_or(500);
        let bodiless = matches!(status, 100..=199 | 204 | 304);
        let mut bytes = Vec::with_capacity(128 + self.body.len());

        let status_line = format!("HTTP/1.1 {status} {}\r\n", reason_phrase(status));
        bytes.extend_from_slice(status_line.as_bytes());

        for (name, value) in &self.headers {
            if is_framing_header(name) {
                continue;
            }
            if !is_valid_header(name, value) {
                warn!("Dropping header {name:?} with characters not allowed on the wire");
                continue;
            }
            bytes.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }
        if !bodiless {
            bytes.extend_from_slice(format!("Content-Length: {}\r\n", self.body.len()).as_bytes());
        }
        if self.header("Connection").is_none() {
            bytes.extend_from_slice(b"Connection: close\r\n");
        }

        bytes.extend_from_slice(b"\r\n");
        if !bodiless {
            bytes.extend_from_slice(&self.body);
        }

        bytes
    }
}

fn is_framing_header(name: &str) -> bool {
    name.eq_ignore_ascii_case("Content-Length") || name.eq_ignore_ascii_case("Transfer-Encoding")
}

/// Whether a header can be written without splitting the header block.
///
/// Names must be non-empty and free of whitespace, `:` and control bytes;
/// values may not contain CR, LF or NUL.
pub fn is_valid_header(name: &str, value: &str) -> bool {
    let name_ok = !name.is_empty() && name.bytes().all(|b| b.is_ascii_graphic() && b != b':');
    let value_ok = !value.bytes().any(|b| matches!(b, b'\r' | b'\n' | b'\0'));
    name_ok && value_ok
}

impl ResponseWriter for WireResponse {
    fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn set_header(&mut self, name: &str, value: &str) {
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.body.extend_from_slice(bytes);
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.body.extend_from_slice(text.as_bytes());
        Ok(())
    }

    fn mark_handled(&mut self) {
        self.handled = true;
    }
}
