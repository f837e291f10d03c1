//! HTTP request parsing and representation.

use std::str::FromStr;

use crate::parser::error::Error;
use crate::parser::version::HttpVersion;

/// A request as delivered by the transport, before it becomes a request record.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The method token, verbatim
    pub method: String,
    /// The request target, verbatim (path plus any query string)
    pub path: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The headers in arrival order
    pub headers: Vec<(String, String)>,
    /// The request body
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a new HTTP request with an empty body.
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        version: HttpVersion,
        headers: Vec<(String, String)>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            version,
            headers,
            body: Vec::new(),
        }
    }

    /// Replace the body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Get a header value.
    ///
    /// Header names are case-insensitive; the first matching header wins.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// The announced body length, if any.
    pub fn content_length(&self) -> Result<Option<usize>, Error> {
        content_length(&self.headers)
    }

    /// Whether the client asked to switch this connection to WebSocket.
    pub fn is_websocket_upgrade(&self) -> bool {
        self.get_header("Upgrade")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("websocket"))
    }
}

/// Locate the end of the request head.
///
/// Returns the offset of the first body byte, or `None` while the blank line
/// that terminates the headers has not arrived yet. Bare `\n` line endings are
/// accepted alongside `\r\n`.
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    for (i, &byte) in buf.iter().enumerate() {
        if byte != b'\n' {
            continue;
        }
        match &buf[i + 1..] {
            [b'\n', ..] => return Some(i + 2),
            [b'\r', b'\n', ..] => return Some(i + 3),
            _ => {}
        }
    }
    None
}

fn content_length(headers: &[(String, String)]) -> Result<Option<usize>, Error> {
    match headers.iter().find(|(k, _)| k.eq_ignore_ascii_case("Content-Length")) {
        Some((_, value)) => value
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| Error::InvalidContentLength(value.clone())),
        None => Ok(None),
    }
}

/// Parse an HTTP request from a byte slice.
///
/// The slice must hold the whole head and, when `Content-Length` is present,
/// at least that many body bytes. Bytes beyond the announced length are ignored.
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    if input.is_empty() {
        return Err(Error::EmptyRequest);
    }

    let head_end = find_head_end(input).unwrap_or(input.len());
    let head = std::str::from_utf8(&input[..head_end])
        .map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))?;

    let mut lines = head.lines();

    let request_line = match lines.next() {
        Some(line) if !line.trim().is_empty() => line,
        _ => return Err(Error::EmptyRequest),
    };

    // METHOD TARGET VERSION; the method is not checked against a known list
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    let [method, path, version] = parts.as_slice() else {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    };
    let version = HttpVersion::from_str(version)?;

    let mut headers = Vec::new();
    for line in lines {
        if line.is_empty() {
            break;
        }
        let (name, value) = line.split_once(':').ok_or(Error::InvalidHeaderFormat)?;
        headers.push((name.trim().to_string(), value.trim().to_string()));
    }

    if version == HttpVersion::Http11 && !headers.iter().any(|(k, _)| k.eq_ignore_ascii_case("Host")) {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    let rest = &input[head_end..];
    let body = match content_length(&headers)? {
        Some(expected) if rest.len() < expected => {
            return Err(Error::IncompleteBody { expected, actual: rest.len() });
        }
        Some(expected) => rest[..expected].to_vec(),
        None => Vec::new(),
    };

    Ok(HttpRequest::new(*method, *path, version, headers).with_body(body))
}
