//! Error types for the inbound request parser.

use thiserror::Error;

/// Errors that can occur while reading an HTTP request off the wire.
#[derive(Debug, Error)]
pub enum Error {
    /// The request line does not have the `METHOD TARGET VERSION` shape.
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// The HTTP version in the request is not supported.
    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),

    /// A required header is missing from the request.
    #[error("Required header is missing: {0}")]
    MissingHeader(String),

    /// A header line has no `:` separator.
    #[error("Invalid header format")]
    InvalidHeaderFormat,

    /// The `Content-Length` header is not a non-negative integer.
    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// Fewer body bytes arrived than `Content-Length` announced.
    #[error("Incomplete body: expected {expected} bytes, got {actual}")]
    IncompleteBody { expected: usize, actual: usize },

    /// The request head did not fit in the read buffer.
    #[error("Request head exceeds {0} bytes")]
    HeadTooLarge(usize),

    /// The announced body is larger than the configured limit.
    #[error("Request body exceeds {0} bytes")]
    BodyTooLarge(usize),

    /// The request is empty.
    #[error("Empty request")]
    EmptyRequest,
}
