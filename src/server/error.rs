//! Error types for the adapter.

use thiserror::Error;

use crate::parser::Error as ParserError;
use crate::server::lifecycle::ServerHandle;

/// Errors that can occur while serving or managing a server.
#[derive(Debug, Error)]
pub enum Error {
    /// A lifecycle call referenced a server that is not running.
    #[error("Invalid server handle: {0}")]
    InvalidHandle(ServerHandle),

    /// The handler's response could not be turned into an HTTP response.
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// The request handler failed.
    #[error("Handler failure: {0}")]
    HandlerFailure(String),

    /// The requested operation is not supported by this adapter.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// A configuration value the server cannot run with.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The listener could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Ways a handler response can fail validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslationError {
    /// The handler returned something other than a named list.
    #[error("response must be a list, got {0}")]
    NotAList(&'static str),

    #[error("response has no status")]
    MissingStatus,

    #[error("status {0} is not a valid HTTP status code")]
    InvalidStatus(String),

    /// A header name or value that cannot be put on the wire as is.
    #[error("invalid header {0:?}")]
    InvalidHeader(String),

    /// Only raised in strict mode.
    #[error("unsupported headers of type {0}")]
    UnsupportedHeaders(&'static str),

    /// Only raised in strict mode.
    #[error("unsupported body of type {0}")]
    UnsupportedBody(&'static str),
}
