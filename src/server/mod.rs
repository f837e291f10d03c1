//! The request adapter.
//!
//! Requests flow through four stages: the connection layer reads a request,
//! [`RequestRecord`] captures it, the [`Gate`] runs the handler with exclusive
//! access to the session, and the translator writes the handler's answer back.
//! [`start`], [`stop`] and [`run`] manage servers through opaque handles.

mod config;
mod error;
mod gate;
mod handler;
mod http_server;
mod lifecycle;
mod record;
mod response;
mod translate;
pub mod unsupported;

// Re-export public items
pub use config::{RunMode, ServerConfig};
pub use error::{Error, TranslationError};
pub use gate::Gate;
pub use handler::{HandlerError, HandlerSet, OnBodyDataFn, OnHeadersFn, OnRequestFn};
pub use http_server::HttpServer;
pub use lifecycle::{ServerHandle, ServerState, local_addr, run, start, start_with_session, state, stop, stop_all};
pub use record::{RequestRecord, RequestRecordBuilder};
pub use response::{Body, ResponseRecord, ResponseWriter, WireResponse, is_valid_header, reason_phrase};
pub use translate::{translate, write_response};

/// Well-known request record keys.
pub mod keys {
    pub use super::record::{BODY, HEADERS, HTTP_VERSION, PATH_INFO, REQUEST_METHOD, SERVER_NAME, SERVER_PORT};
}
