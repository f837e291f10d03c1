//! Inbound HTTP request parsing.
//!
//! This is the thin transport layer the adapter sits on: it turns the bytes of a
//! single HTTP/1.x request into method, target, headers and body. Method and
//! target are carried through verbatim; nothing here decodes URIs.

mod request;
mod version;
mod error;
mod tests;

// Re-export public items
pub use request::{HttpRequest, find_head_end, parse_request};
pub use version::HttpVersion;
pub use error::Error;
