//! An embedded HTTP request adapter.
//!
//! This library accepts HTTP connections concurrently and funnels every request
//! into a single handler that runs against shared, non-reentrant session state,
//! such as an embedded interpreter. Handler calls are serialized; everything
//! around them (reading requests, writing responses) is not.
//!
//! # Features
//!
//! - Request records carrying method, server name, headers and body verbatim
//! - A gate allowing at most one handler call at a time per server
//! - Loosely typed handler responses validated at the boundary
//! - Servers addressed through generation-checked handles
//! - Explicit `NotImplemented` errors for the unsupported httpuv surface
//!
//! # Examples
//!
//! ## Serving requests
//!
//! ```no_run
//! use httpuv_rs::{HandlerSet, ResponseRecord, ServerConfig, Value};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Session state shared by all handler calls
//!     let handlers = HandlerSet::new(|hits: &mut u64, req| {
//!         *hits += 1;
//!         let body = format!("{} request #{hits}", req.request_method());
//!         Ok(Value::from(ResponseRecord::new(200).with_text([body])))
//!     });
//!
//!     let handle = httpuv_rs::start("127.0.0.1", 8080, handlers, ServerConfig::default()).await?;
//!     httpuv_rs::run(handle).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Translating a response
//!
//! ```
//! use httpuv_rs::{Value, WireResponse, translate};
//!
//! let value = Value::from_json(r#"{"status": 200, "headers": {"X-Test": "1"}, "body": ["Hello, ", "World"]}"#).unwrap();
//! let mut wire = WireResponse::new();
//! translate(value, &mut wire, false).unwrap();
//!
//! assert_eq!(wire.status(), Some(200));
//! assert_eq!(wire.header("X-Test"), Some("1"));
//! assert_eq!(wire.body(), b"Hello, World");
//! ```

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

pub mod value;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, parse_request};
pub use server::{
    Body, Error, Gate, HandlerError, HandlerSet, RequestRecord, ResponseRecord, ResponseWriter, RunMode,
    ServerConfig, ServerHandle, ServerState, TranslationError, WireResponse, local_addr, run, start,
    start_with_session, state, stop, stop_all, translate,
};
pub use value::Value;
