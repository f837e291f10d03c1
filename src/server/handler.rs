//! The callbacks a server is created with.

use std::sync::Arc;

use crate::server::record::RequestRecord;
use crate::value::Value;

/// The error type handlers report failures with.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Produces the response for a request. Runs under the gate with exclusive
/// access to the session state `S`.
pub type OnRequestFn<S> = Arc<dyn Fn(&mut S, RequestRecord) -> Result<Value, HandlerError> + Send + Sync>;

/// Called once the request head is known. May answer early with a response.
pub type OnHeadersFn<S> = Arc<dyn Fn(&mut S, &RequestRecord) -> Option<Value> + Send + Sync>;

/// Called with each chunk of the request body.
pub type OnBodyDataFn<S> = Arc<dyn Fn(&mut S, &RequestRecord, &[u8]) + Send + Sync>;

/// The callbacks bound to one server for its whole lifetime.
///
/// Only `on_request` is dispatched. `on_headers` and `on_body_data` are accepted
/// so embedders can register the full callback set, but the adapter buffers
/// whole requests and never calls them.
pub struct HandlerSet<S> {
    on_headers: Option<OnHeadersFn<S>>,
    on_body_data: Option<OnBodyDataFn<S>>,
    on_request: OnRequestFn<S>,
}

impl<S> HandlerSet<S> {
    pub fn new<F>(on_request: F) -> Self
    where
        F: Fn(&mut S, RequestRecord) -> Result<Value, HandlerError> + Send + Sync + 'static,
    {
        Self {
            on_headers: None,
            on_body_data: None,
            on_request: Arc::new(on_request),
        }
    }

    pub fn with_on_headers<F>(mut self, on_headers: F) -> Self
    where
        F: Fn(&mut S, &RequestRecord) -> Option<Value> + Send + Sync + 'static,
    {
        self.on_headers = Some(Arc::new(on_headers));
        self
    }

    pub fn with_on_body_data<F>(mut self, on_body_data: F) -> Self
    where
        F: Fn(&mut S, &RequestRecord, &[u8]) + Send + Sync + 'static,
    {
        self.on_body_data = Some(Arc::new(on_body_data));
        self
    }

    pub fn on_request(&self) -> &OnRequestFn<S> {
        &self.on_request
    }

    pub fn has_on_headers(&self) -> bool {
        self.on_headers.is_some()
    }

    pub fn has_on_body_data(&self) -> bool {
        self.on_body_data.is_some()
    }
}

impl<S> Clone for HandlerSet<S> {
    fn clone(&self) -> Self {
        Self {
            on_headers: self.on_headers.clone(),
            on_body_data: self.on_body_data.clone(),
            on_request: Arc::clone(&self.on_request),
        }
    }
}
