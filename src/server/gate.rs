//! The handler invocation gate.
//!
//! A server owns exactly one gate. The gate owns the session state the handler
//! runs against and a mutex around it, so at most one handler call is in flight
//! per server no matter how many connections are being served. Waiters are not
//! ordered; whichever thread the mutex wakes goes next.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};

use crate::server::error::Error;
use crate::server::handler::HandlerSet;
use crate::server::record::RequestRecord;
use crate::value::Value;

pub struct Gate<S> {
    session: Mutex<S>,
    handlers: HandlerSet<S>,
}

impl<S: Send + 'static> Gate<S> {
    pub fn new(session: S, handlers: HandlerSet<S>) -> Self {
        Self {
            session: Mutex::new(session),
            handlers,
        }
    }

    pub fn handlers(&self) -> &HandlerSet<S> {
        &self.handlers
    }

    /// Call the request handler with exclusive access to the session.
    ///
    /// Blocks while another invocation holds the gate. The lock is released
    /// before this returns on every path: a handler error comes back as
    /// [`Error::HandlerFailure`], and so does a handler panic.
    pub fn invoke(&self, record: RequestRecord) -> Result<Value, Error> {
        let method = record.request_method().to_string();

        // A poisoned lock only means an earlier holder panicked outside the
        // handler call; the session itself is still usable.
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        debug!("Gate acquired for {method} request");

        let on_request = self.handlers.on_request();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| on_request(&mut *session, record)));
        drop(session);

        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!("Handler failed on {method} request: {e}");
                Err(Error::HandlerFailure(e.to_string()))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("Handler panicked on {method} request: {message}");
                Err(Error::HandlerFailure(message))
            }
        }
    }

    /// Run `invoke` on the blocking pool so async workers keep serving
    /// connections while this request waits for, or holds, the gate.
    pub async fn invoke_blocking(self: &Arc<Self>, record: RequestRecord) -> Result<Value, Error> {
        let gate = Arc::clone(self);
        tokio::task::spawn_blocking(move || gate.invoke(record))
            .await
            .map_err(|e| Error::HandlerFailure(e.to_string()))?
    }

    /// Access the session state under the gate.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("handler panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("handler panicked: {s}")
    } else {
        "handler panicked".to_string()
    }
}
