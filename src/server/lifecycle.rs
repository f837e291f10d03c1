//! Starting, stopping and joining servers.
//!
//! Callers never hold a server directly. [`start`] files the server in a
//! process-wide registry and hands back a [`ServerHandle`], an index plus a
//! generation. Retiring a server bumps its slot's generation, so a handle that
//! outlived its server is recognized and rejected with
//! [`Error::InvalidHandle`] instead of reaching a different server that reused
//! the slot.

use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::server::config::{RunMode, ServerConfig};
use crate::server::error::Error;
use crate::server::handler::HandlerSet;
use crate::server::http_server::HttpServer;

/// Opaque reference to a server started with [`start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerHandle {
    index: u32,
    generation: u32,
}

impl fmt::Display for ServerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server#{}.{}", self.index, self.generation)
    }
}

/// Where a server is in its life. There is no way back from `Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Reserved, listener not yet accepting.
    Created,
    Running,
    Stopped,
}

struct Running {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    done: watch::Receiver<bool>,
}

enum SlotState {
    Free,
    Created,
    Running(Running),
}

struct Slot {
    generation: u32,
    state: SlotState,
}

struct Registry {
    slots: Vec<Slot>,
}

static REGISTRY: Mutex<Registry> = Mutex::new(Registry { slots: Vec::new() });

fn registry() -> MutexGuard<'static, Registry> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Registry {
    fn reserve(&mut self) -> ServerHandle {
        let index = match self.slots.iter().position(|slot| matches!(slot.state, SlotState::Free)) {
            Some(index) => index,
            None => {
                self.slots.push(Slot { generation: 0, state: SlotState::Free });
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        slot.state = SlotState::Created;
        ServerHandle {
            index: index as u32,
            generation: slot.generation,
        }
    }

    fn slot_mut(&mut self, handle: ServerHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
    }

    fn state(&self, handle: ServerHandle) -> ServerState {
        let slot = self
            .slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation);
        match slot.map(|slot| &slot.state) {
            Some(SlotState::Created) => ServerState::Created,
            Some(SlotState::Running(_)) => ServerState::Running,
            _ => ServerState::Stopped,
        }
    }

    fn activate(&mut self, handle: ServerHandle, running: Running) {
        if let Some(slot) = self.slot_mut(handle) {
            slot.state = SlotState::Running(running);
        }
    }

    fn running(&mut self, handle: ServerHandle) -> Option<&Running> {
        match self.slot_mut(handle) {
            Some(Slot { state: SlotState::Running(running), .. }) => Some(running),
            _ => None,
        }
    }

    /// Free the slot and invalidate every outstanding handle to it.
    fn retire(&mut self, handle: ServerHandle) -> Option<Running> {
        let slot = self.slot_mut(handle)?;
        let previous = std::mem::replace(&mut slot.state, SlotState::Free);
        slot.generation = slot.generation.wrapping_add(1);
        match previous {
            SlotState::Running(running) => Some(running),
            _ => None,
        }
    }

    fn live_handles(&self) -> Vec<ServerHandle> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot.state, SlotState::Running(_)))
            .map(|(index, slot)| ServerHandle {
                index: index as u32,
                generation: slot.generation,
            })
            .collect()
    }
}

/// Start a server with a default session state.
pub async fn start<S>(
    host: &str,
    port: u16,
    handlers: HandlerSet<S>,
    config: ServerConfig,
) -> Result<ServerHandle, Error>
where
    S: Default + Send + 'static,
{
    start_with_session(host, port, S::default(), handlers, config).await
}

/// Bind `host:port` and serve requests through `handlers`, all of them
/// sharing `session` under one gate.
///
/// With [`RunMode::Background`] this returns as soon as the listener accepts
/// connections. With [`RunMode::Blocking`] it returns only after the server
/// was stopped, by [`stop`] from another task or by Ctrl+C.
pub async fn start_with_session<S>(
    host: &str,
    port: u16,
    session: S,
    handlers: HandlerSet<S>,
    config: ServerConfig,
) -> Result<ServerHandle, Error>
where
    S: Send + 'static,
{
    config.validate()?;
    let handle = registry().reserve();

    let addr = format!("{host}:{port}");
    let bound = match TcpListener::bind(&addr).await {
        Ok(listener) => listener.local_addr().map(|local| (listener, local)),
        Err(e) => Err(e),
    };
    let (listener, local_addr) = match bound {
        Ok(bound) => bound,
        Err(source) => {
            registry().retire(handle);
            return Err(Error::Bind { addr, source });
        }
    };

    let run_mode = config.run_mode;
    let server = Arc::new(HttpServer::new(host, local_addr.port(), session, handlers, config));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (done_tx, done_rx) = watch::channel(false);

    registry().activate(
        handle,
        Running {
            local_addr,
            shutdown: shutdown_tx,
            done: done_rx.clone(),
        },
    );
    info!("Started {handle} on {local_addr}");

    tokio::spawn(async move {
        server.serve(listener, shutdown_rx).await;
        // Covers termination that did not go through stop(), e.g. Ctrl+C
        registry().retire(handle);
        let _ = done_tx.send(true);
    });

    if run_mode == RunMode::Blocking {
        wait_done(done_rx).await;
    }

    Ok(handle)
}

/// Stop a running server and wait for it to wind down.
///
/// Each handle can be stopped once; any later call fails with
/// [`Error::InvalidHandle`].
pub async fn stop(handle: ServerHandle) -> Result<(), Error> {
    let running = {
        let mut registry = registry();
        if registry.state(handle) != ServerState::Running {
            return Err(Error::InvalidHandle(handle));
        }
        registry.retire(handle)
    };
    let Some(running) = running else {
        return Err(Error::InvalidHandle(handle));
    };

    debug!("Stopping {handle}");
    let _ = running.shutdown.send(true);
    wait_done(running.done).await;
    info!("Stopped {handle}");
    Ok(())
}

/// Wait until the server terminates.
pub async fn run(handle: ServerHandle) -> Result<(), Error> {
    let done = registry()
        .running(handle)
        .map(|running| running.done.clone())
        .ok_or(Error::InvalidHandle(handle))?;
    wait_done(done).await;
    Ok(())
}

/// Stop every running server. Returns how many were stopped.
pub async fn stop_all() -> usize {
    let handles = registry().live_handles();
    let mut stopped = 0;
    for handle in handles {
        // A server may terminate on its own between listing and stopping
        if stop(handle).await.is_ok() {
            stopped += 1;
        }
    }
    stopped
}

pub fn state(handle: ServerHandle) -> ServerState {
    registry().state(handle)
}

/// The address a running server is bound to.
pub fn local_addr(handle: ServerHandle) -> Result<SocketAddr, Error> {
    registry()
        .running(handle)
        .map(|running| running.local_addr)
        .ok_or(Error::InvalidHandle(handle))
}

async fn wait_done(mut done: watch::Receiver<bool>) {
    // An error means the serving task is gone, which is as done as it gets
    let _ = done.wait_for(|done| *done).await;
}
