//! Operations the adapter does not provide.
//!
//! Embedders expect the full httpuv-style surface to exist. Each entry point
//! here fails immediately with [`Error::NotImplemented`] and touches nothing.

use crate::server::error::Error;
use crate::server::lifecycle::ServerHandle;
use crate::value::Value;

pub fn send_ws_message(_connection: &str, _binary: bool, _message: &[u8]) -> Result<(), Error> {
    Err(Error::NotImplemented("send_ws_message"))
}

pub fn close_ws(_connection: &str, _code: u16, _reason: &str) -> Result<(), Error> {
    Err(Error::NotImplemented("close_ws"))
}

/// Servers listening on a Unix domain socket or named pipe.
pub fn make_pipe_server(_name: &str, _mask: u32) -> Result<ServerHandle, Error> {
    Err(Error::NotImplemented("make_pipe_server"))
}

pub fn encode_uri(_value: &str) -> Result<String, Error> {
    Err(Error::NotImplemented("encode_uri"))
}

pub fn encode_uri_component(_value: &str) -> Result<String, Error> {
    Err(Error::NotImplemented("encode_uri_component"))
}

pub fn decode_uri(_value: &str) -> Result<String, Error> {
    Err(Error::NotImplemented("decode_uri"))
}

pub fn decode_uri_component(_value: &str) -> Result<String, Error> {
    Err(Error::NotImplemented("decode_uri_component"))
}

pub fn base64_encode(_input: &[u8]) -> Result<String, Error> {
    Err(Error::NotImplemented("base64_encode"))
}

pub fn daemonize(_handle: ServerHandle) -> Result<(), Error> {
    Err(Error::NotImplemented("daemonize"))
}

pub fn destroy_daemonized_server(_handle: ServerHandle) -> Result<(), Error> {
    Err(Error::NotImplemented("destroy_daemonized_server"))
}

pub fn get_rng_state() -> Result<Value, Error> {
    Err(Error::NotImplemented("get_rng_state"))
}

/// Invoke a callback registered on the other side of the embedding boundary.
pub fn invoke_callback(_callback: &str, _args: Value) -> Result<Value, Error> {
    Err(Error::NotImplemented("invoke_callback"))
}

pub fn stop_loop() -> Result<(), Error> {
    Err(Error::NotImplemented("stop_loop"))
}
