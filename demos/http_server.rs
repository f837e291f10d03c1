//! A server whose single handler keeps state between requests.
//!
//! Run with `RUST_LOG=info cargo run --example http_server` and stop with Ctrl+C.

use httpuv_rs::server::keys::PATH_INFO;
use httpuv_rs::{HandlerSet, ResponseRecord, RunMode, ServerConfig, Value};

/// Stands in for an interpreter: mutable state no two requests may touch at once.
#[derive(Default)]
struct Session {
    requests: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let handlers = HandlerSet::new(|session: &mut Session, req| {
        session.requests += 1;
        let path = req.get_str(PATH_INFO).unwrap_or("/");

        match path {
            // 1. Plain text built from text chunks
            "/" => Ok(Value::from(
                ResponseRecord::new(200)
                    .with_header("Content-Type", "text/plain")
                    .with_text(vec!["Hello from httpuv-rs, request #".to_string(), session.requests.to_string()]),
            )),

            // 2. The request record itself, as JSON
            "/echo" => Ok(Value::from(
                ResponseRecord::new(200)
                    .with_header("Content-Type", "application/json")
                    .with_bytes(req.to_json()?.into_bytes()),
            )),

            // 3. A response written as a JSON literal
            "/json" => Ok(Value::from_json(
                r#"{"status": 200, "headers": {"Content-Type": "text/plain"}, "body": ["from ", "json"]}"#,
            )?),

            // 4. Handler failure, reported to the client as a 500
            "/fail" => Err("this handler always fails".into()),

            _ => Ok(Value::from(ResponseRecord::new(404).with_text(["Not found: ", path]))),
        }
    });

    let config = ServerConfig {
        run_mode: RunMode::Blocking,
        handle_ctrl_c: true,
        ..ServerConfig::default()
    };

    println!("Starting server on http://127.0.0.1:8080");
    println!("  GET /      counting greeting");
    println!("  GET /echo  request record as JSON");
    println!("  GET /json  JSON response literal");
    println!("  GET /fail  handler failure");

    // Returns once Ctrl+C stopped the server
    httpuv_rs::start("127.0.0.1", 8080, handlers, config).await?;

    Ok(())
}
