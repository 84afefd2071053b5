//! linkshelf RPC server: JSON-RPC over stdin/stdout for a desktop or web shell.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.add", "params":{"url":"...","title":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use linkshelf::app::{default_db_path, App};
use linkshelf::logging::{self, LoggerConfig};
use linkshelf::rpc_handler::handle_method;
use linkshelf::services::settings_engine::{SettingsEngine, SettingsEngineTrait};

use serde_json::{json, Value};

const MAX_REQUESTS_PER_SECOND: u32 = 200;

/// Fixed one-second window limiter.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

fn respond(out: &mut impl Write, response: &Value) -> io::Result<()> {
    writeln!(out, "{}", response)?;
    out.flush()
}

fn configured_log_level() -> String {
    let mut engine = SettingsEngine::new(None);
    engine
        .load()
        .map(|s| s.logging.level)
        .unwrap_or_else(|_| "info".to_string())
}

fn main() -> ExitCode {
    let log_config = LoggerConfig { ansi: false, ..LoggerConfig::with_level(configured_log_level()) };
    if let Err(e) = logging::init(log_config) {
        eprintln!("failed to initialize logging: {}", e);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    let db_path = default_db_path();
    let app = match App::new(&db_path.to_string_lossy()) {
        Ok(app) => Mutex::new(app),
        Err(e) => {
            tracing::error!(db = %db_path.display(), error = %e, "failed to initialize linkshelf");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout().lock();
    let ready = json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")});
    if respond(&mut stdout, &ready).is_err() {
        return ExitCode::FAILURE;
    }

    let mut rate_limiter = RateLimiter::new(MAX_REQUESTS_PER_SECOND);

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(error = %e, "stdin closed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Err(e) => json!({"id": null, "error": format!("parse error: {}", e)}),
            Ok(req) => {
                let id = req.get("id").cloned().unwrap_or(Value::Null);
                if !rate_limiter.check() {
                    tracing::warn!("rate limit exceeded");
                    json!({"id": id, "error": "rate limit exceeded"})
                } else {
                    let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
                    let params = req.get("params").cloned().unwrap_or(json!({}));
                    tracing::debug!(method, "rpc request");

                    match runtime.block_on(handle_method(&app, method, &params)) {
                        Ok(val) => json!({"id": id, "result": val}),
                        Err(err) => {
                            tracing::debug!(method, error = %err, "rpc error");
                            json!({"id": id, "error": err})
                        }
                    }
                }
            }
        };

        if respond(&mut stdout, &response).is_err() {
            break;
        }
    }

    ExitCode::SUCCESS
}
