pub mod app;
pub mod appointments;
pub mod auth;
pub mod clinic;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod state;
pub mod users;
pub mod validation;

#[cfg(test)]
mod test_support;

/// Installs the global tracing subscriber. `LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "hospital=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}
