use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "file-logs")]
const DEFAULT_LOG_DIR: &str = "storage/logs";

/// Logs every request once on entry and once on completion, with the level
/// chosen by status class.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let request_id = uuid::Uuid::new_v4().to_string();

    info!(request_id = %request_id, method = %method, path = %path, "Incoming request");

    let response = next.run(req).await;
    let latency_ms = start.elapsed().as_millis();
    let status = response.status().as_u16();

    match status {
        400..=499 => warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms = %latency_ms,
            "Client error"
        ),
        500..=599 => error!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms = %latency_ms,
            "Server error"
        ),
        _ => info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status,
            latency_ms = %latency_ms,
            "Request completed"
        ),
    }

    response
}

fn console_filter() -> EnvFilter {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "edvisa={level},edvisa_auth={level},edvisa_db={level},edvisa_session={level},\
             edvisa_observability={level},tower_http=warn,hyper=warn,sqlx=warn"
        ))
    })
}

/// Installs the global subscriber.
///
/// Console output is filtered by `RUST_LOG`, falling back to `LOG_LEVEL`
/// (default `info`) for the edvisa crates. Fails if the log directory
/// cannot be created or a subscriber is already installed.
pub fn init_tracing() -> anyhow::Result<()> {
    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(console_filter());

    let registry = tracing_subscriber::registry().with(console_layer);

    #[cfg(feature = "file-logs")]
    {
        use tracing_appender::rolling::{RollingFileAppender, Rotation};

        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| anyhow::anyhow!("Failed to create log directory {}: {}", log_dir, e))?;

        let error_layer = fmt::layer()
            .with_writer(RollingFileAppender::new(Rotation::DAILY, &log_dir, "edvisa.log"))
            .with_target(false)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_filter(EnvFilter::new("error"));

        // Structured copy for log shippers.
        let json_layer = fmt::layer()
            .json()
            .with_writer(RollingFileAppender::new(Rotation::DAILY, &log_dir, "edvisa.json"))
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(EnvFilter::new("info"));

        registry.with(error_layer).with(json_layer).try_init()?;
        info!(log_dir = %log_dir, "Tracing initialized with file logging");
    }

    #[cfg(not(feature = "file-logs"))]
    {
        registry.try_init()?;
        info!("Tracing initialized (console only)");
    }

    Ok(())
}
