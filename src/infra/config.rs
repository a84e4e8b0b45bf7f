use std::net::SocketAddr;
use std::time::Duration;

use env_helpers::get_env_default;
use secrecy::SecretString;
use url::Url;

use crate::infra::error::InfraError;

pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Shared secret for the `X-Signature` HMAC. Never empty.
    pub webhook_secret: SecretString,
    /// Whether to trust X-Forwarded-For headers when logging the caller's origin.
    /// SECURITY: Only enable this when the service sits behind a reverse proxy.
    pub trust_proxy: bool,
    /// Logger service base URL. Unset means event-log lines only go to tracing.
    pub event_log_url: Option<Url>,
    /// `service` field sent with every event-log line.
    pub event_log_service: String,
    /// Workflow engine base URL. Unset means workflow triggers are only logged.
    pub workflow_engine_url: Option<Url>,
    pub store_timeout: Duration,
    pub notify_timeout: Duration,
    pub max_concurrent_dispatches: usize,
    /// Pending notifications beyond this are dropped.
    pub dispatch_queue_capacity: usize,
    /// Grace period for in-flight notifications at shutdown.
    pub dispatch_drain: Duration,
    pub max_body_bytes: usize,
    pub log_file: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 80)));
        let database_url = required("DATABASE_URL")?;
        let db_max_connections: u32 = get_env_default("DB_MAX_CONNECTIONS", 5);
        let webhook_secret = SecretString::new(required("WEBHOOK_SECRET")?.into());
        // Default to false for security - must explicitly enable when behind a trusted proxy
        let trust_proxy: bool = get_env_default("TRUST_PROXY", false);
        let event_log_url = optional_url("EVENT_LOG_URL")?;
        let event_log_service: String =
            get_env_default("EVENT_LOG_SERVICE", "Payment Service".to_string());
        let workflow_engine_url = optional_url("WORKFLOW_ENGINE_URL")?;
        let store_timeout_secs: u64 = get_env_default("STORE_TIMEOUT_SECS", 5);
        let notify_timeout_secs: u64 = get_env_default("NOTIFY_TIMEOUT_SECS", 5);
        let max_concurrent_dispatches: usize = get_env_default("MAX_CONCURRENT_DISPATCHES", 32);
        let dispatch_queue_capacity: usize = get_env_default("DISPATCH_QUEUE_CAPACITY", 1024);
        let dispatch_drain_secs: u64 = get_env_default("DISPATCH_DRAIN_SECS", 10);
        let max_body_bytes: usize = get_env_default("MAX_BODY_BYTES", 1024 * 1024);
        let log_file: String = get_env_default("LOG_FILE", "app.log".to_string());

        Ok(Self {
            bind_addr,
            database_url,
            db_max_connections,
            webhook_secret,
            trust_proxy,
            event_log_url,
            event_log_service,
            workflow_engine_url,
            store_timeout: Duration::from_secs(store_timeout_secs),
            notify_timeout: Duration::from_secs(notify_timeout_secs),
            max_concurrent_dispatches: max_concurrent_dispatches.max(1),
            dispatch_queue_capacity,
            dispatch_drain: Duration::from_secs(dispatch_drain_secs),
            max_body_bytes,
            log_file,
        })
    }
}

/// Set and non-empty, otherwise a startup error.
fn required(var: &'static str) -> Result<String, InfraError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(InfraError::ConfigMissing { var }),
    }
}

fn optional_url(var: &'static str) -> Result<Option<Url>, InfraError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Url::parse(value.trim())
            .map(Some)
            .map_err(|_| InfraError::ConfigInvalid { var }),
        _ => Ok(None),
    }
}
