//! HTTP client factory with consistent timeout configuration.
//!
//! Outbound calls to the event log and the workflow engine share one client
//! built here, so a stalled collaborator can never hold a dispatch task longer
//! than the configured deadline.

use reqwest::Client;
use std::time::Duration;

/// Default connect timeout (TCP handshake + TLS).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Build an HTTP client whose total request time is capped at `request_timeout`.
pub fn build_client(request_timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(request_timeout))
        .timeout(request_timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
}
