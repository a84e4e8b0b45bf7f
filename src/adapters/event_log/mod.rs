use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::notification::{EventLog, EventLogEntry},
};

/// Posts entries to the logger service at `{base}/write-log`.
#[derive(Clone)]
pub struct HttpEventLog {
    client: Client,
    endpoint: Url,
}

impl HttpEventLog {
    pub fn new(client: Client, base_url: &Url) -> AppResult<Self> {
        let endpoint = join_path(base_url, "write-log")?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl EventLog for HttpEventLog {
    async fn publish(&self, entry: &EventLogEntry) -> AppResult<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(entry)
            .send()
            .await
            .map_err(|e| AppError::DispatchFailure(format!("event log request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::DispatchFailure(format!(
                "event log returned {status}"
            )));
        }
        Ok(())
    }
}

/// Used when no logger service is configured.
#[derive(Clone, Default)]
pub struct TracingEventLog;

#[async_trait]
impl EventLog for TracingEventLog {
    async fn publish(&self, entry: &EventLogEntry) -> AppResult<()> {
        tracing::info!(service = %entry.service, message = %entry.message, "Event log");
        Ok(())
    }
}

/// Appends `path` to the base URL's path, keeping any prefix the base carries.
pub(crate) fn join_path(base: &Url, path: &str) -> AppResult<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path)
        .map_err(|e| AppError::Internal(format!("invalid collaborator URL: {e}")))
}
