use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::{
    adapters::event_log::join_path,
    app_error::{AppError, AppResult},
    application::ports::notification::{
        RetryPolicy, SubscriptionWorkflowParams, WorkflowRequest, WorkflowTrigger,
    },
};

const RESPONSE_BODY_CAP: usize = 512;

#[derive(Serialize)]
struct StartWorkflowBody<'a> {
    workflow_id: &'a str,
    params: &'a SubscriptionWorkflowParams,
    retry_policy: &'a RetryPolicy,
}

/// Starts runs on the workflow engine via
/// `POST {base}/workflows/{name}/start`. Any 2xx counts as accepted.
#[derive(Clone)]
pub struct HttpWorkflowTrigger {
    client: Client,
    base_url: Url,
}

impl HttpWorkflowTrigger {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl WorkflowTrigger for HttpWorkflowTrigger {
    async fn trigger(&self, request: &WorkflowRequest) -> AppResult<()> {
        let endpoint = join_path(
            &self.base_url,
            &format!("workflows/{}/start", request.workflow),
        )?;
        let body = StartWorkflowBody {
            workflow_id: &request.workflow_id,
            params: &request.params,
            retry_policy: &request.retry_policy,
        };

        let response = self
            .client
            .post(endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::DispatchFailure(format!("workflow engine request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let snippet: String = text.chars().take(RESPONSE_BODY_CAP).collect();
        Err(AppError::DispatchFailure(format!(
            "workflow engine returned {status}: {snippet}"
        )))
    }
}

/// Used when no workflow engine is configured: records what would have been
/// started.
#[derive(Clone, Default)]
pub struct LoggingWorkflowTrigger;

#[async_trait]
impl WorkflowTrigger for LoggingWorkflowTrigger {
    async fn trigger(&self, request: &WorkflowRequest) -> AppResult<()> {
        tracing::info!(
            workflow = %request.workflow,
            workflow_id = %request.workflow_id,
            kind = %request.params.kind,
            email = %request.params.email,
            max_attempts = request.retry_policy.maximum_attempts,
            first_retry_secs = request.retry_policy.delay_for_attempt(1).as_secs_f64(),
            "Workflow engine not configured, skipping trigger"
        );
        Ok(())
    }
}
