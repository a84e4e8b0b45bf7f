use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app_error::AppResult;

// ============================================================================
// Port Types
// ============================================================================

/// Name of the downstream workflow that sends the subscriber email and SMS.
pub const SUBSCRIPTION_WORKFLOW: &str = "SubscriptionWorkflow";

/// One line for the external event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub service: String,
    pub message: String,
}

/// Retry schedule the workflow engine applies to each notification step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub initial_interval_secs: u64,
    pub backoff_coefficient: f64,
    pub maximum_interval_secs: u64,
    pub maximum_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval_secs: 1,
            backoff_coefficient: 2.0,
            maximum_interval_secs: 60,
            maximum_attempts: 5,
        }
    }
}

impl RetryPolicy {
    /// Delay before the given retry (1-based), capped at the maximum interval.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1) as i32;
        let secs = self.initial_interval_secs as f64 * self.backoff_coefficient.powi(exp);
        Duration::from_secs_f64(secs.min(self.maximum_interval_secs as f64))
    }
}

/// Addressing and content for one subscriber notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionWorkflowParams {
    pub email: String,
    /// The provider payload carries no phone number; the SMS step is skipped
    /// when absent.
    pub phone: Option<String>,
    pub name: String,
    pub status: String,
    pub product_name: String,
    pub variant_name: String,
    /// Template selector, e.g. `created` or `failed_created`.
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRequest {
    pub workflow: String,
    /// Engine-side dedupe key.
    pub workflow_id: String,
    pub params: SubscriptionWorkflowParams,
    pub retry_policy: RetryPolicy,
}

// ============================================================================
// Port Traits
// ============================================================================

#[async_trait]
pub trait EventLog: Send + Sync {
    async fn publish(&self, entry: &EventLogEntry) -> AppResult<()>;
}

/// Starts a workflow run. `Ok` means the engine accepted the trigger, not that
/// the notification was delivered.
#[async_trait]
pub trait WorkflowTrigger: Send + Sync {
    async fn trigger(&self, request: &WorkflowRequest) -> AppResult<()>;
}
