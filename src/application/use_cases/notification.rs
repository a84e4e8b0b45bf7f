use crate::{
    app_error::AppError,
    application::{
        helpers::event_parsing::ParseError,
        ports::notification::{
            RetryPolicy, SUBSCRIPTION_WORKFLOW, SubscriptionWorkflowParams, WorkflowRequest,
        },
        use_cases::subscription_sync::ReconcileOutcome,
    },
    domain::entities::subscription_event::{SubscriptionEvent, SubscriptionEventKind},
};

/// Status reported to the subscriber when their event could not be applied.
pub const FAILED_STATUS: &str = "failed";

/// Work handed to the dispatcher after a webhook has been handled: one event
/// log line and, when the subscriber can be addressed, a workflow run.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub log_message: String,
    pub workflow: Option<WorkflowRequest>,
}

impl Notification {
    /// Event applied to the store.
    pub fn success(event: &SubscriptionEvent, outcome: ReconcileOutcome) -> Self {
        let kind = event.kind.as_str();
        let log_message = format!(
            "Subscription {kind} processed successfully (payment id {})",
            outcome.id()
        );

        // Redelivery of the same event maps to the same run on the engine side.
        let workflow_id = format!(
            "subscription-{}-{kind}-{}",
            event.subscription_id,
            event.updated_at.timestamp()
        );

        Self {
            log_message,
            workflow: Some(workflow_request(
                workflow_id,
                params(event, event.status.clone(), kind.to_string()),
            )),
        }
    }

    /// Event parsed but not applied. The subscriber is told unless the error
    /// is transient, in which case the provider redelivers.
    pub fn failure(event: &SubscriptionEvent, error: &AppError) -> Self {
        let kind = event.kind.as_str();
        let log_message = format!("Failed to process subscription {kind} event: {error}");
        if error.is_retryable() {
            return Self {
                log_message,
                workflow: None,
            };
        }

        let workflow_id = format!(
            "subscription-{}-failed_{kind}-{}",
            event.subscription_id,
            event.updated_at.timestamp()
        );

        Self {
            log_message,
            workflow: Some(workflow_request(
                workflow_id,
                params(event, FAILED_STATUS.to_string(), format!("failed_{kind}")),
            )),
        }
    }

    /// Body never became an event; there is nobody to address.
    pub fn parse_failure(kind: SubscriptionEventKind, error: &ParseError) -> Self {
        Self {
            log_message: format!("Failed to parse subscription {kind} event: {error}"),
            workflow: None,
        }
    }

    pub fn unauthorized(origin: &str) -> Self {
        Self {
            log_message: format!("Unauthorized webhook request from IP: {origin}"),
            workflow: None,
        }
    }
}

fn params(event: &SubscriptionEvent, status: String, kind: String) -> SubscriptionWorkflowParams {
    SubscriptionWorkflowParams {
        email: event.user_email.clone(),
        phone: None,
        name: event.user_name.clone(),
        status,
        product_name: event.product_name.clone(),
        variant_name: event.variant_name.clone(),
        kind,
    }
}

fn workflow_request(workflow_id: String, params: SubscriptionWorkflowParams) -> WorkflowRequest {
    WorkflowRequest {
        workflow: SUBSCRIPTION_WORKFLOW.to_string(),
        workflow_id,
        params,
        retry_policy: RetryPolicy::default(),
    }
}
