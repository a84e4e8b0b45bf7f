//! Test app state builder for HTTP-level integration testing.
//!
//! `TestAppStateBuilder` creates an `AppState` backed by in-memory mocks. Pass
//! your own `Arc`s in to inspect them after the request.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        ports::notification::{EventLog, WorkflowTrigger},
        use_cases::subscription_sync::{PaymentRecordRepoTrait, SubscriptionSyncUseCases},
    },
    infra::{config::AppConfig, notification_dispatcher::NotificationDispatcher},
    test_utils::{InMemoryPaymentRecordRepo, RecordingEventLog, RecordingWorkflowTrigger},
};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://localhost/subscription_sync_test".to_string(),
        db_max_connections: 1,
        webhook_secret: SecretString::new(TEST_WEBHOOK_SECRET.into()),
        trust_proxy: false,
        event_log_url: None,
        event_log_service: "Payment Service".to_string(),
        workflow_engine_url: None,
        store_timeout: Duration::from_secs(5),
        notify_timeout: Duration::from_secs(5),
        max_concurrent_dispatches: 8,
        dispatch_queue_capacity: 64,
        dispatch_drain: Duration::from_secs(2),
        max_body_bytes: 1024 * 1024,
        log_file: "test.log".to_string(),
    }
}

pub struct TestAppStateBuilder {
    config: AppConfig,
    repo: Arc<dyn PaymentRecordRepoTrait>,
    event_log: Arc<dyn EventLog>,
    workflows: Arc<dyn WorkflowTrigger>,
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            config: test_config(),
            repo: Arc::new(InMemoryPaymentRecordRepo::new()),
            event_log: Arc::new(RecordingEventLog::new()),
            workflows: Arc::new(RecordingWorkflowTrigger::new()),
        }
    }

    pub fn with_repo(mut self, repo: Arc<dyn PaymentRecordRepoTrait>) -> Self {
        self.repo = repo;
        self
    }

    pub fn with_event_log(mut self, event_log: Arc<dyn EventLog>) -> Self {
        self.event_log = event_log;
        self
    }

    pub fn with_workflows(mut self, workflows: Arc<dyn WorkflowTrigger>) -> Self {
        self.workflows = workflows;
        self
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.config.max_body_bytes = limit;
        self
    }

    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.config.trust_proxy = trust_proxy;
        self
    }

    pub fn build(self) -> AppState {
        let sync_use_cases = SubscriptionSyncUseCases::new(self.repo, self.config.store_timeout);
        let dispatcher = NotificationDispatcher::new(
            self.event_log,
            self.workflows,
            self.config.event_log_service.clone(),
            self.config.max_concurrent_dispatches,
        )
        .with_queue_capacity(self.config.dispatch_queue_capacity);

        AppState {
            config: Arc::new(self.config),
            sync_use_cases: Arc::new(sync_use_cases),
            dispatcher: Arc::new(dispatcher),
        }
    }
}
