use crate::{
    adapters::{
        event_log::{HttpEventLog, TracingEventLog},
        http::app_state::AppState,
        workflow::{HttpWorkflowTrigger, LoggingWorkflowTrigger},
    },
    application::{
        ports::notification::{EventLog, WorkflowTrigger},
        use_cases::subscription_sync::{PaymentRecordRepoTrait, SubscriptionSyncUseCases},
    },
    infra::{
        config::AppConfig, error::InfraError, http_client::build_client,
        notification_dispatcher::NotificationDispatcher, postgres_persistence,
    },
};
use std::fs::File;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let postgres_arc =
        Arc::new(postgres_persistence(&config.database_url, config.db_max_connections).await?);
    let payment_repo_arc = postgres_arc.clone() as Arc<dyn PaymentRecordRepoTrait>;

    let client = build_client(config.notify_timeout).map_err(InfraError::HttpClient)?;

    let event_log: Arc<dyn EventLog> = match &config.event_log_url {
        Some(url) => Arc::new(HttpEventLog::new(client.clone(), url)?),
        None => {
            warn!("EVENT_LOG_URL not set, event log entries are only traced");
            Arc::new(TracingEventLog)
        }
    };

    let workflows: Arc<dyn WorkflowTrigger> = match &config.workflow_engine_url {
        Some(url) => Arc::new(HttpWorkflowTrigger::new(client, url.clone())),
        None => {
            warn!("WORKFLOW_ENGINE_URL not set, subscriber notifications are only traced");
            Arc::new(LoggingWorkflowTrigger)
        }
    };

    let sync_use_cases = SubscriptionSyncUseCases::new(payment_repo_arc, config.store_timeout);

    let dispatcher = NotificationDispatcher::new(
        event_log,
        workflows,
        config.event_log_service.clone(),
        config.max_concurrent_dispatches,
    )
    .with_queue_capacity(config.dispatch_queue_capacity);

    Ok(AppState {
        config: Arc::new(config),
        sync_use_cases: Arc::new(sync_use_cases),
        dispatcher: Arc::new(dispatcher),
    })
}

pub fn init_tracing(log_file: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "subscription_sync=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs); console only if the file can't be created
    let json_layer = match File::create(log_file) {
        Ok(file) => Some(
            fmt::layer()
                .json()
                .with_writer(Arc::new(file))
                .with_current_span(true)
                .with_span_list(true),
        ),
        Err(e) => {
            eprintln!("cannot create log file {log_file}: {e}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
