use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use crate::application::ports::notification::{EventLog, EventLogEntry, WorkflowTrigger};
use crate::application::use_cases::notification::Notification;

#[derive(Default)]
pub struct DispatchStats {
    spawned: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchSnapshot {
    pub spawned: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl DispatchStats {
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            spawned: self.spawned.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Pending notifications (queued plus delivering) accepted before new ones
/// are dropped.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Runs notifications off the request path. Every task is tracked so shutdown
/// can wait for them. `slots` caps how many are pending at all, `permits`
/// how many talk to collaborators at once.
pub struct NotificationDispatcher {
    event_log: Arc<dyn EventLog>,
    workflows: Arc<dyn WorkflowTrigger>,
    service: String,
    tracker: TaskTracker,
    slots: Arc<Semaphore>,
    permits: Arc<Semaphore>,
    stats: Arc<DispatchStats>,
}

impl NotificationDispatcher {
    pub fn new(
        event_log: Arc<dyn EventLog>,
        workflows: Arc<dyn WorkflowTrigger>,
        service: String,
        max_concurrent: usize,
    ) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            event_log,
            workflows,
            service,
            tracker: TaskTracker::new(),
            slots: Arc::new(Semaphore::new(DEFAULT_QUEUE_CAPACITY.max(max_concurrent))),
            permits: Arc::new(Semaphore::new(max_concurrent)),
            stats: Arc::new(DispatchStats::default()),
        }
    }

    /// Replaces the pending-notification cap. Never below the concurrency
    /// limit.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        let capacity = capacity.max(self.permits.available_permits());
        self.slots = Arc::new(Semaphore::new(capacity));
        self
    }

    /// Returns immediately; the outcome only shows up in logs and stats. When
    /// the queue is full the notification is dropped and counted as failed.
    pub fn dispatch(&self, notification: Notification) {
        let Ok(slot) = Arc::clone(&self.slots).try_acquire_owned() else {
            warn!(
                in_flight = self.tracker.len(),
                message = %notification.log_message,
                "Notification queue full, dropping notification"
            );
            self.stats.failed.fetch_add(1, Ordering::Relaxed);
            return;
        };
        self.stats.spawned.fetch_add(1, Ordering::Relaxed);

        let event_log = Arc::clone(&self.event_log);
        let workflows = Arc::clone(&self.workflows);
        let service = self.service.clone();
        let permits = Arc::clone(&self.permits);
        let stats = Arc::clone(&self.stats);

        self.tracker.spawn(async move {
            let _slot = slot;
            let Ok(_permit) = permits.acquire_owned().await else {
                warn!("Dispatch semaphore closed, dropping notification");
                stats.failed.fetch_add(1, Ordering::Relaxed);
                return;
            };

            if deliver(event_log.as_ref(), workflows.as_ref(), &service, notification).await {
                stats.succeeded.fetch_add(1, Ordering::Relaxed);
            } else {
                stats.failed.fetch_add(1, Ordering::Relaxed);
            }
        });
    }

    /// Closes the tracker and waits up to `grace` for in-flight notifications.
    /// Returns whether everything finished.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        self.tracker.close();
        let drained = tokio::time::timeout(grace, self.tracker.wait())
            .await
            .is_ok();

        let stats = self.stats.snapshot();
        if drained {
            info!(
                spawned = stats.spawned,
                succeeded = stats.succeeded,
                failed = stats.failed,
                "Notification dispatcher drained"
            );
        } else {
            warn!(
                in_flight = self.tracker.len(),
                spawned = stats.spawned,
                succeeded = stats.succeeded,
                failed = stats.failed,
                grace_secs = grace.as_secs_f64(),
                "Notification dispatcher shutdown grace elapsed with tasks still running"
            );
        }
        drained
    }

    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    pub fn stats(&self) -> DispatchSnapshot {
        self.stats.snapshot()
    }
}

async fn deliver(
    event_log: &dyn EventLog,
    workflows: &dyn WorkflowTrigger,
    service: &str,
    notification: Notification,
) -> bool {
    let mut ok = publish(event_log, service, notification.log_message).await;

    if let Some(request) = notification.workflow {
        match workflows.trigger(&request).await {
            Ok(()) => {
                info!(
                    workflow = %request.workflow,
                    workflow_id = %request.workflow_id,
                    kind = %request.params.kind,
                    "Workflow triggered"
                );
            }
            Err(e) => {
                error!(
                    workflow = %request.workflow,
                    workflow_id = %request.workflow_id,
                    error = %e,
                    "Failed to trigger workflow"
                );
                publish(
                    event_log,
                    service,
                    format!(
                        "Failed to start {} {}: {e}",
                        request.workflow, request.workflow_id
                    ),
                )
                .await;
                ok = false;
            }
        }
    }

    ok
}

async fn publish(event_log: &dyn EventLog, service: &str, message: String) -> bool {
    let entry = EventLogEntry {
        service: service.to_string(),
        message,
    };
    match event_log.publish(&entry).await {
        Ok(()) => true,
        Err(e) => {
            error!(error = %e, message = %entry.message, "Failed to write event log entry");
            false
        }
    }
}
