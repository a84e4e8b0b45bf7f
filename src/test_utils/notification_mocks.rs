use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::notification::{
        EventLog, EventLogEntry, WorkflowRequest, WorkflowTrigger,
    },
};

// ============================================================================
// Event log
// ============================================================================

#[derive(Default)]
pub struct RecordingEventLog {
    entries: Mutex<Vec<EventLogEntry>>,
}

impl RecordingEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<EventLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventLog for RecordingEventLog {
    async fn publish(&self, entry: &EventLogEntry) -> AppResult<()> {
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }
}

pub struct FailingEventLog;

#[async_trait]
impl EventLog for FailingEventLog {
    async fn publish(&self, _entry: &EventLogEntry) -> AppResult<()> {
        Err(AppError::DispatchFailure("logger service unavailable".into()))
    }
}

// ============================================================================
// Workflow trigger
// ============================================================================

#[derive(Default)]
pub struct RecordingWorkflowTrigger {
    requests: Mutex<Vec<WorkflowRequest>>,
}

impl RecordingWorkflowTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<WorkflowRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkflowTrigger for RecordingWorkflowTrigger {
    async fn trigger(&self, request: &WorkflowRequest) -> AppResult<()> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(())
    }
}

pub struct FailingWorkflowTrigger;

#[async_trait]
impl WorkflowTrigger for FailingWorkflowTrigger {
    async fn trigger(&self, _request: &WorkflowRequest) -> AppResult<()> {
        Err(AppError::DispatchFailure("workflow engine unavailable".into()))
    }
}
