pub mod event_log;
pub mod http;
pub mod persistence;
pub mod workflow;
