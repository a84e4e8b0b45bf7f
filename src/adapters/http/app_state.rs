use std::sync::Arc;

use crate::{
    application::use_cases::subscription_sync::SubscriptionSyncUseCases,
    infra::{config::AppConfig, notification_dispatcher::NotificationDispatcher},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sync_use_cases: Arc<SubscriptionSyncUseCases>,
    pub dispatcher: Arc<NotificationDispatcher>,
}
