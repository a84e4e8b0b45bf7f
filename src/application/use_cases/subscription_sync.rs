use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::app_error::{AppError, AppResult};
use crate::application::helpers::keyed_lock::KeyedLocks;
use crate::application::validators::{is_valid_card_last_four, is_valid_email};
use crate::domain::entities::payment_record::PaymentRecord;
use crate::domain::entities::subscription_event::SubscriptionEvent;

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait PaymentRecordRepoTrait: Send + Sync {
    async fn get_by_subscription_id(&self, subscription_id: &str)
    -> AppResult<Option<PaymentRecord>>;

    async fn get_by_id(&self, id: i64) -> AppResult<Option<PaymentRecord>>;

    /// Creates the row and returns its id. Fails with `StoreConflict` when a
    /// row for the same subscription id already exists.
    async fn insert(&self, input: &PaymentRecordInput) -> AppResult<i64>;

    /// Overwrites every mirrored field. Fails with `NotFound` when no row has
    /// this id.
    async fn update(&self, id: i64, input: &PaymentRecordInput) -> AppResult<()>;
}

// ============================================================================
// Input / Output Types
// ============================================================================

/// Fields written on every insert or update.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRecordInput {
    pub subscription_id: String,
    pub status: String,
    pub customer_id: f64,
    pub order_id: f64,
    pub variant_name: String,
    pub variant_id: f64,
    pub product_id: f64,
    pub product_name: String,
    pub card_brand: String,
    pub card_last_four: String,
    pub user_name: String,
    pub user_email: String,
    pub renews_at: DateTime<Utc>,
    pub provider_created_at: DateTime<Utc>,
    pub provider_updated_at: DateTime<Utc>,
}

impl From<&SubscriptionEvent> for PaymentRecordInput {
    fn from(event: &SubscriptionEvent) -> Self {
        Self {
            subscription_id: event.subscription_id.clone(),
            status: event.status.clone(),
            customer_id: event.customer_id,
            order_id: event.order_id,
            variant_name: event.variant_name.clone(),
            variant_id: event.variant_id,
            product_id: event.product_id,
            product_name: event.product_name.clone(),
            card_brand: event.card_brand.clone(),
            card_last_four: event.card_last_four.clone(),
            user_name: event.user_name.clone(),
            user_email: event.user_email.trim().to_string(),
            renews_at: event.renews_at,
            provider_created_at: event.created_at,
            provider_updated_at: event.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created(i64),
    Updated(i64),
}

impl ReconcileOutcome {
    pub fn id(&self) -> i64 {
        match self {
            ReconcileOutcome::Created(id) | ReconcileOutcome::Updated(id) => *id,
        }
    }
}

// ============================================================================
// Use Cases
// ============================================================================

pub struct SubscriptionSyncUseCases {
    repo: Arc<dyn PaymentRecordRepoTrait>,
    locks: KeyedLocks,
    store_timeout: Duration,
}

impl SubscriptionSyncUseCases {
    pub fn new(repo: Arc<dyn PaymentRecordRepoTrait>, store_timeout: Duration) -> Self {
        Self {
            repo,
            locks: KeyedLocks::new(),
            store_timeout,
        }
    }

    /// Apply one event to the store: insert on first sight of the
    /// subscription id, full overwrite afterwards. Waiting for the
    /// subscription's lock and every store call share one deadline.
    pub async fn reconcile(&self, event: &SubscriptionEvent) -> AppResult<ReconcileOutcome> {
        validate_event(event)?;

        let deadline = Instant::now() + self.store_timeout;
        let _guard = self
            .bounded("lock wait", deadline, async {
                Ok::<_, AppError>(self.locks.lock(&event.subscription_id).await)
            })
            .await?;
        let input = PaymentRecordInput::from(event);

        let existing = self
            .bounded(
                "lookup",
                deadline,
                self.repo.get_by_subscription_id(&input.subscription_id),
            )
            .await?;

        if let Some(record) = existing {
            self.bounded("update", deadline, self.repo.update(record.id, &input))
                .await?;
            return Ok(ReconcileOutcome::Updated(record.id));
        }

        match self
            .bounded("insert", deadline, self.repo.insert(&input))
            .await
        {
            Ok(id) => {
                tracing::info!(
                    subscription_id = %input.subscription_id,
                    payment_id = id,
                    "Payment record created"
                );
                Ok(ReconcileOutcome::Created(id))
            }
            Err(AppError::StoreConflict) => {
                // Another process created the row between lookup and insert.
                tracing::warn!(
                    subscription_id = %input.subscription_id,
                    "Insert conflicted, retrying as update"
                );
                let record = self
                    .bounded(
                        "lookup",
                        deadline,
                        self.repo.get_by_subscription_id(&input.subscription_id),
                    )
                    .await?
                    .ok_or(AppError::StoreConflict)?;
                self.bounded("update", deadline, self.repo.update(record.id, &input))
                    .await?;
                Ok(ReconcileOutcome::Updated(record.id))
            }
            Err(e) => Err(e),
        }
    }

    async fn bounded<T>(
        &self,
        op: &'static str,
        deadline: Instant,
        fut: impl Future<Output = AppResult<T>>,
    ) -> AppResult<T> {
        tokio::time::timeout_at(deadline, fut)
            .await
            .map_err(|_| {
                AppError::StoreUnavailable(format!(
                    "{op} timed out after {}ms",
                    self.store_timeout.as_millis()
                ))
            })?
    }
}

/// Column widths of the `payments` table, in characters.
const MAX_TEXT_LEN: usize = 255;
const MAX_SHORT_TEXT_LEN: usize = 50;

/// Business rules checked before anything touches the store.
pub fn validate_event(event: &SubscriptionEvent) -> AppResult<()> {
    let widths = [
        ("subscription id", &event.subscription_id, MAX_TEXT_LEN),
        ("status", &event.status, MAX_SHORT_TEXT_LEN),
        ("variant name", &event.variant_name, MAX_TEXT_LEN),
        ("product name", &event.product_name, MAX_TEXT_LEN),
        ("card brand", &event.card_brand, MAX_SHORT_TEXT_LEN),
        ("user name", &event.user_name, MAX_TEXT_LEN),
        ("user email", &event.user_email, MAX_TEXT_LEN),
    ];
    for (name, value, max) in widths {
        if value.chars().count() > max {
            return Err(AppError::ValidationFailure(format!(
                "{name} is longer than {max} characters"
            )));
        }
    }

    if event.subscription_id.trim().is_empty() {
        return Err(AppError::ValidationFailure(
            "subscription id is empty".into(),
        ));
    }
    if event.user_name.trim().is_empty() {
        return Err(AppError::ValidationFailure("user name is empty".into()));
    }
    if !is_valid_email(&event.user_email) {
        return Err(AppError::ValidationFailure(format!(
            "invalid user email: {}",
            event.user_email
        )));
    }
    if !event.card_last_four.is_empty() && !is_valid_card_last_four(&event.card_last_four) {
        return Err(AppError::ValidationFailure(
            "card last four must be exactly four digits".into(),
        ));
    }
    if event.renews_at < event.created_at {
        return Err(AppError::ValidationFailure(format!(
            "renews_at ({}) precedes created_at ({})",
            event.renews_at.to_rfc3339(),
            event.created_at.to_rfc3339()
        )));
    }
    Ok(())
}
