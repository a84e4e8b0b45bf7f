use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::subscription_sync::{PaymentRecordInput, PaymentRecordRepoTrait},
    domain::entities::payment_record::PaymentRecord,
};

// ============================================================================
// InMemoryPaymentRecordRepo
// ============================================================================

/// Keyed by subscription id, matching the Postgres UNIQUE constraint.
#[derive(Default)]
pub struct InMemoryPaymentRecordRepo {
    pub records: Mutex<HashMap<String, PaymentRecord>>,
    next_id: AtomicI64,
    inserts: AtomicUsize,
    updates: AtomicUsize,
    lookups: AtomicUsize,
    hidden_lookups: AtomicUsize,
}

impl InMemoryPaymentRecordRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, subscription_id: &str) -> Option<PaymentRecord> {
        self.records.lock().unwrap().get(subscription_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Successful inserts plus successful updates.
    pub fn mutation_count(&self) -> usize {
        self.insert_count() + self.updates.load(Ordering::SeqCst)
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// The next `n` lookups by subscription id report no row, as if another
    /// writer had not committed yet.
    pub fn hide_next_lookups(&self, n: usize) {
        self.hidden_lookups.store(n, Ordering::SeqCst);
    }

    fn apply(record: &mut PaymentRecord, input: &PaymentRecordInput) {
        record.status = input.status.clone();
        record.customer_id = input.customer_id;
        record.order_id = input.order_id;
        record.variant_name = input.variant_name.clone();
        record.variant_id = input.variant_id;
        record.product_id = input.product_id;
        record.product_name = input.product_name.clone();
        record.card_brand = input.card_brand.clone();
        record.card_last_four = input.card_last_four.clone();
        record.user_name = input.user_name.clone();
        record.user_email = input.user_email.clone();
        record.renews_at = input.renews_at;
        record.provider_created_at = input.provider_created_at;
        record.provider_updated_at = input.provider_updated_at;
    }
}

#[async_trait]
impl PaymentRecordRepoTrait for InMemoryPaymentRecordRepo {
    async fn get_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> AppResult<Option<PaymentRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let hidden = self
            .hidden_lookups
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if hidden {
            return Ok(None);
        }
        Ok(self.get(subscription_id))
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<PaymentRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .values()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn insert(&self, input: &PaymentRecordInput) -> AppResult<i64> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(&input.subscription_id) {
            return Err(AppError::StoreConflict);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let mut record = PaymentRecord {
            id,
            subscription_id: input.subscription_id.clone(),
            status: String::new(),
            customer_id: 0.0,
            order_id: 0.0,
            variant_name: String::new(),
            variant_id: 0.0,
            product_id: 0.0,
            product_name: String::new(),
            card_brand: String::new(),
            card_last_four: String::new(),
            user_name: String::new(),
            user_email: String::new(),
            renews_at: input.renews_at,
            provider_created_at: input.provider_created_at,
            provider_updated_at: input.provider_updated_at,
            created_at: now,
            updated_at: now,
        };
        Self::apply(&mut record, input);
        records.insert(input.subscription_id.clone(), record);
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn update(&self, id: i64, input: &PaymentRecordInput) -> AppResult<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .values_mut()
            .find(|r| r.id == id)
            .ok_or(AppError::NotFound)?;
        Self::apply(record, input);
        record.updated_at = Utc::now();
        self.updates.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Failure stubs
// ============================================================================

/// Every call fails as if the database were down.
pub struct UnavailablePaymentRecordRepo;

#[async_trait]
impl PaymentRecordRepoTrait for UnavailablePaymentRecordRepo {
    async fn get_by_subscription_id(
        &self,
        _subscription_id: &str,
    ) -> AppResult<Option<PaymentRecord>> {
        Err(AppError::StoreUnavailable("connection refused".into()))
    }

    async fn get_by_id(&self, _id: i64) -> AppResult<Option<PaymentRecord>> {
        Err(AppError::StoreUnavailable("connection refused".into()))
    }

    async fn insert(&self, _input: &PaymentRecordInput) -> AppResult<i64> {
        Err(AppError::StoreUnavailable("connection refused".into()))
    }

    async fn update(&self, _id: i64, _input: &PaymentRecordInput) -> AppResult<()> {
        Err(AppError::StoreUnavailable("connection refused".into()))
    }
}

/// Every call hangs, for exercising store deadlines.
pub struct StallingPaymentRecordRepo;

const STALL: Duration = Duration::from_secs(3600);

#[async_trait]
impl PaymentRecordRepoTrait for StallingPaymentRecordRepo {
    async fn get_by_subscription_id(
        &self,
        _subscription_id: &str,
    ) -> AppResult<Option<PaymentRecord>> {
        tokio::time::sleep(STALL).await;
        Ok(None)
    }

    async fn get_by_id(&self, _id: i64) -> AppResult<Option<PaymentRecord>> {
        tokio::time::sleep(STALL).await;
        Ok(None)
    }

    async fn insert(&self, _input: &PaymentRecordInput) -> AppResult<i64> {
        tokio::time::sleep(STALL).await;
        Ok(0)
    }

    async fn update(&self, _id: i64, _input: &PaymentRecordInput) -> AppResult<()> {
        tokio::time::sleep(STALL).await;
        Ok(())
    }
}
