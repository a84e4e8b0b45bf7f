use chrono::{DateTime, Utc};
use serde::Serialize;

/// Durable mirror of a provider subscription, one row per external
/// subscription id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRecord {
    /// Assigned by the store on first insert; never changes afterwards.
    pub id: i64,
    /// External subscription id, unique across the table.
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
