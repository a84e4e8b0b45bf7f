use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle event announced by the payment provider. Each kind has its own
/// webhook route under `/subscription`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionEventKind {
    Created,
    Updated,
    Cancelled,
    Resumed,
    Expired,
    Paused,
    Unpaused,
    PaymentFailed,
    PaymentSuccess,
    Recovered,
    Refunded,
    Changed,
}

impl SubscriptionEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Cancelled => "cancelled",
            Self::Resumed => "resumed",
            Self::Expired => "expired",
            Self::Paused => "paused",
            Self::Unpaused => "unpaused",
            Self::PaymentFailed => "payment_failed",
            Self::PaymentSuccess => "payment_success",
            Self::Recovered => "recovered",
            Self::Refunded => "refunded",
            Self::Changed => "changed",
        }
    }

    /// Path segment of the webhook route for this kind.
    pub fn route_segment(&self) -> &'static str {
        match self {
            Self::PaymentFailed => "failed",
            Self::PaymentSuccess => "success",
            other => other.as_str(),
        }
    }

    pub fn all() -> &'static [SubscriptionEventKind] {
        &[
            Self::Created,
            Self::Updated,
            Self::Cancelled,
            Self::Resumed,
            Self::Expired,
            Self::Paused,
            Self::Unpaused,
            Self::PaymentFailed,
            Self::PaymentSuccess,
            Self::Recovered,
            Self::Refunded,
            Self::Changed,
        ]
    }

    pub fn from_route_segment(segment: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.route_segment() == segment)
    }
}

impl fmt::Display for SubscriptionEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown subscription event kind: {s}"))
    }
}

/// Canonical form of one webhook delivery. Built by the event parser and
/// consumed once by the reconciler; never persisted as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionEvent {
    pub subscription_id: String,
    pub kind: SubscriptionEventKind,
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
    /// Creation time as reported by the provider.
    pub created_at: DateTime<Utc>,
    /// Last update time as reported by the provider.
    pub updated_at: DateTime<Utc>,
}
