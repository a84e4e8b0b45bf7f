//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

use crate::domain::entities::subscription_event::{SubscriptionEvent, SubscriptionEventKind};

/// Example provider delivery for subscription `sub_42`.
pub fn sample_payload() -> Value {
    json!({
        "data": {
            "id": "sub_42",
            "attributes": {
                "customer_id": 7,
                "order_id": 99,
                "status": "active",
                "variant_name": "Pro",
                "variant_id": 1,
                "product_id": 10,
                "product_name": "Widget",
                "card_brand": "Visa",
                "card_last_four": "4242",
                "user_name": "Ann",
                "user_email": "ann@example.com",
                "renews_at": "2025-02-01T00:00:00Z",
                "created_at": "2025-01-01T00:00:00Z",
                "updated_at": "2025-01-01T00:00:00Z"
            }
        }
    })
}

/// Create a test event matching [`sample_payload`].
pub fn create_test_event(overrides: impl FnOnce(&mut SubscriptionEvent)) -> SubscriptionEvent {
    let mut event = SubscriptionEvent {
        subscription_id: "sub_42".to_string(),
        kind: SubscriptionEventKind::Created,
        status: "active".to_string(),
        customer_id: 7.0,
        order_id: 99.0,
        variant_name: "Pro".to_string(),
        variant_id: 1.0,
        product_id: 10.0,
        product_name: "Widget".to_string(),
        card_brand: "Visa".to_string(),
        card_last_four: "4242".to_string(),
        user_name: "Ann".to_string(),
        user_email: "ann@example.com".to_string(),
        renews_at: test_datetime(2025, 2, 1),
        created_at: test_datetime(2025, 1, 1),
        updated_at: test_datetime(2025, 1, 1),
    };
    overrides(&mut event);
    event
}

pub fn test_datetime(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}
