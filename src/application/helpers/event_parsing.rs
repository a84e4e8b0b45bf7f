//! Strict decoding of provider webhook envelopes.
//!
//! The provider sends `{ "data": { "id": ..., "attributes": { ... } } }`. Every
//! field is required and must carry the expected JSON type; the first field
//! that does not yields a [`ParseError::SchemaMismatch`] naming its dotted
//! path, e.g. `data.attributes.renews_at`.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    app_error::AppError,
    domain::entities::subscription_event::{SubscriptionEvent, SubscriptionEventKind},
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("field {field} is missing or is not {expected}")]
    SchemaMismatch {
        field: String,
        expected: &'static str,
    },
}

impl ParseError {
    /// Dotted path of the offending field, `$` for a body that is not JSON.
    pub fn field(&self) -> &str {
        match self {
            ParseError::InvalidJson(_) => "$",
            ParseError::SchemaMismatch { field, .. } => field,
        }
    }
}

impl From<ParseError> for AppError {
    fn from(err: ParseError) -> Self {
        AppError::SchemaMismatch {
            field: err.field().to_string(),
        }
    }
}

/// Typed view over one JSON object that remembers where it sits in the
/// document, so errors can report the full path.
struct Fields<'a> {
    path: String,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn root(value: &'a Value) -> Result<Self, ParseError> {
        match value {
            Value::Object(map) => Ok(Self {
                path: String::new(),
                map,
            }),
            _ => Err(mismatch("$", "an object")),
        }
    }

    fn child_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    fn object(&self, key: &str) -> Result<Fields<'a>, ParseError> {
        let path = self.child_path(key);
        match self.map.get(key) {
            Some(Value::Object(map)) => Ok(Fields { path, map }),
            _ => Err(mismatch(&path, "an object")),
        }
    }

    fn string(&self, key: &str) -> Result<String, ParseError> {
        match self.map.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(mismatch(&self.child_path(key), "a string")),
        }
    }

    fn number(&self, key: &str) -> Result<f64, ParseError> {
        match self.map.get(key).and_then(Value::as_f64) {
            Some(n) => Ok(n),
            None => Err(mismatch(&self.child_path(key), "a number")),
        }
    }

    fn timestamp(&self, key: &str) -> Result<DateTime<Utc>, ParseError> {
        let raw = match self.map.get(key) {
            Some(Value::String(s)) => s,
            _ => return Err(mismatch(&self.child_path(key), "an RFC 3339 timestamp")),
        };
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| mismatch(&self.child_path(key), "an RFC 3339 timestamp"))
    }
}

fn mismatch(field: &str, expected: &'static str) -> ParseError {
    ParseError::SchemaMismatch {
        field: field.to_string(),
        expected,
    }
}

/// Decode a raw webhook body into a [`SubscriptionEvent`] of the given kind.
pub fn parse_subscription_event(
    body: &[u8],
    kind: SubscriptionEventKind,
) -> Result<SubscriptionEvent, ParseError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let root = Fields::root(&value)?;
    let data = root.object("data")?;
    let subscription_id = data.string("id")?;
    let attrs = data.object("attributes")?;

    Ok(SubscriptionEvent {
        subscription_id,
        kind,
        status: attrs.string("status")?,
        customer_id: attrs.number("customer_id")?,
        order_id: attrs.number("order_id")?,
        variant_name: attrs.string("variant_name")?,
        variant_id: attrs.number("variant_id")?,
        product_id: attrs.number("product_id")?,
        product_name: attrs.string("product_name")?,
        card_brand: attrs.string("card_brand")?,
        card_last_four: attrs.string("card_last_four")?,
        user_name: attrs.string("user_name")?,
        user_email: attrs.string("user_email")?,
        renews_at: attrs.timestamp("renews_at")?,
        created_at: attrs.timestamp("created_at")?,
        updated_at: attrs.timestamp("updated_at")?,
    })
}
