use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription_sync::{PaymentRecordInput, PaymentRecordRepoTrait},
    domain::entities::payment_record::PaymentRecord,
};

fn row_to_record(row: sqlx::postgres::PgRow) -> PaymentRecord {
    PaymentRecord {
        id: row.get("id"),
        subscription_id: row.get("subscription_id"),
        status: row.get("status"),
        customer_id: row.get("customer_id"),
        order_id: row.get("order_id"),
        variant_name: row.get("variant_name"),
        variant_id: row.get("variant_id"),
        product_id: row.get("product_id"),
        product_name: row.get("product_name"),
        card_brand: row.get("card_brand"),
        card_last_four: row.get("card_last_four"),
        user_name: row.get("user_name"),
        user_email: row.get("user_email"),
        renews_at: row.get("renews_at"),
        provider_created_at: row.get("provider_created_at"),
        provider_updated_at: row.get("provider_updated_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, subscription_id, status, customer_id, order_id, variant_name, variant_id,
    product_id, product_name, card_brand, card_last_four, user_name, user_email,
    renews_at, provider_created_at, provider_updated_at, created_at, updated_at
"#;

#[async_trait]
impl PaymentRecordRepoTrait for PostgresPersistence {
    async fn get_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> AppResult<Option<PaymentRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM payments WHERE subscription_id = $1",
            SELECT_COLS
        ))
        .bind(subscription_id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_record))
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<PaymentRecord>> {
        let row = sqlx::query(&format!("SELECT {} FROM payments WHERE id = $1", SELECT_COLS))
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_record))
    }

    async fn insert(&self, input: &PaymentRecordInput) -> AppResult<i64> {
        // No row back means the subscription id already exists.
        let id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO payments
                (subscription_id, status, customer_id, order_id, variant_name, variant_id,
                 product_id, product_name, card_brand, card_last_four, user_name, user_email,
                 renews_at, provider_created_at, provider_updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (subscription_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&input.subscription_id)
        .bind(&input.status)
        .bind(input.customer_id)
        .bind(input.order_id)
        .bind(&input.variant_name)
        .bind(input.variant_id)
        .bind(input.product_id)
        .bind(&input.product_name)
        .bind(&input.card_brand)
        .bind(&input.card_last_four)
        .bind(&input.user_name)
        .bind(&input.user_email)
        .bind(input.renews_at)
        .bind(input.provider_created_at)
        .bind(input.provider_updated_at)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;

        id.ok_or(AppError::StoreConflict)
    }

    async fn update(&self, id: i64, input: &PaymentRecordInput) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = $2, customer_id = $3, order_id = $4, variant_name = $5,
                variant_id = $6, product_id = $7, product_name = $8, card_brand = $9,
                card_last_four = $10, user_name = $11, user_email = $12, renews_at = $13,
                provider_created_at = $14, provider_updated_at = $15, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&input.status)
        .bind(input.customer_id)
        .bind(input.order_id)
        .bind(&input.variant_name)
        .bind(input.variant_id)
        .bind(input.product_id)
        .bind(&input.product_name)
        .bind(&input.card_brand)
        .bind(&input.card_last_four)
        .bind(&input.user_name)
        .bind(&input.user_email)
        .bind(input.renews_at)
        .bind(input.provider_created_at)
        .bind(input.provider_updated_at)
        .execute(self.pool())
        .await
        .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }
}
