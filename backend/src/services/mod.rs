use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;
use crate::error::ApiError;

pub mod user_service;
pub mod spin_service;
pub mod campaign_service;
pub mod quiz_service;
pub mod marketplace_service;
pub mod pool_service;
pub mod verification_service;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn refused(message: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(message.into()) }
    }
}

pub async fn fetch_username(pool: &PgPool, user_id: Uuid) -> Result<String, ApiError> {
    let username = sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(username)
}

/// Appends a row to the transactions ledger inside an open transaction.
pub async fn record_transaction(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    amount: i64,
    currency: &str,
    kind: &str,
) -> Result<(), ApiError> {
    sqlx::query(
        "INSERT INTO transactions (user_id, amount, currency, kind) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id)
    .bind(amount)
    .bind(currency)
    .bind(kind)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
