use axum::extract::{State, Json, Extension, Path};
use uuid::Uuid;
use validator::Validate;
use tracing::info;
use shared::pool::*;
use crate::AppState;
use crate::auth::middleware::UserId;
use crate::error::ApiError;
use super::record_transaction;

#[derive(Debug, sqlx::FromRow)]
struct PoolRow {
    id: Uuid,
    name: String,
    target_tiv: i64,
    contributed_tiv: i64,
    status: String,
    contributor_count: i64,
}

pub async fn get_pools(
    State(state): State<AppState>,
) -> Result<Json<Vec<PoolSummary>>, ApiError> {
    let rows = sqlx::query_as::<_, PoolRow>(
        r#"
        SELECT p.id, p.name, p.target_tiv, p.contributed_tiv, p.status,
               (SELECT COUNT(DISTINCT c.user_id) FROM pool_contributions c WHERE c.pool_id = p.id) AS contributor_count
        FROM pools p
        ORDER BY p.created_at DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(rows
        .into_iter()
        .map(|row| PoolSummary {
            id: row.id.to_string(),
            name: row.name,
            target_tiv: row.target_tiv,
            contributed_tiv: row.contributed_tiv,
            status: row.status,
            contributor_count: row.contributor_count,
        })
        .collect()))
}

pub async fn join_pool(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(pool_id): Path<Uuid>,
    Json(payload): Json<JoinPoolRequest>,
) -> Result<Json<JoinPoolResponse>, ApiError> {
    payload.validate()?;

    let mut tx = state.pool.begin().await?;

    #[derive(sqlx::FromRow)]
    struct PoolLock {
        name: String,
        target_tiv: i64,
        contributed_tiv: i64,
        status: String,
    }

    let pool = sqlx::query_as::<_, PoolLock>(
        "SELECT name, target_tiv, contributed_tiv, status FROM pools WHERE id = $1 FOR UPDATE",
    )
    .bind(pool_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::NotFound("Pool not found"))?;

    if pool.status != "open" {
        return Ok(Json(JoinPoolResponse {
            success: false,
            contributed_tiv: pool.contributed_tiv,
            pool_status: pool.status,
            new_tiv_balance: 0,
            message: Some("This pool is already fully funded".to_string()),
        }));
    }

    #[derive(sqlx::FromRow)]
    struct Contributor {
        username: String,
        tiv_balance: i64,
    }

    let contributor = sqlx::query_as::<_, Contributor>(
        "SELECT username, tiv_balance FROM users WHERE id = $1 FOR UPDATE",
    )
    .bind(user_id.0)
    .fetch_one(&mut *tx)
    .await?;

    if contributor.tiv_balance < payload.amount_tiv {
        return Ok(Json(JoinPoolResponse {
            success: false,
            contributed_tiv: pool.contributed_tiv,
            pool_status: pool.status,
            new_tiv_balance: contributor.tiv_balance,
            message: Some("Insufficient TIV balance".to_string()),
        }));
    }

    let new_tiv_balance = contributor.tiv_balance - payload.amount_tiv;
    sqlx::query("UPDATE users SET tiv_balance = $1 WHERE id = $2")
        .bind(new_tiv_balance)
        .bind(user_id.0)
        .execute(&mut *tx)
        .await?;

    sqlx::query(
        "INSERT INTO pool_contributions (pool_id, user_id, amount_tiv) VALUES ($1, $2, $3)",
    )
    .bind(pool_id)
    .bind(user_id.0)
    .bind(payload.amount_tiv)
    .execute(&mut *tx)
    .await?;

    let contributed_tiv = pool.contributed_tiv + payload.amount_tiv;
    let pool_status = if contributed_tiv >= pool.target_tiv { "funded" } else { "open" };

    sqlx::query("UPDATE pools SET contributed_tiv = $1, status = $2 WHERE id = $3")
        .bind(contributed_tiv)
        .bind(pool_status)
        .bind(pool_id)
        .execute(&mut *tx)
        .await?;

    record_transaction(&mut tx, user_id.0, -payload.amount_tiv, "tiv", "pool_contribution").await?;

    tx.commit().await?;

    info!("🏦 {} contributed {} TIV to pool \"{}\" ({}/{})",
          contributor.username, payload.amount_tiv, pool.name, contributed_tiv, pool.target_tiv);

    Ok(Json(JoinPoolResponse {
        success: true,
        contributed_tiv,
        pool_status: pool_status.to_string(),
        new_tiv_balance,
        message: Some(format!("Contributed {} TIV to {}", payload.amount_tiv, pool.name)),
    }))
}
