use axum::extract::{State, Json, Extension, Query};
use serde::Serialize;
use std::collections::HashMap;
use crate::AppState;
use crate::auth::middleware::UserId;
use crate::error::ApiError;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub username: String,
    pub role: String,
    pub tiv_balance: i64,
    pub usd_cents: i64,
    pub spin_streak: i32,
    pub verification_status: String,
    pub created_at: String,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub username: String,
    pub tiv_balance: i64,
    pub spin_streak: i32,
}

pub async fn get_me(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT username, role, tiv_balance, usd_cents, spin_streak,
               verification_status, created_at::text AS created_at
        FROM users WHERE id = $1
        "#,
    )
    .bind(user_id.0)
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(profile))
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let limit = params
        .get("limit")
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(10)
        .clamp(1, 100);

    let entries = sqlx::query_as::<_, LeaderboardEntry>(
        r#"
        SELECT username, tiv_balance, spin_streak
        FROM users
        WHERE role = 'earner'
        ORDER BY tiv_balance DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(entries))
}
