use axum::{
    routing::{get, post},
    Router,
    Json,
    extract::{State, Extension},
};
use rand::Rng;
use rand::rngs::OsRng;
use shared::spin_wheel::*;
use crate::AppState;
use crate::auth::middleware::UserId;
use crate::error::ApiError;
use super::record_transaction;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", post(spin_wheel))
        .route("/status", get(get_spin_status))
        .route("/history", get(get_spin_history))
        .layer(axum::middleware::from_fn(crate::auth::middleware::require_auth))
}

#[derive(Debug, sqlx::FromRow)]
struct SpinUser {
    username: String,
    tiv_balance: i64,
    usd_cents: i64,
    spin_streak: i32,
}

/// Age in seconds of the user's newest spin record. `None` means the user
/// has never spun.
async fn seconds_since_last_spin<'e, E>(executor: E, user_id: uuid::Uuid) -> Result<Option<i64>, ApiError>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    let age = sqlx::query_scalar::<_, Option<i64>>(
        "SELECT EXTRACT(EPOCH FROM (NOW() - MAX(created_at)))::BIGINT FROM spin_records WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(executor)
    .await?;
    Ok(age)
}

fn cooldown_key(user_id: uuid::Uuid) -> String {
    format!("spin_cooldown:{}", user_id)
}

async fn spin_wheel(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(_request): Json<SpinRequest>,
) -> Result<Json<SpinResponse>, ApiError> {
    let mut redis_conn = state.redis.get_async_connection().await?;

    // Fast path: the Redis key set at the end of the previous spin.
    let ttl: i64 = redis::cmd("TTL")
        .arg(cooldown_key(user_id.0))
        .query_async(&mut redis_conn)
        .await?;
    if ttl > 0 {
        return Err(ApiError::Cooldown { seconds: ttl });
    }

    // Authoritative check against the newest spin record; Redis may have
    // been flushed.
    let age = seconds_since_last_spin(&state.pool, user_id.0).await?;
    let remaining = cooldown_remaining(age);
    if remaining > 0 {
        return Err(ApiError::Cooldown { seconds: remaining });
    }

    let mut tx = state.pool.begin().await?;

    let user = sqlx::query_as::<_, SpinUser>(
        "SELECT username, tiv_balance, usd_cents, spin_streak FROM users WHERE id = $1 FOR UPDATE",
    )
    .bind(user_id.0)
    .fetch_one(&mut *tx)
    .await?;

    // Consecutive-day streak: a spin within the reset window extends it,
    // anything later starts over at 1.
    let new_streak = match age {
        Some(age) if age <= STREAK_RESET_SECS => user.spin_streak + 1,
        _ => 1,
    };

    let mut rng = OsRng;
    let base_reward = rng.gen_range(BASE_REWARD_MIN..=BASE_REWARD_MAX);
    let kind_roll: f64 = rng.gen_range(0.0..100.0);
    let reward_type = if kind_roll >= 85.0 { RewardKind::Usd } else { RewardKind::Tiv };

    let final_reward = apply_streak_bonus(base_reward, new_streak);
    let doubled = final_reward != base_reward;

    let (new_tiv_balance, new_usd_cents) = match reward_type {
        RewardKind::Tiv => (user.tiv_balance + final_reward, user.usd_cents),
        RewardKind::Usd => (user.tiv_balance, user.usd_cents + final_reward),
    };

    sqlx::query(
        "UPDATE users SET tiv_balance = $1, usd_cents = $2, spin_streak = $3 WHERE id = $4",
    )
    .bind(new_tiv_balance)
    .bind(new_usd_cents)
    .bind(new_streak)
    .bind(user_id.0)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO spin_records (user_id, base_reward, final_reward, reward_type) VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id.0)
    .bind(base_reward)
    .bind(final_reward)
    .bind(match reward_type {
        RewardKind::Tiv => "tiv",
        RewardKind::Usd => "usd",
    })
    .execute(&mut *tx)
    .await?;

    record_transaction(
        &mut tx,
        user_id.0,
        final_reward,
        match reward_type {
            RewardKind::Tiv => "tiv",
            RewardKind::Usd => "usd",
        },
        "spin",
    )
    .await?;

    tx.commit().await?;

    // The reward is committed; a Redis hiccup here must not fail the spin.
    // The DB check above stays authoritative either way.
    let _: () = redis::cmd("SETEX")
        .arg(cooldown_key(user_id.0))
        .arg(SPIN_COOLDOWN_SECS)
        .arg(1)
        .query_async(&mut redis_conn)
        .await
        .unwrap_or(());

    let message = if doubled {
        format!(
            "You won {} {}! {}",
            final_reward,
            reward_type.label(),
            shared::constants::DOUBLED_QUALIFIER
        )
    } else {
        format!("You won {} {}!", final_reward, reward_type.label())
    };

    if doubled {
        tracing::info!(
            "🎡 SPIN: {} won {} {} (base {}, streak {} doubled it)",
            user.username, final_reward, reward_type.label(), base_reward, new_streak
        );
    } else {
        tracing::info!(
            "🎡 SPIN: {} won {} {} (streak {})",
            user.username, final_reward, reward_type.label(), new_streak
        );
    }

    Ok(Json(SpinResponse {
        success: true,
        base_reward,
        final_reward,
        doubled,
        reward_type,
        streak: new_streak,
        new_tiv_balance,
        new_usd_cents,
        message: Some(message),
        cooldown_seconds: SPIN_COOLDOWN_SECS,
    }))
}

async fn get_spin_status(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<SpinStatusResponse>, ApiError> {
    let mut redis_conn = state.redis.get_async_connection().await?;

    let ttl: i64 = redis::cmd("TTL")
        .arg(cooldown_key(user_id.0))
        .query_async(&mut redis_conn)
        .await?;

    let mut cooldown_seconds = if ttl > 0 { ttl } else { 0 };

    // Redis lost the key: recompute from the spin history and put it back
    // so later lookups stay cheap.
    if cooldown_seconds == 0 {
        let age = seconds_since_last_spin(&state.pool, user_id.0).await?;
        cooldown_seconds = cooldown_remaining(age);
        if cooldown_seconds > 0 {
            let _: () = redis::cmd("SETEX")
                .arg(cooldown_key(user_id.0))
                .arg(cooldown_seconds)
                .arg(1)
                .query_async(&mut redis_conn)
                .await?;
        }
    }

    let streak = sqlx::query_scalar::<_, i32>("SELECT spin_streak FROM users WHERE id = $1")
        .bind(user_id.0)
        .fetch_one(&state.pool)
        .await?;

    Ok(Json(SpinStatusResponse {
        can_spin: cooldown_seconds == 0,
        cooldown_seconds,
        streak,
    }))
}

async fn get_spin_history(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Json<Vec<crate::models::SpinRecord>>, ApiError> {
    let records = sqlx::query_as::<_, crate::models::SpinRecord>(
        r#"
        SELECT id, user_id, created_at, base_reward, final_reward, reward_type
        FROM spin_records
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT 30
        "#,
    )
    .bind(user_id.0)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(records))
}
