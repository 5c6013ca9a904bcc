use axum::{
    extract::{State, Json, Extension, Path},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use hex;
use uuid::Uuid;
use validator::Validate;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, error};
use shared::campaign::*;
use crate::AppState;
use crate::auth::middleware::UserId;
use crate::error::ApiError;
use super::{ApiResponse, record_transaction};

type HmacSha256 = Hmac<Sha256>;

fn view_session_secret() -> String {
    std::env::var("VIEW_SESSION_SECRET").unwrap_or_else(|_| "default_secret_key".to_string())
}

fn sign_session(session_id: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(view_session_secret().as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(session_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn session_key(user_id: Uuid, session_id: &str) -> String {
    format!("view_session:{}:{}", user_id, session_id)
}

fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[derive(Debug, sqlx::FromRow)]
struct CampaignSummaryRow {
    id: Uuid,
    creator_username: String,
    title: String,
    video_url: String,
    reward_per_view: i64,
    remaining_tiv: i64,
    status: String,
    has_quiz: bool,
    created_at: String,
}

impl From<CampaignSummaryRow> for CampaignSummary {
    fn from(row: CampaignSummaryRow) -> Self {
        Self {
            id: row.id.to_string(),
            creator_username: row.creator_username,
            title: row.title,
            video_url: row.video_url,
            reward_per_view: row.reward_per_view,
            remaining_tiv: row.remaining_tiv,
            status: row.status,
            has_quiz: row.has_quiz,
            created_at: row.created_at,
        }
    }
}

pub async fn get_campaigns(
    State(state): State<AppState>,
) -> Result<Json<Vec<CampaignSummary>>, ApiError> {
    let rows = sqlx::query_as::<_, CampaignSummaryRow>(
        r#"
        SELECT c.id, u.username AS creator_username, c.title, c.video_url,
               c.reward_per_view, c.remaining_tiv, c.status,
               EXISTS (SELECT 1 FROM quizzes q WHERE q.campaign_id = c.id) AS has_quiz,
               c.created_at::text AS created_at
        FROM campaigns c
        JOIN users u ON u.id = c.creator_id
        WHERE c.status = 'active'
        ORDER BY c.created_at DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(rows.into_iter().map(CampaignSummary::from).collect()))
}

pub async fn create_campaign(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(payload): Json<CreateCampaignRequest>,
) -> Result<Json<ApiResponse<CampaignSummary>>, ApiError> {
    payload.validate()?;

    let mut tx = state.pool.begin().await?;

    #[derive(sqlx::FromRow)]
    struct Creator {
        username: String,
        role: String,
        tiv_balance: i64,
    }

    let creator = sqlx::query_as::<_, Creator>(
        "SELECT username, role, tiv_balance FROM users WHERE id = $1 FOR UPDATE",
    )
    .bind(user_id.0)
    .fetch_one(&mut *tx)
    .await?;

    if creator.role != "creator" && creator.role != "admin" {
        return Err(ApiError::Forbidden("Only creators can fund campaigns"));
    }

    if creator.tiv_balance < payload.budget_tiv {
        info!("❌ Campaign funding failed: {} has {} TIV, needs {}",
              creator.username, creator.tiv_balance, payload.budget_tiv);
        return Ok(Json(ApiResponse::refused("Insufficient TIV to fund this campaign")));
    }

    sqlx::query("UPDATE users SET tiv_balance = tiv_balance - $1 WHERE id = $2")
        .bind(payload.budget_tiv)
        .bind(user_id.0)
        .execute(&mut *tx)
        .await?;

    let row = sqlx::query_as::<_, CampaignSummaryRow>(
        r#"
        INSERT INTO campaigns (creator_id, title, video_url, reward_per_view, budget_tiv, remaining_tiv)
        VALUES ($1, $2, $3, $4, $5, $5)
        RETURNING id, $6 AS creator_username, title, video_url, reward_per_view,
                  remaining_tiv, status, false AS has_quiz, created_at::text AS created_at
        "#,
    )
    .bind(user_id.0)
    .bind(payload.title.trim())
    .bind(&payload.video_url)
    .bind(payload.reward_per_view)
    .bind(payload.budget_tiv)
    .bind(&creator.username)
    .fetch_one(&mut *tx)
    .await?;

    record_transaction(&mut tx, user_id.0, -payload.budget_tiv, "tiv", "campaign_funding").await?;

    tx.commit().await?;

    info!("🎬 {} funded campaign \"{}\" with {} TIV ({} per view)",
          creator.username, row.title, payload.budget_tiv, payload.reward_per_view);

    Ok(Json(ApiResponse::ok(CampaignSummary::from(row))))
}

pub async fn participate_in_campaign(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<ParticipateResponse>, ApiError> {
    #[derive(sqlx::FromRow)]
    struct CampaignGate {
        status: String,
        remaining_tiv: i64,
        reward_per_view: i64,
    }

    let campaign = sqlx::query_as::<_, CampaignGate>(
        "SELECT status, remaining_tiv, reward_per_view FROM campaigns WHERE id = $1",
    )
    .bind(campaign_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::NotFound("Campaign not found"))?;

    if campaign.status != "active" || campaign.remaining_tiv < campaign.reward_per_view {
        return Ok(Json(ParticipateResponse {
            success: false,
            view_token: None,
            min_watch_secs: MIN_WATCH_SECS,
            message: Some("This campaign is no longer accepting views".to_string()),
        }));
    }

    let already_viewed = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM campaign_views WHERE campaign_id = $1 AND user_id = $2 AND completed_at IS NOT NULL)",
    )
    .bind(campaign_id)
    .bind(user_id.0)
    .fetch_one(&state.pool)
    .await?;

    if already_viewed {
        return Ok(Json(ParticipateResponse {
            success: false,
            view_token: None,
            min_watch_secs: MIN_WATCH_SECS,
            message: Some("You have already been credited for this campaign".to_string()),
        }));
    }

    let session_id = Uuid::new_v4().to_string();
    let token = format!("{}:{}", session_id, sign_session(&session_id));

    let mut redis_conn = state.redis.get_async_connection().await?;
    let _: () = redis::cmd("SETEX")
        .arg(session_key(user_id.0, &session_id))
        .arg(VIEW_SESSION_TTL_SECS)
        .arg(format!("{}:{}", campaign_id, now_epoch()))
        .query_async(&mut redis_conn)
        .await?;

    Ok(Json(ParticipateResponse {
        success: true,
        view_token: Some(token),
        min_watch_secs: MIN_WATCH_SECS,
        message: None,
    }))
}

pub async fn complete_campaign_view(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(campaign_id): Path<Uuid>,
    Json(payload): Json<CompleteViewRequest>,
) -> Result<Json<CompleteViewResponse>, ApiError> {
    let refused = |message: &str, remaining: i64| {
        Json(CompleteViewResponse {
            success: false,
            reward: 0,
            new_tiv_balance: 0,
            campaign_remaining: remaining,
            message: Some(message.to_string()),
        })
    };

    let parts: Vec<&str> = payload.view_token.split(':').collect();
    if parts.len() != 2 {
        error!("Malformed view token from user {}", user_id.0);
        return Ok(refused("Invalid view session", 0));
    }
    let (session_id, provided_sig) = (parts[0], parts[1]);

    if provided_sig != sign_session(session_id) {
        return Ok(refused("Invalid view session", 0));
    }

    let mut redis_conn = state.redis.get_async_connection().await?;
    let stored: Option<String> = redis::cmd("GET")
        .arg(session_key(user_id.0, session_id))
        .query_async(&mut redis_conn)
        .await?;

    let stored = match stored {
        Some(value) => value,
        None => return Ok(refused("View session expired or not found", 0)),
    };

    let (stored_campaign, started_epoch) = match stored.split_once(':') {
        Some((c, t)) => (c.to_string(), t.parse::<u64>().unwrap_or(0)),
        None => return Ok(refused("Invalid view session", 0)),
    };

    if stored_campaign != campaign_id.to_string() {
        return Ok(refused("View session does not match this campaign", 0));
    }

    if now_epoch().saturating_sub(started_epoch) < MIN_WATCH_SECS {
        return Ok(refused("Watch the full video before claiming the view", 0));
    }

    let mut tx = state.pool.begin().await?;

    #[derive(sqlx::FromRow)]
    struct CampaignLock {
        status: String,
        remaining_tiv: i64,
        reward_per_view: i64,
    }

    let campaign = sqlx::query_as::<_, CampaignLock>(
        "SELECT status, remaining_tiv, reward_per_view FROM campaigns WHERE id = $1 FOR UPDATE",
    )
    .bind(campaign_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::NotFound("Campaign not found"))?;

    if campaign.status != "active" || campaign.remaining_tiv < campaign.reward_per_view {
        return Ok(refused("This campaign's budget is exhausted", campaign.remaining_tiv));
    }

    // UNIQUE (campaign_id, user_id) makes double-crediting a no-op race-free.
    let inserted = sqlx::query(
        r#"
        INSERT INTO campaign_views (campaign_id, user_id, started_at, completed_at)
        VALUES ($1, $2, to_timestamp($3), NOW())
        ON CONFLICT (campaign_id, user_id) DO NOTHING
        "#,
    )
    .bind(campaign_id)
    .bind(user_id.0)
    .bind(started_epoch as i64)
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() == 0 {
        return Ok(refused("You have already been credited for this campaign", campaign.remaining_tiv));
    }

    let new_tiv_balance = sqlx::query_scalar::<_, i64>(
        "UPDATE users SET tiv_balance = tiv_balance + $1 WHERE id = $2 RETURNING tiv_balance",
    )
    .bind(campaign.reward_per_view)
    .bind(user_id.0)
    .fetch_one(&mut *tx)
    .await?;

    let campaign_remaining = campaign.remaining_tiv - campaign.reward_per_view;
    sqlx::query(
        r#"
        UPDATE campaigns
        SET remaining_tiv = $1,
            status = CASE WHEN $1 < reward_per_view THEN 'exhausted' ELSE status END
        WHERE id = $2
        "#,
    )
    .bind(campaign_remaining)
    .bind(campaign_id)
    .execute(&mut *tx)
    .await?;

    record_transaction(&mut tx, user_id.0, campaign.reward_per_view, "tiv", "campaign_view").await?;

    tx.commit().await?;

    let _: () = redis::cmd("DEL")
        .arg(session_key(user_id.0, session_id))
        .query_async(&mut redis_conn)
        .await
        .unwrap_or(());

    info!("📺 User {} completed a view on campaign {} for {} TIV ({} TIV left)",
          user_id.0, campaign_id, campaign.reward_per_view, campaign_remaining);

    Ok(Json(CompleteViewResponse {
        success: true,
        reward: campaign.reward_per_view,
        new_tiv_balance,
        campaign_remaining,
        message: Some(format!("View credited: +{} TIV", campaign.reward_per_view)),
    }))
}

/// Hourly sweep: campaigns whose budget can no longer pay a full view stop
/// accepting participants.
pub async fn close_exhausted_campaigns(pool: &sqlx::PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE campaigns SET status = 'exhausted' WHERE status = 'active' AND remaining_tiv < reward_per_view",
    )
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
