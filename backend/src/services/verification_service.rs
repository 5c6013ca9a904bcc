use axum::extract::{State, Json, Extension, Path};
use serde::Deserialize;
use uuid::Uuid;
use time::OffsetDateTime;
use tracing::info;
use crate::AppState;
use crate::auth::middleware::UserId;
use crate::error::ApiError;
use crate::models::VerificationRequest;
use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct SubmitVerificationRequest {
    pub document_ref: String,
}

pub async fn submit_verification(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Json(payload): Json<SubmitVerificationRequest>,
) -> Result<Json<ApiResponse<VerificationRequest>>, ApiError> {
    let document_ref = payload.document_ref.trim();
    if document_ref.is_empty() || document_ref.len() > 256 {
        return Err(ApiError::Invalid("A document reference is required".to_string()));
    }

    let status = sqlx::query_scalar::<_, String>(
        "SELECT verification_status FROM users WHERE id = $1",
    )
    .bind(user_id.0)
    .fetch_one(&state.pool)
    .await?;

    if status == "approved" {
        return Ok(Json(ApiResponse::refused("Your account is already verified")));
    }
    if status == "pending" {
        return Ok(Json(ApiResponse::refused("A verification request is already under review")));
    }

    let mut tx = state.pool.begin().await?;

    let request = sqlx::query_as::<_, VerificationRequest>(
        r#"
        INSERT INTO verification_requests (user_id, document_ref)
        VALUES ($1, $2)
        RETURNING id, user_id, document_ref, status, reviewed_by, reviewed_at, created_at
        "#,
    )
    .bind(user_id.0)
    .bind(document_ref)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("UPDATE users SET verification_status = 'pending' WHERE id = $1")
        .bind(user_id.0)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("🪪 User {} submitted a verification request", user_id.0);

    Ok(Json(ApiResponse::ok(request)))
}

pub async fn admin_approve_verification(
    State(state): State<AppState>,
    Extension(admin_id): Extension<UserId>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<ApiResponse<VerificationRequest>>, ApiError> {
    let role = sqlx::query_scalar::<_, String>("SELECT role FROM users WHERE id = $1")
        .bind(admin_id.0)
        .fetch_one(&state.pool)
        .await?;

    if role != "admin" {
        return Err(ApiError::Forbidden("Only admins can approve verification requests"));
    }

    let mut tx = state.pool.begin().await?;

    let request = sqlx::query_as::<_, VerificationRequest>(
        r#"
        UPDATE verification_requests
        SET status = 'approved', reviewed_by = $1, reviewed_at = $2
        WHERE id = $3 AND status = 'pending'
        RETURNING id, user_id, document_ref, status, reviewed_by, reviewed_at, created_at
        "#,
    )
    .bind(admin_id.0)
    .bind(OffsetDateTime::now_utc())
    .bind(request_id)
    .fetch_optional(&mut *tx)
    .await?;

    let request = match request {
        Some(request) => request,
        None => return Ok(Json(ApiResponse::refused("Request not found or already reviewed"))),
    };

    sqlx::query("UPDATE users SET verification_status = 'approved' WHERE id = $1")
        .bind(request.user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!("✅ Verification request {} approved for user {}", request_id, request.user_id);

    Ok(Json(ApiResponse::ok(request)))
}
