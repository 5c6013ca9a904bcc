use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct SpinRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub base_reward: i64,
    pub final_reward: i64,
    pub reward_type: String,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct VerificationRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_ref: String,
    pub status: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub reviewed_at: Option<OffsetDateTime>,
    pub reviewed_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
