use serde::{Serialize, Deserialize};
use validator::Validate;

/// Smallest accepted pool contribution.
pub const MIN_POOL_CONTRIBUTION_TIV: i64 = 10;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PoolSummary {
    pub id: String,
    pub name: String,
    pub target_tiv: i64,
    pub contributed_tiv: i64,
    pub status: String,
    pub contributor_count: i64,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct JoinPoolRequest {
    #[validate(range(min = 10, message = "Contributions must be at least 10 TIV"))]
    pub amount_tiv: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinPoolResponse {
    pub success: bool,
    pub contributed_tiv: i64,
    pub pool_status: String,
    pub new_tiv_balance: i64,
    pub message: Option<String>,
}
