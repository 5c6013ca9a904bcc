use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const API_WINDOW: Duration = Duration::from_secs(60);
pub const SPIN_ATTEMPT_WINDOW: Duration = Duration::from_secs(60);

pub const API_MAX_REQUESTS: u32 = 3000;
pub const SPIN_MAX_ATTEMPTS: u32 = 10;

pub const RATE_LIMIT_ERROR: &str = "Rate limit exceeded. Please try again later.";
pub const API_RATE_LIMIT_ERROR: &str = "Too Many Requests";
pub const SPIN_RATE_LIMIT_ERROR: &str = "Too many spin attempts. Slow down.";

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub enum RateLimitType {
    Api,
    SpinAttempt,
}

impl RateLimitType {
    pub fn get_window(&self) -> Duration {
        match self {
            Self::Api => API_WINDOW,
            Self::SpinAttempt => SPIN_ATTEMPT_WINDOW,
        }
    }

    pub fn get_max_attempts(&self) -> u32 {
        match self {
            Self::Api => API_MAX_REQUESTS,
            Self::SpinAttempt => SPIN_MAX_ATTEMPTS,
        }
    }

    pub fn get_error_message(&self) -> &'static str {
        match self {
            Self::Api => API_RATE_LIMIT_ERROR,
            Self::SpinAttempt => SPIN_RATE_LIMIT_ERROR,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RateLimitCheck {
    pub current_attempts: u32,
    pub is_locked: bool,
}

impl RateLimitCheck {
    pub fn new(attempts: u32, limit_type: RateLimitType) -> Self {
        Self {
            current_attempts: attempts,
            is_locked: attempts >= limit_type.get_max_attempts(),
        }
    }
}

pub fn get_rate_limit_key(limit_type: RateLimitType, identifier: &str) -> String {
    format!(
        "rate_limit:{}:{}",
        match limit_type {
            RateLimitType::Api => "api",
            RateLimitType::SpinAttempt => "spin_attempt",
        },
        identifier
    )
}
