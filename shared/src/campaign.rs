use serde::{Serialize, Deserialize};
use validator::Validate;
use crate::validation::{validate_campaign_title, validate_video_url};

/// Minimum seconds an earner must keep a campaign video open before the
/// completed view is creditable.
pub const MIN_WATCH_SECS: u64 = 30;

/// View-session tokens expire after two hours.
pub const VIEW_SESSION_TTL_SECS: u64 = 7_200;

/// Minimum quiz score, in percent, that pays out.
pub const QUIZ_PASS_PERCENT: u32 = 70;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CampaignSummary {
    pub id: String,
    pub creator_username: String,
    pub title: String,
    pub video_url: String,
    pub reward_per_view: i64,
    pub remaining_tiv: i64,
    pub status: String,
    pub has_quiz: bool,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateCampaignRequest {
    #[validate(custom = "validate_campaign_title")]
    pub title: String,
    #[validate(custom = "validate_video_url")]
    pub video_url: String,
    #[validate(range(min = 1, message = "Reward per view must be at least 1 TIV"))]
    pub reward_per_view: i64,
    #[validate(range(min = 10, message = "Campaign budget must be at least 10 TIV"))]
    pub budget_tiv: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParticipateResponse {
    pub success: bool,
    pub view_token: Option<String>,
    pub min_watch_secs: u64,
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteViewRequest {
    pub view_token: String,
    pub timestamp: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteViewResponse {
    pub success: bool,
    pub reward: i64,
    pub new_tiv_balance: i64,
    pub campaign_remaining: i64,
    pub message: Option<String>,
}

// === Quizzes ===

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QuizQuestionPublic {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QuizPublic {
    pub id: String,
    pub title: String,
    pub reward_tiv: i64,
    pub questions: Vec<QuizQuestionPublic>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitQuizRequest {
    pub answers: Vec<i16>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizResultResponse {
    pub success: bool,
    pub correct: u32,
    pub total: u32,
    pub percent: u32,
    pub passed: bool,
    pub reward: i64,
    pub new_tiv_balance: i64,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: u32,
    pub total: u32,
    pub percent: u32,
    pub passed: bool,
}

/// Grades a submission against the answer key. Missing answers, surplus
/// answers, and out-of-range indices count as wrong; an empty key scores
/// zero.
pub fn score_answers(key: &[i16], given: &[i16]) -> QuizScore {
    let total = key.len() as u32;
    let correct = key
        .iter()
        .enumerate()
        .filter(|(i, expected)| given.get(*i) == Some(*expected))
        .count() as u32;
    let percent = if total == 0 { 0 } else { correct * 100 / total };

    QuizScore {
        correct,
        total,
        percent,
        passed: total > 0 && percent >= QUIZ_PASS_PERCENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_all_correct() {
        let score = score_answers(&[0, 2, 1], &[0, 2, 1]);
        assert_eq!(score.correct, 3);
        assert_eq!(score.percent, 100);
        assert!(score.passed);
    }

    #[test]
    fn test_score_partial() {
        let score = score_answers(&[0, 2, 1, 3], &[0, 2, 0, 0]);
        assert_eq!(score.correct, 2);
        assert_eq!(score.percent, 50);
        assert!(!score.passed);
    }

    #[test]
    fn test_score_length_mismatch_never_panics() {
        let short = score_answers(&[0, 1, 2], &[0]);
        assert_eq!(short.correct, 1);
        assert_eq!(short.total, 3);
        assert!(!short.passed);

        let long = score_answers(&[1], &[1, 0, 0, 0]);
        assert_eq!(long.correct, 1);
        assert_eq!(long.total, 1);
        assert!(long.passed);

        let empty = score_answers(&[], &[]);
        assert_eq!(empty.percent, 0);
        assert!(!empty.passed);
    }

    #[test]
    fn test_pass_boundary() {
        // 7 of 10 is exactly the threshold.
        let key = [0i16; 10];
        let mut given = vec![0i16; 7];
        given.extend([9, 9, 9]);
        let score = score_answers(&key, &given);
        assert_eq!(score.percent, 70);
        assert!(score.passed);

        // 6 of 9 rounds down to 66.
        let score = score_answers(&key[..9], &given[..9]);
        assert!(!score.passed);
    }
}
