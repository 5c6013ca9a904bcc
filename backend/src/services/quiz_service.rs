use axum::extract::{State, Json, Extension, Path};
use uuid::Uuid;
use tracing::info;
use shared::campaign::{QuizPublic, QuizQuestionPublic, SubmitQuizRequest, QuizResultResponse, score_answers};
use crate::AppState;
use crate::auth::middleware::UserId;
use crate::error::ApiError;
use super::record_transaction;

#[derive(sqlx::FromRow)]
struct QuizRow {
    id: Uuid,
    title: String,
    reward_tiv: i64,
}

#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: Uuid,
    prompt: String,
    options: serde_json::Value,
}

/// Returns the campaign's quiz with the answer key stripped out.
pub async fn get_campaign_quiz(
    State(state): State<AppState>,
    Path(campaign_id): Path<Uuid>,
) -> Result<Json<QuizPublic>, ApiError> {
    let quiz = sqlx::query_as::<_, QuizRow>(
        "SELECT id, title, reward_tiv FROM quizzes WHERE campaign_id = $1",
    )
    .bind(campaign_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::NotFound("This campaign has no quiz"))?;

    let questions = sqlx::query_as::<_, QuestionRow>(
        "SELECT id, prompt, options FROM quiz_questions WHERE quiz_id = $1 ORDER BY position",
    )
    .bind(quiz.id)
    .fetch_all(&state.pool)
    .await?;

    let questions = questions
        .into_iter()
        .map(|q| QuizQuestionPublic {
            id: q.id.to_string(),
            prompt: q.prompt,
            options: serde_json::from_value(q.options).unwrap_or_default(),
        })
        .collect();

    Ok(Json(QuizPublic {
        id: quiz.id.to_string(),
        title: quiz.title,
        reward_tiv: quiz.reward_tiv,
        questions,
    }))
}

pub async fn submit_quiz_answers(
    State(state): State<AppState>,
    Extension(user_id): Extension<UserId>,
    Path(quiz_id): Path<Uuid>,
    Json(payload): Json<SubmitQuizRequest>,
) -> Result<Json<QuizResultResponse>, ApiError> {
    let refused = |message: &str| {
        Json(QuizResultResponse {
            success: false,
            correct: 0,
            total: 0,
            percent: 0,
            passed: false,
            reward: 0,
            new_tiv_balance: 0,
            message: Some(message.to_string()),
        })
    };

    let quiz = sqlx::query_as::<_, QuizRow>(
        "SELECT id, title, reward_tiv FROM quizzes WHERE id = $1",
    )
    .bind(quiz_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or(ApiError::NotFound("Quiz not found"))?;

    let key = sqlx::query_scalar::<_, i16>(
        "SELECT correct_index FROM quiz_questions WHERE quiz_id = $1 ORDER BY position",
    )
    .bind(quiz_id)
    .fetch_all(&state.pool)
    .await?;

    if key.is_empty() {
        return Ok(refused("Quiz has no questions"));
    }

    let score = score_answers(&key, &payload.answers);
    let reward = if score.passed { quiz.reward_tiv } else { 0 };

    let mut tx = state.pool.begin().await?;

    // One graded attempt per user; a second submission is rejected rather
    // than regraded.
    let inserted = sqlx::query(
        r#"
        INSERT INTO quiz_attempts (quiz_id, user_id, score_percent, passed, reward_tiv)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (quiz_id, user_id) DO NOTHING
        "#,
    )
    .bind(quiz_id)
    .bind(user_id.0)
    .bind(score.percent as i32)
    .bind(score.passed)
    .bind(reward)
    .execute(&mut *tx)
    .await?;

    if inserted.rows_affected() == 0 {
        return Ok(refused("You have already taken this quiz"));
    }

    let new_tiv_balance = if score.passed {
        let balance = sqlx::query_scalar::<_, i64>(
            "UPDATE users SET tiv_balance = tiv_balance + $1 WHERE id = $2 RETURNING tiv_balance",
        )
        .bind(reward)
        .bind(user_id.0)
        .fetch_one(&mut *tx)
        .await?;
        record_transaction(&mut tx, user_id.0, reward, "tiv", "quiz").await?;
        balance
    } else {
        sqlx::query_scalar::<_, i64>("SELECT tiv_balance FROM users WHERE id = $1")
            .bind(user_id.0)
            .fetch_one(&mut *tx)
            .await?
    };

    tx.commit().await?;

    info!("📝 QUIZ: user {} scored {}% on \"{}\" ({})",
          user_id.0, score.percent, quiz.title,
          if score.passed { "passed" } else { "failed" });

    let message = if score.passed {
        format!("You passed with {}% and earned {} TIV!", score.percent, reward)
    } else {
        format!("You scored {}%. {}% is required to earn the reward.", score.percent, shared::campaign::QUIZ_PASS_PERCENT)
    };

    Ok(Json(QuizResultResponse {
        success: true,
        correct: score.correct,
        total: score.total,
        percent: score.percent,
        passed: score.passed,
        reward,
        new_tiv_balance,
        message: Some(message),
    }))
}
