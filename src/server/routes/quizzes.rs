use std::collections::HashSet;

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{queries::questions, Question},
    server::{
        app::AppState,
        deserializers::Id,
        error::{ApiError, ApiResult},
        extract::ApiJson,
        quiz::{pick_next_question, ALL_CATEGORIES},
    },
    telemetry::record_quiz_question,
};

#[derive(Debug, Deserialize)]
struct QuizCategory {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    id: i64,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QuizRequest {
    #[serde(default)]
    previous_questions: Option<Vec<Id>>,
    #[serde(default)]
    quiz_category: Option<QuizCategory>,
}

#[derive(Debug, Serialize)]
struct NextQuestion {
    success: bool,
    question: Question,
}

async fn next_quiz_question(
    State(pool): State<SqlitePool>,
    ApiJson(request): ApiJson<QuizRequest>,
) -> ApiResult<Json<NextQuestion>> {
    let (Some(previous), Some(category)) = (request.previous_questions, request.quiz_category)
    else {
        return Err(ApiError::BadRequest(
            "previous_questions and quiz_category are required".to_owned(),
        ));
    };
    let previous: HashSet<i64> = previous.into_iter().map(|Id(id)| id).collect();

    let candidates = if category.id == ALL_CATEGORIES {
        questions::get_all_questions(&pool).await
    } else {
        questions::get_questions_for_category(&pool, category.id).await
    }
    .map_err(ApiError::unprocessable)?;

    let question = pick_next_question(candidates, &previous, &mut rand::thread_rng())
        .ok_or_else(|| {
            ApiError::Unprocessable(format!(
                "no questions left in category {} ({})",
                category.id,
                category.kind.as_deref().unwrap_or("unnamed")
            ))
        })?;
    record_quiz_question(category.id);
    tracing::debug!(id = question.id, category = category.id, "next quiz question");

    Ok(Json(NextQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_quiz_question))
        .with_state(state)
}
