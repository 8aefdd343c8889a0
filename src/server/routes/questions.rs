use axum::{
    extract::State,
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_all_categories, questions},
        DbError, NewQuestion, Question,
    },
    server::{
        app::AppState,
        error::{ApiError, ApiResult},
        extract::{ApiJson, ApiPath, ApiQuery},
        pagination::{paginate, PageQuery},
    },
};

use super::categories::{category_map, CategoryMap};

/// Body of `POST /questions`: a search when `search_term` is non-empty, a new question otherwise.
#[derive(Debug, Default, Deserialize)]
struct QuestionsBody {
    #[serde(default)]
    search_term: Option<String>,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
}

impl QuestionsBody {
    fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref().filter(|term| !term.is_empty())
    }

    fn into_new_question(self) -> Result<NewQuestion, ApiError> {
        match (self.question, self.answer, self.category, self.difficulty) {
            (Some(question), Some(answer), Some(category), Some(difficulty)) => Ok(NewQuestion {
                question,
                answer,
                category,
                difficulty,
            }),
            _ => Err(ApiError::Unprocessable(
                "question, answer, category and difficulty are required".to_owned(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<CategoryMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created: Option<i64>,
}

impl QuestionsPage {
    fn new(page: i64, all: &[Question]) -> Self {
        Self {
            success: true,
            questions: paginate(page, all),
            total_questions: all.len(),
            categories: None,
            created: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct Deleted {
    success: bool,
    deleted: i64,
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    ApiQuery(PageQuery { page }): ApiQuery<PageQuery>,
) -> ApiResult<Json<QuestionsPage>> {
    let all = questions::get_all_questions(&pool).await?;
    let mut response = QuestionsPage::new(page, &all);
    if response.questions.is_empty() {
        return Err(ApiError::NotFound);
    }
    response.categories = Some(category_map(get_all_categories(&pool).await?));
    Ok(Json(response))
}

// a missing row is a failed deletion: 422, not 404
fn deletion_failed(id: i64, error: DbError) -> ApiError {
    match error {
        DbError::NotFound => ApiError::Unprocessable(format!("question {id} does not exist")),
        other => ApiError::unprocessable(other),
    }
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Deleted>> {
    questions::get_question_by_id(&pool, id)
        .await
        .map_err(|e| deletion_failed(id, e))?;
    questions::delete_question(&pool, id)
        .await
        .map_err(|e| deletion_failed(id, e))?;
    tracing::info!(id, "question deleted");
    Ok(Json(Deleted {
        success: true,
        deleted: id,
    }))
}

// unreadable bodies are 422 here, not 400, like every other failure of this endpoint
async fn create_or_search_questions(
    State(pool): State<SqlitePool>,
    ApiQuery(PageQuery { page }): ApiQuery<PageQuery>,
    body: Result<ApiJson<QuestionsBody>, ApiError>,
) -> ApiResult<Json<QuestionsPage>> {
    let ApiJson(body) = body.map_err(|e| ApiError::Unprocessable(e.to_string()))?;

    if let Some(term) = body.search_term() {
        let found = questions::search_questions(&pool, term)
            .await
            .map_err(ApiError::unprocessable)?;
        if found.is_empty() {
            tracing::debug!(term, "search found nothing");
            return Err(ApiError::NotFound);
        }
        return Ok(Json(QuestionsPage::new(page, &found)));
    }

    let new_question = body.into_new_question()?;
    let id = questions::create_question(&pool, &new_question)
        .await
        .map_err(ApiError::unprocessable)?;
    tracing::info!(id, category = new_question.category, "question created");

    let all = questions::get_all_questions(&pool)
        .await
        .map_err(ApiError::unprocessable)?;
    let mut response = QuestionsPage::new(page, &all);
    response.created = Some(id);
    Ok(Json(response))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/questions",
            get(list_questions).post(create_or_search_questions),
        )
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
