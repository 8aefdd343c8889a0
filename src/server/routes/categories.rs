use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_all_categories, categories::get_category, questions},
        Category, Question,
    },
    server::{
        app::AppState,
        error::ApiResult,
        extract::{ApiPath, ApiQuery},
        pagination::{paginate, PageQuery},
    },
};

/// Categories keyed by id, serialized as `{"1": "Science", ...}` in id order.
pub(super) type CategoryMap = BTreeMap<i64, String>;

pub(super) fn category_map(categories: Vec<Category>) -> CategoryMap {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    categories: CategoryMap,
}

#[derive(Serialize)]
struct CategoryQuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: String,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResult<Json<CategoriesResponse>> {
    let categories = get_all_categories(&pool).await?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories: category_map(categories),
    }))
}

async fn questions_for_category(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(PageQuery { page }): ApiQuery<PageQuery>,
) -> ApiResult<Json<CategoryQuestionsPage>> {
    let category = get_category(&pool, id).await?;
    let questions = questions::get_questions_for_category(&pool, category.id).await?;
    tracing::debug!(
        category = category.id,
        total = questions.len(),
        "questions for category"
    );
    Ok(Json(CategoryQuestionsPage {
        success: true,
        questions: paginate(page, &questions),
        total_questions: questions.len(),
        current_category: category.kind,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(questions_for_category))
        .with_state(state)
}
