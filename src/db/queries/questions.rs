use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

/// Fields of a question that does not have an id yet.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question: String,
    pub answer: String,
    pub category: i64,
    pub difficulty: i64,
}

pub async fn get_all_questions(pool: &SqlitePool) -> DbResult<Vec<Question>> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(questions)
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> DbResult<Question> {
    let question = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    Ok(question)
}

pub async fn get_questions_for_category(
    pool: &SqlitePool,
    category: i64,
) -> DbResult<Vec<Question>> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE questions.category = ?1
        ORDER BY id
        "#,
    )
    .bind(category)
    .fetch_all(pool)
    .await?;
    Ok(questions)
}

// LIKE treats % and _ as wildcards, the term has to match literally
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive substring search over the question text.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> DbResult<Vec<Question>> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, question, answer, category, difficulty FROM questions
        WHERE lower(questions.question) LIKE lower(?1) ESCAPE '\'
        ORDER BY id
        "#,
    )
    .bind(like_pattern(term))
    .fetch_all(pool)
    .await?;
    Ok(questions)
}

pub async fn create_question(pool: &SqlitePool, question: &NewQuestion) -> DbResult<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

pub async fn delete_question(pool: &SqlitePool, id: i64) -> DbResult<()> {
    let deleted = sqlx::query(
        r#"
        DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?
    .rows_affected();
    if deleted == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

async fn upsert_question(pool: &SqlitePool, question: &Question) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(id) DO UPDATE SET
            question = excluded.question,
            answer = excluded.answer,
            category = excluded.category,
            difficulty = excluded.difficulty
        "#,
    )
    .bind(question.id)
    .bind(&question.question)
    .bind(&question.answer)
    .bind(question.category)
    .bind(question.difficulty)
    .execute(pool)
    .await?;
    Ok(())
}

/// Makes the stored questions match `questions` exactly, keeping ids.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> DbResult<()> {
    let existing_ids: HashSet<i64> = get_all_questions(pool)
        .await?
        .iter()
        .map(|q| q.id)
        .collect();
    let new_ids: HashSet<i64> = questions.iter().map(|q| q.id).collect();
    for id in existing_ids.difference(&new_ids) {
        delete_question(pool, *id).await?;
    }
    for question in &questions {
        upsert_question(pool, question).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn new_question(text: &str, category: i64) -> NewQuestion {
        NewQuestion {
            question: text.to_owned(),
            answer: "answer".to_owned(),
            category,
            difficulty: 1,
        }
    }

    #[tokio::test]
    async fn created_question_is_retrievable() {
        let pool = test_pool().await;
        let id = create_question(&pool, &new_question("What is H2O?", 1))
            .await
            .unwrap();
        let stored = get_question_by_id(&pool, id).await.unwrap();
        assert_eq!(stored.question, "What is H2O?");
        assert_eq!(stored.category, 1);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let pool = test_pool().await;
        create_question(&pool, &new_question("first", 1)).await.unwrap();
        let second = create_question(&pool, &new_question("second", 1))
            .await
            .unwrap();
        delete_question(&pool, second).await.unwrap();
        let third = create_question(&pool, &new_question("third", 1))
            .await
            .unwrap();
        assert!(third > second);
    }

    #[tokio::test]
    async fn deleting_missing_question_is_not_found() {
        let pool = test_pool().await;
        let err = delete_question(&pool, 5555).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_literal() {
        let pool = test_pool().await;
        create_question(&pool, &new_question("Which planet is red?", 1))
            .await
            .unwrap();
        create_question(&pool, &new_question("What is 100% of 5?", 1))
            .await
            .unwrap();
        create_question(&pool, &new_question("Who painted it?", 2))
            .await
            .unwrap();

        let found = search_questions(&pool, "WHICH").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].question, "Which planet is red?");

        let found = search_questions(&pool, "100%").await.unwrap();
        assert_eq!(found.len(), 1);

        assert!(search_questions(&pool, "_").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn questions_filter_by_category() {
        let pool = test_pool().await;
        create_question(&pool, &new_question("a", 1)).await.unwrap();
        create_question(&pool, &new_question("b", 2)).await.unwrap();
        create_question(&pool, &new_question("c", 1)).await.unwrap();

        let science = get_questions_for_category(&pool, 1).await.unwrap();
        let texts: Vec<&str> = science.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("a%b_c\\"), "%a\\%b\\_c\\\\%");
    }
}
