use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::TestResultDao;
use crate::store::models::{FeedbackUpdate, NewTestResult, Page, PageRequest, TestResult};

const SELECT_COLUMNS: &str = "id, input_under_test, llm_output, criteria, auto_eval, \
     auto_feedback, human_eval, human_feedback, created_at";

#[derive(Debug, Clone)]
pub struct PgTestResultDao {
    pool: PgPool,
}

impl PgTestResultDao {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `test_results` table and its ordering index when missing.
    ///
    /// # Errors
    /// Returns an error when a DDL statement fails.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS test_results (
                id UUID PRIMARY KEY,
                input_under_test TEXT NOT NULL DEFAULT '',
                llm_output TEXT NOT NULL DEFAULT '',
                criteria TEXT NOT NULL DEFAULT '',
                auto_eval INTEGER NOT NULL DEFAULT 0,
                auto_feedback TEXT NOT NULL DEFAULT '',
                human_eval INTEGER,
                human_feedback TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("failed to create test_results table")?;

        sqlx::query(
            r"
            CREATE INDEX IF NOT EXISTS idx_test_results_created_at
                ON test_results(created_at, id)
            ",
        )
        .execute(&self.pool)
        .await
        .context("failed to create test_results index")?;

        Ok(())
    }
}

fn row_to_test_result(row: &PgRow) -> Result<TestResult> {
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(TestResult {
        id: row.try_get("id")?,
        input_under_test: row.try_get("input_under_test")?,
        llm_output: row.try_get("llm_output")?,
        criteria: row.try_get("criteria")?,
        auto_eval: row.try_get("auto_eval")?,
        auto_feedback: row.try_get("auto_feedback")?,
        human_eval: row.try_get("human_eval")?,
        human_feedback: row.try_get("human_feedback")?,
        created_at,
    })
}

#[async_trait]
impl TestResultDao for PgTestResultDao {
    async fn create(&self, record: NewTestResult) -> Result<TestResult> {
        let row = sqlx::query(&format!(
            r"
            INSERT INTO test_results
                (id, input_under_test, llm_output, criteria, auto_eval, auto_feedback, human_eval, human_feedback)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(Uuid::new_v4())
        .bind(&record.input_under_test)
        .bind(&record.llm_output)
        .bind(&record.criteria)
        .bind(record.auto_eval)
        .bind(&record.auto_feedback)
        .bind(record.human_eval)
        .bind(&record.human_feedback)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert test result")?;

        row_to_test_result(&row)
    }

    async fn list_page(&self, request: PageRequest) -> Result<Page<TestResult>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM test_results")
            .fetch_one(&self.pool)
            .await
            .context("failed to count test results")?;

        let rows = sqlx::query(&format!(
            r"
            SELECT {SELECT_COLUMNS}
            FROM test_results
            ORDER BY created_at ASC, id ASC
            LIMIT $1 OFFSET $2
            "
        ))
        .bind(i64::try_from(request.limit()).unwrap_or(i64::MAX))
        .bind(i64::try_from(request.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch test result page")?;

        let results = rows
            .iter()
            .map(row_to_test_result)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(
            results,
            u64::try_from(total).unwrap_or_default(),
            request,
        ))
    }

    async fn update_feedback(&self, update: FeedbackUpdate) -> Result<Option<TestResult>> {
        let row = sqlx::query(&format!(
            r"
            UPDATE test_results
            SET human_eval = $2, human_feedback = $3
            WHERE id = $1
            RETURNING {SELECT_COLUMNS}
            "
        ))
        .bind(update.id)
        .bind(update.human_eval)
        .bind(&update.human_feedback)
        .fetch_optional(&self.pool)
        .await
        .context("failed to update human feedback")?;

        row.as_ref().map(row_to_test_result).transpose()
    }

    async fn list_human_feedback(&self) -> Result<Vec<Option<String>>> {
        let rows = sqlx::query(
            r"
            SELECT human_feedback
            FROM test_results
            ORDER BY created_at ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch human feedback")?;

        rows.iter()
            .map(|row| {
                row.try_get::<Option<String>, _>("human_feedback")
                    .map_err(Into::into)
            })
            .collect()
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("database ping failed")?;
        Ok(())
    }
}
