use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::TestResultDao;
use crate::store::models::{FeedbackUpdate, NewTestResult, Page, PageRequest, TestResult};

/// Process-local store. Backs `FEEDBACK_STORE=memory` and the test suites.
#[derive(Debug, Default)]
pub struct InMemoryTestResultDao {
    records: RwLock<Vec<TestResult>>,
}

impl InMemoryTestResultDao {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with one record per feedback value.
    #[must_use]
    pub fn with_feedback<I, S>(feedback: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        let records = feedback
            .into_iter()
            .map(|value| {
                NewTestResult {
                    human_feedback: value.map(Into::into),
                    ..NewTestResult::default()
                }
                .into_record(Uuid::new_v4(), Utc::now())
            })
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }
}

#[async_trait]
impl TestResultDao for InMemoryTestResultDao {
    async fn create(&self, record: NewTestResult) -> Result<TestResult> {
        let stored = record.into_record(Uuid::new_v4(), Utc::now());
        self.records.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list_page(&self, request: PageRequest) -> Result<Page<TestResult>> {
        let records = self.records.read().await;
        let total_count = records.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let results = records
            .iter()
            .skip(offset)
            .take(request.page_size as usize)
            .cloned()
            .collect();
        Ok(Page::new(results, total_count, request))
    }

    async fn update_feedback(&self, update: FeedbackUpdate) -> Result<Option<TestResult>> {
        let mut records = self.records.write().await;
        let Some(record) = records.iter_mut().find(|record| record.id == update.id) else {
            return Ok(None);
        };
        record.human_eval = update.human_eval;
        record.human_feedback = update.human_feedback;
        Ok(Some(record.clone()))
    }

    async fn list_human_feedback(&self) -> Result<Vec<Option<String>>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .map(|record| record.human_feedback.clone())
            .collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
