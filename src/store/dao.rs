//! TestResultDao - evaluation record access.
//!
//! The summarization pipeline only ever reads through
//! [`TestResultDao::list_human_feedback`]; the HTTP layer uses the rest.

mod memory;
mod postgres;

use anyhow::Result;
use async_trait::async_trait;

use crate::store::models::{FeedbackUpdate, NewTestResult, Page, PageRequest, TestResult};

pub use memory::InMemoryTestResultDao;
pub use postgres::PgTestResultDao;

#[async_trait]
pub trait TestResultDao: Send + Sync {
    /// Inserts a new record and returns it with its assigned id.
    async fn create(&self, record: NewTestResult) -> Result<TestResult>;

    /// Returns one page of records in insertion order, plus the total count.
    async fn list_page(&self, request: PageRequest) -> Result<Page<TestResult>>;

    /// Overwrites the human feedback pair. `None` when the id is unknown.
    async fn update_feedback(&self, update: FeedbackUpdate) -> Result<Option<TestResult>>;

    /// Snapshot of every record's `human_feedback`, in insertion order.
    async fn list_human_feedback(&self) -> Result<Vec<Option<String>>>;

    /// Cheap liveness probe used by `/health/ready`.
    async fn ping(&self) -> Result<()>;
}
