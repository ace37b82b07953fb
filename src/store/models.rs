use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// One evaluated LLM output together with its automatic and human judgements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: Uuid,
    pub input_under_test: String,
    pub llm_output: String,
    pub criteria: String,
    pub auto_eval: i32,
    pub auto_feedback: String,
    pub human_eval: Option<i32>,
    pub human_feedback: Option<String>,
    #[serde(skip_serializing)]
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Payload for inserting a new record; the id is assigned by the store.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewTestResult {
    #[serde(default)]
    pub input_under_test: String,
    #[serde(default)]
    pub llm_output: String,
    #[serde(default)]
    pub criteria: String,
    #[serde(default)]
    pub auto_eval: i32,
    #[serde(default)]
    pub auto_feedback: String,
    #[serde(default)]
    pub human_eval: Option<i32>,
    #[serde(default)]
    pub human_feedback: Option<String>,
}

impl NewTestResult {
    /// Shorthand for a record that only carries human feedback.
    #[must_use]
    pub fn with_human_feedback(feedback: impl Into<String>) -> Self {
        Self {
            human_feedback: Some(feedback.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> TestResult {
        TestResult {
            id,
            input_under_test: self.input_under_test,
            llm_output: self.llm_output,
            criteria: self.criteria,
            auto_eval: self.auto_eval,
            auto_feedback: self.auto_feedback,
            human_eval: self.human_eval,
            human_feedback: self.human_feedback,
            created_at,
        }
    }
}

/// Human feedback pair written back onto an existing record.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackUpdate {
    pub id: Uuid,
    #[serde(default, deserialize_with = "deserialize_score_opt")]
    pub human_eval: Option<i32>,
    #[serde(default)]
    pub human_feedback: Option<String>,
}

/// Accepts a score as a number or numeric string; `null` and blank strings mean unset.
fn deserialize_score_opt<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ScoreOrStr {
        Score(i32),
        Str(String),
    }

    match Option::<ScoreOrStr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(ScoreOrStr::Score(score)) => Ok(Some(score)),
        Some(ScoreOrStr::Str(raw)) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid score {raw:?}")))
        }
    }
}

/// 1-based page selector, already clamped by the API layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(results: Vec<T>, total_count: u64, request: PageRequest) -> Self {
        Self {
            results,
            total_count,
            page: request.page,
            page_size: request.page_size,
            total_pages: total_count.div_ceil(u64::from(request.page_size)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_zero_values() {
        let request = PageRequest::new(0, 0);
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 1);
        assert_eq!(request.offset(), 0);
    }

    #[test]
    fn page_request_offset_is_zero_based() {
        let request = PageRequest::new(3, 25);
        assert_eq!(request.offset(), 50);
        assert_eq!(request.limit(), 25);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: Page<u8> = Page::new(vec![], 21, PageRequest::new(1, 10));
        assert_eq!(page.total_pages, 3);

        let empty: Page<u8> = Page::new(vec![], 0, PageRequest::new(1, 10));
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn new_test_result_defaults_missing_fields() {
        let payload: NewTestResult =
            serde_json::from_str(r#"{"llm_output": "hi", "auto_eval": 4}"#).expect("parses");
        assert_eq!(payload.llm_output, "hi");
        assert_eq!(payload.auto_eval, 4);
        assert!(payload.input_under_test.is_empty());
        assert!(payload.human_feedback.is_none());
    }

    #[test]
    fn feedback_update_treats_blank_score_as_unset() {
        let id = Uuid::nil();
        for raw in [r#""""#, r#""  ""#, "null"] {
            let body = format!(r#"{{"id": "{id}", "human_eval": {raw}, "human_feedback": "ok"}}"#);
            let update: FeedbackUpdate = serde_json::from_str(&body).expect("parses");
            assert_eq!(update.human_eval, None, "human_eval = {raw}");
            assert_eq!(update.human_feedback.as_deref(), Some("ok"));
        }

        let missing: FeedbackUpdate =
            serde_json::from_str(&format!(r#"{{"id": "{id}"}}"#)).expect("parses");
        assert_eq!(missing.human_eval, None);
    }

    #[test]
    fn feedback_update_accepts_numeric_scores() {
        let id = Uuid::nil();
        for raw in ["4", r#""4""#] {
            let body = format!(r#"{{"id": "{id}", "human_eval": {raw}}}"#);
            let update: FeedbackUpdate = serde_json::from_str(&body).expect("parses");
            assert_eq!(update.human_eval, Some(4));
        }

        let bad = format!(r#"{{"id": "{id}", "human_eval": "great"}}"#);
        assert!(serde_json::from_str::<FeedbackUpdate>(&bad).is_err());
    }

    #[test]
    fn created_at_is_not_serialized() {
        let record = NewTestResult::with_human_feedback("fine").into_record(Uuid::nil(), Utc::now());
        let json = serde_json::to_value(&record).expect("serializes");
        assert!(json.get("created_at").is_none());
        assert_eq!(json["human_feedback"], "fine");
    }
}
