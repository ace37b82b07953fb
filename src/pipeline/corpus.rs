//! Human feedback filtering ahead of vectorization.

/// Placeholder value reviewers type when they have nothing to say.
const NOT_APPLICABLE: &str = "n/a";

/// Feedback strings eligible for summarization, in store order.
///
/// Every entry is non-empty after trimming and is not `n/a` (case-insensitive).
/// Entries keep their original text; only the filter looks at the trimmed form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackCorpus {
    entries: Vec<String>,
}

impl FeedbackCorpus {
    pub fn from_raw<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let entries = raw
            .into_iter()
            .flatten()
            .filter(|feedback| is_valid_feedback(feedback))
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }
}

fn is_valid_feedback(feedback: &str) -> bool {
    let trimmed = feedback.trim();
    !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(NOT_APPLICABLE)
}
