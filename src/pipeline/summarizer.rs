//! Summarizer - per-cluster prompt construction and LLM summarization.
//!
//! Clusters are summarized one at a time, in ascending label order. The first
//! failed or timed-out call aborts the whole run; no partial result escapes.
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::PipelineError;
use super::cluster::ClusterAssignment;
use super::corpus::FeedbackCorpus;
use crate::clients::TextGenerator;
use crate::observability::metrics::Metrics;

const PROMPT_HEADER: &str = "Please summarize the following feedback entries into 2-3 sentences:";
const PROMPT_FOOTER: &str =
    "Provide a concise summary that captures the key points and common themes.";

/// Generated summary for one non-empty cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSummary {
    pub label: usize,
    pub member_count: usize,
    pub text: String,
}

#[derive(Clone)]
pub struct ClusterSummarizer {
    generator: Arc<dyn TextGenerator>,
    call_timeout: Duration,
    metrics: Option<Arc<Metrics>>,
}

impl std::fmt::Debug for ClusterSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterSummarizer")
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl ClusterSummarizer {
    pub fn new(generator: Arc<dyn TextGenerator>, call_timeout: Duration) -> Self {
        Self {
            generator,
            call_timeout,
            metrics: None,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Summarizes every non-empty cluster, ascending by label.
    ///
    /// # Errors
    /// [`PipelineError::Generation`] or [`PipelineError::GenerationTimeout`] for
    /// the first cluster whose call fails; earlier summaries are discarded.
    pub async fn summarize(
        &self,
        assignment: &ClusterAssignment,
        corpus: &FeedbackCorpus,
    ) -> Result<Vec<ClusterSummary>, PipelineError> {
        let mut summaries = Vec::with_capacity(assignment.k());

        for label in 0..assignment.k() {
            let members: Vec<&str> = assignment
                .members(label)
                .filter_map(|index| corpus.get(index))
                .collect();
            if members.is_empty() {
                debug!(label, "skipping empty cluster");
                continue;
            }

            let prompt = build_prompt(&members);
            let text = self.generate(label, &prompt).await?;
            info!(label, member_count = members.len(), "cluster summarized");

            summaries.push(ClusterSummary {
                label,
                member_count: members.len(),
                text,
            });
        }

        Ok(summaries)
    }

    async fn generate(&self, label: usize, prompt: &str) -> Result<String, PipelineError> {
        if let Some(metrics) = &self.metrics {
            metrics.llm_calls.inc();
        }
        let started = Instant::now();
        let result = tokio::time::timeout(self.call_timeout, self.generator.generate(prompt)).await;
        if let Some(metrics) = &self.metrics {
            metrics.llm_call_duration.observe(started.elapsed().as_secs_f64());
        }

        match result {
            Ok(Ok(text)) => Ok(text.trim().to_string()),
            Ok(Err(source)) => {
                self.record_failure();
                warn!(label, error = %format!("{source:#}"), "text generation failed");
                Err(PipelineError::Generation { label, source })
            }
            Err(_) => {
                self.record_failure();
                warn!(label, timeout_ms = self.call_timeout.as_millis(), "text generation timed out");
                Err(PipelineError::GenerationTimeout {
                    label,
                    timeout: self.call_timeout,
                })
            }
        }
    }

    fn record_failure(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.llm_failures.inc();
        }
    }
}

/// Instruction line, one member per line, then the closing instruction.
pub(crate) fn build_prompt(members: &[&str]) -> String {
    let body_len: usize = members.iter().map(|member| member.len() + 1).sum();
    let mut prompt = String::with_capacity(PROMPT_HEADER.len() + PROMPT_FOOTER.len() + body_len + 3);
    prompt.push_str(PROMPT_HEADER);
    prompt.push_str("\n\n");
    for member in members {
        prompt.push_str(member);
        prompt.push('\n');
    }
    prompt.push('\n');
    prompt.push_str(PROMPT_FOOTER);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedGenerator;

    fn corpus(entries: &[&str]) -> FeedbackCorpus {
        FeedbackCorpus::from_raw(entries.iter().map(|e| Some((*e).to_string())))
    }

    #[test]
    fn prompt_lists_each_member_on_its_own_line() {
        let prompt = build_prompt(&["Too slow.", "Wrong answer."]);
        assert_eq!(
            prompt,
            "Please summarize the following feedback entries into 2-3 sentences:\n\n\
             Too slow.\nWrong answer.\n\n\
             Provide a concise summary that captures the key points and common themes."
        );
    }

    #[tokio::test]
    async fn summaries_follow_label_order_and_skip_empty_clusters() {
        let generator = Arc::new(ScriptedGenerator::replying(["  first  ", "second\n"]));
        let summarizer = ClusterSummarizer::new(generator.clone(), Duration::from_secs(1));
        let assignment = ClusterAssignment::new(3, vec![2, 0, 2]);

        let summaries = summarizer
            .summarize(&assignment, &corpus(&["a", "b", "c"]))
            .await
            .expect("summarizes");

        assert_eq!(
            summaries,
            vec![
                ClusterSummary {
                    label: 0,
                    member_count: 1,
                    text: "first".into()
                },
                ClusterSummary {
                    label: 2,
                    member_count: 2,
                    text: "second".into()
                },
            ]
        );
        assert_eq!(generator.call_count(), 2);
        let prompts = generator.prompts();
        assert!(prompts[0].contains("\nb\n"));
        assert!(prompts[1].contains("\na\nc\n"));
    }

    #[tokio::test]
    async fn failure_on_second_cluster_discards_first_summary() {
        let generator = Arc::new(ScriptedGenerator::failing_on(2, ["ok"]));
        let summarizer = ClusterSummarizer::new(generator.clone(), Duration::from_secs(1));
        let assignment = ClusterAssignment::new(3, vec![0, 1, 2]);

        let error = summarizer
            .summarize(&assignment, &corpus(&["a", "b", "c"]))
            .await
            .expect_err("second call fails");

        assert!(matches!(error, PipelineError::Generation { label: 1, .. }));
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn slow_generator_times_out() {
        let generator = Arc::new(
            ScriptedGenerator::replying(["late"]).with_delay(Duration::from_millis(200)),
        );
        let summarizer = ClusterSummarizer::new(generator, Duration::from_millis(20));
        let assignment = ClusterAssignment::new(1, vec![0]);

        let error = summarizer
            .summarize(&assignment, &corpus(&["a"]))
            .await
            .expect_err("times out");
        assert!(matches!(error, PipelineError::GenerationTimeout { label: 0, .. }));
    }
}
