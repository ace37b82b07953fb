/// Prometheus metric definitions.
use prometheus::{
    Counter, Histogram, HistogramOpts, Registry, register_counter_with_registry,
    register_histogram_with_registry,
};
use std::sync::Arc;

/// Metric collector.
#[derive(Debug, Clone)]
pub struct Metrics {
    // Counters
    pub summarize_requests: Counter,
    pub summarize_failures: Counter,
    pub empty_corpus: Counter,
    pub llm_calls: Counter,
    pub llm_failures: Counter,
    pub test_results_created: Counter,
    pub feedback_updates: Counter,

    // Histograms
    pub pipeline_duration: Histogram,
    pub llm_call_duration: Histogram,
}

impl Metrics {
    /// Registers every metric on `registry`.
    ///
    /// # Errors
    /// Fails when a metric with the same name is already registered.
    pub fn new(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            summarize_requests: register_counter_with_registry!(
                "feedback_recap_summarize_requests_total",
                "Total number of feedback summarization requests",
                registry
            )?,
            summarize_failures: register_counter_with_registry!(
                "feedback_recap_summarize_failures_total",
                "Total number of summarization requests that failed",
                registry
            )?,
            empty_corpus: register_counter_with_registry!(
                "feedback_recap_empty_corpus_total",
                "Summarization requests that found no valid human feedback",
                registry
            )?,
            llm_calls: register_counter_with_registry!(
                "feedback_recap_llm_calls_total",
                "Total number of text generation calls",
                registry
            )?,
            llm_failures: register_counter_with_registry!(
                "feedback_recap_llm_failures_total",
                "Text generation calls that failed or timed out",
                registry
            )?,
            test_results_created: register_counter_with_registry!(
                "feedback_recap_test_results_created_total",
                "Total number of evaluation records created",
                registry
            )?,
            feedback_updates: register_counter_with_registry!(
                "feedback_recap_feedback_updates_total",
                "Total number of human feedback updates applied",
                registry
            )?,
            pipeline_duration: register_histogram_with_registry!(
                HistogramOpts::new(
                    "feedback_recap_pipeline_duration_seconds",
                    "End-to-end summarization pipeline duration"
                )
                .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
                registry
            )?,
            llm_call_duration: register_histogram_with_registry!(
                HistogramOpts::new(
                    "feedback_recap_llm_call_duration_seconds",
                    "Duration of a single text generation call"
                )
                .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
                registry
            )?,
        })
    }
}
