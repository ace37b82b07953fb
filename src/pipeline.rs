//! Human feedback summarization pipeline.
//!
//! Store → corpus filter → TF-IDF → K-Means → per-cluster LLM summary → join.
pub mod aggregate;
pub mod cluster;
pub mod corpus;
mod stop_words;
pub mod summarizer;
pub mod vectorize;

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, instrument};

use crate::config::Config;
use crate::observability::metrics::Metrics;
use crate::store::dao::TestResultDao;

pub use self::aggregate::aggregate;
pub use self::cluster::{ClusterAssigner, ClusterAssignment};
pub use self::corpus::FeedbackCorpus;
pub use self::summarizer::{ClusterSummarizer, ClusterSummary};
pub use self::vectorize::{FeatureMatrix, TfIdfVectorizer};

/// Message returned to callers when there is nothing to summarize.
pub const NO_VALID_FEEDBACK: &str = "No valid human feedbacks found";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to load human feedback: {0:#}")]
    Store(#[source] anyhow::Error),
    #[error("feedback corpus produced an empty vocabulary")]
    EmptyVocabulary,
    #[error("cluster count resolved to zero")]
    NoClusters,
    #[error("clustering task failed: {0}")]
    Clustering(String),
    #[error("text generation failed for cluster {label}: {source:#}")]
    Generation {
        label: usize,
        #[source]
        source: anyhow::Error,
    },
    #[error("text generation for cluster {label} timed out after {timeout:?}")]
    GenerationTimeout { label: usize, timeout: Duration },
}

/// Result of one summarization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// Aggregated cluster summaries.
    Summary(String),
    /// Corpus was empty after filtering; nothing was vectorized or generated.
    NoFeedback,
    /// No cluster produced any summary text.
    NoSummary,
}

impl SummaryOutcome {
    /// Text for the `summary` field of the HTTP response.
    #[must_use]
    pub fn as_response_text(&self) -> &str {
        match self {
            Self::Summary(text) => text,
            Self::NoFeedback => NO_VALID_FEEDBACK,
            Self::NoSummary => "",
        }
    }
}

/// Drives one summarization request end to end.
#[derive(Clone)]
pub struct FeedbackSummaryPipeline {
    dao: Arc<dyn TestResultDao>,
    vectorizer: TfIdfVectorizer,
    assigner: ClusterAssigner,
    summarizer: ClusterSummarizer,
    metrics: Option<Arc<Metrics>>,
}

impl FeedbackSummaryPipeline {
    pub fn new(
        dao: Arc<dyn TestResultDao>,
        assigner: ClusterAssigner,
        summarizer: ClusterSummarizer,
    ) -> Self {
        Self {
            dao,
            vectorizer: TfIdfVectorizer,
            assigner,
            summarizer,
            metrics: None,
        }
    }

    /// Wires the pipeline from configuration and the process-wide generator.
    pub fn from_config(
        config: &Config,
        dao: Arc<dyn TestResultDao>,
        generator: Arc<dyn crate::clients::TextGenerator>,
        metrics: Arc<Metrics>,
    ) -> Self {
        let assigner = ClusterAssigner::new(
            config.summary_max_clusters(),
            config.kmeans_max_iterations(),
            config.cluster_seed(),
        );
        let summarizer =
            ClusterSummarizer::new(generator, config.llm_timeout()).with_metrics(Arc::clone(&metrics));
        let mut pipeline = Self::new(dao, assigner, summarizer);
        pipeline.metrics = Some(metrics);
        pipeline
    }

    /// Builds the corpus, clusters it and summarizes each cluster.
    ///
    /// # Errors
    /// Any stage failure; no partially built summary is ever returned.
    #[instrument(skip_all)]
    pub async fn run(&self) -> Result<SummaryOutcome, PipelineError> {
        let started = Instant::now();
        if let Some(metrics) = &self.metrics {
            metrics.summarize_requests.inc();
        }

        let result = self.run_stages().await;

        if let Some(metrics) = &self.metrics {
            metrics.pipeline_duration.observe(started.elapsed().as_secs_f64());
            match &result {
                Ok(SummaryOutcome::NoFeedback) => metrics.empty_corpus.inc(),
                Ok(_) => {}
                Err(_) => metrics.summarize_failures.inc(),
            }
        }
        result
    }

    async fn run_stages(&self) -> Result<SummaryOutcome, PipelineError> {
        let raw = self
            .dao
            .list_human_feedback()
            .await
            .map_err(PipelineError::Store)?;
        let raw_count = raw.len();
        let corpus = FeedbackCorpus::from_raw(raw);

        info!(raw_count, corpus_size = corpus.len(), "feedback corpus built");
        if corpus.is_empty() {
            return Ok(SummaryOutcome::NoFeedback);
        }

        let assignment = self.cluster(corpus.clone()).await?;
        info!(
            corpus_size = corpus.len(),
            cluster_count = assignment.k(),
            "feedback clustered"
        );

        let summaries = self.summarizer.summarize(&assignment, &corpus).await?;
        let joined = aggregate(&summaries);
        if joined.trim().is_empty() {
            return Ok(SummaryOutcome::NoSummary);
        }

        info!(
            summarized_clusters = summaries.len(),
            summary_chars = joined.len(),
            "feedback summary generated"
        );
        Ok(SummaryOutcome::Summary(joined))
    }

    /// TF-IDF and K-Means are CPU-bound; keep them off the async workers.
    async fn cluster(&self, corpus: FeedbackCorpus) -> Result<ClusterAssignment, PipelineError> {
        let vectorizer = self.vectorizer;
        let assigner = self.assigner.clone();
        tokio::task::spawn_blocking(move || {
            let matrix = vectorizer.fit_transform(&corpus)?;
            assigner.assign(&matrix)
        })
        .await
        .map_err(|error| PipelineError::Clustering(error.to_string()))?
    }
}
