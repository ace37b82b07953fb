//! TF-IDF vectorization of the feedback corpus.
use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use super::PipelineError;
use super::corpus::FeedbackCorpus;
use super::stop_words::is_stop_word;

#[allow(clippy::expect_used)]
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern compiles"));

/// Dense TF-IDF rows, one per corpus entry, in corpus order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    vocabulary: Vec<String>,
    rows: Vec<Vec<f32>>,
}

impl FeatureMatrix {
    #[must_use]
    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    #[must_use]
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Smoothed TF-IDF (`idf = ln((1 + n) / (1 + df)) + 1`) with L2-normalized rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct TfIdfVectorizer;

impl TfIdfVectorizer {
    /// Builds the vocabulary from `corpus` and returns its TF-IDF matrix.
    ///
    /// # Errors
    /// [`PipelineError::EmptyVocabulary`] when every entry consists only of stop
    /// words or single-character tokens.
    pub fn fit_transform(&self, corpus: &FeedbackCorpus) -> Result<FeatureMatrix, PipelineError> {
        let documents: Vec<Vec<String>> = corpus.entries().iter().map(|e| tokenize(e)).collect();

        // Sorted vocabulary keeps column order deterministic.
        let vocabulary: Vec<String> = documents
            .iter()
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if vocabulary.is_empty() {
            return Err(PipelineError::EmptyVocabulary);
        }
        let index: BTreeMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.as_str(), i))
            .collect();

        let mut document_frequency = vec![0_usize; vocabulary.len()];
        let mut term_counts: Vec<Vec<f32>> = Vec::with_capacity(documents.len());
        for tokens in &documents {
            let mut counts = vec![0.0_f32; vocabulary.len()];
            for token in tokens {
                counts[index[token.as_str()]] += 1.0;
            }
            for (df, count) in document_frequency.iter_mut().zip(&counts) {
                if *count > 0.0 {
                    *df += 1;
                }
            }
            term_counts.push(counts);
        }

        #[allow(clippy::cast_precision_loss)]
        let n_documents = documents.len() as f32;
        #[allow(clippy::cast_precision_loss)]
        let idf: Vec<f32> = document_frequency
            .iter()
            .map(|&df| ((1.0 + n_documents) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        let rows = term_counts
            .into_iter()
            .map(|mut row| {
                for (value, weight) in row.iter_mut().zip(&idf) {
                    *value *= weight;
                }
                l2_normalize(&mut row);
                row
            })
            .collect();

        Ok(FeatureMatrix { vocabulary, rows })
    }
}

/// Lowercases `text` and keeps word tokens of two or more characters that are not stop words.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}

fn l2_normalize(row: &mut [f32]) {
    let norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in row.iter_mut() {
            *value /= norm;
        }
    }
}
