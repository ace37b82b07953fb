use std::num::NonZeroUsize;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use super::PipelineError;
use super::vectorize::FeatureMatrix;
use crate::util::kmeans::KMeans;

/// Cluster label per corpus index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAssignment {
    k: usize,
    labels: Vec<usize>,
}

impl ClusterAssignment {
    /// # Panics
    /// Debug builds assert that every label is below `k`.
    #[must_use]
    pub fn new(k: usize, labels: Vec<usize>) -> Self {
        debug_assert!(labels.iter().all(|&label| label < k));
        Self { k, labels }
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Corpus indices carrying `label`, in corpus order.
    pub fn members(&self, label: usize) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(move |&(_, &assigned)| assigned == label)
            .map(|(index, _)| index)
    }
}

/// Chooses K and partitions the feature rows with K-Means.
#[derive(Debug, Clone)]
pub struct ClusterAssigner {
    max_clusters: NonZeroUsize,
    max_iterations: usize,
    seed: Option<u64>,
}

impl ClusterAssigner {
    #[must_use]
    pub fn new(max_clusters: NonZeroUsize, max_iterations: usize, seed: Option<u64>) -> Self {
        Self {
            max_clusters,
            max_iterations,
            seed,
        }
    }

    /// K = min(max_clusters, N); never more centers than points.
    #[must_use]
    pub fn cluster_count(&self, n_points: usize) -> usize {
        self.max_clusters.get().min(n_points)
    }

    /// Assigns every row of `matrix` to one of K clusters.
    ///
    /// Without a configured seed the initial centroids come from thread-local
    /// randomness, so label numbering can differ between runs on the same input.
    ///
    /// # Errors
    /// [`PipelineError::NoClusters`] when the matrix has no rows.
    pub fn assign(&self, matrix: &FeatureMatrix) -> Result<ClusterAssignment, PipelineError> {
        let k = self.cluster_count(matrix.n_rows());
        if k == 0 {
            return Err(PipelineError::NoClusters);
        }

        let kmeans = match self.seed {
            Some(seed) => KMeans::with_rng(
                matrix.rows(),
                k,
                self.max_iterations,
                &mut StdRng::seed_from_u64(seed),
            ),
            None => KMeans::new(matrix.rows(), k, self.max_iterations),
        };

        debug!(
            k,
            iterations = kmeans.iterations,
            seeded = self.seed.is_some(),
            "k-means finished"
        );

        Ok(ClusterAssignment::new(k, kmeans.assignments))
    }
}

impl Default for ClusterAssigner {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(3).unwrap_or(NonZeroUsize::MIN), 300, None)
    }
}
