use rand::Rng;
use rand::seq::IndexedRandom;

/// Lloyd's K-Means over dense feature rows.
#[derive(Debug, Clone)]
pub struct KMeans {
    pub centroids: Vec<Vec<f32>>,
    pub assignments: Vec<usize>,
    pub iterations: usize,
}

impl KMeans {
    /// Runs K-Means with thread-local randomness for centroid seeding.
    ///
    /// Labels are therefore not stable across runs; only membership is meaningful.
    ///
    /// # Arguments
    /// * `data` - List of data points (vectors).
    /// * `k` - Number of clusters; clamped to `data.len()`.
    /// * `max_iterations` - Maximum number of iterations.
    pub fn new(data: &[Vec<f32>], k: usize, max_iterations: usize) -> Self {
        Self::with_rng(data, k, max_iterations, &mut rand::rng())
    }

    /// Same as [`KMeans::new`] but draws initial centroids from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        data: &[Vec<f32>],
        k: usize,
        max_iterations: usize,
        rng: &mut R,
    ) -> Self {
        if data.is_empty() || k == 0 {
            return Self {
                centroids: vec![],
                assignments: vec![],
                iterations: 0,
            };
        }

        let k = k.min(data.len());
        let dim = data[0].len();

        // Initialize centroids with k distinct points
        let mut centroids: Vec<Vec<f32>> = data.choose_multiple(rng, k).cloned().collect();

        // usize::MAX marks "not yet assigned" so the first E-step always counts as a change
        let mut assignments = vec![usize::MAX; data.len()];
        let mut changes = true;
        let mut iterations = 0;

        while changes && iterations < max_iterations {
            changes = false;
            iterations += 1;

            // E-step: Assign points to nearest centroid
            let new_assignments: Vec<usize> = data
                .iter()
                .map(|point| nearest_centroid(point, &centroids))
                .collect();

            if new_assignments != assignments {
                assignments = new_assignments;
                changes = true;
            }

            // M-step: Update centroids
            let mut sums = vec![vec![0.0_f32; dim]; k];
            let mut counts = vec![0_usize; k];

            for (point, &cluster) in data.iter().zip(&assignments) {
                for (sum, val) in sums[cluster].iter_mut().zip(point) {
                    *sum += val;
                }
                counts[cluster] += 1;
            }

            let mut empty_clusters = Vec::new();
            for (j, centroid) in centroids.iter_mut().enumerate() {
                if counts[j] > 0 {
                    #[allow(clippy::cast_precision_loss)]
                    let count = counts[j] as f32;
                    for (value, sum) in centroid.iter_mut().zip(&sums[j]) {
                        *value = sum / count;
                    }
                } else {
                    empty_clusters.push(j);
                }
            }

            // Re-seed empty clusters from points no centroid sits on yet.
            // With fewer distinct points than k they stay empty.
            for j in empty_clusters {
                let uncovered: Vec<&Vec<f32>> = data
                    .iter()
                    .filter(|point| !centroids.contains(point))
                    .collect();
                if let Some(point) = uncovered.choose(rng) {
                    centroids[j].clone_from(point);
                    changes = true;
                }
            }
        }

        Self {
            centroids,
            assignments,
            iterations,
        }
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.centroids.len()
    }
}

fn nearest_centroid(point: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut min_dist_sq = f32::MAX;
    let mut best_cluster = 0;

    for (j, centroid) in centroids.iter().enumerate() {
        let dist_sq = distance_sq(point, centroid);
        if dist_sq < min_dist_sq {
            min_dist_sq = dist_sq;
            best_cluster = j;
        }
    }
    best_cluster
}

fn distance_sq(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}
