use super::summarizer::ClusterSummary;

/// Joins cluster summaries with a single space, ascending by label.
///
/// An empty result means no summary was produced.
#[must_use]
pub fn aggregate(summaries: &[ClusterSummary]) -> String {
    let mut ordered: Vec<&ClusterSummary> = summaries.iter().collect();
    ordered.sort_by_key(|summary| summary.label);
    ordered
        .iter()
        .map(|summary| summary.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
