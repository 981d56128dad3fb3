use std::collections::BTreeSet;

use super::model::UnifiedDataset;

// ---------------------------------------------------------------------------
// Filter predicate: which year and countries are shown
// ---------------------------------------------------------------------------

/// Chart selection: exactly one year, any set of countries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFilter {
    pub year: i32,
    /// Selected countries. Empty means nothing is shown.
    pub countries: BTreeSet<String>,
}

impl ChartFilter {
    /// Latest year, every country selected.
    pub fn init(dataset: &UnifiedDataset) -> Self {
        ChartFilter {
            year: dataset.year_range().map_or(0, |(_, max)| max),
            countries: dataset.countries.clone(),
        }
    }
}

/// Return indices of records that pass the filter.
///
/// A record passes when its year equals `filter.year` and its country is
/// in `filter.countries`.
pub fn filtered_indices(dataset: &UnifiedDataset, filter: &ChartFilter) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.year == filter.year && filter.countries.contains(&r.country))
        .map(|(i, _)| i)
        .collect()
}
