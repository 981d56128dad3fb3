use std::collections::BTreeMap;

use super::error::{PipelineError, Result};
use super::model::{LongRecord, LongTable, Metric, Observation, UnifiedRecord};

/// Collect filled observations into a keyed long table.
///
/// Observations still missing after filling are dropped; the filler already
/// reports them. A repeated (country, year) is an error.
pub fn into_long_table(metric: Metric, observations: &[Observation<'_>]) -> Result<LongTable> {
    let mut keyed: BTreeMap<(&str, i32), Option<f64>> = BTreeMap::new();

    for obs in observations {
        if keyed.insert((obs.country, obs.year), obs.value).is_some() {
            return Err(PipelineError::DuplicateKey {
                metric,
                country: obs.country.to_string(),
                year: obs.year,
            });
        }
    }

    let records: Vec<LongRecord> = keyed
        .into_iter()
        .filter_map(|((country, year), value)| {
            Some(LongRecord {
                country: country.to_string(),
                year,
                value: value?,
            })
        })
        .collect();
    Ok(LongTable::new(metric, records))
}

/// Row counts around the join, so small overlaps are visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub income_rows: usize,
    pub life_expectancy_rows: usize,
    pub population_rows: usize,
    pub merged_rows: usize,
}

impl MergeReport {
    /// Rows of the largest input that found no partner.
    pub fn dropped(&self) -> usize {
        self.income_rows
            .max(self.life_expectancy_rows)
            .max(self.population_rows)
            - self.merged_rows
    }
}

fn index(table: &LongTable) -> BTreeMap<(&str, i32), f64> {
    table
        .records
        .iter()
        .map(|r| ((r.country.as_str(), r.year), r.value))
        .collect()
}

/// Inner join income ⋈ life expectancy ⋈ population on (country, year).
///
/// Output is ordered by (country, year).
pub fn inner_join(
    income: &LongTable,
    life_expectancy: &LongTable,
    population: &LongTable,
) -> (Vec<UnifiedRecord>, MergeReport) {
    let lex = index(life_expectancy);
    let pop = index(population);

    let mut merged: Vec<UnifiedRecord> = income
        .records
        .iter()
        .filter_map(|r| {
            let key = (r.country.as_str(), r.year);
            Some(UnifiedRecord {
                country: r.country.clone(),
                year: r.year,
                income: r.value,
                life_expectancy: *lex.get(&key)?,
                population: *pop.get(&key)?,
            })
        })
        .collect();
    merged.sort_by(|a, b| a.country.cmp(&b.country).then(a.year.cmp(&b.year)));

    let report = MergeReport {
        income_rows: income.len(),
        life_expectancy_rows: life_expectancy.len(),
        population_rows: population.len(),
        merged_rows: merged.len(),
    };
    (merged, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(metric: Metric, rows: &[(&str, i32, f64)]) -> LongTable {
        LongTable::new(
            metric,
            rows.iter()
                .map(|&(country, year, value)| LongRecord {
                    country: country.to_string(),
                    year,
                    value,
                })
                .collect(),
        )
    }

    #[test]
    fn inner_join_drops_partial_keys() {
        let income = table(Metric::Income, &[("A", 2000, 1.0), ("B", 2000, 2.0)]);
        let lex = table(Metric::LifeExpectancy, &[("A", 2000, 70.0)]);
        let pop = table(Metric::Population, &[("A", 2000, 5.0), ("B", 2000, 6.0)]);

        let (merged, report) = inner_join(&income, &lex, &pop);
        assert_eq!(
            merged,
            vec![UnifiedRecord {
                country: "A".into(),
                year: 2000,
                income: 1.0,
                life_expectancy: 70.0,
                population: 5.0,
            }]
        );
        assert_eq!(report.merged_rows, 1);
        assert_eq!(report.dropped(), 1);
    }

    #[test]
    fn keys_only_in_later_tables_are_dropped() {
        let income = table(Metric::Income, &[("A", 2000, 1.0)]);
        let lex = table(Metric::LifeExpectancy, &[("A", 2000, 70.0), ("C", 1999, 40.0)]);
        let pop = table(Metric::Population, &[("A", 2000, 5.0), ("C", 1999, 9.0)]);

        let (merged, _) = inner_join(&income, &lex, &pop);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].country, "A");
    }

    #[test]
    fn irregular_year_sets_join_on_common_years() {
        let income = table(Metric::Income, &[("A", 1999, 1.0), ("A", 2000, 2.0)]);
        let lex = table(Metric::LifeExpectancy, &[("A", 2000, 70.0), ("A", 2001, 71.0)]);
        let pop = table(Metric::Population, &[("A", 2000, 5.0)]);

        let (merged, report) = inner_join(&income, &lex, &pop);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].year, 2000);
        assert_eq!(report.income_rows, 2);
    }

    fn obs(country: &str, year: i32, value: Option<f64>) -> Observation<'_> {
        Observation {
            country,
            year,
            value,
            explicit_unit: false,
        }
    }

    #[test]
    fn long_table_drops_unfilled_values() {
        let series = vec![obs("A", 2001, Some(2.0)), obs("A", 2000, None)];
        let long = into_long_table(Metric::Income, &series).unwrap();
        assert_eq!(long.records.len(), 1);
        assert_eq!(long.records[0].year, 2001);
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let series = vec![obs("A", 2000, Some(1.0)), obs("A", 2000, Some(2.0))];
        let err = into_long_table(Metric::Population, &series).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::DuplicateKey { year: 2000, .. }
        ));
    }
}
