use crate::config::PipelineConfig;

use super::error::Result;
use super::fill::forward_fill;
use super::loader::read_wide_csv;
use super::merge::{MergeReport, inner_join, into_long_table};
use super::model::{LongTable, Metric, RawTable, UnifiedDataset};
use super::normalize::{ParseMode, normalize_cells};
use super::rescale::{self, RescalePolicy};
use super::reshape::melt;

/// Counts for one metric's trip through the cleaning stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricReport {
    pub cells: usize,
    pub dropped_columns: Vec<String>,
    pub substituted: usize,
    pub filled: usize,
    /// Leading gaps with nothing to carry forward; dropped from the table.
    pub unfilled: Vec<(String, i32)>,
    pub rescaled: usize,
    pub rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub income: MetricReport,
    pub life_expectancy: MetricReport,
    pub population: MetricReport,
    pub merge: MergeReport,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub dataset: UnifiedDataset,
    pub report: PipelineReport,
}

/// Turn one wide table into a clean long table.
pub fn clean_table(
    metric: Metric,
    table: &RawTable,
    mode: ParseMode,
    policy: RescalePolicy,
) -> Result<(LongTable, MetricReport)> {
    let cells = melt(table);
    let normalized = normalize_cells(&table.name, &cells, table.years.len(), mode)?;
    let mut observations = normalized.observations;

    let fill = forward_fill(&mut observations);
    if !fill.unfilled.is_empty() {
        log::warn!(
            "{metric}: {} leading gaps have no earlier value and are dropped",
            fill.unfilled.len()
        );
    }
    let rescaled = rescale::apply(&mut observations, policy);
    let long = into_long_table(metric, &observations)?;

    let report = MetricReport {
        cells: cells.len(),
        dropped_columns: normalized.dropped_columns,
        substituted: normalized.substituted,
        filled: fill.filled,
        unfilled: fill.unfilled,
        rescaled,
        rows: long.len(),
    };
    log::info!(
        "{metric}: {} cells → {} rows ({} filled, {} rescaled)",
        report.cells,
        report.rows,
        report.filled,
        report.rescaled
    );
    Ok((long, report))
}

/// Clean three already-loaded tables and join them.
pub fn run_tables(
    income: &RawTable,
    life_expectancy: &RawTable,
    population: &RawTable,
    config: &PipelineConfig,
) -> Result<PipelineOutput> {
    let mode = config.parse_mode();
    let clean = |metric: Metric, table: &RawTable| {
        clean_table(metric, table, mode, config.rescale_policy(metric))
    };

    let (income, income_report) = clean(Metric::Income, income)?;
    let (lex, lex_report) = clean(Metric::LifeExpectancy, life_expectancy)?;
    let (pop, pop_report) = clean(Metric::Population, population)?;

    let (records, merge) = inner_join(&income, &lex, &pop);
    log::info!(
        "Merged {} income / {} life expectancy / {} population rows into {} ({} dropped)",
        merge.income_rows,
        merge.life_expectancy_rows,
        merge.population_rows,
        merge.merged_rows,
        merge.dropped()
    );

    Ok(PipelineOutput {
        dataset: UnifiedDataset::from_records(records),
        report: PipelineReport {
            income: income_report,
            life_expectancy: lex_report,
            population: pop_report,
            merge,
        },
    })
}

/// Load the three source files named by `config` and produce the unified table.
///
/// All files are read before any cleaning starts, so a missing file aborts
/// the run without output.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutput> {
    let load = |metric: Metric| read_wide_csv(&config.path_for(metric), metric.column_name());

    let income = load(Metric::Income)?;
    let lex = load(Metric::LifeExpectancy)?;
    let pop = load(Metric::Population)?;

    run_tables(&income, &lex, &pop, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::error::PipelineError;
    use crate::data::model::RawRow;

    fn raw(name: &str, years: &[&str], rows: &[(&str, &[&str])]) -> RawTable {
        RawTable {
            name: name.to_string(),
            years: years.iter().map(|y| y.to_string()).collect(),
            rows: rows
                .iter()
                .map(|(country, cells)| RawRow {
                    country: country.to_string(),
                    cells: cells.iter().map(|c| c.to_string()).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn clean_table_runs_every_stage() {
        let table = raw(
            "income",
            &["2000", "2001", "2002"],
            &[("X", &["", "800", ""][..]), ("Y", &["2k", "", "1,5"][..])],
        );
        let (long, report) =
            clean_table(Metric::Income, &table, ParseMode::Strict, RescalePolicy::Heuristic).unwrap();

        let values: Vec<(&str, i32, f64)> = long
            .records
            .iter()
            .map(|r| (r.country.as_str(), r.year, r.value))
            .collect();
        assert_eq!(
            values,
            vec![
                ("X", 2001, 800_000.0),
                ("X", 2002, 800_000.0),
                ("Y", 2000, 2000.0),
                ("Y", 2001, 2000.0),
                ("Y", 2002, 1500.0),
            ]
        );
        assert_eq!(report.filled, 2);
        assert_eq!(report.unfilled, vec![("X".to_string(), 2000)]);
        assert_eq!(report.rows, 5);
        assert_eq!(report.rows + report.unfilled.len(), report.cells);
    }

    #[test]
    fn parse_errors_name_the_table() {
        let bad = raw("life_expectancy", &["2000"], &[("X", &["seventy"][..])]);
        let ok = raw("income", &["2000"], &[("X", &["1"][..])]);
        let err = run_tables(&ok, &bad, &ok, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ValueParse { ref table, .. } if table == "life_expectancy"
        ));
    }

    #[test]
    fn missing_source_file_aborts_before_merge() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("gni.csv"), "country,2000\nA,1\n").unwrap();
        std::fs::write(dir.path().join("lex.csv"), "country,2000\nA,70\n").unwrap();

        let err = run(&PipelineConfig::for_data_dir(dir.path())).unwrap_err();
        match err {
            PipelineError::FileLoad { path, .. } => assert!(path.ends_with("pop.csv")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
