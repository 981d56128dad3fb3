use std::path::Path;

use rusty_gapminder::config::PipelineConfig;
use rusty_gapminder::data::filter::{ChartFilter, filtered_indices};
use rusty_gapminder::data::model::UnifiedRecord;
use rusty_gapminder::data::pipeline;
use tempfile::TempDir;

const GNI: &str = "\
country,2000,2001
A,1.2M,2500
B,800,900
C,\"3,5\",4000
";

// B 2001 uses a decimal comma and survives the join
const LEX: &str = "\
country,2000,2001
A,70.5,71
B,60,\"61,5\"
C,50,52
";

// C has no population for 2000: a leading blank with nothing to carry forward
const POP: &str = "\
country,2000,2001
A,500000,600000
B,2000000000,2100000000
C,,5000
";

fn write_fixture(dir: &Path) {
    std::fs::write(dir.join("gni.csv"), GNI).unwrap();
    std::fs::write(dir.join("lex.csv"), LEX).unwrap();
    std::fs::write(dir.join("pop.csv"), POP).unwrap();
}

fn rec(country: &str, year: i32, income: f64, life_expectancy: f64, population: f64) -> UnifiedRecord {
    UnifiedRecord {
        country: country.to_string(),
        year,
        income,
        life_expectancy,
        population,
    }
}

#[test]
fn end_to_end_fixture() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());

    let output = pipeline::run(&PipelineConfig::for_data_dir(dir.path())).unwrap();

    assert_eq!(
        output.dataset.records,
        vec![
            // suffixed value keeps its explicit scale
            rec("A", 2000, 1_200_000.0, 70.5, 500_000_000.0),
            rec("A", 2001, 2_500_000.0, 71.0, 600_000_000.0),
            rec("B", 2000, 800_000.0, 60.0, 2_000_000_000.0),
            // parsed from "61,5"
            rec("B", 2001, 900_000.0, 61.5, 2_100_000_000.0),
            rec("C", 2001, 4_000_000.0, 52.0, 5_000_000.0),
        ]
    );

    let report = &output.report;
    assert_eq!(report.population.unfilled, vec![("C".to_string(), 2000)]);
    assert_eq!(report.merge.income_rows, 6);
    assert_eq!(report.merge.population_rows, 5);
    assert_eq!(report.merge.merged_rows, 5);
    assert_eq!(report.life_expectancy.rescaled, 0);
}

#[test]
fn dropped_row_returns_when_population_is_present() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    std::fs::write(dir.path().join("pop.csv"), POP.replace("C,,5000", "C,4000,5000")).unwrap();

    let output = pipeline::run(&PipelineConfig::for_data_dir(dir.path())).unwrap();
    let c2000 = output
        .dataset
        .records
        .iter()
        .find(|r| r.country == "C" && r.year == 2000)
        .unwrap();
    assert_eq!(c2000.income, 3500.0);
    assert_eq!(c2000.population, 4_000_000.0);
    assert_eq!(output.dataset.len(), 6);
}

#[test]
fn blank_cells_are_filled_forward() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    std::fs::write(dir.path().join("lex.csv"), LEX.replace("B,60,\"61,5\"", "B,60,")).unwrap();

    let output = pipeline::run(&PipelineConfig::for_data_dir(dir.path())).unwrap();
    let b2001 = output
        .dataset
        .records
        .iter()
        .find(|r| r.country == "B" && r.year == 2001)
        .unwrap();
    assert_eq!(b2001.life_expectancy, 60.0);
    assert_eq!(output.report.life_expectancy.filled, 1);
}

#[test]
fn malformed_cell_rejects_by_default_and_zeroes_when_lenient() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    std::fs::write(dir.path().join("lex.csv"), LEX.replace("C,50,52", "C,50,n/a")).unwrap();

    let mut config = PipelineConfig::for_data_dir(dir.path());
    assert!(pipeline::run(&config).is_err());

    config.lenient = true;
    let output = pipeline::run(&config).unwrap();
    assert_eq!(output.report.life_expectancy.substituted, 1);
    let c2001 = output.dataset.records.last().unwrap();
    assert_eq!((c2001.country.as_str(), c2001.life_expectancy), ("C", 0.0));
}

#[test]
fn chart_filter_over_pipeline_output() {
    let dir = TempDir::new().unwrap();
    write_fixture(dir.path());
    let output = pipeline::run(&PipelineConfig::for_data_dir(dir.path())).unwrap();

    let mut filter = ChartFilter::init(&output.dataset);
    assert_eq!(filter.year, 2001);
    assert_eq!(filtered_indices(&output.dataset, &filter).len(), 3);

    filter.year = 2000;
    filter.countries.remove("A");
    let shown: Vec<&str> = filtered_indices(&output.dataset, &filter)
        .into_iter()
        .map(|i| output.dataset.records[i].country.as_str())
        .collect();
    assert_eq!(shown, vec!["B"]);
}
