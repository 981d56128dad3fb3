//! Headless run of the cleaning pipeline, writing the unified table to Parquet.
//!
//! Usage: `preprocess [config.json] [output.parquet]`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusty_gapminder::config::PipelineConfig;
use rusty_gapminder::data::cache::Fingerprint;
use rusty_gapminder::data::loader::write_parquet;
use rusty_gapminder::data::pipeline;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args_os().skip(1);
    let config = match args.next() {
        Some(path) => PipelineConfig::from_file(Path::new(&path))?,
        None => PipelineConfig::discover()?,
    };
    let output_path = args
        .next()
        .map(PathBuf::from)
        .or_else(|| config.cache_file.clone())
        .unwrap_or_else(|| config.data_dir.join("gapminder_data.parquet"));

    let fingerprint = Fingerprint::of_sources(&config).context("fingerprinting sources")?;
    let output = pipeline::run(&config)
        .with_context(|| format!("processing tables in {}", config.data_dir.display()))?;

    let report = &output.report;
    for (metric, r) in [
        ("income", &report.income),
        ("life_expectancy", &report.life_expectancy),
        ("population", &report.population),
    ] {
        if !r.unfilled.is_empty() {
            log::warn!("{metric}: no earlier value for {} cells", r.unfilled.len());
        }
    }

    write_parquet(&output.dataset, &output_path, Some(fingerprint.as_str()))
        .with_context(|| format!("writing {}", output_path.display()))?;

    println!(
        "Wrote {} rows ({} countries) to {} ({} rows dropped by the join)",
        output.dataset.len(),
        output.dataset.countries.len(),
        output_path.display(),
        report.merge.dropped()
    );
    Ok(())
}
