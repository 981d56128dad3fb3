use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int32Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Float64Type, Int32Type, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::error::{PipelineError, Result};
use super::model::{Metric, RawRow, RawTable, UnifiedDataset, UnifiedRecord};

/// Schema metadata key holding the source fingerprint of a cached table.
pub const FINGERPRINT_KEY: &str = "rusty_gapminder.fingerprint";

// ---------------------------------------------------------------------------
// Source dispatch
// ---------------------------------------------------------------------------

/// What a user-picked path points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Directory holding `gni.csv`, `lex.csv` and `pop.csv`.
    DataDir(PathBuf),
    /// A unified table written by [`write_parquet`] or the legacy script.
    Parquet(PathBuf),
}

impl Source {
    /// Classify a path. Dispatch by extension for files.
    pub fn detect(path: &Path) -> Result<Source> {
        if path.is_dir() {
            return Ok(Source::DataDir(path.to_path_buf()));
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match ext.as_str() {
            "parquet" | "pq" => Ok(Source::Parquet(path.to_path_buf())),
            other => Err(PipelineError::UnsupportedFile {
                path: path.to_path_buf(),
                extension: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Wide CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header `country,<year>,<year>,...`, one row per country.
///
/// Rows shorter than the header are padded with blank cells; extra trailing
/// cells are ignored.
pub fn read_wide_csv(path: &Path, name: &str) -> Result<RawTable> {
    let file = File::open(path).map_err(|source| PipelineError::FileLoad {
        path: path.to_path_buf(),
        source,
    })?;
    let csv_err = |source| PipelineError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let headers = reader.headers().map_err(csv_err)?.clone();

    let first = headers
        .get(0)
        .unwrap_or("")
        .trim_start_matches('\u{feff}')
        .trim();
    if !first.eq_ignore_ascii_case("country") {
        return Err(PipelineError::MissingCountryColumn {
            table: name.to_string(),
            found: first.to_string(),
        });
    }
    let years: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        let country = record.get(0).unwrap_or("").trim().to_string();
        let mut cells: Vec<String> = record
            .iter()
            .skip(1)
            .take(years.len())
            .map(str::to_string)
            .collect();
        cells.resize(years.len(), String::new());
        rows.push(RawRow { country, cells });
    }

    log::debug!(
        "Read {} countries × {} years from {}",
        rows.len(),
        years.len(),
        path.display()
    );
    Ok(RawTable {
        name: name.to_string(),
        years,
        rows,
    })
}

// ---------------------------------------------------------------------------
// Parquet writer
// ---------------------------------------------------------------------------

fn unified_schema(fingerprint: Option<&str>) -> Schema {
    let mut fields = vec![
        Field::new("country", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
    ];
    fields.extend(
        Metric::ALL
            .iter()
            .map(|m| Field::new(m.column_name(), DataType::Float64, false)),
    );
    let metadata: HashMap<String, String> = fingerprint
        .map(|fp| (FINGERPRINT_KEY.to_string(), fp.to_string()))
        .into_iter()
        .collect();
    Schema::new_with_metadata(fields, metadata)
}

/// Persist a unified table, tagging it with the fingerprint of its sources.
pub fn write_parquet(dataset: &UnifiedDataset, path: &Path, fingerprint: Option<&str>) -> Result<()> {
    let schema = Arc::new(unified_schema(fingerprint));
    let records = &dataset.records;

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| r.country.as_str()))),
        Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.year))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.income))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.life_expectancy))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| r.population))),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let file = File::create(path).map_err(|source| PipelineError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// A unified table read back from disk.
#[derive(Debug, Clone)]
pub struct StoredDataset {
    pub dataset: UnifiedDataset,
    /// Fingerprint of the sources it was built from, if recorded.
    pub fingerprint: Option<String>,
}

/// Load a unified table.
///
/// Expected schema: `country` (Utf8), `year` (any integer), and the three
/// metric columns (any numeric), named either `income`/`life_expectancy`/
/// `population` or `GNI`/`LEX`/`POP`. Other columns are ignored.
pub fn load_parquet(path: &Path) -> Result<StoredDataset> {
    let file = File::open(path).map_err(|source| PipelineError::FileLoad {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let fingerprint = builder.schema().metadata().get(FINGERPRINT_KEY).cloned();
    let reader = builder.build()?;

    let invalid = |reason: String| PipelineError::InvalidCacheFile {
        path: path.to_path_buf(),
        reason,
    };

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;

        let column = |names: &[&str], to: &DataType| -> Result<ArrayRef> {
            let col = names
                .iter()
                .find_map(|n| batch.column_by_name(n))
                .ok_or_else(|| invalid(format!("missing '{}' column", names[0])))?;
            if col.null_count() > 0 {
                return Err(invalid(format!("null values in '{}'", names[0])));
            }
            Ok(cast(col, to)?)
        };

        let countries = column(&["country"], &DataType::Utf8)?;
        let years = column(&["year"], &DataType::Int32)?;
        let metrics: Vec<ArrayRef> = Metric::ALL
            .iter()
            .map(|m| column(&[m.column_name(), m.legacy_column_name()], &DataType::Float64))
            .collect::<Result<_>>()?;

        let countries = countries.as_string::<i32>();
        let years = years.as_primitive::<Int32Type>();
        let income = metrics[0].as_primitive::<Float64Type>();
        let lex = metrics[1].as_primitive::<Float64Type>();
        let pop = metrics[2].as_primitive::<Float64Type>();

        for row in 0..batch.num_rows() {
            records.push(UnifiedRecord {
                country: countries.value(row).to_string(),
                year: years.value(row),
                income: income.value(row),
                life_expectancy: lex.value(row),
                population: pop.value(row),
            });
        }
    }

    log::info!("Loaded {} rows from {}", records.len(), path.display());
    Ok(StoredDataset {
        dataset: UnifiedDataset::from_records(records),
        fingerprint,
    })
}
