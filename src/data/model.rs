use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Metric – which of the three source tables a value belongs to
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Income,
    LifeExpectancy,
    Population,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Income, Metric::LifeExpectancy, Metric::Population];

    /// Column name in the unified table.
    pub fn column_name(self) -> &'static str {
        match self {
            Metric::Income => "income",
            Metric::LifeExpectancy => "life_expectancy",
            Metric::Population => "population",
        }
    }

    /// Column name used by the original preprocessing script's Parquet output.
    pub fn legacy_column_name(self) -> &'static str {
        match self {
            Metric::Income => "GNI",
            Metric::LifeExpectancy => "LEX",
            Metric::Population => "POP",
        }
    }

    /// Default source file name inside the data directory.
    pub fn default_file(self) -> &'static str {
        match self {
            Metric::Income => "gni.csv",
            Metric::LifeExpectancy => "lex.csv",
            Metric::Population => "pop.csv",
        }
    }

    /// Life expectancy is already in years; the other two need rescaling.
    pub fn rescales_by_default(self) -> bool {
        !matches!(self, Metric::LifeExpectancy)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ---------------------------------------------------------------------------
// RawTable – a wide source table, cells kept verbatim
// ---------------------------------------------------------------------------

/// One country's row of a wide table; `cells[i]` belongs to `RawTable::years[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub country: String,
    pub cells: Vec<String>,
}

/// Wide table: one row per country, one column per year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Table name used in error messages (usually the metric).
    pub name: String,
    /// Year column headers in file order, as written.
    pub years: Vec<String>,
    pub rows: Vec<RawRow>,
}

// ---------------------------------------------------------------------------
// Intermediate long forms
// ---------------------------------------------------------------------------

/// One (country, year-column) cell of a wide table, not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeltedCell {
    pub country: String,
    pub year: String,
    pub raw: String,
}

/// A normalized cell. `value == None` means missing (blank in the source).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation<'a> {
    pub country: &'a str,
    pub year: i32,
    pub value: Option<f64>,
    /// The source cell carried a `k`/`M`/`B` suffix, so its scale is known.
    pub explicit_unit: bool,
}

/// One (country, year) value of a single metric.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub country: String,
    pub year: i32,
    pub value: f64,
}

/// A single metric's long table; keys are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct LongTable {
    pub metric: Metric,
    pub records: Vec<LongRecord>,
}

impl LongTable {
    pub fn new(metric: Metric, records: Vec<LongRecord>) -> Self {
        Self { metric, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// UnifiedDataset – the merged artifact consumed by the viewer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedRecord {
    pub country: String,
    pub year: i32,
    pub income: f64,
    pub life_expectancy: f64,
    pub population: f64,
}

/// The merged dataset with pre-computed indices.
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedDataset {
    /// Records ordered by (country, year).
    pub records: Vec<UnifiedRecord>,
    /// Sorted unique countries.
    pub countries: BTreeSet<String>,
    /// Sorted unique years.
    pub years: BTreeSet<i32>,
}

impl UnifiedDataset {
    /// Build indices from merged records.
    pub fn from_records(mut records: Vec<UnifiedRecord>) -> Self {
        records.sort_by(|a, b| a.country.cmp(&b.country).then(a.year.cmp(&b.year)));
        let countries = records.iter().map(|r| r.country.clone()).collect();
        let years = records.iter().map(|r| r.year).collect();
        UnifiedDataset {
            records,
            countries,
            years,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn year_range(&self) -> Option<(i32, i32)> {
        Some((*self.years.first()?, *self.years.last()?))
    }

    /// Smallest positive and largest income over all years.
    ///
    /// Non-positive incomes are skipped since the chart's x axis is logarithmic.
    pub fn income_range(&self) -> Option<(f64, f64)> {
        self.records
            .iter()
            .map(|r| r.income)
            .filter(|v| *v > 0.0)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Largest population over all years.
    pub fn max_population(&self) -> f64 {
        self.records
            .iter()
            .map(|r| r.population)
            .fold(0.0, f64::max)
    }
}
