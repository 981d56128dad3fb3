use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::Metric;
use crate::data::normalize::ParseMode;
use crate::data::rescale::RescalePolicy;

/// Default configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "gapminder.json";

/// Environment variable overriding [`PipelineConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "GAPMINDER_DATA_DIR";

/// Where one metric comes from and whether it is rescaled.
///
/// Unset fields fall back to the metric's defaults
/// ([`Metric::default_file`], [`Metric::rescales_by_default`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricSource {
    /// File name, relative to the data directory unless absolute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rescale: Option<bool>,
}

/// Pipeline configuration, read from JSON. Every field is optional:
///
/// ```json
/// {
///   "data_dir": "app",
///   "population": { "file": "pop.csv", "rescale": true },
///   "lenient": false,
///   "cache_file": "app/gapminder_data.parquet"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub income: MetricSource,
    pub life_expectancy: MetricSource,
    pub population: MetricSource,
    /// Replace malformed cells by zero instead of failing.
    pub lenient: bool,
    /// Parquet copy of the unified table, reused while sources are unchanged.
    pub cache_file: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            income: MetricSource::default(),
            life_expectancy: MetricSource::default(),
            population: MetricSource::default(),
            lenient: false,
            cache_file: None,
        }
    }
}

impl PipelineConfig {
    /// Defaults pointed at `data_dir`.
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Load `gapminder.json` if present, else defaults; then apply the
    /// environment override.
    pub fn discover() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        let mut config = if path.exists() {
            log::info!("Using configuration from {CONFIG_FILE}");
            Self::from_file(path)?
        } else {
            Self::default()
        };
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn source(&self, metric: Metric) -> &MetricSource {
        match metric {
            Metric::Income => &self.income,
            Metric::LifeExpectancy => &self.life_expectancy,
            Metric::Population => &self.population,
        }
    }

    /// Resolved path of a metric's source file.
    pub fn path_for(&self, metric: Metric) -> PathBuf {
        match &self.source(metric).file {
            Some(file) => self.data_dir.join(file),
            None => self.data_dir.join(metric.default_file()),
        }
    }

    /// Whether `metric` goes through the magnitude rescaler.
    pub fn rescales(&self, metric: Metric) -> bool {
        self.source(metric)
            .rescale
            .unwrap_or_else(|| metric.rescales_by_default())
    }

    pub fn rescale_policy(&self, metric: Metric) -> RescalePolicy {
        RescalePolicy::from_flag(self.rescales(metric))
    }

    pub fn parse_mode(&self) -> ParseMode {
        if self.lenient {
            ParseMode::Lenient
        } else {
            ParseMode::Strict
        }
    }
}
