use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rusty_gapminder::config::PipelineConfig;
use rusty_gapminder::data::cache::DatasetCache;
use rusty_gapminder::data::filter::{ChartFilter, filtered_indices};
use rusty_gapminder::data::loader::{self, Source};
use rusty_gapminder::data::model::UnifiedDataset;

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: PipelineConfig,

    /// Survives reloads; only re-runs the pipeline when sources change.
    pub cache: DatasetCache,

    /// Loaded dataset (None until the first successful load).
    pub dataset: Option<Arc<UnifiedDataset>>,

    /// Year and country selection.
    pub filter: Option<ChartFilter>,

    /// Indices of records passing the current filter (cached).
    pub visible_indices: Vec<usize>,

    pub color_map: Option<ColorMap>,

    /// Text typed into the country search box.
    pub country_query: String,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            cache: DatasetCache::new(),
            dataset: None,
            filter: None,
            visible_indices: Vec::new(),
            color_map: None,
            country_query: String::new(),
            status_message: None,
        }
    }

    /// Load from the configured data directory, through the cache.
    pub fn load(&mut self) {
        let result = self
            .cache
            .get_or_load(&self.config)
            .with_context(|| format!("loading data from {}", self.config.data_dir.display()));
        self.apply(result);
    }

    /// Forget the cached dataset and load again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        self.load();
    }

    /// Open a user-picked data directory or Parquet file.
    pub fn open_path(&mut self, path: &Path) {
        match Source::detect(path) {
            Ok(Source::DataDir(dir)) => {
                self.config.data_dir = dir;
                self.load();
            }
            Ok(Source::Parquet(file)) => {
                let result = loader::load_parquet(&file)
                    .map(|stored| Arc::new(stored.dataset))
                    .with_context(|| format!("reading {}", file.display()));
                self.apply(result);
            }
            Err(e) => self.apply(Err(e.into())),
        }
    }

    /// Write the current dataset to `path`.
    pub fn export(&mut self, path: &Path) {
        let Some(ds) = &self.dataset else {
            return;
        };
        if let Err(e) = loader::write_parquet(ds, path, None) {
            log::error!("Export failed: {e}");
            self.status_message = Some(format!("Error: {e}"));
        }
    }

    fn apply(&mut self, result: Result<Arc<UnifiedDataset>>) {
        match result {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows, {} countries",
                    dataset.len(),
                    dataset.countries.len()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load data: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset, initialise filter and colours.
    ///
    /// The previous year and country selection is kept when still valid.
    pub fn set_dataset(&mut self, dataset: Arc<UnifiedDataset>) {
        let mut filter = ChartFilter::init(&dataset);
        if let Some(previous) = &self.filter {
            if dataset.years.contains(&previous.year) {
                filter.year = previous.year;
            }
        }
        self.filter = Some(filter);
        self.color_map = Some(ColorMap::new(&dataset.countries));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` after a selection change.
    pub fn refilter(&mut self) {
        if let (Some(ds), Some(filter)) = (&self.dataset, &self.filter) {
            self.visible_indices = filtered_indices(ds, filter);
        }
    }

    pub fn set_year(&mut self, year: i32) {
        if let Some(filter) = &mut self.filter {
            filter.year = year;
        }
        self.refilter();
    }

    /// Toggle one country in the selection.
    pub fn toggle_country(&mut self, country: &str) {
        if let Some(filter) = &mut self.filter {
            if !filter.countries.remove(country) {
                filter.countries.insert(country.to_string());
            }
        }
        self.refilter();
    }

    pub fn select_all(&mut self) {
        if let (Some(ds), Some(filter)) = (&self.dataset, &mut self.filter) {
            filter.countries = ds.countries.clone();
        }
        self.refilter();
    }

    pub fn select_none(&mut self) {
        if let Some(filter) = &mut self.filter {
            filter.countries.clear();
        }
        self.refilter();
    }
}
