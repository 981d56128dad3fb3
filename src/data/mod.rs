//! Data layer: core types, cleaning stages, merging, caching and filtering.
//!
//! Architecture:
//! ```text
//!  gni.csv / lex.csv / pop.csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  CSV → RawTable (wide)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ reshape   │  RawTable → (country, year, raw) cells
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐   ┌──────┐   ┌─────────┐
//!   │ normalize  │ → │ fill │ → │ rescale │   per metric
//!   └───────────┘   └──────┘   └─────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  merge    │  inner join on (country, year) → UnifiedDataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  year + country selection → visible indices
//!   └──────────┘
//! ```

pub mod cache;
pub mod error;
pub mod fill;
pub mod filter;
pub mod loader;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod rescale;
pub mod reshape;
