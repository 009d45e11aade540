/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → EmissionsDataset (worker thread)
///   └──────────┘
///        │
///        ▼
///   ┌─────────────────┐
///   │ EmissionsDataset │  Vec<Observation>, first-seen country list
///   └─────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  country + non-zero predicate → view indices
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
