/// Data layer: core types, cleaning, loading, and querying.
///
/// Architecture:
/// ```text
///  per-pitcher .csv exports
///        │
///        ▼
///   ┌──────────┐   ┌────────────┐
///   │  clean    │──▶│ reclassify  │  strikeout / field_out subtypes
///   └──────────┘   └────────────┘
///        │  (+ roster: catcher id → team)
///        ▼
///   pitcher_data.csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → PitchDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  query    │  predicates + group/count → FlowTable
///   └──────────┘
/// ```

pub mod clean;
pub mod loader;
pub mod model;
pub mod query;
pub mod reclassify;
pub mod roster;
