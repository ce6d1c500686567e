/// Data layer: core types, loading, and projection.
///
/// Architecture:
/// ```text
///  .csv / .tsv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → CompositionTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ CompositionTable  │  Vec<CompositionRow>, component names
///   └──────────────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ projection  │  normalise / change basis → Vec<ProjectedPoint>
///   └────────────┘
/// ```

pub mod loader;
pub mod model;
pub mod projection;
