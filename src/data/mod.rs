/// Data layer: table types, loading, and export.
///
/// Architecture:
/// ```text
///  uploaded .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → DataTable (per-column dtype inference)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  DataTable    │  Vec<Series>, row-aligned
///   └──────────────┘
///        │  pipeline::predict
///        ▼
///   ┌──────────────┐
///   │  ResultTable  │  DataTable + Predicted_AQI
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  ResultTable → CSV / Parquet bytes
///   └──────────┘
/// ```

pub mod export;
pub mod loader;
pub mod model;
