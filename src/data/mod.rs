/// Data layer: core types, loading, filtering, aggregation and export.
///
/// Architecture:
/// ```text
///  products endpoint / .json file
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse JSON → SalesDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ SalesDataset  │  Vec<SaleRecord>, column domains
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterCriteria → rows, column projection
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌───────────┐  ┌──────────┐
///   │ aggregate  │  │  export   │  FilteredTable → CSV
///   └───────────┘  └──────────┘
/// ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod format;
pub mod loader;
pub mod model;
