/// Data layer: core types, loading, filtering and summaries.
///
/// Architecture:
/// ```text
///  SR_RTLOCSUM.csv        location mapping .csv
///        │                        │
///        ▼                        ▼
///   ┌──────────┐            ┌──────────┐
///   │  loader   │◄───────────│  mapping  │
///   └──────────┘            └──────────┘
///        │  parse rows → Table
///        ▼
///   ┌────────────┐
///   │  positions  │  optional: dispatch / LMP per asset-hour
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  keep records of the selected assets → new Table
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌──────────┐   ┌──────────┐
///   │  summary  │   │  export   │  delimited text for spreadsheets
///   └──────────┘   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod mapping;
pub mod model;
pub mod positions;
pub mod summary;
