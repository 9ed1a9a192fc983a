//! Parsing, filtering and summaries for ISO-NE real-time locational
//! summary (RTLOCSUM) reports.
//!
//! ```no_run
//! use std::path::Path;
//! use rtlocsum::{filter_assets, load_report, summarize, AssetFilter, LoadOptions};
//!
//! let table = load_report(Path::new("SR_RTLOCSUM.csv"), &LoadOptions::default())?;
//! let selected = filter_assets(&table, &AssetFilter::exact(["Cabot", "Turners Falls"]));
//! println!("{}", summarize(&selected));
//! # Ok::<(), rtlocsum::RtlocsumError>(())
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;

pub use data::export::{write_delimited, TAB};
pub use data::filter::{filter_assets, AssetFilter, MatchMode};
pub use data::loader::{load_report, read_report, LoadOptions, ReportLayout};
pub use data::mapping::AssetMapping;
pub use data::model::{AssetInfo, Record, Table, TableShape};
pub use data::positions::summarize_positions;
pub use data::summary::{summarize, DateRange, Summary};
pub use error::{Result, RtlocsumError};
