use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::LevelFilter;

use crate::data::filter::{AssetFilter, MatchMode};
use crate::data::loader::{LoadOptions, ReportLayout};
use crate::data::mapping::AssetMapping;
use crate::error::{Result, RtlocsumError};

/// Command-line options. Everything the pipeline needs is derived from
/// this; there is no other configuration source besides the environment
/// fallback for `--mapping`.
#[derive(Debug, Parser)]
#[command(name = "rtlocsum", version)]
#[command(about = "Filter and summarize ISO-NE RTLOCSUM reports", long_about = None)]
pub struct Cli {
    /// RTLOCSUM report exported from the MIS
    pub report: PathBuf,

    /// Location-to-asset mapping CSV
    #[arg(long, env = "RTLOCSUM_MAPPING")]
    pub mapping: Option<PathBuf>,

    /// Asset to keep (repeatable). Without it the whole report is summarized
    #[arg(short, long = "asset", value_name = "NAME")]
    pub assets: Vec<String>,

    /// How asset names are matched [default: exact]
    #[arg(long = "match", requires = "assets", value_parser = ["exact", "substring"])]
    pub match_mode: Option<String>,

    /// Row layout of the report file
    #[arg(long, default_value = "mis", value_parser = ["mis", "plain"])]
    pub layout: String,

    /// Skip malformed rows with a warning instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Summarize as operations positions (requires --mapping)
    #[arg(long)]
    pub positions: bool,

    /// Write the filtered table to PATH ("-" for stdout)
    #[arg(short, long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Field delimiter for --export
    #[arg(long, default_value = "tab", value_parser = ["tab", "comma"])]
    pub delimiter: String,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with an error when no record matches the asset filter
    #[arg(long)]
    pub fail_on_empty: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Loader options, reading the mapping file when one is configured.
    pub fn load_options(&self) -> Result<LoadOptions> {
        let layout = match self.layout.as_str() {
            "mis" => ReportLayout::Mis,
            "plain" => ReportLayout::Plain,
            other => return Err(RtlocsumError::Config(format!("unknown layout '{other}'"))),
        };
        if self.positions && self.mapping.is_none() {
            return Err(RtlocsumError::Config(
                "--positions needs a location mapping (--mapping or RTLOCSUM_MAPPING)".to_string(),
            ));
        }
        let mapping = self.mapping.as_deref().map(AssetMapping::load).transpose()?;

        Ok(LoadOptions {
            layout,
            strict: !self.lenient,
            mapping,
            ..LoadOptions::default()
        })
    }

    /// The asset filter, or `None` when no asset was named.
    pub fn asset_filter(&self) -> Result<Option<AssetFilter>> {
        if self.assets.is_empty() {
            return Ok(None);
        }
        let mode = match self.match_mode.as_deref().unwrap_or("exact") {
            "exact" => MatchMode::Exact,
            "substring" => MatchMode::Substring,
            other => return Err(RtlocsumError::Config(format!("unknown match mode '{other}'"))),
        };
        Ok(Some(AssetFilter::new(self.assets.iter().cloned(), mode)))
    }

    pub fn delimiter_byte(&self) -> u8 {
        match self.delimiter.as_str() {
            "comma" => b',',
            _ => b'\t',
        }
    }

    /// Log level implied by `-v`; `RUST_LOG` still takes precedence.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}
