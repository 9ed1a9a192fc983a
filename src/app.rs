use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::Cli;
use crate::data::export::write_delimited;
use crate::data::filter::filter_assets;
use crate::data::loader::load_report;
use crate::data::model::Table;
use crate::data::positions::summarize_positions;
use crate::data::summary::{summarize, Summary};
use crate::error::RtlocsumError;

// ---------------------------------------------------------------------------
// Command pipeline: load → positions → filter → summarize → export
// ---------------------------------------------------------------------------

/// Run the command described by `cli`.
///
/// The summary goes to `out`, unless the table itself is exported to
/// stdout (`--export -`): then the table goes to `out` and the summary to
/// `err`. Nothing is written when loading fails.
pub fn run<O: Write, E: Write>(cli: &Cli, mut out: O, mut err: E) -> Result<()> {
    let options = cli.load_options().context("invalid options")?;
    let report = load_report(&cli.report, &options)
        .with_context(|| format!("loading {}", cli.report.display()))?;

    let table = if cli.positions {
        summarize_positions(&report)?
    } else {
        report
    };

    let table = match cli.asset_filter()? {
        Some(filter) => {
            let selected = filter_assets(&table, &filter);
            info!("{} of {} records matched the asset filter", selected.len(), table.len());
            if selected.is_empty() {
                let empty = RtlocsumError::EmptyResult {
                    assets: filter.names().to_vec(),
                };
                if cli.fail_on_empty {
                    return Err(empty.into());
                }
                warn!("{empty}");
            }
            selected
        }
        None => table,
    };

    let summary = summarize(&table);

    match cli.export.as_deref() {
        Some(path) if path == Path::new("-") => {
            write_delimited(&table, &mut out, cli.delimiter_byte())?;
            print_summary(&summary, cli.json, &mut err)
        }
        Some(path) => {
            export_file(&table, path, cli.delimiter_byte())?;
            print_summary(&summary, cli.json, &mut out)
        }
        None => print_summary(&summary, cli.json, &mut out),
    }
}

fn export_file(table: &Table, path: &Path, delimiter: u8) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_delimited(table, BufWriter::new(file), delimiter)?;
    info!("Wrote {} records to {}", table.len(), path.display());
    Ok(())
}

fn print_summary<W: Write>(summary: &Summary, json: bool, out: &mut W) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, summary)?;
        writeln!(out)?;
    } else {
        writeln!(out, "Summary of filtered data:")?;
        write!(out, "{summary}")?;
    }
    Ok(())
}
