use std::io::Write;

use super::model::{
    Record, Table, TableShape, ASSET_NAME, FLOW_DATE, ISO_NAME, LOCATION_ID, LOCATION_NAME,
    OPERATION_TYPE, TRADING_INTERVAL,
};
use crate::error::Result;

/// Spreadsheet paste format.
pub const TAB: u8 = b'\t';

/// Column headers of `table` in export order.
pub fn column_names(table: &Table) -> Vec<String> {
    let mut names: Vec<String> = match table.shape() {
        TableShape::Report { .. } => [FLOW_DATE, TRADING_INTERVAL, LOCATION_ID, LOCATION_NAME]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        TableShape::Positions => ["Asset", "Name", "Ops Type", FLOW_DATE, "HE", LOCATION_ID]
            .iter()
            .map(|c| c.to_string())
            .collect(),
    };
    names.extend(table.measurement_columns().iter().cloned());
    if table.shape() == (TableShape::Report { mapped: true }) {
        names.extend([ASSET_NAME, ISO_NAME, OPERATION_TYPE].iter().map(|c| c.to_string()));
    }
    names
}

/// Write `table` as delimited text: a header row, then one line per record.
/// Missing values are written as empty cells.
pub fn write_delimited<W: Write>(table: &Table, writer: W, delimiter: u8) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    out.write_record(column_names(table))?;
    for record in table.records() {
        out.write_record(row_cells(table.shape(), record))?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn row_cells(shape: TableShape, record: &Record) -> Vec<String> {
    let asset = record.asset.as_ref();
    let text = |value: Option<&String>| value.cloned().unwrap_or_default();

    let mut cells = match shape {
        TableShape::Report { .. } => vec![
            record.flow_date.to_string(),
            record.trading_interval.to_string(),
            record.location_id.to_string(),
            record.location_name.clone(),
        ],
        TableShape::Positions => vec![
            record.asset_name().to_string(),
            text(asset.and_then(|a| a.iso_name.as_ref())),
            text(asset.and_then(|a| a.ops_type.as_ref())),
            record.flow_date.to_string(),
            record.trading_interval.to_string(),
            record.location_id.to_string(),
        ],
    };
    cells.extend(
        record
            .measurements
            .iter()
            .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
    );
    if shape == (TableShape::Report { mapped: true }) {
        cells.push(text(asset.map(|a| &a.asset_name)));
        cells.push(text(asset.and_then(|a| a.iso_name.as_ref())));
        cells.push(text(asset.and_then(|a| a.ops_type.as_ref())));
    }
    cells
}
