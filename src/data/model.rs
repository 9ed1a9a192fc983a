use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Result, RtlocsumError};

// ---------------------------------------------------------------------------
// Column names used by the report and the derived views
// ---------------------------------------------------------------------------

pub const FLOW_DATE: &str = "Flow Date";
pub const TRADING_INTERVAL: &str = "Trading Interval";
pub const LOCATION_ID: &str = "Location ID";
pub const LOCATION_NAME: &str = "Location Name";

pub const ASSET_NAME: &str = "FLP Asset Name";
pub const ISO_NAME: &str = "ISO-NE Name";
pub const OPERATION_TYPE: &str = "Operation Type";

// ---------------------------------------------------------------------------
// AssetInfo – what the location mapping knows about a location
// ---------------------------------------------------------------------------

/// Operational identity of a pricing location, taken from the mapping file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetInfo {
    /// Internal asset name, e.g. `Shepaug`.
    pub asset_name: String,
    /// Name used by ISO-NE for the resource.
    pub iso_name: Option<String>,
    /// Operation type, e.g. `Gen` or `Pump`.
    pub ops_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Record – one data row of the report
// ---------------------------------------------------------------------------

/// A single report row with its core fields typed at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub flow_date: NaiveDate,
    /// Hour ending, 1-24. The repeated DST hour `02X` is stored as 2.
    pub trading_interval: u8,
    pub location_id: i64,
    pub location_name: String,
    /// Present when a location mapping resolved this location to an asset.
    pub asset: Option<AssetInfo>,
    /// Values aligned with [`Table::measurement_columns`]; `None` for an empty cell.
    pub measurements: Vec<Option<f64>>,
}

impl Record {
    /// The identifier used for filtering and summaries: the mapped asset
    /// name when there is one, otherwise the location name.
    pub fn asset_name(&self) -> &str {
        self.asset
            .as_ref()
            .map(|a| a.asset_name.as_str())
            .unwrap_or(&self.location_name)
    }
}

// ---------------------------------------------------------------------------
// Table – an immutable snapshot of records plus their schema
// ---------------------------------------------------------------------------

/// What a table's rows represent, which decides its exported columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableShape {
    /// Rows as read from the report. `mapped` is set when a location
    /// mapping was applied during load.
    Report { mapped: bool },
    /// Operations positions derived from a report.
    Positions,
}

/// Ordered, immutable set of records. Derived tables (filtered, positions)
/// are always new values.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    shape: TableShape,
    measurement_columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    /// Build a table, checking that every record carries one value per
    /// measurement column.
    pub fn new(
        shape: TableShape,
        measurement_columns: Vec<String>,
        records: Vec<Record>,
    ) -> Result<Self> {
        if let Some(bad) = records
            .iter()
            .find(|r| r.measurements.len() != measurement_columns.len())
        {
            return Err(RtlocsumError::MeasurementCount {
                location: bad.location_name.clone(),
                expected: measurement_columns.len(),
                found: bad.measurements.len(),
            });
        }
        Ok(Table {
            shape,
            measurement_columns,
            records,
        })
    }

    /// A table with the same shape and columns holding `records`, which
    /// must come from this table.
    pub(crate) fn derive(&self, records: Vec<Record>) -> Self {
        Table {
            shape: self.shape,
            measurement_columns: self.measurement_columns.clone(),
            records,
        }
    }

    pub fn shape(&self) -> TableShape {
        self.shape
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn measurement_columns(&self) -> &[String] {
        &self.measurement_columns
    }

    /// Index of a measurement column by exact name.
    pub fn measurement_index(&self, column: &str) -> Option<usize> {
        self.measurement_columns.iter().position(|c| c == column)
    }

    /// Value of `column` for `record`, if the column exists and the cell is set.
    pub fn measurement(&self, record: &Record, column: &str) -> Option<f64> {
        self.measurement_index(column)
            .and_then(|i| record.measurements.get(i).copied().flatten())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Display for TableShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableShape::Report { mapped: true } => write!(f, "report (mapped)"),
            TableShape::Report { mapped: false } => write!(f, "report"),
            TableShape::Positions => write!(f, "positions"),
        }
    }
}
