use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use log::{debug, info, warn};

use super::mapping::AssetMapping;
use super::model::{Record, Table, TableShape, FLOW_DATE, LOCATION_ID, LOCATION_NAME, TRADING_INTERVAL};
use crate::error::{Result, RtlocsumError};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Leading columns the MIS export adds to every row. The report's own
/// header only names the columns after these.
pub const MIS_PREFIX: [&str; 5] = ["Org Name", "Report Name", FLOW_DATE, "Report Date", "Data Type"];

/// Position of the row-type marker (`C`, `H`, `D`, `T`) in MIS rows.
const DATA_TYPE_INDEX: usize = 4;

/// Columns dropped on load unless configured otherwise.
pub const DEFAULT_IGNORED_COLUMNS: [&str; 5] =
    ["Org Name", "Report Name", "Report Date", "Location Type", "Data Type"];

const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];
const DATETIME_FORMATS: [&str; 4] = [
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// How rows are laid out in the report file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportLayout {
    /// MIS / Pharos export: prefixed rows tagged `C`/`H`/`D`/`T`.
    #[default]
    Mis,
    /// Ordinary delimited file: one header row, then data rows.
    Plain,
}

/// Everything the loader needs to know besides the file itself.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub layout: ReportLayout,
    /// Abort on the first malformed row (`true`) or skip it with a warning.
    pub strict: bool,
    pub ignored_columns: Vec<String>,
    pub mapping: Option<AssetMapping>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            layout: ReportLayout::default(),
            strict: true,
            ignored_columns: DEFAULT_IGNORED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            mapping: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an RTLOCSUM report from disk.
pub fn load_report(path: &Path, options: &LoadOptions) -> Result<Table> {
    if !path.exists() {
        return Err(RtlocsumError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| RtlocsumError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let table = read_report(file, options)?;
    info!(
        "Loaded {} records ({} measurement columns) from {}",
        table.len(),
        table.measurement_columns().len(),
        path.display()
    );
    Ok(table)
}

/// Parse a report from any reader.
pub fn read_report<R: Read>(reader: R, options: &LoadOptions) -> Result<Table> {
    let csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut rows = csv_reader.into_records();

    let mut records = Vec::new();
    let mut skipped = 0usize;

    // Everything up to the header is preamble.
    let plan = loop {
        let Some(result) = rows.next() else {
            return Err(RtlocsumError::MissingHeader(format!(
                "no row names the '{LOCATION_NAME}' column"
            )));
        };
        let Some(row) = readable_row(result, options.strict, &mut skipped)? else {
            continue;
        };
        if let Some(plan) = detect_header(&row, options)? {
            break plan;
        }
    };

    for result in rows {
        let Some(row) = readable_row(result, options.strict, &mut skipped)? else {
            continue;
        };
        if is_blank(&row) {
            continue;
        }
        if options.layout == ReportLayout::Mis && cell(&row, DATA_TYPE_INDEX) != "D" {
            debug!("Skipping non-data row on line {}", line_of(&row));
            continue;
        }

        match plan.parse_row(&row) {
            Ok(mut record) => {
                if let Some(mapping) = &options.mapping {
                    record.asset = mapping.lookup(&record.location_name).cloned();
                }
                records.push(record);
            }
            Err(err) if options.strict => return Err(err),
            Err(err) => {
                warn!("Skipping malformed row: {err}");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {skipped} malformed rows");
    }

    let columns: Vec<String> = plan.measurements.into_iter().map(|(_, name)| name).collect();
    let columns = if records.is_empty() {
        columns
    } else {
        drop_empty_columns(columns, &mut records)
    };

    let shape = TableShape::Report {
        mapped: options.mapping.is_some(),
    };
    Table::new(shape, columns, records)
}

/// Unwrap one CSV row. Rows the reader could not decode (bad UTF-8,
/// ragged length) are skipped with a warning in lenient mode.
fn readable_row(
    result: std::result::Result<StringRecord, csv::Error>,
    strict: bool,
    skipped: &mut usize,
) -> Result<Option<StringRecord>> {
    match result {
        Ok(row) => Ok(Some(row)),
        Err(err) if !strict && is_row_error(&err) => {
            let line = err.position().map(|p| p.line()).unwrap_or(0);
            warn!("Skipping unreadable row on line {line}: {err}");
            *skipped += 1;
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn is_row_error(err: &csv::Error) -> bool {
    matches!(
        err.kind(),
        csv::ErrorKind::Utf8 { .. } | csv::ErrorKind::UnequalLengths { .. }
    )
}

// ---------------------------------------------------------------------------
// Header handling
// ---------------------------------------------------------------------------

/// Where each column lives in a data row.
#[derive(Debug)]
struct ColumnPlan {
    flow_date: usize,
    trading_interval: usize,
    location_id: usize,
    location_name: usize,
    measurements: Vec<(usize, String)>,
}

/// Return the column plan if `row` is the header row for `options.layout`.
fn detect_header(row: &StringRecord, options: &LoadOptions) -> Result<Option<ColumnPlan>> {
    if is_blank(row) {
        return Ok(None);
    }
    let names: Vec<String> = match options.layout {
        ReportLayout::Plain => row.iter().map(|c| c.trim().to_string()).collect(),
        ReportLayout::Mis => {
            let names_location = row
                .iter()
                .skip(MIS_PREFIX.len())
                .any(|c| c.trim() == LOCATION_NAME);
            if !names_location {
                if cell(row, DATA_TYPE_INDEX) == "D" {
                    let err = RtlocsumError::Parse {
                        line: line_of(row),
                        message: "data row before header row".to_string(),
                    };
                    if options.strict {
                        return Err(err);
                    }
                    warn!("Skipping malformed row: {err}");
                    return Ok(None);
                }
                debug!("Skipping preamble line {}", line_of(row));
                return Ok(None);
            }
            MIS_PREFIX
                .iter()
                .map(|c| c.to_string())
                .chain(row.iter().skip(MIS_PREFIX.len()).map(|c| c.trim().to_string()))
                .collect()
        }
    };
    ColumnPlan::from_header(&names, &options.ignored_columns).map(Some)
}

impl ColumnPlan {
    fn from_header(names: &[String], ignored: &[String]) -> Result<Self> {
        let find = |column: &str| {
            names
                .iter()
                .position(|n| n == column)
                .ok_or_else(|| RtlocsumError::MissingColumn(column.to_string()))
        };
        let flow_date = find(FLOW_DATE)?;
        let trading_interval = find(TRADING_INTERVAL)?;
        let location_id = find(LOCATION_ID)?;
        let location_name = find(LOCATION_NAME)?;
        let core = [flow_date, trading_interval, location_id, location_name];

        let mut seen: HashSet<&str> = core.iter().map(|&i| names[i].as_str()).collect();
        let mut measurements = Vec::new();
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() || core.contains(&i) || ignored.iter().any(|c| c == name) {
                continue;
            }
            if !seen.insert(name.as_str()) {
                warn!("Column '{name}' appears more than once, keeping the first");
                continue;
            }
            measurements.push((i, name.clone()));
        }

        Ok(ColumnPlan {
            flow_date,
            trading_interval,
            location_id,
            location_name,
            measurements,
        })
    }

    /// Fields a row must have to carry every core column.
    fn min_fields(&self) -> usize {
        [self.flow_date, self.trading_interval, self.location_id, self.location_name]
            .into_iter()
            .max()
            .unwrap_or(0)
            + 1
    }

    fn parse_row(&self, row: &StringRecord) -> Result<Record> {
        let line = line_of(row);
        let fail = |message: String| RtlocsumError::Parse { line, message };

        if row.len() < self.min_fields() {
            return Err(fail(format!(
                "expected at least {} fields, found {}",
                self.min_fields(),
                row.len()
            )));
        }

        let raw_date = cell(row, self.flow_date);
        let flow_date = parse_flow_date(raw_date)
            .ok_or_else(|| fail(format!("'{raw_date}' is not a valid {FLOW_DATE}")))?;

        let raw_interval = cell(row, self.trading_interval);
        let trading_interval = parse_trading_interval(raw_interval)
            .ok_or_else(|| fail(format!("'{raw_interval}' is not a valid {TRADING_INTERVAL}")))?;

        let raw_id = cell(row, self.location_id);
        let location_id = raw_id
            .parse::<i64>()
            .map_err(|_| fail(format!("'{raw_id}' is not a valid {LOCATION_ID}")))?;

        let location_name = cell(row, self.location_name).to_string();
        if location_name.is_empty() {
            return Err(fail(format!("empty {LOCATION_NAME}")));
        }

        let measurements = self
            .measurements
            .iter()
            .map(|(i, name)| {
                let raw = cell(row, *i);
                if raw.is_empty() {
                    return Ok(None);
                }
                raw.parse::<f64>()
                    .map(Some)
                    .map_err(|_| fail(format!("'{raw}' in column '{name}' is not a number")))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Record {
            flow_date,
            trading_interval,
            location_id,
            location_name,
            asset: None,
            measurements,
        })
    }
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// Parse a flow date written as a date or a datetime (time is discarded).
pub fn parse_flow_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

/// Parse an hour-ending interval. The repeated hour on the DST fall-back
/// day is reported as `02X` and is read as hour 2.
pub fn parse_trading_interval(s: &str) -> Option<u8> {
    let s = s.trim();
    let digits = s.strip_suffix(['X', 'x']).unwrap_or(s);
    digits.parse::<u8>().ok().filter(|h| (1..=24).contains(h))
}

// -- helpers --

fn cell(row: &StringRecord, index: usize) -> &str {
    row.get(index).unwrap_or("").trim()
}

fn is_blank(row: &StringRecord) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

fn line_of(row: &StringRecord) -> u64 {
    row.position().map(|p| p.line()).unwrap_or(0)
}

/// Remove measurement columns that hold no value in any record.
fn drop_empty_columns(columns: Vec<String>, records: &mut [Record]) -> Vec<String> {
    let keep: Vec<bool> = (0..columns.len())
        .map(|i| records.iter().any(|r| r.measurements[i].is_some()))
        .collect();
    if keep.iter().all(|k| *k) {
        return columns;
    }

    for record in records.iter_mut() {
        let mut flags = keep.iter();
        record.measurements.retain(|_| flags.next().copied().unwrap_or(true));
    }
    columns
        .into_iter()
        .zip(keep)
        .filter_map(|(column, k)| {
            if !k {
                debug!("Dropping empty column '{column}'");
            }
            k.then_some(column)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIS_REPORT: &str = "\
FLP,SR_RTLOCSUM,01/01/2024,01/03/2024,C,Real-Time Locational Summary
FLP,SR_RTLOCSUM,01/01/2024,01/03/2024,C,Generated by MIS
FLP,SR_RTLOCSUM,01/01/2024,01/03/2024,H,Trading Interval,Location ID,Location Name,Location Type,Real Time Energy Component,Unused
FLP,SR_RTLOCSUM,01/01/2024,01/03/2024,D,01,321,SHEPAUG,NETWORK NODE,35.10,
FLP,SR_RTLOCSUM,01/01/2024,01/03/2024,D,02X,321,SHEPAUG,NETWORK NODE,34.00,
FLP,SR_RTLOCSUM,01/02/2024,01/03/2024,D,01,322,NORWALK,NETWORK NODE,,
FLP,SR_RTLOCSUM,01/02/2024,01/03/2024,T,3
";

    #[test]
    fn test_parse_flow_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 10);
        assert_eq!(parse_flow_date("03/10/2024"), expected);
        assert_eq!(parse_flow_date("2024-03-10"), expected);
        assert_eq!(parse_flow_date("2024-03-10 00:00:00"), expected);
        assert_eq!(parse_flow_date("3/10/2024 13:00"), expected);
        assert_eq!(parse_flow_date("March 10"), None);
    }

    #[test]
    fn test_parse_trading_interval() {
        assert_eq!(parse_trading_interval("01"), Some(1));
        assert_eq!(parse_trading_interval("02X"), Some(2));
        assert_eq!(parse_trading_interval("24"), Some(24));
        assert_eq!(parse_trading_interval("0"), None);
        assert_eq!(parse_trading_interval("HE1"), None);
    }

    #[test]
    fn test_read_mis_report() {
        let table = read_report(MIS_REPORT.as_bytes(), &LoadOptions::default()).unwrap();

        assert_eq!(table.len(), 3);
        // "Unused" is empty in every row and "Location Type" is ignored.
        assert_eq!(table.measurement_columns(), ["Real Time Energy Component"]);

        let first = &table.records()[0];
        assert_eq!(first.flow_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(first.trading_interval, 1);
        assert_eq!(first.location_id, 321);
        assert_eq!(first.location_name, "SHEPAUG");
        assert_eq!(first.measurements, vec![Some(35.10)]);

        assert_eq!(table.records()[1].trading_interval, 2);
        assert_eq!(table.records()[2].measurements, vec![None]);
    }

    #[test]
    fn test_read_plain_report() {
        let text = "\
Flow Date,Trading Interval,Location ID,Location Name,Real Time LMP
2024-01-01,1,321,SHEPAUG,35.5

2024-01-01,2,321,SHEPAUG,36.0
";
        let options = LoadOptions {
            layout: ReportLayout::Plain,
            ..LoadOptions::default()
        };
        let table = read_report(text.as_bytes(), &options).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.measurement_columns(), ["Real Time LMP"]);
    }

    #[test]
    fn test_missing_column() {
        let text = "Flow Date,Location ID,Location Name\n2024-01-01,321,SHEPAUG\n";
        let options = LoadOptions {
            layout: ReportLayout::Plain,
            ..LoadOptions::default()
        };
        let err = read_report(text.as_bytes(), &options).unwrap_err();
        assert!(matches!(err, RtlocsumError::MissingColumn(ref c) if c == TRADING_INTERVAL));
    }

    #[test]
    fn test_missing_header() {
        let text = "FLP,SR_RTLOCSUM,01/01/2024,01/03/2024,C,comment only\n";
        let err = read_report(text.as_bytes(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, RtlocsumError::MissingHeader(_)));
    }

    #[test]
    fn test_data_before_header() {
        let text = "FLP,SR_RTLOCSUM,01/01/2024,01/03/2024,D,01,321,SHEPAUG\n";
        let err = read_report(text.as_bytes(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, RtlocsumError::Parse { line: 1, .. }));
    }

    #[test]
    fn test_short_row_is_parse_error() {
        let text = "\
Flow Date,Trading Interval,Location ID,Location Name
2024-01-01,1
";
        let options = LoadOptions {
            layout: ReportLayout::Plain,
            ..LoadOptions::default()
        };
        let err = read_report(text.as_bytes(), &options).unwrap_err();
        assert!(matches!(err, RtlocsumError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_strict_and_lenient() {
        let text = "\
Flow Date,Trading Interval,Location ID,Location Name,Value
2024-01-01,1,321,SHEPAUG,1.0
2024-01-01,2,321,SHEPAUG,abc
2024-01-01,3,321,SHEPAUG,3.0
";
        let strict = LoadOptions {
            layout: ReportLayout::Plain,
            ..LoadOptions::default()
        };
        let err = read_report(text.as_bytes(), &strict).unwrap_err();
        assert!(matches!(err, RtlocsumError::Parse { line: 3, .. }));

        let lenient = LoadOptions {
            strict: false,
            ..strict
        };
        let table = read_report(text.as_bytes(), &lenient).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].trading_interval, 3);
    }

    #[test]
    fn test_invalid_utf8_row_strict_and_lenient() {
        let mut bytes = b"Flow Date,Trading Interval,Location ID,Location Name,Value\n\
2024-01-01,1,321,SHEPAUG,1.0\n"
            .to_vec();
        bytes.extend_from_slice(b"2024-01-01,2,321,SHEP\xFFAUG,2.0\n");
        bytes.extend_from_slice(b"2024-01-01,3,321,SHEPAUG,3.0\n");

        let strict = LoadOptions {
            layout: ReportLayout::Plain,
            ..LoadOptions::default()
        };
        let err = read_report(bytes.as_slice(), &strict).unwrap_err();
        assert!(matches!(err, RtlocsumError::Csv(_)));

        let lenient = LoadOptions {
            strict: false,
            ..strict
        };
        let table = read_report(bytes.as_slice(), &lenient).unwrap();
        let intervals: Vec<u8> = table.records().iter().map(|r| r.trading_interval).collect();
        assert_eq!(intervals, vec![1, 3]);
    }

    #[test]
    fn test_data_before_header_lenient() {
        let text = format!(
            "FLP,SR_RTLOCSUM,01/01/2024,01/03/2024,D,01,321,SHEPAUG\n{}",
            MIS_REPORT
        );
        let lenient = LoadOptions {
            strict: false,
            ..LoadOptions::default()
        };
        let table = read_report(text.as_bytes(), &lenient).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_duplicate_header_keeps_first() {
        let text = "\
Flow Date,Trading Interval,Location ID,Location Name,Value,Value
2024-01-01,1,321,SHEPAUG,1.0,9.0
";
        let options = LoadOptions {
            layout: ReportLayout::Plain,
            ..LoadOptions::default()
        };
        let table = read_report(text.as_bytes(), &options).unwrap();
        assert_eq!(table.measurement_columns(), ["Value"]);
        assert_eq!(table.records()[0].measurements, vec![Some(1.0)]);
    }

    #[test]
    fn test_mapping_applied() {
        let mapping = AssetMapping::from_reader(
            "Location,FLP Asset Name,ISO-NE Name,Operation Type\nSHEPAUG,Shepaug,SHEPAUG,Gen\n"
                .as_bytes(),
        )
        .unwrap();
        let options = LoadOptions {
            mapping: Some(mapping),
            ..LoadOptions::default()
        };
        let table = read_report(MIS_REPORT.as_bytes(), &options).unwrap();

        assert_eq!(table.shape(), TableShape::Report { mapped: true });
        assert_eq!(table.records()[0].asset_name(), "Shepaug");
        assert_eq!(table.records()[2].asset_name(), "NORWALK");
    }
}
