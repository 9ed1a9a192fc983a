use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::model::Table;

/// Inclusive range of flow dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Read-only statistics over one table snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub record_count: usize,
    /// `None` when the table is empty.
    pub date_range: Option<DateRange>,
    pub assets: BTreeSet<String>,
}

impl Summary {
    /// Whether the summarized table had no records.
    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }
}

/// Compute a [`Summary`] from `table`.
pub fn summarize(table: &Table) -> Summary {
    let records = table.records();

    let date_range = records
        .iter()
        .map(|r| r.flow_date)
        .min()
        .zip(records.iter().map(|r| r.flow_date).max())
        .map(|(start, end)| DateRange { start, end });

    let assets = records.iter().map(|r| r.asset_name().to_string()).collect();

    Summary {
        record_count: records.len(),
        date_range,
        assets,
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of records: {}", self.record_count)?;
        match &self.date_range {
            Some(range) => writeln!(f, "Date range: {} to {}", range.start, range.end)?,
            None => writeln!(f, "Date range: n/a")?,
        }
        writeln!(f)?;
        writeln!(f, "Assets included:")?;
        if self.assets.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for asset in &self.assets {
            writeln!(f, "  {asset}")?;
        }
        Ok(())
    }
}
