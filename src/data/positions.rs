//! Operations positions: dispatch and price per asset and hour.

use log::warn;

use super::model::{Record, Table, TableShape};
use crate::error::{Result, RtlocsumError};

pub const RT_ADJUSTED_NET_INTERCHANGE: &str = "Real Time Adjusted Net Interchange";
pub const NET_INTERCHANGE_DEVIATION: &str = "Adjusted Net Interchange Deviation";
pub const RT_ENERGY: &str = "Real Time Energy Component";
pub const RT_CONGESTION: &str = "Real Time Congestion Component";
pub const RT_LOSS: &str = "Real Time Marginal Loss Component";

pub const RT_DISPATCH: &str = "RT Dispatch";
pub const RT_LMP: &str = "RT LMP";
pub const DA_DISPATCH: &str = "DA Dispatch";

/// Build the positions view of a report table.
///
/// For each mapped asset row:
/// * `RT Dispatch` = real-time adjusted net interchange
/// * `RT LMP` = energy + congestion + marginal loss components
/// * `DA Dispatch` = RT dispatch - net interchange deviation
///
/// A missing input value makes the derived value missing. Rows for
/// locations without an asset are dropped.
pub fn summarize_positions(table: &Table) -> Result<Table> {
    if !matches!(table.shape(), TableShape::Report { .. }) {
        return Err(RtlocsumError::Config(format!(
            "positions require a report table, got {}",
            table.shape()
        )));
    }

    let column = |name: &str| {
        table
            .measurement_index(name)
            .ok_or_else(|| RtlocsumError::MissingColumn(name.to_string()))
    };
    let dispatch = column(RT_ADJUSTED_NET_INTERCHANGE)?;
    let deviation = column(NET_INTERCHANGE_DEVIATION)?;
    let energy = column(RT_ENERGY)?;
    let congestion = column(RT_CONGESTION)?;
    let loss = column(RT_LOSS)?;

    let records: Vec<Record> = table
        .records()
        .iter()
        .filter(|r| r.asset.is_some())
        .map(|r| {
            let value = |i: usize| r.measurements[i];
            let rt_dispatch = value(dispatch);
            let rt_lmp = value(energy)
                .zip(value(congestion))
                .zip(value(loss))
                .map(|((e, c), l)| e + c + l);
            let da_dispatch = rt_dispatch.zip(value(deviation)).map(|(d, dev)| d - dev);

            Record {
                measurements: vec![rt_dispatch, rt_lmp, da_dispatch],
                ..r.clone()
            }
        })
        .collect();

    if records.is_empty() && !table.is_empty() {
        warn!("No report rows belong to a mapped asset; is the location mapping loaded?");
    }

    Table::new(
        TableShape::Positions,
        vec![RT_DISPATCH.to_string(), RT_LMP.to_string(), DA_DISPATCH.to_string()],
        records,
    )
}
