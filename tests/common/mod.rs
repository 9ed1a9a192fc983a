//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;

pub const MIS_HEADER: &str = "FLP,SR_RTLOCSUM,01/01/2024,01/05/2024,H,Trading Interval,Location ID,Location Name,Location Type,Real Time Adjusted Net Interchange,Adjusted Net Interchange Deviation,Real Time Energy Component,Real Time Congestion Component,Real Time Marginal Loss Component";

/// One MIS data row.
pub fn mis_row(date: &str, he: &str, id: i64, location: &str, values: &str) -> String {
    format!("FLP,SR_RTLOCSUM,{date},01/05/2024,D,{he},{id},{location},NETWORK NODE,{values}")
}

/// Report with Shepaug, Stevenson and Norwalk over three flow dates:
/// 9 data rows, 3 per asset, interleaved.
pub fn three_asset_report() -> String {
    let mut lines = vec![
        "FLP,SR_RTLOCSUM,01/01/2024,01/05/2024,C,Real-Time Locational Summary".to_string(),
        "FLP,SR_RTLOCSUM,01/01/2024,01/05/2024,C,Customer FLP".to_string(),
        MIS_HEADER.to_string(),
    ];
    for (day, date) in ["01/01/2024", "01/02/2024", "01/03/2024"].iter().enumerate() {
        let he = format!("{:02}", day + 1);
        lines.push(mis_row(date, &he, 14614, "Shepaug", "40.0,-1.0,35.00,0.25,0.50"));
        lines.push(mis_row(date, &he, 4270, "Norwalk", "-30.0,0.5,35.00,0.10,0.40"));
        lines.push(mis_row(date, &he, 14615, "Stevenson", "25.0,2.0,35.00,0.30,0.45"));
    }
    lines.push("FLP,SR_RTLOCSUM,01/03/2024,01/05/2024,T,9".to_string());
    lines.join("\n") + "\n"
}

pub const MAPPING: &str = "\
Location,FLP Asset Name,ISO-NE Name,Operation Type
Shepaug,Shepaug Hydro,SHEPAUG,Gen
Stevenson,Stevenson Hydro,STEVENSON,Gen
Norwalk,,NORWALK,Load
";

/// Write `contents` into a file named `name` inside a fresh temp dir.
pub fn write_temp(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    (dir, path)
}
