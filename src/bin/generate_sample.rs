use std::fs::File;

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};

/// Seeded SplitMix64 stream; the sample only needs repeatable noise.
struct Noise(u64);

impl Noise {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in [0, 1).
    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// `center` plus triangular noise in (-spread, spread).
    fn around(&mut self, center: f64, spread: f64) -> f64 {
        center + spread * (self.unit() - self.unit())
    }
}

/// (location name, location id, asset, ISO-NE name, ops type, capacity MW)
const LOCATIONS: [(&str, i64, Option<&str>, &str, &str, f64); 5] = [
    ("UN.SHEPAUG 13.8SHEP", 14614, Some("Shepaug"), "SHEPAUG", "Gen", 42.0),
    ("UN.STEVENSN13.8STEV", 14615, Some("Stevenson"), "STEVENSON", "Gen", 28.0),
    ("UN.CABOT   13.8CABT", 1113, Some("Cabot"), "CABOT", "Gen", 62.0),
    ("UN.NORTHFLD13.8NFPS", 1210, Some("Northfield"), "NORTHFIELD", "Pump", -250.0),
    ("LD.NORWALK 13.8", 4270, None, "NORWALK", "Load", 0.0),
];

const HEADER: [&str; 10] = [
    "Trading Interval",
    "Location ID",
    "Location Name",
    "Location Type",
    "Real Time Adjusted Net Interchange",
    "Adjusted Net Interchange Deviation",
    "Real Time Energy Component",
    "Real Time Congestion Component",
    "Real Time Marginal Loss Component",
    "Real Time Locational Marginal Price",
];

fn main() -> Result<()> {
    let mut rng = Noise(42);
    let first_day = NaiveDate::from_ymd_opt(2024, 7, 1).context("invalid start date")?;
    let days = 3;
    let report_date = (first_day + Duration::days(days + 2)).format("%m/%d/%Y").to_string();

    let report_path = "sample_rtlocsum.csv";
    let file = File::create(report_path).context("creating sample report")?;
    let mut out = csv::WriterBuilder::new().flexible(true).from_writer(file);

    let prefix = |flow: &str, kind: &str| -> Vec<String> {
        vec![
            "FLP".to_string(),
            "SR_RTLOCSUM".to_string(),
            flow.to_string(),
            report_date.clone(),
            kind.to_string(),
        ]
    };

    let first_flow = first_day.format("%m/%d/%Y").to_string();
    let mut comment = prefix(&first_flow, "C");
    comment.push("Real-Time Locational Summary Report".to_string());
    out.write_record(&comment)?;

    let mut header = prefix(&first_flow, "H");
    header.extend(HEADER.iter().map(|h| h.to_string()));
    out.write_record(&header)?;

    let mut rows = 0usize;
    for day in 0..days {
        let flow = (first_day + Duration::days(day)).format("%m/%d/%Y").to_string();
        for hour in 1..=24u32 {
            // Evening peak pricing.
            let shape = if (17..=21).contains(&hour) { 1.6 } else { 1.0 };
            let energy = rng.around(38.0 * shape, 8.0);

            for &(name, id, _, _, ops_type, capacity) in &LOCATIONS {
                let dispatch = if ops_type == "Load" {
                    rng.around(-35.0, 6.0)
                } else {
                    capacity * (0.4 + 0.6 * rng.unit())
                };
                let deviation = rng.around(0.0, 3.0);
                let congestion = rng.around(0.0, 0.8);
                let loss = rng.around(0.3, 0.2);
                let lmp = energy + congestion + loss;

                let mut row = prefix(&flow, "D");
                row.extend([
                    format!("{hour:02}"),
                    id.to_string(),
                    name.to_string(),
                    "NETWORK NODE".to_string(),
                    format!("{dispatch:.3}"),
                    format!("{deviation:.3}"),
                    format!("{energy:.2}"),
                    format!("{congestion:.2}"),
                    format!("{loss:.2}"),
                    format!("{lmp:.2}"),
                ]);
                out.write_record(&row)?;
                rows += 1;
            }
        }
    }

    let mut trailer = prefix(&first_flow, "T");
    trailer.push(rows.to_string());
    out.write_record(&trailer)?;
    out.flush()?;

    let mapping_path = "sample_mapping.csv";
    let mut mapping = csv::Writer::from_path(mapping_path).context("creating sample mapping")?;
    mapping.write_record(["Location", "FLP Asset Name", "ISO-NE Name", "Operation Type"])?;
    for &(name, _, asset, iso_name, ops_type, _) in &LOCATIONS {
        mapping.write_record([name, asset.unwrap_or(""), iso_name, ops_type])?;
    }
    mapping.flush()?;

    println!(
        "Wrote {rows} rows ({} locations x {days} days) to {report_path} and mapping to {mapping_path}",
        LOCATIONS.len()
    );
    Ok(())
}
