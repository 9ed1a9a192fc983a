use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use super::model::AssetInfo;
use crate::error::{Result, RtlocsumError};

/// One row of the location mapping CSV. Unknown columns are ignored.
#[derive(Debug, Deserialize)]
struct MappingRow {
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "FLP Asset Name")]
    asset_name: Option<String>,
    #[serde(rename = "ISO-NE Name")]
    iso_name: Option<String>,
    #[serde(rename = "Operation Type")]
    ops_type: Option<String>,
}

/// Lookup from ISO-NE location name to the asset operating there.
#[derive(Debug, Clone, Default)]
pub struct AssetMapping {
    by_location: HashMap<String, AssetInfo>,
}

impl AssetMapping {
    /// Read the mapping CSV at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RtlocsumError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| RtlocsumError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    /// Read mapping rows from any reader. Duplicate locations keep the
    /// first entry; a blank asset name leaves the location unmapped.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut by_location = HashMap::new();

        for result in csv_reader.deserialize::<MappingRow>() {
            let row = result?;
            let Some(asset_name) = row.asset_name.filter(|a| !a.is_empty()) else {
                continue;
            };
            if by_location.contains_key(&row.location) {
                warn!("Duplicate mapping for location '{}', keeping first", row.location);
                continue;
            }
            by_location.insert(
                row.location,
                AssetInfo {
                    asset_name,
                    iso_name: row.iso_name.filter(|s| !s.is_empty()),
                    ops_type: row.ops_type.filter(|s| !s.is_empty()),
                },
            );
        }

        Ok(AssetMapping { by_location })
    }

    /// Asset operating at `location`, by exact name.
    pub fn lookup(&self, location: &str) -> Option<&AssetInfo> {
        self.by_location.get(location)
    }

    pub fn len(&self) -> usize {
        self.by_location.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_location.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPPING: &str = "\
Location,FLP Asset Name,ISO-NE Name,Operation Type,Notes
UN.SHEPAUG 13.8SHEP,Shepaug,SHEPAUG,Gen,hydro
UN.STEVENSN13.8STEV,Stevenson,STEVENSON,Gen,
UN.SHEPAUG 13.8SHEP,Shepaug Duplicate,SHEPAUG,Gen,
.H.INTERNAL_HUB,,HUB,,
";

    #[test]
    fn test_from_reader() {
        let mapping = AssetMapping::from_reader(MAPPING.as_bytes()).unwrap();
        assert_eq!(mapping.len(), 2);

        let shepaug = mapping.lookup("UN.SHEPAUG 13.8SHEP").unwrap();
        assert_eq!(shepaug.asset_name, "Shepaug");
        assert_eq!(shepaug.iso_name.as_deref(), Some("SHEPAUG"));
        assert_eq!(shepaug.ops_type.as_deref(), Some("Gen"));
    }

    #[test]
    fn test_blank_asset_is_unmapped() {
        let mapping = AssetMapping::from_reader(MAPPING.as_bytes()).unwrap();
        assert!(mapping.lookup(".H.INTERNAL_HUB").is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let err = AssetMapping::load(Path::new("/nonexistent/mapping.csv")).unwrap_err();
        assert!(matches!(err, RtlocsumError::FileNotFound { .. }));
    }
}
