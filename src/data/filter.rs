use std::collections::BTreeSet;

use super::model::{Record, Table};

// ---------------------------------------------------------------------------
// Filter predicate: which assets are selected
// ---------------------------------------------------------------------------

/// How filter names are compared with a record's asset identifier.
/// Both sides are trimmed and compared case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Exact,
    /// The identifier contains one of the names.
    Substring,
}

/// A set of asset names to keep.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    names: Vec<String>,
    normalized: BTreeSet<String>,
    mode: MatchMode,
}

impl AssetFilter {
    pub fn new<I, S>(names: I, mode: MatchMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let normalized = names
            .iter()
            .map(|n| normalize(n))
            .filter(|n| !n.is_empty())
            .collect();
        AssetFilter {
            names,
            normalized,
            mode,
        }
    }

    /// Case-insensitive exact matching, the default policy.
    pub fn exact<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names, MatchMode::Exact)
    }

    /// Names as given by the caller.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// No usable name selected, so nothing can match.
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Whether `asset` passes the filter.
    pub fn matches(&self, asset: &str) -> bool {
        let asset = normalize(asset);
        match self.mode {
            MatchMode::Exact => self.normalized.contains(&asset),
            MatchMode::Substring => self.normalized.iter().any(|n| asset.contains(n.as_str())),
        }
    }

    fn accepts(&self, record: &Record) -> bool {
        self.matches(record.asset_name())
    }
}

/// Return a new table with the records whose asset passes `filter`, in
/// their original order. An empty filter selects nothing.
pub fn filter_assets(table: &Table, filter: &AssetFilter) -> Table {
    if filter.is_empty() {
        return table.derive(Vec::new());
    }
    let records = table
        .records()
        .iter()
        .filter(|r| filter.accepts(r))
        .cloned()
        .collect();
    table.derive(records)
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
