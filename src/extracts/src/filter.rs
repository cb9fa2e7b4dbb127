use pstree_common::ProcessRecord;
use serde::{Deserialize, Serialize};

/// Excludes transient processes (e.g. an `ldconfig` run by the app user)
/// that would otherwise make a listing flaky.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RowFilter {
    #[serde(default)]
    pub ruser: Option<String>,
    pub args_contains: String,
}

impl RowFilter {
    pub fn new(ruser: Option<&str>, args_contains: &str) -> Self {
        RowFilter {
            ruser: ruser.map(str::to_string),
            args_contains: args_contains.to_string(),
        }
    }

    pub fn excludes(&self, row: &ProcessRecord) -> bool {
        self.ruser.as_deref().map_or(true, |ruser| ruser == row.ruser)
            && row.args.contains(&self.args_contains)
    }
}

pub fn filter_rows(rows: Vec<ProcessRecord>, filters: &[RowFilter]) -> Vec<ProcessRecord> {
    rows.into_iter()
        .filter(|row| {
            let excluded = filters.iter().any(|filter| filter.excludes(row));
            if excluded {
                tracing::debug!("Filtered out process {}", row);
            }
            !excluded
        })
        .collect()
}
