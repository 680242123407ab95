use std::path::Path;

use serde::Deserialize;

use super::{IngestErr, Result};

/// One row of the tab-separated region export.
///
/// Additional columns of the export are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegionRow {
    pub filename: String,
    pub region_shape_attributes: String,
    pub region_attributes: String,
}

/// Reads every row of the annotation table at `path`, in file order.
///
/// # Errors
/// An unreadable file, a missing required column or a ragged row.
pub fn read_table(path: &Path) -> Result<Vec<RegionRow>> {
    let table_err = |source| IngestErr::Table {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(path)
        .map_err(table_err)?;

    reader
        .deserialize()
        .collect::<std::result::Result<Vec<RegionRow>, _>>()
        .map_err(table_err)
}
