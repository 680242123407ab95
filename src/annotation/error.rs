use std::{
    error::Error,
    fmt::{self, Display},
    path::PathBuf,
};

/// The annotation module's result type.
pub type Result<T> = std::result::Result<T, IngestErr>;

/// Fatal failures while turning an annotation table into records.
///
/// Nothing is skipped or substituted: a single bad row aborts the whole ingestion.
#[derive(Debug)]
pub enum IngestErr {
    Table {
        path: PathBuf,
        source: csv::Error,
    },
    MalformedShape {
        filename: String,
        row: usize,
        source: serde_json::Error,
    },
    MissingPoints {
        filename: String,
        row: usize,
        axis: &'static str,
    },
    PointCountMismatch {
        filename: String,
        row: usize,
        xs: usize,
        ys: usize,
    },
    EmptyPolygon {
        filename: String,
        row: usize,
    },
    ImageUnreadable {
        path: PathBuf,
        source: image::ImageError,
    },
    UnknownCategory {
        filename: String,
        label: String,
    },
}

impl Display for IngestErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestErr::Table { path, source } => {
                write!(f, "invalid annotation table {}: {source}", path.display())
            }
            IngestErr::MalformedShape {
                filename,
                row,
                source,
            } => write!(
                f,
                "malformed region_shape_attributes for {filename} (row {row}): {source}"
            ),
            IngestErr::MissingPoints {
                filename,
                row,
                axis,
            } => write!(
                f,
                "region shape for {filename} (row {row}) has no numeric {axis} list"
            ),
            IngestErr::PointCountMismatch {
                filename,
                row,
                xs,
                ys,
            } => write!(
                f,
                "region shape for {filename} (row {row}) has {xs} x coordinates \
                 but {ys} y coordinates"
            ),
            IngestErr::EmptyPolygon { filename, row } => {
                write!(f, "region shape for {filename} (row {row}) has no points")
            }
            IngestErr::ImageUnreadable { path, source } => {
                write!(f, "cannot read image {}: {source}", path.display())
            }
            IngestErr::UnknownCategory { filename, label } => {
                write!(f, "unknown category {label:?} in annotations of {filename}")
            }
        }
    }
}

impl Error for IngestErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            IngestErr::Table { source, .. } => Some(source),
            IngestErr::MalformedShape { source, .. } => Some(source),
            IngestErr::ImageUnreadable { source, .. } => Some(source),
            _ => None,
        }
    }
}
