//! Ingestion of hand-labeled region annotations into per-image training records.

mod category;
mod error;
mod ingest;
mod probe;
mod record;
mod shape;
mod table;

pub use category::CategoryTable;
pub use error::{IngestErr, Result};
pub use ingest::{ANNOTATION_FILE, DatasetSplit, ingest_dir, ingest_rows, load_split};
pub use probe::{DecodedImageProbe, ImageProbe};
pub use record::{AnnotationRecord, BBox, BoxMode, ObjectAnnotation};
pub use shape::{PolygonShape, parse_shape};
pub use table::{RegionRow, read_table};
