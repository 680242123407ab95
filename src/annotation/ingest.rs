use std::{
    collections::HashMap,
    fmt,
    path::{Path, PathBuf},
};

use log::{debug, info};

use super::{
    AnnotationRecord, BoxMode, CategoryTable, ImageProbe, ObjectAnnotation, RegionRow, Result,
    parse_shape, read_table,
};
use crate::{config::ConfigErr, error::Result as SegResult};

/// Name of the tab-separated region export inside every dataset directory.
pub const ANNOTATION_FILE: &str = "regiondata.csv";

/// The dataset partitions kept under a common dataset root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetSplit {
    Train,
    Validate,
    Test,
}

impl DatasetSplit {
    pub const ALL: [DatasetSplit; 3] = [Self::Train, Self::Validate, Self::Test];

    /// The split's directory name under the dataset root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Validate => "validate",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for DatasetSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Ingests one split of the dataset rooted at `root`.
///
/// # Arguments
/// * `root` - The directory containing one sub-directory per split.
/// * `split` - The split to ingest.
/// * `categories` - The category table labels are resolved against.
/// * `probe` - Reads each image's dimensions.
///
/// # Errors
/// `ConfigErr::MissingDatasetDir` if the split's directory doesn't exist, otherwise
/// any ingestion failure.
pub fn load_split<P: ImageProbe>(
    root: &Path,
    split: DatasetSplit,
    categories: &CategoryTable,
    probe: &P,
) -> SegResult<Vec<AnnotationRecord>> {
    let dir = root.join(split.dir_name());
    if !dir.is_dir() {
        return Err(ConfigErr::MissingDatasetDir(dir).into());
    }

    let records = ingest_dir(&dir, categories, probe)?;
    info!(
        "ingested {split} split: images={} regions={}",
        records.len(),
        records.iter().map(|r| r.annotations.len()).sum::<usize>()
    );

    Ok(records)
}

/// Ingests the annotation table found in `dir`.
///
/// # Returns
/// One record per distinct filename, in order of first appearance.
pub fn ingest_dir<P: ImageProbe>(
    dir: &Path,
    categories: &CategoryTable,
    probe: &P,
) -> Result<Vec<AnnotationRecord>> {
    let rows = read_table(&dir.join(ANNOTATION_FILE))?;
    ingest_rows(dir, &rows, categories, probe)
}

/// Groups already parsed table rows into per-image records.
///
/// # Arguments
/// * `dir` - The directory image filenames are relative to.
/// * `rows` - The table rows, in file order.
/// * `categories` - The category table labels are resolved against.
/// * `probe` - Reads each image's dimensions.
pub fn ingest_rows<P: ImageProbe>(
    dir: &Path,
    rows: &[RegionRow],
    categories: &CategoryTable,
    probe: &P,
) -> Result<Vec<AnnotationRecord>> {
    let groups = group_by_filename(rows);
    let mut records = Vec::with_capacity(groups.len());

    for (image_id, (filename, members)) in groups.into_iter().enumerate() {
        let file_name: PathBuf = dir.join(filename);
        let (height, width) = probe.dimensions(&file_name)?;

        let mut annotations = Vec::with_capacity(members.len());
        for (row, region) in members {
            let Some(shape) = parse_shape(filename, row, &region.region_shape_attributes)? else {
                continue;
            };

            annotations.push(ObjectAnnotation {
                bbox: shape.bbox(),
                bbox_mode: BoxMode::XyxyAbs,
                polygon: shape.polygon(),
                category_id: categories.resolve(filename, &region.region_attributes)?,
            });
        }

        debug!(
            image_id = image_id, regions = annotations.len();
            "ingested {filename}"
        );

        records.push(AnnotationRecord {
            file_name,
            image_id,
            height,
            width,
            annotations,
        });
    }

    Ok(records)
}

/// Groups rows by filename, keeping filenames in first-appearance order and each
/// group's rows (with their table position) in file order.
fn group_by_filename(rows: &[RegionRow]) -> Vec<(&str, Vec<(usize, &RegionRow)>)> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<(usize, &RegionRow)>)> = Vec::new();

    for (row, region) in rows.iter().enumerate() {
        let filename = region.filename.as_str();
        let slot = *slots.entry(filename).or_insert_with(|| {
            groups.push((filename, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push((row, region));
    }

    groups
}
