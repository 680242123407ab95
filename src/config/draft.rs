use std::{fs, path::Path};

use serde::Deserialize;

use super::{ConfigErr, Result, TrainingConfig};

/// Backbone used when none is configured.
pub const DEFAULT_BACKBONE: &str = "mask_rcnn_R_50_FPN_3x";

/// The annotated AMF structures, in class-index order.
pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "root",
    "AMF internal hypha",
    "AMF external hypha",
    "AMF arbuscule",
    "AMF vesicle",
    "AMF spore",
    "others",
];

/// Unvalidated configuration as read from a JSON document.
///
/// Every field is optional in the document; absent fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingDraft {
    pub batch_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub seed: u64,
    pub backbone: String,
    pub use_accelerator: bool,
    pub freeze_at: usize,
    pub augment: bool,
    pub categories: Vec<String>,
    pub dataset_root: String,
    pub output_dir: String,
    pub world_size: usize,
    pub writer_period: usize,
    pub roi_batch_size_per_image: usize,
}

impl Default for TrainingDraft {
    fn default() -> Self {
        Self {
            batch_size: 2,
            epochs: 300,
            learning_rate: 0.00025,
            seed: 1,
            backbone: DEFAULT_BACKBONE.to_string(),
            use_accelerator: true,
            freeze_at: 2,
            augment: true,
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            dataset_root: "../data/AM_classify2".to_string(),
            output_dir: "./output".to_string(),
            world_size: 1,
            writer_period: 20,
            roi_batch_size_per_image: 128,
        }
    }
}

impl TrainingDraft {
    /// Loads a draft from the JSON file at `path`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigErr::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigErr::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validates the draft into an immutable `TrainingConfig`.
    pub fn build(self) -> Result<TrainingConfig> {
        TrainingConfig::try_from(self)
    }
}
