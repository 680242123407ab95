use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use super::{ConfigErr, TrainingDraft};
use crate::{annotation::CategoryTable, augmentation::AugmentationPolicy};

/// Validated, immutable settings of a training run.
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    batch_size: NonZeroUsize,
    epochs: usize,
    learning_rate: f64,
    seed: u64,
    backbone: String,
    use_accelerator: bool,
    freeze_at: usize,
    augment: bool,
    categories: CategoryTable,
    dataset_root: PathBuf,
    output_dir: PathBuf,
    world_size: NonZeroUsize,
    writer_period: NonZeroUsize,
    roi_batch_size_per_image: NonZeroUsize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let draft = TrainingDraft::default();
        let non_zero = |n| NonZeroUsize::new(n).unwrap_or(NonZeroUsize::MIN);

        Self {
            batch_size: non_zero(draft.batch_size),
            epochs: draft.epochs,
            learning_rate: draft.learning_rate,
            seed: draft.seed,
            backbone: draft.backbone,
            use_accelerator: draft.use_accelerator,
            freeze_at: draft.freeze_at,
            augment: draft.augment,
            categories: CategoryTable::from_defaults(),
            dataset_root: draft.dataset_root.into(),
            output_dir: draft.output_dir.into(),
            world_size: non_zero(draft.world_size),
            writer_period: non_zero(draft.writer_period),
            roi_batch_size_per_image: non_zero(draft.roi_batch_size_per_image),
        }
    }
}

impl TryFrom<TrainingDraft> for TrainingConfig {
    type Error = ConfigErr;

    fn try_from(draft: TrainingDraft) -> Result<Self, Self::Error> {
        let non_zero = |field, n| {
            NonZeroUsize::new(n).ok_or_else(|| ConfigErr::invalid(field, "must be at least 1"))
        };

        if !draft.learning_rate.is_finite() || draft.learning_rate <= 0.0 {
            return Err(ConfigErr::invalid(
                "learning_rate",
                format!("{} is not a positive finite number", draft.learning_rate),
            ));
        }

        if draft.backbone.trim().is_empty() {
            return Err(ConfigErr::invalid("backbone", "must not be empty"));
        }

        Ok(Self {
            batch_size: non_zero("batch_size", draft.batch_size)?,
            epochs: draft.epochs,
            learning_rate: draft.learning_rate,
            seed: draft.seed,
            backbone: draft.backbone,
            use_accelerator: draft.use_accelerator,
            freeze_at: draft.freeze_at,
            augment: draft.augment,
            categories: CategoryTable::new(draft.categories)?,
            dataset_root: draft.dataset_root.into(),
            output_dir: draft.output_dir.into(),
            world_size: non_zero("world_size", draft.world_size)?,
            writer_period: non_zero("writer_period", draft.writer_period)?,
            roi_batch_size_per_image: non_zero(
                "roi_batch_size_per_image",
                draft.roi_batch_size_per_image,
            )?,
        })
    }
}

impl TrainingConfig {
    /// Reads and validates a JSON configuration document; absent keys take their defaults.
    pub fn from_json_file(path: &Path) -> super::Result<Self> {
        TrainingDraft::from_json_file(path)?.build()
    }

    #[inline]
    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    #[inline]
    pub fn epochs(&self) -> usize {
        self.epochs
    }

    #[inline]
    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    pub fn backbone(&self) -> &str {
        &self.backbone
    }

    #[inline]
    pub fn use_accelerator(&self) -> bool {
        self.use_accelerator
    }

    /// Number of early backbone blocks kept frozen.
    #[inline]
    pub fn freeze_at(&self) -> usize {
        self.freeze_at
    }

    #[inline]
    pub fn augment(&self) -> bool {
        self.augment
    }

    /// The augmentation chain selected by the `augment` toggle.
    pub fn augmentation(&self) -> AugmentationPolicy {
        AugmentationPolicy::from_toggle(self.augment)
    }

    #[inline]
    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    #[inline]
    pub fn dataset_root(&self) -> &PathBuf {
        &self.dataset_root
    }

    #[inline]
    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    /// Number of parallel workers.
    #[inline]
    pub fn world_size(&self) -> NonZeroUsize {
        self.world_size
    }

    /// Steps between two flushes of the periodic metrics writer.
    #[inline]
    pub fn writer_period(&self) -> NonZeroUsize {
        self.writer_period
    }

    #[inline]
    pub fn roi_batch_size_per_image(&self) -> NonZeroUsize {
        self.roi_batch_size_per_image
    }
}
