use std::{fmt, num::NonZeroUsize};

use super::{ConfigErr, Result, TrainingConfig};

/// Where the external model runner executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Device {
    Cuda,
    Cpu,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cuda => f.write_str("cuda"),
            Device::Cpu => f.write_str("cpu"),
        }
    }
}

/// `floor(epochs * train_size / batch_size)`.
///
/// # Errors
/// `ConfigErr::ZeroIterations` when the result is zero.
pub fn max_iterations(
    epochs: usize,
    train_size: usize,
    batch_size: NonZeroUsize,
) -> Result<NonZeroUsize> {
    let iterations = epochs.saturating_mul(train_size) / batch_size.get();

    NonZeroUsize::new(iterations).ok_or(ConfigErr::ZeroIterations {
        epochs,
        train_size,
        batch_size: batch_size.get(),
    })
}

/// Solver and model settings handed to the external model runner.
///
/// Derived once from a `TrainingConfig` and the size of the ingested training split.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub ims_per_batch: NonZeroUsize,
    pub base_lr: f64,
    pub max_iter: NonZeroUsize,
    pub num_classes: usize,
    pub zoo_config: String,
    pub device: Device,
    pub freeze_at: usize,
    pub roi_batch_size_per_image: NonZeroUsize,
    pub seed: u64,
}

impl RunPlan {
    /// Creates a new `RunPlan`.
    ///
    /// # Arguments
    /// * `cfg` - The validated run configuration.
    /// * `train_size` - The amount of images in the training split.
    pub fn new(cfg: &TrainingConfig, train_size: usize) -> Result<Self> {
        let device = if cfg.use_accelerator() {
            Device::Cuda
        } else {
            Device::Cpu
        };

        Ok(Self {
            ims_per_batch: cfg.batch_size(),
            base_lr: cfg.learning_rate(),
            max_iter: max_iterations(cfg.epochs(), train_size, cfg.batch_size())?,
            num_classes: cfg.categories().len(),
            zoo_config: format!("COCO-InstanceSegmentation/{}.yaml", cfg.backbone()),
            device,
            freeze_at: cfg.freeze_at(),
            roi_batch_size_per_image: cfg.roi_batch_size_per_image(),
            seed: cfg.seed(),
        })
    }
}
