use std::{env, path::PathBuf};

use anyhow::Context;
use log::info;

use amseg::{
    annotation::{DatasetSplit, DecodedImageProbe, load_split},
    config::{RunPlan, TrainingConfig},
};

const CONFIG_VAR: &str = "AMSEG_CONFIG";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::var_os(CONFIG_VAR) {
        Some(path) => {
            let path = PathBuf::from(path);
            TrainingConfig::from_json_file(&path)
                .with_context(|| format!("loading {}", path.display()))?
        }
        None => TrainingConfig::default(),
    };

    let probe = DecodedImageProbe;
    let mut train_size = 0;
    for split in DatasetSplit::ALL {
        let records = load_split(config.dataset_root(), split, config.categories(), &probe)
            .with_context(|| format!("ingesting the {split} split"))?;
        if split == DatasetSplit::Train {
            train_size = records.len();
        }
    }

    let plan = RunPlan::new(&config, train_size).context("planning the run")?;

    info!(
        max_iter = plan.max_iter.get(),
        ims_per_batch = plan.ims_per_batch.get(),
        base_lr = plan.base_lr,
        num_classes = plan.num_classes,
        device:% = plan.device,
        zoo_config = plan.zoo_config.as_str();
        "run plan ready"
    );

    Ok(())
}
